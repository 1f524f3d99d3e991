//! The page where users choose the name the rest of the group sees.

mod name_endpoint;
mod name_page;

pub use name_endpoint::set_display_name_endpoint;
pub use name_page::{get_display_name_page, name_banner};
