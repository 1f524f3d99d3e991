//! Defines the page that asks a user for their display name.

use axum::response::{IntoResponse, Response};
use maud::{Markup, html};

use crate::{
    auth::Session,
    endpoints,
    html::{
        BUTTON_PRIMARY_STYLE, FORM_CONTAINER_STYLE, FORM_ERROR_STYLE, FORM_LABEL_STYLE,
        FORM_TEXT_INPUT_STYLE, base, link, loading_spinner,
    },
    navigation::NavBar,
};

/// The inputs of the display name form, pre-filled with `name`.
///
/// The endpoint swaps these back into the form when the name is rejected.
pub(super) fn display_name_fields(name: &str, error_message: Option<&str>) -> Markup {
    html! {
        div
        {
            label for="display_name" class=(FORM_LABEL_STYLE) { "Your name" }

            input
                name="display_name"
                id="display_name"
                type="text"
                value=(name)
                placeholder="e.g. Priya Nair"
                required
                autofocus
                class=(FORM_TEXT_INPUT_STYLE);

            @if let Some(error_message) = error_message {
                p id="display_name-error" class=(FORM_ERROR_STYLE) { (error_message) }
            }
        }

        button type="submit" id="submit-button" tabindex="0" class=(BUTTON_PRIMARY_STYLE)
        {
            span id="indicator" class="inline htmx-indicator" { (loading_spinner()) }
            " Save"
        }
    }
}

/// Renders the page for choosing a display name.
pub async fn get_display_name_page(session: Session) -> Response {
    let nav_bar = NavBar::new(endpoints::ACCOUNT_NAME_VIEW)
        .with_user_initials(session.initials())
        .into_html();
    let current_name = session.display_name.as_deref().unwrap_or_default();

    let content = html! {
        (nav_bar)

        div class=(FORM_CONTAINER_STYLE)
        {
            div class="w-full max-w-md space-y-4"
            {
                h2 class="text-xl font-bold" { "Welcome!" }
                p class="text-gray-600 dark:text-gray-300"
                {
                    "Expenses you add are recorded under this name."
                }

                form
                    id="display-name-form"
                    hx-post=(endpoints::ACCOUNT_NAME_API)
                    hx-target-422="#display-name-form"
                    hx-target-error="#alert-container"
                    class="w-full space-y-4 md:space-y-6"
                {
                    (display_name_fields(current_name, None))
                }
            }
        }
    };

    base("Your Name", &[], &content).into_response()
}

/// A banner asking the user to set their name, or nothing if it is already set.
pub fn name_banner(session: &Session) -> Markup {
    html! {
        @if session.display_name.is_none() {
            div
                id="name-banner"
                class="w-full p-4 text-sm rounded-lg text-yellow-800 bg-yellow-50 \
                    dark:bg-gray-800 dark:text-yellow-300"
            {
                "You have not told the group your name yet. "
                (link(endpoints::ACCOUNT_NAME_VIEW, "Set your name"))
            }
        }
    }
}
