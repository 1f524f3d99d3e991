//! Alert system for displaying success and error messages to users.
//!
//! Alerts are swapped into the `#alert-container` element that every page
//! built with [crate::html::base] provides.

use maud::{Markup, html};

/// A dismissable message shown at the bottom of the page.
#[derive(Debug, Clone, PartialEq)]
pub enum Alert {
    SuccessSimple {
        message: String,
    },
    Error {
        message: String,
        details: String,
    },
    /// An error the user can fix by following the link.
    ErrorWithLink {
        message: String,
        details: String,
        url: &'static str,
        link_text: &'static str,
    },
}

impl Alert {
    /// Render the alert as HTML.
    pub fn into_html(self) -> Markup {
        let (is_error, message, details, link) = match self {
            Alert::SuccessSimple { message } => (false, message, None, None),
            Alert::Error { message, details } => (true, message, Some(details), None),
            Alert::ErrorWithLink {
                message,
                details,
                url,
                link_text,
            } => (true, message, Some(details), Some((url, link_text))),
        };

        let container_style = if is_error {
            "flex p-4 mb-4 rounded-lg shadow-lg text-red-800 bg-red-50 \
            border border-red-300 dark:bg-gray-800 dark:text-red-400 dark:border-red-800"
        } else {
            "flex p-4 mb-4 rounded-lg shadow-lg text-green-800 bg-green-50 \
            border border-green-300 dark:bg-gray-800 dark:text-green-400 dark:border-green-800"
        };

        html! {
            div
                role="alert"
                class=(container_style)
                hx-on:htmx:load="document.getElementById('alert-container').classList.remove('hidden')"
            {
                div class="flex-1"
                {
                    p class="font-medium" { (message) }

                    @if let Some(details) = details.filter(|details| !details.is_empty())
                    {
                        p class="mt-1 text-sm" { (details) }
                    }

                    @if let Some((url, link_text)) = link
                    {
                        a href=(url) class="mt-1 inline-block text-sm font-semibold underline"
                        {
                            (link_text)
                        }
                    }
                }

                button
                    type="button"
                    aria-label="Dismiss"
                    class="ms-3 -mx-1.5 -my-1.5 rounded-lg p-1.5 inline-flex items-center justify-center h-8 w-8 hover:opacity-75"
                    onclick="this.parentElement.remove(); document.getElementById('alert-container').classList.add('hidden')"
                {
                    "✕"
                }
            }
        }
    }
}
