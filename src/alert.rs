//! Alert system for displaying success and error messages to users.
//!
//! Alerts are rendered as HTML fragments that HTMX swaps into the alert
//! container defined in [crate::html::base].

use axum::response::{Html, IntoResponse, Response};
use maud::{Markup, html};

/// An alert message to display to the user.
#[derive(Debug, Clone, PartialEq)]
pub enum Alert {
    /// A success message with extra details.
    Success {
        /// The headline of the alert.
        message: String,
        /// Further information shown below the headline.
        details: String,
    },
    /// A success message without details.
    SuccessSimple {
        /// The headline of the alert.
        message: String,
    },
    /// An informational message, e.g. for an action that had nothing to do.
    Info {
        /// The headline of the alert.
        message: String,
    },
    /// An error message with extra details.
    Error {
        /// The headline of the alert.
        message: String,
        /// Further information, e.g. how to fix the problem.
        details: String,
    },
}

impl Alert {
    /// Render the alert as an out-of-band swap for the alert container.
    pub fn into_html(self) -> Markup {
        let (container_style, message, details) = match self {
            Alert::Success { message, details } => (SUCCESS_STYLE, message, Some(details)),
            Alert::SuccessSimple { message } => (SUCCESS_STYLE, message, None),
            Alert::Info { message } => (INFO_STYLE, message, None),
            Alert::Error { message, details } => (ERROR_STYLE, message, Some(details)),
        };

        html! {
            div
                id="alert-container"
                hx-swap-oob="true"
                class="w-full max-w-md px-4"
                style="position: fixed; bottom: 1rem; left: 50%; transform: translateX(-50%); z-index: 9999;"
            {
                div
                    role="alert"
                    class=(container_style)
                    onclick="this.parentElement.classList.add('hidden')"
                {
                    p class="font-semibold" { (message) }

                    @if let Some(details) = details.filter(|details| !details.is_empty()) {
                        p class="text-sm" { (details) }
                    }
                }
            }
        }
    }
}

const SUCCESS_STYLE: &str = "p-4 mb-4 rounded-lg cursor-pointer text-green-800 bg-green-50 \
    dark:bg-gray-800 dark:text-green-400";
const INFO_STYLE: &str = "p-4 mb-4 rounded-lg cursor-pointer text-blue-800 bg-blue-50 \
    dark:bg-gray-800 dark:text-blue-400";
const ERROR_STYLE: &str = "p-4 mb-4 rounded-lg cursor-pointer text-red-800 bg-red-50 \
    dark:bg-gray-800 dark:text-red-400";

impl IntoResponse for Alert {
    fn into_response(self) -> Response {
        Html(self.into_html().into_string()).into_response()
    }
}

#[cfg(test)]
mod alert_tests {
    use scraper::{Html, Selector};

    use super::Alert;

    fn paragraphs(alert: Alert) -> Vec<String> {
        let html = Html::parse_fragment(&alert.into_html().into_string());
        html.select(&Selector::parse("p").unwrap())
            .map(|p| p.text().collect::<String>())
            .collect()
    }

    #[test]
    fn simple_alert_has_only_message() {
        let got = paragraphs(Alert::SuccessSimple {
            message: "Saved".to_owned(),
        });

        assert_eq!(got, vec!["Saved".to_owned()]);
    }

    #[test]
    fn error_alert_has_message_and_details() {
        let got = paragraphs(Alert::Error {
            message: "Could not save".to_owned(),
            details: "Try again later.".to_owned(),
        });

        assert_eq!(
            got,
            vec!["Could not save".to_owned(), "Try again later.".to_owned()]
        );
    }

    #[test]
    fn empty_details_are_not_rendered() {
        let got = paragraphs(Alert::Success {
            message: "Done".to_owned(),
            details: String::new(),
        });

        assert_eq!(got.len(), 1);
    }
}
