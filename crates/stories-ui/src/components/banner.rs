use maud::{html, Markup};
use stories_core::{DashboardError, ErrorKind};

/// Headline shown above the error message for each error category.
pub fn heading(kind: ErrorKind) -> &'static str {
    match kind {
        ErrorKind::FileFormat => "The file could not be read",
        ErrorKind::Schema => "The file does not have the expected columns",
        ErrorKind::InvalidInput => "The filter could not be applied",
        ErrorKind::NoData => "Nothing to show",
        ErrorKind::Export => "The report could not be generated",
        ErrorKind::Internal => "Something went wrong",
    }
}

/// Inline error banner. The visitor can fix the input and retry.
pub fn render_error(err: &DashboardError) -> Markup {
    render_message(heading(err.kind()), &err.to_string())
}

pub fn render_message(title: &str, message: &str) -> Markup {
    html! {
        div.banner-error role="alert" {
            strong { (title) }
            div { (message) }
        }
    }
}
