use crate::web::session::PageContext;

use super::layout;

fn error_page(title: &str, heading: &str, detail: &str) -> String {
    let body = format!(
        r#"<div class="error-page">
  <h1>{heading}</h1>
  <p>{detail}</p>
  <a href="/">Go home</a>
</div>"#
    );
    layout(title, &PageContext::default(), &body)
}

#[must_use]
pub fn not_found() -> String {
    error_page(
        "Not found",
        "404",
        "Sorry, the page you're looking for doesn't exist.",
    )
}

#[must_use]
pub fn forbidden() -> String {
    error_page("Forbidden", "403", "Access unauthorized.")
}

#[must_use]
pub fn server_error() -> String {
    error_page("Error", "500", "Something went wrong. Please try again later.")
}
