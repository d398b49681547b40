use crate::forms::{FormErrors, LoginForm, SignupForm};
use crate::web::session::PageContext;

use super::forms::{Kind, field, hidden};
use super::layout;

#[must_use]
pub fn signup(page: &PageContext, form: &SignupForm, errors: &FormErrors) -> String {
    let fields = [
        field(Kind::Text, "username", "Username", &form.username, errors),
        field(Kind::Email, "email", "E-mail", &form.email, errors),
        field(Kind::Password, "password", "Password", "", errors),
        field(Kind::Url, "image_url", "(Optional) Image URL", &form.image_url, errors),
    ]
    .concat();

    let body = format!(
        r#"<div class="form-page">
  <h2 class="join-message">Join Warbler today.</h2>
  <form method="POST" action="/signup" id="user_form">
{fields}
    <button class="btn btn-primary btn-block">Sign me up!</button>
  </form>
</div>"#
    );
    layout("Sign up", page, &body)
}

#[must_use]
pub fn login(page: &PageContext, form: &LoginForm, errors: &FormErrors) -> String {
    let fields = [
        field(Kind::Text, "username", "Username", &form.username, errors),
        field(Kind::Password, "password", "Password", "", errors),
        hidden("next", &form.next),
    ]
    .concat();

    let body = format!(
        r#"<div class="form-page">
  <h2 class="join-message">Welcome back.</h2>
  <form method="POST" action="/login" id="user_form">
{fields}
    <button class="btn btn-primary btn-block">Log in</button>
  </form>
</div>"#
    );
    layout("Log in", page, &body)
}
