//! Form definitions and their field constraints.
//!
//! Each form deserializes from an `application/x-www-form-urlencoded` body
//! (missing fields become empty strings) and reports every failing field at
//! once, so a re-rendered page can show all problems together.

use regex::Regex;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::sync::OnceLock;

use crate::constants::limits::{MESSAGE_MAX_CHARS, PASSWORD_MIN_CHARS};

/// Field name -> error messages.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormErrors {
    fields: BTreeMap<&'static str, Vec<String>>,
}

impl FormErrors {
    pub fn add(&mut self, field: &'static str, message: impl Into<String>) {
        self.fields.entry(field).or_default().push(message.into());
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    #[must_use]
    pub fn field(&self, name: &str) -> &[String] {
        self.fields.get(name).map_or(&[], Vec::as_slice)
    }

    #[must_use]
    pub fn has(&self, name: &str) -> bool {
        self.fields.contains_key(name)
    }

    fn into_result(self) -> Result<(), Self> {
        if self.is_empty() { Ok(()) } else { Err(self) }
    }
}

pub trait Validate {
    fn validate(&self) -> Result<(), FormErrors>;
}

// ============================================================================
// Validators
// ============================================================================

fn email_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s.]+$").expect("Invalid regex"))
}

fn required(errors: &mut FormErrors, field: &'static str, value: &str) -> bool {
    if value.trim().is_empty() {
        errors.add(field, "This field is required.");
        return false;
    }
    true
}

fn email(errors: &mut FormErrors, field: &'static str, value: &str) {
    if !email_regex().is_match(value.trim()) {
        errors.add(field, "Invalid email address.");
    }
}

fn min_length(errors: &mut FormErrors, field: &'static str, value: &str, min: usize) {
    if value.chars().count() < min {
        errors.add(field, format!("Field must be at least {min} characters long."));
    }
}

fn max_length(errors: &mut FormErrors, field: &'static str, value: &str, max: usize) {
    if value.chars().count() > max {
        errors.add(field, format!("Field cannot be longer than {max} characters."));
    }
}

// ============================================================================
// Forms
// ============================================================================

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct SignupForm {
    pub username: String,
    pub email: String,
    pub password: String,
    pub image_url: String,
}

impl Validate for SignupForm {
    fn validate(&self) -> Result<(), FormErrors> {
        let mut errors = FormErrors::default();
        required(&mut errors, "username", &self.username);
        if required(&mut errors, "email", &self.email) {
            email(&mut errors, "email", &self.email);
        }
        min_length(&mut errors, "password", &self.password, PASSWORD_MIN_CHARS);
        errors.into_result()
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct LoginForm {
    pub username: String,
    pub password: String,
    /// Local path to return to after logging in.
    pub next: String,
}

impl Validate for LoginForm {
    fn validate(&self) -> Result<(), FormErrors> {
        let mut errors = FormErrors::default();
        required(&mut errors, "username", &self.username);
        min_length(&mut errors, "password", &self.password, PASSWORD_MIN_CHARS);
        errors.into_result()
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct EditProfileForm {
    pub username: String,
    pub email: String,
    pub image_url: String,
    pub header_image_url: String,
    pub bio: String,
    pub location: String,
    pub password: String,
}

impl Validate for EditProfileForm {
    fn validate(&self) -> Result<(), FormErrors> {
        let mut errors = FormErrors::default();
        required(&mut errors, "username", &self.username);
        if required(&mut errors, "email", &self.email) {
            email(&mut errors, "email", &self.email);
        }
        min_length(&mut errors, "password", &self.password, PASSWORD_MIN_CHARS);
        errors.into_result()
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct PasswordForm {
    pub old_pwd: String,
    pub new_pwd: String,
    pub confirm: String,
}

impl Validate for PasswordForm {
    fn validate(&self) -> Result<(), FormErrors> {
        let mut errors = FormErrors::default();
        min_length(&mut errors, "old_pwd", &self.old_pwd, PASSWORD_MIN_CHARS);
        min_length(&mut errors, "new_pwd", &self.new_pwd, PASSWORD_MIN_CHARS);
        if required(&mut errors, "new_pwd", &self.new_pwd) && self.new_pwd != self.confirm {
            errors.add("new_pwd", "Passwords must match.");
        }
        min_length(&mut errors, "confirm", &self.confirm, PASSWORD_MIN_CHARS);
        errors.into_result()
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct MessageForm {
    pub text: String,
}

impl Validate for MessageForm {
    fn validate(&self) -> Result<(), FormErrors> {
        let mut errors = FormErrors::default();
        if required(&mut errors, "text", &self.text) {
            max_length(&mut errors, "text", self.text.trim(), MESSAGE_MAX_CHARS);
        }
        errors.into_result()
    }
}
