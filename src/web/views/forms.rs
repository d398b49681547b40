use std::fmt::Write;

use crate::forms::FormErrors;

use super::{attr, esc};

#[derive(Debug, Clone, Copy)]
pub enum Kind {
    Text,
    Email,
    Password,
    Url,
    TextArea,
}

impl Kind {
    const fn input_type(self) -> &'static str {
        match self {
            Self::Text | Self::TextArea => "text",
            Self::Email => "email",
            Self::Password => "password",
            Self::Url => "url",
        }
    }
}

/// Renders one labelled control with its validation errors.
///
/// Password values are never written back into the page.
#[must_use]
pub fn field(kind: Kind, name: &str, label: &str, value: &str, errors: &FormErrors) -> String {
    let mut out = String::new();
    let invalid = if errors.has(name) { " is-invalid" } else { "" };

    let _ = writeln!(out, r#"<div class="form-group">"#);
    let _ = writeln!(out, r#"  <label for="{name}">{}</label>"#, esc(label));

    match kind {
        Kind::TextArea => {
            let _ = writeln!(
                out,
                r#"  <textarea id="{name}" name="{name}" class="form-control{invalid}" placeholder="{}">{}</textarea>"#,
                attr(label),
                esc(value),
            );
        }
        Kind::Password => {
            let _ = writeln!(
                out,
                r#"  <input type="password" id="{name}" name="{name}" class="form-control{invalid}" placeholder="{}">"#,
                attr(label),
            );
        }
        _ => {
            let _ = writeln!(
                out,
                r#"  <input type="{}" id="{name}" name="{name}" class="form-control{invalid}" placeholder="{}" value="{}">"#,
                kind.input_type(),
                attr(label),
                attr(value),
            );
        }
    }

    for message in errors.field(name) {
        let _ = writeln!(out, r#"  <span class="text-danger">{}</span>"#, esc(message));
    }

    out.push_str("</div>\n");
    out
}

#[must_use]
pub fn hidden(name: &str, value: &str) -> String {
    format!(r#"<input type="hidden" name="{name}" value="{}">"#, attr(value))
}
