//! Server-side HTML rendering.
//!
//! Every page is a plain function returning a `String`. User-supplied text
//! only reaches the output through [`esc`] or [`attr`].

use std::borrow::Cow;
use std::fmt::Write;

use chrono::{DateTime, Utc};

use crate::db::User;

use super::flash::Flash;
use super::session::PageContext;

pub mod auth;
pub mod errors;
pub mod forms;
pub mod home;
pub mod messages;
pub mod users;

/// Escapes text content.
#[must_use]
pub fn esc(s: &str) -> Cow<'_, str> {
    html_escape::encode_text(s)
}

/// Escapes a value placed inside a double-quoted attribute.
#[must_use]
pub fn attr(s: &str) -> Cow<'_, str> {
    html_escape::encode_double_quoted_attribute(s)
}

/// Makes a user-supplied URL safe inside `style="...url('...')"`.
///
/// Characters that could close the CSS string or the `url()` call are
/// percent-encoded; the result is then attribute-escaped.
#[must_use]
pub fn css_url(url: &str) -> String {
    let mut out = String::with_capacity(url.len());
    for c in url.chars() {
        match c {
            '\'' | '"' | '(' | ')' | '\\' | '<' | '>' | ';' => {
                let _ = write!(out, "%{:02X}", u32::from(c));
            }
            c if c.is_whitespace() || c.is_control() => {
                let mut buf = [0u8; 4];
                for byte in c.encode_utf8(&mut buf).bytes() {
                    let _ = write!(out, "%{byte:02X}");
                }
            }
            c => out.push(c),
        }
    }
    attr(&out).into_owned()
}

#[must_use]
pub fn date(ts: &DateTime<Utc>) -> String {
    ts.format("%d %B %Y").to_string()
}

/// Wraps a page body in the shared document shell.
#[must_use]
pub fn layout(title: &str, page: &PageContext, body: &str) -> String {
    let mut out = String::with_capacity(body.len() + 2048);

    let _ = write!(
        out,
        r#"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="utf-8">
  <meta name="viewport" content="width=device-width, initial-scale=1">
  <title>{title} | Warbler</title>
  <link rel="stylesheet" href="/static/style.css">
</head>
<body class="{body_class}">
{nav}
<main class="container">
{flashes}
{body}
</main>
<script src="/static/warbler.js"></script>
</body>
</html>
"#,
        title = esc(title),
        body_class = if page.viewer.is_some() { "logged-in" } else { "anon" },
        nav = nav(page.viewer.as_ref()),
        flashes = flashes(&page.flashes),
    );

    out
}

fn nav(viewer: Option<&User>) -> String {
    let mut out = String::from(
        r#"<nav class="navbar">
  <a class="navbar-brand" href="/"><img src="/static/images/warbler-logo.svg" alt="logo"><span>Warbler</span></a>
"#,
    );

    match viewer {
        None => {
            out.push_str(
                r#"  <ul class="nav">
    <li><a href="/signup">Sign up</a></li>
    <li><a href="/login">Log in</a></li>
  </ul>
"#,
            );
        }
        Some(user) => {
            let _ = write!(
                out,
                r#"  <form class="navbar-search" action="/users">
    <input name="q" placeholder="Search Warbler" aria-label="Search">
    <button type="submit">Search</button>
  </form>
  <ul class="nav">
    <li><a href="/users/{id}"><img src="{image}" alt="{name}" class="avatar-sm"></a></li>
    <li><a href="/messages/new">New Message</a></li>
    <li><a href="/logout">Log out</a></li>
  </ul>
"#,
                id = user.id,
                image = attr(&user.image_url),
                name = attr(&user.username),
            );
        }
    }

    out.push_str("</nav>");
    out
}

fn flashes(flashes: &[Flash]) -> String {
    flashes.iter().fold(String::new(), |mut out, f| {
        let _ = writeln!(
            out,
            r#"<div class="alert alert-{}">{}</div>"#,
            f.category.as_str(),
            esc(&f.message)
        );
        out
    })
}
