use std::collections::HashSet;
use std::fmt::Write;

use crate::constants::limits::MESSAGE_MAX_CHARS;
use crate::db::Message;
use crate::forms::FormErrors;
use crate::web::session::PageContext;

use super::forms::{Kind, field};
use super::{attr, date, esc, layout};

/// Heart toggle; only rendered for a logged-in viewer looking at someone
/// else's message.
fn like_button(message: &Message, viewer_id: Option<i32>, liked: bool) -> String {
    match viewer_id {
        Some(id) if id != message.user_id => format!(
            r#"<button class="like-toggle{}" data-message-id="{}" aria-pressed="{liked}">&#9829;</button>"#,
            if liked { " liked" } else { "" },
            message.id,
        ),
        _ => String::new(),
    }
}

/// A single entry of a message timeline.
#[must_use]
pub fn item(message: &Message, viewer_id: Option<i32>, liked: bool) -> String {
    format!(
        r#"<li class="list-group-item">
  <a href="/messages/{id}" class="message-link"></a>
  <a href="/users/{uid}"><img src="{image}" alt="{name}" class="timeline-image"></a>
  <div class="message-area">
    <a href="/users/{uid}">@{username}</a>
    <span class="text-muted">{date}</span>
    <p>{text}</p>
  </div>
  {like}
</li>
"#,
        id = message.id,
        uid = message.user_id,
        image = attr(&message.author.image_url),
        name = attr(&message.author.username),
        username = esc(&message.author.username),
        date = date(&message.timestamp),
        text = esc(&message.text),
        like = like_button(message, viewer_id, liked),
    )
}

#[must_use]
pub fn timeline(messages: &[Message], viewer_id: Option<i32>, liked: &HashSet<i32>) -> String {
    if messages.is_empty() {
        return r#"<p class="empty">No messages yet.</p>"#.to_string();
    }

    let mut out = String::from("<ul class=\"list-group\" id=\"messages\">\n");
    for message in messages {
        out.push_str(&item(message, viewer_id, liked.contains(&message.id)));
    }
    out.push_str("</ul>");
    out
}

#[must_use]
pub fn show(page: &PageContext, message: &Message, like_count: u64, liked: bool) -> String {
    let viewer_id = page.viewer_id();
    let mut body = String::new();

    let _ = write!(
        body,
        r#"<div class="message-detail">
  <a href="/users/{uid}"><img src="{image}" alt="" class="timeline-image"></a>
  <a href="/users/{uid}">@{username}</a>
  <p class="single-message">{text}</p>
  <span class="text-muted">{date}</span>
  <span class="like-count" data-message-id="{id}">{like_count}</span>
  {like}
"#,
        id = message.id,
        uid = message.user_id,
        image = attr(&message.author.image_url),
        username = esc(&message.author.username),
        text = esc(&message.text),
        date = date(&message.timestamp),
        like = like_button(message, viewer_id, liked),
    );

    if viewer_id == Some(message.user_id) {
        let _ = write!(
            body,
            r#"  <form method="POST" action="/messages/{}/delete">
    <button class="btn btn-outline-danger">Delete</button>
  </form>
"#,
            message.id
        );
    }

    body.push_str("</div>");
    layout("Message", page, &body)
}

#[must_use]
pub fn new(page: &PageContext, text: &str, errors: &FormErrors) -> String {
    let body = format!(
        r#"<div class="form-page">
  <h2>What's happening?</h2>
  <form method="POST" action="/messages/new" id="message-form">
{text}
    <small class="text-muted">Up to {MESSAGE_MAX_CHARS} characters.</small>
    <button class="btn btn-primary">Add my message!</button>
  </form>
</div>"#,
        text = field(Kind::TextArea, "text", "What's happening?", text, errors),
    );
    layout("New message", page, &body)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::Author;
    use chrono::Utc;

    fn message(id: i32, user_id: i32, text: &str) -> Message {
        Message {
            id,
            text: text.to_string(),
            timestamp: Utc::now(),
            user_id,
            author: Author {
                id: user_id,
                username: "bob".to_string(),
                image_url: "/static/images/default-pic.svg".to_string(),
            },
        }
    }

    #[test]
    fn test_text_is_escaped() {
        let html = item(&message(1, 2, "<script>alert(1)</script>"), None, false);
        assert!(!html.contains("<script>"));
        assert!(html.contains("&lt;script&gt;"));
    }

    #[test]
    fn test_like_button_visibility() {
        let msg = message(1, 2, "hi");
        assert!(!item(&msg, None, false).contains("like-toggle"));
        assert!(!item(&msg, Some(2), false).contains("like-toggle"));

        let html = item(&msg, Some(3), true);
        assert!(html.contains(r#"class="like-toggle liked""#));
        assert!(html.contains(r#"data-message-id="1""#));
    }

    #[test]
    fn test_delete_only_for_author() {
        let msg = message(1, 2, "hi");
        let mut page = PageContext::default();
        assert!(!show(&page, &msg, 0, false).contains("/messages/1/delete"));

        page.viewer = Some(crate::db::User {
            id: 2,
            username: "bob".to_string(),
            email: "bob@x.com".to_string(),
            image_url: String::new(),
            header_image_url: String::new(),
            bio: None,
            location: None,
        });
        assert!(show(&page, &msg, 0, false).contains("/messages/1/delete"));
    }
}
