use std::collections::HashSet;

use crate::db::{Message, User};
use crate::services::ProfileStats;
use crate::web::session::PageContext;

use super::messages::timeline;
use super::{attr, css_url, esc, layout};

#[must_use]
pub fn anon(page: &PageContext) -> String {
    let body = r#"<div class="home-hero">
  <h1>What's Happening?</h1>
  <h4>New to Warbler?</h4>
  <a href="/signup" class="btn btn-primary">Sign up now</a>
</div>"#;
    layout("Home", page, body)
}

#[must_use]
pub fn feed(
    page: &PageContext,
    user: &User,
    stats: &ProfileStats,
    messages: &[Message],
    liked: &HashSet<i32>,
) -> String {
    let body = format!(
        r#"<div class="home">
  <aside class="home-sidebar">
    <div class="card-hero" style="background-image: url('{header}')"></div>
    <a href="/users/{id}"><img src="{image}" alt="Image for {name_attr}" class="card-image"></a>
    <p>@{name}</p>
    <ul class="user-stats">
      <li><a href="/users/{id}">Messages <span>{messages_n}</span></a></li>
      <li><a href="/users/{id}/following">Following <span>{following}</span></a></li>
      <li><a href="/users/{id}/followers">Followers <span>{followers}</span></a></li>
    </ul>
  </aside>
  <section class="home-feed">
    {timeline}
  </section>
</div>"#,
        id = user.id,
        header = css_url(&user.header_image_url),
        image = attr(&user.image_url),
        name_attr = attr(&user.username),
        name = esc(&user.username),
        messages_n = stats.messages,
        following = stats.following,
        followers = stats.followers,
        timeline = timeline(messages, Some(user.id), liked),
    );
    layout("Home", page, &body)
}
