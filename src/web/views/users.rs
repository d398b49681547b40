use std::collections::HashSet;
use std::fmt::Write;

use crate::db::{Message, User};
use crate::forms::{EditProfileForm, FormErrors};
use crate::services::ProfileStats;
use crate::web::session::PageContext;

use super::forms::{Kind, field};
use super::messages::timeline;
use super::{attr, css_url, esc, layout};

/// Which tab of a profile page is active.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tab {
    Messages,
    Following,
    Followers,
    Likes,
}

fn follow_button(user_id: i32, following: bool) -> String {
    if following {
        format!(
            r#"<form method="POST" action="/users/stop-following/{user_id}"><button class="btn btn-primary btn-sm">Unfollow</button></form>"#
        )
    } else {
        format!(
            r#"<form method="POST" action="/users/follow/{user_id}"><button class="btn btn-outline-primary btn-sm">Follow</button></form>"#
        )
    }
}

/// The button shown next to `user` for the current viewer, if any.
fn relation_controls(page: &PageContext, user: &User, following: &HashSet<i32>) -> String {
    match page.viewer_id() {
        Some(me) if me == user.id => {
            r#"<a href="/users/profile" class="btn btn-outline-secondary btn-sm">Edit Profile</a>"#
                .to_string()
        }
        Some(_) => follow_button(user.id, following.contains(&user.id)),
        None => String::new(),
    }
}

fn user_card(page: &PageContext, user: &User, following: &HashSet<i32>) -> String {
    format!(
        r#"<div class="card user-card">
  <div class="card-hero" style="background-image: url('{header}')"></div>
  <a href="/users/{id}"><img src="{image}" alt="Image for {name_attr}" class="card-image"></a>
  <div class="card-contents">
    <a href="/users/{id}"><p>@{name}</p></a>
    {controls}
    <p class="card-bio">{bio}</p>
  </div>
</div>
"#,
        id = user.id,
        header = css_url(&user.header_image_url),
        image = attr(&user.image_url),
        name_attr = attr(&user.username),
        name = esc(&user.username),
        controls = relation_controls(page, user, following),
        bio = esc(user.bio.as_deref().unwrap_or_default()),
    )
}

fn user_grid(page: &PageContext, users: &[User], following: &HashSet<i32>, empty: &str) -> String {
    if users.is_empty() {
        return format!(r#"<h3 class="empty">{}</h3>"#, esc(empty));
    }

    users.iter().fold(
        String::from(r#"<div class="user-grid">"#),
        |mut out, user| {
            out.push_str(&user_card(page, user, following));
            out
        },
    ) + "</div>"
}

/// Profile header: banner, avatar, counters and tab links.
fn profile_frame(
    page: &PageContext,
    user: &User,
    stats: &ProfileStats,
    viewer_follows: bool,
    active: Tab,
    content: &str,
) -> String {
    let tab = |t: Tab| if t == active { " active" } else { "" };
    let mut following = HashSet::new();
    if viewer_follows {
        following.insert(user.id);
    }

    let mut out = String::new();
    let _ = write!(
        out,
        r#"<div class="profile-hero" style="background-image: url('{header}')"></div>
<div class="profile">
  <aside class="profile-sidebar">
    <img src="{image}" alt="Image for {name_attr}" class="profile-avatar">
    <h4>@{name}</h4>
    <p class="user-bio">{bio}</p>
    <p class="user-location">{location}</p>
  </aside>
  <section class="profile-main">
    <ul class="user-stats">
      <li class="stat{t_messages}"><a href="/users/{id}">Messages <span>{messages}</span></a></li>
      <li class="stat{t_following}"><a href="/users/{id}/following">Following <span>{n_following}</span></a></li>
      <li class="stat{t_followers}"><a href="/users/{id}/followers">Followers <span>{n_followers}</span></a></li>
      <li class="stat{t_likes}"><a href="/users/{id}/likes">Likes <span>{likes}</span></a></li>
    </ul>
    <div class="profile-controls">{controls}</div>
    {content}
  </section>
</div>"#,
        id = user.id,
        header = css_url(&user.header_image_url),
        image = attr(&user.image_url),
        name_attr = attr(&user.username),
        name = esc(&user.username),
        bio = esc(user.bio.as_deref().unwrap_or_default()),
        location = esc(user.location.as_deref().unwrap_or_default()),
        messages = stats.messages,
        n_following = stats.following,
        n_followers = stats.followers,
        likes = stats.likes,
        t_messages = tab(Tab::Messages),
        t_following = tab(Tab::Following),
        t_followers = tab(Tab::Followers),
        t_likes = tab(Tab::Likes),
        controls = relation_controls(page, user, &following),
    );
    out
}

#[must_use]
pub fn index(page: &PageContext, users: &[User], following: &HashSet<i32>, search: &str) -> String {
    let empty = if search.is_empty() {
        "No users yet.".to_string()
    } else {
        format!("Sorry, no users found matching \"{search}\"")
    };
    layout("Users", page, &user_grid(page, users, following, &empty))
}

pub struct ProfileView<'a> {
    pub user: &'a User,
    pub stats: &'a ProfileStats,
    pub viewer_follows: bool,
}

#[must_use]
pub fn show(
    page: &PageContext,
    profile: &ProfileView<'_>,
    messages: &[Message],
    liked: &HashSet<i32>,
) -> String {
    let content = timeline(messages, page.viewer_id(), liked);
    let body = profile_frame(
        page,
        profile.user,
        profile.stats,
        profile.viewer_follows,
        Tab::Messages,
        &content,
    );
    layout(&profile.user.username, page, &body)
}

/// The following or followers tab.
#[must_use]
pub fn connections(
    page: &PageContext,
    profile: &ProfileView<'_>,
    tab: Tab,
    users: &[User],
    viewer_following: &HashSet<i32>,
) -> String {
    let empty = if tab == Tab::Followers {
        "No followers yet."
    } else {
        "Not following anyone yet."
    };
    let content = user_grid(page, users, viewer_following, empty);
    let body = profile_frame(
        page,
        profile.user,
        profile.stats,
        profile.viewer_follows,
        tab,
        &content,
    );
    layout(&profile.user.username, page, &body)
}

#[must_use]
pub fn likes(
    page: &PageContext,
    profile: &ProfileView<'_>,
    messages: &[Message],
    liked: &HashSet<i32>,
) -> String {
    let content = timeline(messages, page.viewer_id(), liked);
    let body = profile_frame(
        page,
        profile.user,
        profile.stats,
        profile.viewer_follows,
        Tab::Likes,
        &content,
    );
    layout(&profile.user.username, page, &body)
}

#[must_use]
pub fn edit(page: &PageContext, form: &EditProfileForm, errors: &FormErrors) -> String {
    let fields = [
        field(Kind::Text, "username", "Username", &form.username, errors),
        field(Kind::Email, "email", "E-mail", &form.email, errors),
        field(Kind::Url, "image_url", "(Optional) Image URL", &form.image_url, errors),
        field(
            Kind::Url,
            "header_image_url",
            "(Optional) Header Image URL",
            &form.header_image_url,
            errors,
        ),
        field(Kind::TextArea, "bio", "(Optional) Tell us about yourself", &form.bio, errors),
        field(Kind::Text, "location", "(Optional) Location", &form.location, errors),
        field(Kind::Password, "password", "Password", "", errors),
    ]
    .concat();

    let body = format!(
        r#"<div class="form-page">
  <h2>Edit Your Profile.</h2>
  <form method="POST" action="/users/profile" id="user_form">
{fields}
    <p>To confirm changes, enter your password.</p>
    <button class="btn btn-success">Edit this user!</button>
    <a href="/users/{id}" class="btn btn-outline-secondary">Cancel</a>
  </form>
  <a href="/users/password">Change password</a>
  <form method="POST" action="/users/delete" class="danger-zone">
    <button class="btn btn-danger">Delete Profile</button>
  </form>
</div>"#,
        id = page.viewer_id().unwrap_or_default(),
    );
    layout("Edit profile", page, &body)
}

#[must_use]
pub fn password(page: &PageContext, errors: &FormErrors) -> String {
    let fields = [
        field(Kind::Password, "old_pwd", "Current password", "", errors),
        field(Kind::Password, "new_pwd", "New password", "", errors),
        field(Kind::Password, "confirm", "Confirm new password", "", errors),
    ]
    .concat();

    let body = format!(
        r#"<div class="form-page">
  <h2>Change Password.</h2>
  <form method="POST" action="/users/password">
{fields}
    <button class="btn btn-success">Update password</button>
  </form>
</div>"#
    );
    layout("Change password", page, &body)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user(id: i32, name: &str) -> User {
        User {
            id,
            username: name.to_string(),
            email: format!("{name}@x.com"),
            image_url: "/static/images/default-pic.svg".to_string(),
            header_image_url: "/static/images/warbler-hero.svg".to_string(),
            bio: Some("<i>hello</i>".to_string()),
            location: None,
        }
    }

    fn viewing_as(id: i32) -> PageContext {
        PageContext {
            viewer: Some(user(id, "me")),
            flashes: Vec::new(),
        }
    }

    #[test]
    fn test_follow_controls() {
        let bob = user(2, "bob");
        let mut following = HashSet::new();

        let anon = PageContext::default();
        assert!(relation_controls(&anon, &bob, &following).is_empty());

        let me = viewing_as(1);
        assert!(relation_controls(&me, &bob, &following).contains("/users/follow/2"));

        following.insert(2);
        assert!(relation_controls(&me, &bob, &following).contains("/users/stop-following/2"));

        let bob_himself = viewing_as(2);
        assert!(relation_controls(&bob_himself, &bob, &following).contains("/users/profile"));
    }

    #[test]
    fn test_profile_shows_stats_and_escapes_bio() {
        let bob = user(2, "bob");
        let stats = ProfileStats {
            messages: 3,
            following: 1,
            followers: 4,
            likes: 2,
        };
        let profile = ProfileView {
            user: &bob,
            stats: &stats,
            viewer_follows: false,
        };

        let html = show(&PageContext::default(), &profile, &[], &HashSet::new());
        assert!(html.contains("Followers <span>4</span>"));
        assert!(html.contains("&lt;i&gt;hello&lt;/i&gt;"));
        assert!(html.contains("No messages yet."));
    }

    #[test]
    fn test_header_image_stays_inside_css_url() {
        let mut bob = user(2, "bob");
        bob.header_image_url = "x.png'); position: fixed; inset: 0".to_string();
        let stats = ProfileStats::default();
        let profile = ProfileView {
            user: &bob,
            stats: &stats,
            viewer_follows: false,
        };

        let html = show(&PageContext::default(), &profile, &[], &HashSet::new());
        assert!(html.contains("url('x.png%27%29%3B%20position:%20fixed%3B%20inset:%200')"));
        assert!(!html.contains("position: fixed"));
    }

    #[test]
    fn test_empty_search() {
        let html = index(&PageContext::default(), &[], &HashSet::new(), "zed");
        assert!(html.contains("no users found matching"));
    }
}
