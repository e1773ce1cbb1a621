use std::collections::HashSet;

use askama::Template;
use axum::response::Html;
use uuid::Uuid;

use warbler_db::models::{MessageRow, UserRow};
use warbler_types::models::{Message, ProfileStats, User};

use crate::error::AppError;
use crate::middleware::CurrentUser;

pub fn render<T: Template>(template: &T) -> Result<Html<String>, AppError> {
    let body = template
        .render()
        .map_err(|e| anyhow::anyhow!("template render failed: {e}"))?;
    Ok(Html(body))
}

// -- View models --

/// A message plus whether the viewer has liked it (filled vs outline star).
#[derive(Debug, Clone)]
pub struct MessageView {
    pub message: Message,
    pub liked: bool,
}

impl MessageView {
    pub fn from_rows(rows: Vec<MessageRow>, liked: &HashSet<Uuid>) -> Vec<Self> {
        rows.into_iter()
            .map(|row| {
                let message = Message::from(row);
                Self {
                    liked: liked.contains(&message.id),
                    message,
                }
            })
            .collect()
    }
}

/// A user tile in listings, with the follow state relative to the viewer.
#[derive(Debug, Clone)]
pub struct UserCard {
    pub user: User,
    pub is_self: bool,
    pub viewer_follows: bool,
}

impl UserCard {
    pub fn from_rows(rows: Vec<UserRow>, viewer: Option<Uuid>, following: &HashSet<Uuid>) -> Vec<Self> {
        rows.into_iter()
            .map(|row| {
                let user = User::from(row);
                Self {
                    is_self: Some(user.id) == viewer,
                    viewer_follows: following.contains(&user.id),
                    user,
                }
            })
            .collect()
    }
}

/// Everything the profile header needs.
#[derive(Debug, Clone)]
pub struct ProfileHeader {
    pub user: User,
    pub stats: ProfileStats,
    pub is_owner: bool,
    pub viewer_follows: bool,
}

// -- Pages --

#[derive(Template, Default)]
#[template(path = "home-anon.html")]
pub struct AnonHomeTemplate {
    pub current: Option<CurrentUser>,
}

#[derive(Template)]
#[template(path = "home.html")]
pub struct HomeTemplate {
    pub current: Option<CurrentUser>,
    pub user: User,
    pub stats: ProfileStats,
    pub messages: Vec<MessageView>,
}

#[derive(Template, Default)]
#[template(path = "users/signup.html")]
pub struct SignupTemplate {
    pub current: Option<CurrentUser>,
    pub error: Option<String>,
    pub username: String,
    pub email: String,
}

#[derive(Template, Default)]
#[template(path = "users/login.html")]
pub struct LoginTemplate {
    pub current: Option<CurrentUser>,
    pub error: Option<String>,
}

#[derive(Template)]
#[template(path = "users/index.html")]
pub struct UsersIndexTemplate {
    pub current: Option<CurrentUser>,
    pub query: String,
    pub cards: Vec<UserCard>,
}

#[derive(Template)]
#[template(path = "users/show.html")]
pub struct UserShowTemplate {
    pub current: Option<CurrentUser>,
    pub profile: ProfileHeader,
    pub messages: Vec<MessageView>,
}

/// Shared by the following and followers pages.
#[derive(Template)]
#[template(path = "users/relations.html")]
pub struct UserRelationsTemplate {
    pub current: Option<CurrentUser>,
    pub profile: ProfileHeader,
    pub heading: &'static str,
    pub cards: Vec<UserCard>,
}

#[derive(Template)]
#[template(path = "users/likes.html")]
pub struct UserLikesTemplate {
    pub current: Option<CurrentUser>,
    pub profile: ProfileHeader,
    pub messages: Vec<MessageView>,
}

#[derive(Template)]
#[template(path = "users/edit.html")]
pub struct EditProfileTemplate {
    pub current: Option<CurrentUser>,
    pub user: User,
    pub error: Option<String>,
}

#[derive(Template, Default)]
#[template(path = "messages/new.html")]
pub struct NewMessageTemplate {
    pub current: Option<CurrentUser>,
    pub error: Option<String>,
    pub text: String,
}

#[derive(Template)]
#[template(path = "messages/show.html")]
pub struct MessageShowTemplate {
    pub current: Option<CurrentUser>,
    pub view: MessageView,
    pub is_author: bool,
}
