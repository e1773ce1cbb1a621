//! Database row types. These map directly to SQLite rows and stay distinct
//! from the warbler-types models so the store layer keeps its own shape.

use chrono::{DateTime, NaiveDateTime, Utc};
use tracing::warn;
use uuid::Uuid;

use warbler_types::models::{Message, User};

#[derive(Debug, Clone)]
pub struct UserRow {
    pub id: String,
    pub email: String,
    pub username: String,
    pub image_url: String,
    pub header_image_url: String,
    pub bio: Option<String>,
    pub location: Option<String>,
    /// Argon2 PHC string.
    pub password: String,
    pub created_at: String,
}

#[derive(Debug, Clone)]
pub struct MessageRow {
    pub id: String,
    pub text: String,
    pub user_id: String,
    pub author_username: String,
    pub author_image_url: String,
    pub created_at: String,
}

/// Insert payload for a new account; `password_hash` is already hashed.
#[derive(Debug)]
pub struct NewUser<'a> {
    pub id: Uuid,
    pub username: &'a str,
    pub email: &'a str,
    pub password_hash: &'a str,
    pub image_url: Option<&'a str>,
}

/// Full replacement of the editable profile columns.
#[derive(Debug)]
pub struct ProfileUpdate<'a> {
    pub username: &'a str,
    pub email: &'a str,
    pub image_url: &'a str,
    pub header_image_url: &'a str,
    pub bio: Option<&'a str>,
    pub location: Option<&'a str>,
}

impl From<UserRow> for User {
    fn from(row: UserRow) -> Self {
        Self {
            id: parse_id(&row.id, "user"),
            created_at: parse_timestamp(&row.created_at),
            username: row.username,
            email: row.email,
            image_url: row.image_url,
            header_image_url: row.header_image_url,
            bio: row.bio,
            location: row.location,
        }
    }
}

impl From<MessageRow> for Message {
    fn from(row: MessageRow) -> Self {
        Self {
            id: parse_id(&row.id, "message"),
            author_id: parse_id(&row.user_id, "author"),
            created_at: parse_timestamp(&row.created_at),
            text: row.text,
            author_username: row.author_username,
            author_image_url: row.author_image_url,
        }
    }
}

fn parse_id(raw: &str, what: &str) -> Uuid {
    raw.parse().unwrap_or_else(|e| {
        warn!("Corrupt {} id '{}': {}", what, raw, e);
        Uuid::default()
    })
}

/// SQLite stores timestamps as "YYYY-MM-DD HH:MM:SS.fff" without timezone.
/// Parse as naive UTC and convert.
pub(crate) fn parse_timestamp(raw: &str) -> DateTime<Utc> {
    raw.parse::<DateTime<Utc>>()
        .or_else(|_| {
            NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S%.f").map(|ndt| ndt.and_utc())
        })
        .unwrap_or_else(|e| {
            warn!("Corrupt timestamp '{}': {}", raw, e);
            DateTime::default()
        })
}
