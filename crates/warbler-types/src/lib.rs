pub mod api;
pub mod models;

/// Avatar shown when a user has not set one.
pub const DEFAULT_IMAGE_URL: &str = "/static/images/default-pic.png";

/// Profile banner shown when a user has not set one.
pub const DEFAULT_HEADER_IMAGE_URL: &str = "/static/images/warbler-hero.jpg";

/// Longest message body accepted.
pub const MAX_MESSAGE_LEN: usize = 140;
