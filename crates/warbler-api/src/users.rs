use std::collections::HashSet;

use axum::{
    Extension, Form,
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_extra::extract::cookie::CookieJar;
use tracing::info;
use uuid::Uuid;

use warbler_db::Database;
use warbler_db::models::ProfileUpdate;
use warbler_types::api::{ProfileForm, UserSearchQuery};
use warbler_types::models::User;
use warbler_types::{DEFAULT_HEADER_IMAGE_URL, DEFAULT_IMAGE_URL};

use crate::auth::{AppState, logged_out, verify_password, with_db};
use crate::error::{AppError, found, parse_id};
use crate::middleware::{CurrentUser, session_user};
use crate::templates::{
    EditProfileTemplate, MessageView, ProfileHeader, UserCard, UserLikesTemplate,
    UserRelationsTemplate, UserShowTemplate, UsersIndexTemplate, render,
};

const PROFILE_MESSAGES: u32 = 100;

fn load_profile(db: &Database, viewer: Uuid, user_id: Uuid) -> Result<ProfileHeader, AppError> {
    let row = db.get_user_by_id(user_id)?.ok_or(AppError::NotFound)?;
    let stats = db.profile_stats(user_id)?;
    let is_owner = viewer == user_id;
    let viewer_follows = !is_owner && db.is_following(viewer, user_id)?;

    Ok(ProfileHeader {
        user: User::from(row),
        stats,
        is_owner,
        viewer_follows,
    })
}

fn following_ids(db: &Database, viewer: Option<Uuid>) -> Result<HashSet<Uuid>, AppError> {
    let Some(viewer) = viewer else {
        return Ok(HashSet::new());
    };
    Ok(db
        .following(viewer)?
        .into_iter()
        .filter_map(|row| row.id.parse().ok())
        .collect())
}

/// GET /users, optionally filtered by `?q=` on username.
pub async fn list_users(
    State(state): State<AppState>,
    jar: CookieJar,
    Query(params): Query<UserSearchQuery>,
) -> Result<Response, AppError> {
    let current = session_user(&state, &jar).await?;
    let viewer = current.as_ref().map(|me| me.id);
    let query = params.q.unwrap_or_default();

    let needle = query.clone();
    let cards = with_db(&state, move |db| {
        let rows = db.search_users(Some(needle.as_str()))?;
        let following = following_ids(db, viewer)?;
        Ok(UserCard::from_rows(rows, viewer, &following))
    })
    .await?;

    Ok(render(&UsersIndexTemplate {
        current,
        query,
        cards,
    })?
    .into_response())
}

/// GET /users/{user_id}: profile with the user's latest messages.
pub async fn show_user(
    State(state): State<AppState>,
    Extension(me): Extension<CurrentUser>,
    Path(user_id): Path<String>,
) -> Result<Response, AppError> {
    let user_id = parse_id(&user_id)?;
    let viewer = me.id;
    let (profile, messages) = with_db(&state, move |db| {
        let profile = load_profile(db, viewer, user_id)?;
        let liked = db.liked_message_ids(viewer)?;
        let rows = db.user_messages(user_id, PROFILE_MESSAGES)?;
        Ok((profile, MessageView::from_rows(rows, &liked)))
    })
    .await?;

    Ok(render(&UserShowTemplate {
        current: Some(me),
        profile,
        messages,
    })?
    .into_response())
}

/// GET /users/{user_id}/following
pub async fn show_following(
    State(state): State<AppState>,
    Extension(me): Extension<CurrentUser>,
    Path(user_id): Path<String>,
) -> Result<Response, AppError> {
    let user_id = parse_id(&user_id)?;
    let viewer = me.id;
    let (profile, cards) = with_db(&state, move |db| {
        let profile = load_profile(db, viewer, user_id)?;
        let rows = db.following(user_id)?;
        let following = following_ids(db, Some(viewer))?;
        Ok((profile, UserCard::from_rows(rows, Some(viewer), &following)))
    })
    .await?;

    Ok(render(&UserRelationsTemplate {
        current: Some(me),
        profile,
        heading: "Following",
        cards,
    })?
    .into_response())
}

/// GET /users/{user_id}/followers
pub async fn show_followers(
    State(state): State<AppState>,
    Extension(me): Extension<CurrentUser>,
    Path(user_id): Path<String>,
) -> Result<Response, AppError> {
    let user_id = parse_id(&user_id)?;
    let viewer = me.id;
    let (profile, cards) = with_db(&state, move |db| {
        let profile = load_profile(db, viewer, user_id)?;
        let rows = db.followers(user_id)?;
        let following = following_ids(db, Some(viewer))?;
        Ok((profile, UserCard::from_rows(rows, Some(viewer), &following)))
    })
    .await?;

    Ok(render(&UserRelationsTemplate {
        current: Some(me),
        profile,
        heading: "Followers",
        cards,
    })?
    .into_response())
}

/// GET /users/{user_id}/likes
pub async fn show_likes(
    State(state): State<AppState>,
    Extension(me): Extension<CurrentUser>,
    Path(user_id): Path<String>,
) -> Result<Response, AppError> {
    let user_id = parse_id(&user_id)?;
    let viewer = me.id;
    let (profile, messages) = with_db(&state, move |db| {
        let profile = load_profile(db, viewer, user_id)?;
        let liked = db.liked_message_ids(viewer)?;
        let rows = db.liked_messages(user_id)?;
        Ok((profile, MessageView::from_rows(rows, &liked)))
    })
    .await?;

    Ok(render(&UserLikesTemplate {
        current: Some(me),
        profile,
        messages,
    })?
    .into_response())
}

/// POST /users/follow/{user_id}
pub async fn add_follow(
    State(state): State<AppState>,
    Extension(me): Extension<CurrentUser>,
    Path(target): Path<String>,
) -> Result<Response, AppError> {
    let target = parse_id(&target)?;
    if target == me.id {
        return Err(AppError::Validation("You cannot follow yourself".into()));
    }

    let follower = me.id;
    with_db(&state, move |db| {
        db.get_user_by_id(target)?.ok_or(AppError::NotFound)?;
        db.follow(follower, target)?;
        Ok(())
    })
    .await?;

    Ok(found(&format!("/users/{}/following", me.id)))
}

/// POST /users/stop-following/{user_id}
pub async fn stop_following(
    State(state): State<AppState>,
    Extension(me): Extension<CurrentUser>,
    Path(target): Path<String>,
) -> Result<Response, AppError> {
    let target = parse_id(&target)?;
    let follower = me.id;
    with_db(&state, move |db| {
        db.get_user_by_id(target)?.ok_or(AppError::NotFound)?;
        db.unfollow(follower, target)?;
        Ok(())
    })
    .await?;

    Ok(found(&format!("/users/{}/following", me.id)))
}

/// GET /users/profile
pub async fn edit_profile_form(
    State(state): State<AppState>,
    Extension(me): Extension<CurrentUser>,
) -> Result<Response, AppError> {
    let id = me.id;
    let user = with_db(&state, move |db| {
        Ok(User::from(db.get_user_by_id(id)?.ok_or(AppError::NotFound)?))
    })
    .await?;

    Ok(render(&EditProfileTemplate {
        current: Some(me),
        user,
        error: None,
    })?
    .into_response())
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

/// POST /users/profile: apply edits once the current password verifies.
pub async fn update_profile(
    State(state): State<AppState>,
    Extension(me): Extension<CurrentUser>,
    Form(form): Form<ProfileForm>,
) -> Result<Response, AppError> {
    let id = me.id;

    let outcome = with_db(&state, move |db| {
        let row = db.get_user_by_id(id)?.ok_or(AppError::NotFound)?;
        if !verify_password(&row, &form.password) {
            return Ok(Err((User::from(row), "Wrong password, please try again.")));
        }

        let username = form.username.trim();
        let email = form.email.trim();
        if username.is_empty() || !email.contains('@') {
            return Ok(Err((User::from(row), "Username and a valid email are required.")));
        }

        let update = ProfileUpdate {
            username,
            email,
            image_url: non_empty(form.image_url.as_deref()).unwrap_or(DEFAULT_IMAGE_URL),
            header_image_url: non_empty(form.header_image_url.as_deref())
                .unwrap_or(DEFAULT_HEADER_IMAGE_URL),
            bio: non_empty(form.bio.as_deref()),
            location: non_empty(form.location.as_deref()),
        };

        match db.update_user(id, &update) {
            Ok(updated) => Ok(Ok(User::from(updated))),
            Err(err) => {
                let err = AppError::from(err);
                if err.is_user_correctable() {
                    Ok(Err((User::from(row), err_message(&err))))
                } else {
                    Err(err)
                }
            }
        }
    })
    .await?;

    match outcome {
        Ok(user) => {
            info!("Profile updated: {}", user.username);
            Ok(found(&format!("/users/{}", user.id)))
        }
        Err((user, message)) => {
            let page = render(&EditProfileTemplate {
                current: Some(me),
                user,
                error: Some(message.to_string()),
            })?;
            Ok((StatusCode::BAD_REQUEST, page).into_response())
        }
    }
}

fn err_message(err: &AppError) -> &'static str {
    match err {
        AppError::UsernameTaken => "Username already taken",
        AppError::EmailTaken => "Email already taken",
        _ => "Invalid profile details.",
    }
}

/// POST /users/delete: remove the account and everything hanging off it.
pub async fn delete_user(
    State(state): State<AppState>,
    Extension(me): Extension<CurrentUser>,
    jar: CookieJar,
) -> Result<Response, AppError> {
    let id = me.id;
    with_db(&state, move |db| Ok(db.delete_user(id)?)).await?;

    info!("User deleted: {}", me.username);
    Ok(logged_out(jar, "/signup"))
}
