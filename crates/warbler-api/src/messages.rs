use std::collections::HashSet;

use axum::{
    Extension, Form, Json,
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_extra::extract::cookie::CookieJar;
use serde::Deserialize;
use tracing::info;
use uuid::Uuid;

use warbler_types::MAX_MESSAGE_LEN;
use warbler_types::api::MessageForm;
use warbler_types::models::User;

use crate::auth::{AppState, with_db};
use crate::error::{AppError, found, parse_id};
use crate::middleware::{CurrentUser, session_user};
use crate::templates::{
    AnonHomeTemplate, HomeTemplate, MessageShowTemplate, MessageView, NewMessageTemplate, render,
};

const FEED_LIMIT: u32 = 100;

/// GET /: the home feed for a logged-in user, the landing page otherwise.
pub async fn home(State(state): State<AppState>, jar: CookieJar) -> Result<Response, AppError> {
    let Some(me) = session_user(&state, &jar).await? else {
        return Ok(render(&AnonHomeTemplate::default())?.into_response());
    };

    let id = me.id;
    let (user, stats, messages) = with_db(&state, move |db| {
        let row = db.get_user_by_id(id)?.ok_or(AppError::NotFound)?;
        let stats = db.profile_stats(id)?;
        let liked = db.liked_message_ids(id)?;
        let rows = db.home_feed(id, FEED_LIMIT)?;
        Ok((User::from(row), stats, MessageView::from_rows(rows, &liked)))
    })
    .await?;

    Ok(render(&HomeTemplate {
        current: Some(me),
        user,
        stats,
        messages,
    })?
    .into_response())
}

/// GET /messages/new
pub async fn new_message_form(Extension(me): Extension<CurrentUser>) -> Result<Response, AppError> {
    Ok(render(&NewMessageTemplate {
        current: Some(me),
        ..Default::default()
    })?
    .into_response())
}

fn validate_text(text: &str) -> Result<&str, AppError> {
    let text = text.trim();
    if text.is_empty() {
        return Err(AppError::Validation("Message cannot be empty".into()));
    }
    if text.chars().count() > MAX_MESSAGE_LEN {
        return Err(AppError::Validation(format!(
            "Message cannot be longer than {MAX_MESSAGE_LEN} characters"
        )));
    }
    Ok(text)
}

/// POST /messages/new
pub async fn create_message(
    State(state): State<AppState>,
    Extension(me): Extension<CurrentUser>,
    Form(form): Form<MessageForm>,
) -> Result<Response, AppError> {
    let text = match validate_text(&form.text).map(str::to_string) {
        Ok(text) => text,
        Err(err) => {
            let page = render(&NewMessageTemplate {
                current: Some(me),
                error: Some(err.to_string()),
                text: form.text,
            })?;
            return Ok((StatusCode::BAD_REQUEST, page).into_response());
        }
    };

    let author = me.id;
    let message = with_db(&state, move |db| {
        Ok(db.insert_message(Uuid::new_v4(), author, &text)?)
    })
    .await?;

    info!("Message {} posted by {}", message.id, me.username);
    Ok(found(&format!("/users/{}", me.id)))
}

/// GET /messages/{message_id}
pub async fn show_message(
    State(state): State<AppState>,
    jar: CookieJar,
    Path(message_id): Path<String>,
) -> Result<Response, AppError> {
    let message_id = parse_id(&message_id)?;
    let current = session_user(&state, &jar).await?;
    let viewer = current.as_ref().map(|me| me.id);

    let view = with_db(&state, move |db| {
        let row = db.get_message(message_id)?.ok_or(AppError::NotFound)?;
        let liked = match viewer {
            Some(viewer) => db.liked_message_ids(viewer)?,
            None => HashSet::new(),
        };
        MessageView::from_rows(vec![row], &liked)
            .pop()
            .ok_or(AppError::NotFound)
    })
    .await?;

    let is_author = viewer == Some(view.message.author_id);
    Ok(render(&MessageShowTemplate {
        current,
        view,
        is_author,
    })?
    .into_response())
}

/// POST /messages/{message_id}/delete: only the author may delete.
pub async fn delete_message(
    State(state): State<AppState>,
    Extension(me): Extension<CurrentUser>,
    Path(message_id): Path<String>,
) -> Result<Response, AppError> {
    let message_id = parse_id(&message_id)?;
    let requester = me.id;
    with_db(&state, move |db| {
        let row = db.get_message(message_id)?.ok_or(AppError::NotFound)?;
        if row.user_id != requester.to_string() {
            return Err(AppError::Forbidden);
        }
        db.delete_message(message_id, requester)?;
        Ok(())
    })
    .await?;

    Ok(found(&format!("/users/{}", me.id)))
}

/// POST /users/add_like/{message_id}: star or unstar a message.
pub async fn toggle_like(
    State(state): State<AppState>,
    Extension(me): Extension<CurrentUser>,
    Path(message_id): Path<String>,
) -> Result<Response, AppError> {
    let message_id = parse_id(&message_id)?;
    let user = me.id;
    with_db(&state, move |db| {
        db.get_message(message_id)?.ok_or(AppError::NotFound)?;
        Ok(db.toggle_like(user, message_id)?)
    })
    .await?;

    Ok(found("/"))
}

#[derive(Debug, Deserialize)]
pub struct LikeRequest {
    pub message_id: Uuid,
}

/// POST /like/{action} with `action` in {add, remove}. Used by the star
/// button script; answers JSON instead of redirecting.
pub async fn like_json(
    State(state): State<AppState>,
    Extension(me): Extension<CurrentUser>,
    Path(action): Path<String>,
    Form(req): Form<LikeRequest>,
) -> Result<impl IntoResponse, AppError> {
    let add = match action.as_str() {
        "add" => true,
        "remove" => false,
        _ => return Err(AppError::NotFound),
    };

    let user = me.id;
    let message_id = req.message_id;
    let likes = with_db(&state, move |db| {
        db.get_message(message_id)?.ok_or(AppError::NotFound)?;
        if add {
            db.like(user, message_id)?;
        } else {
            db.unlike(user, message_id)?;
        }
        Ok(db.get_number_of_likes(user)?)
    })
    .await?;

    Ok(Json(serde_json::json!({
        "message_id": message_id,
        "liked": add,
        "likes": likes,
    })))
}
