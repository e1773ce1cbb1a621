use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use axum_extra::extract::cookie::CookieJar;
use jsonwebtoken::{DecodingKey, Validation, decode};
use tracing::warn;
use uuid::Uuid;

use warbler_types::api::Claims;

use crate::auth::{AppState, with_db};
use crate::error::AppError;

/// Cookie holding the signed session token.
pub const SESSION_COOKIE: &str = "curr_user";

/// The logged-in user, resolved from the session for this request only.
#[derive(Debug, Clone)]
pub struct CurrentUser {
    pub id: Uuid,
    pub username: String,
}

fn decode_claims(secret: &str, jar: &CookieJar) -> Option<Claims> {
    let token = jar.get(SESSION_COOKIE)?.value();
    match decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    ) {
        Ok(data) => Some(data.claims),
        Err(e) => {
            warn!("Rejected session token: {}", e);
            None
        }
    }
}

/// Resolve the session cookie to a user that still exists.
pub async fn session_user(
    state: &AppState,
    jar: &CookieJar,
) -> Result<Option<CurrentUser>, AppError> {
    let Some(claims) = decode_claims(&state.jwt_secret, jar) else {
        return Ok(None);
    };

    let user_id = claims.sub;
    let row = with_db(state, move |db| Ok(db.get_user_by_id(user_id)?)).await?;
    if row.is_none() {
        warn!("Session names missing user {}", user_id);
    }

    Ok(row.map(|row| CurrentUser {
        id: user_id,
        username: row.username,
    }))
}

/// Gate for pages that need a logged-in user. Without one the request is
/// redirected to the landing page; with one, `CurrentUser` is placed in the
/// request extensions.
pub async fn require_auth(
    State(state): State<AppState>,
    jar: CookieJar,
    mut req: Request,
    next: Next,
) -> Result<Response, AppError> {
    let user = session_user(&state, &jar)
        .await?
        .ok_or(AppError::Unauthorized)?;

    req.extensions_mut().insert(user);
    Ok(next.run(req).await)
}
