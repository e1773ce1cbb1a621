use std::path::PathBuf;
use std::sync::Arc;

use anyhow::anyhow;
use argon2::{
    Argon2, PasswordHash, PasswordHasher, PasswordVerifier,
    password_hash::{SaltString, rand_core::OsRng},
};
use axum::{
    Form,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use jsonwebtoken::{EncodingKey, Header, encode};
use tracing::{error, info};
use uuid::Uuid;

use warbler_db::Database;
use warbler_db::models::{NewUser, UserRow};
use warbler_types::api::{Claims, LoginForm, SignupForm};

use crate::error::{AppError, found};
use crate::middleware::{SESSION_COOKIE, session_user};
use crate::templates::{LoginTemplate, SignupTemplate, render};

const MIN_PASSWORD_LEN: usize = 6;
const SESSION_DAYS: i64 = 30;

pub type AppState = Arc<AppStateInner>;

pub struct AppStateInner {
    pub db: Database,
    pub jwt_secret: String,
    /// Directory served under `/static`, if any.
    pub static_dir: Option<PathBuf>,
}

/// Run blocking store work off the async runtime.
pub async fn with_db<F, T>(state: &AppState, f: F) -> Result<T, AppError>
where
    F: FnOnce(&Database) -> Result<T, AppError> + Send + 'static,
    T: Send + 'static,
{
    let state = state.clone();
    tokio::task::spawn_blocking(move || f(&state.db))
        .await
        .map_err(|e| {
            error!("spawn_blocking join error: {}", e);
            AppError::Internal(anyhow!("blocking task failed: {e}"))
        })?
}

// -- Credentials --

/// Hash with Argon2id and a fresh random salt. Returns the PHC string.
pub fn hash_password(password: &str) -> anyhow::Result<String> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| anyhow!("password hashing failed: {e}"))?;
    Ok(hash.to_string())
}

/// True iff `password` matches the stored hash. A wrong password or an
/// unreadable hash is simply `false`.
pub fn verify_password(user: &UserRow, password: &str) -> bool {
    let Ok(parsed) = PasswordHash::new(&user.password) else {
        return false;
    };
    Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .is_ok()
}

/// Create an account. Duplicate usernames and emails come back as
/// `AppError::UsernameTaken` / `AppError::EmailTaken`.
pub fn signup(
    db: &Database,
    username: &str,
    email: &str,
    password: &str,
    image_url: Option<&str>,
) -> Result<UserRow, AppError> {
    let username = username.trim();
    let email = email.trim();

    if username.is_empty() {
        return Err(AppError::Validation("Username is required".into()));
    }
    if !email.contains('@') {
        return Err(AppError::Validation("A valid email is required".into()));
    }
    if password.len() < MIN_PASSWORD_LEN {
        return Err(AppError::Validation(format!(
            "Password must be at least {MIN_PASSWORD_LEN} characters"
        )));
    }

    let password_hash = hash_password(password)?;
    let user = db.create_user(&NewUser {
        id: Uuid::new_v4(),
        username,
        email,
        password_hash: &password_hash,
        image_url,
    })?;

    info!("New user signed up: {}", user.username);
    Ok(user)
}

/// The user named `username` if `password` verifies, `None` otherwise.
/// Unknown user and wrong password are indistinguishable to the caller.
pub fn authenticate(
    db: &Database,
    username: &str,
    password: &str,
) -> Result<Option<UserRow>, AppError> {
    let Some(user) = db.get_user_by_username(username.trim())? else {
        return Ok(None);
    };
    Ok(verify_password(&user, password).then_some(user))
}

pub fn create_token(secret: &str, user_id: Uuid, username: &str) -> anyhow::Result<String> {
    let exp = (chrono::Utc::now() + chrono::Duration::days(SESSION_DAYS)).timestamp();
    let claims = Claims {
        sub: user_id,
        username: username.to_string(),
        exp: usize::try_from(exp)?,
    };

    let token = encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )?;

    Ok(token)
}

fn session_cookie(token: String) -> Cookie<'static> {
    Cookie::build((SESSION_COOKIE, token))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .build()
}

fn clear_session(jar: CookieJar) -> CookieJar {
    jar.remove(Cookie::build(SESSION_COOKIE).path("/"))
}

/// Log `user` in by attaching a fresh session cookie to `jar`.
fn start_session(state: &AppState, jar: CookieJar, user: &UserRow) -> Result<CookieJar, AppError> {
    let user_id: Uuid = user
        .id
        .parse()
        .map_err(|e| anyhow!("corrupt user id '{}': {e}", user.id))?;
    let token = create_token(&state.jwt_secret, user_id, &user.username)?;
    Ok(jar.add(session_cookie(token)))
}

// -- Handlers --

pub async fn signup_form(
    State(state): State<AppState>,
    jar: CookieJar,
) -> Result<Response, AppError> {
    if session_user(&state, &jar).await?.is_some() {
        return Ok(found("/"));
    }
    Ok(render(&SignupTemplate::default())?.into_response())
}

pub async fn signup_submit(
    State(state): State<AppState>,
    jar: CookieJar,
    Form(form): Form<SignupForm>,
) -> Result<Response, AppError> {
    let username = form.username.clone();
    let email = form.email.clone();

    let created = with_db(&state, move |db| {
        signup(
            db,
            &form.username,
            &form.email,
            &form.password,
            form.image_url.as_deref(),
        )
    })
    .await;

    match created {
        Ok(user) => {
            let jar = start_session(&state, jar, &user)?;
            Ok((jar, found("/")).into_response())
        }
        Err(err) if err.is_user_correctable() => {
            let page = render(&SignupTemplate {
                current: None,
                error: Some(err.to_string()),
                username,
                email,
            })?;
            Ok((StatusCode::BAD_REQUEST, page).into_response())
        }
        Err(err) => Err(err),
    }
}

pub async fn login_form(
    State(state): State<AppState>,
    jar: CookieJar,
) -> Result<Response, AppError> {
    if session_user(&state, &jar).await?.is_some() {
        return Ok(found("/"));
    }
    Ok(render(&LoginTemplate::default())?.into_response())
}

pub async fn login_submit(
    State(state): State<AppState>,
    jar: CookieJar,
    Form(form): Form<LoginForm>,
) -> Result<Response, AppError> {
    let user = with_db(&state, move |db| {
        authenticate(db, &form.username, &form.password)
    })
    .await?;

    match user {
        Some(user) => {
            info!("User logged in: {}", user.username);
            let jar = start_session(&state, jar, &user)?;
            Ok((jar, found("/")).into_response())
        }
        None => Ok(render(&LoginTemplate {
            current: None,
            error: Some("Invalid credentials.".into()),
        })?
        .into_response()),
    }
}

pub async fn logout(jar: CookieJar) -> Response {
    logged_out(jar, "/login")
}

/// Drop the session cookie and redirect.
pub(crate) fn logged_out(jar: CookieJar, location: &str) -> Response {
    (clear_session(jar), found(location)).into_response()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_signup_hashes_password() {
        let db = Database::open_in_memory().unwrap();
        let user = signup(&db, "newbuser", "newbie@nb.com", "noobstyle", None).unwrap();

        assert_eq!(user.username, "newbuser");
        assert_eq!(user.email, "newbie@nb.com");
        assert_ne!(user.password, "noobstyle");
        assert!(user.password.starts_with("$argon2id$"));
    }

    #[test]
    fn test_signup_duplicates_are_typed() {
        let db = Database::open_in_memory().unwrap();
        signup(&db, "newbuser", "newbie@nb.com", "noobstyle", None).unwrap();

        let err = signup(&db, "newbuser", "other@nb.com", "noobstyle", None).unwrap_err();
        assert!(matches!(err, AppError::UsernameTaken));

        let err = signup(&db, "other", "newbie@nb.com", "noobstyle", None).unwrap_err();
        assert!(matches!(err, AppError::EmailTaken));
    }

    #[test]
    fn test_signup_validation() {
        let db = Database::open_in_memory().unwrap();
        let err = signup(&db, "newbuser", "newbie@nb.com", "short", None).unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));

        let err = signup(&db, "  ", "newbie@nb.com", "noobstyle", None).unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));

        let err = signup(&db, "newbuser", "not-an-email", "noobstyle", None).unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[test]
    fn test_verify_password() {
        let db = Database::open_in_memory().unwrap();
        let user = signup(&db, "newbuser", "newbie@nb.com", "noobstyle", None).unwrap();

        assert!(verify_password(&user, "noobstyle"));
        assert!(!verify_password(&user, "noobstyle "));
        assert!(!verify_password(&user, ""));

        let mut corrupt = user.clone();
        corrupt.password = "HASHED_PASSWORD".into();
        assert!(!verify_password(&corrupt, "HASHED_PASSWORD"));
    }

    #[test]
    fn test_authenticate() {
        let db = Database::open_in_memory().unwrap();
        signup(&db, "newbuser", "newbie@nb.com", "noobstyle", None).unwrap();

        let user = authenticate(&db, "newbuser", "noobstyle").unwrap().unwrap();
        assert_eq!(user.username, "newbuser");

        assert!(authenticate(&db, "newbuser", "wrong").unwrap().is_none());
        assert!(authenticate(&db, "nobody", "noobstyle").unwrap().is_none());
    }

    #[test]
    fn test_authenticate_trims_username() {
        let db = Database::open_in_memory().unwrap();
        let user = signup(&db, " newbuser ", "newbie@nb.com", "noobstyle", None).unwrap();
        assert_eq!(user.username, "newbuser");

        let found = authenticate(&db, " newbuser ", "noobstyle").unwrap().unwrap();
        assert_eq!(found.id, user.id);
        assert!(authenticate(&db, " newbuser ", " noobstyle ").unwrap().is_none());
    }

    #[test]
    fn test_token_round_trip() {
        use jsonwebtoken::{DecodingKey, Validation, decode};

        let id = Uuid::new_v4();
        let token = create_token("secret", id, "newbuser").unwrap();
        let data = decode::<Claims>(
            &token,
            &DecodingKey::from_secret(b"secret"),
            &Validation::default(),
        )
        .unwrap();
        assert_eq!(data.claims.sub, id);
        assert_eq!(data.claims.username, "newbuser");
    }
}
