pub mod auth;
pub mod error;
pub mod messages;
pub mod middleware;
pub mod templates;
pub mod users;

use axum::{
    Router, middleware as axum_middleware,
    routing::{get, post},
};
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

use crate::auth::AppState;
use crate::middleware::require_auth;

/// Build the full application router over `state`.
pub fn router(state: AppState) -> Router {
    let public_routes = Router::new()
        .route("/", get(messages::home))
        .route("/signup", get(auth::signup_form).post(auth::signup_submit))
        .route("/login", get(auth::login_form).post(auth::login_submit))
        .route("/logout", post(auth::logout))
        .route("/users", get(users::list_users))
        .route("/messages/{message_id}", get(messages::show_message));

    let protected_routes = Router::new()
        .route("/users/profile", get(users::edit_profile_form).post(users::update_profile))
        .route("/users/delete", post(users::delete_user))
        .route("/users/follow/{user_id}", post(users::add_follow))
        .route("/users/stop-following/{user_id}", post(users::stop_following))
        .route("/users/add_like/{message_id}", post(messages::toggle_like))
        .route("/users/{user_id}", get(users::show_user))
        .route("/users/{user_id}/following", get(users::show_following))
        .route("/users/{user_id}/followers", get(users::show_followers))
        .route("/users/{user_id}/likes", get(users::show_likes))
        .route("/messages/new", get(messages::new_message_form).post(messages::create_message))
        .route("/messages/{message_id}/delete", post(messages::delete_message))
        .route("/like/{action}", post(messages::like_json))
        .route_layer(axum_middleware::from_fn_with_state(state.clone(), require_auth));

    let mut app = Router::new().merge(public_routes).merge(protected_routes);

    if let Some(dir) = &state.static_dir {
        app = app.nest_service("/static", ServeDir::new(dir));
    }

    app.layer(TraceLayer::new_for_http()).with_state(state)
}
