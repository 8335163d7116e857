use crate::{AppState, handlers::user};
use axum::{
    Router,
    routing::{get, post, put},
};

/// User Router
///
/// Login is the only public endpoint; everything else requires a verified
/// principal. "Delete" is a deactivation toggle, never a row removal.
///
/// The static segments (`/login`, `/auth`, `/changePassword`) are registered
/// alongside the `{userId}` captures; axum resolves static paths with
/// priority, so `PUT /changePassword` never collides with `PUT /{userId}`.
pub fn user_routes() -> Router<AppState> {
    Router::new()
        // GET /api/user/ (paginated listing)  |  POST /api/user/ (register)
        .route("/", get(user::get_users).post(user::create_user))
        // POST /api/user/login
        .route("/login", post(user::login))
        // GET /api/user/auth  (current principal)
        .route("/auth", get(user::get_auth_user))
        // PUT /api/user/changePassword
        .route("/changePassword", put(user::change_password))
        // GET | PUT | DELETE (toggle active) /api/user/{userId}
        .route(
            "/{userId}",
            get(user::get_user_by_id)
                .put(user::update_user)
                .delete(user::toggle_user_active),
        )
}
