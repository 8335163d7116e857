use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use uuid::Uuid;

use crate::{
    AppState,
    auth::{self, AuthUser},
    error::ApiError,
    models::{
        ChangePasswordRequest, CreateUserRequest, LoginRequest, NewUser, PublicUser,
        ToggleUserResponse, UpdateUserRequest,
    },
    pagination::{ListQuery, PageEnvelope, PageParams},
};

/// get_users
///
/// [Authenticated Route] Paginated, searchable user listing. The search term
/// matches username and email as case-insensitive substrings; the projection
/// never includes the password hash.
#[utoipa::path(
    get,
    path = "/api/user/",
    params(PageParams),
    responses((status = 200, description = "One page of users", body = PageEnvelope<PublicUser>))
)]
pub async fn get_users(
    _auth: AuthUser,
    State(state): State<AppState>,
    Query(params): Query<PageParams>,
) -> Result<Json<PageEnvelope<PublicUser>>, ApiError> {
    let query = ListQuery::from_params(params);
    Ok(Json(state.repo.paginate_users(&query).await?))
}

/// create_user
///
/// [Authenticated Route] Registers a new account. The username must be
/// unique; the password is hashed before it ever reaches the repository.
#[utoipa::path(
    post,
    path = "/api/user/",
    request_body = CreateUserRequest,
    responses(
        (status = 201, description = "Registered"),
        (status = 409, description = "Username already registered")
    )
)]
pub async fn create_user(
    _auth: AuthUser,
    State(state): State<AppState>,
    Json(payload): Json<CreateUserRequest>,
) -> Result<(StatusCode, &'static str), ApiError> {
    if state
        .repo
        .find_user_by_username(&payload.username)
        .await?
        .is_some()
    {
        return Err(ApiError::Conflict(
            "A user with that username is already registered".to_string(),
        ));
    }

    let password_hash = auth::hash_password(&payload.password)?;

    state
        .repo
        .create_user(NewUser {
            username: payload.username,
            email: payload.email,
            password_hash,
        })
        .await?;

    Ok((StatusCode::CREATED, "User registered successfully"))
}

/// login
///
/// [Public Route] Verifies a username/password pair and returns a signed
/// token (raw string body). Unknown usernames and wrong passwords are
/// deliberately indistinguishable to the caller.
#[utoipa::path(
    post,
    path = "/api/user/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Signed token"),
        (status = 401, description = "Invalid credentials")
    )
)]
pub async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> Result<String, ApiError> {
    let user = state
        .repo
        .find_user_by_username(&payload.username)
        .await?
        .ok_or_else(|| ApiError::Unauthenticated("Invalid username or password".to_string()))?;

    if !auth::verify_password(&payload.password, &user.password_hash)? {
        return Err(ApiError::Unauthenticated(
            "Invalid username or password".to_string(),
        ));
    }

    auth::issue_token(user.id, &state.config.jwt_secret)
}

/// get_auth_user
///
/// [Authenticated Route] Returns the profile of the calling principal.
#[utoipa::path(
    get,
    path = "/api/user/auth",
    responses((status = 200, description = "Current user", body = PublicUser))
)]
pub async fn get_auth_user(
    AuthUser { id, .. }: AuthUser,
    State(state): State<AppState>,
) -> Result<Json<PublicUser>, ApiError> {
    state
        .repo
        .get_public_user(id)
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::PrincipalNotFound("User does not exist".to_string()))
}

/// get_user_by_id
///
/// [Authenticated Route] Fetches one user by id, password excluded.
#[utoipa::path(
    get,
    path = "/api/user/{userId}",
    params(("userId" = Uuid, Path, description = "User ID")),
    responses(
        (status = 200, description = "Found", body = PublicUser),
        (status = 404, description = "Not Found")
    )
)]
pub async fn get_user_by_id(
    _auth: AuthUser,
    State(state): State<AppState>,
    Path(user_id): Path<Uuid>,
) -> Result<Json<PublicUser>, ApiError> {
    state
        .repo
        .get_public_user(user_id)
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::NotFound("User not found".to_string()))
}

/// update_user
///
/// [Authenticated Route] Updates a user's username, email and active flag.
/// Rejects a username already held by a different account.
#[utoipa::path(
    put,
    path = "/api/user/{userId}",
    params(("userId" = Uuid, Path, description = "User ID")),
    request_body = UpdateUserRequest,
    responses(
        (status = 201, description = "Updated"),
        (status = 404, description = "Not Found"),
        (status = 409, description = "Username already registered")
    )
)]
pub async fn update_user(
    _auth: AuthUser,
    State(state): State<AppState>,
    Path(user_id): Path<Uuid>,
    Json(payload): Json<UpdateUserRequest>,
) -> Result<(StatusCode, &'static str), ApiError> {
    if state
        .repo
        .username_taken_by_other(&payload.username, user_id)
        .await?
    {
        return Err(ApiError::Conflict(
            "A user with that username is already registered".to_string(),
        ));
    }

    state
        .repo
        .update_user(user_id, &payload)
        .await?
        .ok_or_else(|| ApiError::NotFound("User not found".to_string()))?;

    Ok((StatusCode::CREATED, "User updated successfully"))
}

/// toggle_user_active
///
/// [Authenticated Route] The "delete" operation for users: flips the active
/// flag instead of removing the row, and returns the updated record.
#[utoipa::path(
    delete,
    path = "/api/user/{userId}",
    params(("userId" = Uuid, Path, description = "User ID")),
    responses(
        (status = 200, description = "Active state toggled", body = ToggleUserResponse),
        (status = 404, description = "Not Found")
    )
)]
pub async fn toggle_user_active(
    _auth: AuthUser,
    State(state): State<AppState>,
    Path(user_id): Path<Uuid>,
) -> Result<Json<ToggleUserResponse>, ApiError> {
    let user = state
        .repo
        .toggle_user_active(user_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("User not found".to_string()))?;

    Ok(Json(ToggleUserResponse {
        message: "User active state updated".to_string(),
        user,
    }))
}

/// change_password
///
/// [Authenticated Route] Rotates the caller's password. The current password
/// must be re-supplied and verified first; a mismatch leaves the stored hash
/// untouched.
#[utoipa::path(
    put,
    path = "/api/user/changePassword",
    request_body = ChangePasswordRequest,
    responses(
        (status = 201, description = "Password updated"),
        (status = 409, description = "Current password incorrect")
    )
)]
pub async fn change_password(
    AuthUser { id, .. }: AuthUser,
    State(state): State<AppState>,
    Json(payload): Json<ChangePasswordRequest>,
) -> Result<(StatusCode, &'static str), ApiError> {
    let user = state
        .repo
        .find_user(id)
        .await?
        .ok_or_else(|| ApiError::PrincipalNotFound("User does not exist".to_string()))?;

    if !auth::verify_password(&payload.old_password, &user.password_hash)? {
        return Err(ApiError::Conflict(
            "The current password is incorrect".to_string(),
        ));
    }

    let password_hash = auth::hash_password(&payload.password)?;

    if !state.repo.set_user_password(id, &password_hash).await? {
        return Err(ApiError::Persistence("Something went wrong".to_string()));
    }

    Ok((StatusCode::CREATED, "Password updated successfully"))
}
