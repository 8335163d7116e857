use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use ts_rs::TS;
use utoipa::ToSchema;
use uuid::Uuid;

// --- Core Application Schemas (Mapped to Database) ---

/// User
///
/// Canonical identity record from the `users` table. This struct carries the
/// password hash and is therefore internal only: it is never serialized into
/// a response. Handlers return [`PublicUser`] instead.
#[derive(Debug, Clone, FromRow, Default)]
pub struct User {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    pub password_hash: String,
    // Soft-delete flag. Users are deactivated, never removed.
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// PublicUser
///
/// The externally visible projection of a user. The password hash (and any
/// other internal bookkeeping column) simply has no field here, so it cannot
/// leak through any listing or lookup.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, FromRow, Default)]
#[ts(export)]
pub struct PublicUser {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    pub is_active: bool,
    #[ts(type = "string")]
    pub created_at: DateTime<Utc>,
    #[ts(type = "string")]
    pub updated_at: DateTime<Utc>,
}

impl From<User> for PublicUser {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            username: user.username,
            email: user.email,
            is_active: user.is_active,
            created_at: user.created_at,
            updated_at: user.updated_at,
        }
    }
}

/// Banner
///
/// A promotional banner from the `banners` table.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, FromRow, Default)]
#[ts(export)]
pub struct Banner {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    // Durable URL on the media store.
    pub image: String,
    pub price: f64,
    pub background: String,
    // Owning user. Nullable for rows created before ownership tracking;
    // updates backfill it from the authenticated principal.
    pub user_id: Option<Uuid>,
    #[ts(type = "string")]
    pub created_at: DateTime<Utc>,
    #[ts(type = "string")]
    pub updated_at: DateTime<Utc>,
}

/// Producto
///
/// A catalog product from the `productos` table.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, FromRow, Default)]
#[ts(export)]
pub struct Producto {
    pub id: Uuid,
    pub description: String,
    pub image: String,
    pub price: f64,
    pub stock: i32,
    pub user_id: Option<Uuid>,
    #[ts(type = "string")]
    pub created_at: DateTime<Utc>,
    #[ts(type = "string")]
    pub updated_at: DateTime<Utc>,
}

/// Service
///
/// An offered service from the `services` table.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, FromRow, Default)]
#[ts(export)]
pub struct Service {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub image: String,
    pub price: f64,
    pub user_id: Option<Uuid>,
    #[ts(type = "string")]
    pub created_at: DateTime<Utc>,
    #[ts(type = "string")]
    pub updated_at: DateTime<Utc>,
}

// --- Detail Projections (get-by-id responses) ---

/// Field-limited banner projection returned by the detail endpoint.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, FromRow, Default)]
#[ts(export)]
pub struct BannerView {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub price: f64,
    pub background: String,
    pub image: String,
}

/// Field-limited producto projection returned by the detail endpoint.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, FromRow, Default)]
#[ts(export)]
pub struct ProductoView {
    pub id: Uuid,
    pub description: String,
    pub price: f64,
    pub image: String,
}

/// Field-limited service projection returned by the detail endpoint.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, FromRow, Default)]
#[ts(export)]
pub struct ServiceView {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub price: f64,
    pub image: String,
}

// --- Repository Inputs (parsed multipart form data) ---

// These are not wire types: the image-bearing resources accept multipart
// forms, which the handlers parse field by field before building one of
// these for the repository.

#[derive(Debug, Clone, Default)]
pub struct NewBanner {
    pub title: String,
    pub description: String,
    pub price: f64,
    pub background: Option<String>,
    pub image: String,
    pub user_id: Uuid,
}

#[derive(Debug, Clone, Default)]
pub struct BannerChanges {
    pub title: String,
    pub description: String,
    pub price: f64,
    pub background: Option<String>,
    // Only replaced when a new file was uploaded.
    pub image: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct NewProducto {
    pub description: String,
    pub price: f64,
    pub stock: i32,
    pub image: String,
    pub user_id: Uuid,
}

#[derive(Debug, Clone, Default)]
pub struct ProductoChanges {
    pub description: String,
    pub price: f64,
    pub stock: i32,
    pub image: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct NewService {
    pub title: String,
    pub description: String,
    pub price: f64,
    pub image: String,
    pub user_id: Uuid,
}

#[derive(Debug, Clone, Default)]
pub struct ServiceChanges {
    pub title: String,
    pub description: String,
    pub price: f64,
    pub image: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct NewUser {
    pub username: String,
    pub email: String,
    pub password_hash: String,
}

// --- Request Payloads (JSON input schemas, user routes) ---

/// Input payload for user registration (POST /api/user/).
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct CreateUserRequest {
    pub username: String,
    pub email: String,
    pub password: String,
}

/// Input payload for login (POST /api/user/login).
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

/// Input payload for updating a user's profile (PUT /api/user/{userId}).
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct UpdateUserRequest {
    pub username: String,
    pub email: String,
    pub is_active: bool,
}

/// Input payload for rotating a password (PUT /api/user/changePassword).
/// The caller must re-supply their current password.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct ChangePasswordRequest {
    pub old_password: String,
    pub password: String,
}

/// Response for the deactivation toggle (DELETE /api/user/{userId}).
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct ToggleUserResponse {
    pub message: String,
    pub user: PublicUser,
}
