use axum::{
    extract::{FromRef, FromRequestParts},
    http::{header, request::Parts},
};
use chrono::{Duration, Utc};
use jsonwebtoken::{
    DecodingKey, EncodingKey, Header, Validation, decode, encode, errors::ErrorKind,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    config::{AppConfig, Env},
    error::ApiError,
    repository::RepositoryState,
};

/// Token lifetime for sessions issued at login.
const TOKEN_TTL_HOURS: i64 = 24;

/// Claims
///
/// Payload structure carried inside every JWT this service issues and
/// accepts. `sub` is mandatory: a structurally valid token without a subject
/// fails deserialization inside `decode` and is rejected as unauthenticated,
/// never left in an ambiguous half-authenticated state.
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    /// Subject: the UUID of the user this token was issued to.
    pub sub: Uuid,
    /// Expiration time, seconds since the epoch. Always validated.
    pub exp: usize,
    /// Issued-at time, seconds since the epoch.
    pub iat: usize,
}

impl Claims {
    pub fn new(user_id: Uuid) -> Self {
        let now = Utc::now();
        let exp = now + Duration::hours(TOKEN_TTL_HOURS);
        Self {
            sub: user_id,
            exp: exp.timestamp() as usize,
            iat: now.timestamp() as usize,
        }
    }
}

/// Signs a token for the given user. Called by the login handler after the
/// password check succeeds.
pub fn issue_token(user_id: Uuid, secret: &str) -> Result<String, ApiError> {
    let key = EncodingKey::from_secret(secret.as_bytes());
    encode(&Header::default(), &Claims::new(user_id), &key).map_err(|e| {
        tracing::error!("token generation failed: {:?}", e);
        ApiError::Persistence("Something went wrong".to_string())
    })
}

/// Hashes a plaintext password with bcrypt at the library's default cost.
pub fn hash_password(password: &str) -> Result<String, ApiError> {
    bcrypt::hash(password, bcrypt::DEFAULT_COST).map_err(|e| {
        tracing::error!("password hashing failed: {:?}", e);
        ApiError::Persistence("Something went wrong".to_string())
    })
}

/// Compares a plaintext password against a stored bcrypt hash.
pub fn verify_password(password: &str, hash: &str) -> Result<bool, ApiError> {
    bcrypt::verify(password, hash).map_err(|e| {
        tracing::error!("password verification failed: {:?}", e);
        ApiError::Persistence("Something went wrong".to_string())
    })
}

/// AuthUser
///
/// The authenticated principal resolved from a verified bearer token: the
/// user's identity with the password hash stripped. It lives for the duration
/// of one request and is threaded into handlers as an extractor argument,
/// never stashed in ambient request state.
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    pub is_active: bool,
}

/// AuthUser Extractor Implementation
///
/// Makes `AuthUser` usable as a handler argument on any protected route.
/// The flow: resolve dependencies from state, honor the local dev bypass,
/// extract and verify the bearer token, then perform exactly one user lookup.
///
/// Every failure path resolves to an explicit [`ApiError`]:
/// missing/malformed header or invalid/expired/subject-less token → 401;
/// valid token whose user has since been removed → 404.
impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
    RepositoryState: FromRef<S>,
    AppConfig: FromRef<S>,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let repo = RepositoryState::from_ref(state);
        let config = AppConfig::from_ref(state);

        // Local development bypass: a known user id in the `x-user-id` header
        // stands in for a full token. Only honored when running Env::Local,
        // and only for an id that resolves to a real row.
        if config.env == Env::Local {
            if let Some(user_id_header) = parts.headers.get("x-user-id") {
                if let Ok(id_str) = user_id_header.to_str() {
                    if let Ok(user_id) = Uuid::parse_str(id_str) {
                        if let Ok(Some(user)) = repo.find_user(user_id).await {
                            return Ok(AuthUser {
                                id: user.id,
                                username: user.username,
                                email: user.email,
                                is_active: user.is_active,
                            });
                        }
                    }
                }
            }
        }
        // In production, or when the bypass did not resolve, fall through to
        // the standard bearer-token flow.

        let auth_header = parts
            .headers
            .get(header::AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .ok_or_else(|| ApiError::Unauthenticated("Not authorized".to_string()))?;

        let token = auth_header
            .strip_prefix("Bearer ")
            .ok_or_else(|| ApiError::Unauthenticated("Not authorized".to_string()))?;

        let decoding_key = DecodingKey::from_secret(config.jwt_secret.as_bytes());

        let mut validation = Validation::default();
        validation.validate_exp = true;

        let token_data = match decode::<Claims>(token, &decoding_key, &validation) {
            Ok(data) => data,
            Err(e) => {
                return Err(match e.kind() {
                    ErrorKind::ExpiredSignature => {
                        ApiError::Unauthenticated("Token expired".to_string())
                    }
                    // Bad signature, malformed token, missing subject claim.
                    _ => ApiError::Unauthenticated("Invalid token".to_string()),
                });
            }
        };

        let user_id = token_data.claims.sub;

        // Exactly one lookup against the user store. A valid token for a
        // user that no longer exists is a distinct outcome from a bad token.
        let user = repo
            .find_user(user_id)
            .await?
            .ok_or_else(|| ApiError::PrincipalNotFound("User does not exist".to_string()))?;

        Ok(AuthUser {
            id: user.id,
            username: user.username,
            email: user.email,
            is_active: user.is_active,
        })
    }
}
