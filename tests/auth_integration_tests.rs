use async_trait::async_trait;
use axum::{
    extract::FromRequestParts,
    http::{Method, Request, StatusCode, Uri, header, request::Parts},
};
use chrono::Utc;
use jsonwebtoken::{EncodingKey, Header, encode};
use mercado_api::{
    AppConfig, AppState, MockMediaStore,
    auth::{AuthUser, Claims},
    config::Env,
    error::ApiError,
    models::{
        Banner, BannerChanges, BannerView, NewBanner, NewProducto, NewService, NewUser, Producto,
        ProductoChanges, ProductoView, PublicUser, Service, ServiceChanges, ServiceView,
        UpdateUserRequest, User,
    },
    pagination::{ListQuery, PageEnvelope},
    repository::Repository,
};
use serde::Serialize;
use std::sync::Arc;
use uuid::Uuid;

// --- Mock Repository for Auth Logic ---

/// Only `find_user` matters here: the extractor performs exactly one user
/// lookup. Every other method is an inert placeholder.
#[derive(Default)]
struct MockAuthRepo {
    user_to_return: Option<User>,
}

#[async_trait]
impl Repository for MockAuthRepo {
    async fn find_user(&self, _id: Uuid) -> Result<Option<User>, sqlx::Error> {
        Ok(self.user_to_return.clone())
    }

    // --- Placeholders for the rest of the contract ---
    async fn list_banners(&self) -> Result<Vec<Banner>, sqlx::Error> {
        Ok(vec![])
    }
    async fn paginate_banners(
        &self,
        _query: &ListQuery,
    ) -> Result<PageEnvelope<Banner>, sqlx::Error> {
        Ok(PageEnvelope::default())
    }
    async fn get_banner(&self, _id: Uuid) -> Result<Option<BannerView>, sqlx::Error> {
        Ok(None)
    }
    async fn find_banner(&self, _id: Uuid) -> Result<Option<Banner>, sqlx::Error> {
        Ok(None)
    }
    async fn create_banner(&self, _banner: NewBanner) -> Result<Banner, sqlx::Error> {
        panic!("Stub called")
    }
    async fn update_banner(
        &self,
        _id: Uuid,
        _changes: BannerChanges,
        _owner: Uuid,
    ) -> Result<Option<Banner>, sqlx::Error> {
        Ok(None)
    }
    async fn list_productos(&self) -> Result<Vec<Producto>, sqlx::Error> {
        Ok(vec![])
    }
    async fn paginate_productos(
        &self,
        _query: &ListQuery,
    ) -> Result<PageEnvelope<Producto>, sqlx::Error> {
        Ok(PageEnvelope::default())
    }
    async fn get_producto(&self, _id: Uuid) -> Result<Option<ProductoView>, sqlx::Error> {
        Ok(None)
    }
    async fn find_producto(&self, _id: Uuid) -> Result<Option<Producto>, sqlx::Error> {
        Ok(None)
    }
    async fn create_producto(&self, _producto: NewProducto) -> Result<Producto, sqlx::Error> {
        panic!("Stub called")
    }
    async fn update_producto(
        &self,
        _id: Uuid,
        _changes: ProductoChanges,
        _owner: Uuid,
    ) -> Result<Option<Producto>, sqlx::Error> {
        Ok(None)
    }
    async fn delete_producto(&self, _id: Uuid) -> Result<Option<Producto>, sqlx::Error> {
        Ok(None)
    }
    async fn list_services(&self) -> Result<Vec<Service>, sqlx::Error> {
        Ok(vec![])
    }
    async fn paginate_services(
        &self,
        _query: &ListQuery,
    ) -> Result<PageEnvelope<Service>, sqlx::Error> {
        Ok(PageEnvelope::default())
    }
    async fn get_service(&self, _id: Uuid) -> Result<Option<ServiceView>, sqlx::Error> {
        Ok(None)
    }
    async fn find_service(&self, _id: Uuid) -> Result<Option<Service>, sqlx::Error> {
        Ok(None)
    }
    async fn create_service(&self, _service: NewService) -> Result<Service, sqlx::Error> {
        panic!("Stub called")
    }
    async fn update_service(
        &self,
        _id: Uuid,
        _changes: ServiceChanges,
        _owner: Uuid,
    ) -> Result<Option<Service>, sqlx::Error> {
        Ok(None)
    }
    async fn delete_service(&self, _id: Uuid) -> Result<Option<Service>, sqlx::Error> {
        Ok(None)
    }
    async fn paginate_users(
        &self,
        _query: &ListQuery,
    ) -> Result<PageEnvelope<PublicUser>, sqlx::Error> {
        Ok(PageEnvelope::default())
    }
    async fn find_user_by_username(&self, _username: &str) -> Result<Option<User>, sqlx::Error> {
        Ok(None)
    }
    async fn username_taken_by_other(
        &self,
        _username: &str,
        _id: Uuid,
    ) -> Result<bool, sqlx::Error> {
        Ok(false)
    }
    async fn get_public_user(&self, _id: Uuid) -> Result<Option<PublicUser>, sqlx::Error> {
        Ok(None)
    }
    async fn create_user(&self, _user: NewUser) -> Result<PublicUser, sqlx::Error> {
        panic!("Stub called")
    }
    async fn update_user(
        &self,
        _id: Uuid,
        _changes: &UpdateUserRequest,
    ) -> Result<Option<PublicUser>, sqlx::Error> {
        Ok(None)
    }
    async fn toggle_user_active(&self, _id: Uuid) -> Result<Option<PublicUser>, sqlx::Error> {
        Ok(None)
    }
    async fn set_user_password(
        &self,
        _id: Uuid,
        _password_hash: &str,
    ) -> Result<bool, sqlx::Error> {
        Ok(false)
    }
}

// --- Helper Functions ---

const TEST_JWT_SECRET: &str = "test-secret-value-1234567890";
const TEST_USER_ID: Uuid = Uuid::from_u128(1);

fn test_user(id: Uuid) -> User {
    User {
        id,
        username: "ana".to_string(),
        email: "ana@test.com".to_string(),
        password_hash: "irrelevant".to_string(),
        is_active: true,
        created_at: Utc::now(),
        updated_at: Utc::now(),
    }
}

fn create_token(user_id: Uuid, secret: &str, exp_offset_secs: i64) -> String {
    let now = Utc::now().timestamp();
    let claims = Claims {
        sub: user_id,
        iat: now as usize,
        exp: (now + exp_offset_secs) as usize,
    };
    let key = EncodingKey::from_secret(secret.as_bytes());
    encode(&Header::default(), &claims, &key).unwrap()
}

fn create_app_state(env: Env, repo: MockAuthRepo) -> AppState {
    let mut config = AppConfig::default();
    config.env = env;
    config.jwt_secret = TEST_JWT_SECRET.to_string();

    AppState {
        repo: Arc::new(repo),
        media: Arc::new(MockMediaStore::new()),
        config,
    }
}

/// Helper to get the mutable Parts struct from a generated Request
fn get_request_parts(method: Method, uri: Uri) -> Parts {
    let request = Request::builder()
        .method(method)
        .uri(uri)
        .body(axum::body::Body::empty())
        .unwrap();
    let (parts, _) = request.into_parts();
    parts
}

fn bearer_parts(token: &str) -> Parts {
    let mut parts = get_request_parts(Method::GET, "/".parse().unwrap());
    parts.headers.insert(
        header::AUTHORIZATION,
        header::HeaderValue::from_str(&format!("Bearer {}", token)).unwrap(),
    );
    parts
}

// --- Tests ---

#[tokio::test]
async fn test_auth_success_with_valid_jwt() {
    let token = create_token(TEST_USER_ID, TEST_JWT_SECRET, 3600);

    let mock_repo = MockAuthRepo {
        user_to_return: Some(test_user(TEST_USER_ID)),
    };
    let app_state = create_app_state(Env::Production, mock_repo);

    let mut parts = bearer_parts(&token);
    let auth_user = AuthUser::from_request_parts(&mut parts, &app_state).await;

    assert!(auth_user.is_ok());
    let user = auth_user.unwrap();
    assert_eq!(user.id, TEST_USER_ID);
    assert_eq!(user.username, "ana");
    assert!(user.is_active);
}

#[tokio::test]
async fn test_auth_failure_with_missing_header() {
    let app_state = create_app_state(Env::Production, MockAuthRepo::default());

    let mut parts = get_request_parts(Method::GET, "/".parse().unwrap());
    let auth_user = AuthUser::from_request_parts(&mut parts, &app_state).await;

    let err = auth_user.unwrap_err();
    assert_eq!(err.status_code(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_auth_failure_with_wrong_scheme() {
    let app_state = create_app_state(Env::Production, MockAuthRepo::default());

    let mut parts = get_request_parts(Method::GET, "/".parse().unwrap());
    parts.headers.insert(
        header::AUTHORIZATION,
        header::HeaderValue::from_static("Basic dXNlcjpwYXNz"),
    );

    let auth_user = AuthUser::from_request_parts(&mut parts, &app_state).await;

    let err = auth_user.unwrap_err();
    assert_eq!(err.status_code(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_auth_failure_with_empty_bearer_token() {
    let app_state = create_app_state(Env::Production, MockAuthRepo::default());

    // "Bearer " with no token segment at all.
    let auth_user = AuthUser::from_request_parts(&mut bearer_parts(""), &app_state).await;

    let err = auth_user.unwrap_err();
    assert_eq!(err.status_code(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_auth_failure_with_wrong_signature() {
    // Signed with a key the server does not trust.
    let token = create_token(TEST_USER_ID, "some-other-secret-entirely", 3600);

    let mock_repo = MockAuthRepo {
        user_to_return: Some(test_user(TEST_USER_ID)),
    };
    let app_state = create_app_state(Env::Production, mock_repo);

    let auth_user = AuthUser::from_request_parts(&mut bearer_parts(&token), &app_state).await;

    let err = auth_user.unwrap_err();
    assert_eq!(err.status_code(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_auth_failure_with_expired_jwt() {
    // Expired an hour ago, well past any decoding leeway.
    let token = create_token(TEST_USER_ID, TEST_JWT_SECRET, -3600);

    let mock_repo = MockAuthRepo {
        user_to_return: Some(test_user(TEST_USER_ID)),
    };
    let app_state = create_app_state(Env::Production, mock_repo);

    let auth_user = AuthUser::from_request_parts(&mut bearer_parts(&token), &app_state).await;

    let err = auth_user.unwrap_err();
    assert_eq!(err.status_code(), StatusCode::UNAUTHORIZED);
    assert_eq!(err, ApiError::Unauthenticated("Token expired".to_string()));
}

#[tokio::test]
async fn test_auth_failure_with_subjectless_token() {
    // A structurally valid, correctly signed token whose payload carries no
    // subject must be rejected outright, not left half-authenticated.
    #[derive(Serialize)]
    struct SubjectlessClaims {
        exp: usize,
        iat: usize,
    }

    let now = Utc::now().timestamp();
    let claims = SubjectlessClaims {
        iat: now as usize,
        exp: (now + 3600) as usize,
    };
    let key = EncodingKey::from_secret(TEST_JWT_SECRET.as_bytes());
    let token = encode(&Header::default(), &claims, &key).unwrap();

    let mock_repo = MockAuthRepo {
        user_to_return: Some(test_user(TEST_USER_ID)),
    };
    let app_state = create_app_state(Env::Production, mock_repo);

    let auth_user = AuthUser::from_request_parts(&mut bearer_parts(&token), &app_state).await;

    let err = auth_user.unwrap_err();
    assert_eq!(err.status_code(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_auth_failure_when_user_is_gone() {
    let token = create_token(TEST_USER_ID, TEST_JWT_SECRET, 3600);

    // Valid token, but the repository no longer knows the subject.
    let app_state = create_app_state(Env::Production, MockAuthRepo::default());

    let auth_user = AuthUser::from_request_parts(&mut bearer_parts(&token), &app_state).await;

    let err = auth_user.unwrap_err();
    assert_eq!(err.status_code(), StatusCode::NOT_FOUND);
    assert!(matches!(err, ApiError::PrincipalNotFound(_)));
}

#[tokio::test]
async fn test_local_bypass_success() {
    let mock_user_id = Uuid::new_v4();
    let mock_repo = MockAuthRepo {
        user_to_return: Some(test_user(mock_user_id)),
    };
    let app_state = create_app_state(Env::Local, mock_repo);

    let mut parts = get_request_parts(Method::GET, "/".parse().unwrap());
    parts.headers.insert(
        header::HeaderName::from_static("x-user-id"),
        header::HeaderValue::from_str(&mock_user_id.to_string()).unwrap(),
    );

    let auth_user = AuthUser::from_request_parts(&mut parts, &app_state).await;

    assert!(auth_user.is_ok());
    assert_eq!(auth_user.unwrap().id, mock_user_id);
}

#[tokio::test]
async fn test_local_bypass_disabled_in_prod() {
    let mock_user_id = Uuid::new_v4();
    let app_state = create_app_state(Env::Production, MockAuthRepo::default());

    let mut parts = get_request_parts(Method::GET, "/".parse().unwrap());
    // Provide ONLY the local bypass header
    parts.headers.insert(
        header::HeaderName::from_static("x-user-id"),
        header::HeaderValue::from_str(&mock_user_id.to_string()).unwrap(),
    );

    let auth_user = AuthUser::from_request_parts(&mut parts, &app_state).await;

    let err = auth_user.unwrap_err();
    assert_eq!(err.status_code(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_local_env_still_accepts_bearer_tokens() {
    // Without the bypass header, Env::Local goes through the standard flow.
    let token = create_token(TEST_USER_ID, TEST_JWT_SECRET, 3600);

    let mock_repo = MockAuthRepo {
        user_to_return: Some(test_user(TEST_USER_ID)),
    };
    let app_state = create_app_state(Env::Local, mock_repo);

    let auth_user = AuthUser::from_request_parts(&mut bearer_parts(&token), &app_state).await;

    assert!(auth_user.is_ok());
    assert_eq!(auth_user.unwrap().id, TEST_USER_ID);
}
