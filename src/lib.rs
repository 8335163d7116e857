use axum::{Router, extract::FromRef, http::HeaderName, routing::get};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use tower::ServiceBuilder;
use tower_http::{
    cors::{Any, CorsLayer},
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::{DefaultOnResponse, TraceLayer},
};
use tracing::{Level, Span};

// --- Module Structure ---

// Core application services and components.
pub mod auth;
pub mod config;
pub mod error;
pub mod handlers;
pub mod media;
pub mod models;
pub mod pagination;
pub mod repository;

// Routing, one module per resource gateway.
pub mod routes;
use routes::{banner, producto, service, user};

// --- Public Re-exports ---

// Makes core state types easily accessible to the application entry point.
pub use config::AppConfig;
pub use error::ApiError;
pub use media::{MediaState, MockMediaStore, S3MediaClient};
pub use repository::{PostgresRepository, RepositoryState};

/// ApiDoc
///
/// Auto-generates the OpenAPI documentation (Swagger JSON) for the service,
/// aggregating every annotated handler and schema. The resulting JSON is
/// served at `/api-docs/openapi.json`.
#[derive(OpenApi)]
#[openapi(
    paths(
        handlers::banner::get_banners, handlers::banner::get_banners_paginate,
        handlers::banner::get_banner_by_id, handlers::banner::create_banner,
        handlers::banner::update_banner,
        handlers::producto::get_productos, handlers::producto::get_productos_paginate,
        handlers::producto::get_producto_by_id, handlers::producto::create_producto,
        handlers::producto::update_producto, handlers::producto::delete_producto,
        handlers::service::get_services, handlers::service::get_services_paginate,
        handlers::service::get_service_by_id, handlers::service::create_service,
        handlers::service::update_service, handlers::service::delete_service,
        handlers::user::get_users, handlers::user::create_user, handlers::user::login,
        handlers::user::get_auth_user, handlers::user::get_user_by_id,
        handlers::user::update_user, handlers::user::toggle_user_active,
        handlers::user::change_password
    ),
    components(
        schemas(
            models::Banner, models::BannerView, models::Producto, models::ProductoView,
            models::Service, models::ServiceView, models::PublicUser,
            models::CreateUserRequest, models::LoginRequest, models::UpdateUserRequest,
            models::ChangePasswordRequest, models::ToggleUserResponse,
            pagination::PageEnvelope<models::Banner>,
            pagination::PageEnvelope<models::Producto>,
            pagination::PageEnvelope<models::Service>,
            pagination::PageEnvelope<models::PublicUser>,
        )
    ),
    tags(
        (name = "mercado", description = "Storefront content API")
    )
)]
struct ApiDoc;

/// AppState
///
/// The single, thread-safe container holding every shared service. Cloned
/// per request; all members are cheap handles.
#[derive(Clone)]
pub struct AppState {
    /// Repository layer: abstracts database access via the PgPool connection.
    pub repo: RepositoryState,
    /// Media layer: abstracts the external image host.
    pub media: MediaState,
    /// The loaded, immutable environment configuration.
    pub config: AppConfig,
}

// --- Axum FromRef Extractor Implementations ---

// Allow extractors (notably AuthUser) to pull individual components out of
// the shared state.

impl FromRef<AppState> for RepositoryState {
    fn from_ref(app_state: &AppState) -> RepositoryState {
        app_state.repo.clone()
    }
}

impl FromRef<AppState> for MediaState {
    fn from_ref(app_state: &AppState) -> MediaState {
        app_state.media.clone()
    }
}

impl FromRef<AppState> for AppConfig {
    fn from_ref(app_state: &AppState) -> AppConfig {
        app_state.config.clone()
    }
}

/// create_router
///
/// Assembles the application's entire routing structure, applies the global
/// middleware stack, and registers the application state.
pub fn create_router(state: AppState) -> Router {
    // 1. CORS configuration.
    let cors = CorsLayer::new()
        .allow_methods(Any)
        .allow_origin(Any)
        .allow_headers(Any);

    // Header name constant for request correlation.
    let x_request_id = HeaderName::from_static("x-request-id");

    // 2. Resource routers, mounted under the common /api prefix.
    let api = Router::new()
        .nest("/banner", banner::banner_routes())
        .nest("/producto", producto::producto_routes())
        .nest("/service", service::service_routes())
        .nest("/user", user::user_routes());

    let base_router = Router::new()
        // Documentation: serve the auto-generated Swagger UI.
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        // Liveness probe for monitors and load balancers.
        .route("/health", get(|| async { "ok" }))
        .nest("/api", api)
        .with_state(state);

    // 3. Observability and correlation layers (outermost).
    base_router
        .layer(
            ServiceBuilder::new()
                // Request ID generation: a unique UUID for every request.
                .layer(SetRequestIdLayer::new(x_request_id.clone(), MakeRequestUuid))
                // Request tracing: wraps the request/response lifecycle in a
                // span correlated by the generated id.
                .layer(
                    TraceLayer::new_for_http()
                        .make_span_with(trace_span_logger)
                        .on_response(
                            DefaultOnResponse::new()
                                .level(Level::INFO)
                                .latency_unit(tower_http::LatencyUnit::Millis),
                        ),
                )
                // Return the generated x-request-id header to the client.
                .layer(PropagateRequestIdLayer::new(x_request_id)),
        )
        // 4. CORS layer.
        .layer(cors)
}

/// trace_span_logger
///
/// Customizes the span created by `TraceLayer`: every log line for a single
/// request carries the method, URI and the `x-request-id` value.
fn trace_span_logger(request: &axum::http::Request<axum::body::Body>) -> Span {
    let request_id = request
        .headers()
        .get("x-request-id")
        .and_then(|value| value.to_str().ok())
        .unwrap_or("unknown");

    tracing::info_span!(
        "http_request",
        method = ?request.method(),
        uri = ?request.uri(),
        req_id = %request_id,
    )
}
