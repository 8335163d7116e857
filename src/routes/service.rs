use crate::{AppState, handlers::service};
use axum::{Router, routing::get};

/// Service Router
///
/// Same shape as the producto router, except the paginated listing is public.
pub fn service_routes() -> Router<AppState> {
    Router::new()
        // GET /api/service/  |  POST /api/service/ (multipart: title,
        // description, price, image)
        .route("/", get(service::get_services).post(service::create_service))
        // GET /api/service/paginate?page=&limit=&search=
        .route("/paginate", get(service::get_services_paginate))
        // GET | PUT (multipart, image optional) | DELETE /api/service/{id}
        .route(
            "/{id}",
            get(service::get_service_by_id)
                .put(service::update_service)
                .delete(service::delete_service),
        )
}
