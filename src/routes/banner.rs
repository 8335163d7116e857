use crate::{AppState, handlers::banner};
use axum::{Router, routing::get};

/// Banner Router
///
/// The listing endpoints are public; detail, create and update require a
/// verified principal. Banners have no delete operation.
pub fn banner_routes() -> Router<AppState> {
    Router::new()
        // GET /api/banner/  |  POST /api/banner/ (multipart: title,
        // description, price, background, image)
        .route("/", get(banner::get_banners).post(banner::create_banner))
        // GET /api/banner/paginate?page=&limit=&search=
        .route("/paginate", get(banner::get_banners_paginate))
        // GET /api/banner/{id}  |  PUT /api/banner/{id} (multipart, image optional)
        .route(
            "/{id}",
            get(banner::get_banner_by_id).put(banner::update_banner),
        )
}
