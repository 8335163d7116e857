use crate::{AppState, handlers::producto};
use axum::{Router, routing::get};

/// Producto Router
///
/// Only the plain listing is public; the paginated listing, detail view and
/// every mutation require a verified principal. Productos support hard
/// deletion, which also releases the stored image.
pub fn producto_routes() -> Router<AppState> {
    Router::new()
        // GET /api/producto/  |  POST /api/producto/ (multipart: description,
        // price, stock, image)
        .route(
            "/",
            get(producto::get_productos).post(producto::create_producto),
        )
        // GET /api/producto/paginate?page=&limit=&search=
        .route("/paginate", get(producto::get_productos_paginate))
        // GET | PUT (multipart, image optional) | DELETE /api/producto/{id}
        .route(
            "/{id}",
            get(producto::get_producto_by_id)
                .put(producto::update_producto)
                .delete(producto::delete_producto),
        )
}
