use axum::{
    Json,
    extract::{Multipart, Path, Query, State},
};
use uuid::Uuid;

use super::{forms::FormData, media_failure, release_image};
use crate::{
    AppState,
    auth::AuthUser,
    error::ApiError,
    models::{NewProducto, Producto, ProductoChanges, ProductoView},
    pagination::{ListQuery, PageEnvelope, PageParams},
};

/// get_productos
///
/// [Public Route] Lists every producto, newest first.
#[utoipa::path(
    get,
    path = "/api/producto/",
    responses((status = 200, description = "All productos", body = [Producto]))
)]
pub async fn get_productos(State(state): State<AppState>) -> Result<Json<Vec<Producto>>, ApiError> {
    Ok(Json(state.repo.list_productos().await?))
}

/// get_productos_paginate
///
/// [Authenticated Route] Paginated, searchable producto listing. A numeric
/// search term additionally matches price (float) and stock (integer) by
/// exact value.
#[utoipa::path(
    get,
    path = "/api/producto/paginate",
    params(PageParams),
    responses((status = 200, description = "One page of productos", body = PageEnvelope<Producto>))
)]
pub async fn get_productos_paginate(
    _auth: AuthUser,
    State(state): State<AppState>,
    Query(params): Query<PageParams>,
) -> Result<Json<PageEnvelope<Producto>>, ApiError> {
    let query = ListQuery::from_params(params);
    Ok(Json(state.repo.paginate_productos(&query).await?))
}

/// get_producto_by_id
///
/// [Authenticated Route] Field-limited detail view of one producto.
#[utoipa::path(
    get,
    path = "/api/producto/{id}",
    params(("id" = Uuid, Path, description = "Producto ID")),
    responses(
        (status = 200, description = "Found", body = ProductoView),
        (status = 404, description = "Not Found")
    )
)]
pub async fn get_producto_by_id(
    _auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ProductoView>, ApiError> {
    state
        .repo
        .get_producto(id)
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::NotFound("Producto not found".to_string()))
}

/// create_producto
///
/// [Authenticated Route] Registers a new producto from a multipart form.
/// The image is mandatory; stock defaults to zero when absent.
#[utoipa::path(
    post,
    path = "/api/producto/",
    responses(
        (status = 200, description = "Created"),
        (status = 400, description = "Missing image or malformed field")
    )
)]
pub async fn create_producto(
    AuthUser { id: user_id, .. }: AuthUser,
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<&'static str, ApiError> {
    let mut form = FormData::read(&mut multipart).await?;

    let image = form
        .take_image()
        .ok_or_else(|| ApiError::Validation("The image is required".to_string()))?;

    let description = form.required_text("description")?;
    let price = form.float_or("price", 0.0)?;
    let stock = form.int_or("stock", 0)?;

    let stored = state
        .media
        .upload("productos", image.data, &image.content_type)
        .await
        .map_err(media_failure)?;

    state
        .repo
        .create_producto(NewProducto {
            description,
            price,
            stock,
            image: stored.url,
            user_id,
        })
        .await?;

    Ok("Producto registered successfully")
}

/// update_producto
///
/// [Authenticated Route] Rewrites a producto's fields. A newly supplied
/// image replaces the stored one; the previous object is released from the
/// media store as a best-effort side effect.
#[utoipa::path(
    put,
    path = "/api/producto/{id}",
    params(("id" = Uuid, Path, description = "Producto ID")),
    responses(
        (status = 200, description = "Updated"),
        (status = 404, description = "Not Found")
    )
)]
pub async fn update_producto(
    AuthUser { id: user_id, .. }: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    mut multipart: Multipart,
) -> Result<&'static str, ApiError> {
    let mut form = FormData::read(&mut multipart).await?;

    let producto = state
        .repo
        .find_producto(id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Producto not found".to_string()))?;

    let description = form.required_text("description")?;
    let price = form.float_or("price", 0.0)?;
    let stock = form.int_or("stock", 0)?;

    let image = match form.take_image() {
        Some(upload) => {
            release_image(&state.media, &producto.image).await;
            let stored = state
                .media
                .upload("productos", upload.data, &upload.content_type)
                .await
                .map_err(media_failure)?;
            Some(stored.url)
        }
        None => None,
    };

    state
        .repo
        .update_producto(
            id,
            ProductoChanges {
                description,
                price,
                stock,
                image,
            },
            user_id,
        )
        .await?
        .ok_or_else(|| ApiError::NotFound("Producto not found".to_string()))?;

    Ok("Producto updated successfully")
}

/// delete_producto
///
/// [Authenticated Route] Hard-deletes a producto, then releases its image
/// from the media store. The release is best-effort: a media failure after a
/// successful delete is logged, not surfaced.
#[utoipa::path(
    delete,
    path = "/api/producto/{id}",
    params(("id" = Uuid, Path, description = "Producto ID")),
    responses(
        (status = 200, description = "Deleted"),
        (status = 404, description = "Not Found")
    )
)]
pub async fn delete_producto(
    _auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<&'static str, ApiError> {
    let deleted = state
        .repo
        .delete_producto(id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Producto not found".to_string()))?;

    release_image(&state.media, &deleted.image).await;

    Ok("Producto deleted successfully")
}
