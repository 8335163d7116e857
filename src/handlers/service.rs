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
    models::{NewService, Service, ServiceChanges, ServiceView},
    pagination::{ListQuery, PageEnvelope, PageParams},
};

/// get_services
///
/// [Public Route] Lists every service, newest first.
#[utoipa::path(
    get,
    path = "/api/service/",
    responses((status = 200, description = "All services", body = [Service]))
)]
pub async fn get_services(State(state): State<AppState>) -> Result<Json<Vec<Service>>, ApiError> {
    Ok(Json(state.repo.list_services().await?))
}

/// get_services_paginate
///
/// [Public Route] Paginated, searchable service listing.
#[utoipa::path(
    get,
    path = "/api/service/paginate",
    params(PageParams),
    responses((status = 200, description = "One page of services", body = PageEnvelope<Service>))
)]
pub async fn get_services_paginate(
    State(state): State<AppState>,
    Query(params): Query<PageParams>,
) -> Result<Json<PageEnvelope<Service>>, ApiError> {
    let query = ListQuery::from_params(params);
    Ok(Json(state.repo.paginate_services(&query).await?))
}

/// get_service_by_id
///
/// [Authenticated Route] Field-limited detail view of one service.
#[utoipa::path(
    get,
    path = "/api/service/{id}",
    params(("id" = Uuid, Path, description = "Service ID")),
    responses(
        (status = 200, description = "Found", body = ServiceView),
        (status = 404, description = "Not Found")
    )
)]
pub async fn get_service_by_id(
    _auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ServiceView>, ApiError> {
    state
        .repo
        .get_service(id)
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::NotFound("Service not found".to_string()))
}

/// create_service
///
/// [Authenticated Route] Registers a new service from a multipart form; the
/// image part is mandatory.
#[utoipa::path(
    post,
    path = "/api/service/",
    responses(
        (status = 200, description = "Created"),
        (status = 400, description = "Missing image or malformed field")
    )
)]
pub async fn create_service(
    AuthUser { id: user_id, .. }: AuthUser,
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<&'static str, ApiError> {
    let mut form = FormData::read(&mut multipart).await?;

    let image = form
        .take_image()
        .ok_or_else(|| ApiError::Validation("The image is required".to_string()))?;

    let title = form.required_text("title")?;
    let description = form.required_text("description")?;
    let price = form.float_or("price", 0.0)?;

    let stored = state
        .media
        .upload("services", image.data, &image.content_type)
        .await
        .map_err(media_failure)?;

    state
        .repo
        .create_service(NewService {
            title,
            description,
            price,
            image: stored.url,
            user_id,
        })
        .await?;

    Ok("Service registered successfully")
}

/// update_service
///
/// [Authenticated Route] Rewrites a service's fields, replacing the stored
/// image only when a new one was uploaded.
#[utoipa::path(
    put,
    path = "/api/service/{id}",
    params(("id" = Uuid, Path, description = "Service ID")),
    responses(
        (status = 200, description = "Updated"),
        (status = 404, description = "Not Found")
    )
)]
pub async fn update_service(
    AuthUser { id: user_id, .. }: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    mut multipart: Multipart,
) -> Result<&'static str, ApiError> {
    let mut form = FormData::read(&mut multipart).await?;

    let service = state
        .repo
        .find_service(id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Service not found".to_string()))?;

    let title = form.required_text("title")?;
    let description = form.required_text("description")?;
    let price = form.float_or("price", 0.0)?;

    let image = match form.take_image() {
        Some(upload) => {
            release_image(&state.media, &service.image).await;
            let stored = state
                .media
                .upload("services", upload.data, &upload.content_type)
                .await
                .map_err(media_failure)?;
            Some(stored.url)
        }
        None => None,
    };

    state
        .repo
        .update_service(
            id,
            ServiceChanges {
                title,
                description,
                price,
                image,
            },
            user_id,
        )
        .await?
        .ok_or_else(|| ApiError::NotFound("Service not found".to_string()))?;

    Ok("Service updated successfully")
}

/// delete_service
///
/// [Authenticated Route] Hard-deletes a service and releases its image from
/// the media store (best-effort, attempted once).
#[utoipa::path(
    delete,
    path = "/api/service/{id}",
    params(("id" = Uuid, Path, description = "Service ID")),
    responses(
        (status = 200, description = "Deleted"),
        (status = 404, description = "Not Found")
    )
)]
pub async fn delete_service(
    _auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<&'static str, ApiError> {
    let deleted = state
        .repo
        .delete_service(id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Service not found".to_string()))?;

    release_image(&state.media, &deleted.image).await;

    Ok("Service deleted successfully")
}
