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
    models::{Banner, BannerChanges, BannerView, NewBanner},
    pagination::{ListQuery, PageEnvelope, PageParams},
};

/// get_banners
///
/// [Public Route] Lists every banner, newest first.
#[utoipa::path(
    get,
    path = "/api/banner/",
    responses((status = 200, description = "All banners", body = [Banner]))
)]
pub async fn get_banners(State(state): State<AppState>) -> Result<Json<Vec<Banner>>, ApiError> {
    Ok(Json(state.repo.list_banners().await?))
}

/// get_banners_paginate
///
/// [Public Route] Paginated, searchable banner listing. The search term
/// matches title/description as case-insensitive substrings and the price
/// exactly when numeric.
#[utoipa::path(
    get,
    path = "/api/banner/paginate",
    params(PageParams),
    responses((status = 200, description = "One page of banners", body = PageEnvelope<Banner>))
)]
pub async fn get_banners_paginate(
    State(state): State<AppState>,
    Query(params): Query<PageParams>,
) -> Result<Json<PageEnvelope<Banner>>, ApiError> {
    let query = ListQuery::from_params(params);
    Ok(Json(state.repo.paginate_banners(&query).await?))
}

/// get_banner_by_id
///
/// [Authenticated Route] Field-limited detail view of one banner.
#[utoipa::path(
    get,
    path = "/api/banner/{id}",
    params(("id" = Uuid, Path, description = "Banner ID")),
    responses(
        (status = 200, description = "Found", body = BannerView),
        (status = 404, description = "Not Found")
    )
)]
pub async fn get_banner_by_id(
    _auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<BannerView>, ApiError> {
    state
        .repo
        .get_banner(id)
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::NotFound("Banner not found".to_string()))
}

/// create_banner
///
/// [Authenticated Route] Registers a new banner from a multipart form. The
/// image part is mandatory; it is pushed to the media store first and the
/// resulting durable URL is persisted on the record, owned by the caller.
#[utoipa::path(
    post,
    path = "/api/banner/",
    responses(
        (status = 200, description = "Created"),
        (status = 400, description = "Missing image or malformed field")
    )
)]
pub async fn create_banner(
    AuthUser { id: user_id, .. }: AuthUser,
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<&'static str, ApiError> {
    let mut form = FormData::read(&mut multipart).await?;

    let image = form
        .take_image()
        .ok_or_else(|| ApiError::Validation("The image is required".to_string()))?;

    // Parse every field before touching the media store so a bad form
    // cannot leave an orphaned upload behind.
    let title = form.required_text("title")?;
    let description = form.required_text("description")?;
    let price = form.float_or("price", 0.0)?;
    let background = form.optional_text("background");

    let stored = state
        .media
        .upload("banners", image.data, &image.content_type)
        .await
        .map_err(media_failure)?;

    state
        .repo
        .create_banner(NewBanner {
            title,
            description,
            price,
            background,
            image: stored.url,
            user_id,
        })
        .await?;

    Ok("Banner registered successfully")
}

/// update_banner
///
/// [Authenticated Route] Rewrites a banner's fields from a multipart form.
/// When a new image is supplied the previous one is released from the media
/// store (best-effort) and the new URL replaces it; otherwise the stored
/// image is kept.
#[utoipa::path(
    put,
    path = "/api/banner/{id}",
    params(("id" = Uuid, Path, description = "Banner ID")),
    responses(
        (status = 200, description = "Updated"),
        (status = 404, description = "Not Found")
    )
)]
pub async fn update_banner(
    AuthUser { id: user_id, .. }: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    mut multipart: Multipart,
) -> Result<&'static str, ApiError> {
    let mut form = FormData::read(&mut multipart).await?;

    let banner = state
        .repo
        .find_banner(id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Banner not found".to_string()))?;

    let title = form.required_text("title")?;
    let description = form.required_text("description")?;
    let price = form.float_or("price", 0.0)?;
    let background = form.optional_text("background");

    let image = match form.take_image() {
        Some(upload) => {
            release_image(&state.media, &banner.image).await;
            let stored = state
                .media
                .upload("banners", upload.data, &upload.content_type)
                .await
                .map_err(media_failure)?;
            Some(stored.url)
        }
        None => None,
    };

    state
        .repo
        .update_banner(
            id,
            BannerChanges {
                title,
                description,
                price,
                background,
                image,
            },
            user_id,
        )
        .await?
        .ok_or_else(|| ApiError::NotFound("Banner not found".to_string()))?;

    Ok("Banner updated successfully")
}
