/// Handler Module Index
///
/// One submodule per resource gateway, mirroring the four document
/// collections the API exposes, plus the shared multipart form support.
pub mod banner;
pub mod forms;
pub mod producto;
pub mod service;
pub mod user;

use crate::{
    error::ApiError,
    media::{MediaState, key_from_url},
};

/// Maps a media-store failure on the upload path. The underlying cause is
/// logged; the client sees a generic persistence error.
pub(crate) fn media_failure(err: String) -> ApiError {
    tracing::error!("media store error: {}", err);
    ApiError::Persistence("Something went wrong".to_string())
}

/// Releases a stored image by URL, best-effort.
///
/// Deletion failures here must not fail the enclosing operation (the record
/// write already succeeded or is about to); they are logged and dropped.
/// Each release is attempted exactly once, with no retry.
pub(crate) async fn release_image(media: &MediaState, url: &str) {
    if url.is_empty() {
        return;
    }
    match key_from_url(url) {
        Some(key) => {
            if let Err(e) = media.delete(&key).await {
                tracing::warn!("failed to release media object {}: {}", key, e);
            }
        }
        None => tracing::warn!("could not derive a media key from url {}", url),
    }
}
