use mercado_api::media::{MediaStore, MockMediaStore, key_from_url};

#[test]
fn test_key_from_url_strips_extension() {
    let url = "http://localhost:9000/mercado-uploads/banners/7ae9c2f0-11aa-4a5e-9d57-0f1f5a3a9b10.jpg";
    assert_eq!(
        key_from_url(url).as_deref(),
        Some("banners/7ae9c2f0-11aa-4a5e-9d57-0f1f5a3a9b10")
    );
}

#[test]
fn test_key_from_url_without_extension() {
    let url = "http://localhost:9000/mercado-uploads/productos/abc-123";
    assert_eq!(key_from_url(url).as_deref(), Some("productos/abc-123"));
}

#[test]
fn test_key_from_url_ignores_trailing_slash() {
    let url = "http://localhost:9000/mercado-uploads/services/abc-123.png/";
    assert_eq!(key_from_url(url).as_deref(), Some("services/abc-123"));
}

#[test]
fn test_key_from_url_too_short() {
    assert_eq!(key_from_url(""), None);
    assert_eq!(key_from_url("abc"), None);
}

#[tokio::test]
async fn test_mock_upload_roundtrip() {
    let media = MockMediaStore::new();

    let stored = media
        .upload("banners", vec![1, 2, 3], "image/png")
        .await
        .expect("mock upload should succeed");

    assert!(stored.key.starts_with("banners/"));
    assert!(stored.url.ends_with(&stored.key));
    // The key recovered from the stored URL must be the upload key, since
    // that is exactly what the update/delete handlers rely on.
    assert_eq!(key_from_url(&stored.url).as_deref(), Some(stored.key.as_str()));
    assert_eq!(media.uploaded_keys(), vec![stored.key.clone()]);
}

#[tokio::test]
async fn test_mock_delete_records_keys() {
    let media = MockMediaStore::new();

    media.delete("banners/some-key").await.expect("delete ok");
    media.delete("banners/other-key").await.expect("delete ok");

    assert_eq!(
        media.deleted_keys(),
        vec!["banners/some-key".to_string(), "banners/other-key".to_string()]
    );
}

#[tokio::test]
async fn test_mock_failing_store() {
    let media = MockMediaStore::new_failing();

    assert!(media.upload("banners", vec![0], "image/png").await.is_err());
    assert!(media.delete("banners/key").await.is_err());
    assert!(media.deleted_keys().is_empty());
}
