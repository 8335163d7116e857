use axum::extract::Multipart;
use std::collections::HashMap;

use crate::error::ApiError;

/// ImageUpload
///
/// One file part pulled out of a multipart form, buffered in memory on its
/// way to the media store.
#[derive(Debug, Clone)]
pub struct ImageUpload {
    pub data: Vec<u8>,
    pub content_type: String,
}

/// FormData
///
/// The collected contents of a multipart request: every text part by name,
/// plus the optional `image` file part. Field values are accessed through
/// the typed getters below, each with an explicit fallback rule, so no
/// handler relies on implicit string/number coercion.
#[derive(Debug, Default)]
pub struct FormData {
    fields: HashMap<String, String>,
    image: Option<ImageUpload>,
}

impl FormData {
    /// Drains the whole multipart stream. Any transport-level failure while
    /// reading a part is a validation error on the caller's input.
    pub async fn read(multipart: &mut Multipart) -> Result<Self, ApiError> {
        let mut form = FormData::default();

        while let Some(field) = multipart
            .next_field()
            .await
            .map_err(|_| ApiError::Validation("Could not process the form".to_string()))?
        {
            let name = match field.name() {
                Some(name) => name.to_string(),
                None => continue,
            };

            if name == "image" {
                let content_type = field
                    .content_type()
                    .unwrap_or("application/octet-stream")
                    .to_string();
                let data = field
                    .bytes()
                    .await
                    .map_err(|_| ApiError::Validation("Could not process the form".to_string()))?;
                // An empty file part counts as "no image supplied".
                if !data.is_empty() {
                    form.image = Some(ImageUpload {
                        data: data.to_vec(),
                        content_type,
                    });
                }
            } else {
                let value = field
                    .text()
                    .await
                    .map_err(|_| ApiError::Validation("Could not process the form".to_string()))?;
                form.fields.insert(name, value);
            }
        }

        Ok(form)
    }

    /// Takes the uploaded image out of the form, if one was supplied.
    pub fn take_image(&mut self) -> Option<ImageUpload> {
        self.image.take()
    }

    /// A text field that must be present and non-empty.
    pub fn required_text(&self, name: &str) -> Result<String, ApiError> {
        self.optional_text(name)
            .ok_or_else(|| ApiError::Validation(format!("The {} field is required", name)))
    }

    /// A text field that may be absent; empty strings count as absent.
    pub fn optional_text(&self, name: &str) -> Option<String> {
        self.fields
            .get(name)
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
    }

    /// A float field with a default. Absent or empty falls back to the
    /// default; a present but unparseable value is rejected.
    pub fn float_or(&self, name: &str, default: f64) -> Result<f64, ApiError> {
        match self.optional_text(name) {
            None => Ok(default),
            Some(raw) => raw
                .parse::<f64>()
                .map_err(|_| ApiError::Validation(format!("The {} field must be a number", name))),
        }
    }

    /// An integer field with a default, same fallback rule as [`float_or`].
    ///
    /// [`float_or`]: FormData::float_or
    pub fn int_or(&self, name: &str, default: i32) -> Result<i32, ApiError> {
        match self.optional_text(name) {
            None => Ok(default),
            Some(raw) => raw.parse::<i32>().map_err(|_| {
                ApiError::Validation(format!("The {} field must be an integer", name))
            }),
        }
    }
}
