use std::collections::HashMap;

use axum::extract::Multipart;
use axum::extract::multipart::MultipartError;
use axum::http::StatusCode;
use bytes::Bytes;

use crate::server::response::ApiError;
use crate::uploads::UploadError;

/// A file part of a multipart form.
#[derive(Debug)]
pub struct FormFile {
    pub file_name: Option<String>,
    pub data: Bytes,
}

/// A fully buffered multipart form: text fields plus file parts.
#[derive(Debug, Default)]
pub struct MultipartForm {
    fields: HashMap<String, String>,
    files: HashMap<String, FormFile>,
}

fn multipart_error(err: MultipartError) -> ApiError {
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        ApiError::payload_too_large("Uploaded file is too large")
    } else {
        ApiError::bad_request(format!("Invalid multipart body: {}", err.body_text()))
    }
}

impl MultipartForm {
    pub async fn read(mut multipart: Multipart) -> Result<Self, ApiError> {
        let mut form = Self::default();

        while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
            let Some(name) = field.name().map(str::to_string) else {
                continue;
            };

            match field.file_name().map(str::to_string) {
                Some(file_name) => {
                    let data = field.bytes().await.map_err(multipart_error)?;
                    // Browsers send an empty part when no file was picked.
                    if data.is_empty() {
                        continue;
                    }
                    let file_name = Some(file_name).filter(|n| !n.is_empty());
                    form.files.insert(name, FormFile { file_name, data });
                }
                None => {
                    let value = field.text().await.map_err(multipart_error)?;
                    form.fields.insert(name, value);
                }
            }
        }

        Ok(form)
    }

    /// A text field, or `None` when absent. Blank values are kept.
    pub fn text(&self, name: &str) -> Option<String> {
        self.fields.get(name).cloned()
    }

    /// Parses a numeric text field; blank or unparsable values are `None`.
    pub fn number(&self, name: &str) -> Option<i64> {
        self.fields.get(name).and_then(|v| v.trim().parse().ok())
    }

    pub fn take_file(&mut self, name: &str) -> Option<FormFile> {
        self.files.remove(name)
    }
}

pub fn upload_error(err: UploadError) -> ApiError {
    match err {
        UploadError::Empty => ApiError::bad_request("Uploaded file is empty"),
        UploadError::InvalidPath => ApiError::bad_request("Invalid file path"),
        UploadError::Io(e) => {
            tracing::error!("Failed to store upload: {}", e);
            ApiError::internal("Failed to store upload")
        }
    }
}
