//! Downloadable onboarding manual. One document is kept in memory and replaced on upload.

use std::sync::{Arc, RwLock};

use axum::{
    body::Bytes,
    extract::{DefaultBodyLimit, Path, State},
    http::{header, HeaderMap, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, put},
    Json, Router,
};
use serde::Serialize;
use serde_json::json;
use tracing::info;

pub const MAX_MANUAL_BYTES: usize = 20 * 1024 * 1024;

const OCTET_STREAM: &str = "application/octet-stream";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ManualDocument {
    pub file_name: String,
    pub content_type: String,
    pub bytes: Bytes,
}

impl ManualDocument {
    pub fn summary(&self) -> ManualSummary {
        ManualSummary {
            file_name: self.file_name.clone(),
            content_type: self.content_type.clone(),
            size: self.bytes.len(),
        }
    }

    /// `attachment` disposition with an ASCII-only quoted file name.
    pub fn content_disposition(&self) -> String {
        let fallback: String = deunicode::deunicode(&self.file_name)
            .chars()
            .map(|c| match c {
                '"' | '\\' => '_',
                c if c.is_ascii_graphic() || c == ' ' => c,
                _ => '_',
            })
            .collect();
        format!("attachment; filename=\"{fallback}\"")
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ManualSummary {
    pub file_name: String,
    pub content_type: String,
    pub size: usize,
}

#[derive(Debug, thiserror::Error)]
pub enum ManualError {
    #[error("manual file name is required")]
    EmptyName,
    #[error("manual file name '{0}' may not contain path separators or control characters")]
    InvalidName(String),
    #[error("manual upload is empty")]
    EmptyBody,
    #[error("manual is {size} bytes; the limit is {max}")]
    TooLarge { size: usize, max: usize },
    #[error("manual library unavailable")]
    Unavailable,
}

#[derive(Debug, Default)]
pub struct ManualLibrary {
    current: RwLock<Option<ManualDocument>>,
}

impl ManualLibrary {
    /// Replaces the stored manual. A blank or generic declared type falls back to the extension.
    pub fn store(
        &self,
        file_name: &str,
        declared_type: Option<&str>,
        bytes: Bytes,
    ) -> Result<ManualSummary, ManualError> {
        let file_name = file_name.trim();
        if file_name.is_empty() {
            return Err(ManualError::EmptyName);
        }
        if file_name.contains(['/', '\\']) || file_name.chars().any(char::is_control) {
            return Err(ManualError::InvalidName(file_name.to_string()));
        }
        if bytes.is_empty() {
            return Err(ManualError::EmptyBody);
        }
        if bytes.len() > MAX_MANUAL_BYTES {
            return Err(ManualError::TooLarge {
                size: bytes.len(),
                max: MAX_MANUAL_BYTES,
            });
        }

        let content_type = match declared_type.map(str::trim) {
            Some(declared) if !declared.is_empty() && declared != OCTET_STREAM => {
                declared.to_string()
            }
            _ => mime_guess::from_path(file_name)
                .first_or_octet_stream()
                .essence_str()
                .to_string(),
        };

        let document = ManualDocument {
            file_name: file_name.to_string(),
            content_type,
            bytes,
        };
        let summary = document.summary();
        *self.current.write().map_err(|_| ManualError::Unavailable)? = Some(document);
        info!(file = %summary.file_name, size = summary.size, "manual uploaded");
        Ok(summary)
    }

    pub fn current(&self) -> Result<Option<ManualDocument>, ManualError> {
        Ok(self
            .current
            .read()
            .map_err(|_| ManualError::Unavailable)?
            .clone())
    }
}

pub fn manual_router(library: Arc<ManualLibrary>) -> Router {
    Router::new()
        .route("/api/v1/manual", get(download_handler))
        .route("/api/v1/manual/:file_name", put(upload_handler))
        .layer(DefaultBodyLimit::max(MAX_MANUAL_BYTES))
        .with_state(library)
}

async fn upload_handler(
    State(library): State<Arc<ManualLibrary>>,
    Path(file_name): Path<String>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let declared = headers
        .get(header::CONTENT_TYPE)
        .and_then(|value| value.to_str().ok());
    match library.store(&file_name, declared, body) {
        Ok(summary) => (StatusCode::CREATED, Json(summary)).into_response(),
        Err(error) => error_response(error),
    }
}

async fn download_handler(State(library): State<Arc<ManualLibrary>>) -> Response {
    let document = match library.current() {
        Ok(Some(document)) => document,
        Ok(None) => {
            return (
                StatusCode::NOT_FOUND,
                Json(json!({ "error": "no manual uploaded" })),
            )
                .into_response()
        }
        Err(error) => return error_response(error),
    };

    let content_type = HeaderValue::from_str(&document.content_type)
        .unwrap_or_else(|_| HeaderValue::from_static(OCTET_STREAM));
    let disposition = HeaderValue::from_str(&document.content_disposition())
        .unwrap_or_else(|_| HeaderValue::from_static("attachment"));
    (
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, content_type),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        document.bytes,
    )
        .into_response()
}

fn error_response(error: ManualError) -> Response {
    let status = match error {
        ManualError::TooLarge { .. } => StatusCode::PAYLOAD_TOO_LARGE,
        ManualError::Unavailable => StatusCode::INTERNAL_SERVER_ERROR,
        _ => StatusCode::UNPROCESSABLE_ENTITY,
    };
    (status, Json(json!({ "error": error.to_string() }))).into_response()
}
