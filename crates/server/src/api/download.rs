//! Download API handler.
//!
//! `POST /download` takes a single `url` field, runs the pipeline to
//! completion and streams the muxed file back as an attachment. Failures are
//! returned as a plain-text message with a status derived from the error
//! kind; diagnostic detail only goes to the logs.

use axum::{
    body::Body,
    extract::{FromRequest, Multipart, Request, State},
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Form, Json,
};
use serde::Deserialize;
use std::sync::Arc;
use tracing::{error, warn};
use tubemux_core::{Delivery, ErrorKind, PipelineError};

use crate::state::AppState;

// ============================================================================
// Request types
// ============================================================================

/// Body accepted as JSON or URL-encoded form.
#[derive(Debug, Deserialize)]
struct UrlBody {
    #[serde(default)]
    url: Option<String>,
}

/// The `url` field of a download request, read from a JSON, URL-encoded or
/// multipart body depending on the content type.
///
/// A body without the field (or one that cannot be parsed at all) is
/// rejected with an empty 400.
#[derive(Debug)]
pub struct DownloadForm {
    pub url: String,
}

impl<S> FromRequest<S> for DownloadForm
where
    S: Send + Sync,
{
    type Rejection = StatusCode;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let content_type = req
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("")
            .to_ascii_lowercase();

        let url = if content_type.starts_with("application/json") {
            let Json(body) = Json::<UrlBody>::from_request(req, state)
                .await
                .map_err(|_| StatusCode::BAD_REQUEST)?;
            body.url
        } else if content_type.starts_with("multipart/form-data") {
            let multipart = Multipart::from_request(req, state)
                .await
                .map_err(|_| StatusCode::BAD_REQUEST)?;
            url_from_multipart(multipart).await
        } else {
            let Form(body) = Form::<UrlBody>::from_request(req, state)
                .await
                .map_err(|_| StatusCode::BAD_REQUEST)?;
            body.url
        };

        url.map(|url| Self { url }).ok_or(StatusCode::BAD_REQUEST)
    }
}

async fn url_from_multipart(mut multipart: Multipart) -> Option<String> {
    while let Ok(Some(field)) = multipart.next_field().await {
        if field.name() == Some("url") {
            return field.text().await.ok();
        }
    }
    None
}

// ============================================================================
// Handler
// ============================================================================

/// Run the pipeline for the submitted URL and stream the result.
pub async fn download(State(state): State<Arc<AppState>>, form: DownloadForm) -> Response {
    match state.pipeline().run(&form.url).await {
        Ok(delivery) => deliver(delivery).await,
        Err(e) => error_response(&e),
    }
}

async fn deliver(delivery: Delivery) -> Response {
    let file_name = delivery.file_name();
    let size = delivery.size_bytes;
    let media_id = delivery.media_id.clone();

    // Opening failures sweep the artifacts inside into_stream
    let stream = match delivery.into_stream().await {
        Ok(stream) => stream,
        Err(e) => {
            error!(media_id = %media_id, error = %e, "Failed to open muxed output");
            return (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error").into_response();
        }
    };

    let disposition = HeaderValue::from_str(&content_disposition(&file_name)).unwrap_or_else(|e| {
        warn!(file_name = %file_name, error = %e, "Unusable file name for Content-Disposition");
        HeaderValue::from_static("attachment; filename=\"video.mp4\"")
    });

    (
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, HeaderValue::from_static("video/mp4")),
            (header::CONTENT_LENGTH, HeaderValue::from(size)),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        Body::from_stream(stream),
    )
        .into_response()
}

/// Map a pipeline failure to its response.
pub fn error_response(err: &PipelineError) -> Response {
    (status_for(err.kind()), err.user_message()).into_response()
}

/// HTTP status for each failure kind.
pub fn status_for(kind: ErrorKind) -> StatusCode {
    match kind {
        ErrorKind::InvalidUrl => StatusCode::BAD_REQUEST,
        ErrorKind::Unavailable => StatusCode::NOT_FOUND,
        ErrorKind::Timeout => StatusCode::GATEWAY_TIMEOUT,
        ErrorKind::MetadataFailure
        | ErrorKind::FetchFailed
        | ErrorKind::MuxFailed
        | ErrorKind::Internal => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

/// `attachment` disposition with an ASCII `filename` and the exact name as
/// a percent-encoded UTF-8 `filename*`.
pub fn content_disposition(file_name: &str) -> String {
    let ascii: String = file_name
        .chars()
        .map(|c| {
            if c.is_ascii_graphic() || c == ' ' {
                match c {
                    '"' | '\\' => '_',
                    c => c,
                }
            } else {
                '_'
            }
        })
        .collect();

    format!(
        "attachment; filename=\"{}\"; filename*=UTF-8''{}",
        ascii,
        urlencoding::encode(file_name)
    )
}
