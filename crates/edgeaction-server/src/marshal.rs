//! Response marshalling.
//!
//! Every successful result leaves the server tagged with a `datatype`
//! header so the client knows how to read the body; `Empty` becomes a bare
//! 204 instead.

use axum::body::Body;
use axum::response::{IntoResponse, Response};
use edgeaction_common::protocol::error::{ActionError, Result};
use edgeaction_common::{ActionFile, Blob, DataKind, DATA_KIND_HEADER, FILE_DATA_HEADER};
use hyper::header::{HeaderValue, CONTENT_TYPE};
use hyper::StatusCode;

use crate::result::ActionResult;

const APPLICATION_JSON: &str = "application/json";

/// Renders a handler result as an HTTP response.
///
/// # Errors
///
/// [`ActionError::UnsupportedResultType`] when a header cannot carry the
/// result's metadata, e.g. a content type with control characters.
pub fn into_http_response(result: ActionResult) -> Result<Response> {
    match result {
        ActionResult::Json(value) => {
            let body = serde_json::to_vec(&value)?;
            tagged(DataKind::Json, APPLICATION_JSON, body)
        }
        ActionResult::Blob(Blob {
            content_type,
            bytes,
        }) => tagged(DataKind::Blob, &content_type, bytes),
        ActionResult::File(file) => file_response(file),
        ActionResult::Response(mut response) => {
            response
                .headers_mut()
                .insert(DATA_KIND_HEADER, HeaderValue::from_static(DataKind::Response.as_str()));
            Ok(response)
        }
        ActionResult::Empty => Ok(StatusCode::NO_CONTENT.into_response()),
    }
}

/// Plain-text error response carrying the error's status and message.
pub fn error_response(err: &ActionError) -> Response {
    (err.status_code(), err.to_string()).into_response()
}

fn tagged(kind: DataKind, content_type: &str, body: impl Into<Body>) -> Result<Response> {
    hyper::Response::builder()
        .status(StatusCode::OK)
        .header(DATA_KIND_HEADER, kind.as_str())
        .header(CONTENT_TYPE, content_type)
        .body(body.into())
        .map_err(|e| ActionError::UnsupportedResultType(format!("{} result: {}", kind, e)))
}

fn file_response(file: ActionFile) -> Result<Response> {
    // Raw UTF-8 is allowed in header values, so non-ASCII names go through.
    let metadata = serde_json::to_vec(&file.metadata())?;
    let metadata = HeaderValue::from_bytes(&metadata)
        .map_err(|e| {
            ActionError::UnsupportedResultType(format!("file metadata for {}: {}", file.name, e))
        })?;

    let mut response = tagged(DataKind::File, &file.content_type, file.bytes)?;
    response.headers_mut().insert(FILE_DATA_HEADER, metadata);
    Ok(response)
}
