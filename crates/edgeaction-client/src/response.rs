//! Response decoding.
//!
//! The server tags every result with a `datatype` header; this module is the
//! inverse of the server's response marshaller and turns a tagged HTTP
//! response back into an [`ActionValue`].

use edgeaction_common::protocol::error::{ActionError, Result};
use edgeaction_common::{
    ActionFile, Blob, DataKind, FileMetadata, DATA_KIND_HEADER, DEFAULT_CONTENT_TYPE,
    FILE_DATA_HEADER,
};
use hyper::header::CONTENT_TYPE;
use hyper::StatusCode;
use serde_json::Value;

/// A decoded action result.
#[derive(Debug)]
pub enum ActionValue {
    /// A JSON value (`datatype: json`)
    Json(Value),
    /// Raw bytes with their MIME type (`datatype: blob`)
    Blob(Blob),
    /// A file rebuilt from the body and the `filedata` header (`datatype: file`)
    File(ActionFile),
    /// The untouched HTTP response (`datatype: response`)
    Response(reqwest::Response),
    /// No content; the action returned nothing
    Empty,
}

impl ActionValue {
    /// The data kind this value was tagged with, `None` for `Empty`.
    pub fn kind(&self) -> Option<DataKind> {
        match self {
            ActionValue::Json(_) => Some(DataKind::Json),
            ActionValue::Blob(_) => Some(DataKind::Blob),
            ActionValue::File(_) => Some(DataKind::File),
            ActionValue::Response(_) => Some(DataKind::Response),
            ActionValue::Empty => None,
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, ActionValue::Empty)
    }

    pub fn as_json(&self) -> Option<&Value> {
        match self {
            ActionValue::Json(value) => Some(value),
            _ => None,
        }
    }

    pub fn into_json(self) -> Option<Value> {
        match self {
            ActionValue::Json(value) => Some(value),
            _ => None,
        }
    }

    pub fn into_blob(self) -> Option<Blob> {
        match self {
            ActionValue::Blob(blob) => Some(blob),
            _ => None,
        }
    }

    pub fn into_file(self) -> Option<ActionFile> {
        match self {
            ActionValue::File(file) => Some(file),
            _ => None,
        }
    }

    pub fn into_response(self) -> Option<reqwest::Response> {
        match self {
            ActionValue::Response(response) => Some(response),
            _ => None,
        }
    }
}

/// Decodes an action response.
///
/// # Errors
///
/// - [`ActionError::ActionCallFailed`]: the status is not 2xx
/// - [`ActionError::UnsupportedDataType`]: the tag is missing or unknown and
///   the body is not JSON either
/// - [`ActionError::InvalidResponse`]: a file result without readable
///   `filedata`, or a body that does not match its tag
pub async fn decode_response(response: reqwest::Response) -> Result<ActionValue> {
    ensure_success(&response)?;

    let tag = response
        .headers()
        .get(DATA_KIND_HEADER)
        .and_then(|value| value.to_str().ok())
        .map(str::to_owned);

    match tag.as_deref().and_then(DataKind::parse) {
        Some(DataKind::Json) => {
            let body = read_body(response).await?;
            let value = serde_json::from_slice(&body)
                .map_err(|e| ActionError::InvalidResponse(format!("Invalid JSON result: {}", e)))?;
            Ok(ActionValue::Json(value))
        }
        Some(DataKind::Blob) => {
            let content_type = content_type_of(&response);
            let body = read_body(response).await?;
            Ok(ActionValue::Blob(Blob::new(body).with_content_type(content_type)))
        }
        Some(DataKind::File) => {
            let metadata = file_metadata_of(&response)?;
            let content_type = content_type_of(&response);
            let body = read_body(response).await?;
            Ok(ActionValue::File(ActionFile::from_metadata(metadata, content_type, body)))
        }
        Some(DataKind::Response) => Ok(ActionValue::Response(response)),
        None => decode_untagged(response, tag).await,
    }
}

/// Decodes the answer to a HEAD call.
///
/// HEAD responses carry no body, so only a `response` tag yields a value;
/// every other result is [`ActionValue::Empty`].
pub fn decode_head_response(response: reqwest::Response) -> Result<ActionValue> {
    ensure_success(&response)?;

    let tag = response
        .headers()
        .get(DATA_KIND_HEADER)
        .and_then(|value| value.to_str().ok())
        .and_then(DataKind::parse);

    match tag {
        Some(DataKind::Response) => Ok(ActionValue::Response(response)),
        _ => Ok(ActionValue::Empty),
    }
}

fn ensure_success(response: &reqwest::Response) -> Result<()> {
    let status = response.status();
    if status.is_success() {
        Ok(())
    } else {
        Err(ActionError::ActionCallFailed {
            url: response.url().to_string(),
            status,
        })
    }
}

/// Best effort for responses without a known tag: nothing for empty bodies,
/// JSON when the body parses, an error naming the tag otherwise.
async fn decode_untagged(response: reqwest::Response, tag: Option<String>) -> Result<ActionValue> {
    if response.status() == StatusCode::NO_CONTENT {
        return Ok(ActionValue::Empty);
    }

    let body = read_body(response).await?;
    if body.is_empty() {
        return Ok(ActionValue::Empty);
    }

    serde_json::from_slice(&body).map(ActionValue::Json).map_err(|_| {
        let tag = tag.unwrap_or_else(|| "none".to_string());
        tracing::warn!(tag = %tag, "action response carried an unsupported data type");
        ActionError::UnsupportedDataType(tag)
    })
}

async fn read_body(response: reqwest::Response) -> Result<hyper::body::Bytes> {
    response
        .bytes()
        .await
        .map_err(|e| ActionError::Transport(format!("Failed to read response: {}", e)))
}

fn content_type_of(response: &reqwest::Response) -> String {
    response
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .unwrap_or(DEFAULT_CONTENT_TYPE)
        .to_string()
}

fn file_metadata_of(response: &reqwest::Response) -> Result<FileMetadata> {
    let header = response
        .headers()
        .get(FILE_DATA_HEADER)
        .ok_or_else(|| {
            ActionError::InvalidResponse("File result without filedata header".to_string())
        })?;
    serde_json::from_slice(header.as_bytes())
        .map_err(|e| ActionError::InvalidResponse(format!("Invalid filedata header: {}", e)))
}
