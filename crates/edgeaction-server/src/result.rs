use std::fmt;

use axum::response::Response;
use edgeaction_common::protocol::error::{ActionError, Result};
use edgeaction_common::{ActionFile, Blob, DataKind};
use serde::Serialize;
use serde_json::Value;

/// What an action hands back.
///
/// The variant decides how the result travels: JSON text, raw bytes, a
/// named file, an HTTP response passed through as is, or nothing at all.
pub enum ActionResult {
    Json(Value),
    Blob(Blob),
    File(ActionFile),
    Response(Response),
    Empty,
}

impl ActionResult {
    /// Serializes any value into a JSON result.
    ///
    /// # Errors
    ///
    /// [`ActionError::UnsupportedResultType`] when the value cannot be
    /// represented as JSON (e.g. a map with non-string keys).
    pub fn json<T: Serialize + ?Sized>(value: &T) -> Result<Self> {
        serde_json::to_value(value)
            .map(ActionResult::Json)
            .map_err(|e| ActionError::UnsupportedResultType(e.to_string()))
    }

    /// Data kind announced for this result, `None` for `Empty`.
    pub fn kind(&self) -> Option<DataKind> {
        match self {
            ActionResult::Json(_) => Some(DataKind::Json),
            ActionResult::Blob(_) => Some(DataKind::Blob),
            ActionResult::File(_) => Some(DataKind::File),
            ActionResult::Response(_) => Some(DataKind::Response),
            ActionResult::Empty => None,
        }
    }
}

impl fmt::Debug for ActionResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ActionResult::Json(value) => f.debug_tuple("Json").field(value).finish(),
            ActionResult::Blob(blob) => f.debug_tuple("Blob").field(blob).finish(),
            ActionResult::File(file) => f.debug_tuple("File").field(file).finish(),
            ActionResult::Response(response) => f
                .debug_struct("Response")
                .field("status", &response.status())
                .field("headers", response.headers())
                .finish(),
            ActionResult::Empty => f.write_str("Empty"),
        }
    }
}

impl From<Value> for ActionResult {
    fn from(value: Value) -> Self {
        ActionResult::Json(value)
    }
}

impl From<Blob> for ActionResult {
    fn from(blob: Blob) -> Self {
        ActionResult::Blob(blob)
    }
}

impl From<ActionFile> for ActionResult {
    fn from(file: ActionFile) -> Self {
        ActionResult::File(file)
    }
}

impl From<Response> for ActionResult {
    fn from(response: Response) -> Self {
        ActionResult::Response(response)
    }
}

impl From<()> for ActionResult {
    fn from(_: ()) -> Self {
        ActionResult::Empty
    }
}
