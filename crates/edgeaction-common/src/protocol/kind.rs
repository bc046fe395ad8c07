//! Result data kinds, protocol headers and verb classification.

use std::fmt;
use std::str::FromStr;

use hyper::{HeaderMap, Method};

/// Response header carrying the [`DataKind`] tag.
pub const DATA_KIND_HEADER: &str = "datatype";
/// Response header carrying [`FileMetadata`](super::FileMetadata) JSON for file results.
pub const FILE_DATA_HEADER: &str = "filedata";
/// Request header marking protocol traffic.
pub const SERVER_ACTION_HEADER: &str = "x-server-action";
/// Request header set when arguments travel in the query string.
pub const PARAMS_URL_HEADER: &str = "x-params-url";

/// Verbs an action can be configured for.
pub const ACTION_METHODS: [Method; 7] = [
    Method::GET,
    Method::POST,
    Method::PUT,
    Method::DELETE,
    Method::PATCH,
    Method::HEAD,
    Method::OPTIONS,
];

/// How the client must interpret a response body.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DataKind {
    Json,
    Blob,
    File,
    Response,
}

impl DataKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            DataKind::Json => "json",
            DataKind::Blob => "blob",
            DataKind::File => "file",
            DataKind::Response => "response",
        }
    }

    pub fn parse(tag: &str) -> Option<Self> {
        match tag {
            "json" => Some(DataKind::Json),
            "blob" => Some(DataKind::Blob),
            "file" => Some(DataKind::File),
            "response" => Some(DataKind::Response),
            _ => None,
        }
    }
}

impl fmt::Display for DataKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DataKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        DataKind::parse(s).ok_or_else(|| s.to_string())
    }
}

/// Read verbs carry no body, so their arguments go in the query string.
pub fn is_read_only(method: &Method) -> bool {
    *method == Method::GET || *method == Method::HEAD
}

pub fn is_action_method(method: &Method) -> bool {
    ACTION_METHODS.contains(method)
}

/// Whether the request was sent by an action client.
pub fn is_action_request(headers: &HeaderMap) -> bool {
    headers
        .get(SERVER_ACTION_HEADER)
        .and_then(|value| value.to_str().ok())
        .is_some_and(|value| !value.is_empty() && value != "false")
}
