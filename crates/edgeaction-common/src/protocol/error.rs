use hyper::{Method, StatusCode};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ActionError {
    #[error("Method {0} Not Allowed")]
    MethodNotAllowed(Method),

    #[error("Method {0} Not Implemented")]
    NotImplemented(Method),

    #[error("Malformed argument {key}: {reason}")]
    MalformedArgument { key: String, reason: String },

    #[error("Unsupported return type from action: {0}")]
    UnsupportedResultType(String),

    #[error("error when calling action {url}: {status}")]
    ActionCallFailed { url: String, status: StatusCode },

    #[error("Unsupported data type returned from server action: {0}")]
    UnsupportedDataType(String),

    #[error("only one argument is permitted when passing a form body to an action")]
    MixedFormBody,

    #[error(
        "only files are permitted inside an array of files (argument {position}, element {index})"
    )]
    NonFileInBatch { position: usize, index: usize },

    #[error("argument {position} carries binary data and cannot be sent with {method}")]
    BinaryInQuery { position: usize, method: Method },

    #[error("argument {position} embeds a file inside a JSON value")]
    FileInJson { position: usize },

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Multipart error: {0}")]
    Multipart(String),

    #[error("Request body too large: {0}")]
    PayloadTooLarge(String),

    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Handler error: {0}")]
    Handler(String),

    #[error("JSON serialization error: {0}")]
    JsonSerialization(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl ActionError {
    /// Wraps any displayable failure raised inside an action handler.
    pub fn handler(err: impl std::fmt::Display) -> Self {
        ActionError::Handler(err.to_string())
    }

    pub fn malformed(key: impl Into<String>, reason: impl std::fmt::Display) -> Self {
        ActionError::MalformedArgument {
            key: key.into(),
            reason: reason.to_string(),
        }
    }

    /// HTTP status a server answers with when this error ends a request.
    pub fn status_code(&self) -> StatusCode {
        match self {
            ActionError::MethodNotAllowed(_) => StatusCode::METHOD_NOT_ALLOWED,
            ActionError::NotImplemented(_) => StatusCode::NOT_IMPLEMENTED,
            ActionError::MalformedArgument { .. }
            | ActionError::Multipart(_)
            | ActionError::JsonSerialization(_)
            | ActionError::MixedFormBody
            | ActionError::NonFileInBatch { .. }
            | ActionError::BinaryInQuery { .. }
            | ActionError::FileInJson { .. } => StatusCode::BAD_REQUEST,
            ActionError::PayloadTooLarge(_) => StatusCode::PAYLOAD_TOO_LARGE,
            ActionError::ActionCallFailed { status, .. } => *status,
            ActionError::UnsupportedResultType(_)
            | ActionError::UnsupportedDataType(_)
            | ActionError::InvalidResponse(_)
            | ActionError::Transport(_)
            | ActionError::Handler(_)
            | ActionError::Io(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

pub type Result<T> = std::result::Result<T, ActionError>;
