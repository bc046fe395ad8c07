pub mod argument;
pub mod error;
pub mod file;
pub mod form;
pub mod kind;


pub use argument::Argument;
pub use error::{ActionError, Result};
pub use file::{ActionFile, Blob, FileMetadata, DEFAULT_CONTENT_TYPE};
pub use form::{FieldValue, FormBody, FormField};
pub use kind::{
    is_action_method, is_action_request, is_read_only, DataKind, ACTION_METHODS,
    DATA_KIND_HEADER, FILE_DATA_HEADER, PARAMS_URL_HEADER, SERVER_ACTION_HEADER,
};
