//! Positional call arguments.

use serde::Serialize;
use serde_json::Value;

use super::error::{ActionError, Result};
use super::file::ActionFile;
use super::form::FormBody;

/// One positional argument of an action call.
///
/// # Variants
///
/// - `Json`: any JSON value, primitives included
/// - `File`: a single file
/// - `Files`: an ordered batch of files sent under one repeated field key
/// - `Array`: a loosely typed array as written at the call site; it is sent
///   as a batch when its first element is a file and as JSON otherwise
/// - `Form`: a pre-built multipart body, only valid as the sole argument
/// - `Missing`: a declared parameter the caller did not supply
///
/// # Example
///
/// ```
/// use edgeaction_common::{ActionFile, Argument};
/// use serde_json::json;
///
/// let args = vec![
///     Argument::from("hello"),
///     Argument::from(json!({"tags": ["a", "b"]})),
///     Argument::from(ActionFile::new("photo.png", vec![0x89, 0x50])),
/// ];
/// assert!(args[2].is_file());
/// ```
#[derive(Debug, Clone, PartialEq)]
pub enum Argument {
    Json(Value),
    File(ActionFile),
    Files(Vec<ActionFile>),
    Array(Vec<Argument>),
    Form(FormBody),
    Missing,
}

impl Argument {
    /// Serializes any value into a JSON argument.
    pub fn json<T: Serialize + ?Sized>(value: &T) -> Result<Self> {
        Ok(Argument::Json(serde_json::to_value(value)?))
    }

    pub fn is_file(&self) -> bool {
        matches!(self, Argument::File(_))
    }

    pub fn is_missing(&self) -> bool {
        matches!(self, Argument::Missing)
    }

    /// Whether this argument needs a multipart body to travel.
    pub fn is_binary(&self) -> bool {
        match self {
            Argument::File(_) | Argument::Form(_) => true,
            Argument::Files(files) => !files.is_empty(),
            Argument::Array(items) => items.iter().any(Argument::is_binary),
            Argument::Json(_) | Argument::Missing => false,
        }
    }

    pub fn as_json(&self) -> Option<&Value> {
        match self {
            Argument::Json(value) => Some(value),
            _ => None,
        }
    }

    pub fn as_file(&self) -> Option<&ActionFile> {
        match self {
            Argument::File(file) => Some(file),
            _ => None,
        }
    }

    pub fn as_files(&self) -> Option<&[ActionFile]> {
        match self {
            Argument::Files(files) => Some(files),
            _ => None,
        }
    }

    /// Renders the argument as JSON text content.
    ///
    /// `Missing` becomes `null`. Binary content cannot be embedded and fails
    /// with [`ActionError::FileInJson`] naming `position`.
    pub fn to_json_value(&self, position: usize) -> Result<Value> {
        match self {
            Argument::Json(value) => Ok(value.clone()),
            Argument::Missing => Ok(Value::Null),
            Argument::Files(files) if files.is_empty() => Ok(Value::Array(Vec::new())),
            Argument::Array(items) => items
                .iter()
                .map(|item| item.to_json_value(position))
                .collect::<Result<Vec<_>>>()
                .map(Value::Array),
            Argument::File(_) | Argument::Files(_) | Argument::Form(_) => {
                Err(ActionError::FileInJson { position })
            }
        }
    }

    /// Deserializes a JSON argument into `T`; `Missing` reads as `null`.
    pub fn parse<T: serde::de::DeserializeOwned>(&self) -> Result<T> {
        match self {
            Argument::Json(value) => Ok(T::deserialize(value)?),
            Argument::Missing => Ok(T::deserialize(Value::Null)?),
            _ => Err(ActionError::malformed(
                "argument",
                "expected a JSON value, found binary content",
            )),
        }
    }
}

impl From<Value> for Argument {
    fn from(value: Value) -> Self {
        Argument::Json(value)
    }
}

impl From<&str> for Argument {
    fn from(value: &str) -> Self {
        Argument::Json(Value::String(value.to_string()))
    }
}

impl From<String> for Argument {
    fn from(value: String) -> Self {
        Argument::Json(Value::String(value))
    }
}

impl From<bool> for Argument {
    fn from(value: bool) -> Self {
        Argument::Json(Value::Bool(value))
    }
}

impl From<i64> for Argument {
    fn from(value: i64) -> Self {
        Argument::Json(Value::from(value))
    }
}

impl From<i32> for Argument {
    fn from(value: i32) -> Self {
        Argument::Json(Value::from(value))
    }
}

impl From<u64> for Argument {
    fn from(value: u64) -> Self {
        Argument::Json(Value::from(value))
    }
}

impl From<f64> for Argument {
    fn from(value: f64) -> Self {
        Argument::Json(Value::from(value))
    }
}

impl From<ActionFile> for Argument {
    fn from(file: ActionFile) -> Self {
        Argument::File(file)
    }
}

impl From<Vec<ActionFile>> for Argument {
    fn from(files: Vec<ActionFile>) -> Self {
        Argument::Files(files)
    }
}

impl From<Vec<Argument>> for Argument {
    fn from(items: Vec<Argument>) -> Self {
        Argument::Array(items)
    }
}

impl From<FormBody> for Argument {
    fn from(form: FormBody) -> Self {
        Argument::Form(form)
    }
}

impl<T: Into<Argument>> From<Option<T>> for Argument {
    fn from(value: Option<T>) -> Self {
        value.map(Into::into).unwrap_or(Argument::Missing)
    }
}
