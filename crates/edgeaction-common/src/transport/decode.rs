//! Server-side argument reconstruction.

use std::collections::HashSet;

use serde_json::Value;
use url::form_urlencoded;

use crate::protocol::argument::Argument;
use crate::protocol::error::{ActionError, Result};
use crate::protocol::file::ActionFile;
use crate::protocol::form::{FieldValue, FormBody};

use super::codec::{FILES_PREFIX, FILE_PREFIX};
use super::uri::decode_uri;

/// Rebuilds the argument list from a multipart body.
///
/// Fields are read in transport order: `FILE_*` keys yield a file,
/// the first occurrence of a `FILES_*` key yields every file registered under
/// it as one batch (later repeats are skipped), and anything else is
/// URI-decoded and parsed as JSON. When every key ends in a numeric position
/// the result is ordered by it.
///
/// # Example
///
/// ```
/// use edgeaction_common::{decode_form, Argument, FormBody};
/// use serde_json::json;
///
/// let mut form = FormBody::new();
/// form.append_text("JSON_2", "42");
/// form.append_text("JSON_1", "%22hello%22");
///
/// let args = decode_form(&form).unwrap();
/// assert_eq!(args, vec![Argument::Json(json!("hello")), Argument::Json(json!(42))]);
/// ```
pub fn decode_form(form: &FormBody) -> Result<Vec<Argument>> {
    let mut decoded: Vec<(Option<u64>, Argument)> = Vec::with_capacity(form.len());
    let mut batches: HashSet<&str> = HashSet::new();

    for field in form {
        let key = field.name.as_str();
        let argument = if key.starts_with(FILE_PREFIX) {
            Argument::File(expect_file(key, &field.value)?.clone())
        } else if key.starts_with(FILES_PREFIX) {
            if !batches.insert(key) {
                continue;
            }
            let files = form
                .get_all(key)
                .into_iter()
                .map(|value| expect_file(key, value).cloned())
                .collect::<Result<Vec<_>>>()?;
            Argument::Files(files)
        } else {
            let text = field.value.as_text().ok_or_else(|| {
                ActionError::malformed(key, "expected JSON text, found a file")
            })?;
            Argument::Json(parse_json(key, &decode_uri(key, text)?)?)
        };
        decoded.push((position_of(key), argument));
    }

    if decoded.iter().all(|(position, _)| position.is_some()) {
        decoded.sort_by_key(|(position, _)| *position);
    }

    tracing::debug!(fields = form.len(), arguments = decoded.len(), "decoded form arguments");
    Ok(decoded.into_iter().map(|(_, argument)| argument).collect())
}

/// Rebuilds the argument list from a raw query string (without the `?`).
///
/// Parameters are taken in order; each value is form-decoded, then
/// URI-component-decoded, then parsed as JSON.
///
/// # Example
///
/// ```
/// use edgeaction_common::{decode_query, Argument};
/// use serde_json::json;
///
/// let args = decode_query("arg_0=%2522hi%2522&arg_1=7").unwrap();
/// assert_eq!(args, vec![Argument::Json(json!("hi")), Argument::Json(json!(7))]);
/// ```
pub fn decode_query(query: &str) -> Result<Vec<Argument>> {
    form_urlencoded::parse(query.as_bytes())
        .map(|(key, value)| {
            let text = decode_uri(&key, &value)?;
            parse_json(&key, &text).map(Argument::Json)
        })
        .collect()
}

fn expect_file<'a>(key: &str, value: &'a FieldValue) -> Result<&'a ActionFile> {
    value
        .as_file()
        .ok_or_else(|| ActionError::malformed(key, "expected a file part, found text"))
}

fn parse_json(key: &str, text: &str) -> Result<Value> {
    serde_json::from_str(text).map_err(|e| ActionError::malformed(key, e))
}

/// Numeric suffix after the last `_` of a field key.
fn position_of(key: &str) -> Option<u64> {
    key.rsplit_once('_')
        .and_then(|(_, suffix)| suffix.parse().ok())
}
