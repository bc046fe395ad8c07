use hyper::Method;
use url::form_urlencoded;

use crate::protocol::argument::Argument;
use crate::protocol::error::{ActionError, Result};
use crate::protocol::file::ActionFile;
use crate::protocol::form::FormBody;
use crate::protocol::kind::is_read_only;

use super::uri::{encode_uri, encode_uri_component};

/// Field key prefix for a single file argument.
pub const FILE_PREFIX: &str = "FILE_";
/// Field key prefix for a file batch; the key repeats once per file.
pub const FILES_PREFIX: &str = "FILES_";
/// Field key prefix for JSON text arguments.
pub const JSON_PREFIX: &str = "JSON_";
/// Query parameter prefix for read-verb arguments.
pub const QUERY_PREFIX: &str = "arg_";

/// Transport-ready form of an argument list.
#[derive(Debug, Clone, PartialEq)]
pub enum EncodedArgs {
    /// Nothing to send: no body, no query string.
    Empty,
    /// Multipart body for mutating verbs.
    Body(FormBody),
    /// Query parameters for read verbs.
    Query(QueryParams),
}

/// Ordered query parameters.
///
/// Values are already `encodeURIComponent`-escaped JSON. Rendering them with
/// [`to_query_string`](Self::to_query_string) form-encodes them once more,
/// which is exactly what `URLSearchParams.append` does in a browser.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryParams {
    pairs: Vec<(String, String)>,
}

impl QueryParams {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.pairs.push((name.into(), value.into()));
    }

    pub fn pairs(&self) -> &[(String, String)] {
        &self.pairs
    }

    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    pub fn to_query_string(&self) -> String {
        form_urlencoded::Serializer::new(String::new())
            .extend_pairs(self.pairs.iter())
            .finish()
    }
}

/// Encodes call arguments for `method`.
///
/// Read verbs (GET, HEAD) produce one query parameter per argument and
/// reject anything binary before a request is ever built. Every other verb
/// produces a multipart body keyed by argument kind and position; a single
/// [`Argument::Form`] is passed through untouched.
///
/// # Errors
///
/// - [`ActionError::BinaryInQuery`]: a file or form body with a read verb
/// - [`ActionError::MixedFormBody`]: a form body next to other arguments
/// - [`ActionError::NonFileInBatch`]: a file-headed array with a non-file
/// - [`ActionError::FileInJson`]: a file nested inside a JSON array
///
/// # Example
///
/// ```
/// use edgeaction_common::{encode_arguments, Argument, EncodedArgs, FieldValue};
/// use hyper::Method;
///
/// let encoded = encode_arguments(vec!["hello".into(), 42.into()], &Method::POST).unwrap();
/// let EncodedArgs::Body(form) = encoded else { unreachable!() };
///
/// let keys: Vec<_> = form.keys().collect();
/// assert_eq!(keys, ["JSON_1", "JSON_2"]);
/// assert_eq!(form.get("JSON_1"), Some(&FieldValue::Text("%22hello%22".into())));
/// ```
pub fn encode_arguments(args: Vec<Argument>, method: &Method) -> Result<EncodedArgs> {
    if args.is_empty() {
        return Ok(EncodedArgs::Empty);
    }

    if is_read_only(method) {
        let query = encode_query(&args, method)?;
        tracing::debug!(
            method = %method,
            params = query.len(),
            "encoded action arguments as query"
        );
        return Ok(EncodedArgs::Query(query));
    }

    let form = encode_form(args)?;
    tracing::debug!(method = %method, fields = form.len(), "encoded action arguments as form");
    Ok(EncodedArgs::Body(form))
}

fn encode_query(args: &[Argument], method: &Method) -> Result<QueryParams> {
    let mut query = QueryParams::new();
    for (position, arg) in args.iter().enumerate() {
        if arg.is_binary() {
            return Err(ActionError::BinaryInQuery {
                position,
                method: method.clone(),
            });
        }
        let json = serde_json::to_string(&arg.to_json_value(position)?)?;
        query.push(format!("{}{}", QUERY_PREFIX, position), encode_uri_component(&json));
    }
    Ok(query)
}

fn encode_form(mut args: Vec<Argument>) -> Result<FormBody> {
    if args.len() == 1 {
        if let Some(Argument::Form(_)) = args.first() {
            if let Some(Argument::Form(form)) = args.pop() {
                return Ok(form);
            }
        }
    }
    if args.iter().any(|arg| matches!(arg, Argument::Form(_))) {
        return Err(ActionError::MixedFormBody);
    }

    let mut form = FormBody::new();
    // Shared by every kind, bumped once per argument so positions survive
    // the trip even when a batch expands into many fields.
    let mut index = 0usize;

    for (position, arg) in args.into_iter().enumerate() {
        index += 1;
        match arg {
            Argument::File(file) => {
                form.append_file(format!("{}{}", FILE_PREFIX, index), file);
            }
            Argument::Files(files) if !files.is_empty() => {
                append_batch(&mut form, index, files);
            }
            Argument::Array(items) if items.first().is_some_and(Argument::is_file) => {
                let files = into_batch(items, position)?;
                append_batch(&mut form, index, files);
            }
            other => {
                let json = serde_json::to_string(&other.to_json_value(position)?)?;
                form.append_text(format!("{}{}", JSON_PREFIX, index), encode_uri(&json));
            }
        }
    }

    Ok(form)
}

fn append_batch(form: &mut FormBody, index: usize, files: Vec<ActionFile>) {
    let key = format!("{}{}", FILES_PREFIX, index);
    for file in files {
        form.append_file(key.clone(), file);
    }
}

fn into_batch(items: Vec<Argument>, position: usize) -> Result<Vec<ActionFile>> {
    items
        .into_iter()
        .enumerate()
        .map(|(index, item)| match item {
            Argument::File(file) => Ok(file),
            _ => Err(ActionError::NonFileInBatch { position, index }),
        })
        .collect()
}
