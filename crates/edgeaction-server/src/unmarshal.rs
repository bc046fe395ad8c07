//! Request unmarshalling.
//!
//! Turns an incoming request back into the positional argument list the
//! client encoded: read verbs from the query string, everything else from a
//! multipart body.

use axum::extract::multipart::MultipartError;
use axum::extract::{FromRequest, Multipart, Request};
use edgeaction_common::protocol::error::{ActionError, Result};
use edgeaction_common::{
    decode_form, decode_query, is_read_only, ActionFile, Argument, FormBody, DEFAULT_CONTENT_TYPE,
};
use hyper::header::CONTENT_TYPE;
use hyper::StatusCode;

const MULTIPART_FORM_DATA: &str = "multipart/form-data";

/// Reads the arguments carried by `req`.
///
/// A request that is neither a read verb with a query string nor a
/// multipart body carries no arguments.
///
/// # Errors
///
/// - [`ActionError::MalformedArgument`]: a value is not valid JSON or has
///   bad percent escapes
/// - [`ActionError::Multipart`]: the body cannot be parsed
/// - [`ActionError::PayloadTooLarge`]: the body exceeds the server's limit
pub async fn read_arguments(req: Request) -> Result<Vec<Argument>> {
    if is_read_only(req.method()) {
        return match req.uri().query() {
            Some(query) => decode_query(query),
            None => Ok(Vec::new()),
        };
    }

    if !is_multipart(&req) {
        return Ok(Vec::new());
    }

    let multipart = Multipart::from_request(req, &())
        .await
        .map_err(|e| multipart_error(e.status(), e.body_text()))?;
    let form = read_form(multipart).await?;
    decode_form(&form)
}

/// Collects every multipart field in transport order. Fields with a file
/// name become files, the rest text.
pub async fn read_form(mut multipart: Multipart) -> Result<FormBody> {
    let mut form = FormBody::new();

    while let Some(field) = multipart.next_field().await.map_err(from_multipart)? {
        let name = field.name().unwrap_or_default().to_string();
        match field.file_name().map(str::to_string) {
            Some(file_name) => {
                let content_type = field.content_type().unwrap_or(DEFAULT_CONTENT_TYPE).to_string();
                let bytes = field.bytes().await.map_err(from_multipart)?;
                let file = ActionFile::new(file_name, bytes).with_content_type(content_type);
                form.append_file(name, file);
            }
            None => {
                let text = field.text().await.map_err(from_multipart)?;
                form.append_text(name, text);
            }
        }
    }

    Ok(form)
}

/// Pads `args` with [`Argument::Missing`] up to `arity` entries.
pub fn pad_arguments(args: &mut Vec<Argument>, arity: usize) {
    if args.len() < arity {
        args.resize(arity, Argument::Missing);
    }
}

fn from_multipart(err: MultipartError) -> ActionError {
    multipart_error(err.status(), err.body_text())
}

fn multipart_error(status: StatusCode, message: String) -> ActionError {
    if status == StatusCode::PAYLOAD_TOO_LARGE {
        ActionError::PayloadTooLarge(message)
    } else {
        ActionError::Multipart(message)
    }
}

fn is_multipart(req: &Request) -> bool {
    req.headers()
        .get(CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .is_some_and(|value| value.starts_with(MULTIPART_FORM_DATA))
}
