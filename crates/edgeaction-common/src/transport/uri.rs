//! URI escaping compatible with the ECMAScript `encodeURI` family.
//!
//! JSON text is escaped before it goes on the wire so that peers written
//! against the browser globals read it back unchanged.

use percent_encoding::{percent_decode_str, utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};

use crate::protocol::error::{ActionError, Result};

/// Everything `encodeURIComponent` escapes.
const URI_COMPONENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'~')
    .remove(b'*')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')');

/// Everything `encodeURI` escapes; reserved delimiters pass through.
const URI: &AsciiSet = &URI_COMPONENT
    .remove(b';')
    .remove(b',')
    .remove(b'/')
    .remove(b'?')
    .remove(b':')
    .remove(b'@')
    .remove(b'&')
    .remove(b'=')
    .remove(b'+')
    .remove(b'$')
    .remove(b'#');

/// Escapes like `encodeURI`.
///
/// ```
/// use edgeaction_common::transport::uri::encode_uri;
///
/// assert_eq!(encode_uri("\"hello world\""), "%22hello%20world%22");
/// assert_eq!(encode_uri("a/b?c=d"), "a/b?c=d");
/// ```
pub fn encode_uri(text: &str) -> String {
    utf8_percent_encode(text, URI).to_string()
}

/// Escapes like `encodeURIComponent`.
///
/// ```
/// use edgeaction_common::transport::uri::encode_uri_component;
///
/// assert_eq!(encode_uri_component("a/b?c=d"), "a%2Fb%3Fc%3Dd");
/// ```
pub fn encode_uri_component(text: &str) -> String {
    utf8_percent_encode(text, URI_COMPONENT).to_string()
}

/// Reverses either escaping. `key` names the field in the error raised when
/// the escapes do not decode to UTF-8.
pub fn decode_uri(key: &str, text: &str) -> Result<String> {
    percent_decode_str(text)
        .decode_utf8()
        .map(|decoded| decoded.into_owned())
        .map_err(|e| ActionError::malformed(key, format!("invalid URI escape: {}", e)))
}
