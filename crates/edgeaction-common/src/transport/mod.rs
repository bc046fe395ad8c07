//! Edgeaction Transport Layer
//!
//! This module turns argument lists into transport-ready request parts and
//! back.
//!
//! # Architecture
//!
//! - **[`codec`]**: client-side encoding of `Vec<Argument>` into a multipart
//!   [`FormBody`](crate::FormBody) or [`QueryParams`], depending on the verb
//! - **[`decode`]**: server-side reconstruction of the argument list from a
//!   form body or a query string
//! - **[`uri`]**: `encodeURI` / `encodeURIComponent` compatible escaping used
//!   for JSON text on the wire
//!
//! Both directions share the field key grammar defined by the constants in
//! [`codec`], so an encoded list always decodes back in its original order.

pub mod codec;
pub mod decode;
pub mod uri;

pub use codec::{
    encode_arguments, EncodedArgs, QueryParams, FILES_PREFIX, FILE_PREFIX, JSON_PREFIX,
    QUERY_PREFIX,
};
pub use decode::{decode_form, decode_query};
