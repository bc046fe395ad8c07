// Copyright 2025 Edgeaction Authors
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Edgeaction Common Types and Codec
//!
//! This crate provides the protocol definitions shared by the edgeaction
//! client and server, plus the argument codec both sides agree on.
//!
//! # Overview
//!
//! An *action* is a server function called like a local one: the client
//! serializes the call arguments into an HTTP request, the server rebuilds
//! them, invokes the function and tags the result so the client can rebuild
//! it on the other side.
//!
//! - **Protocol Layer**: arguments, files, form bodies, data kinds and errors
//! - **Transport Layer**: argument encoding (multipart fields or query
//!   parameters), the matching decoders, and URI component escaping
//!
//! # Wire Format
//!
//! - **Mutating verbs** (POST, PUT, PATCH, DELETE, OPTIONS): multipart body,
//!   one field per argument keyed `FILE_<n>`, `FILES_<n>` (repeated for each
//!   file of a batch) or `JSON_<n>` (URI-encoded JSON text)
//! - **Read verbs** (GET, HEAD): one query parameter `arg_<i>` per argument
//! - **Results**: body plus a `datatype` header (`json`, `blob`, `file`,
//!   `response`); files also carry `filedata` with their name and timestamp
//!
//! # Example
//!
//! ```
//! use edgeaction_common::{encode_arguments, Argument, EncodedArgs};
//! use hyper::Method;
//!
//! let encoded = encode_arguments(
//!     vec![Argument::from("hello"), Argument::from(42)],
//!     &Method::POST,
//! ).unwrap();
//!
//! match encoded {
//!     EncodedArgs::Body(form) => assert_eq!(form.len(), 2),
//!     _ => unreachable!(),
//! }
//! ```

pub mod protocol;
pub mod transport;

pub use protocol::*;
pub use transport::{decode_form, decode_query, encode_arguments, EncodedArgs, QueryParams};
