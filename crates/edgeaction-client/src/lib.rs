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

//! Edgeaction Client
//!
//! Calls actions over HTTP: encodes the arguments with the shared codec,
//! sends one request per call and decodes the tagged response.

pub mod client;
pub mod response;

pub use client::{ActionClient, ActionStub, ClientConfig};
pub use response::{decode_head_response, decode_response, ActionValue};
