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

//! Edgeaction Server
//!
//! This crate exposes functions as HTTP actions. A request is routed by path
//! to an [`Action`], the action's verb map picks a handler, the arguments are
//! rebuilt from the query string or multipart body, the handler runs, and
//! its [`ActionResult`] is sent back tagged with its data kind.
//!
//! # Components
//!
//! - [`handler`]: the [`ActionHandler`] trait, [`handler_fn`] and the
//!   per-request [`ActionContext`]
//! - [`action`]: the verb map mounted under one path
//! - [`unmarshal`] / [`marshal`]: request arguments in, tagged responses out
//! - [`dispatcher`]: one request through the whole pipeline
//! - [`http_server`]: axum router, body limit, optional header check and CORS

pub mod action;
pub mod config;
pub mod dispatcher;
pub mod handler;
pub mod http_server;
pub mod marshal;
pub mod result;
pub mod unmarshal;

pub use action::Action;
pub use config::{ServerConfig, DEFAULT_MAX_BODY_BYTES};
pub use dispatcher::ActionDispatcher;
pub use handler::{handler_fn, ActionContext, ActionHandler, BoxFuture, FnHandler, HandlerResult};
pub use http_server::ActionServer;
pub use result::ActionResult;
