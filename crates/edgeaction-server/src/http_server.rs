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

//! HTTP Server for Edgeaction
//!
//! This module serves mounted actions over HTTP using axum.
//!
//! # Architecture
//!
//! The HTTP server:
//! - Mounts each [`Action`] at its path; `:name` segments become route
//!   parameters available to the handler
//! - Accepts every verb on a mounted path and lets the action's verb map
//!   decide (405 and 501 come from there, not from the router)
//! - Caps request bodies at the configured size
//! - Optionally rejects requests lacking `x-server-action` with 404
//! - Optionally answers CORS preflights permissively; an OPTIONS request
//!   without `Access-Control-Request-Method` is an action call and reaches
//!   its handler
//!
//! # Example
//!
//! ```no_run
//! use edgeaction_server::{handler_fn, Action, ActionResult, ActionServer, ServerConfig};
//!
//! #[tokio::main]
//! async fn main() {
//!     let echo = Action::new().post(handler_fn(1, |args, _ctx| async move {
//!         Ok(ActionResult::Json(args[0].to_json_value(0)?))
//!     }));
//!
//!     ActionServer::new(ServerConfig::default())
//!         .mount("/echo", echo)
//!         .run("127.0.0.1:8787".parse().unwrap())
//!         .await
//!         .unwrap();
//! }
//! ```

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::Arc;

use axum::extract::{DefaultBodyLimit, Path, Request};
use axum::middleware::{self, Next};
use axum::response::{IntoResponse, Response};
use axum::routing::any;
use axum::Router;
use edgeaction_common::is_action_request;
use edgeaction_common::protocol::error::{ActionError, Result};
use hyper::header::{
    HeaderValue, ACCESS_CONTROL_ALLOW_ORIGIN, ACCESS_CONTROL_EXPOSE_HEADERS,
    ACCESS_CONTROL_REQUEST_METHOD, ORIGIN,
};
use hyper::{Method, StatusCode};
use tokio::net::TcpListener;
use tower::ServiceExt;
use tower_http::cors::CorsLayer;
use tracing::info;

use crate::action::Action;
use crate::config::ServerConfig;
use crate::dispatcher::ActionDispatcher;

/// HTTP server for mounted actions.
#[derive(Debug)]
pub struct ActionServer {
    routes: Vec<(String, Action)>,
    config: ServerConfig,
}

impl ActionServer {
    pub fn new(config: ServerConfig) -> Self {
        Self {
            routes: Vec::new(),
            config,
        }
    }

    /// Mounts `action` at `path` (axum syntax, e.g. `/users/:id`).
    pub fn mount(mut self, path: impl Into<String>, action: Action) -> Self {
        self.routes.push((path.into(), action));
        self
    }

    pub fn config(&self) -> &ServerConfig {
        &self.config
    }

    /// Builds the axum router without binding a socket.
    pub fn into_router(self) -> Router {
        let env = Arc::new(self.config.env);
        let mut router = Router::new();

        for (path, action) in self.routes {
            info!(path = %path, verbs = ?action.methods(), "mounting action");
            let dispatcher = Arc::new(ActionDispatcher::new(action, env.clone()));

            router = router.route(
                &path,
                any(move |params: Option<Path<HashMap<String, String>>>, req: Request| {
                    let dispatcher = dispatcher.clone();
                    async move {
                        let params = params.map(|Path(params)| params).unwrap_or_default();
                        dispatcher.dispatch(req, params).await
                    }
                }),
            );
        }

        if self.config.require_action_header {
            router = router.layer(middleware::from_fn(require_action_header));
        }

        router = router.layer(DefaultBodyLimit::max(self.config.max_body_bytes));

        if self.config.cors {
            router = with_cors(router);
        }

        router
    }

    /// Binds `addr` and serves until the process stops.
    pub async fn run(self, addr: SocketAddr) -> Result<()> {
        let listener = TcpListener::bind(addr)
            .await
            .map_err(|e| ActionError::Transport(format!("Failed to bind to {}: {}", addr, e)))?;
        self.serve(listener).await
    }

    /// Serves on an already bound listener.
    pub async fn serve(self, listener: TcpListener) -> Result<()> {
        let app = self.into_router();

        info!(
            "Action server listening on {}",
            listener
                .local_addr()
                .map_err(|e| ActionError::Transport(format!("Failed to get local addr: {}", e)))?
        );

        axum::serve(listener, app)
            .await
            .map_err(|e| ActionError::Transport(format!("Server error: {}", e)))?;

        Ok(())
    }
}

/// Wraps `actions` in permissive CORS handling.
///
/// `CorsLayer` answers every OPTIONS request itself, so only real preflights
/// go through it. A plain OPTIONS call is routed straight to its action and
/// gets the allow-origin headers added afterwards.
fn with_cors(actions: Router) -> Router {
    let cors = actions.clone().layer(CorsLayer::permissive());

    Router::new().fallback(move |req: Request| {
        let actions = actions.clone();
        let cors = cors.clone();
        async move {
            if req.method() != Method::OPTIONS || is_preflight(&req) {
                return cors.oneshot(req).await.unwrap_or_else(|err| match err {});
            }

            let cross_origin = req.headers().contains_key(ORIGIN);
            let mut response = actions.oneshot(req).await.unwrap_or_else(|err| match err {});
            if cross_origin {
                let headers = response.headers_mut();
                headers.insert(ACCESS_CONTROL_ALLOW_ORIGIN, HeaderValue::from_static("*"));
                headers.insert(ACCESS_CONTROL_EXPOSE_HEADERS, HeaderValue::from_static("*"));
            }
            response
        }
    })
}

fn is_preflight(req: &Request) -> bool {
    req.method() == Method::OPTIONS
        && req.headers().contains_key(ORIGIN)
        && req.headers().contains_key(ACCESS_CONTROL_REQUEST_METHOD)
}

/// Rejects requests that were not sent by an action client.
async fn require_action_header(req: Request, next: Next) -> Response {
    if is_action_request(req.headers()) {
        next.run(req).await
    } else {
        tracing::warn!(
            method = %req.method(),
            path = %req.uri().path(),
            "request without action header"
        );
        StatusCode::NOT_FOUND.into_response()
    }
}
