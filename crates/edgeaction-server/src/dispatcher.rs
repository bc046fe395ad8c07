//! One request, start to finish: verb lookup, argument unmarshalling,
//! handler call, result marshalling.

use std::collections::HashMap;
use std::sync::Arc;

use axum::extract::Request;
use axum::response::Response;
use edgeaction_common::protocol::error::Result;

use crate::action::Action;
use crate::handler::ActionContext;
use crate::marshal::{error_response, into_http_response};
use crate::unmarshal::{pad_arguments, read_arguments};

/// Runs requests against the handlers of one mounted [`Action`].
#[derive(Debug, Clone)]
pub struct ActionDispatcher {
    action: Arc<Action>,
    env: Arc<HashMap<String, String>>,
}

impl ActionDispatcher {
    pub fn new(action: Action, env: Arc<HashMap<String, String>>) -> Self {
        Self {
            action: Arc::new(action),
            env,
        }
    }

    pub fn action(&self) -> &Action {
        &self.action
    }

    /// Handles `req`. Every failure is turned into an error response.
    pub async fn dispatch(&self, req: Request, params: HashMap<String, String>) -> Response {
        let method = req.method().clone();
        let path = req.uri().path().to_string();

        match self.try_dispatch(req, params).await {
            Ok(response) => response,
            Err(err) => {
                let status = err.status_code();
                if status.is_server_error() {
                    tracing::error!(%method, %path, %status, error = %err, "action failed");
                } else {
                    tracing::warn!(
                        %method,
                        %path,
                        %status,
                        error = %err,
                        "action request rejected"
                    );
                }
                error_response(&err)
            }
        }
    }

    /// Handles `req`, returning the first failure instead of rendering it.
    pub async fn try_dispatch(
        &self,
        req: Request,
        params: HashMap<String, String>,
    ) -> Result<Response> {
        let handler = self.action.resolve(req.method())?;

        let ctx = ActionContext {
            method: req.method().clone(),
            uri: req.uri().clone(),
            headers: req.headers().clone(),
            params,
            env: self.env.clone(),
        };

        let mut args = read_arguments(req).await?;
        let supplied = args.len();
        pad_arguments(&mut args, handler.arity());
        tracing::debug!(
            method = %ctx.method,
            path = %ctx.uri.path(),
            supplied,
            arity = handler.arity(),
            "calling action"
        );

        let result = handler.call(args, ctx).await?;
        into_http_response(result)
    }
}
