//! Action handlers and their invocation context.
//!
//! A handler receives the decoded positional arguments and, separately, an
//! [`ActionContext`] describing the request. It declares how many positional
//! parameters it takes so missing trailing arguments can be padded before
//! the call.
//!
//! # Example
//!
//! ```
//! use edgeaction_server::{handler_fn, ActionResult};
//!
//! let greet = handler_fn(2, |args, _ctx| async move {
//!     let name: String = args[0].parse()?;
//!     Ok(ActionResult::Json(format!("hello {}", name).into()))
//! });
//! ```

use std::collections::HashMap;
use std::future::Future;
use std::marker::PhantomData;
use std::pin::Pin;
use std::sync::Arc;

use edgeaction_common::protocol::error::Result;
use edgeaction_common::Argument;
use hyper::{HeaderMap, Method, Uri};

use crate::result::ActionResult;

/// Result type for handler functions.
pub type HandlerResult = Result<ActionResult>;

/// Boxed future for handler results.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// What a handler knows about the request besides its arguments.
#[derive(Debug, Clone)]
pub struct ActionContext {
    pub method: Method,
    pub uri: Uri,
    pub headers: HeaderMap,
    /// Route parameters captured by `:name` segments of the mount path
    pub params: HashMap<String, String>,
    /// Environment configured on the server, shared by every request
    pub env: Arc<HashMap<String, String>>,
}

impl ActionContext {
    pub fn new(method: Method, uri: Uri) -> Self {
        Self {
            method,
            uri,
            headers: HeaderMap::new(),
            params: HashMap::new(),
            env: Arc::new(HashMap::new()),
        }
    }

    pub fn param(&self, name: &str) -> Option<&str> {
        self.params.get(name).map(String::as_str)
    }

    pub fn env_var(&self, name: &str) -> Option<&str> {
        self.env.get(name).map(String::as_str)
    }

    /// Header value as text, `None` when absent or not valid UTF-8.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|value| value.to_str().ok())
    }
}

/// Trait for action handlers.
pub trait ActionHandler: Send + Sync + 'static {
    /// Number of positional parameters the handler takes.
    fn arity(&self) -> usize;

    /// Handle one call. `args` already holds at least `arity()` entries.
    fn call(&self, args: Vec<Argument>, ctx: ActionContext) -> BoxFuture<'static, HandlerResult>;
}

/// Adapts an async closure into an [`ActionHandler`].
pub struct FnHandler<F, Fut>
where
    F: Fn(Vec<Argument>, ActionContext) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = HandlerResult> + Send + 'static,
{
    arity: usize,
    handler: F,
    _phantom: PhantomData<fn() -> Fut>,
}

impl<F, Fut> FnHandler<F, Fut>
where
    F: Fn(Vec<Argument>, ActionContext) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = HandlerResult> + Send + 'static,
{
    pub fn new(arity: usize, handler: F) -> Self {
        Self {
            arity,
            handler,
            _phantom: PhantomData,
        }
    }
}

impl<F, Fut> ActionHandler for FnHandler<F, Fut>
where
    F: Fn(Vec<Argument>, ActionContext) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = HandlerResult> + Send + 'static,
{
    fn arity(&self) -> usize {
        self.arity
    }

    fn call(&self, args: Vec<Argument>, ctx: ActionContext) -> BoxFuture<'static, HandlerResult> {
        Box::pin((self.handler)(args, ctx))
    }
}

/// Builds a handler taking `arity` positional parameters from an async closure.
pub fn handler_fn<F, Fut>(arity: usize, handler: F) -> FnHandler<F, Fut>
where
    F: Fn(Vec<Argument>, ActionContext) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = HandlerResult> + Send + 'static,
{
    FnHandler::new(arity, handler)
}
