//! Per-path verb map.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use edgeaction_common::protocol::error::{ActionError, Result};
use edgeaction_common::ACTION_METHODS;
use hyper::Method;

use crate::handler::ActionHandler;

/// The handlers exported under one path, keyed by HTTP verb.
///
/// A verb can be bound to a handler, declared without one (answered with
/// 501), or absent (answered with 405).
///
/// # Example
///
/// ```
/// use edgeaction_server::{handler_fn, Action, ActionResult};
/// use hyper::Method;
///
/// let action = Action::new()
///     .post(handler_fn(1, |args, _ctx| async move {
///         Ok(ActionResult::Json(args[0].to_json_value(0)?))
///     }))
///     .declare(Method::PUT);
///
/// assert!(action.resolve(&Method::POST).is_ok());
/// assert!(action.resolve(&Method::PUT).is_err());
/// assert!(action.resolve(&Method::GET).is_err());
/// ```
#[derive(Default, Clone)]
pub struct Action {
    handlers: HashMap<Method, Option<Arc<dyn ActionHandler>>>,
}

impl Action {
    pub fn new() -> Self {
        Self::default()
    }

    /// Binds `handler` to `method`, replacing any earlier binding.
    pub fn route(mut self, method: Method, handler: impl ActionHandler) -> Self {
        self.handlers.insert(method, Some(Arc::new(handler)));
        self
    }

    pub fn get(self, handler: impl ActionHandler) -> Self {
        self.route(Method::GET, handler)
    }

    pub fn post(self, handler: impl ActionHandler) -> Self {
        self.route(Method::POST, handler)
    }

    pub fn put(self, handler: impl ActionHandler) -> Self {
        self.route(Method::PUT, handler)
    }

    pub fn patch(self, handler: impl ActionHandler) -> Self {
        self.route(Method::PATCH, handler)
    }

    pub fn delete(self, handler: impl ActionHandler) -> Self {
        self.route(Method::DELETE, handler)
    }

    pub fn head(self, handler: impl ActionHandler) -> Self {
        self.route(Method::HEAD, handler)
    }

    pub fn options(self, handler: impl ActionHandler) -> Self {
        self.route(Method::OPTIONS, handler)
    }

    /// Marks `method` as configured without a callable handler.
    pub fn declare(mut self, method: Method) -> Self {
        self.handlers.entry(method).or_insert(None);
        self
    }

    /// Looks up the handler for `method`.
    ///
    /// # Errors
    ///
    /// - [`ActionError::MethodNotAllowed`]: nothing configured for the verb
    /// - [`ActionError::NotImplemented`]: the verb is declared but has no handler
    pub fn resolve(&self, method: &Method) -> Result<Arc<dyn ActionHandler>> {
        match self.handlers.get(method) {
            Some(Some(handler)) => Ok(handler.clone()),
            Some(None) => Err(ActionError::NotImplemented(method.clone())),
            None => Err(ActionError::MethodNotAllowed(method.clone())),
        }
    }

    /// Configured verbs, standard verbs first in their usual order.
    pub fn methods(&self) -> Vec<Method> {
        let mut methods: Vec<Method> = ACTION_METHODS
            .iter()
            .filter(|method| self.handlers.contains_key(*method))
            .cloned()
            .collect();
        let mut extra: Vec<Method> = self
            .handlers
            .keys()
            .filter(|method| !ACTION_METHODS.contains(*method))
            .cloned()
            .collect();
        extra.sort_by(|a, b| a.as_str().cmp(b.as_str()));
        methods.extend(extra);
        methods
    }

    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }
}

impl fmt::Debug for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let verbs: Vec<String> = self
            .methods()
            .into_iter()
            .map(|method| match self.handlers.get(&method) {
                Some(Some(handler)) => format!("{}/{}", method, handler.arity()),
                _ => format!("{} (declared)", method),
            })
            .collect();
        f.debug_struct("Action").field("verbs", &verbs).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handler::handler_fn;
    use crate::result::ActionResult;

    fn noop(arity: usize) -> impl ActionHandler {
        handler_fn(arity, |_args, _ctx| async move { Ok(ActionResult::Empty) })
    }

    #[test]
    fn test_unconfigured_verb_is_not_allowed() {
        let action = Action::new().post(noop(0));
        match action.resolve(&Method::GET) {
            Err(err) => assert_eq!(err.to_string(), "Method GET Not Allowed"),
            Ok(_) => panic!("GET should not resolve"),
        }
    }

    #[test]
    fn test_declared_verb_is_not_implemented() {
        let action = Action::new().declare(Method::DELETE);
        match action.resolve(&Method::DELETE) {
            Err(err) => assert_eq!(err.to_string(), "Method DELETE Not Implemented"),
            Ok(_) => panic!("DELETE should not resolve"),
        }
    }

    #[test]
    fn test_declare_keeps_existing_handler() {
        let action = Action::new().put(noop(3)).declare(Method::PUT);
        assert_eq!(action.resolve(&Method::PUT).unwrap().arity(), 3);
    }

    #[test]
    fn test_route_replaces_handler() {
        let action = Action::new().post(noop(1)).post(noop(4));
        assert_eq!(action.resolve(&Method::POST).unwrap().arity(), 4);
    }

    #[test]
    fn test_methods_order() {
        let action = Action::new()
            .delete(noop(0))
            .get(noop(0))
            .declare(Method::OPTIONS)
            .post(noop(0));
        assert_eq!(
            action.methods(),
            vec![Method::GET, Method::POST, Method::DELETE, Method::OPTIONS]
        );
        assert!(!action.is_empty());
        assert!(Action::new().is_empty());
    }

    #[test]
    fn test_debug_lists_verbs() {
        let action = Action::new().post(noop(2)).declare(Method::PATCH);
        let debug = format!("{:?}", action);
        assert!(debug.contains("POST/2"));
        assert!(debug.contains("PATCH (declared)"));
    }
}
