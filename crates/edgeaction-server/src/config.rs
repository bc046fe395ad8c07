//! Server configuration.

use std::collections::HashMap;

/// Default cap on request bodies: 100 MB.
pub const DEFAULT_MAX_BODY_BYTES: usize = 100 * 1024 * 1024;

/// Server configuration.
///
/// # Fields
///
/// - `max_body_bytes` - Largest accepted request body (default: 100 MB)
/// - `require_action_header` - Answer 404 to requests without
///   `x-server-action` (default: false)
/// - `cors` - Permissive CORS for browser callers (default: false)
/// - `env` - Key/value pairs handed to every handler through its context
///
/// # Example
///
/// ```
/// use edgeaction_server::ServerConfig;
///
/// let config = ServerConfig::new()
///     .with_max_body_bytes(1024 * 1024)
///     .with_require_action_header(true)
///     .with_env_var("REGION", "eu-west-1");
///
/// assert_eq!(config.env["REGION"], "eu-west-1");
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct ServerConfig {
    pub max_body_bytes: usize,
    pub require_action_header: bool,
    pub cors: bool,
    pub env: HashMap<String, String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            max_body_bytes: DEFAULT_MAX_BODY_BYTES,
            require_action_header: false,
            cors: false,
            env: HashMap::new(),
        }
    }
}

impl ServerConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_max_body_bytes(mut self, max_body_bytes: usize) -> Self {
        self.max_body_bytes = max_body_bytes;
        self
    }

    pub fn with_require_action_header(mut self, require: bool) -> Self {
        self.require_action_header = require;
        self
    }

    pub fn with_cors(mut self, cors: bool) -> Self {
        self.cors = cors;
        self
    }

    pub fn with_env_var(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.env.insert(key.into(), value.into());
        self
    }

    /// Adds every pair of `env`, overriding keys already set.
    pub fn with_env(mut self, env: impl IntoIterator<Item = (String, String)>) -> Self {
        self.env.extend(env);
        self
    }
}
