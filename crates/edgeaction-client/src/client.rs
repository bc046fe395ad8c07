use std::time::Duration;

use edgeaction_common::protocol::error::{ActionError, Result};
use edgeaction_common::transport::{encode_arguments, EncodedArgs};
use edgeaction_common::{Argument, FieldValue, FormBody, PARAMS_URL_HEADER, SERVER_ACTION_HEADER};
use hyper::header::{HeaderMap, HeaderValue};
use hyper::Method;
use reqwest::multipart::{Form, Part};
use reqwest::Url;

use crate::response::{decode_head_response, decode_response, ActionValue};

/// Client configuration.
///
/// # Default Configuration
///
/// - `timeout_ms`: 30000 (30 seconds) for the whole exchange
/// - `default_headers`: empty
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Upper bound on one call, from connect to the last body byte
    pub timeout_ms: u64,
    /// Headers sent with every call, e.g. cookies or tracing ids
    pub default_headers: HeaderMap,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            timeout_ms: 30000,
            default_headers: HeaderMap::new(),
        }
    }
}

impl ClientConfig {
    pub fn with_timeout_ms(mut self, timeout_ms: u64) -> Self {
        self.timeout_ms = timeout_ms;
        self
    }

    pub fn with_header(mut self, name: &'static str, value: HeaderValue) -> Self {
        self.default_headers.insert(name, value);
        self
    }
}

/// Edgeaction client for calling actions over HTTP.
///
/// Every call is one request and one response. Calls are independent and
/// can run concurrently; dropping a call's future aborts its request.
///
/// # Example
///
/// ```no_run
/// use edgeaction_client::ActionClient;
/// use edgeaction_common::Argument;
/// use hyper::Method;
///
/// # async fn run() -> edgeaction_common::Result<()> {
/// let client = ActionClient::new("http://127.0.0.1:8787")?;
/// let value = client
///     .call("/greet", Method::POST, vec![Argument::from("hello"), Argument::from(42)])
///     .await?;
/// println!("{:?}", value.into_json());
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct ActionClient {
    base_url: Url,
    http: reqwest::Client,
}

impl ActionClient {
    /// Creates a client for the server at `base_url` with default settings.
    pub fn new(base_url: &str) -> Result<Self> {
        Self::with_config(base_url, ClientConfig::default())
    }

    pub fn with_config(base_url: &str, config: ClientConfig) -> Result<Self> {
        let base_url = Url::parse(base_url)
            .map_err(|e| ActionError::Transport(format!("Invalid base URL {}: {}", base_url, e)))?;

        let http = reqwest::Client::builder()
            .timeout(Duration::from_millis(config.timeout_ms))
            .default_headers(config.default_headers)
            .build()
            .map_err(|e| ActionError::Transport(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self { base_url, http })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Returns a call-site handle for the action at `path`, using POST.
    pub fn stub(&self, path: impl Into<String>) -> ActionStub {
        self.action(path, Method::POST)
    }

    /// Returns a call-site handle bound to one action path and verb.
    pub fn action(&self, path: impl Into<String>, method: Method) -> ActionStub {
        ActionStub {
            client: self.clone(),
            path: path.into(),
            method,
        }
    }

    /// Calls the action at `path` with `args`.
    ///
    /// Arguments are encoded before anything touches the network, so
    /// encoding failures (a file with GET, a form body mixed with other
    /// arguments, ...) come back without a request being made.
    ///
    /// HEAD answers have no body: they decode to [`ActionValue::Empty`]
    /// unless the action returned a raw response.
    pub async fn call(
        &self,
        path: &str,
        method: Method,
        args: Vec<Argument>,
    ) -> Result<ActionValue> {
        let mut url = self
            .base_url
            .join(path)
            .map_err(|e| ActionError::Transport(format!("Invalid action path {}: {}", path, e)))?;

        let encoded = encode_arguments(args, &method)?;

        let mut request = match encoded {
            EncodedArgs::Empty => self.http.request(method.clone(), url),
            EncodedArgs::Query(query) => {
                url.set_query(Some(&query.to_query_string()));
                self.http
                    .request(method.clone(), url)
                    .header(PARAMS_URL_HEADER, "true")
            }
            EncodedArgs::Body(form) => self
                .http
                .request(method.clone(), url)
                .multipart(to_multipart(form)?),
        };
        request = request.header(SERVER_ACTION_HEADER, "true");

        tracing::debug!(method = %method, path, "calling action");

        let response = request
            .send()
            .await
            .map_err(|e| ActionError::Transport(format!("HTTP request failed: {}", e)))?;

        if method == Method::HEAD {
            decode_head_response(response)
        } else {
            decode_response(response).await
        }
    }
}

/// A client-side stub for one exported action.
///
/// Mirrors the generated `(...args) => call(args, path, method)` wrappers:
/// the path and verb are fixed, only the arguments vary per call.
#[derive(Debug, Clone)]
pub struct ActionStub {
    client: ActionClient,
    path: String,
    method: Method,
}

impl ActionStub {
    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn method(&self) -> &Method {
        &self.method
    }

    pub async fn call(&self, args: Vec<Argument>) -> Result<ActionValue> {
        self.client.call(&self.path, self.method.clone(), args).await
    }
}

/// Converts the transport-neutral form into a reqwest multipart body,
/// keeping field order and repeated keys.
fn to_multipart(form: FormBody) -> Result<Form> {
    let mut multipart = Form::new();
    for field in form {
        multipart = match field.value {
            FieldValue::Text(text) => multipart.text(field.name, text),
            FieldValue::File(file) => {
                let part = Part::bytes(file.bytes.to_vec())
                    .file_name(file.name)
                    .mime_str(&file.content_type)
                    .map_err(|e| {
                        ActionError::Transport(format!(
                            "Invalid content type {}: {}",
                            file.content_type, e
                        ))
                    })?;
                multipart.part(field.name, part)
            }
        };
    }
    Ok(multipart)
}
