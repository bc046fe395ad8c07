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

//! # Edgeaction CLI Library
//!
//! Shared pieces of the `edgeaction` binary: the demo actions served by
//! `edgeaction serve`, argument loading for `edgeaction call`, and output
//! rendering.
//!
//! ## Key Commands
//!
//! - `edgeaction serve`: Serve the demo actions (`/echo`, `/upload`)
//! - `edgeaction call`: Call one action and print its result

use std::io::Write;
use std::path::Path;

use anyhow::{anyhow, Context, Result};
use edgeaction_client::ActionValue;
use edgeaction_common::{ActionError, ActionFile, Argument};
use edgeaction_server::{handler_fn, Action, ActionResult, ActionServer, ServerConfig};
use serde_json::{json, Value};

/// Bind address used when neither `-b` nor `EDGEACTION_BIND` is given.
pub const DEFAULT_BIND: &str = "127.0.0.1:8787";

/// Environment variable overriding [`DEFAULT_BIND`].
pub const BIND_ENV_VAR: &str = "EDGEACTION_BIND";

/// Validates that a URL string starts with http:// or https://
pub fn validate_http_url(url: &str, description: &str) -> Result<()> {
    if url.starts_with("http://") || url.starts_with("https://") {
        Ok(())
    } else {
        Err(anyhow!(
            "Invalid {}: '{}' must start with http:// or https://",
            description,
            url
        ))
    }
}

/// Splits a `KEY=VALUE` pair. The value may itself contain `=`.
pub fn parse_env_pair(pair: &str) -> Result<(String, String)> {
    match pair.split_once('=') {
        Some((key, value)) if !key.is_empty() => Ok((key.to_string(), value.to_string())),
        _ => Err(anyhow!("Invalid environment entry '{}': expected KEY=VALUE", pair)),
    }
}

/// Bind address from the environment, falling back to [`DEFAULT_BIND`].
pub fn default_bind() -> String {
    std::env::var(BIND_ENV_VAR).unwrap_or_else(|_| DEFAULT_BIND.to_string())
}

/// Describes every argument it receives, for any verb.
pub fn echo_action() -> Action {
    let echo = || {
        handler_fn(0, |args, ctx| async move {
            let arguments: Vec<Value> = args.iter().map(describe_argument).collect();
            Ok(ActionResult::Json(json!({
                "method": ctx.method.as_str(),
                "arguments": arguments,
            })))
        })
    };

    Action::new()
        .get(echo())
        .post(echo())
        .put(echo())
        .patch(echo())
        .delete(echo())
}

/// Sends back the file it was given.
pub fn upload_action() -> Action {
    Action::new().post(handler_fn(1, |args, _ctx| async move {
        match &args[0] {
            Argument::File(file) => Ok(ActionResult::File(file.clone())),
            Argument::Files(files) if !files.is_empty() => Ok(ActionResult::File(files[0].clone())),
            _ => Err(ActionError::handler("expected a file argument")),
        }
    }))
}

/// The server started by `edgeaction serve`.
pub fn demo_server(config: ServerConfig) -> ActionServer {
    ActionServer::new(config)
        .mount("/echo", echo_action())
        .mount("/upload", upload_action())
}

fn describe_argument(arg: &Argument) -> Value {
    match arg {
        Argument::Json(value) => value.clone(),
        Argument::File(file) => describe_file(file),
        Argument::Files(files) => Value::Array(files.iter().map(describe_file).collect()),
        Argument::Array(items) => Value::Array(items.iter().map(describe_argument).collect()),
        Argument::Form(form) => json!({ "form": form.keys().collect::<Vec<_>>() }),
        Argument::Missing => Value::Null,
    }
}

fn describe_file(file: &ActionFile) -> Value {
    json!({
        "name": file.name,
        "type": file.content_type,
        "size": file.len(),
    })
}

/// Builds the argument list for `edgeaction call`.
///
/// `json_args` must be a JSON array; each element becomes one argument.
/// Every path in `files` then adds a single file argument, and a non-empty
/// `batch` adds one final argument holding all of its files.
pub async fn load_call_arguments(
    json_args: &str,
    files: &[String],
    batch: &[String],
) -> Result<Vec<Argument>> {
    let parsed: Value = serde_json::from_str(json_args).context("Invalid JSON in args")?;
    let Value::Array(values) = parsed else {
        return Err(anyhow!("Arguments must be a JSON array, got: {}", json_args));
    };

    let mut args: Vec<Argument> = values.into_iter().map(Argument::Json).collect();

    for path in files {
        args.push(Argument::File(read_file(path).await?));
    }

    if !batch.is_empty() {
        let mut loaded = Vec::with_capacity(batch.len());
        for path in batch {
            loaded.push(read_file(path).await?);
        }
        args.push(Argument::Files(loaded));
    }

    Ok(args)
}

async fn read_file(path: &str) -> Result<ActionFile> {
    ActionFile::from_path(path)
        .await
        .with_context(|| format!("Failed to read {}", path))
}

/// Writes a call result.
///
/// JSON goes to `out` as one compact line. Binary results go to `output`
/// when given, otherwise raw to `out`. Raw responses print their body.
pub async fn write_value(
    value: ActionValue,
    output: Option<&Path>,
    out: &mut (dyn Write + Send),
) -> Result<()> {
    match value {
        ActionValue::Json(value) => {
            writeln!(out, "{}", serde_json::to_string(&value)?)?;
        }
        ActionValue::Blob(blob) => write_bytes(&blob.bytes, output, out).await?,
        ActionValue::File(file) => write_bytes(&file.bytes, output, out).await?,
        ActionValue::Response(response) => {
            let body = response.bytes().await.context("Failed to read response body")?;
            write_bytes(&body, output, out).await?;
        }
        ActionValue::Empty => {}
    }
    Ok(())
}

async fn write_bytes(
    bytes: &[u8],
    output: Option<&Path>,
    out: &mut (dyn Write + Send),
) -> Result<()> {
    match output {
        Some(path) => tokio::fs::write(path, bytes)
            .await
            .with_context(|| format!("Failed to write {}", path.display())),
        None => {
            out.write_all(bytes)?;
            out.flush()?;
            Ok(())
        }
    }
}
