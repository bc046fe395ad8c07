//! Round Trip Integration Tests
//!
//! These tests start a real `ActionServer` on an ephemeral port and call it
//! with `ActionClient`. Tests cover:
//! - JSON arguments and results, including arity padding
//! - File and batch fidelity in both directions
//! - Blob, raw response and empty results
//! - Verb map errors (405, 501), malformed arguments (400) and oversized
//!   bodies (413)
//! - Query-encoded calls, route parameters and server environment
//! - HEAD and OPTIONS actions, with and without CORS
//! - The optional action header requirement

use axum::body::Body;
use edgeaction_client::{ActionClient, ActionValue};
use edgeaction_common::{ActionError, ActionFile, Argument, Blob, FormBody};
use edgeaction_server::{handler_fn, Action, ActionResult, ActionServer, ServerConfig};
use hyper::{Method, StatusCode};
use serde_json::{json, Value};
use tokio::net::TcpListener;

/// Starts `server` on 127.0.0.1 and returns its base URL
async fn spawn_server(server: ActionServer) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        if let Err(err) = server.serve(listener).await {
            eprintln!("Server error: {}", err);
        }
    });

    format!("http://{}", addr)
}

fn demo_server(config: ServerConfig) -> ActionServer {
    ActionServer::new(config)
        .mount(
            "/greet",
            Action::new().post(handler_fn(2, |args, _ctx| async move {
                let greeting: String = args[0].parse()?;
                let count: i64 = args[1].parse()?;
                if greeting == "hello" && count == 42 {
                    Ok(ActionResult::Json(json!("ok")))
                } else {
                    Err(ActionError::handler("unexpected arguments"))
                }
            })),
        )
        .mount(
            "/pad",
            Action::new().post(handler_fn(5, |args, _ctx| async move {
                let missing = args.iter().filter(|arg| arg.is_missing()).count();
                Ok(ActionResult::Json(json!({"len": args.len(), "missing": missing})))
            })),
        )
        .mount(
            "/echo-file",
            Action::new().post(handler_fn(1, |args, _ctx| async move {
                let file = args[0]
                    .as_file()
                    .cloned()
                    .ok_or_else(|| ActionError::handler("expected a file"))?;
                Ok(ActionResult::File(file))
            })),
        )
        .mount(
            "/describe",
            Action::new().post(handler_fn(3, |args, _ctx| async move {
                let described: Vec<Value> = args
                    .iter()
                    .map(|arg| match arg {
                        Argument::Json(value) => json!({"json": value}),
                        Argument::File(file) => json!({"file": file.name, "size": file.len()}),
                        Argument::Files(files) => {
                            let names: Vec<_> = files.iter().map(|f| f.name.clone()).collect();
                            json!({ "files": names })
                        }
                        Argument::Missing => json!("missing"),
                        _ => json!("other"),
                    })
                    .collect();
                Ok(ActionResult::Json(Value::Array(described)))
            })),
        )
        .mount(
            "/search",
            Action::new().get(handler_fn(2, |args, _ctx| async move {
                let values = args
                    .iter()
                    .map(|arg| arg.to_json_value(0))
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(ActionResult::Json(Value::Array(values)))
            })),
        )
        .mount(
            "/avatar",
            Action::new().get(handler_fn(0, |_args, _ctx| async move {
                Ok(ActionResult::Blob(
                    Blob::new(vec![0x89u8, 0x50, 0x4e, 0x47]).with_content_type("image/png"),
                ))
            })),
        )
        .mount(
            "/raw",
            Action::new().post(handler_fn(0, |_args, _ctx| async move {
                let response = hyper::Response::builder()
                    .status(StatusCode::ACCEPTED)
                    .header("x-custom", "yes")
                    .body(Body::from("accepted"))
                    .map_err(ActionError::handler)?;
                Ok(ActionResult::Response(response))
            })),
        )
        .mount(
            "/items",
            Action::new()
                .delete(handler_fn(1, |_args, _ctx| async move { Ok(ActionResult::Empty) }))
                .declare(Method::PUT),
        )
        .mount(
            "/exists",
            Action::new().head(handler_fn(1, |args, _ctx| async move {
                let id: i64 = args[0].parse()?;
                if id == 7 {
                    Ok(ActionResult::Json(json!(true)))
                } else {
                    Err(ActionError::handler(format!("no item {}", id)))
                }
            })),
        )
        .mount(
            "/capabilities",
            Action::new().options(handler_fn(1, |args, _ctx| async move {
                let scope: String = args[0].parse()?;
                Ok(ActionResult::Json(json!({"scope": scope, "verbs": ["GET", "POST"]})))
            })),
        )
        .mount(
            "/users/:id",
            Action::new().get(handler_fn(0, |_args, ctx| async move {
                Ok(ActionResult::Json(json!({
                    "id": ctx.param("id"),
                    "region": ctx.env_var("REGION"),
                })))
            })),
        )
}

async fn default_client() -> ActionClient {
    let url = spawn_server(demo_server(ServerConfig::new().with_env_var("REGION", "eu"))).await;
    ActionClient::new(&url).unwrap()
}

fn status_of(result: Result<ActionValue, ActionError>) -> StatusCode {
    match result {
        Err(ActionError::ActionCallFailed { status, .. }) => status,
        other => panic!("Expected ActionCallFailed, got {:?}", other),
    }
}

// ============================================================================
// JSON Tests
// ============================================================================

#[tokio::test]
async fn test_json_arguments_and_result() {
    let client = default_client().await;
    let value = client
        .call("/greet", Method::POST, vec!["hello".into(), 42.into()])
        .await
        .unwrap();
    assert_eq!(value.into_json(), Some(json!("ok")));
}

#[tokio::test]
async fn test_missing_arguments_are_padded() {
    let client = default_client().await;
    let value = client
        .call("/pad", Method::POST, vec![1.into(), json!({"a": 1}).into()])
        .await
        .unwrap();
    assert_eq!(value.into_json(), Some(json!({"len": 5, "missing": 3})));
}

#[tokio::test]
async fn test_handler_error_is_server_error() {
    let client = default_client().await;
    let result = client.call("/greet", Method::POST, vec!["bye".into(), 1.into()]).await;
    assert_eq!(status_of(result), StatusCode::INTERNAL_SERVER_ERROR);
}

// ============================================================================
// File Tests
// ============================================================================

#[tokio::test]
async fn test_file_round_trip() {
    let client = default_client().await;
    let bytes: Vec<u8> = (0..=255u8).cycle().take(10_000).collect();
    let file =
        ActionFile::new("report-2024.bin", bytes.clone()).with_content_type("application/x-test");

    let echoed = client
        .call("/echo-file", Method::POST, vec![file.into()])
        .await
        .unwrap()
        .into_file()
        .unwrap();

    assert_eq!(echoed.name, "report-2024.bin");
    assert_eq!(echoed.content_type, "application/x-test");
    assert_eq!(echoed.bytes.as_ref(), bytes.as_slice());
}

#[tokio::test]
async fn test_mixed_arguments_keep_positions() {
    let client = default_client().await;
    let batch = vec![ActionFile::new("a.txt", "a"), ActionFile::new("b.txt", "bb")];

    let value = client
        .call(
            "/describe",
            Method::POST,
            vec!["first".into(), ActionFile::new("one.txt", "123").into(), batch.into()],
        )
        .await
        .unwrap();

    assert_eq!(
        value.into_json(),
        Some(json!([
            {"json": "first"},
            {"file": "one.txt", "size": 3},
            {"files": ["a.txt", "b.txt"]},
        ]))
    );
}

#[tokio::test]
async fn test_form_body_passes_through() {
    let client = default_client().await;
    let mut form = FormBody::new();
    form.append_text("profile", r#"{"a":1}"#);
    form.append_file("FILE_2", ActionFile::new("photo.jpg", "jpeg"));

    let value = client
        .call("/describe", Method::POST, vec![Argument::Form(form)])
        .await
        .unwrap();

    assert_eq!(
        value.into_json(),
        Some(json!([{"json": {"a": 1}}, {"file": "photo.jpg", "size": 4}, "missing"]))
    );
}

// ============================================================================
// Result Kind Tests
// ============================================================================

#[tokio::test]
async fn test_blob_result() {
    let client = default_client().await;
    let blob = client.call("/avatar", Method::GET, vec![]).await.unwrap().into_blob().unwrap();
    assert_eq!(blob.content_type, "image/png");
    assert_eq!(blob.bytes.as_ref(), &[0x89, 0x50, 0x4e, 0x47]);
}

#[tokio::test]
async fn test_raw_response_result() {
    let client = default_client().await;
    let raw = client
        .call("/raw", Method::POST, vec![])
        .await
        .unwrap()
        .into_response()
        .unwrap();
    assert_eq!(raw.status(), StatusCode::ACCEPTED);
    assert_eq!(raw.headers().get("x-custom").unwrap(), "yes");
    assert_eq!(raw.text().await.unwrap(), "accepted");
}

#[tokio::test]
async fn test_empty_result() {
    let client = default_client().await;
    let value = client.call("/items", Method::DELETE, vec![7.into()]).await.unwrap();
    assert!(value.is_empty());
}

// ============================================================================
// Verb Map Tests
// ============================================================================

#[tokio::test]
async fn test_unconfigured_verb_is_405() {
    let client = default_client().await;
    let result = client.call("/items", Method::PATCH, vec![]).await;
    assert_eq!(status_of(result), StatusCode::METHOD_NOT_ALLOWED);
}

#[tokio::test]
async fn test_declared_verb_is_501() {
    let client = default_client().await;
    let result = client.call("/items", Method::PUT, vec![1.into()]).await;
    assert_eq!(status_of(result), StatusCode::NOT_IMPLEMENTED);
}

#[tokio::test]
async fn test_unknown_path_is_404() {
    let client = default_client().await;
    let result = client.call("/nowhere", Method::POST, vec![]).await;
    assert_eq!(status_of(result), StatusCode::NOT_FOUND);
}

// ============================================================================
// HEAD and OPTIONS Tests
// ============================================================================

#[tokio::test]
async fn test_head_call_checks_status_only() {
    let client = default_client().await;

    let value = client.call("/exists", Method::HEAD, vec![7.into()]).await.unwrap();
    assert!(value.is_empty());

    let result = client.call("/exists", Method::HEAD, vec![8.into()]).await;
    assert_eq!(status_of(result), StatusCode::INTERNAL_SERVER_ERROR);
}

#[tokio::test]
async fn test_options_call() {
    let client = default_client().await;
    let value = client
        .call("/capabilities", Method::OPTIONS, vec!["admin".into()])
        .await
        .unwrap();
    assert_eq!(value.into_json(), Some(json!({"scope": "admin", "verbs": ["GET", "POST"]})));
}

#[tokio::test]
async fn test_options_call_with_cors() {
    let url = spawn_server(demo_server(ServerConfig::new().with_cors(true))).await;
    let client = ActionClient::new(&url).unwrap();

    let value = client
        .call("/capabilities", Method::OPTIONS, vec!["admin".into()])
        .await
        .unwrap();
    assert_eq!(value.into_json(), Some(json!({"scope": "admin", "verbs": ["GET", "POST"]})));
}

#[tokio::test]
async fn test_cors_preflight_is_answered_by_server() {
    let url = spawn_server(demo_server(ServerConfig::new().with_cors(true))).await;
    let http = reqwest::Client::new();

    let preflight = http
        .request(Method::OPTIONS, format!("{}/capabilities", url))
        .header("origin", "http://app.test")
        .header("access-control-request-method", "OPTIONS")
        .send()
        .await
        .unwrap();
    assert_eq!(preflight.status(), StatusCode::OK);
    assert!(preflight.headers().contains_key("access-control-allow-origin"));
    assert!(preflight.headers().get("datatype").is_none());

    let call = http
        .request(Method::OPTIONS, format!("{}/capabilities", url))
        .header("origin", "http://app.test")
        .header("x-server-action", "true")
        .multipart(reqwest::multipart::Form::new().text("JSON_1", "%22admin%22"))
        .send()
        .await
        .unwrap();
    assert_eq!(call.status(), StatusCode::OK);
    assert_eq!(call.headers().get("access-control-allow-origin").unwrap(), "*");
    assert_eq!(call.headers().get("datatype").unwrap(), "json");
}

#[tokio::test]
async fn test_cors_headers_on_action_calls() {
    let url = spawn_server(demo_server(ServerConfig::new().with_cors(true))).await;

    let response = reqwest::Client::new()
        .get(format!("{}/avatar", url))
        .header("origin", "http://app.test")
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert!(response.headers().contains_key("access-control-allow-origin"));
    assert_eq!(response.headers().get("datatype").unwrap(), "blob");
}

// ============================================================================
// Query Tests
// ============================================================================

#[tokio::test]
async fn test_query_round_trip() {
    let client = default_client().await;
    let value = client
        .call(
            "/search",
            Method::GET,
            vec!["caf\u{e9} & tea?".into(), json!({"tags": ["a b", "c/d"]}).into()],
        )
        .await
        .unwrap();
    assert_eq!(
        value.into_json(),
        Some(json!(["caf\u{e9} & tea?", {"tags": ["a b", "c/d"]}]))
    );
}

#[tokio::test]
async fn test_route_params_and_env() {
    let client = default_client().await;
    let value = client.call("/users/42", Method::GET, vec![]).await.unwrap();
    assert_eq!(value.into_json(), Some(json!({"id": "42", "region": "eu"})));
}

// ============================================================================
// Rejection Tests
// ============================================================================

#[tokio::test]
async fn test_malformed_json_argument_is_400() {
    let url = spawn_server(demo_server(ServerConfig::new())).await;
    let form = reqwest::multipart::Form::new().text("JSON_1", "{bad");

    let response = reqwest::Client::new()
        .post(format!("{}/greet", url))
        .header("x-server-action", "true")
        .multipart(form)
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert!(response.text().await.unwrap().starts_with("Malformed argument JSON_1"));
}

#[tokio::test]
async fn test_oversized_body_is_413() {
    let url = spawn_server(demo_server(ServerConfig::new().with_max_body_bytes(1024))).await;
    let client = ActionClient::new(&url).unwrap();

    let file = ActionFile::new("big.bin", vec![7u8; 10 * 1024]);
    let result = client.call("/echo-file", Method::POST, vec![file.into()]).await;
    assert_eq!(status_of(result), StatusCode::PAYLOAD_TOO_LARGE);

    let small = ActionFile::new("small.bin", vec![7u8; 100]);
    let echoed = client.call("/echo-file", Method::POST, vec![small.into()]).await.unwrap();
    assert_eq!(echoed.into_file().unwrap().len(), 100);
}

#[tokio::test]
async fn test_action_header_required() {
    let url = spawn_server(demo_server(ServerConfig::new().with_require_action_header(true))).await;

    let response = reqwest::Client::new()
        .post(format!("{}/raw", url))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let client = ActionClient::new(&url).unwrap();
    let value = client.call("/raw", Method::POST, vec![]).await.unwrap();
    assert!(matches!(value, ActionValue::Response(_)));
}

#[tokio::test]
async fn test_concurrent_calls() {
    let client = default_client().await;

    let calls = (0..8).map(|i| {
        let client = client.clone();
        async move {
            client
                .call("/pad", Method::POST, (0..i).map(Argument::from).collect())
                .await
        }
    });

    let results = futures::future::join_all(calls).await;
    for (i, result) in results.into_iter().enumerate() {
        let value = result.unwrap().into_json().unwrap();
        let expected_len = i.max(5);
        assert_eq!(value["len"], json!(expected_len));
    }
}
