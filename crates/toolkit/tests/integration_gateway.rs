//! End-to-end tests against an in-process fake Connectors gateway.

use axum::extract::Path;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};
use connectors_toolkit::{
    ConnectorsConfig, HttpConnectors, ToolSelectionOptions, Toolkit, ToolkitConfig,
};
use serde_json::{Value, json};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Counts invoke calls so tests can assert "validation failures never reach
/// the gateway".
#[derive(Default)]
struct GatewayState {
    invocations: AtomicUsize,
}

fn github_tools() -> Value {
    json!([
        {
            "id": "github.create-pull-request@v1",
            "description": "Open a pull request",
            "parameters": {
                "properties": {
                    "title": {"type": "string", "minLength": 1},
                    "labels": {"type": "array", "items": {"type": "string"}, "maxItems": 3},
                    "draft": {"type": "boolean"}
                },
                "required": ["title"]
            }
        },
        {
            "id": "github.get-repo@v1",
            "parameters": {
                "owner": {"type": "string", "required": true},
                "repo": {"type": "string", "required": true}
            }
        }
    ])
}

async fn serve_gateway(state: Arc<GatewayState>) -> anyhow::Result<String> {
    let invoke_state = state.clone();
    let app = Router::new()
        .route(
            "/integrations/{name}/tools",
            get(|Path(name): Path<String>| async move {
                if name == "github" {
                    Json(github_tools()).into_response()
                } else {
                    (
                        StatusCode::NOT_FOUND,
                        Json(json!({"message": format!("Integration '{name}' not found")})),
                    )
                        .into_response()
                }
            }),
        )
        .route(
            "/tools/select",
            post(|Json(body): Json<Value>| async move {
                let max = body["maxTools"].as_u64().unwrap_or(10);
                let tools: Vec<Value> = github_tools()
                    .as_array()
                    .unwrap()
                    .iter()
                    .take(usize::try_from(max).unwrap_or(usize::MAX))
                    .cloned()
                    .map(|mut t| {
                        t["integration"] = json!("github");
                        t
                    })
                    .collect();
                Json(json!(tools))
            }),
        )
        .route(
            "/tools/{id}/invoke",
            post(move |Path(id): Path<String>, Json(body): Json<Value>| async move {
                invoke_state.invocations.fetch_add(1, Ordering::SeqCst);
                match id.as_str() {
                    "github.create-pull-request@v1" => Json(json!({
                        "number": 17,
                        "echo": body["arguments"],
                    }))
                    .into_response(),
                    "github.get-repo@v1" => (
                        StatusCode::INTERNAL_SERVER_ERROR,
                        Json(json!({"message": "API error"})),
                    )
                        .into_response(),
                    _ => (
                        StatusCode::NOT_FOUND,
                        Json(json!({"message": format!("Unknown tool '{id}'")})),
                    )
                        .into_response(),
                }
            }),
        );

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await?;
    let addr = listener.local_addr()?;
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });
    Ok(format!("http://{addr}"))
}

fn connectors(base_url: String) -> Arc<HttpConnectors> {
    Arc::new(
        HttpConnectors::new(ConnectorsConfig {
            base_url,
            api_key: None,
            tenant_id: None,
            timeout: Some(10),
        })
        .unwrap(),
    )
}

#[tokio::test]
async fn toolkit_loads_and_calls_tools_end_to_end() -> anyhow::Result<()> {
    let state = Arc::new(GatewayState::default());
    let base_url = serve_gateway(state.clone()).await?;
    let gateway = connectors(base_url);

    let toolkit = Toolkit::new(
        ToolkitConfig {
            integrations: vec!["github".to_string()],
            tool_query: None,
        },
        gateway.clone(),
        gateway,
    );

    let tools = toolkit.tools().await?;
    assert_eq!(tools.len(), 2);

    let create_pr = tools
        .iter()
        .find(|t| t.name() == "github_create_pull_request_v1")
        .expect("sanitized tool name");
    assert_eq!(create_pr.integration(), "github");
    assert_eq!(create_pr.tool_id(), "github.create-pull-request@v1");

    // Happy path: arguments validate, gateway result is wrapped.
    let result = create_pr
        .call(&json!({"title": "Fix race", "labels": ["bug"], "draft": "true"}))
        .await;
    assert!(result.success, "unexpected failure: {:?}", result.error);
    let data = result.data.unwrap();
    assert_eq!(data["number"], json!(17));
    // Coercion applied before forwarding.
    assert_eq!(data["echo"]["draft"], json!(true));
    assert_eq!(state.invocations.load(Ordering::SeqCst), 1);

    // Validation failure: structured error, no gateway call.
    let result = create_pr.call(&json!({"labels": ["a", "b", "c", "d"]})).await;
    assert!(!result.success);
    assert_eq!(result.metadata.error_type.as_deref(), Some("ValidationError"));
    let message = result.error.unwrap();
    assert!(message.contains("title"));
    assert!(message.contains("labels"));
    assert_eq!(state.invocations.load(Ordering::SeqCst), 1);

    Ok(())
}

#[tokio::test]
async fn downstream_api_error_is_wrapped_not_raised() -> anyhow::Result<()> {
    let state = Arc::new(GatewayState::default());
    let base_url = serve_gateway(state).await?;
    let gateway = connectors(base_url);

    let toolkit = Toolkit::new(
        ToolkitConfig {
            integrations: vec!["github".to_string()],
            tool_query: None,
        },
        gateway.clone(),
        gateway,
    );

    let tools = toolkit.tools().await?;
    let get_repo = tools
        .iter()
        .find(|t| t.name() == "github_get_repo_v1")
        .unwrap();

    // Flat-record parameters normalized the same as JSON-Schema-style ones.
    let schema = get_repo.input_schema();
    assert_eq!(schema["required"], json!(["owner", "repo"]));

    let result = get_repo.call(&json!({"owner": "octo", "repo": "hello"})).await;
    assert!(!result.success);
    assert_eq!(result.metadata.error_type.as_deref(), Some("ApiError"));
    assert!(result.error.unwrap().contains("API error"));

    Ok(())
}

#[tokio::test]
async fn semantic_selection_respects_max_tools() -> anyhow::Result<()> {
    let state = Arc::new(GatewayState::default());
    let base_url = serve_gateway(state).await?;
    let gateway = connectors(base_url);

    let toolkit = Toolkit::new(
        ToolkitConfig::default(),
        gateway.clone(),
        gateway,
    );

    let tools = toolkit
        .tools_from_query(
            "work with github",
            &ToolSelectionOptions {
                max_tools: 1,
                ..ToolSelectionOptions::default()
            },
        )
        .await?;
    assert_eq!(tools.len(), 1);
    assert_eq!(tools[0].integration(), "github");

    Ok(())
}

#[tokio::test]
async fn unknown_integration_is_a_catalog_error() -> anyhow::Result<()> {
    let state = Arc::new(GatewayState::default());
    let base_url = serve_gateway(state).await?;
    let gateway = connectors(base_url);

    let toolkit = Toolkit::new(
        ToolkitConfig {
            integrations: vec!["jira".to_string()],
            tool_query: None,
        },
        gateway.clone(),
        gateway,
    );

    let err = toolkit.tools().await.unwrap_err();
    assert!(err.to_string().contains("Integration 'jira' not found"));

    Ok(())
}
