//! Axum-based HTTP gateway exposing the four sandbox operations.
//!
//! The router is a thin layer: it validates payload shape, delegates to the
//! workspace and exec components, and serializes results or errors to JSON.
//! axum's task-per-connection model gives the required concurrency — one
//! hung `run` (bounded by its own timeout) never stalls read/write/list.

mod handlers;

use handlers::{handle_health, handle_list, handle_read, handle_run, handle_write};

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use axum::{
    Router,
    http::StatusCode,
    routing::{get, post},
};
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::timeout::TimeoutLayer;

use crate::config::Config;
use crate::exec::{CommandAllowlist, CommandRunner};
use crate::workspace::WorkspaceRoot;

/// Maximum request body size (1 MiB) — bounds write payloads.
pub const MAX_BODY_SIZE: usize = 1_048_576;
/// Request timeout (30s) — above the command timeout, prevents slow-loris.
pub const REQUEST_TIMEOUT_SECS: u64 = 30;

/// Shared read-only state for all handlers. The workspace root and the
/// allowlist are the only process-lifetime values; everything else about a
/// request is transient, so no locking is needed.
#[derive(Clone)]
pub struct AppState {
    pub workspace: Arc<WorkspaceRoot>,
    pub allowlist: Arc<CommandAllowlist>,
    pub runner: Arc<CommandRunner>,
}

#[derive(serde::Deserialize)]
pub struct ReadBody {
    pub path: String,
}

#[derive(serde::Deserialize)]
pub struct WriteBody {
    pub path: String,
    #[serde(default)]
    pub content: String,
}

#[derive(serde::Deserialize)]
pub struct ListQuery {
    #[serde(default)]
    pub path: String,
}

#[derive(serde::Deserialize)]
pub struct RunBody {
    pub cmd: String,
}

/// Build the service router over an explicit state, so tests can stand up
/// multiple instances with different roots and allowlists.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(handle_health))
        .route("/read", post(handle_read))
        .route("/write", post(handle_write))
        .route("/list", get(handle_list))
        .route("/run", post(handle_run))
        .with_state(state)
        .layer(RequestBodyLimitLayer::new(MAX_BODY_SIZE))
        .layer(TimeoutLayer::with_status_code(
            StatusCode::REQUEST_TIMEOUT,
            Duration::from_secs(REQUEST_TIMEOUT_SECS),
        ))
}

/// Bind and serve the gateway.
pub async fn run_gateway(config: &Config) -> Result<()> {
    let addr: SocketAddr = format!("{}:{}", config.host, config.port).parse()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    run_gateway_with_listener(listener, config).await
}

/// Serve the gateway from a pre-bound listener (tests bind port 0).
pub async fn run_gateway_with_listener(
    listener: tokio::net::TcpListener,
    config: &Config,
) -> Result<()> {
    let workspace = Arc::new(WorkspaceRoot::open(&config.workspace_dir)?);
    let allowlist = Arc::new(CommandAllowlist::standard());
    let runner = Arc::new(CommandRunner::new(
        workspace.path().to_path_buf(),
        config.command_timeout,
    ));

    let addr = listener.local_addr()?;
    tracing::info!(
        %addr,
        workspace = %workspace.path().display(),
        timeout_secs = config.command_timeout.as_secs(),
        "sandboxd listening"
    );

    let state = AppState {
        workspace,
        allowlist,
        runner,
    };

    axum::serve(listener, router(state)).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn app_state_is_clone() {
        fn assert_clone<T: Clone>() {}
        assert_clone::<AppState>();
    }

    #[test]
    fn body_limit_covers_the_command_output_cap() {
        assert_eq!(MAX_BODY_SIZE, 1_048_576);
    }

    #[test]
    fn request_timeout_exceeds_default_command_timeout() {
        assert!(REQUEST_TIMEOUT_SECS > crate::exec::DEFAULT_TIMEOUT_SECS);
    }

    #[test]
    fn write_body_content_defaults_to_empty() {
        let body: WriteBody = serde_json::from_str(r#"{"path": "f.txt"}"#).unwrap();
        assert_eq!(body.content, "");
    }

    #[test]
    fn read_body_requires_path() {
        let parsed: Result<ReadBody, _> = serde_json::from_str(r#"{"other": 1}"#);
        assert!(parsed.is_err());
    }

    #[test]
    fn list_query_path_defaults_to_workspace_root() {
        let query: ListQuery = serde_json::from_str("{}").unwrap();
        assert_eq!(query.path, "");
    }
}
