use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::Json,
};
use serde_json::{Value, json};

use super::{AppState, ListQuery, ReadBody, RunBody, WriteBody};
use crate::error::AgentError;
use crate::workspace;

type JsonBody<T> = Result<Json<T>, axum::extract::rejection::JsonRejection>;
type Reply = (StatusCode, Json<Value>);

/// GET /health — liveness probe, always public.
pub(super) async fn handle_health() -> Json<Value> {
    Json(json!({"status": "ok"}))
}

/// POST /read — whole-file read.
pub(super) async fn handle_read(State(state): State<AppState>, body: JsonBody<ReadBody>) -> Reply {
    let Json(body) = match body {
        Ok(b) => b,
        Err(e) => return invalid_json(&e),
    };

    match workspace::read_file(&state.workspace, &body.path).await {
        Ok(content) => ok(json!({"ok": true, "path": body.path, "content": content})),
        Err(e) => error_reply(&e),
    }
}

/// POST /write — whole-file overwrite, creating parent directories.
pub(super) async fn handle_write(
    State(state): State<AppState>,
    body: JsonBody<WriteBody>,
) -> Reply {
    let Json(body) = match body {
        Ok(b) => b,
        Err(e) => return invalid_json(&e),
    };

    match workspace::write_file(&state.workspace, &body.path, &body.content).await {
        Ok(path) => ok(json!({
            "ok": true,
            "message": format!("Wrote {}", path.display()),
        })),
        Err(e) => error_reply(&e),
    }
}

/// GET /list — immediate children of a directory, sorted.
pub(super) async fn handle_list(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> Reply {
    match workspace::list_dir(&state.workspace, &query.path).await {
        Ok(entries) => ok(json!({"ok": true, "path": query.path, "entries": entries})),
        Err(e) => error_reply(&e),
    }
}

/// POST /run — authorize a command against the allowlist and execute it.
pub(super) async fn handle_run(State(state): State<AppState>, body: JsonBody<RunBody>) -> Reply {
    let Json(body) = match body {
        Ok(b) => b,
        Err(e) => return invalid_json(&e),
    };

    let authorized = match state.allowlist.authorize(&body.cmd) {
        Ok(a) => a,
        Err(e) => {
            if let AgentError::CommandNotAllowed { verb } = &e {
                tracing::warn!(verb = %verb, "rejected command outside allowlist");
            }
            return error_reply(&e);
        }
    };

    match state.runner.run(&authorized).await {
        Ok(result) => ok(json!({
            "ok": true,
            "stdout": result.stdout,
            "stderr": result.stderr,
            "returncode": result.exit_code,
        })),
        Err(e) => error_reply(&e),
    }
}

fn ok(body: Value) -> Reply {
    (StatusCode::OK, Json(body))
}

fn invalid_json(rejection: &axum::extract::rejection::JsonRejection) -> Reply {
    error_reply(&AgentError::MalformedRequest(format!(
        "invalid JSON body: {rejection}"
    )))
}

/// Convert a component error into the uniform `{ok:false, error}` failure
/// body with a status chosen per error kind. No error may propagate as an
/// unhandled fault: one failing request must never affect another.
pub(super) fn error_reply(err: &AgentError) -> Reply {
    let status = match err {
        AgentError::PathEscape { .. } | AgentError::CommandNotAllowed { .. } => {
            StatusCode::FORBIDDEN
        }
        AgentError::FileNotFound { .. } | AgentError::DirectoryNotFound { .. } => {
            StatusCode::NOT_FOUND
        }
        AgentError::MalformedRequest(_) => StatusCode::BAD_REQUEST,
        AgentError::CommandTimeout { .. } => StatusCode::GATEWAY_TIMEOUT,
        AgentError::Io(_) | AgentError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
    };

    if status == StatusCode::INTERNAL_SERVER_ERROR {
        tracing::error!("request failed: {err}");
    }

    (status, Json(json!({"ok": false, "error": err.to_string()})))
}
