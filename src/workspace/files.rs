//! Whole-file read and overwrite-write, confined by [`WorkspaceRoot`].

use std::path::PathBuf;

use super::WorkspaceRoot;
use crate::error::{AgentError, Result};

/// Read an entire file as text.
///
/// Bytes that are not valid UTF-8 are substituted rather than failing the
/// read, so a stray binary file never turns into a 500.
pub async fn read_file(ws: &WorkspaceRoot, relative: &str) -> Result<String> {
    let path = ws.resolve(relative)?;

    match tokio::fs::metadata(&path).await {
        Ok(meta) if meta.is_file() => {}
        _ => {
            return Err(AgentError::FileNotFound {
                path: relative.to_string(),
            });
        }
    }

    let bytes = tokio::fs::read(&path).await?;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

/// Overwrite a file with exactly the given content, creating missing parent
/// directories. There is no append mode: callers wanting concatenation must
/// read first and write the combined result.
pub async fn write_file(ws: &WorkspaceRoot, relative: &str, content: &str) -> Result<PathBuf> {
    let path = ws.resolve(relative)?;

    if path == ws.path() {
        return Err(AgentError::MalformedRequest(
            "cannot write to the workspace root itself".into(),
        ));
    }

    if let Some(parent) = path.parent() {
        tokio::fs::create_dir_all(parent).await?;
    }

    tokio::fs::write(&path, content).await?;
    Ok(path)
}
