//! Immediate-children directory listing with deterministic ordering.

use super::WorkspaceRoot;
use crate::error::{AgentError, Result};

/// List the immediate child names of a directory, sorted ascending.
///
/// The ordering is part of the contract — callers diff listings across
/// requests and rely on it being stable.
pub async fn list_dir(ws: &WorkspaceRoot, relative: &str) -> Result<Vec<String>> {
    let path = ws.resolve(relative)?;

    match tokio::fs::metadata(&path).await {
        Ok(meta) if meta.is_dir() => {}
        _ => {
            return Err(AgentError::DirectoryNotFound {
                path: relative.to_string(),
            });
        }
    }

    let mut entries = Vec::new();
    let mut reader = tokio::fs::read_dir(&path).await?;
    while let Some(entry) = reader.next_entry().await? {
        entries.push(entry.file_name().to_string_lossy().into_owned());
    }
    entries.sort();
    Ok(entries)
}
