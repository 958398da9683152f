use thiserror::Error;

/// Structured error taxonomy for `sandboxd`.
///
/// Every boundary-facing operation converts these into a JSON failure body;
/// library callers can match on them to decide recovery strategy. Internal
/// startup code continues to use `anyhow::Result` for ad-hoc context chains.
#[derive(Debug, Error)]
pub enum AgentError {
    /// The resolved path falls outside the workspace root.
    #[error("access outside workspace denied: {path}")]
    PathEscape { path: String },

    #[error("file not found: {path}")]
    FileNotFound { path: String },

    #[error("directory not found: {path}")]
    DirectoryNotFound { path: String },

    /// The command verb is not in the allowlist.
    #[error("command '{verb}' not allowed")]
    CommandNotAllowed { verb: String },

    #[error("command timed out after {secs}s")]
    CommandTimeout { secs: u64 },

    /// A required field is missing, empty, or unparseable.
    #[error("malformed request: {0}")]
    MalformedRequest(String),

    #[error("io: {0}")]
    Io(#[from] std::io::Error),

    /// Unexpected failure, e.g. the command could not be spawned at all.
    #[error("internal: {0}")]
    Internal(String),
}

/// Shorthand result type for the crate.
pub type Result<T> = std::result::Result<T, AgentError>;
