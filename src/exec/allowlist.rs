//! Static command allowlist and shell-word authorization.

use std::collections::HashMap;

use crate::error::{AgentError, Result};

/// How an allowlisted verb is dispatched.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExecutionMode {
    /// The entire raw string is handed to `/bin/sh`, so shell syntax
    /// (quoting, globbing, redirection) behaves as the caller expects.
    Builtin,
    /// The tokenized argument vector is spawned directly as a process
    /// image, bypassing any shell. Shell metacharacters in arguments stay
    /// literal — this is the primary injection defense.
    Exec,
}

/// A command that passed allowlist authorization.
#[derive(Debug, Clone)]
pub struct AuthorizedCommand {
    pub mode: ExecutionMode,
    /// Original raw string, used verbatim in builtin mode.
    pub raw: String,
    /// POSIX shell-word split form; `tokens[0]` is the verb.
    pub tokens: Vec<String>,
}

impl AuthorizedCommand {
    pub fn verb(&self) -> &str {
        &self.tokens[0]
    }
}

/// Static table restricting which command verbs may run and in which mode.
/// Read-only after startup; only the verb is gated, never the arguments.
#[derive(Debug, Clone)]
pub struct CommandAllowlist {
    entries: HashMap<String, ExecutionMode>,
}

impl CommandAllowlist {
    /// The stock service table: cheap inspection verbs run through the
    /// shell, interpreter/test-runner verbs get a literal argv.
    pub fn standard() -> Self {
        Self::from_entries([
            ("ls", ExecutionMode::Builtin),
            ("cat", ExecutionMode::Builtin),
            ("echo", ExecutionMode::Builtin),
            ("python", ExecutionMode::Exec),
            ("python3", ExecutionMode::Exec),
            ("pytest", ExecutionMode::Exec),
        ])
    }

    pub fn from_entries<'a>(entries: impl IntoIterator<Item = (&'a str, ExecutionMode)>) -> Self {
        Self {
            entries: entries
                .into_iter()
                .map(|(verb, mode)| (verb.to_string(), mode))
                .collect(),
        }
    }

    pub fn contains(&self, verb: &str) -> bool {
        self.entries.contains_key(verb)
    }

    /// Tokenize a raw command line and check its verb against the table.
    ///
    /// Tokenization follows POSIX shell-word rules (quoting and escaping
    /// respected) so the same string behaves identically when exec mode
    /// later spawns the tokens directly.
    pub fn authorize(&self, raw: &str) -> Result<AuthorizedCommand> {
        let raw = raw.trim();
        if raw.is_empty() {
            return Err(AgentError::MalformedRequest(
                "missing or empty 'cmd' string".into(),
            ));
        }

        let tokens = shlex::split(raw).ok_or_else(|| {
            AgentError::MalformedRequest("unbalanced quoting in command".into())
        })?;
        let Some(verb) = tokens.first() else {
            return Err(AgentError::MalformedRequest(
                "command contains no words".into(),
            ));
        };

        let mode = self
            .entries
            .get(verb)
            .copied()
            .ok_or_else(|| AgentError::CommandNotAllowed { verb: verb.clone() })?;

        Ok(AuthorizedCommand {
            mode,
            raw: raw.to_string(),
            tokens,
        })
    }
}
