//! Workspace containment: every file and directory operation is confined to
//! a single root directory fixed at startup.

mod files;
mod listing;

pub use files::{read_file, write_file};
pub use listing::list_dir;

use std::path::{Component, Path, PathBuf};

use crate::error::{AgentError, Result};

/// The single absolute directory outside of which no operation may reach.
///
/// Created on disk (if absent) and canonicalized once at startup; immutable
/// for the process lifetime. Multiple instances with different roots can
/// coexist, which is what the tests rely on.
#[derive(Debug, Clone)]
pub struct WorkspaceRoot {
    root: PathBuf,
}

impl WorkspaceRoot {
    /// Open (creating if missing) and canonicalize the workspace directory.
    pub fn open(dir: &Path) -> Result<Self> {
        std::fs::create_dir_all(dir)?;
        let root = dir.canonicalize()?;
        Ok(Self { root })
    }

    /// The canonical workspace root path.
    pub fn path(&self) -> &Path {
        &self.root
    }

    /// Resolve a caller-supplied relative path against the root.
    ///
    /// The input is untrusted: it may contain `..`, absolute segments, or be
    /// empty (meaning the root itself). Symlinks are resolved for every
    /// component that exists on disk; the non-existing tail is folded
    /// lexically. Fails with [`AgentError::PathEscape`] unless the result is
    /// the root or nested under it — compared path-segment-wise, so a
    /// sibling directory sharing a name prefix with the root is rejected.
    pub fn resolve(&self, relative: &str) -> Result<PathBuf> {
        let escape = || AgentError::PathEscape {
            path: relative.to_string(),
        };

        // NUL bytes can truncate paths in C-backed syscalls.
        if relative.contains('\0') {
            return Err(escape());
        }

        let rel = Path::new(relative);
        if rel.is_absolute() {
            return Err(escape());
        }

        // Fold `.` and `..` lexically first; popping past the root is a
        // guaranteed escape even when the referenced entries do not exist.
        let mut folded: Vec<&std::ffi::OsStr> = Vec::new();
        for component in rel.components() {
            match component {
                Component::Normal(part) => folded.push(part),
                Component::CurDir => {}
                Component::ParentDir => {
                    if folded.pop().is_none() {
                        return Err(escape());
                    }
                }
                Component::RootDir | Component::Prefix(_) => return Err(escape()),
            }
        }

        // Walk down from the canonical root, re-canonicalizing at each step
        // so symlinks inside the workspace cannot smuggle the path outside.
        let mut resolved = self.root.clone();
        for part in folded {
            resolved.push(part);
            if let Ok(canonical) = resolved.canonicalize() {
                resolved = canonical;
            }
        }

        if resolved == self.root || resolved.starts_with(&self.root) {
            Ok(resolved)
        } else {
            Err(escape())
        }
    }
}
