//! Working-directory sandbox for execution requests.
//!
//! A requested directory is accepted only if its canonical form (absolute,
//! symlinks and `..` resolved) is equal to or below one of the configured
//! allowed roots. The check is component-wise on canonical paths, so a
//! textual prefix match (`/srv/app2` against `/srv/app`) or a symlink that
//! points out of the root never passes.

use crate::error::{GatewayError, Result};
use std::path::{Path, PathBuf};

/// The set of canonical roots a working directory must resolve into.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SandboxPolicy {
    roots: Vec<PathBuf>,
}

impl SandboxPolicy {
    /// Build a policy from configured roots.
    ///
    /// Every root is canonicalized up front; a root that does not exist or
    /// is not a directory is a configuration error, not a silent no-op.
    pub fn new<P: AsRef<Path>>(roots: &[P]) -> Result<Self> {
        if roots.is_empty() {
            return Err(GatewayError::Config(
                "sandbox policy requires at least one allowed root".to_string(),
            ));
        }

        let mut canonical = Vec::with_capacity(roots.len());
        for root in roots {
            let root = root.as_ref();
            let resolved = std::fs::canonicalize(root).map_err(|e| {
                GatewayError::Config(format!(
                    "allowed root '{}' cannot be resolved: {}",
                    root.display(),
                    e
                ))
            })?;
            if !resolved.is_dir() {
                return Err(GatewayError::Config(format!(
                    "allowed root '{}' is not a directory",
                    root.display()
                )));
            }
            if !canonical.contains(&resolved) {
                canonical.push(resolved);
            }
        }

        Ok(Self { roots: canonical })
    }

    /// The canonical allowed roots.
    pub fn roots(&self) -> &[PathBuf] {
        &self.roots
    }

    /// Whether an already-canonical path is equal to or below an allowed root.
    pub fn contains(&self, canonical: &Path) -> bool {
        self.roots.iter().any(|root| canonical.starts_with(root))
    }

    /// Resolve a requested working directory to its canonical form.
    ///
    /// Relative requests resolve against the gateway's current directory.
    /// Fails with [`GatewayError::SandboxViolation`] carrying the requested
    /// path when it is empty, cannot be resolved, is not a directory, or
    /// lies outside every root.
    pub fn resolve(&self, requested: &str) -> Result<PathBuf> {
        if requested.trim().is_empty() {
            return Err(GatewayError::sandbox_violation(
                requested,
                "is empty; a working directory is required",
            ));
        }

        let canonical = std::fs::canonicalize(requested).map_err(|e| {
            GatewayError::sandbox_violation(requested, format!("cannot be resolved: {}", e))
        })?;

        if !self.contains(&canonical) {
            return Err(GatewayError::sandbox_violation(
                requested,
                format!(
                    "resolves to '{}', which is outside every allowed root",
                    canonical.display()
                ),
            ));
        }

        if !canonical.is_dir() {
            return Err(GatewayError::sandbox_violation(
                requested,
                "is not a directory",
            ));
        }

        Ok(canonical)
    }
}
