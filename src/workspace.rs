//! Workspace root resolution
//!
//! A session is scoped to zero, one, or many workspace roots. The resolver
//! picks "the applicable root" for a file, or a root addressed by name.
//! Failures are typed so callers can report the exact user-facing message
//! and degrade to the `Unknown` sentinel instead of aborting.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::paths;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkspaceFolder {
    pub name: String,
    pub root_path: String,
}

impl WorkspaceFolder {
    pub fn new(name: impl Into<String>, root_path: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            root_path: root_path.into(),
        }
    }

    /// Last path component of the root, or the whole root path when it has
    /// no separator.
    pub fn basename(&self) -> &str {
        paths::basename(&self.root_path).unwrap_or(&self.root_path)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WorkspaceError {
    #[error("No folder open")]
    NoWorkspaceOpen,
    #[error("Use the name of the Workspace Folder")]
    AmbiguousWorkspace,
    #[error("Workspace not found with name: {0}")]
    WorkspaceNotFound(String),
}

/// Ordered set of workspace roots. Order is registration order; index 0 is
/// "the first root" used as the degraded fallback.
#[derive(Debug, Clone, Default)]
pub struct WorkspaceRoots {
    folders: Vec<WorkspaceFolder>,
}

impl WorkspaceRoots {
    pub fn new(folders: Vec<WorkspaceFolder>) -> Self {
        Self { folders }
    }

    pub fn is_empty(&self) -> bool {
        self.folders.is_empty()
    }

    pub fn len(&self) -> usize {
        self.folders.len()
    }

    pub fn first(&self) -> Option<&WorkspaceFolder> {
        self.folders.first()
    }

    pub fn iter(&self) -> impl Iterator<Item = &WorkspaceFolder> {
        self.folders.iter()
    }

    /// Resolves the applicable root for an optional file path.
    ///
    /// - zero roots: `NoWorkspaceOpen`
    /// - one root: that root, file or not
    /// - many roots, no file: `AmbiguousWorkspace`
    /// - many roots, file given: the root whose path prefixes the file;
    ///   when none does, the first root. The silent first-root fallback is
    ///   deliberate policy, distinct from the no-file ambiguity error.
    pub fn folder_for(&self, file: Option<&str>) -> Result<&WorkspaceFolder, WorkspaceError> {
        if self.folders.is_empty() {
            return Err(WorkspaceError::NoWorkspaceOpen);
        }
        if self.folders.len() > 1 {
            match file {
                None => return Err(WorkspaceError::AmbiguousWorkspace),
                Some(file) => {
                    if let Some(folder) = self.folders.iter().find(|w| file.starts_with(&w.root_path)) {
                        return Ok(folder);
                    }
                }
            }
        }
        Ok(&self.folders[0])
    }

    /// Looks up a root addressed explicitly. Exact name match, unless the
    /// name contains `/`, in which case it matches a suffix of the root
    /// path instead.
    pub fn named(&self, name: &str) -> Result<&WorkspaceFolder, WorkspaceError> {
        let found = if name.contains('/') {
            self.folders.iter().find(|w| w.root_path.ends_with(name))
        } else {
            self.folders.iter().find(|w| w.name == name)
        };
        found.ok_or_else(|| WorkspaceError::WorkspaceNotFound(name.to_string()))
    }
}
