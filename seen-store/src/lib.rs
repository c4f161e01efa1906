//! Persisted set of issue identifiers that have already been announced.
//!
//! The file holds one identifier per line. It is read in full at the start of
//! every cycle and rewritten in full at the end of it.

use issuewatch_core::{CoreError, StoreError};
use std::collections::HashSet;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::{debug, info};


pub type SeenSet = HashSet<String>;

#[derive(Debug, Clone)]
pub struct SeenStore {
    path: PathBuf,
}

impl SeenStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Reads the stored identifiers. A missing file is an empty set.
    pub async fn load(&self) -> Result<SeenSet, CoreError> {
        let contents = match tokio::fs::read_to_string(&self.path).await {
            Ok(contents) => contents,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!("No cache at {}, starting empty", self.path.display());
                return Ok(SeenSet::new());
            }
            Err(source) => {
                return Err(StoreError::ReadFailed {
                    path: self.path.display().to_string(),
                    source,
                }
                .into())
            }
        };

        let seen: SeenSet = contents
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .map(str::to_string)
            .collect();

        debug!("Loaded {} seen issues from {}", seen.len(), self.path.display());
        Ok(seen)
    }

    /// Overwrites the file with `seen`, creating parent directories first.
    pub async fn save(&self, seen: &SeenSet) -> Result<(), CoreError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|source| StoreError::CreateDirFailed {
                    path: parent.display().to_string(),
                    source,
                })?;
        }

        let mut contents = String::new();
        for id in seen {
            contents.push_str(id);
            contents.push('\n');
        }

        tokio::fs::write(&self.path, contents)
            .await
            .map_err(|source| StoreError::WriteFailed {
                path: self.path.display().to_string(),
                source,
            })?;

        info!("Saved {} seen issues to {}", seen.len(), self.path.display());
        Ok(())
    }
}
