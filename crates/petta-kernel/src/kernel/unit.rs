//! Temporary source files handed to the engine
//!
//! The engine evaluates files, not strings, so every submission is written to
//! a uniquely named file that is removed when the unit goes out of scope.

use std::path::Path;

use tempfile::NamedTempFile;
use tracing::{debug, warn};

const UNIT_PREFIX: &str = "petta-cell-";

/// One submission persisted for evaluation
#[derive(Debug)]
pub struct SourceUnit {
    file: NamedTempFile,
}

impl SourceUnit {
    /// Write `code` verbatim to a new file in `dir`
    pub async fn create(dir: &Path, suffix: &str, code: &str) -> std::io::Result<Self> {
        let file = tempfile::Builder::new()
            .prefix(UNIT_PREFIX)
            .suffix(suffix)
            .tempfile_in(dir)?;
        tokio::fs::write(file.path(), code).await?;
        debug!(path = ?file.path(), len = code.len(), "wrote source unit");
        Ok(Self { file })
    }

    /// Path of the file on disk
    pub fn path(&self) -> &Path {
        self.file.path()
    }

    /// Remove the file now, logging instead of failing if that goes wrong
    ///
    /// Dropping the unit removes the file as well; this only makes the
    /// removal observable.
    pub fn remove(self) {
        let path = self.file.path().to_path_buf();
        if let Err(e) = self.file.close() {
            warn!(?path, error = %e, "failed to remove source unit");
        }
    }
}
