use log::debug;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

use crate::errors::ArchiveError;

// @module: Per-run temporary workspace

const EXPANDED_DIR: &str = "expanded";
const TRANSLATED_DIR: &str = "translated";
const STAGED_ARCHIVE: &str = "source.chm";

/// Temporary directory owned by a single archive run.
///
/// The directory is removed when the workspace is dropped, so failure paths clean up
/// without extra code; `close` removes it explicitly and reports errors.
#[derive(Debug)]
pub struct Workspace {
    dir: TempDir,
    expanded: PathBuf,
    translated: PathBuf,
}

impl Workspace {
    /// Create a fresh workspace, under `root` when given, else the system temp directory
    pub fn create(root: Option<&Path>) -> Result<Self, ArchiveError> {
        let mut builder = tempfile::Builder::new();
        builder.prefix("chm-translate-");
        let dir = match root {
            Some(root) => {
                std::fs::create_dir_all(root).map_err(|e| ArchiveError::io(root, e))?;
                builder.tempdir_in(root).map_err(|e| ArchiveError::io(root, e))?
            }
            None => builder
                .tempdir()
                .map_err(|e| ArchiveError::io(std::env::temp_dir(), e))?,
        };

        let expanded = dir.path().join(EXPANDED_DIR);
        let translated = dir.path().join(TRANSLATED_DIR);
        for zone in [&expanded, &translated] {
            std::fs::create_dir(zone).map_err(|e| ArchiveError::io(zone, e))?;
        }
        debug!("Created workspace {:?}", dir.path());

        Ok(Self {
            dir,
            expanded,
            translated,
        })
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Decompiled source-language tree
    pub fn expanded(&self) -> &Path {
        &self.expanded
    }

    /// Target-language output tree
    pub fn translated(&self) -> &Path {
        &self.translated
    }

    /// Where the input archive is copied before decompilation
    pub fn staged_archive(&self) -> PathBuf {
        self.dir.path().join(STAGED_ARCHIVE)
    }

    /// Remove the workspace now
    pub fn close(self) -> Result<(), ArchiveError> {
        let path = self.dir.path().to_path_buf();
        self.dir.close().map_err(|e| ArchiveError::io(&path, e))?;
        debug!("Removed workspace {:?}", path);
        Ok(())
    }
}
