use log::{debug, trace};
use std::fs;
use std::path::Path;

use crate::errors::ArchiveError;
use crate::file_utils::{FileKind, FileManager};

// @module: Copies untranslated files into the output tree

/// Counts of what the asset copier propagated
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AssetReport {
    pub files: usize,
    pub directories: usize,
}

/// Copies every file that is neither a page nor a navigation file, byte for byte.
///
/// Every directory of the source tree is recreated, so empty folders survive too.
/// Archive system entries (`#SYSTEM`, `$OBJINST`, ...) are left out because the
/// compiler writes its own.
#[derive(Debug, Clone)]
pub struct AssetCopier {
    page_extensions: Vec<String>,
}

impl AssetCopier {
    pub fn new(page_extensions: Vec<String>) -> Self {
        Self { page_extensions }
    }

    pub fn copy(&self, source: &Path, destination: &Path) -> Result<AssetReport, ArchiveError> {
        let mut report = AssetReport::default();

        for dir in FileManager::relative_dirs(source)? {
            if FileManager::is_archive_internal(&dir) {
                continue;
            }
            let target = destination.join(&dir);
            fs::create_dir_all(&target).map_err(|e| ArchiveError::io(&target, e))?;
            report.directories += 1;
        }

        for file in FileManager::relative_files(source)? {
            if FileManager::is_archive_internal(&file)
                || FileManager::classify(&file, &self.page_extensions) != FileKind::Asset
            {
                continue;
            }
            FileManager::copy_file(&source.join(&file), &destination.join(&file))?;
            trace!("Copied {:?}", file);
            report.files += 1;
        }

        debug!(
            "Copied {} assets and {} directories",
            report.files, report.directories
        );
        Ok(report)
    }
}
