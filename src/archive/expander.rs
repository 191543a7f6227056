use log::{debug, info, warn};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::archive::{Decompiler, Workspace, CONTENTS_FILE_NAME, INDEX_FILE_NAME};
use crate::errors::ArchiveError;
use crate::file_utils::FileManager;

// @module: Archive decompilation and navigation file canonicalisation

/// Result of expanding an archive into a workspace
#[derive(Debug, Clone, Default)]
pub struct ExpandedArchive {
    // @field: Relative path of the canonical table of contents, if the archive had one
    pub contents_file: Option<PathBuf>,
    // @field: Relative path of the canonical index, if the archive had one
    pub index_file: Option<PathBuf>,
    // @field: Number of files the decompiler produced
    pub file_count: usize,
}

/// Runs the decompiler and gives navigation files their canonical names
#[derive(Debug, Clone)]
pub struct ArchiveExpander {
    decompiler: Arc<dyn Decompiler>,
}

impl ArchiveExpander {
    pub fn new(decompiler: Arc<dyn Decompiler>) -> Self {
        Self { decompiler }
    }

    /// Decompile `archive` into the workspace's `expanded` zone.
    ///
    /// The archive is first copied into the workspace so the external tool never sees
    /// the caller's file name, and the input is never touched.
    pub async fn expand(&self, archive: &Path, workspace: &Workspace) -> Result<ExpandedArchive, ArchiveError> {
        let staged = workspace.staged_archive();
        fs::copy(archive, &staged).map_err(|e| ArchiveError::io(archive, e))?;

        info!("Decompiling {:?}", archive);
        let output = self.decompiler.decompile(&staged, workspace.expanded()).await?;
        if !output.success() {
            return Err(ArchiveError::DecompileFailed {
                archive: archive.to_path_buf(),
                exit_code: output.exit_code,
                stderr: output.stderr,
            });
        }

        let file_count = FileManager::relative_files(workspace.expanded())?.len();
        if file_count == 0 {
            return Err(ArchiveError::DecompileFailed {
                archive: archive.to_path_buf(),
                exit_code: output.exit_code,
                stderr: "decompiler produced no files".to_string(),
            });
        }
        debug!("Decompiler produced {} files", file_count);

        Ok(ExpandedArchive {
            contents_file: canonicalize(workspace.expanded(), "hhc", CONTENTS_FILE_NAME)?,
            index_file: canonicalize(workspace.expanded(), "hhk", INDEX_FILE_NAME)?,
            file_count,
        })
    }
}

/// Give exactly one file with `extension` the `canonical` name.
///
/// The shallowest candidate wins, ties broken by path order. Any other file that already
/// carries the canonical name is renamed aside so the name stays unique in the tree.
pub fn canonicalize(root: &Path, extension: &str, canonical: &str) -> Result<Option<PathBuf>, ArchiveError> {
    let mut candidates: Vec<PathBuf> = FileManager::relative_files(root)?
        .into_iter()
        .filter(|path| FileManager::extension_of(path).as_deref() == Some(extension))
        .collect();

    if candidates.is_empty() {
        warn!("No .{} file found in the expanded archive", extension);
        return Ok(None);
    }

    candidates.sort_by(|a, b| {
        a.components()
            .count()
            .cmp(&b.components().count())
            .then_with(|| a.cmp(b))
    });
    let chosen = candidates.remove(0);
    if !candidates.is_empty() {
        warn!(
            "Found {} .{} files, using {:?} as {}",
            candidates.len() + 1,
            extension,
            chosen,
            canonical
        );
    }

    for other in &candidates {
        if has_file_name(other, canonical) {
            let aside = unused_name(&root.join(other));
            debug!("Renaming {:?} aside to {:?}", other, aside);
            fs::rename(root.join(other), &aside).map_err(|e| ArchiveError::io(root.join(other), e))?;
        }
    }

    if has_file_name(&chosen, canonical) {
        return Ok(Some(chosen));
    }

    let target = chosen.with_file_name(canonical);
    let absolute_target = root.join(&target);
    fs::rename(root.join(&chosen), &absolute_target).map_err(|e| ArchiveError::io(root.join(&chosen), e))?;
    debug!("Renamed {:?} to {:?}", chosen, target);

    Ok(Some(target))
}

fn has_file_name(path: &Path, name: &str) -> bool {
    path.file_name()
        .is_some_and(|file_name| file_name.to_string_lossy().eq_ignore_ascii_case(name))
}

/// `dir/target-1.hhc`, `dir/target-2.hhc`, ... whichever is free first
fn unused_name(path: &Path) -> PathBuf {
    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let extension = path
        .extension()
        .map(|e| format!(".{}", e.to_string_lossy()))
        .unwrap_or_default();

    (1..)
        .map(|n| path.with_file_name(format!("{}-{}{}", stem, n, extension)))
        .find(|candidate| !candidate.exists())
        .unwrap_or_else(|| path.to_path_buf())
}
