use anyhow::{Context, Result};
use std::fs;
use std::path::{Component, Path, PathBuf};
use walkdir::WalkDir;

use crate::errors::ArchiveError;

// @module: File and directory utilities

/// Role of a file inside an expanded archive
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileKind {
    /// Markup page whose text is translated
    Page,
    /// Table of contents (.hhc)
    Contents,
    /// Keyword index (.hhk)
    Index,
    /// Anything else; copied unchanged
    Asset,
}

impl FileKind {
    pub fn is_navigation(self) -> bool {
        matches!(self, Self::Contents | Self::Index)
    }
}

// @struct: File operations utility
pub struct FileManager;

impl FileManager {
    // @checks: File existence
    pub fn file_exists<P: AsRef<Path>>(path: P) -> bool {
        path.as_ref().is_file()
    }

    // @checks: Directory existence
    pub fn dir_exists<P: AsRef<Path>>(path: P) -> bool {
        path.as_ref().is_dir()
    }

    // @returns: Lowercased extension without the dot
    pub fn extension_of(path: &Path) -> Option<String> {
        path.extension().map(|ext| ext.to_string_lossy().to_lowercase())
    }

    /// Classify a file of an expanded archive by its extension
    pub fn classify(path: &Path, page_extensions: &[String]) -> FileKind {
        match Self::extension_of(path).as_deref() {
            Some("hhc") => FileKind::Contents,
            Some("hhk") => FileKind::Index,
            Some(ext) if page_extensions.iter().any(|p| p.trim_start_matches('.').eq_ignore_ascii_case(ext)) => {
                FileKind::Page
            }
            _ => FileKind::Asset,
        }
    }

    /// Whether a relative path names an archive system entry (`#SYSTEM`, `$WWKeywordLinks/...`)
    /// that the compiler regenerates
    pub fn is_archive_internal(relative: &Path) -> bool {
        relative.components().any(|component| match component {
            Component::Normal(name) => {
                let name = name.to_string_lossy();
                name.starts_with('#') || name.starts_with('$')
            }
            _ => false,
        })
    }

    // @generates: Output path for a translated archive
    // @params: input_file, prefix
    pub fn generate_output_path<P: AsRef<Path>>(input_file: P, prefix: &str) -> PathBuf {
        let input_file = input_file.as_ref();
        let file_name = input_file
            .file_name()
            .map(|name| name.to_string_lossy().to_string())
            .unwrap_or_default();

        input_file.with_file_name(format!("{}{}", prefix, file_name))
    }

    /// Find files with a specific extension in a directory, sorted by path
    pub fn find_files<P: AsRef<Path>>(dir: P, extension: &str) -> Result<Vec<PathBuf>> {
        let extension = extension.trim_start_matches('.');
        let mut result = Vec::new();

        for entry in WalkDir::new(dir.as_ref()).follow_links(true) {
            let entry = entry.context("Failed to read directory entry")?;
            let path = entry.path();

            if entry.file_type().is_file()
                && path
                    .extension()
                    .is_some_and(|ext| ext.to_string_lossy().eq_ignore_ascii_case(extension))
            {
                result.push(path.to_path_buf());
            }
        }

        result.sort();
        Ok(result)
    }

    /// All regular files below `root` as paths relative to it, sorted
    pub fn relative_files(root: &Path) -> Result<Vec<PathBuf>, ArchiveError> {
        let mut files = Vec::new();

        for entry in WalkDir::new(root).sort_by_file_name() {
            let entry = entry.map_err(|e| walk_error(root, e))?;
            if entry.file_type().is_file() {
                if let Ok(relative) = entry.path().strip_prefix(root) {
                    files.push(relative.to_path_buf());
                }
            }
        }

        Ok(files)
    }

    /// All directories below `root` (excluding `root`) as relative paths, parents first
    pub fn relative_dirs(root: &Path) -> Result<Vec<PathBuf>, ArchiveError> {
        let mut dirs = Vec::new();

        for entry in WalkDir::new(root).min_depth(1).sort_by_file_name() {
            let entry = entry.map_err(|e| walk_error(root, e))?;
            if entry.file_type().is_dir() {
                if let Ok(relative) = entry.path().strip_prefix(root) {
                    dirs.push(relative.to_path_buf());
                }
            }
        }

        Ok(dirs)
    }

    /// Write bytes to a file, creating its parent directory first
    pub fn write_bytes(path: &Path, content: &[u8]) -> Result<(), ArchiveError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| ArchiveError::io(parent, e))?;
        }
        fs::write(path, content).map_err(|e| ArchiveError::io(path, e))
    }

    /// Copy a file from one location to another, ensuring the target directory exists
    pub fn copy_file(from: &Path, to: &Path) -> Result<(), ArchiveError> {
        if let Some(parent) = to.parent() {
            fs::create_dir_all(parent).map_err(|e| ArchiveError::io(parent, e))?;
        }
        fs::copy(from, to).map_err(|e| ArchiveError::io(from, e))?;
        Ok(())
    }

    /// Move a file, falling back to copy and delete when a rename is not possible
    /// (for example across file systems)
    pub fn move_file(from: &Path, to: &Path) -> Result<(), ArchiveError> {
        if let Some(parent) = to.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).map_err(|e| ArchiveError::io(parent, e))?;
            }
        }

        if fs::rename(from, to).is_ok() {
            return Ok(());
        }

        fs::copy(from, to).map_err(|e| ArchiveError::io(to, e))?;
        fs::remove_file(from).map_err(|e| ArchiveError::io(from, e))
    }

    /// Render a relative path with `\` separators, as Windows help tools expect
    pub fn to_windows_path(relative: &Path) -> String {
        relative
            .components()
            .filter_map(|component| match component {
                Component::Normal(name) => Some(name.to_string_lossy().into_owned()),
                _ => None,
            })
            .collect::<Vec<_>>()
            .join("\\")
    }
}

fn walk_error(root: &Path, error: walkdir::Error) -> ArchiveError {
    let path = error.path().map(Path::to_path_buf).unwrap_or_else(|| root.to_path_buf());
    let source = error
        .into_io_error()
        .unwrap_or_else(|| std::io::Error::other("directory walk failed"));
    ArchiveError::io(path, source)
}
