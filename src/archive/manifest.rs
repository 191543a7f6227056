/*!
 * Project manifest generation.
 *
 * The manifest is the `.hhp` project file the help compiler reads: an `[OPTIONS]` section
 * naming the compiled file and the navigation files, then a `[FILES]` section listing
 * every page. It is rebuilt from the translated tree rather than carried over, so it
 * always matches what is actually on disk.
 */

use log::{debug, info};
use std::path::{Path, PathBuf};

use crate::archive::{CONTENTS_FILE_NAME, INDEX_FILE_NAME};
use crate::errors::ArchiveError;
use crate::file_utils::{FileKind, FileManager};

/// File name of the generated project file
pub const PROJECT_FILE_NAME: &str = "project.hhp";

const LINE_ENDING: &str = "\r\n";

/// Everything the compiler needs to rebuild an archive
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Manifest {
    compiled_file: String,
    contents_file: PathBuf,
    index_file: PathBuf,
    language: Option<String>,
    full_text_search: bool,
    pages: Vec<PathBuf>,
}

impl Manifest {
    /// Scan a translated tree for its canonical navigation files and all pages.
    ///
    /// Fails when the contents or index file is missing, or when more than one file
    /// carries a canonical name.
    pub fn scan(root: &Path, compiled_file: &str, page_extensions: &[String]) -> Result<Self, ArchiveError> {
        let mut contents = Vec::new();
        let mut index = Vec::new();
        let mut pages = Vec::new();

        for file in FileManager::relative_files(root)? {
            let name = file
                .file_name()
                .map(|n| n.to_string_lossy().to_lowercase())
                .unwrap_or_default();
            if name == CONTENTS_FILE_NAME {
                contents.push(file);
            } else if name == INDEX_FILE_NAME {
                index.push(file);
            } else if FileManager::classify(&file, page_extensions) == FileKind::Page {
                pages.push(file);
            }
        }

        pages.sort();
        debug!("Manifest scan found {} pages", pages.len());

        Ok(Self {
            compiled_file: compiled_file.to_string(),
            contents_file: single(contents, "contents", root)?,
            index_file: single(index, "index", root)?,
            language: None,
            full_text_search: false,
            pages,
        })
    }

    /// Set the `Language=` option (an LCID such as `0x409 English (United States)`)
    pub fn with_language(mut self, language: Option<String>) -> Self {
        self.language = language;
        self
    }

    pub fn with_full_text_search(mut self, enabled: bool) -> Self {
        self.full_text_search = enabled;
        self
    }

    pub fn compiled_file(&self) -> &str {
        &self.compiled_file
    }

    pub fn contents_file(&self) -> &Path {
        &self.contents_file
    }

    pub fn index_file(&self) -> &Path {
        &self.index_file
    }

    pub fn pages(&self) -> &[PathBuf] {
        &self.pages
    }

    /// Render the project file text
    pub fn render(&self) -> String {
        let mut out = String::new();
        let mut line = |text: &str| {
            out.push_str(text);
            out.push_str(LINE_ENDING);
        };

        line("[OPTIONS]");
        line("Compatibility=1.1 or later");
        line(&format!("Compiled file={}", self.compiled_file));
        line(&format!("Contents file={}", FileManager::to_windows_path(&self.contents_file)));
        line(&format!("Index file={}", FileManager::to_windows_path(&self.index_file)));
        if let Some(language) = &self.language {
            line(&format!("Language={}", language));
        }
        if self.full_text_search {
            line("Full-text search=Yes");
        }
        line("");
        line("[FILES]");
        for page in &self.pages {
            line(&FileManager::to_windows_path(page));
        }

        out
    }

    /// Write the project file into `dir` and return its path
    pub fn write(&self, dir: &Path) -> Result<PathBuf, ArchiveError> {
        let path = dir.join(PROJECT_FILE_NAME);
        std::fs::write(&path, self.render()).map_err(|e| ArchiveError::io(&path, e))?;

        info!("Generated {:?} listing {} pages", path, self.pages.len());

        Ok(path)
    }
}

fn single(mut found: Vec<PathBuf>, role: &str, root: &Path) -> Result<PathBuf, ArchiveError> {
    match found.len() {
        0 => Err(ArchiveError::MissingNavigationFile {
            role: role.to_string(),
            dir: root.to_path_buf(),
        }),
        1 => Ok(found.remove(0)),
        count => Err(ArchiveError::AmbiguousNavigationFile {
            role: role.to_string(),
            count,
        }),
    }
}
