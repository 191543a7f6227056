/*!
 * Tests for file utilities
 */

use anyhow::Result;
use std::fs;
use std::path::{Path, PathBuf};

use chm_translator::file_utils::{FileKind, FileManager};

use crate::common;

#[test]
fn test_classify_withArchiveFiles_shouldUseExtension() {
    let pages = vec!["html".to_string(), ".htm".to_string()];

    assert_eq!(FileManager::classify(Path::new("a/INDEX.HTML"), &pages), FileKind::Page);
    assert_eq!(FileManager::classify(Path::new("b.htm"), &pages), FileKind::Page);
    assert_eq!(FileManager::classify(Path::new("toc.HHC"), &pages), FileKind::Contents);
    assert_eq!(FileManager::classify(Path::new("keys.hhk"), &pages), FileKind::Index);
    assert_eq!(FileManager::classify(Path::new("logo.gif"), &pages), FileKind::Asset);
    assert_eq!(FileManager::classify(Path::new("README"), &pages), FileKind::Asset);
    assert!(FileKind::Index.is_navigation());
    assert!(!FileKind::Page.is_navigation());
}

#[test]
fn test_is_archive_internal_withSystemEntries_shouldMatch() {
    assert!(FileManager::is_archive_internal(Path::new("#SYSTEM")));
    assert!(FileManager::is_archive_internal(Path::new("$WWKeywordLinks/Property")));
    assert!(!FileManager::is_archive_internal(Path::new("docs/c#.html")));
}

#[test]
fn test_generate_output_path_withPrefix_shouldKeepDirectory() {
    let output = FileManager::generate_output_path("/data/help/manual.chm", "en_");

    assert_eq!(output, PathBuf::from("/data/help/en_manual.chm"));
}

#[test]
fn test_find_files_withNestedArchives_shouldReturnSortedMatches() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let root = temp_dir.path();
    common::create_test_file(root, "b.chm", "x")?;
    common::create_test_file(root, "a.CHM", "x")?;
    common::create_test_file(root, "nested/c.chm", "x")?;
    common::create_test_file(root, "notes.txt", "x")?;

    let found = FileManager::find_files(root, "chm")?;

    assert_eq!(
        found,
        vec![root.join("a.CHM"), root.join("b.chm"), root.join("nested/c.chm")]
    );
    Ok(())
}

#[test]
fn test_relative_files_and_dirs_shouldBeRelativeToRoot() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let root = temp_dir.path();
    common::create_test_file(root, "index.html", "x")?;
    common::create_test_file(root, "sub/page.htm", "x")?;
    fs::create_dir_all(root.join("sub/empty"))?;

    assert_eq!(
        FileManager::relative_files(root)?,
        vec![PathBuf::from("index.html"), PathBuf::from("sub/page.htm")]
    );
    assert_eq!(
        FileManager::relative_dirs(root)?,
        vec![PathBuf::from("sub"), PathBuf::from("sub/empty")]
    );
    Ok(())
}

#[test]
fn test_move_file_withMissingTargetDirectory_shouldCreateIt() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let from = common::create_test_file(temp_dir.path(), "a.chm", "data")?;
    let to = temp_dir.path().join("out/deeper/b.chm");

    FileManager::move_file(&from, &to)?;

    assert!(!from.exists());
    assert_eq!(fs::read_to_string(&to)?, "data");
    Ok(())
}

#[test]
fn test_to_windows_path_shouldUseBackslashes() {
    assert_eq!(FileManager::to_windows_path(Path::new("a/b/c.htm")), "a\\b\\c.htm");
    assert_eq!(FileManager::to_windows_path(Path::new("./x.htm")), "x.htm");
}
