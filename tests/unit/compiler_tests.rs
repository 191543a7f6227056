/*!
 * Tests for archive compilation
 */

use anyhow::Result;
use std::sync::Arc;

use chm_translator::archive::{ArchiveCompiler, CompileOutcome, Manifest};
use chm_translator::errors::ArchiveError;

use crate::common;
use crate::common::fake_tools::FakeCompiler;

/// Writes a minimal translated tree with its manifest and returns the manifest path
fn prepare_project(root: &std::path::Path) -> Result<std::path::PathBuf> {
    common::create_test_file(root, "target.hhc", "toc")?;
    common::create_test_file(root, "target.hhk", "index")?;
    common::create_test_file(root, "index.html", "<p>Hello</p>")?;
    let manifest = Manifest::scan(root, "help.chm", &["html".to_string()])?;
    Ok(manifest.write(root)?)
}

#[tokio::test]
async fn test_compile_withCleanRun_shouldMoveArchiveToDestination() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let project_dir = temp_dir.path().join("translated");
    let project = prepare_project(&project_dir)?;
    let destination = temp_dir.path().join("out/translated_help.chm");

    let outcome = ArchiveCompiler::new(Arc::new(FakeCompiler::default()))
        .compile(&project, &project_dir.join("help.chm"), &destination)
        .await?;

    assert_eq!(outcome, CompileOutcome::Clean);
    assert!(!project_dir.join("help.chm").exists());
    let files = common::read_fake_archive(&destination)?;
    assert_eq!(files.get("index.html").map(String::as_str), Some("<p>Hello</p>"));
    Ok(())
}

#[tokio::test]
async fn test_compile_withNonZeroExitAndWarning_shouldSucceedWithWarning() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let project_dir = temp_dir.path().join("translated");
    let project = prepare_project(&project_dir)?;
    let destination = temp_dir.path().join("help.chm");
    let compiler = FakeCompiler::with_exit(1, "HHC3004: Warning: file not found");

    let outcome = ArchiveCompiler::new(Arc::new(compiler))
        .compile(&project, &project_dir.join("help.chm"), &destination)
        .await?;

    assert!(matches!(outcome, CompileOutcome::Warning { exit_code: 1, .. }));
    assert!(destination.is_file());
    Ok(())
}

#[tokio::test]
async fn test_compile_withErrorOnStderr_shouldFail() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let project_dir = temp_dir.path().join("translated");
    let project = prepare_project(&project_dir)?;
    let destination = temp_dir.path().join("help.chm");
    let compiler = FakeCompiler::with_exit(1, "HHC5003: Error: compilation failed");

    let result = ArchiveCompiler::new(Arc::new(compiler))
        .compile(&project, &project_dir.join("help.chm"), &destination)
        .await;

    assert!(matches!(result, Err(ArchiveError::CompilationFailed { exit_code: 1, .. })));
    assert!(!destination.exists());
    Ok(())
}

#[tokio::test]
async fn test_compile_withoutProducedArchive_shouldFail() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let project_dir = temp_dir.path().join("translated");
    let project = prepare_project(&project_dir)?;

    let result = ArchiveCompiler::new(Arc::new(FakeCompiler::producing_nothing()))
        .compile(&project, &project_dir.join("help.chm"), &temp_dir.path().join("help.chm"))
        .await;

    assert!(matches!(result, Err(ArchiveError::CompiledArchiveMissing(_))));
    Ok(())
}

#[tokio::test]
async fn test_compile_withoutManifest_shouldFail() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;

    let result = ArchiveCompiler::new(Arc::new(FakeCompiler::default()))
        .compile(
            &temp_dir.path().join("project.hhp"),
            &temp_dir.path().join("help.chm"),
            &temp_dir.path().join("out.chm"),
        )
        .await;

    assert!(matches!(result, Err(ArchiveError::ManifestMissing(_))));
    Ok(())
}
