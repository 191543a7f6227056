use log::{debug, info, warn};
use std::path::Path;
use std::sync::Arc;

use crate::archive::{Compiler, ToolOutput};
use crate::errors::ArchiveError;
use crate::file_utils::FileManager;

// @module: Archive compilation and result classification

/// How a compilation that produced no fatal error ended
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CompileOutcome {
    /// Exit code 0
    Clean,
    /// Non-zero exit code without an error marker on stderr
    Warning { exit_code: i32, stderr: String },
}

/// Classify a compiler run.
///
/// A non-zero exit code alone is a warning; the help compiler returns non-zero for
/// benign conditions. Only a non-zero exit together with "error" on stderr is fatal.
pub fn classify(output: ToolOutput) -> Result<CompileOutcome, ArchiveError> {
    if output.success() {
        return Ok(CompileOutcome::Clean);
    }

    if output.stderr.to_lowercase().contains("error") {
        return Err(ArchiveError::CompilationFailed {
            exit_code: output.exit_code,
            stdout: output.stdout,
            stderr: output.stderr,
        });
    }

    Ok(CompileOutcome::Warning {
        exit_code: output.exit_code,
        stderr: output.stderr,
    })
}

/// Runs the compiler collaborator and moves the produced archive into place
#[derive(Debug, Clone)]
pub struct ArchiveCompiler {
    compiler: Arc<dyn Compiler>,
}

impl ArchiveCompiler {
    pub fn new(compiler: Arc<dyn Compiler>) -> Self {
        Self { compiler }
    }

    /// Compile `project`, expecting the archive at `produced`, and move it to `destination`
    pub async fn compile(
        &self,
        project: &Path,
        produced: &Path,
        destination: &Path,
    ) -> Result<CompileOutcome, ArchiveError> {
        if !project.is_file() {
            return Err(ArchiveError::ManifestMissing(project.to_path_buf()));
        }

        info!("Compiling {:?}", project);
        let output = self.compiler.compile(project).await?;
        debug!("Compiler stdout:\n{}", output.stdout);
        debug!("Compiler stderr:\n{}", output.stderr);

        let outcome = classify(output)?;
        if let CompileOutcome::Warning { exit_code, .. } = &outcome {
            warn!("Compiler returned non-zero exit status {}", exit_code);
        }

        if !produced.is_file() {
            return Err(ArchiveError::CompiledArchiveMissing(produced.to_path_buf()));
        }
        FileManager::move_file(produced, destination)?;
        info!("Compiled archive saved as {:?}", destination);

        Ok(outcome)
    }
}
