use async_trait::async_trait;
use log::{debug, trace};
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Duration;
use tokio::process::Command;

use crate::app_config::ToolConfig;
use crate::archive::{Compiler, Decompiler};
use crate::errors::ArchiveError;

// @module: External decompiler and compiler processes

/// Captured result of an external process run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolOutput {
    // @field: Process exit code, -1 when terminated by a signal
    pub exit_code: i32,
    pub stdout: String,
    pub stderr: String,
}

impl ToolOutput {
    pub fn success(&self) -> bool {
        self.exit_code == 0
    }
}

/// A configured external program with an argument template.
///
/// Arguments may contain the placeholders `{archive}`, `{output_dir}`, `{project}` and
/// `{project_dir}`; each is replaced by the corresponding path for the run.
#[derive(Debug, Clone)]
pub struct ExternalTool {
    name: String,
    program: PathBuf,
    args: Vec<String>,
    timeout: Duration,
}

impl ExternalTool {
    pub fn new(
        name: impl Into<String>,
        program: impl Into<PathBuf>,
        args: Vec<String>,
        timeout: Duration,
    ) -> Self {
        Self {
            name: name.into(),
            program: program.into(),
            args,
            timeout,
        }
    }

    pub fn from_config(name: impl Into<String>, config: &ToolConfig) -> Self {
        Self::new(
            name,
            &config.path,
            config.args.clone(),
            Duration::from_secs(config.timeout_secs),
        )
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn program(&self) -> &Path {
        &self.program
    }

    /// Check that the program exists, either at its explicit path or somewhere on `PATH`
    pub fn validate(&self) -> Result<PathBuf, ArchiveError> {
        find_program(&self.program).ok_or_else(|| ArchiveError::ToolNotFound {
            tool: self.name.clone(),
            path: self.program.clone(),
        })
    }

    /// Expand the argument template with the given placeholder values
    pub fn expand_args(&self, substitutions: &[(&str, &Path)]) -> Vec<String> {
        self.args
            .iter()
            .map(|arg| {
                substitutions.iter().fold(arg.clone(), |arg, (key, value)| {
                    arg.replace(&format!("{{{}}}", key), &value.to_string_lossy())
                })
            })
            .collect()
    }

    /// Run the program to completion, killing it if it exceeds its timeout
    pub async fn run(
        &self,
        substitutions: &[(&str, &Path)],
        working_dir: Option<&Path>,
    ) -> Result<ToolOutput, ArchiveError> {
        let args = self.expand_args(substitutions);
        debug!("Running {}: {:?} {:?}", self.name, self.program, args);

        let mut command = Command::new(&self.program);
        command
            .args(&args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        if let Some(dir) = working_dir {
            command.current_dir(dir);
        }

        let output = tokio::select! {
            result = command.output() => {
                result.map_err(|source| ArchiveError::ToolLaunch {
                    tool: self.name.clone(),
                    source,
                })?
            },
            _ = tokio::time::sleep(self.timeout) => {
                return Err(ArchiveError::ToolTimeout {
                    tool: self.name.clone(),
                    secs: self.timeout.as_secs(),
                });
            }
        };

        let result = ToolOutput {
            exit_code: output.status.code().unwrap_or(-1),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        };
        trace!("{} exited with code {}", self.name, result.exit_code);

        Ok(result)
    }
}

#[async_trait]
impl Decompiler for ExternalTool {
    async fn decompile(&self, archive: &Path, output_dir: &Path) -> Result<ToolOutput, ArchiveError> {
        self.run(&[("archive", archive), ("output_dir", output_dir)], None).await
    }
}

#[async_trait]
impl Compiler for ExternalTool {
    async fn compile(&self, project: &Path) -> Result<ToolOutput, ArchiveError> {
        let project_dir = project
            .parent()
            .filter(|dir| !dir.as_os_str().is_empty())
            .unwrap_or_else(|| Path::new("."));
        self.run(
            &[("project", project), ("project_dir", project_dir)],
            Some(project_dir),
        )
        .await
    }
}

fn find_program(program: &Path) -> Option<PathBuf> {
    if program.components().count() > 1 || program.is_absolute() {
        return program.is_file().then(|| program.to_path_buf());
    }

    let paths = std::env::var_os("PATH")?;
    std::env::split_paths(&paths).find_map(|dir| {
        let candidate = dir.join(program);
        if candidate.is_file() {
            return Some(candidate);
        }
        if cfg!(windows) && program.extension().is_none() {
            let with_exe = candidate.with_extension("exe");
            if with_exe.is_file() {
                return Some(with_exe);
            }
        }
        None
    })
}
