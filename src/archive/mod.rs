/*!
 * Help-archive plumbing around the translation pipeline.
 *
 * - `workspace`: temporary directory with the `expanded` and `translated` zones
 * - `tool`: external decompiler/compiler processes
 * - `expander`: decompilation and navigation file canonicalisation
 * - `assets`: byte-for-byte copy of everything that is not translated
 * - `manifest`: project file generation
 * - `compiler`: compilation and result classification
 */

use async_trait::async_trait;
use std::fmt::Debug;
use std::path::Path;

use crate::errors::ArchiveError;

pub use self::assets::{AssetCopier, AssetReport};
pub use self::compiler::{ArchiveCompiler, CompileOutcome};
pub use self::expander::{ArchiveExpander, ExpandedArchive};
pub use self::manifest::Manifest;
pub use self::tool::{ExternalTool, ToolOutput};
pub use self::workspace::Workspace;

/// Canonical file name of the table of contents after expansion
pub const CONTENTS_FILE_NAME: &str = "target.hhc";

/// Canonical file name of the index after expansion
pub const INDEX_FILE_NAME: &str = "target.hhk";

/// Unpacks a compiled archive into a directory
#[async_trait]
pub trait Decompiler: Send + Sync + Debug {
    /// Expand `archive` into `output_dir`; a non-zero exit code means failure
    async fn decompile(&self, archive: &Path, output_dir: &Path) -> Result<ToolOutput, ArchiveError>;
}

/// Builds a compiled archive from a project file
#[async_trait]
pub trait Compiler: Send + Sync + Debug {
    /// Compile the project; the caller classifies the exit code and output
    async fn compile(&self, project: &Path) -> Result<ToolOutput, ArchiveError>;
}

pub mod assets;
pub mod compiler;
pub mod expander;
pub mod manifest;
pub mod tool;
pub mod workspace;
