/*!
 * Error types for the chm-translator application.
 *
 * This module contains custom error types for different parts of the application,
 * using the thiserror crate for ergonomic error definitions. Stage failures that abort
 * an archive are `ArchiveError`s; everything a single text node or label can fail with
 * is a `TranslationError` and never leaves the stage that produced it.
 */

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur when working with provider APIs
#[derive(Error, Debug)]
pub enum ProviderError {
    /// Error when making an API request fails
    #[error("API request failed: {0}")]
    RequestFailed(String),

    /// Error when parsing an API response fails
    #[error("Failed to parse API response: {0}")]
    ParseError(String),

    /// Error returned by the API itself
    #[error("API responded with error: {status_code} - {message}")]
    ApiError {
        /// HTTP status code
        status_code: u16,
        /// Error message from the API
        message: String,
    },

    /// Error establishing or maintaining a connection
    #[error("Connection error: {0}")]
    ConnectionError(String),

    /// Error related to rate limiting
    #[error("Rate limit exceeded: {0}")]
    RateLimitExceeded(String),

    /// Error with authentication
    #[error("Authentication error: {0}")]
    AuthenticationError(String),

    /// Request the provider can never accept, such as an oversize text
    #[error("Invalid request: {0}")]
    InvalidRequest(String),
}

impl ProviderError {
    /// Whether retrying the same request later could succeed
    pub fn is_transient(&self) -> bool {
        match self {
            Self::RequestFailed(_) | Self::ConnectionError(_) | Self::RateLimitExceeded(_) => true,
            Self::ApiError { status_code, .. } => *status_code >= 500,
            Self::ParseError(_) | Self::AuthenticationError(_) | Self::InvalidRequest(_) => false,
        }
    }
}

/// Errors that can occur while translating a single string
#[derive(Error, Debug)]
pub enum TranslationError {
    /// Error from the provider API
    #[error("Provider error: {0}")]
    Provider(#[from] ProviderError),

    /// The provider did not answer in time
    #[error("Translation timed out after {0} ms")]
    Timeout(u64),

    /// The provider answered with nothing usable
    #[error("Provider returned an empty translation")]
    EmptyResponse,
}

/// Errors raised by the markup tree
#[derive(Error, Debug, PartialEq, Eq)]
pub enum MarkupError {
    /// The node exists but does not hold text
    #[error("Node {0} is not a text node")]
    NotATextNode(usize),

    /// The node exists but is not an element
    #[error("Node {0} is not an element")]
    NotAnElement(usize),
}

/// Errors raised while turning page bytes into text and back
#[derive(Error, Debug)]
pub enum EncodingError {
    /// The bytes are malformed for the detected encoding
    #[error("Content is not valid {encoding}")]
    DecodeFailed {
        /// Name of the encoding that was tried
        encoding: String,
    },

    /// A configured encoding label is not known to encoding_rs
    #[error("Unknown encoding label: {0}")]
    UnknownLabel(String),
}

/// Fatal errors that abort the translation of one archive
#[derive(Error, Debug)]
pub enum ArchiveError {
    /// An external tool binary is missing
    #[error("{tool} not found at {path:?}")]
    ToolNotFound {
        /// Tool role (decompiler, compiler)
        tool: String,
        /// Configured program path
        path: PathBuf,
    },

    /// An external tool could not be started
    #[error("Failed to launch {tool}: {source}")]
    ToolLaunch {
        /// Tool role
        tool: String,
        /// Underlying spawn error
        #[source]
        source: std::io::Error,
    },

    /// An external tool ran past its deadline and was killed
    #[error("{tool} timed out after {secs} seconds")]
    ToolTimeout {
        /// Tool role
        tool: String,
        /// Configured timeout
        secs: u64,
    },

    /// The decompiler returned a non-zero exit code
    #[error("Failed to decompile {archive:?} (exit code {exit_code}): {stderr}")]
    DecompileFailed {
        /// Archive that was being expanded
        archive: PathBuf,
        /// Exit code of the decompiler (-1 when killed by a signal)
        exit_code: i32,
        /// Captured standard error
        stderr: String,
    },

    /// The contents (.hhc) or index (.hhk) file is missing from the translated tree
    #[error("Missing {role} file in {dir:?}")]
    MissingNavigationFile {
        /// "contents" or "index"
        role: String,
        /// Directory that was scanned
        dir: PathBuf,
    },

    /// More than one file carries the canonical name for a role
    #[error("Found {count} canonical {role} files, expected exactly one")]
    AmbiguousNavigationFile {
        /// "contents" or "index"
        role: String,
        /// Number of matches
        count: usize,
    },

    /// The project manifest is not on disk when compilation starts
    #[error("Project file not found: {0:?}")]
    ManifestMissing(PathBuf),

    /// The compiler exited non-zero and reported an error
    #[error("Compilation failed (exit code {exit_code}): {stderr}")]
    CompilationFailed {
        /// Exit code of the compiler
        exit_code: i32,
        /// Captured standard output
        stdout: String,
        /// Captured standard error
        stderr: String,
    },

    /// The compiler finished but the archive it should have produced is absent
    #[error("Compiled archive not found: {0:?}")]
    CompiledArchiveMissing(PathBuf),

    /// File system failure while working on the archive
    #[error("I/O error on {path:?}: {source}")]
    Io {
        /// Path being read or written
        path: PathBuf,
        /// Underlying error
        #[source]
        source: std::io::Error,
    },
}

impl ArchiveError {
    /// Wrap an I/O error with the path it happened on
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io { path: path.into(), source }
    }
}
