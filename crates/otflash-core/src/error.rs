//! Error types for otflash-core

use std::io;
use std::path::PathBuf;

/// Errors produced by this layer itself.
///
/// Failures of the invoked external tools are deliberately NOT represented
/// here: the probe and the build/test collaborators surface their own output
/// and their exit status is logged, never converted into an error of ours.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// I/O error without more specific context
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// A required file could not be read
    #[error("failed to read {path}: {source}")]
    ReadFile {
        /// Path that was being read
        path: PathBuf,
        /// Underlying I/O error
        source: io::Error,
    },

    /// The tool configuration file failed to parse
    #[error("failed to parse config {path}: {source}")]
    ConfigParse {
        /// Path of the offending file
        path: PathBuf,
        /// Underlying TOML error
        source: toml::de::Error,
    },

    /// The hardware inventory file failed to parse
    #[error("invalid hardware config at line {line}: {message}")]
    HwConfig {
        /// 1-based line number in the INI file
        line: usize,
        /// What went wrong
        message: String,
    },

    /// The cluster-mode file failed to parse
    #[error("invalid cluster config: {0}")]
    Cluster(#[from] serde_json::Error),

    /// A required external executable is not on PATH
    #[error("required tool not found on PATH: {name}")]
    ToolNotFound {
        /// Binary name that was searched for
        name: String,
    },

    /// An external process could not be spawned at all
    #[error("failed to run {tool}: {source}")]
    Spawn {
        /// Command that failed to start
        tool: String,
        /// Underlying I/O error
        source: io::Error,
    },

    /// Unknown probe backend name on the command line
    #[error("unknown probe backend: {0}")]
    UnknownProbe(String),
}

/// Result type alias using the core error type
pub type Result<T> = std::result::Result<T, Error>;
