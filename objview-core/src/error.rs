//! Error types shared by the loader and the rendering collaborators.

use std::fmt;
use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Failure while loading geometry
#[derive(Error, Debug)]
pub enum ObjError {
    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("malformed record on line {line}: {reason}")]
    MalformedRecord { line: usize, reason: String },
}

impl ObjError {
    pub(crate) fn malformed(line: usize, reason: impl Into<String>) -> Self {
        Self::MalformedRecord {
            line,
            reason: reason.into(),
        }
    }
}

/// Programmable pipeline stage
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShaderStage {
    Vertex,
    Fragment,
}

impl fmt::Display for ShaderStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Vertex => write!(f, "vertex"),
            Self::Fragment => write!(f, "fragment"),
        }
    }
}

/// Failure reported by a window or render backend
#[derive(Error, Debug)]
pub enum BackendError {
    #[error("backend initialization failed: {0}")]
    Init(String),
    #[error("failed to read shader source {}: {source}", path.display())]
    ShaderSource {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("{stage} shader compilation failed:\n{log}")]
    ShaderCompile { stage: ShaderStage, log: String },
    #[error("shader program link failed:\n{log}")]
    ShaderLink { log: String },
    #[error("mesh upload failed: {0}")]
    Upload(String),
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}
