//! Error types for the resource registry

use std::path::PathBuf;

use thiserror::Error;

use super::guid::Guid;
use super::kind::AssetKind;

/// Errors that can occur while loading or looking up assets.
///
/// Everything except [`AssetError::GuidCollision`] is recoverable: the
/// registry stays usable and callers may substitute a placeholder.
#[derive(Debug, Error)]
pub enum AssetError {
    /// The source file could not be read
    #[error("failed to read '{}': {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The source file was read but its content could not be decoded
    #[error("failed to decode '{}': {message}", path.display())]
    Decode { path: PathBuf, message: String },

    /// A text source had a syntax error
    #[error("{}:{line}: {message}", path.display())]
    Parse {
        path: PathBuf,
        line: usize,
        message: String,
    },

    /// No asset is registered under this GUID
    #[error("asset {0} not found")]
    NotFound(Guid),

    /// The asset exists but is not of the requested type
    #[error("asset {guid} is a {actual} and cannot be used as {expected}")]
    TypeMismatch {
        guid: Guid,
        actual: AssetKind,
        expected: &'static str,
    },

    /// The descriptor describes a different kind of asset than requested
    #[error("a {kind} descriptor cannot produce {expected}")]
    WrongDescriptor {
        kind: AssetKind,
        expected: &'static str,
    },

    /// A background load has not finished yet
    #[error("asset is still loading")]
    NotReady,

    /// A background load worker exited without reporting
    #[error("background load worker exited without a result")]
    WorkerLost,

    /// Unload refused because handles are still alive
    #[error("asset {guid} still has {refs} live handle(s)")]
    InUse { guid: Guid, refs: usize },

    /// Two assets were registered under the same GUID
    #[error("GUID collision on {0}")]
    GuidCollision(Guid),

    /// The manifest file could not be read or written
    #[error("manifest error: {0}")]
    Manifest(String),
}

impl AssetError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    pub(crate) fn decode(path: impl Into<PathBuf>, message: impl ToString) -> Self {
        Self::Decode {
            path: path.into(),
            message: message.to_string(),
        }
    }

    pub(crate) fn parse(path: impl Into<PathBuf>, line: usize, message: impl Into<String>) -> Self {
        Self::Parse {
            path: path.into(),
            line,
            message: message.into(),
        }
    }
}

/// Result type alias for asset operations
pub type AssetResult<T> = Result<T, AssetError>;
