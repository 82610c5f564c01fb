use std::path::PathBuf;
use thiserror::Error;

/// Errors produced by a single metadata source.
///
/// Only [`LoaderError::Configuration`] and [`LoaderError::Io`] are meant to reach a caller
/// as real failures. Everything else means "this source has nothing for the file" and is
/// absorbed by [`LoaderChain`](crate::loader::LoaderChain), which moves on to the next source.
#[derive(Error, Debug)]
pub enum LoaderError {
    /// The source was configured with a missing or non-executable tool path.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// A file the operation strictly requires could not be opened or read.
    #[error("I/O error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("image file not found or not readable: {}", .0.display())]
    MissingFile(PathBuf),

    #[error("source is not configured")]
    NotConfigured,

    #[error("no metadata found")]
    NoMetadata,

    /// The external tool could not be launched or exited unsuccessfully.
    #[error("external tool failed: {0}")]
    Tool(String),

    #[error("parse error: {0}")]
    Parse(String),
}

impl LoaderError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        LoaderError::Io {
            path: path.into(),
            source,
        }
    }

    /// `true` for the variants that simply mean "nothing here" rather than a fault.
    pub fn is_absence(&self) -> bool {
        matches!(
            self,
            LoaderError::NoMetadata | LoaderError::NotConfigured | LoaderError::MissingFile(_)
        )
    }
}
