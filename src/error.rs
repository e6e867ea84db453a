use std::{io, path::PathBuf};
use thiserror::Error;

/// Failures a conversion can end in.
///
/// Each variant maps onto one [`ErrorKind`], so callers can branch on the cause
/// without inspecting the message text.
#[derive(Error, Debug)]
pub enum ConvertError {
    /// The input (or a column-type descriptor) does not exist or cannot be opened.
    #[error("file not found - {}", path.display())]
    FileNotFound { path: PathBuf },

    /// Missing/empty header, a row with the wrong field count, or an unparsable descriptor.
    #[error("malformed input: {0}")]
    MalformedInput(String),

    /// The output could not be created, written or published.
    #[error("I/O error on {}: {}", path.display(), source)]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Anything else, e.g. input that is not valid UTF-8.
    #[error("{0}")]
    Unknown(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    FileNotFound,
    MalformedInput,
    IoFailure,
    UnknownFailure,
}

impl ConvertError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ConvertError::FileNotFound { .. } => ErrorKind::FileNotFound,
            ConvertError::MalformedInput(_) => ErrorKind::MalformedInput,
            ConvertError::Io { .. } => ErrorKind::IoFailure,
            ConvertError::Unknown(_) => ErrorKind::UnknownFailure,
        }
    }

    pub(crate) fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        ConvertError::Io {
            path: path.into(),
            source,
        }
    }

    /// Classify an error raised while opening `path` for reading.
    pub(crate) fn open(path: impl Into<PathBuf>, source: io::Error) -> Self {
        let path = path.into();
        match source.kind() {
            io::ErrorKind::NotFound | io::ErrorKind::PermissionDenied => {
                ConvertError::FileNotFound { path }
            }
            _ => ConvertError::io(path, source),
        }
    }
}

impl From<csv::Error> for ConvertError {
    fn from(err: csv::Error) -> Self {
        match err.kind() {
            csv::ErrorKind::Utf8 { pos, err } => ConvertError::Unknown(format!(
                "invalid UTF-8 in record {}: {}",
                pos.as_ref().map(|p| p.record()).unwrap_or(0),
                err
            )),
            csv::ErrorKind::UnequalLengths {
                pos,
                expected_len,
                len,
            } => ConvertError::MalformedInput(format!(
                "record {} has {} fields, expected {}",
                pos.as_ref().map(|p| p.record()).unwrap_or(0),
                len,
                expected_len
            )),
            _ => ConvertError::Unknown(err.to_string()),
        }
    }
}

pub type Result<T> = std::result::Result<T, ConvertError>;
