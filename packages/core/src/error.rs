use std::path::PathBuf;

/// Structured error type for the version-lifecycle engine.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("unknown Perl version: {name}")]
    NotFound { name: String },

    #[error("a Perl named '{name}' is already registered")]
    DuplicateName { name: String },

    #[error("name for a Perl must be 25 chars or less. You supplied {name}, length {len}")]
    NameTooLong { name: String, len: usize },

    #[error("permission denied: {message}")]
    PermissionDenied { message: String },

    #[error(
        "checksum of downloaded archive {} does not match expected output\n\
         expected: {}\n     got: {}",
        .archive.display(), .expected, .actual
    )]
    ChecksumMismatch {
        archive: PathBuf,
        expected: String,
        actual: String,
    },

    #[error("{} is malformed: {}", .path.display(), .detail)]
    ConfigMalformed { path: PathBuf, detail: String },

    #[error("download of {url} failed: {detail}")]
    Download { url: String, detail: String },

    #[error("I/O error: {message}")]
    Io {
        message: String,
        path: Option<PathBuf>,
        #[source]
        source: std::io::Error,
    },
}

impl Error {
    /// Shorthand for wrapping an I/O failure with its location.
    pub fn io(message: impl Into<String>, path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Error::Io {
            message: message.into(),
            path: Some(path.into()),
            source,
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
