use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Errors raised while reading a MASCOT export. Every variant names the
/// file it came from, and the line where there is one.
#[derive(Error, Debug)]
pub enum Error {
    #[error("could not read {}: {source}", .path.display())]
    FileAccess {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("{}: header marker `{marker}` was never found", .path.display())]
    MissingHeaderMarker { path: PathBuf, marker: String },
    #[error("{}:{line}: malformed record: {reason}", .path.display())]
    MalformedRecord {
        path: PathBuf,
        line: usize,
        reason: String,
    },
}

impl Error {
    pub fn malformed<P: Into<PathBuf>, S: Into<String>>(path: P, line: usize, reason: S) -> Error {
        Error::MalformedRecord {
            path: path.into(),
            line,
            reason: reason.into(),
        }
    }
}
