use super::Format;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("I/O operation failed: {source}")]
    Io {
        #[from]
        source: std::io::Error,
    },

    #[error("failed to parse {format} data: {details} (at line ~{line})")]
    Parse {
        format: Format,
        line: usize,
        details: String,
    },

    #[error("no system descriptor (*.mpd) found in '{}'", dir.display())]
    MissingDescriptor { dir: PathBuf },

    #[error("{count} system descriptors (*.mpd) found in '{}', expected exactly one", dir.display())]
    AmbiguousDescriptor { dir: PathBuf, count: usize },
}

impl Error {
    pub fn parse(format: Format, line: usize, details: impl Into<String>) -> Self {
        Self::Parse {
            format,
            line,
            details: details.into(),
        }
    }
}
