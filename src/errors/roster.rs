use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum RosterError {
    #[error("Failed to read roster {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Roster {0} contains no device ids")]
    Empty(PathBuf),
}

impl RosterError {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        RosterError::Io {
            path: path.into(),
            source,
        }
    }
}
