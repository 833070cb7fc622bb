//! Error types for the collaborators that can fail: the session store, the
//! cue player and the CSV export. None of them is fatal to the timer.

use thiserror::Error;

use crate::timer::Cue;

/// Persistence failure
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("invalid record: {0}")]
    InvalidRecord(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("store lock poisoned")]
    LockPoisoned,
}

pub type StoreResult<T> = std::result::Result<T, StoreError>;

/// Playback failure
#[derive(Error, Debug)]
pub enum CueError {
    #[error("no sound configured for {0} cue")]
    NoSound(Cue),

    #[error("failed to start player for {cue} cue: {source}")]
    Spawn {
        cue: Cue,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to ring terminal bell: {0}")]
    Bell(#[source] std::io::Error),
}

/// Failure writing the session history out as CSV
#[derive(Error, Debug)]
pub enum ExportError {
    #[error("could not read sessions: {0}")]
    Store(#[from] StoreError),

    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = StoreError::InvalidRecord("bad date".into());
        assert_eq!(err.to_string(), "invalid record: bad date");

        let err = CueError::NoSound(Cue::LockIn);
        assert_eq!(err.to_string(), "no sound configured for lock-in cue");
    }

    #[test]
    fn test_from_rusqlite() {
        let err: StoreError = rusqlite::Error::QueryReturnedNoRows.into();
        assert!(matches!(err, StoreError::Database(_)));
    }
}
