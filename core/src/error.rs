use thiserror::Error;

use crate::Cell;

#[derive(Error, Debug)]
pub enum GameError {
    #[error("Malformed snapshot: {0}")]
    MalformedSnapshot(String),
    #[error("Invalid configuration: {0}")]
    InvalidConfig(&'static str),
    #[error("Could not parse configuration: {0}")]
    ConfigParse(#[from] toml::de::Error),
    #[error("No cache is visible at {}:{}", .0.i, .0.j)]
    CacheNotVisible(Cell),
    #[error("Stored value under {key:?} could not be encoded or decoded")]
    Storage {
        key: &'static str,
        #[source]
        source: serde_json::Error,
    },
}

pub type Result<T> = core::result::Result<T, GameError>;

/// Failure reported by the external position source. Recovered locally, never fatal.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Position unavailable: {reason}")]
pub struct PositionUnavailable {
    pub reason: String,
}

impl PositionUnavailable {
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}
