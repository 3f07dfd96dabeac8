use std::{error::Error, fmt, io};

/// The crate's result type.
pub type Result<T> = std::result::Result<T, NetworkError>;

/// Failures surfaced when loading, saving or strictly validating a network.
///
/// The training engine itself never returns these: malformed networks are
/// handled leniently so a half-edited network cannot crash a run.
#[derive(Debug)]
pub enum NetworkError {
    Io(io::Error),
    Json(serde_json::Error),
    Invalid(String),
}

impl fmt::Display for NetworkError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NetworkError::Io(e) => write!(f, "io error: {e}"),
            NetworkError::Json(e) => write!(f, "malformed network document: {e}"),
            NetworkError::Invalid(reason) => write!(f, "invalid network: {reason}"),
        }
    }
}

impl Error for NetworkError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            NetworkError::Io(e) => Some(e),
            NetworkError::Json(e) => Some(e),
            NetworkError::Invalid(_) => None,
        }
    }
}

impl From<io::Error> for NetworkError {
    fn from(value: io::Error) -> Self {
        Self::Io(value)
    }
}

impl From<serde_json::Error> for NetworkError {
    fn from(value: serde_json::Error) -> Self {
        Self::Json(value)
    }
}
