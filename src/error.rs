use thiserror::Error;
use tracing::warn;

pub type RadarResult<T> = Result<T, RadarError>;

#[derive(Debug, Error)]
pub enum RadarError {
    #[error("invalid configuration for {field}: {reason}")]
    InvalidConfiguration { field: &'static str, reason: String },

    #[error("malformed booking record on line {line}: {reason}")]
    MalformedRecord { line: u64, reason: String },
}

impl RadarError {
    pub fn invalid_config(field: &'static str, reason: impl Into<String>) -> Self {
        let reason = reason.into();
        warn!(target: "radar::config", field, %reason, "rejected configuration");
        RadarError::InvalidConfiguration { field, reason }
    }

    pub fn malformed(line: u64, reason: impl Into<String>) -> Self {
        let reason = reason.into();
        warn!(target: "radar::records", line, %reason, "rejected booking record");
        RadarError::MalformedRecord { line, reason }
    }
}
