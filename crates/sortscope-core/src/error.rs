#![forbid(unsafe_code)]

//! Error types for sort runs.
//!
//! Every kind is deterministic: repeating the same call with the same input
//! reproduces the same failure, so nothing in the crate retries.

use thiserror::Error;

/// Errors surfaced by the array model, the engine, and the drivers.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SortError {
    /// Bad construction parameters; the run never starts.
    #[error("invalid config: {reason}")]
    InvalidConfig { reason: String },

    /// An index outside `[0, len)` reached the array model.
    ///
    /// The shipped algorithms never produce one, so this signals a defect.
    #[error("index {index} out of range for array of length {len}")]
    IndexOutOfRange { index: usize, len: usize },

    /// The requested algorithm name is not recognized.
    #[error("unknown algorithm: {0:?}")]
    UnknownAlgorithm(String),

    /// The worker thread panicked before handing the array back.
    #[error("sort worker panicked")]
    WorkerPanicked,
}

impl SortError {
    pub(crate) fn invalid_config(reason: impl Into<String>) -> Self {
        Self::InvalidConfig {
            reason: reason.into(),
        }
    }

    /// Whether the caller can recover by choosing different input.
    ///
    /// `IndexOutOfRange` and `WorkerPanicked` are defects, not user errors.
    pub fn is_caller_correctable(&self) -> bool {
        matches!(self, Self::InvalidConfig { .. } | Self::UnknownAlgorithm(_))
    }
}

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, SortError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_config_message_includes_reason() {
        let err = SortError::invalid_config("length must be at least 1");
        assert_eq!(
            err.to_string(),
            "invalid config: length must be at least 1"
        );
    }

    #[test]
    fn index_out_of_range_message() {
        let err = SortError::IndexOutOfRange { index: 7, len: 4 };
        assert_eq!(err.to_string(), "index 7 out of range for array of length 4");
    }

    #[test]
    fn unknown_algorithm_quotes_name() {
        let err = SortError::UnknownAlgorithm("quick".into());
        assert_eq!(err.to_string(), "unknown algorithm: \"quick\"");
    }

    #[test]
    fn correctable_kinds() {
        assert!(SortError::invalid_config("x").is_caller_correctable());
        assert!(SortError::UnknownAlgorithm("x".into()).is_caller_correctable());
        assert!(!SortError::IndexOutOfRange { index: 0, len: 0 }.is_caller_correctable());
        assert!(!SortError::WorkerPanicked.is_caller_correctable());
    }
}
