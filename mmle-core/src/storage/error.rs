//! StorageError - Facade Error Taxonomy
//!
//! TigerStyle: one typed error enum with helper constructors.
//!
//! Only caller-contract violations (`InvalidArgument`) reach callers in
//! normal operation. Substrate-level failures exist so the probe and the
//! quota check have something to absorb; a failed probe downgrades the
//! backend silently, and malformed stored content degrades to a raw
//! string on read instead of erroring.

use thiserror::Error;

/// Result alias for all storage operations.
pub type StorageResult<T> = Result<T, StorageError>;

/// Errors produced by the storage facade and its substrates.
#[derive(Debug, Error)]
pub enum StorageError {
    /// Caller violated the operation contract (e.g. empty key).
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// A write would exceed the substrate's byte capacity.
    #[error("quota exceeded: {0}")]
    QuotaExceeded(String),

    /// Substrate write failed.
    #[error("write failed: {0}")]
    Write(String),

    /// Substrate read failed.
    #[error("read failed: {0}")]
    Read(String),

    /// Serialization or other internal failure.
    #[error("internal error: {0}")]
    Internal(String),
}

impl StorageError {
    /// Invalid argument error.
    pub fn invalid_argument(msg: impl Into<String>) -> Self {
        Self::InvalidArgument(msg.into())
    }

    /// Quota error.
    pub fn quota(msg: impl Into<String>) -> Self {
        Self::QuotaExceeded(msg.into())
    }

    /// Write error.
    pub fn write(msg: impl Into<String>) -> Self {
        Self::Write(msg.into())
    }

    /// Read error.
    pub fn read(msg: impl Into<String>) -> Self {
        Self::Read(msg.into())
    }

    /// Internal error.
    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_includes_detail() {
        let err = StorageError::invalid_argument("key cannot be empty");
        assert_eq!(err.to_string(), "invalid argument: key cannot be empty");

        let err = StorageError::quota("would use 6 MiB of 5 MiB");
        assert!(err.to_string().starts_with("quota exceeded"));
    }

    #[test]
    fn test_constructors_map_to_variants() {
        assert!(matches!(
            StorageError::write("w"),
            StorageError::Write(_)
        ));
        assert!(matches!(StorageError::read("r"), StorageError::Read(_)));
        assert!(matches!(
            StorageError::internal("i"),
            StorageError::Internal(_)
        ));
    }
}
