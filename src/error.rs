//! Error types for the RTU master engine
//!
//! All failures are surfaced to the caller as explicit `RtuError` values;
//! the engine never retries internally. `is_recoverable()` tells the caller
//! whether resubmitting a fresh transaction is a sensible policy.

use thiserror::Error;

/// Result type alias for RTU engine operations
pub type RtuResult<T> = Result<T, RtuError>;

/// Error conditions reported by the frame codec and transaction engine
///
/// Each variant carries enough context to diagnose the failure without
/// re-parsing the wire buffer.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RtuError {
    /// Requested payload or expected response exceeds the RTU data limit
    ///
    /// A caller programming error: the frame would not fit in the 256-byte
    /// ADU. Not retryable without fixing the request.
    #[error("invalid frame: {size} bytes exceeds maximum of {max}")]
    InvalidFrame { size: usize, max: usize },

    /// Transport could not transmit the request frame
    #[error("transmit failed: {message}")]
    TxFailed { message: String },

    /// Received CRC does not match the CRC computed over the frame
    ///
    /// Indicates corruption on the line. The transaction is already
    /// resolved; the caller may resubmit.
    #[error("CRC mismatch: computed={expected:04X}, received={actual:04X}")]
    CrcMismatch { expected: u16, actual: u16 },

    /// Response carries a slave id other than the one addressed
    ///
    /// A stray frame from another device on a shared bus. Reported rather
    /// than silently dropped so addressing problems are visible.
    #[error("invalid slave id: expected {expected}, got {actual}")]
    InvalidSlaveId { expected: u8, actual: u8 },

    /// No complete response arrived within the receive window
    #[error("response timeout after {timeout_ms}ms")]
    Timeout { timeout_ms: u64 },

    /// The call conflicts with the current transaction state
    ///
    /// `submit` while a transaction is outstanding fails with this rather
    /// than overwrite the in-flight buffers; `begin_receive` and
    /// `poll_response` fail with it when called out of order.
    #[error("operation conflicts with the current transaction state")]
    Busy,
}

impl RtuError {
    /// Create an invalid-frame error for an oversized payload
    pub fn invalid_frame(size: usize, max: usize) -> Self {
        Self::InvalidFrame { size, max }
    }

    /// Create a transmit-failure error
    pub fn tx_failed<S: Into<String>>(message: S) -> Self {
        Self::TxFailed {
            message: message.into(),
        }
    }

    /// Create a CRC mismatch error
    pub fn crc_mismatch(expected: u16, actual: u16) -> Self {
        Self::CrcMismatch { expected, actual }
    }

    /// Create an invalid-slave-id error
    pub fn invalid_slave_id(expected: u8, actual: u8) -> Self {
        Self::InvalidSlaveId { expected, actual }
    }

    /// Create a timeout error
    pub fn timeout(timeout_ms: u64) -> Self {
        Self::Timeout { timeout_ms }
    }

    /// Check whether resubmitting the transaction might succeed
    ///
    /// Transmission failures, line corruption and timeouts are transient;
    /// size violations, addressing problems and state misuse are not.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            Self::TxFailed { .. } | Self::CrcMismatch { .. } | Self::Timeout { .. }
        )
    }

    /// Check whether the error indicates a wire-integrity problem
    pub fn is_integrity_error(&self) -> bool {
        matches!(self, Self::CrcMismatch { .. } | Self::InvalidSlaveId { .. })
    }
}
