//! RTU protocol constants
//!
//! Derived from the Modbus over Serial Line specification:
//! - Maximum ADU size on RS485 is 256 bytes
//! - Payload capacity follows from the fixed framing overhead

// ============================================================================
// Frame Size Constants
// ============================================================================

/// Maximum RTU frame (ADU) size per the serial line specification
pub const MAX_FRAME_SIZE: usize = 256;

/// Frame header length: slave id (1) + function code (1)
pub const FRAME_HEADER_LEN: usize = 2;

/// Trailing CRC length
pub const CRC_LEN: usize = 2;

/// Maximum payload bytes carried between header and CRC
///
/// = 256 (ADU) - 1 (slave id) - 1 (function code) - 2 (CRC) = 252, held to
/// 250 so request and expected-response sizes validate against one limit
/// regardless of function-specific sub-headers.
pub const MAX_DATA_SIZE: usize = 250;

/// Smallest complete frame: header + CRC, empty payload
pub const MIN_FRAME_SIZE: usize = FRAME_HEADER_LEN + CRC_LEN;

// ============================================================================
// Timing Constants
// ============================================================================

/// Default receive window armed by `begin_receive`, in milliseconds
pub const DEFAULT_RECEIVE_TIMEOUT_MS: u64 = 100;

/// Poll interval used by the async `transact` driver, in milliseconds
pub const TRANSACT_POLL_INTERVAL_MS: u64 = 1;
