//! # RTU Master — Modbus RTU protocol engine for the initiator side
//!
//! A master-side Modbus RTU engine for resource-constrained controllers:
//! builds outbound request frames, validates inbound response frames
//! (CRC-16/MODBUS, slave addressing), and tracks transaction completion
//! against a bounded timing window.
//!
//! ## Design
//!
//! - **Frame codec**: `[slave_id][function_code][payload...][crc_lo][crc_hi]`,
//!   stack-allocated buffers, CRC over every byte preceding the CRC pair
//! - **Transaction engine**: non-blocking `submit` / `begin_receive` /
//!   `poll_response` state machine; exactly one transaction in flight
//! - **Adapters**: transport and clock behind traits, so the core is
//!   testable against a simulated bus without hardware
//! - **No policy**: CRC errors, wrong-slave frames and timeouts are surfaced
//!   to the caller, never retried internally
//!
//! Function-specific payload semantics (register vs. coil decoding) are out
//! of scope: the caller derives the expected response length from the
//! request it sent.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use rtu_master::{ResponseStatus, RtuMaster, RtuResult, RtuTransport};
//!
//! fn poll_to_completion<T: RtuTransport>(master: &mut RtuMaster<T>) -> RtuResult<Vec<u8>> {
//!     // Read holding registers: addr 0, qty 2 -> 5 payload bytes back
//!     master.submit(0x03, &[0x00, 0x00, 0x00, 0x02])?;
//!     master.begin_receive(5)?;
//!     loop {
//!         match master.poll_response()? {
//!             ResponseStatus::Complete(payload) => return Ok(payload),
//!             ResponseStatus::Pending => continue,
//!         }
//!     }
//! }
//! ```

// ============================================================================
// Core modules
// ============================================================================

/// Core error types and result handling
pub mod error;

/// RTU frame size and timing constants
pub mod constants;

/// CRC-16/MODBUS engine
pub mod crc;

/// Frame assembly and validation
pub mod frame;

/// Transport and clock adapter interfaces
pub mod transport;

/// Transaction state machine
pub mod engine;

/// Serial port transport adapter
#[cfg(feature = "serial")]
pub mod serial;

// ============================================================================
// Re-exports for convenience
// ============================================================================

// === Core engine API ===
pub use engine::{EngineStats, ResponseStatus, RtuMaster};

// === Error handling ===
pub use error::{RtuError, RtuResult};

// === Frame codec ===
pub use crc::crc16;
pub use frame::{decode_response, encode_request, RtuFrame};

// === Adapter interfaces ===
pub use transport::{Clock, ReceiveSlot, RtuTransport, RxNotifier, SystemClock};

// === Protocol limits (commonly needed constants) ===
pub use constants::{DEFAULT_RECEIVE_TIMEOUT_MS, MAX_DATA_SIZE, MAX_FRAME_SIZE, MIN_FRAME_SIZE};

#[cfg(feature = "serial")]
pub use serial::SerialTransport;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
