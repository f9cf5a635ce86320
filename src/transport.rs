//! Transport and timer adapter interfaces
//!
//! The engine consumes byte-level services through two narrow traits:
//! [`RtuTransport`] for send/receive and [`Clock`] for monotonic time. Both
//! are object-safe so the core can run against a simulated bus in tests and
//! a real serial port in production.
//!
//! Received bytes cross the asynchronous boundary through a [`ReceiveSlot`]:
//! the transport's completion path is the slot's only writer, the engine's
//! poll is its only reader, and an atomic flag orders the two so the engine
//! never observes a partially written buffer.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Instant;

use tracing::trace;

use crate::constants::MAX_FRAME_SIZE;
use crate::error::RtuResult;
use crate::frame::format_hex;

/// Byte-level transport consumed by the engine
///
/// `send` is expected to be instantaneous-or-failed on a half-duplex bus;
/// implementations that cannot guarantee that should enforce their own write
/// timeout and report it as a send failure.
pub trait RtuTransport: Send {
    /// Transmit a complete request frame
    ///
    /// Returns `Err(TxFailed)` when the underlying medium rejects the write.
    fn send(&mut self, frame: &[u8]) -> RtuResult<()>;

    /// Arm an asynchronous receive of exactly `expected` bytes
    ///
    /// The transport must call [`RxNotifier::complete`] once the byte count
    /// has arrived, and must not touch the notifier after that. The engine
    /// hands over a fresh notifier per transaction.
    fn begin_receive(&mut self, expected: usize, notifier: RxNotifier) -> RtuResult<()>;

    /// Disarm any receive still outstanding
    ///
    /// Called when a transaction resolves (including by timeout) so a late
    /// completion cannot fire against a superseded notifier.
    fn cancel_receive(&mut self);
}

/// Monotonic time source used to arm and check the receive deadline
///
/// Resolution must be fine enough to distinguish the receive timeout.
pub trait Clock: Send + Sync {
    /// Current monotonic instant
    fn now(&self) -> Instant;
}

/// Clock backed by `std::time::Instant`
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    #[inline]
    fn now(&self) -> Instant {
        Instant::now()
    }
}

/// Fixed receive buffer guarded by the completion flag
#[derive(Debug)]
struct SlotBuf {
    data: [u8; MAX_FRAME_SIZE],
    len: usize,
}

/// One transaction's receive buffer and completion flag
///
/// Single-writer/single-reader: the transport completion path writes the
/// buffer then sets the flag with `Release`; the engine swaps the flag with
/// `Acquire` exactly once per poll before reading the buffer. The mutex
/// keeps the buffer write itself atomic with respect to a reader that has
/// already seen the flag.
#[derive(Debug)]
pub struct ReceiveSlot {
    buf: Mutex<SlotBuf>,
    ready: AtomicBool,
}

impl ReceiveSlot {
    /// Create an empty slot
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            buf: Mutex::new(SlotBuf {
                data: [0; MAX_FRAME_SIZE],
                len: 0,
            }),
            ready: AtomicBool::new(false),
        })
    }

    /// Consume the completed frame, if any
    ///
    /// Clears the flag, so each completion is observed at most once.
    pub(crate) fn take(&self) -> Option<(usize, [u8; MAX_FRAME_SIZE])> {
        if !self.ready.swap(false, Ordering::Acquire) {
            return None;
        }
        // A poisoned lock still holds a fully written buffer: the flag is
        // only set after the writer released it
        let buf = match self.buf.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        Some((buf.len, buf.data))
    }
}

/// Write handle given to the transport for one transaction
///
/// Cheap to clone into a completion callback or reader task. Completing a
/// notifier whose transaction has already resolved is harmless: the engine
/// has dropped its handle to the slot, so the bytes land in orphaned memory.
#[derive(Debug, Clone)]
pub struct RxNotifier {
    slot: Arc<ReceiveSlot>,
}

impl RxNotifier {
    pub(crate) fn new(slot: Arc<ReceiveSlot>) -> Self {
        Self { slot }
    }

    /// Deliver the received bytes and mark the transaction complete
    ///
    /// Bytes beyond [`MAX_FRAME_SIZE`] are truncated; the decoder rejects
    /// such frames by length. Safe to call from the transport's completion
    /// context while the engine is polling concurrently.
    pub fn complete(&self, bytes: &[u8]) {
        trace!("Receive complete: {} bytes: {}", bytes.len(), format_hex(bytes));
        {
            let mut buf = match self.slot.buf.lock() {
                Ok(guard) => guard,
                Err(poisoned) => poisoned.into_inner(),
            };
            let n = bytes.len().min(MAX_FRAME_SIZE);
            buf.data[..n].copy_from_slice(&bytes[..n]);
            buf.len = n;
        }
        self.slot.ready.store(true, Ordering::Release);
    }
}
