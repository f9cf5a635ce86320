//! Master-side transaction state machine
//!
//! [`RtuMaster`] owns one in-flight request/response cycle: it encodes and
//! transmits the request, arms the transport and a receive deadline, and
//! resolves the transaction through non-blocking polls. Exactly one
//! transaction may be outstanding per engine instance; `submit` fails fast
//! instead of overwriting the in-flight buffers.
//!
//! State diagram:
//!
//! ```text
//! Idle --submit--> Sent --begin_receive--> Receiving --poll_response--+
//!  ^                                                                  |
//!  +---- Complete(payload) | CrcMismatch | InvalidSlaveId | Timeout --+
//! ```

use std::sync::Arc;
use std::time::{Duration, Instant};

use tracing::{debug, warn};

use crate::constants::{
    DEFAULT_RECEIVE_TIMEOUT_MS, MAX_DATA_SIZE, MIN_FRAME_SIZE, TRANSACT_POLL_INTERVAL_MS,
};
use crate::error::{RtuError, RtuResult};
use crate::frame::{decode_response, encode_request};
use crate::transport::{Clock, ReceiveSlot, RtuTransport, RxNotifier, SystemClock};

/// Outcome of a single non-blocking poll
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResponseStatus {
    /// No complete response and no timeout yet; poll again
    Pending,
    /// Response received and validated; payload bytes follow the header
    Complete(Vec<u8>),
}

/// Engine counters in the transport-statistics style
#[derive(Debug, Clone, Default)]
pub struct EngineStats {
    pub requests_sent: u64,
    pub responses_received: u64,
    pub crc_errors: u64,
    pub wrong_slave: u64,
    pub timeouts: u64,
    pub bytes_sent: u64,
    pub bytes_received: u64,
}

/// Transaction lifecycle
#[derive(Debug)]
enum EngineState {
    /// No transaction outstanding
    Idle,
    /// Request transmitted, receive not yet armed
    Sent,
    /// Receive armed; resolves by completion or deadline
    Receiving {
        slot: Arc<ReceiveSlot>,
        expected_len: usize,
        deadline: Instant,
    },
}

/// Master-side Modbus RTU transaction engine
///
/// Generic over the byte-level transport and the monotonic clock so the
/// core runs unmodified against a simulated bus in tests.
#[derive(Debug)]
pub struct RtuMaster<T: RtuTransport, C: Clock = SystemClock> {
    transport: T,
    clock: C,
    /// Target device address, fixed for the engine's lifetime
    slave_id: u8,
    receive_timeout: Duration,
    state: EngineState,
    stats: EngineStats,
}

impl<T: RtuTransport> RtuMaster<T, SystemClock> {
    /// Create an engine for one slave device with the default receive window
    pub fn new(transport: T, slave_id: u8) -> Self {
        Self::with_clock(transport, SystemClock, slave_id)
    }
}

impl<T: RtuTransport, C: Clock> RtuMaster<T, C> {
    /// Create an engine with an explicit time source
    pub fn with_clock(transport: T, clock: C, slave_id: u8) -> Self {
        Self {
            transport,
            clock,
            slave_id,
            receive_timeout: Duration::from_millis(DEFAULT_RECEIVE_TIMEOUT_MS),
            state: EngineState::Idle,
            stats: EngineStats::default(),
        }
    }

    /// Set the receive window armed by [`begin_receive`](Self::begin_receive)
    pub fn set_receive_timeout(&mut self, timeout: Duration) {
        self.receive_timeout = timeout;
    }

    /// Target slave id
    pub fn slave_id(&self) -> u8 {
        self.slave_id
    }

    /// Whether the engine can accept a new `submit`
    pub fn is_idle(&self) -> bool {
        matches!(self.state, EngineState::Idle)
    }

    /// Engine counters
    pub fn stats(&self) -> EngineStats {
        self.stats.clone()
    }

    /// Borrow the transport adapter
    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Borrow the transport adapter mutably
    pub fn transport_mut(&mut self) -> &mut T {
        &mut self.transport
    }

    /// Encode and transmit a request frame
    ///
    /// Valid only while idle: an outstanding transaction must resolve before
    /// the next request, so `Busy` is returned rather than reusing the
    /// in-flight buffers. Fails with `InvalidFrame` when the payload exceeds
    /// [`MAX_DATA_SIZE`] and with `TxFailed` when the transport rejects the
    /// write; in both cases the engine stays idle.
    pub fn submit(&mut self, function_code: u8, payload: &[u8]) -> RtuResult<()> {
        if !self.is_idle() {
            return Err(RtuError::Busy);
        }

        let frame = encode_request(self.slave_id, function_code, payload)?;
        self.transport.send(frame.as_slice())?;

        self.stats.requests_sent += 1;
        self.stats.bytes_sent += frame.len() as u64;
        self.state = EngineState::Sent;

        debug!(
            "Request submitted: slave={:02X} fc={:02X} frame_len={}",
            self.slave_id,
            function_code,
            frame.len()
        );
        Ok(())
    }

    /// Arm the transport for the expected response and start the timeout
    ///
    /// `expected_len` is the response payload length the caller derives from
    /// the request it sent; the transport is armed for `expected_len + 4`
    /// bytes (header and CRC included). A fresh receive slot is allocated
    /// per transaction so a stale completion from a superseded transaction
    /// cannot land in this one's buffer.
    pub fn begin_receive(&mut self, expected_len: usize) -> RtuResult<()> {
        if !matches!(self.state, EngineState::Sent) {
            return Err(RtuError::Busy);
        }
        if expected_len > MAX_DATA_SIZE {
            return Err(RtuError::invalid_frame(expected_len, MAX_DATA_SIZE));
        }

        let slot = ReceiveSlot::new();
        self.transport
            .begin_receive(expected_len + MIN_FRAME_SIZE, RxNotifier::new(Arc::clone(&slot)))?;

        let deadline = self.clock.now() + self.receive_timeout;
        self.state = EngineState::Receiving {
            slot,
            expected_len,
            deadline,
        };

        debug!(
            "Receive armed: expecting {} bytes within {:?}",
            expected_len + MIN_FRAME_SIZE,
            self.receive_timeout
        );
        Ok(())
    }

    /// Poll the outstanding transaction; never blocks
    ///
    /// Resolution order: a delivered completion wins over an elapsed
    /// deadline, so a notification arriving at the timeout boundary yields
    /// exactly one verdict. Every terminal outcome (payload, `CrcMismatch`,
    /// `InvalidSlaveId`, `Timeout`) disarms the transport and returns the
    /// engine to idle; `Ok(Pending)` leaves the transaction armed.
    pub fn poll_response(&mut self) -> RtuResult<ResponseStatus> {
        let (slot, expected_len, deadline) = match &self.state {
            EngineState::Receiving {
                slot,
                expected_len,
                deadline,
            } => (Arc::clone(slot), *expected_len, *deadline),
            _ => return Err(RtuError::Busy),
        };

        if let Some((len, buf)) = slot.take() {
            self.transport.cancel_receive();
            self.state = EngineState::Idle;
            self.stats.bytes_received += len as u64;

            return match decode_response(&buf[..len], self.slave_id, expected_len) {
                Ok(payload) => {
                    self.stats.responses_received += 1;
                    Ok(ResponseStatus::Complete(payload.to_vec()))
                }
                Err(err) => {
                    match err {
                        RtuError::CrcMismatch { .. } => self.stats.crc_errors += 1,
                        RtuError::InvalidSlaveId { .. } => self.stats.wrong_slave += 1,
                        _ => {}
                    }
                    warn!("Response rejected: {}", err);
                    Err(err)
                }
            };
        }

        if self.clock.now() >= deadline {
            self.transport.cancel_receive();
            self.state = EngineState::Idle;
            self.stats.timeouts += 1;

            warn!(
                "Transaction timed out: slave={:02X} after {:?}",
                self.slave_id, self.receive_timeout
            );
            return Err(RtuError::timeout(self.receive_timeout.as_millis() as u64));
        }

        Ok(ResponseStatus::Pending)
    }

    /// Run one full transaction to resolution
    ///
    /// Convenience driver over the non-blocking API: submits the request,
    /// arms the receive, then polls at a short interval until a terminal
    /// outcome. The per-poll semantics are identical to calling
    /// [`submit`](Self::submit), [`begin_receive`](Self::begin_receive) and
    /// [`poll_response`](Self::poll_response) by hand.
    pub async fn transact(
        &mut self,
        function_code: u8,
        payload: &[u8],
        expected_len: usize,
    ) -> RtuResult<Vec<u8>> {
        self.submit(function_code, payload)?;
        self.begin_receive(expected_len)?;

        loop {
            match self.poll_response()? {
                ResponseStatus::Complete(data) => return Ok(data),
                ResponseStatus::Pending => {
                    tokio::time::sleep(Duration::from_millis(TRANSACT_POLL_INTERVAL_MS)).await;
                }
            }
        }
    }
}
