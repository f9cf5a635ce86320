//! RTU frame codec
//!
//! Serializes a (slave id, function code, payload) tuple into a wire frame
//! with trailing CRC, and validates a received buffer back into a payload.
//! Frames live in a fixed-size stack array to avoid heap allocation on the
//! transmit path.

use tracing::{debug, trace};

use crate::constants::{CRC_LEN, FRAME_HEADER_LEN, MAX_DATA_SIZE, MAX_FRAME_SIZE};
use crate::crc::{crc16, crc_from_wire, crc_to_wire};
use crate::error::{RtuError, RtuResult};

/// An RTU frame with stack-allocated fixed storage
///
/// Wire layout: `[slave_id][function_code][payload...][crc_lo][crc_hi]`.
#[derive(Debug, Clone)]
pub struct RtuFrame {
    /// Fixed-size buffer (stack)
    data: [u8; MAX_FRAME_SIZE],
    /// Actual frame length
    len: usize,
}

impl RtuFrame {
    /// Create an empty frame
    #[inline]
    pub fn new() -> Self {
        Self {
            data: [0; MAX_FRAME_SIZE],
            len: 0,
        }
    }

    /// Push a single byte
    #[inline]
    fn push(&mut self, byte: u8) {
        debug_assert!(self.len < MAX_FRAME_SIZE);
        self.data[self.len] = byte;
        self.len += 1;
    }

    /// Extend with a byte slice
    #[inline]
    fn extend(&mut self, bytes: &[u8]) {
        debug_assert!(self.len + bytes.len() <= MAX_FRAME_SIZE);
        self.data[self.len..self.len + bytes.len()].copy_from_slice(bytes);
        self.len += bytes.len();
    }

    /// Get the frame bytes
    #[inline]
    pub fn as_slice(&self) -> &[u8] {
        &self.data[..self.len]
    }

    /// Get current length
    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    /// Check if empty
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Get the slave id (first byte)
    #[inline]
    pub fn slave_id(&self) -> Option<u8> {
        self.as_slice().first().copied()
    }

    /// Get the function code (second byte)
    #[inline]
    pub fn function_code(&self) -> Option<u8> {
        self.as_slice().get(1).copied()
    }
}

impl Default for RtuFrame {
    fn default() -> Self {
        Self::new()
    }
}

/// Format raw bytes as a hex string for packet tracing
pub(crate) fn format_hex(data: &[u8]) -> String {
    data.iter()
        .map(|b| format!("{:02X}", b))
        .collect::<Vec<_>>()
        .join(" ")
}

/// Encode a request frame
///
/// Writes slave id and function code, copies the payload, then appends the
/// CRC computed over everything before it, low byte first. Fails with
/// `InvalidFrame` when the payload exceeds [`MAX_DATA_SIZE`].
pub fn encode_request(slave_id: u8, function_code: u8, payload: &[u8]) -> RtuResult<RtuFrame> {
    if payload.len() > MAX_DATA_SIZE {
        return Err(RtuError::invalid_frame(payload.len(), MAX_DATA_SIZE));
    }

    let mut frame = RtuFrame::new();
    frame.push(slave_id);
    frame.push(function_code);
    frame.extend(payload);

    let crc = crc16(frame.as_slice());
    frame.extend(&crc_to_wire(crc));

    debug!(
        "Encoded request: slave={:02X} fc={:02X} payload_len={} crc={:04X}",
        slave_id,
        function_code,
        payload.len(),
        crc
    );
    trace!("TX frame: {}", format_hex(frame.as_slice()));

    Ok(frame)
}

/// Decode and validate a response frame
///
/// The caller guarantees the buffer holds exactly the `expected_len + 4`
/// bytes it asked the transport for; nothing past that offset is inspected.
/// Validation order:
/// 1. slave id against `expected_slave` (`InvalidSlaveId`),
/// 2. CRC over the first `expected_len + 2` bytes against the wire pair
///    that follows them (`CrcMismatch`).
///
/// On success returns the payload: the `expected_len` bytes after the
/// two-byte header.
pub fn decode_response(
    frame: &[u8],
    expected_slave: u8,
    expected_len: usize,
) -> RtuResult<&[u8]> {
    if expected_len > MAX_DATA_SIZE {
        return Err(RtuError::invalid_frame(expected_len, MAX_DATA_SIZE));
    }
    let total = expected_len + FRAME_HEADER_LEN + CRC_LEN;
    if frame.len() < total {
        return Err(RtuError::invalid_frame(frame.len(), total));
    }

    trace!("RX frame: {}", format_hex(&frame[..total]));

    let slave_id = frame[0];
    if slave_id != expected_slave {
        debug!(
            "Wrong slave id: expected {:02X}, got {:02X}",
            expected_slave, slave_id
        );
        return Err(RtuError::invalid_slave_id(expected_slave, slave_id));
    }

    let crc_offset = expected_len + FRAME_HEADER_LEN;
    let computed = crc16(&frame[..crc_offset]);
    let received = crc_from_wire([frame[crc_offset], frame[crc_offset + 1]]);
    if computed != received {
        debug!(
            "CRC mismatch: computed={:04X}, received={:04X}",
            computed, received
        );
        return Err(RtuError::crc_mismatch(computed, received));
    }

    Ok(&frame[FRAME_HEADER_LEN..crc_offset])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_known_frame() {
        // Read holding registers: slave 1, addr 0, qty 2
        let frame = encode_request(0x01, 0x03, &[0x00, 0x00, 0x00, 0x02]).unwrap();
        assert_eq!(
            frame.as_slice(),
            &[0x01, 0x03, 0x00, 0x00, 0x00, 0x02, 0xC4, 0x0B]
        );
        assert_eq!(frame.slave_id(), Some(0x01));
        assert_eq!(frame.function_code(), Some(0x03));
    }

    #[test]
    fn test_encode_empty_payload() {
        let frame = encode_request(0x01, 0x11, &[]).unwrap();
        assert_eq!(frame.len(), 4);
    }

    #[test]
    fn test_encode_size_limits() {
        let max = [0u8; 250];
        let frame = encode_request(0x01, 0x10, &max).unwrap();
        assert_eq!(frame.len(), 254);

        let oversize = [0u8; 251];
        assert_eq!(
            encode_request(0x01, 0x10, &oversize).unwrap_err(),
            RtuError::invalid_frame(251, 250)
        );
    }

    #[test]
    fn test_round_trip() {
        let payload = [0x04, 0x00, 0x0A, 0x00, 0x0B];
        let frame = encode_request(0x01, 0x03, &payload).unwrap();
        let decoded = decode_response(frame.as_slice(), 0x01, payload.len()).unwrap();
        assert_eq!(decoded, &payload);
    }

    #[test]
    fn test_decode_wrong_slave_with_valid_crc() {
        let frame = encode_request(0x12, 0x03, &[0x02, 0xAA, 0xBB]).unwrap();
        assert_eq!(
            decode_response(frame.as_slice(), 0x11, 3),
            Err(RtuError::invalid_slave_id(0x11, 0x12))
        );
    }

    #[test]
    fn test_decode_corrupted_payload() {
        let frame = encode_request(0x01, 0x03, &[0x02, 0xAA, 0xBB]).unwrap();
        let mut bytes = frame.as_slice().to_vec();
        bytes[3] ^= 0x01;
        assert!(matches!(
            decode_response(&bytes, 0x01, 3),
            Err(RtuError::CrcMismatch { .. })
        ));
    }

    #[test]
    fn test_decode_corrupted_function_code() {
        // Header bytes are covered by the CRC too
        let frame = encode_request(0x01, 0x03, &[0x02, 0xAA, 0xBB]).unwrap();
        let mut bytes = frame.as_slice().to_vec();
        bytes[1] = 0x04;
        assert!(matches!(
            decode_response(&bytes, 0x01, 3),
            Err(RtuError::CrcMismatch { .. })
        ));
    }

    #[test]
    fn test_decode_short_buffer() {
        let frame = encode_request(0x01, 0x03, &[0x02, 0xAA, 0xBB]).unwrap();
        assert!(matches!(
            decode_response(&frame.as_slice()[..5], 0x01, 3),
            Err(RtuError::InvalidFrame { .. })
        ));
    }

    #[test]
    fn test_decode_ignores_trailing_bytes() {
        // Caller-owned buffer may be larger than the frame it received
        let frame = encode_request(0x01, 0x03, &[0x02, 0xAA, 0xBB]).unwrap();
        let mut bytes = frame.as_slice().to_vec();
        bytes.extend_from_slice(&[0xDE, 0xAD, 0xBE, 0xEF]);
        let decoded = decode_response(&bytes, 0x01, 3).unwrap();
        assert_eq!(decoded, &[0x02, 0xAA, 0xBB]);
    }

    #[test]
    fn test_decode_oversize_expectation() {
        let bytes = [0u8; MAX_FRAME_SIZE];
        assert_eq!(
            decode_response(&bytes, 0x01, 251),
            Err(RtuError::invalid_frame(251, 250))
        );
    }
}
