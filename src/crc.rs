//! CRC-16/MODBUS engine
//!
//! Polynomial 0xA001 (bit-reflected 0x8005), initial value 0xFFFF,
//! transmitted low byte first. Interoperability depends on this being
//! bit-exact, so the algorithm descriptor comes from the `crc` crate's
//! published `CRC_16_MODBUS` table rather than a hand-rolled loop.

use crc::{Crc, CRC_16_MODBUS};

/// CRC calculator for RTU frames
const CRC_MODBUS: Crc<u16> = Crc::<u16>::new(&CRC_16_MODBUS);

/// Compute the CRC-16/MODBUS checksum over `data`
///
/// Pure and deterministic. For a frame, the checksum covers every byte
/// preceding the two CRC bytes, slave id and function code included.
#[inline]
pub fn crc16(data: &[u8]) -> u16 {
    CRC_MODBUS.checksum(data)
}

/// Split a CRC into its wire-order byte pair (low byte first)
#[inline]
pub fn crc_to_wire(crc: u16) -> [u8; 2] {
    crc.to_le_bytes()
}

/// Reassemble a CRC from its wire-order byte pair (low byte first)
#[inline]
pub fn crc_from_wire(pair: [u8; 2]) -> u16 {
    u16::from_le_bytes(pair)
}
