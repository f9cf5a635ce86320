//! Fuzz the response decoder with arbitrary buffers and expectations.
//!
//! The decoder must never panic or read past `expected_len + 4`, whatever
//! the bytes look like.

#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;

use rtu_master::decode_response;

#[derive(Debug, Arbitrary)]
struct DecodeInput {
    frame: Vec<u8>,
    expected_slave: u8,
    expected_len: usize,
}

fuzz_target!(|input: DecodeInput| {
    let expected_len = input.expected_len % 300;
    let _ = decode_response(&input.frame, input.expected_slave, expected_len);
});
