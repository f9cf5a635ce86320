//! Codec throughput benchmarks

use criterion::{black_box, criterion_group, criterion_main, Criterion};

use rtu_master::{crc16, decode_response, encode_request};

fn bench_crc16(c: &mut Criterion) {
    let small = [0x01u8, 0x03, 0x00, 0x00, 0x00, 0x02];
    let large = [0xA5u8; 250];

    c.bench_function("crc16_6_bytes", |b| b.iter(|| crc16(black_box(&small))));
    c.bench_function("crc16_250_bytes", |b| b.iter(|| crc16(black_box(&large))));
}

fn bench_codec(c: &mut Criterion) {
    let payload = [0x5Au8; 64];

    c.bench_function("encode_request_64", |b| {
        b.iter(|| encode_request(black_box(0x01), black_box(0x10), black_box(&payload)))
    });

    let frame = encode_request(0x01, 0x03, &payload).unwrap();
    let bytes = frame.as_slice().to_vec();
    c.bench_function("decode_response_64", |b| {
        b.iter(|| decode_response(black_box(&bytes), black_box(0x01), black_box(64)))
    });
}

criterion_group!(benches, bench_crc16, bench_codec);
criterion_main!(benches);
