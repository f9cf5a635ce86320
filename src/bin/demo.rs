//! RTU Master Demo
//!
//! Walks one full transaction through the engine against an in-memory
//! loopback device, then shows the failure paths: CRC corruption, a stray
//! response from the wrong slave, and a receive timeout.
//!
//! Usage: cargo run --bin demo

use std::time::Duration;

use rtu_master::{
    crc16, encode_request, ResponseStatus, RtuMaster, RtuResult, RtuTransport, RxNotifier,
};

/// In-memory device: answers every read with two registers
struct LoopbackDevice {
    slave_id: u8,
    respond: bool,
    corrupt: bool,
}

impl RtuTransport for LoopbackDevice {
    fn send(&mut self, frame: &[u8]) -> RtuResult<()> {
        println!("  -> TX {:02X?}", frame);
        Ok(())
    }

    fn begin_receive(&mut self, expected: usize, notifier: RxNotifier) -> RtuResult<()> {
        if !self.respond {
            println!("  (device silent, {} bytes will never arrive)", expected);
            return Ok(());
        }

        let frame = encode_request(self.slave_id, 0x03, &[0x04, 0x00, 0x0A, 0x00, 0x0B])
            .expect("response payload within limits");
        let mut bytes = frame.as_slice().to_vec();
        if self.corrupt {
            bytes[3] ^= 0x40;
        }
        println!("  <- RX {:02X?}", bytes);
        notifier.complete(&bytes);
        Ok(())
    }

    fn cancel_receive(&mut self) {}
}

fn run_transaction(master: &mut RtuMaster<LoopbackDevice>) {
    if let Err(e) = master.submit(0x03, &[0x00, 0x00, 0x00, 0x02]) {
        println!("  submit failed: {}", e);
        return;
    }
    if let Err(e) = master.begin_receive(5) {
        println!("  begin_receive failed: {}", e);
        return;
    }

    loop {
        match master.poll_response() {
            Ok(ResponseStatus::Complete(payload)) => {
                let reg1 = u16::from_be_bytes([payload[1], payload[2]]);
                let reg2 = u16::from_be_bytes([payload[3], payload[4]]);
                println!("  resolved: payload {:02X?} -> registers [{}, {}]", payload, reg1, reg2);
                break;
            }
            Ok(ResponseStatus::Pending) => continue,
            Err(e) => {
                println!("  resolved: {} (recoverable: {})", e, e.is_recoverable());
                break;
            }
        }
    }
}

#[tokio::main]
async fn main() {
    println!("RTU Master v{} Demo", rtu_master::VERSION);
    println!("====================\n");

    println!("CRC-16/MODBUS check value for \"123456789\": {:04X}\n", crc16(b"123456789"));

    // =========================================================================
    // Part 1: Successful transaction
    // =========================================================================
    println!("Part 1: read holding registers from slave 0x01");
    let device = LoopbackDevice { slave_id: 0x01, respond: true, corrupt: false };
    let mut master = RtuMaster::new(device, 0x01);
    run_transaction(&mut master);

    // =========================================================================
    // Part 2: Corrupted response
    // =========================================================================
    println!("\nPart 2: same read, one bit flipped on the line");
    let device = LoopbackDevice { slave_id: 0x01, respond: true, corrupt: true };
    let mut master = RtuMaster::new(device, 0x01);
    run_transaction(&mut master);

    // =========================================================================
    // Part 3: Stray response from another slave
    // =========================================================================
    println!("\nPart 3: a different device answers on the shared bus");
    let device = LoopbackDevice { slave_id: 0x02, respond: true, corrupt: false };
    let mut master = RtuMaster::new(device, 0x01);
    run_transaction(&mut master);

    // =========================================================================
    // Part 4: Timeout
    // =========================================================================
    println!("\nPart 4: device never answers");
    let device = LoopbackDevice { slave_id: 0x01, respond: false, corrupt: false };
    let mut master = RtuMaster::new(device, 0x01);
    master.set_receive_timeout(Duration::from_millis(50));
    match master.transact(0x03, &[0x00, 0x00, 0x00, 0x02], 5).await {
        Ok(_) => println!("  unexpected response"),
        Err(e) => println!("  resolved: {}", e),
    }

    println!("\nFinal stats: {:?}", master.stats());
}
