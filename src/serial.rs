//! Serial port transport adapter
//!
//! Implements [`RtuTransport`] over a real serial port via `tokio-serial`.
//! The engine's non-blocking receive model maps onto a spawned reader task:
//! `begin_receive` starts a task that reads exactly the expected byte count
//! and completes the transaction's notifier; `cancel_receive` aborts it.
//!
//! `send` blocks the calling thread until the frame is written or the write
//! timeout expires, matching the engine's instantaneous-or-failed contract.
//! It therefore requires the multi-threaded tokio runtime.

use std::sync::Arc;
use std::time::Duration;

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tokio_serial::{DataBits, Parity, SerialPortBuilderExt, SerialStream, StopBits};
use tracing::{debug, warn};

use crate::error::{RtuError, RtuResult};
use crate::transport::{RtuTransport, RxNotifier};

/// Default write timeout for the send path
const DEFAULT_WRITE_TIMEOUT: Duration = Duration::from_millis(500);

/// RTU transport over a serial port
pub struct SerialTransport {
    port: Arc<Mutex<SerialStream>>,
    port_name: String,
    write_timeout: Duration,
    reader: Option<JoinHandle<()>>,
}

impl SerialTransport {
    /// Open a port with 8N1 framing and the default write timeout
    pub fn open(port: &str, baud_rate: u32) -> RtuResult<Self> {
        Self::open_with_config(
            port,
            baud_rate,
            DataBits::Eight,
            StopBits::One,
            Parity::None,
            DEFAULT_WRITE_TIMEOUT,
        )
    }

    /// Open a port with full framing configuration
    ///
    /// `write_timeout` is the send-path knob: a write that does not finish
    /// within it is reported as `TxFailed`.
    pub fn open_with_config(
        port: &str,
        baud_rate: u32,
        data_bits: DataBits,
        stop_bits: StopBits,
        parity: Parity,
        write_timeout: Duration,
    ) -> RtuResult<Self> {
        let stream = tokio_serial::new(port, baud_rate)
            .data_bits(data_bits)
            .stop_bits(stop_bits)
            .parity(parity)
            .open_native_async()
            .map_err(|e| RtuError::tx_failed(format!("failed to open {}: {}", port, e)))?;

        debug!("Serial port {} open at {} baud", port, baud_rate);

        Ok(Self {
            port: Arc::new(Mutex::new(stream)),
            port_name: port.to_string(),
            write_timeout,
            reader: None,
        })
    }

    /// Port path this transport was opened on
    pub fn port_name(&self) -> &str {
        &self.port_name
    }
}

impl RtuTransport for SerialTransport {
    fn send(&mut self, frame: &[u8]) -> RtuResult<()> {
        let port = Arc::clone(&self.port);
        let data = frame.to_vec();
        let timeout = self.write_timeout;

        let handle = tokio::runtime::Handle::current();
        tokio::task::block_in_place(move || {
            handle.block_on(async move {
                let mut port = port.lock().await;
                match tokio::time::timeout(timeout, async {
                    port.write_all(&data).await?;
                    port.flush().await
                })
                .await
                {
                    Ok(Ok(())) => Ok(()),
                    Ok(Err(e)) => Err(RtuError::tx_failed(format!("serial write failed: {}", e))),
                    Err(_) => Err(RtuError::tx_failed(format!(
                        "serial write timed out after {:?}",
                        timeout
                    ))),
                }
            })
        })
    }

    fn begin_receive(&mut self, expected: usize, notifier: RxNotifier) -> RtuResult<()> {
        // A leftover reader belongs to a resolved transaction
        self.cancel_receive();

        let port = Arc::clone(&self.port);
        self.reader = Some(tokio::spawn(async move {
            let mut buf = vec![0u8; expected];
            let mut port = port.lock().await;
            match port.read_exact(&mut buf).await {
                Ok(_) => notifier.complete(&buf),
                Err(e) => warn!("serial read aborted: {}", e),
            }
        }));

        Ok(())
    }

    fn cancel_receive(&mut self) {
        if let Some(reader) = self.reader.take() {
            reader.abort();
        }
    }
}

impl Drop for SerialTransport {
    fn drop(&mut self) {
        self.cancel_receive();
    }
}
