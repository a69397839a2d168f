// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Au-Zone Technologies. All Rights Reserved.

//! Half-duplex byte channel to the radar module.
//!
//! The protocol engine talks to a [`Channel`] rather than to a serial port
//! directly so that configuration and acquisition can be exercised against
//! scripted byte streams in tests.

use crate::error::Error;
use async_trait::async_trait;
use std::time::Duration;

/// Fixed line rate of the LD2410 UART.
pub const BAUD_RATE: u32 = 256_000;

/// Default bound on a single frame read.
pub const READ_TIMEOUT: Duration = Duration::from_millis(100);

/// Asynchronous half-duplex byte channel.
///
/// One command is in flight at a time: callers write a frame and then read
/// its answer before writing again.
#[async_trait]
pub trait Channel: Send {
    /// Writes the whole frame and flushes it to the device.
    async fn write(&mut self, data: &[u8]) -> Result<(), Error>;

    /// Reads until `terminator` has been received, `max` bytes have been
    /// collected, or `timeout` elapses, whichever comes first.
    ///
    /// A timeout is not an error: whatever was collected so far, possibly
    /// nothing, is returned and left to the frame decoder to judge.
    async fn read_until(
        &mut self,
        terminator: &[u8],
        max: usize,
        timeout: Duration,
    ) -> Result<Vec<u8>, Error>;

    /// Discards any input received but not yet read.
    async fn clear(&mut self) -> Result<(), Error>;
}

/// Serial port settings for the radar UART.
#[derive(Debug, Clone)]
pub struct SerialConfig {
    /// Device path, e.g. `/dev/ttyS0`
    pub device: String,
    /// Line rate, 256000 for the LD2410 family
    pub baud_rate: u32,
    /// Bound on a single frame read
    pub timeout: Duration,
}

impl Default for SerialConfig {
    fn default() -> Self {
        SerialConfig {
            device: "/dev/ttyS0".to_string(),
            baud_rate: BAUD_RATE,
            timeout: READ_TIMEOUT,
        }
    }
}

#[cfg(feature = "serial")]
pub use self::port::SerialChannel;

#[cfg(feature = "serial")]
mod port {
    use super::{Channel, SerialConfig};
    use crate::error::Error;
    use async_trait::async_trait;
    use log::{debug, info, trace, warn};
    use std::time::Duration;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio_serial::{
        ClearBuffer, DataBits, FlowControl, Parity, SerialPort, SerialPortBuilderExt,
        SerialStream, StopBits,
    };

    /// [`Channel`] over a tokio-serial stream configured 8N1 without flow
    /// control.
    pub struct SerialChannel {
        port: SerialStream,
        device: String,
        pending: Vec<u8>,
    }

    impl SerialChannel {
        /// Opens and configures the port.
        pub fn open(config: &SerialConfig) -> Result<Self, Error> {
            debug!(
                "opening serial device {} at {} baud",
                config.device, config.baud_rate
            );

            let port = tokio_serial::new(&config.device, config.baud_rate)
                .data_bits(DataBits::Eight)
                .stop_bits(StopBits::One)
                .parity(Parity::None)
                .flow_control(FlowControl::None)
                .timeout(config.timeout)
                .open_native_async()?;

            info!("serial device {} opened", config.device);

            Ok(SerialChannel {
                port,
                device: config.device.clone(),
                pending: Vec::new(),
            })
        }

        /// Device path the channel was opened on.
        pub fn device(&self) -> &str {
            &self.device
        }
    }

    fn find(haystack: &[u8], needle: &[u8]) -> Option<usize> {
        if needle.is_empty() {
            return None;
        }
        haystack
            .windows(needle.len())
            .position(|window| window == needle)
    }

    #[async_trait]
    impl Channel for SerialChannel {
        async fn write(&mut self, data: &[u8]) -> Result<(), Error> {
            trace!("{} write: {:02X?}", self.device, data);
            self.port.write_all(data).await?;
            self.port.flush().await?;
            Ok(())
        }

        async fn read_until(
            &mut self,
            terminator: &[u8],
            max: usize,
            timeout: Duration,
        ) -> Result<Vec<u8>, Error> {
            let deadline = tokio::time::Instant::now() + timeout;
            let mut data = std::mem::take(&mut self.pending);
            let mut buf = [0u8; 64];

            loop {
                if let Some(pos) = find(&data, terminator) {
                    // Bytes past the terminator belong to the next frame.
                    self.pending = data.split_off(pos + terminator.len());
                    break;
                }
                if data.len() >= max {
                    break;
                }

                match tokio::time::timeout_at(deadline, self.port.read(&mut buf)).await {
                    Ok(Ok(0)) => break,
                    Ok(Ok(n)) => data.extend_from_slice(&buf[..n]),
                    Ok(Err(err)) => return Err(Error::Io(err)),
                    Err(_) => {
                        trace!("{} read timeout after {} bytes", self.device, data.len());
                        break;
                    }
                }
            }

            trace!("{} read: {:02X?}", self.device, data);
            Ok(data)
        }

        async fn clear(&mut self) -> Result<(), Error> {
            self.pending.clear();
            if let Err(err) = self.port.clear(ClearBuffer::Input) {
                warn!("{} clear input failed: {}", self.device, err);
            }
            self.port.flush().await?;
            Ok(())
        }
    }
}
