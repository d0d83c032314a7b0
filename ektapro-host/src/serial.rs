//! Serial port links
//!
//! Channel `n` is the `n`-th entry of the port list: either the ports named
//! in the configuration file or, when none are named, the ports the
//! operating system reports.

use std::io::{Read, Write};
use std::thread;
use std::time::Duration;

use embedded_hal::delay::DelayNs;
use ektapro_hal::uart::{DataBits, Parity, StopBits};
use ektapro_hal::{ChannelId, PortOpener, UartConfig, UartRx, UartTx, MAX_CHANNELS};
use log::{debug, info, warn};
use serialport::SerialPort;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum LinkError {
    #[error("no serial port behind channel {0}")]
    NoSuchChannel(ChannelId),
    #[error("serial port error: {0}")]
    Serial(#[from] serialport::Error),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// One open serial port
pub struct SerialLink {
    name: String,
    port: Box<dyn SerialPort>,
}

impl SerialLink {
    pub fn name(&self) -> &str {
        &self.name
    }
}

impl UartTx for SerialLink {
    type Error = LinkError;

    fn write_blocking(&mut self, data: &[u8]) -> Result<(), LinkError> {
        self.port.write_all(data)?;
        Ok(())
    }

    fn flush(&mut self) -> Result<(), LinkError> {
        self.port.flush()?;
        Ok(())
    }
}

impl UartRx for SerialLink {
    type Error = LinkError;

    fn read_exact(&mut self, buf: &mut [u8]) -> Result<(), LinkError> {
        self.port.read_exact(buf)?;
        Ok(())
    }
}

/// Opens channels by position in a port list
pub struct SerialOpener {
    ports: Vec<String>,
    config: UartConfig,
}

impl SerialOpener {
    /// Use `ports` if given, otherwise whatever the system enumerates
    pub fn new(ports: &[String], config: UartConfig) -> Result<Self, LinkError> {
        let mut ports = if ports.is_empty() {
            let mut names: Vec<String> = serialport::available_ports()?
                .into_iter()
                .map(|info| info.port_name)
                .collect();
            names.sort();
            names
        } else {
            ports.to_vec()
        };
        if ports.len() > MAX_CHANNELS {
            warn!(
                "{} serial ports listed, only the first {} are probed",
                ports.len(),
                MAX_CHANNELS
            );
            ports.truncate(MAX_CHANNELS);
        }
        Ok(Self { ports, config })
    }

    pub fn port_names(&self) -> &[String] {
        &self.ports
    }

    /// Channels that map to a port
    pub fn channels(&self) -> impl Iterator<Item = ChannelId> {
        0..self.ports.len() as ChannelId
    }
}

impl PortOpener for SerialOpener {
    type Port = SerialLink;
    type Error = LinkError;

    fn open(&mut self, channel: ChannelId) -> Result<SerialLink, LinkError> {
        let name = self
            .ports
            .get(channel as usize)
            .ok_or(LinkError::NoSuchChannel(channel))?
            .clone();

        let port = serialport::new(&name, self.config.baudrate)
            .data_bits(match self.config.data_bits {
                DataBits::Seven => serialport::DataBits::Seven,
                DataBits::Eight => serialport::DataBits::Eight,
            })
            .parity(match self.config.parity {
                Parity::None => serialport::Parity::None,
                Parity::Even => serialport::Parity::Even,
                Parity::Odd => serialport::Parity::Odd,
            })
            .stop_bits(match self.config.stop_bits {
                StopBits::One => serialport::StopBits::One,
                StopBits::Two => serialport::StopBits::Two,
            })
            .flow_control(serialport::FlowControl::None)
            .timeout(Duration::from_millis(self.config.read_timeout_ms as u64))
            .open()?;

        info!("channel {} opened {}", channel, name);
        Ok(SerialLink { name, port })
    }

    fn close(&mut self, port: SerialLink) {
        debug!("closing {}", port.name());
        drop(port);
    }
}

/// Blocking delay for the busy-wait handshake
#[derive(Debug, Clone, Copy, Default)]
pub struct SleepDelay;

impl DelayNs for SleepDelay {
    fn delay_ns(&mut self, ns: u32) {
        thread::sleep(Duration::from_nanos(ns as u64));
    }

    fn delay_ms(&mut self, ms: u32) {
        thread::sleep(Duration::from_millis(ms as u64));
    }
}
