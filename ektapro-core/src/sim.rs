//! Simulated projectors for the unit tests

use std::collections::VecDeque;
use std::vec::Vec;

use embedded_hal::delay::DelayNs;
use ektapro_hal::{ChannelId, PortOpener, TimerHost, UartRx, UartTx, MAX_CHANNELS};
use ektapro_protocol::{Body, Command, DirectAction, Parameter, SetResetOption, StatusRequest, Switch};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SimError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Behaviour {
    Projector,
    /// Answers with bytes that are not an identification block
    Garbage,
    /// Never answers
    Mute,
}

/// A projector at the far end of a link
///
/// Answers status requests and records every command written to it.
#[derive(Debug)]
pub struct SimProjector {
    behaviour: Behaviour,
    address: u8,
    model: u8,
    tray_140: bool,
    busy_polls: u32,
    tray_position: u8,
    corrupt_status: bool,
    status_errors: u8,
    partial: Vec<u8>,
    replies: VecDeque<u8>,
    sent: Vec<[u8; 3]>,
}

impl SimProjector {
    pub fn new(address: u8, model: u8, tray_140: bool) -> Self {
        Self {
            behaviour: Behaviour::Projector,
            address,
            model,
            tray_140,
            busy_polls: 0,
            tray_position: 0,
            corrupt_status: false,
            status_errors: 0,
            partial: Vec::new(),
            replies: VecDeque::new(),
            sent: Vec::new(),
        }
    }

    pub fn silent_garbage() -> Self {
        Self {
            behaviour: Behaviour::Garbage,
            ..Self::new(0, 0, false)
        }
    }

    pub fn mute() -> Self {
        Self {
            behaviour: Behaviour::Mute,
            ..Self::new(0, 0, false)
        }
    }

    /// Report busy for the next `polls` status requests
    pub fn set_busy_polls(&mut self, polls: u32) {
        self.busy_polls = polls;
    }

    pub fn set_tray_position(&mut self, slide: u8) {
        self.tray_position = slide;
    }

    pub fn corrupt_status(&mut self) {
        self.corrupt_status = true;
    }

    /// Error bits (high six of the third status byte) in every status reply
    pub fn set_status_errors(&mut self, bits: u8) {
        self.status_errors = bits & 0xFC;
    }

    pub fn sent(&self) -> &[[u8; 3]] {
        &self.sent
    }

    pub fn clear_log(&mut self) {
        self.sent.clear();
    }

    /// Decoded commands other than status requests
    pub fn actions(&self) -> Vec<Body> {
        self.sent
            .iter()
            .map(|bytes| Command::decode(*bytes).body)
            .filter(|body| !matches!(body, Body::Status(_)))
            .collect()
    }

    pub fn count(&self, action: DirectAction) -> usize {
        self.actions()
            .iter()
            .filter(|body| **body == Body::Direct(action))
            .count()
    }

    /// Last brightness written, in device units
    pub fn last_brightness(&self) -> Option<u16> {
        self.actions().iter().rev().find_map(|body| match body {
            Body::Parameter(Parameter::SetBrightness(value)) => Some(*value),
            _ => None,
        })
    }

    pub fn last_standby(&self) -> Option<bool> {
        self.actions().iter().rev().find_map(|body| match body {
            Body::SetReset {
                option: SetResetOption::Standby,
                switch,
            } => Some(*switch == Switch::On),
            _ => None,
        })
    }

    fn handle(&mut self, bytes: [u8; 3]) {
        self.sent.push(bytes);
        let request = match Command::decode(bytes).body {
            Body::Status(request) => request,
            _ => return,
        };
        match (self.behaviour, request) {
            (Behaviour::Mute, _) => {}
            (Behaviour::Garbage, _) => self.replies.extend([0x00, 0x00, 0x00, 0x00, 0x00]),
            (_, StatusRequest::SystemReturn) => {
                let flags = if self.tray_140 { 0x08 } else { 0x00 };
                self.replies.extend([
                    (self.address << 4) | 6,
                    0xD0,
                    (self.model << 4) | 2,
                    0x23,
                    flags,
                ]);
            }
            (_, StatusRequest::SystemStatus) => {
                let busy = if self.busy_polls > 0 {
                    self.busy_polls -= 1;
                    0x02
                } else {
                    0x00
                };
                let b2 = if self.corrupt_status {
                    0x00
                } else {
                    self.status_errors | 0x03
                };
                self.replies
                    .extend([(self.address << 3) | 6, 0xC8 | busy, b2]);
            }
            (_, StatusRequest::TrayPosition) => {
                self.replies
                    .extend([(self.address << 3) | 6, 0xA0, self.tray_position]);
            }
            _ => {}
        }
    }
}

impl UartTx for SimProjector {
    type Error = SimError;

    fn write_blocking(&mut self, data: &[u8]) -> Result<(), SimError> {
        for &byte in data {
            self.partial.push(byte);
            if self.partial.len() == 3 {
                let bytes = [self.partial[0], self.partial[1], self.partial[2]];
                self.partial.clear();
                self.handle(bytes);
            }
        }
        Ok(())
    }

    fn flush(&mut self) -> Result<(), SimError> {
        Ok(())
    }
}

impl UartRx for SimProjector {
    type Error = SimError;

    fn read_exact(&mut self, buf: &mut [u8]) -> Result<(), SimError> {
        if self.replies.len() < buf.len() {
            self.replies.clear();
            return Err(SimError);
        }
        for slot in buf.iter_mut() {
            *slot = self.replies.pop_front().ok_or(SimError)?;
        }
        Ok(())
    }
}

/// Delay that returns immediately and adds up what was asked for
#[derive(Debug, Clone, Default)]
pub struct NoopDelay {
    total_ns: u64,
}

impl NoopDelay {
    pub fn total_ms(&self) -> u32 {
        (self.total_ns / 1_000_000) as u32
    }
}

impl DelayNs for NoopDelay {
    fn delay_ns(&mut self, ns: u32) {
        self.total_ns += ns as u64;
    }
}

/// Timer host that only records requests
#[derive(Debug, Default)]
pub struct RecordingTimer {
    pub calls: Vec<u32>,
}

impl RecordingTimer {
    pub fn take(&mut self) -> Vec<u32> {
        core::mem::take(&mut self.calls)
    }
}

impl TimerHost for RecordingTimer {
    fn call_after(&mut self, delay_ms: u32) {
        self.calls.push(delay_ms);
    }
}

/// Channel table of simulated links
#[derive(Debug, Default)]
pub struct MockOpener {
    channels: Vec<Option<SimProjector>>,
    /// Links handed back through `close`, in order
    pub closed: Vec<SimProjector>,
}

impl MockOpener {
    pub fn new() -> Self {
        Self {
            channels: (0..MAX_CHANNELS).map(|_| None).collect(),
            closed: Vec::new(),
        }
    }

    pub fn attach(mut self, channel: ChannelId, projector: SimProjector) -> Self {
        self.channels[channel as usize] = Some(projector);
        self
    }
}

impl PortOpener for MockOpener {
    type Port = SimProjector;
    type Error = SimError;

    fn open(&mut self, channel: ChannelId) -> Result<SimProjector, SimError> {
        self.channels
            .get_mut(channel as usize)
            .and_then(Option::take)
            .ok_or(SimError)
    }

    fn close(&mut self, port: SimProjector) {
        self.closed.push(port);
    }
}
