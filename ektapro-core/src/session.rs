//! One projector on one link
//!
//! A [`DeviceSession`] owns the link to a single projector, speaks the P-Com
//! codec over it and keeps the controller's belief of the projector's
//! brightness, slide and standby state. The projector itself is never asked
//! for brightness; the belief is whatever was last sent.

use embedded_hal::delay::DelayNs;
use ektapro_hal::{ChannelId, Uart};
use ektapro_protocol::{
    Command, Projector, SystemReturn, SystemStatus, TrayPosition, STATUS_REPLY_LEN,
    SYSTEM_RETURN_LEN,
};

use crate::error::{Error, PortError};

/// Full brightness, in percent
pub const FULL_BRIGHTNESS: u8 = 100;

/// Device units per percent of brightness
const BRIGHTNESS_SCALE: u16 = 10;

/// Pause between busy polls
pub const BUSY_POLL_INTERVAL_MS: u32 = 1000;

/// Busy replies tolerated before a motion gives up
pub const MAX_BUSY_POLLS: u32 = 30;

/// Ask whatever is on `port` to identify itself
///
/// The request goes to address 0; a projector answers on any address.
pub fn identify<C: Uart>(port: &mut C) -> Result<SystemReturn, Error<PortError<C>>> {
    let request = Projector::new(0).system_return().encode()?;
    port.write_blocking(&request).map_err(Error::Transport)?;
    port.flush().map_err(Error::Transport)?;

    let mut reply = [0u8; SYSTEM_RETURN_LEN];
    port.read_exact(&mut reply).map_err(Error::Transport)?;
    SystemReturn::parse(reply).map_err(|_| Error::InvalidDevice)
}

/// Open session with an identified projector
pub struct DeviceSession<C, D> {
    port: C,
    delay: D,
    channel: ChannelId,
    identity: SystemReturn,
    brightness: u8,
    slide: u16,
    standby: bool,
}

impl<C: Uart, D: DelayNs> DeviceSession<C, D> {
    pub fn new(port: C, delay: D, channel: ChannelId, identity: SystemReturn) -> Self {
        Self {
            port,
            delay,
            channel,
            identity,
            brightness: 0,
            slide: 0,
            standby: identity.standby,
        }
    }

    pub fn channel(&self) -> ChannelId {
        self.channel
    }

    pub fn identity(&self) -> &SystemReturn {
        &self.identity
    }

    /// Believed brightness in percent
    pub fn brightness(&self) -> u8 {
        self.brightness
    }

    /// Believed slide, `0..=tray_size`
    pub fn slide(&self) -> u16 {
        self.slide
    }

    pub fn standby(&self) -> bool {
        self.standby
    }

    pub fn tray_size(&self) -> u16 {
        self.identity.tray_size.slots()
    }

    #[cfg(test)]
    pub(crate) fn port(&self) -> &C {
        &self.port
    }

    /// Give the link back, e.g. to close it
    pub fn into_port(self) -> C {
        self.port
    }

    fn projector(&self) -> Projector {
        Projector::new(self.identity.address)
    }

    fn send(&mut self, command: Command) -> Result<(), Error<PortError<C>>> {
        let bytes = command.encode()?;
        info!("[{}] {:?}", self.channel, command);
        self.port.write_blocking(&bytes).map_err(Error::Transport)?;
        self.port.flush().map_err(Error::Transport)
    }

    fn query(
        &mut self,
        command: Command,
    ) -> Result<[u8; STATUS_REPLY_LEN], Error<PortError<C>>> {
        self.send(command)?;
        let mut reply = [0u8; STATUS_REPLY_LEN];
        self.port.read_exact(&mut reply).map_err(Error::Transport)?;
        debug!("[{}] reply {:?}", self.channel, reply);
        Ok(reply)
    }

    /// Set the lamp to `level` percent (clamped to 100)
    pub fn set_brightness(&mut self, level: u8) -> Result<(), Error<PortError<C>>> {
        let level = level.min(FULL_BRIGHTNESS);
        let command = self
            .projector()
            .set_brightness(level as u16 * BRIGHTNESS_SCALE);
        self.send(command)?;
        self.brightness = level;
        Ok(())
    }

    pub fn set_standby(&mut self, on: bool) -> Result<(), Error<PortError<C>>> {
        let command = self.projector().standby(on);
        self.send(command)?;
        self.standby = on;
        Ok(())
    }

    pub fn reset_system(&mut self) -> Result<(), Error<PortError<C>>> {
        let command = self.projector().reset_system();
        self.send(command)
    }

    pub fn system_status(&mut self) -> Result<SystemStatus, Error<PortError<C>>> {
        let command = self.projector().system_status();
        let reply = self.query(command)?;
        Ok(SystemStatus::parse(reply)?)
    }

    /// Poll until the projector accepts a motion command
    pub fn wait_until_idle(&mut self) -> Result<(), Error<PortError<C>>> {
        for poll in 1..=MAX_BUSY_POLLS {
            let status = self.system_status()?;
            if status.has_error() {
                warn!("[{}] error flags set: {:?}", self.channel, status);
            }
            if !status.busy {
                return Ok(());
            }
            trace!("[{}] busy, poll {}", self.channel, poll);
            if poll < MAX_BUSY_POLLS {
                self.delay.delay_ms(BUSY_POLL_INTERVAL_MS);
            }
        }
        warn!("[{}] still busy after {} polls", self.channel, MAX_BUSY_POLLS);
        Err(Error::BusyTimeout)
    }

    pub fn goto_slide(&mut self, slide: u16) -> Result<(), Error<PortError<C>>> {
        self.wait_until_idle()?;
        let command = self.projector().random_access(slide);
        self.send(command)?;
        self.slide = slide;
        Ok(())
    }

    /// Step forward; the belief wraps to 0 past the tray size
    pub fn goto_next_slide(&mut self) -> Result<(), Error<PortError<C>>> {
        self.wait_until_idle()?;
        let command = self.projector().slide_forward();
        self.send(command)?;
        self.slide = if self.slide >= self.tray_size() {
            0
        } else {
            self.slide + 1
        };
        Ok(())
    }

    /// Step backward; the belief wraps to the tray size below 0
    pub fn goto_prev_slide(&mut self) -> Result<(), Error<PortError<C>>> {
        self.wait_until_idle()?;
        let command = self.projector().slide_backward();
        self.send(command)?;
        self.slide = match self.slide.checked_sub(1) {
            Some(slide) => slide,
            None => self.tray_size(),
        };
        Ok(())
    }

    /// Replace the slide belief with the projector's tray position
    pub fn sync(&mut self) -> Result<(), Error<PortError<C>>> {
        let command = self.projector().get_tray_position();
        let reply = self.query(command)?;
        self.slide = TrayPosition::parse(reply)?.slide as u16;
        Ok(())
    }
}
