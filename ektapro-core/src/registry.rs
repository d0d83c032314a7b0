//! The set of connected projectors
//!
//! Discovery probes a fixed list of channels, keeps every link that answers
//! like an Ektapro and remembers which session is active. The fade engine
//! works on the active session and its neighbours, which are taken in ring
//! order.

use embedded_hal::delay::DelayNs;
use ektapro_hal::{ChannelId, PortOpener, Uart, MAX_CHANNELS};
use heapless::Vec;

use crate::error::{Error, PortError};
use crate::session::{identify, DeviceSession};

/// Most projectors one registry holds
pub const MAX_DEVICES: usize = MAX_CHANNELS;

/// Connected projectors plus the active selection
pub struct Registry<C, D> {
    sessions: Vec<DeviceSession<C, D>, MAX_DEVICES>,
    active: Option<usize>,
    max_tray_size: u16,
    standby: bool,
}

impl<C, D> Default for Registry<C, D> {
    fn default() -> Self {
        Self {
            sessions: Vec::new(),
            active: None,
            max_tray_size: 0,
            // projectors are assumed asleep until `reset_all` wakes them
            standby: true,
        }
    }
}

impl<C: Uart, D: DelayNs> Registry<C, D> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild the registry by probing `channels` in order
    ///
    /// Links still held from an earlier discovery are closed first. Channels
    /// that cannot be opened are skipped; links that do not identify as a
    /// projector are closed again.
    pub fn discover<O, I>(&mut self, opener: &mut O, delay: &D, channels: I)
    where
        O: PortOpener<Port = C>,
        D: Clone,
        I: IntoIterator<Item = ChannelId>,
    {
        for session in core::mem::take(&mut self.sessions) {
            opener.close(session.into_port());
        }
        self.active = None;
        self.max_tray_size = 0;

        for channel in channels {
            let mut port = match opener.open(channel) {
                Ok(port) => port,
                Err(_) => {
                    debug!("channel {} unavailable", channel);
                    continue;
                }
            };

            let identity = match identify(&mut port) {
                Ok(identity) => identity,
                Err(e) => {
                    warn!("channel {} is not an Ektapro projector: {:?}", channel, e.kind());
                    opener.close(port);
                    continue;
                }
            };
            info!("[{}] found {:?}", channel, identity);

            let session = DeviceSession::new(port, delay.clone(), channel, identity);
            let tray_size = session.tray_size();
            if let Err(session) = self.sessions.push(session) {
                warn!("registry full, dropping channel {}", channel);
                opener.close(session.into_port());
                break;
            }
            self.max_tray_size = self.max_tray_size.max(tray_size);
        }

        if !self.sessions.is_empty() {
            self.active = Some(0);
        }
        info!("{} projector(s) connected", self.sessions.len());
    }

    /// Change the active session
    ///
    /// `None` clears the selection. Returns true when `index` named a session.
    pub fn select_active(&mut self, index: Option<usize>) -> bool {
        match index {
            None => {
                self.active = None;
                false
            }
            Some(index) if index < self.sessions.len() => {
                self.active = Some(index);
                true
            }
            Some(_) => false,
        }
    }

    pub fn active_index(&self) -> Option<usize> {
        self.active
    }

    /// Session after the active one, wrapping around
    pub fn next_of(&self) -> Option<usize> {
        let count = self.sessions.len();
        self.active.map(|active| (active + 1) % count)
    }

    /// Session before the active one, wrapping around
    pub fn previous_of(&self) -> Option<usize> {
        let count = self.sessions.len();
        self.active.map(|active| (active + count - 1) % count)
    }

    pub fn activate_next(&mut self) -> Option<usize> {
        self.active = self.next_of();
        self.active
    }

    pub fn activate_previous(&mut self) -> Option<usize> {
        self.active = self.previous_of();
        self.active
    }

    pub fn active(&self) -> Option<&DeviceSession<C, D>> {
        self.active.and_then(|index| self.sessions.get(index))
    }

    pub fn active_mut(&mut self) -> Option<&mut DeviceSession<C, D>> {
        self.active.and_then(|index| self.sessions.get_mut(index))
    }

    pub fn get(&self, index: usize) -> Option<&DeviceSession<C, D>> {
        self.sessions.get(index)
    }

    pub fn get_mut(&mut self, index: usize) -> Option<&mut DeviceSession<C, D>> {
        self.sessions.get_mut(index)
    }

    /// Two distinct sessions at once
    pub fn pair_mut(
        &mut self,
        first: usize,
        second: usize,
    ) -> Option<(&mut DeviceSession<C, D>, &mut DeviceSession<C, D>)> {
        if first == second || first.max(second) >= self.sessions.len() {
            return None;
        }
        if first < second {
            let (low, high) = self.sessions.split_at_mut(second);
            Some((&mut low[first], &mut high[0]))
        } else {
            let (low, high) = self.sessions.split_at_mut(first);
            Some((&mut high[0], &mut low[second]))
        }
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &DeviceSession<C, D>> {
        self.sessions.iter()
    }

    /// Largest tray among connected projectors, 0 when none
    pub fn max_tray_size(&self) -> u16 {
        self.max_tray_size
    }

    /// Registry-wide standby state, flipped by [`Registry::toggle_standby`]
    ///
    /// Starts out true and survives rediscovery; [`Registry::reset_all`]
    /// clears it.
    pub fn standby(&self) -> bool {
        self.standby
    }

    /// Bring every projector to a dark, known position
    ///
    /// Each one leaves standby, moves to slide 1 and goes to brightness 0.
    pub fn reset_all(&mut self) -> Result<(), Error<PortError<C>>> {
        for session in self.sessions.iter_mut() {
            session.set_standby(false)?;
            session.goto_slide(1)?;
            session.set_brightness(0)?;
        }
        self.standby = false;
        Ok(())
    }

    /// Reset every projector and close its link
    ///
    /// A failing reset does not keep the link open. The registry is empty
    /// afterwards.
    pub fn shutdown<O>(&mut self, opener: &mut O)
    where
        O: PortOpener<Port = C>,
    {
        for mut session in core::mem::take(&mut self.sessions) {
            if let Err(e) = session.reset_system() {
                warn!("[{}] reset failed: {:?}", session.channel(), e.kind());
            }
            opener.close(session.into_port());
        }
        self.active = None;
        self.max_tray_size = 0;
    }

    /// Re-read every projector's tray position
    pub fn sync_all(&mut self) -> Result<(), Error<PortError<C>>> {
        for session in self.sessions.iter_mut() {
            session.sync()?;
        }
        Ok(())
    }

    /// Flip standby on every projector; returns the new state
    pub fn toggle_standby(&mut self) -> Result<bool, Error<PortError<C>>> {
        self.standby = !self.standby;
        for session in self.sessions.iter_mut() {
            session.set_standby(self.standby)?;
        }
        Ok(self.standby)
    }
}
