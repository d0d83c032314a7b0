//! Opening projector links by channel number
//!
//! Channels are a small fixed set of identifiers (the historical COM1..COM16
//! numbering). Discovery walks them in order; how a channel maps to a device
//! node is up to the implementation.

use crate::uart::Uart;

/// Channel identifier, `0..MAX_CHANNELS`
pub type ChannelId = u8;

/// Number of channels a discovery pass may probe
pub const MAX_CHANNELS: usize = 16;

/// Factory for projector links
pub trait PortOpener {
    /// Link produced by [`PortOpener::open`]
    type Port: Uart;

    /// Error type for open operations
    type Error;

    /// Open the link behind `channel`
    ///
    /// Failing here only means nothing usable is attached; callers treat it
    /// as "no device" rather than a fault.
    fn open(&mut self, channel: ChannelId) -> Result<Self::Port, Self::Error>;

    /// Release a link previously returned by [`PortOpener::open`]
    fn close(&mut self, port: Self::Port);
}
