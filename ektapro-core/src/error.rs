//! Controller error type

use core::fmt;

use ektapro_hal::UartTx;
use ektapro_protocol::{EncodeError, ReplyError};

use crate::config::ConfigError;

/// Transport error of a link type
pub type PortError<C> = <C as UartTx>::Error;

/// Everything that can go wrong while talking to projectors
///
/// `E` is the link's transport error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Error<E> {
    /// The identification reply did not come from a projector
    InvalidDevice,
    /// A status reply failed its framing checks
    Protocol(ReplyError),
    /// The link failed to read or write
    Transport(E),
    /// A timing value was rejected
    Configuration(ConfigError),
    /// A command could not be encoded
    Encode(EncodeError),
    /// The projector stayed busy for every poll of the handshake
    BusyTimeout,
}

/// Payload-free classification of an [`Error`], used for logging
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ErrorKind {
    InvalidDevice,
    Protocol(ReplyError),
    Transport,
    Configuration(ConfigError),
    Encode(EncodeError),
    BusyTimeout,
}

impl<E> Error<E> {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::InvalidDevice => ErrorKind::InvalidDevice,
            Error::Protocol(e) => ErrorKind::Protocol(*e),
            Error::Transport(_) => ErrorKind::Transport,
            Error::Configuration(e) => ErrorKind::Configuration(*e),
            Error::Encode(e) => ErrorKind::Encode(*e),
            Error::BusyTimeout => ErrorKind::BusyTimeout,
        }
    }
}

impl<E> From<ReplyError> for Error<E> {
    fn from(e: ReplyError) -> Self {
        Error::Protocol(e)
    }
}

impl<E> From<EncodeError> for Error<E> {
    fn from(e: EncodeError) -> Self {
        Error::Encode(e)
    }
}

impl<E> From<ConfigError> for Error<E> {
    fn from(e: ConfigError) -> Self {
        Error::Configuration(e)
    }
}

impl<E: fmt::Debug> fmt::Display for Error<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::InvalidDevice => f.write_str("no Ektapro projector answered"),
            Error::Protocol(e) => write!(f, "protocol error: {}", e),
            Error::Transport(e) => write!(f, "transport error: {:?}", e),
            Error::Configuration(e) => write!(f, "configuration error: {}", e),
            Error::Encode(e) => write!(f, "encode error: {}", e),
            Error::BusyTimeout => f.write_str("projector stayed busy"),
        }
    }
}
