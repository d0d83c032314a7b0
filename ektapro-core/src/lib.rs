//! Board-agnostic controller logic for Kodak Ektapro projectors
//!
//! This crate contains everything between the byte-level protocol and the
//! host application:
//!
//! - Device sessions (one identified projector on one link)
//! - The registry of connected projectors and the active selection
//! - The fade engine for single-projector fades and multi-projector dissolves
//! - Timing configuration and the error type
//!
//! Links, delays and timers come in through the `ektapro-hal` traits and
//! `embedded_hal::delay::DelayNs`.

#![cfg_attr(not(test), no_std)]
#![deny(unsafe_code)]

// must come first so the logging macros are visible to the other modules
mod fmt;

pub mod config;
pub mod engine;
pub mod error;
pub mod registry;
pub mod session;

#[cfg(test)]
mod sim;

pub use config::{ConfigError, TimingConfig};
pub use engine::{Direction, FadeEngine, FadeState, Promotion, SlideAction};
pub use error::{Error, ErrorKind, PortError};
pub use registry::{Registry, MAX_DEVICES};
pub use session::{identify, DeviceSession, FULL_BRIGHTNESS};
