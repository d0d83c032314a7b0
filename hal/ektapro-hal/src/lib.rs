//! Ektapro Hardware Abstraction Layer
//!
//! This crate defines the traits the controller core needs from its
//! environment. The core never opens a device file or sleeps on a timer by
//! itself; it is handed implementations of these traits instead, which keeps
//! it `no_std` and lets the tests drive it with simulated projectors.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │  ektapro-core (session, registry, fade) │
//! └─────────────────────────────────────────┘
//!                     │
//!                     ▼
//! ┌─────────────────────────────────────────┐
//! │  ektapro-hal (this crate - traits)      │
//! └─────────────────────────────────────────┘
//!                     │
//!         ┌───────────┴───────────┐
//!         ▼                       ▼
//! ┌───────────────┐       ┌───────────────┐
//! │ ektapro-host  │       │   simulated   │
//! │  (serialport) │       │   projector   │
//! └───────────────┘       └───────────────┘
//! ```
//!
//! # Traits
//!
//! - [`uart::UartTx`], [`uart::UartRx`] - P-Com serial link to one projector
//! - [`port::PortOpener`] - Opening and closing links by channel number
//! - [`timer::TimerHost`] - "Call me again in N milliseconds"

#![no_std]
#![deny(unsafe_code)]

pub mod port;
pub mod timer;
pub mod uart;

// Re-export key traits at crate root for convenience
pub use port::{ChannelId, PortOpener, MAX_CHANNELS};
pub use timer::TimerHost;
pub use uart::{Uart, UartConfig, UartRx, UartTx};
