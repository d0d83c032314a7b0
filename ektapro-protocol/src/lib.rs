//! Kodak Ektapro P-Com protocol
//!
//! Projectors in the Ektapro family are driven over RS-232 with fixed
//! 3-byte commands. Status requests are answered with 3-byte replies, except
//! the identification request ("system return"), which is answered with 5.
//!
//! # Command layout
//!
//! ```text
//! ┌──────────────────────────┬────────┬────────┐
//! │ byte0                    │ byte1  │ byte2  │
//! │ addr*8 + mode*2 + 1      │ arg1   │ arg2   │
//! └──────────────────────────┴────────┴────────┘
//! ```
//!
//! | mode | name           | arg1                          | arg2          |
//! |------|----------------|-------------------------------|---------------|
//! | 0    | Parameter      | `cmd*16 + (v/128)*2`          | `(v%128)*2`   |
//! | 1    | Set/Reset      | `option*4 + (2 if on)`        | 0             |
//! | 2    | Direct         | `action*4`                    | 0             |
//! | 3    | Status request | `query*16`                    | 0             |
//!
//! Decoding is total: any three bytes decode to a [`Command`], with
//! `Unknown` variants where a sub-code is not in the tables. Only commands
//! built from known variants encode.

#![cfg_attr(not(test), no_std)]
#![deny(unsafe_code)]

pub mod command;
pub mod describe;
pub mod hex;
pub mod reply;

pub use command::{
    Body, Command, DirectAction, EncodeError, FadeDirection, Mode, Parameter, Projector,
    RawCommand, SetResetOption, StatusRequest, Switch, COMMAND_LEN, MAX_ADDRESS,
    MAX_FADE_TIME, MAX_GROUP, MAX_PARAMETER,
};
pub use describe::describe;
pub use hex::{parse_hex_triplet, HexError};
pub use reply::{
    Details, FirmwareVersion, Lamp, PowerFrequency, ReplyError, SystemReturn, SystemStatus,
    TrayPosition, TraySize, STATUS_REPLY_LEN, SYSTEM_RETURN_LEN,
};
