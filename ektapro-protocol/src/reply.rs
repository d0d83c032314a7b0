//! Reply parsers
//!
//! Replies to status requests carry framing bits that are checked strictly;
//! unlike command decoding, a reply that fails a check is rejected.
//!
//! | request        | length | byte0 % 8 | byte1 / 16 | extra check   |
//! |----------------|--------|-----------|------------|---------------|
//! | System return  | 5      | 6         | 13         | byte1 even    |
//! | System status  | 3      | 6         | 12         | byte2 % 4 = 3 |
//! | Tray position  | 3      | 6         | 10         |               |

use core::fmt;

/// Length of the identification reply
pub const SYSTEM_RETURN_LEN: usize = 5;

/// Length of the status and tray position replies
pub const STATUS_REPLY_LEN: usize = 3;

const REPLY_FRAMING: u8 = 6;
const CODE_TRAY_POSITION: u8 = 10;
const CODE_SYSTEM_STATUS: u8 = 12;
const CODE_SYSTEM_RETURN: u8 = 13;

/// Reasons a reply is rejected
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ReplyError {
    /// byte0 does not carry the reply marker
    Framing,
    /// byte1 echoes a different request
    ReplyCode,
    /// Fixed low bits have the wrong value
    Padding,
}

impl fmt::Display for ReplyError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReplyError::Framing => f.write_str("reply framing mismatch"),
            ReplyError::ReplyCode => f.write_str("reply answers a different request"),
            ReplyError::Padding => f.write_str("reply padding bits invalid"),
        }
    }
}

fn check_header(b0: u8, b1: u8, code: u8) -> Result<(), ReplyError> {
    if b0 % 8 != REPLY_FRAMING {
        return Err(ReplyError::Framing);
    }
    if b1 / 16 != code {
        return Err(ReplyError::ReplyCode);
    }
    Ok(())
}

/// Mains frequency the projector is set up for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PowerFrequency {
    Hz50,
    Hz60,
}

/// Which of the two lamps is in use
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Lamp {
    L1,
    L2,
}

/// Tray capacity
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TraySize {
    Slots80,
    Slots140,
}

impl TraySize {
    /// Number of slots
    pub fn slots(self) -> u16 {
        match self {
            TraySize::Slots80 => 80,
            TraySize::Slots140 => 140,
        }
    }
}

/// Firmware version nibbles, shown as `major.minor_hi minor_lo` (e.g. `2.23`)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct FirmwareVersion {
    pub major: u8,
    pub minor_hi: u8,
    pub minor_lo: u8,
}

impl fmt::Display for FirmwareVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}{}", self.major, self.minor_hi, self.minor_lo)
    }
}

/// Identification block returned for a system return request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct SystemReturn {
    /// Projector address
    pub address: u8,
    /// Model code, see [`SystemReturn::model_name`]
    pub model: u8,
    pub version: FirmwareVersion,
    pub power_frequency: PowerFrequency,
    pub auto_focus: bool,
    pub auto_zero: bool,
    pub low_lamp: bool,
    pub tray_size: TraySize,
    pub active_lamp: Lamp,
    pub standby: bool,
    pub highlight: bool,
}

impl SystemReturn {
    /// Validate and decode a 5-byte identification reply
    pub fn parse(bytes: [u8; SYSTEM_RETURN_LEN]) -> Result<Self, ReplyError> {
        let [b0, b1, b2, b3, flags] = bytes;
        check_header(b0, b1, CODE_SYSTEM_RETURN)?;
        if b1 % 2 != 0 {
            return Err(ReplyError::Padding);
        }

        let bit = |mask: u8| flags & mask != 0;
        Ok(Self {
            address: b0 / 16,
            model: b2 / 16,
            version: FirmwareVersion {
                major: b2 % 16,
                minor_hi: b3 / 16,
                minor_lo: b3 % 16,
            },
            power_frequency: if bit(0x80) {
                PowerFrequency::Hz60
            } else {
                PowerFrequency::Hz50
            },
            auto_focus: bit(0x40),
            auto_zero: bit(0x20),
            low_lamp: bit(0x10),
            tray_size: if bit(0x08) {
                TraySize::Slots140
            } else {
                TraySize::Slots80
            },
            active_lamp: if bit(0x04) { Lamp::L2 } else { Lamp::L1 },
            standby: bit(0x02),
            highlight: bit(0x01),
        })
    }

    /// Marketing name for the model code
    pub fn model_name(&self) -> &'static str {
        match self.model {
            4 => "4020",
            5 => "5000",
            6 => "5020",
            7 => "4010 / 7000",
            8 => "7010 / 7020",
            9 => "9000",
            10 => "9010 / 9020",
            _ => "Unknown",
        }
    }

    /// Capability flags as a single line of text
    pub fn details(&self) -> Details<'_> {
        Details(self)
    }
}

impl fmt::Display for SystemReturn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Kodak Ektapro {} id={} Version {}",
            self.model_name(),
            self.address,
            self.version
        )
    }
}

/// Display adapter returned by [`SystemReturn::details`]
pub struct Details<'a>(&'a SystemReturn);

impl fmt::Display for Details<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let on_off = |on: bool| if on { "On" } else { "Off" };
        let id = self.0;
        write!(
            f,
            "Power frequency: {} Autofocus: {} Autozero: {} Low lamp mode: {} \
             Tray size: {} Active lamp: {} Standby: {} High light: {}",
            match id.power_frequency {
                PowerFrequency::Hz50 => "50Hz",
                PowerFrequency::Hz60 => "60Hz",
            },
            on_off(id.auto_focus),
            on_off(id.auto_zero),
            on_off(id.low_lamp),
            id.tray_size.slots(),
            match id.active_lamp {
                Lamp::L1 => "L1",
                Lamp::L2 => "L2",
            },
            on_off(id.standby),
            on_off(id.highlight),
        )
    }
}

/// Answer to a system status request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct SystemStatus {
    pub address: u8,
    pub lamp1: bool,
    pub lamp2: bool,
    /// Projector is executing a motion and will not accept another
    pub busy: bool,
    pub zero_position: bool,
    pub slide_lift_motor_error: bool,
    pub tray_transport_motor_error: bool,
    pub command_error: bool,
    pub overrun_error: bool,
    pub buffer_overflow_error: bool,
    pub framing_error: bool,
}

impl SystemStatus {
    pub fn parse(bytes: [u8; STATUS_REPLY_LEN]) -> Result<Self, ReplyError> {
        let [b0, b1, b2] = bytes;
        check_header(b0, b1, CODE_SYSTEM_STATUS)?;
        if b2 % 4 != 3 {
            return Err(ReplyError::Padding);
        }

        Ok(Self {
            address: b0 / 8,
            lamp1: b1 & 0x08 != 0,
            lamp2: b1 & 0x04 != 0,
            busy: b1 & 0x02 != 0,
            zero_position: b1 & 0x01 != 0,
            slide_lift_motor_error: b2 & 0x80 != 0,
            tray_transport_motor_error: b2 & 0x40 != 0,
            command_error: b2 & 0x20 != 0,
            overrun_error: b2 & 0x10 != 0,
            buffer_overflow_error: b2 & 0x08 != 0,
            framing_error: b2 & 0x04 != 0,
        })
    }

    /// Any of the error bits set
    pub fn has_error(&self) -> bool {
        self.slide_lift_motor_error
            || self.tray_transport_motor_error
            || self.command_error
            || self.overrun_error
            || self.buffer_overflow_error
            || self.framing_error
    }
}

/// Answer to a tray position request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct TrayPosition {
    pub address: u8,
    pub slide: u8,
}

impl TrayPosition {
    pub fn parse(bytes: [u8; STATUS_REPLY_LEN]) -> Result<Self, ReplyError> {
        let [b0, b1, b2] = bytes;
        check_header(b0, b1, CODE_TRAY_POSITION)?;
        Ok(Self {
            address: b0 / 8,
            slide: b2,
        })
    }
}
