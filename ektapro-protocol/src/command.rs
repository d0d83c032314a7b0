//! Command encoding and decoding
//!
//! A [`Command`] is an address plus a mode-specific [`Body`]. Commands are
//! built from a [`Projector`], which carries only the address and cannot be
//! encoded by itself:
//!
//! ```
//! use ektapro_protocol::Projector;
//!
//! let bytes = Projector::new(0).set_brightness(550).encode().unwrap();
//! assert_eq!(bytes, [0x01, 0x18, 0x4C]);
//! ```

/// Length of every command on the wire
pub const COMMAND_LEN: usize = 3;

/// Highest projector address
pub const MAX_ADDRESS: u8 = 15;

/// Highest value a numeric parameter can carry
///
/// The value's high part shares arg1's low nibble with the framing of the
/// parameter code, which leaves room for 10 bits.
pub const MAX_PARAMETER: u16 = 1023;

/// Highest fade time (parameter command 6)
pub const MAX_FADE_TIME: u8 = 127;

/// Highest group address
pub const MAX_GROUP: u8 = 127;

// Parameter mode codes
const PARAM_RANDOM_ACCESS: u8 = 0;
const PARAM_SET_BRIGHTNESS: u8 = 1;
const PARAM_GROUP_ADDRESS: u8 = 3;
const PARAM_FADE: u8 = 6;
const PARAM_LOWER_FADE_LIMIT: u8 = 7;
const PARAM_UPPER_FADE_LIMIT: u8 = 8;

/// Added to the fade time to select "fade up"
const FADE_UP_OFFSET: u16 = 128;

/// Bit 0 of byte0 is always set in a command
const COMMAND_MARKER: u8 = 1;

/// Errors that can occur while encoding a command
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum EncodeError {
    /// Address above [`MAX_ADDRESS`]
    InvalidAddress,
    /// Numeric argument does not fit its field
    ValueOutOfRange,
    /// Body holds a decoded sub-code that has no encoder
    NotEncodable,
}

impl core::fmt::Display for EncodeError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            EncodeError::InvalidAddress => f.write_str("projector address out of range"),
            EncodeError::ValueOutOfRange => f.write_str("command argument out of range"),
            EncodeError::NotEncodable => f.write_str("command is not encodable"),
        }
    }
}

/// Command mode (bits 1-2 of byte0)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Mode {
    Parameter,
    SetReset,
    Direct,
    StatusRequest,
}

impl Mode {
    /// Extract the mode from byte0
    pub fn from_byte0(byte0: u8) -> Self {
        match (byte0 % 8) / 2 {
            0 => Mode::Parameter,
            1 => Mode::SetReset,
            2 => Mode::Direct,
            _ => Mode::StatusRequest,
        }
    }

    /// Mode number as placed on the wire
    pub fn bits(self) -> u8 {
        match self {
            Mode::Parameter => 0,
            Mode::SetReset => 1,
            Mode::Direct => 2,
            Mode::StatusRequest => 3,
        }
    }
}

/// Direction of a timed fade (parameter command 6)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum FadeDirection {
    Down,
    Up,
    Unknown(u8),
}

/// Parameter mode commands
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Parameter {
    /// Move the tray to a slide
    RandomAccess(u16),
    /// Lamp brightness in 0.1% steps (0-1000)
    SetBrightness(u16),
    /// Assign a group address
    GroupAddress(u8),
    /// Timed fade performed by the projector itself
    Fade { direction: FadeDirection, time: u8 },
    /// Lower brightness limit for fades
    LowerFadeLimit(u16),
    /// Upper brightness limit for fades
    UpperFadeLimit(u16),
    /// Parameter code not in the table
    Unknown(u8),
}

/// Options toggled in set/reset mode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SetResetOption {
    AutoFocus,
    Highlight,
    BlockFocus,
    AutoShutter,
    BlockKeys,
    Standby,
    Unknown(u8),
}

impl SetResetOption {
    fn code(self) -> Option<u8> {
        match self {
            SetResetOption::AutoFocus => Some(0),
            SetResetOption::Highlight => Some(1),
            SetResetOption::BlockFocus => Some(2),
            SetResetOption::AutoShutter => Some(3),
            SetResetOption::BlockKeys => Some(5),
            SetResetOption::Standby => Some(7),
            SetResetOption::Unknown(_) => None,
        }
    }

    fn from_code(code: u8) -> Self {
        match code {
            0 => SetResetOption::AutoFocus,
            1 => SetResetOption::Highlight,
            2 => SetResetOption::BlockFocus,
            3 => SetResetOption::AutoShutter,
            5 => SetResetOption::BlockKeys,
            7 => SetResetOption::Standby,
            other => SetResetOption::Unknown(other),
        }
    }
}

/// Set/reset state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Switch {
    On,
    Off,
    Unknown(u8),
}

impl From<bool> for Switch {
    fn from(on: bool) -> Self {
        if on {
            Switch::On
        } else {
            Switch::Off
        }
    }
}

/// Direct mode actions
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DirectAction {
    SlideForward,
    SlideBackward,
    FocusForward,
    FocusBackward,
    FocusStop,
    ShutterOpen,
    ShutterClose,
    ResetSystem,
    SwitchLamp,
    ClearErrorFlags,
    StopFading,
    /// arg1 bit 7 set; only seen in traffic from the projector keypad
    UserMode,
    Unknown(u8),
}

impl DirectAction {
    fn code(self) -> Option<u8> {
        match self {
            DirectAction::SlideForward => Some(0),
            DirectAction::SlideBackward => Some(1),
            DirectAction::FocusForward => Some(2),
            DirectAction::FocusBackward => Some(3),
            DirectAction::FocusStop => Some(4),
            DirectAction::ShutterOpen => Some(7),
            DirectAction::ShutterClose => Some(8),
            DirectAction::ResetSystem => Some(11),
            DirectAction::SwitchLamp => Some(12),
            DirectAction::ClearErrorFlags => Some(13),
            DirectAction::StopFading => Some(15),
            DirectAction::UserMode | DirectAction::Unknown(_) => None,
        }
    }

    fn from_arg1(arg1: u8) -> Self {
        if arg1 / 128 == 1 {
            return DirectAction::UserMode;
        }
        match arg1 / 4 {
            0 => DirectAction::SlideForward,
            1 => DirectAction::SlideBackward,
            2 => DirectAction::FocusForward,
            3 => DirectAction::FocusBackward,
            4 => DirectAction::FocusStop,
            7 => DirectAction::ShutterOpen,
            8 => DirectAction::ShutterClose,
            11 => DirectAction::ResetSystem,
            12 => DirectAction::SwitchLamp,
            13 => DirectAction::ClearErrorFlags,
            15 => DirectAction::StopFading,
            other => DirectAction::Unknown(other),
        }
    }
}

/// Status request queries
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum StatusRequest {
    TrayPosition,
    Keys,
    SystemStatus,
    /// Identification block (5-byte reply)
    SystemReturn,
    Unknown(u8),
}

impl StatusRequest {
    /// Query code, also echoed in the high nibble of the reply's byte1
    pub fn code(self) -> Option<u8> {
        match self {
            StatusRequest::TrayPosition => Some(10),
            StatusRequest::Keys => Some(11),
            StatusRequest::SystemStatus => Some(12),
            StatusRequest::SystemReturn => Some(13),
            StatusRequest::Unknown(_) => None,
        }
    }

    fn from_code(code: u8) -> Self {
        match code {
            10 => StatusRequest::TrayPosition,
            11 => StatusRequest::Keys,
            12 => StatusRequest::SystemStatus,
            13 => StatusRequest::SystemReturn,
            other => StatusRequest::Unknown(other),
        }
    }
}

/// Mode-specific part of a command
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Body {
    Parameter(Parameter),
    SetReset {
        option: SetResetOption,
        switch: Switch,
    },
    Direct(DirectAction),
    Status(StatusRequest),
}

impl Body {
    /// Wire mode of this body
    pub fn mode(&self) -> Mode {
        match self {
            Body::Parameter(_) => Mode::Parameter,
            Body::SetReset { .. } => Mode::SetReset,
            Body::Direct(_) => Mode::Direct,
            Body::Status(_) => Mode::StatusRequest,
        }
    }
}

/// A command split into its wire fields, without interpretation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct RawCommand {
    /// Projector address (byte0 / 8)
    pub address: u8,
    /// Command mode
    pub mode: Mode,
    /// First argument byte
    pub arg1: u8,
    /// Second argument byte
    pub arg2: u8,
}

impl RawCommand {
    /// Split three bytes into fields. Never fails.
    pub fn from_bytes(bytes: [u8; COMMAND_LEN]) -> Self {
        Self {
            address: bytes[0] / 8,
            mode: Mode::from_byte0(bytes[0]),
            arg1: bytes[1],
            arg2: bytes[2],
        }
    }

    /// Assemble the wire bytes
    pub fn to_bytes(&self) -> Result<[u8; COMMAND_LEN], EncodeError> {
        if self.address > MAX_ADDRESS {
            return Err(EncodeError::InvalidAddress);
        }
        Ok([
            self.address * 8 + self.mode.bits() * 2 + COMMAND_MARKER,
            self.arg1,
            self.arg2,
        ])
    }

    /// Interpret the arguments according to the mode
    pub fn decode(&self) -> Command {
        let (arg1, arg2) = (self.arg1, self.arg2);
        let body = match self.mode {
            Mode::Parameter => Body::Parameter(decode_parameter(arg1, arg2)),
            Mode::SetReset => Body::SetReset {
                option: SetResetOption::from_code(arg1 / 4),
                switch: match arg1 % 4 {
                    0 => Switch::Off,
                    2 => Switch::On,
                    other => Switch::Unknown(other),
                },
            },
            Mode::Direct => Body::Direct(DirectAction::from_arg1(arg1)),
            Mode::StatusRequest => Body::Status(StatusRequest::from_code(arg1 / 16)),
        };
        Command {
            address: self.address,
            body,
        }
    }
}

fn decode_parameter(arg1: u8, arg2: u8) -> Parameter {
    let value = (arg1 % 16) as u16 * 64 + (arg2 / 2) as u16;
    match arg1 / 16 {
        PARAM_RANDOM_ACCESS => Parameter::RandomAccess(value),
        PARAM_SET_BRIGHTNESS => Parameter::SetBrightness(value),
        PARAM_GROUP_ADDRESS => Parameter::GroupAddress(arg2 / 2),
        PARAM_FADE => Parameter::Fade {
            direction: match (arg1 % 16) / 2 {
                0 => FadeDirection::Down,
                1 => FadeDirection::Up,
                other => FadeDirection::Unknown(other),
            },
            time: arg2 / 2,
        },
        PARAM_LOWER_FADE_LIMIT => Parameter::LowerFadeLimit(value),
        PARAM_UPPER_FADE_LIMIT => Parameter::UpperFadeLimit(value),
        other => Parameter::Unknown(other),
    }
}

/// Pack a parameter value into (arg1, arg2)
fn pack_parameter(code: u8, value: u16) -> Result<(u8, u8), EncodeError> {
    if value > MAX_PARAMETER {
        return Err(EncodeError::ValueOutOfRange);
    }
    let arg1 = code * 16 + (value / 128) as u8 * 2;
    let arg2 = (value % 128) as u8 * 2;
    Ok((arg1, arg2))
}

fn encode_parameter(parameter: Parameter) -> Result<(u8, u8), EncodeError> {
    match parameter {
        Parameter::RandomAccess(slide) => pack_parameter(PARAM_RANDOM_ACCESS, slide),
        Parameter::SetBrightness(value) => pack_parameter(PARAM_SET_BRIGHTNESS, value),
        Parameter::GroupAddress(group) => {
            if group > MAX_GROUP {
                return Err(EncodeError::ValueOutOfRange);
            }
            pack_parameter(PARAM_GROUP_ADDRESS, group as u16)
        }
        Parameter::Fade { direction, time } => {
            if time > MAX_FADE_TIME {
                return Err(EncodeError::ValueOutOfRange);
            }
            let value = match direction {
                FadeDirection::Down => time as u16,
                FadeDirection::Up => time as u16 + FADE_UP_OFFSET,
                FadeDirection::Unknown(_) => return Err(EncodeError::NotEncodable),
            };
            pack_parameter(PARAM_FADE, value)
        }
        Parameter::LowerFadeLimit(value) => pack_parameter(PARAM_LOWER_FADE_LIMIT, value),
        Parameter::UpperFadeLimit(value) => pack_parameter(PARAM_UPPER_FADE_LIMIT, value),
        Parameter::Unknown(_) => Err(EncodeError::NotEncodable),
    }
}

/// An addressed instruction for one projector
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Command {
    /// Projector address (0-15 for encodable commands)
    pub address: u8,
    /// What the command does
    pub body: Body,
}

impl Command {
    /// Decode three bytes. Total over all inputs.
    pub fn decode(bytes: [u8; COMMAND_LEN]) -> Self {
        RawCommand::from_bytes(bytes).decode()
    }

    /// Wire mode
    pub fn mode(&self) -> Mode {
        self.body.mode()
    }

    /// Compute the wire fields
    pub fn to_raw(&self) -> Result<RawCommand, EncodeError> {
        let (arg1, arg2) = match self.body {
            Body::Parameter(parameter) => encode_parameter(parameter)?,
            Body::SetReset { option, switch } => {
                let code = option.code().ok_or(EncodeError::NotEncodable)?;
                let on = match switch {
                    Switch::On => 2,
                    Switch::Off => 0,
                    Switch::Unknown(_) => return Err(EncodeError::NotEncodable),
                };
                (code * 4 + on, 0)
            }
            Body::Direct(action) => (action.code().ok_or(EncodeError::NotEncodable)? * 4, 0),
            Body::Status(request) => (request.code().ok_or(EncodeError::NotEncodable)? * 16, 0),
        };
        Ok(RawCommand {
            address: self.address,
            mode: self.mode(),
            arg1,
            arg2,
        })
    }

    /// Encode to the 3 wire bytes
    pub fn encode(&self) -> Result<[u8; COMMAND_LEN], EncodeError> {
        self.to_raw()?.to_bytes()
    }
}

/// Address-only command builder
///
/// Holds the target projector; every method yields a complete [`Command`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Projector(u8);

impl Projector {
    /// Target projector `address` (validated when encoding)
    pub const fn new(address: u8) -> Self {
        Self(address)
    }

    /// Address this builder targets
    pub fn address(self) -> u8 {
        self.0
    }

    fn with(self, body: Body) -> Command {
        Command {
            address: self.0,
            body,
        }
    }

    fn parameter(self, parameter: Parameter) -> Command {
        self.with(Body::Parameter(parameter))
    }

    fn set_reset(self, option: SetResetOption, on: bool) -> Command {
        self.with(Body::SetReset {
            option,
            switch: Switch::from(on),
        })
    }

    fn direct(self, action: DirectAction) -> Command {
        self.with(Body::Direct(action))
    }

    fn status(self, request: StatusRequest) -> Command {
        self.with(Body::Status(request))
    }

    // Parameter mode

    pub fn random_access(self, slide: u16) -> Command {
        self.parameter(Parameter::RandomAccess(slide))
    }

    /// Brightness in device units (0-1000, 0.1% steps)
    pub fn set_brightness(self, value: u16) -> Command {
        self.parameter(Parameter::SetBrightness(value))
    }

    pub fn group_address(self, group: u8) -> Command {
        self.parameter(Parameter::GroupAddress(group))
    }

    pub fn fade_up(self, time: u8) -> Command {
        self.parameter(Parameter::Fade {
            direction: FadeDirection::Up,
            time,
        })
    }

    pub fn fade_down(self, time: u8) -> Command {
        self.parameter(Parameter::Fade {
            direction: FadeDirection::Down,
            time,
        })
    }

    pub fn lower_fade_limit(self, value: u16) -> Command {
        self.parameter(Parameter::LowerFadeLimit(value))
    }

    pub fn upper_fade_limit(self, value: u16) -> Command {
        self.parameter(Parameter::UpperFadeLimit(value))
    }

    // Set/reset mode

    pub fn auto_focus(self, on: bool) -> Command {
        self.set_reset(SetResetOption::AutoFocus, on)
    }

    pub fn highlight(self, on: bool) -> Command {
        self.set_reset(SetResetOption::Highlight, on)
    }

    pub fn block_focus(self, on: bool) -> Command {
        self.set_reset(SetResetOption::BlockFocus, on)
    }

    pub fn auto_shutter(self, on: bool) -> Command {
        self.set_reset(SetResetOption::AutoShutter, on)
    }

    pub fn block_keys(self, on: bool) -> Command {
        self.set_reset(SetResetOption::BlockKeys, on)
    }

    pub fn standby(self, on: bool) -> Command {
        self.set_reset(SetResetOption::Standby, on)
    }

    // Direct mode

    pub fn slide_forward(self) -> Command {
        self.direct(DirectAction::SlideForward)
    }

    pub fn slide_backward(self) -> Command {
        self.direct(DirectAction::SlideBackward)
    }

    pub fn focus_forward(self) -> Command {
        self.direct(DirectAction::FocusForward)
    }

    pub fn focus_backward(self) -> Command {
        self.direct(DirectAction::FocusBackward)
    }

    pub fn focus_stop(self) -> Command {
        self.direct(DirectAction::FocusStop)
    }

    pub fn shutter_open(self) -> Command {
        self.direct(DirectAction::ShutterOpen)
    }

    pub fn shutter_close(self) -> Command {
        self.direct(DirectAction::ShutterClose)
    }

    pub fn reset_system(self) -> Command {
        self.direct(DirectAction::ResetSystem)
    }

    pub fn switch_lamp(self) -> Command {
        self.direct(DirectAction::SwitchLamp)
    }

    pub fn clear_error_flags(self) -> Command {
        self.direct(DirectAction::ClearErrorFlags)
    }

    pub fn stop_fading(self) -> Command {
        self.direct(DirectAction::StopFading)
    }

    // Status request mode

    pub fn get_tray_position(self) -> Command {
        self.status(StatusRequest::TrayPosition)
    }

    pub fn get_keys(self) -> Command {
        self.status(StatusRequest::Keys)
    }

    pub fn system_status(self) -> Command {
        self.status(StatusRequest::SystemStatus)
    }

    pub fn system_return(self) -> Command {
        self.status(StatusRequest::SystemReturn)
    }
}
