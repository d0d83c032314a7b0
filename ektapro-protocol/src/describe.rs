//! Human-readable command text
//!
//! Every decoded [`Command`] renders as
//! `Projector <address> - <Mode> Mode - <description>`, which is what the
//! session logs for each write and what the host prints for a hex triplet.

use core::fmt;

use crate::command::{
    Body, Command, DirectAction, FadeDirection, Mode, Parameter, SetResetOption, StatusRequest,
    Switch, COMMAND_LEN,
};

/// Decode any three bytes for display
///
/// No framing check is applied; this accepts whatever was typed or sniffed.
pub fn describe(bytes: [u8; COMMAND_LEN]) -> Command {
    Command::decode(bytes)
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Mode::Parameter => "Parameter Mode",
            Mode::SetReset => "Set/Reset Mode",
            Mode::Direct => "Direct Mode",
            Mode::StatusRequest => "Status Request Mode",
        })
    }
}

impl fmt::Display for FadeDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            FadeDirection::Down => "Down",
            FadeDirection::Up => "Up",
            FadeDirection::Unknown(_) => "?",
        })
    }
}

impl fmt::Display for Parameter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Parameter::RandomAccess(slide) => write!(f, "Random Access - Slide {}", slide),
            Parameter::SetBrightness(value) => write!(f, "SetBrightness - {}", value),
            Parameter::GroupAddress(group) => write!(f, "Group Address - {}", group),
            Parameter::Fade { direction, time } => {
                write!(f, "Fade up/down - {} - {}", direction, time)
            }
            Parameter::LowerFadeLimit(value) => {
                write!(f, "SetLowerLimit for Fading - {}", value)
            }
            Parameter::UpperFadeLimit(value) => {
                write!(f, "SetUpperLimit for Fading - {}", value)
            }
            Parameter::Unknown(_) => f.write_str("Unknown parameter"),
        }
    }
}

impl fmt::Display for SetResetOption {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            SetResetOption::AutoFocus => "AutoFocus on/off",
            SetResetOption::Highlight => "Highlight on/off",
            SetResetOption::BlockFocus => "BlockFocus on/off",
            SetResetOption::AutoShutter => "AutoShutter on/off",
            SetResetOption::BlockKeys => "BlockKeys on/off",
            SetResetOption::Standby => "Standby on/off",
            SetResetOption::Unknown(_) => "Unknown command",
        })
    }
}

impl fmt::Display for Switch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Switch::On => "Set (on)",
            Switch::Off => "Reset (off)",
            Switch::Unknown(_) => "?",
        })
    }
}

impl fmt::Display for DirectAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            DirectAction::SlideForward => "Slide forward",
            DirectAction::SlideBackward => "Slide backward",
            DirectAction::FocusForward => "Focus forward",
            DirectAction::FocusBackward => "Focus backward",
            DirectAction::FocusStop => "Focus stop",
            DirectAction::ShutterOpen => "Shutter open",
            DirectAction::ShutterClose => "Shutter close",
            DirectAction::ResetSystem => "Reset system",
            DirectAction::SwitchLamp => "Switch lamp",
            DirectAction::ClearErrorFlags => "Clear error flags",
            DirectAction::StopFading => "Stop fading",
            DirectAction::UserMode => "Direct User Mode",
            DirectAction::Unknown(_) => "Unknown command",
        })
    }
}

impl fmt::Display for StatusRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            StatusRequest::TrayPosition => "GetTray position",
            StatusRequest::Keys => "GetKeys",
            StatusRequest::SystemStatus => "System status",
            StatusRequest::SystemReturn => "System return",
            StatusRequest::Unknown(_) => "Unknown request",
        })
    }
}

impl fmt::Display for Body {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Body::Parameter(parameter) => write!(f, "{}", parameter),
            Body::SetReset {
                option: option @ SetResetOption::Unknown(_),
                ..
            } => write!(f, "{}", option),
            Body::SetReset { option, switch } => write!(f, "{} - {}", option, switch),
            Body::Direct(action) => write!(f, "{}", action),
            Body::Status(request) => write!(f, "{}", request),
        }
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Projector {} - {} - {}", self.address, self.mode(), self.body)
    }
}
