//! Slideshow timing configuration

use core::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Longest accepted fade, in seconds (exclusive)
pub const FADE_LIMIT_S: u8 = 60;

/// Accepted interval range, in seconds (`MIN..LIMIT`)
pub const INTERVAL_MIN_S: u8 = 1;
pub const INTERVAL_LIMIT_S: u8 = 60;

/// Rejected timing values
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ConfigError {
    /// Fade must be `0..60` seconds
    FadeOutOfRange,
    /// Interval must be `1..60` seconds
    IntervalOutOfRange,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::FadeOutOfRange => f.write_str("fade must be 0-59 seconds"),
            ConfigError::IntervalOutOfRange => f.write_str("interval must be 1-59 seconds"),
        }
    }
}

/// Dissolve timing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct TimingConfig {
    /// Fade duration in seconds; 0 switches instantly
    pub fade_s: u8,
    /// Time a slide stays up during a slideshow, in seconds
    pub interval_s: u8,
    /// Dissolve between neighbouring projectors instead of fading one
    pub cycle: bool,
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            fade_s: 1,
            interval_s: 5,
            cycle: false,
        }
    }
}

impl TimingConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        validate_fade(self.fade_s)?;
        validate_interval(self.interval_s)
    }
}

pub fn validate_fade(fade_s: u8) -> Result<(), ConfigError> {
    if fade_s < FADE_LIMIT_S {
        Ok(())
    } else {
        Err(ConfigError::FadeOutOfRange)
    }
}

pub fn validate_interval(interval_s: u8) -> Result<(), ConfigError> {
    if (INTERVAL_MIN_S..INTERVAL_LIMIT_S).contains(&interval_s) {
        Ok(())
    } else {
        Err(ConfigError::IntervalOutOfRange)
    }
}
