//! Hex triplet input, as typed by an operator (`"03 1C 00"`)

use core::fmt;

use crate::command::COMMAND_LEN;

/// Reasons a hex triplet is rejected
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum HexError {
    /// Not exactly six hex digits once spaces are removed
    Length,
    /// A character outside `0-9a-fA-F`
    Digit,
}

impl fmt::Display for HexError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HexError::Length => f.write_str("expected exactly 3 bytes (6 hex digits)"),
            HexError::Digit => f.write_str("invalid hex digit"),
        }
    }
}

fn nibble(c: u8) -> Result<u8, HexError> {
    match c {
        b'0'..=b'9' => Ok(c - b'0'),
        b'a'..=b'f' => Ok(c - b'a' + 10),
        b'A'..=b'F' => Ok(c - b'A' + 10),
        _ => Err(HexError::Digit),
    }
}

/// Parse three bytes written as hex, ignoring spaces
pub fn parse_hex_triplet(input: &str) -> Result<[u8; COMMAND_LEN], HexError> {
    let mut digits = [0u8; COMMAND_LEN * 2];
    let mut count = 0;

    for c in input.bytes().filter(|&c| c != b' ') {
        if count == digits.len() {
            return Err(HexError::Length);
        }
        digits[count] = c;
        count += 1;
    }
    if count != digits.len() {
        return Err(HexError::Length);
    }

    let mut bytes = [0u8; COMMAND_LEN];
    for (byte, pair) in bytes.iter_mut().zip(digits.chunks_exact(2)) {
        *byte = (nibble(pair[0])? << 4) | nibble(pair[1])?;
    }
    Ok(bytes)
}
