//! Videotex protocol definitions.
//!
//! This module holds everything that is bit-exact about the link:
//!
//! - **constants**: control bytes and escape codes
//! - **accents**: transliteration of the accented Latin-1 subset
//! - **encoder**: screen directives to outgoing bytes
//!
//! # Byte layout
//!
//! ```text
//! 0x1F  0x40+line  0x40+col      cursor address (home is 0x1E)
//! 0x1B  0x40+color               foreground color
//! 0x1B  0x50+color               background color
//! 0x13  selector                 function key (input side)
//! 0x19  diacritic  letter        accented letter
//! ```

pub mod accents;
pub mod encoder;

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

pub use encoder::Encoder;

// Control bytes
pub const BEL: u8 = 0x07;
pub const BS: u8 = 0x08;
pub const LF: u8 = 0x0A;
pub const FF: u8 = 0x0C;
pub const CR: u8 = 0x0D;
pub const CURSOR_ON: u8 = 0x11;
pub const SEP: u8 = 0x13;
pub const CURSOR_OFF: u8 = 0x14;
pub const CAN: u8 = 0x18;
pub const SS2: u8 = 0x19;
pub const ESC: u8 = 0x1B;
pub const RS: u8 = 0x1E;
pub const US: u8 = 0x1F;

// Escape codes (second byte after ESC)
pub const FG_BASE: u8 = 0x40;
pub const BG_BASE: u8 = 0x50;
pub const FLASH_ON: u8 = 0x48;
pub const FLASH_OFF: u8 = 0x49;
pub const UNDERLINE_ON: u8 = 0x5A;
pub const UNDERLINE_OFF: u8 = 0x59;
pub const INVERSE_ON: u8 = 0x5D;
pub const INVERSE_OFF: u8 = 0x5C;
pub const SCROLL_ON: [u8; 3] = [0x3A, 0x6A, 0x43];
pub const SCROLL_OFF: [u8; 3] = [0x3A, 0x6B, 0x43];

/// Offset added to 1-indexed line and column in a cursor address.
pub const ADDRESS_BASE: u8 = 0x40;

/// One of the eight terminal colors.
///
/// The discriminant is the color index sent on the wire.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Color {
    Black = 0,
    Red = 1,
    Green = 2,
    Yellow = 3,
    Blue = 4,
    Magenta = 5,
    Cyan = 6,
    #[default]
    White = 7,
}

impl Color {
    pub const ALL: [Color; 8] = [
        Color::Black,
        Color::Red,
        Color::Green,
        Color::Yellow,
        Color::Blue,
        Color::Magenta,
        Color::Cyan,
        Color::White,
    ];

    /// Wire index, 0..=7
    pub fn index(self) -> u8 {
        self as u8
    }

    pub fn from_index(index: u8) -> Option<Self> {
        Self::ALL.get(index as usize).copied()
    }

    pub fn name(self) -> &'static str {
        match self {
            Color::Black => "black",
            Color::Red => "red",
            Color::Green => "green",
            Color::Yellow => "yellow",
            Color::Blue => "blue",
            Color::Magenta => "magenta",
            Color::Cyan => "cyan",
            Color::White => "white",
        }
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Color {
    type Err = String;

    /// Accepts English and French color names.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "black" | "noir" => Ok(Color::Black),
            "red" | "rouge" => Ok(Color::Red),
            "green" | "vert" => Ok(Color::Green),
            "yellow" | "jaune" => Ok(Color::Yellow),
            "blue" | "bleu" => Ok(Color::Blue),
            "magenta" => Ok(Color::Magenta),
            "cyan" => Ok(Color::Cyan),
            "white" | "blanc" => Ok(Color::White),
            other => Err(format!("Unknown color: {}", other)),
        }
    }
}

impl TryFrom<String> for Color {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Color> for String {
    fn from(color: Color) -> Self {
        color.name().to_string()
    }
}

/// A keyboard function key, identified by the byte following `0x13`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FunctionKey {
    Envoi,
    Annulation,
    Retour,
    Sommaire,
    Suite,
    Guide,
    RetourNav,
    Repetition,
    Unrecognized(u8),
}

impl FunctionKey {
    /// Classify the selector byte of a completed `0x13 <selector>` sequence.
    pub fn classify(selector: u8) -> Self {
        match selector {
            0x41 => FunctionKey::Envoi,
            0x45 => FunctionKey::Annulation,
            0x47 => FunctionKey::Retour,
            b'F' => FunctionKey::Sommaire,
            b'H' => FunctionKey::Suite,
            b'D' => FunctionKey::Guide,
            b'B' => FunctionKey::RetourNav,
            b'C' => FunctionKey::Repetition,
            other => FunctionKey::Unrecognized(other),
        }
    }

    /// Selector byte sent after `0x13`
    pub fn selector(self) -> u8 {
        match self {
            FunctionKey::Envoi => 0x41,
            FunctionKey::Annulation => 0x45,
            FunctionKey::Retour => 0x47,
            FunctionKey::Sommaire => b'F',
            FunctionKey::Suite => b'H',
            FunctionKey::Guide => b'D',
            FunctionKey::RetourNav => b'B',
            FunctionKey::Repetition => b'C',
            FunctionKey::Unrecognized(b) => b,
        }
    }

    /// Full two-byte sequence for this key.
    pub fn sequence(self) -> [u8; 2] {
        [SEP, self.selector()]
    }
}

impl fmt::Display for FunctionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FunctionKey::Envoi => f.write_str("ENVOI"),
            FunctionKey::Annulation => f.write_str("ANNULATION"),
            FunctionKey::Retour => f.write_str("RETOUR"),
            FunctionKey::Sommaire => f.write_str("SOMMAIRE"),
            FunctionKey::Suite => f.write_str("SUITE"),
            FunctionKey::Guide => f.write_str("GUIDE"),
            FunctionKey::RetourNav => f.write_str("RETOUR-NAV"),
            FunctionKey::Repetition => f.write_str("REPETITION"),
            FunctionKey::Unrecognized(b) => write!(f, "UNKNOWN(0x{:02X})", b),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_known_keys() {
        assert_eq!(FunctionKey::classify(0x41), FunctionKey::Envoi);
        assert_eq!(FunctionKey::classify(0x45), FunctionKey::Annulation);
        assert_eq!(FunctionKey::classify(0x47), FunctionKey::Retour);
        assert_eq!(FunctionKey::classify(b'F'), FunctionKey::Sommaire);
        assert_eq!(FunctionKey::classify(b'H'), FunctionKey::Suite);
        assert_eq!(FunctionKey::classify(b'D'), FunctionKey::Guide);
        assert_eq!(FunctionKey::classify(b'B'), FunctionKey::RetourNav);
        assert_eq!(FunctionKey::classify(b'C'), FunctionKey::Repetition);
    }

    #[test]
    fn test_classify_unknown() {
        assert_eq!(FunctionKey::classify(0x49), FunctionKey::Unrecognized(0x49));
        assert_eq!(FunctionKey::Unrecognized(0x49).sequence(), [0x13, 0x49]);
    }

    #[test]
    fn test_selector_matches_classify() {
        for sel in 0u8..=0x7F {
            assert_eq!(FunctionKey::classify(sel).selector(), sel);
        }
    }

    #[test]
    fn test_color_names() {
        assert_eq!("vert".parse::<Color>(), Ok(Color::Green));
        assert_eq!("Blue".parse::<Color>(), Ok(Color::Blue));
        assert!("mauve".parse::<Color>().is_err());
        assert_eq!(Color::from_index(7), Some(Color::White));
        assert_eq!(Color::from_index(8), None);
    }

    #[test]
    fn test_default_color_is_white() {
        assert_eq!(Color::default(), Color::White);
    }
}
