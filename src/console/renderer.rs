//! Videotex output parser for the console emulator
//!
//! Parses the byte stream sent to the terminal into drawing operations that
//! the console applies with crossterm.

use bitflags::bitflags;
use std::io::{self, Write};

use crossterm::{
    cursor::{Hide, MoveLeft, MoveTo, MoveToColumn, MoveToNextLine, Show},
    queue,
    style::{self, Attribute, Print, SetAttribute, SetBackgroundColor, SetForegroundColor},
    terminal::{Clear, ClearType},
};

use crate::protocol::{self, accents, Color};

bitflags! {
    /// Character attributes
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
    pub struct Attributes: u8 {
        const INVERSE   = 0b001;
        const UNDERLINE = 0b010;
        const FLASH     = 0b100;
    }
}

/// A drawing operation produced by the parser
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Draw {
    Clear,
    /// 1-indexed
    MoveTo { line: u8, column: u8 },
    Text(char),
    Foreground(Color),
    Background(Color),
    Attributes(Attributes),
    Cursor(bool),
    Bell,
    Backspace,
    LineFeed,
    CarriageReturn,
    ClearLine,
}

#[derive(Clone, Copy, Debug, Default, PartialEq)]
enum ParserState {
    #[default]
    Ground,
    Escape,
    /// Inside `ESC 0x3A ..`, bytes left to skip
    Scroll(u8),
    AddressLine,
    AddressColumn(u8),
    Accent,
    AccentBase(u8),
}

/// Parser state machine
#[derive(Debug, Default)]
pub struct Renderer {
    state: ParserState,
    attrs: Attributes,
}

impl Renderer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed a single byte to the parser
    pub fn feed(&mut self, byte: u8) -> Option<Draw> {
        match self.state {
            ParserState::Ground => self.ground(byte),
            ParserState::Escape => self.escape(byte),
            ParserState::Scroll(left) => {
                self.state = if left > 1 {
                    ParserState::Scroll(left - 1)
                } else {
                    ParserState::Ground
                };
                None
            }
            ParserState::AddressLine => {
                self.state = ParserState::AddressColumn(byte.wrapping_sub(protocol::ADDRESS_BASE));
                None
            }
            ParserState::AddressColumn(line) => {
                self.state = ParserState::Ground;
                Some(Draw::MoveTo {
                    line,
                    column: byte.wrapping_sub(protocol::ADDRESS_BASE),
                })
            }
            ParserState::Accent => {
                self.state = ParserState::AccentBase(byte);
                None
            }
            ParserState::AccentBase(diacritic) => {
                self.state = ParserState::Ground;
                Some(Draw::Text(accents::compose(diacritic, byte).unwrap_or(byte as char)))
            }
        }
    }

    /// Feed a chunk, collecting every drawing operation.
    pub fn feed_all(&mut self, bytes: &[u8]) -> Vec<Draw> {
        bytes.iter().filter_map(|&b| self.feed(b)).collect()
    }

    fn ground(&mut self, byte: u8) -> Option<Draw> {
        match byte {
            protocol::ESC => {
                self.state = ParserState::Escape;
                None
            }
            protocol::US => {
                self.state = ParserState::AddressLine;
                None
            }
            protocol::SS2 => {
                self.state = ParserState::Accent;
                None
            }
            protocol::FF => {
                self.attrs = Attributes::empty();
                Some(Draw::Clear)
            }
            protocol::RS => Some(Draw::MoveTo { line: 1, column: 1 }),
            protocol::BEL => Some(Draw::Bell),
            protocol::BS => Some(Draw::Backspace),
            protocol::LF => Some(Draw::LineFeed),
            protocol::CR => Some(Draw::CarriageReturn),
            protocol::CAN => Some(Draw::ClearLine),
            protocol::CURSOR_ON => Some(Draw::Cursor(true)),
            protocol::CURSOR_OFF => Some(Draw::Cursor(false)),
            0x20..=0x7E | 0xA0..=0xFF => Some(Draw::Text(byte as char)),
            _ => None,
        }
    }

    fn escape(&mut self, byte: u8) -> Option<Draw> {
        self.state = ParserState::Ground;
        match byte {
            0x3A => {
                // Scroll mode toggles are two more bytes; nothing to draw
                self.state = ParserState::Scroll(2);
                None
            }
            0x40..=0x47 => Color::from_index(byte - protocol::FG_BASE).map(Draw::Foreground),
            0x50..=0x57 => Color::from_index(byte - protocol::BG_BASE).map(Draw::Background),
            protocol::INVERSE_ON => self.set(Attributes::INVERSE, true),
            protocol::INVERSE_OFF => self.set(Attributes::INVERSE, false),
            protocol::UNDERLINE_ON => self.set(Attributes::UNDERLINE, true),
            protocol::UNDERLINE_OFF => self.set(Attributes::UNDERLINE, false),
            protocol::FLASH_ON => self.set(Attributes::FLASH, true),
            protocol::FLASH_OFF => self.set(Attributes::FLASH, false),
            _ => {
                tracing::debug!("Unknown escape: 0x{:02X}", byte);
                None
            }
        }
    }

    fn set(&mut self, attr: Attributes, on: bool) -> Option<Draw> {
        self.attrs.set(attr, on);
        Some(Draw::Attributes(self.attrs))
    }
}

fn host_color(color: Color) -> style::Color {
    match color {
        Color::Black => style::Color::Black,
        Color::Red => style::Color::Red,
        Color::Green => style::Color::Green,
        Color::Yellow => style::Color::Yellow,
        Color::Blue => style::Color::Blue,
        Color::Magenta => style::Color::Magenta,
        Color::Cyan => style::Color::Cyan,
        Color::White => style::Color::White,
    }
}

/// Apply one drawing operation to the host terminal
pub fn apply<W: Write>(out: &mut W, draw: &Draw) -> io::Result<()> {
    match draw {
        Draw::Clear => queue!(
            out,
            SetAttribute(Attribute::Reset),
            Clear(ClearType::All),
            MoveTo(0, 0)
        ),
        Draw::MoveTo { line, column } => queue!(
            out,
            MoveTo(
                u16::from(column.saturating_sub(1)),
                u16::from(line.saturating_sub(1))
            )
        ),
        Draw::Text(ch) => queue!(out, Print(*ch)),
        Draw::Foreground(color) => queue!(out, SetForegroundColor(host_color(*color))),
        Draw::Background(color) => queue!(out, SetBackgroundColor(host_color(*color))),
        Draw::Attributes(attrs) => {
            let reverse = if attrs.contains(Attributes::INVERSE) {
                Attribute::Reverse
            } else {
                Attribute::NoReverse
            };
            let underline = if attrs.contains(Attributes::UNDERLINE) {
                Attribute::Underlined
            } else {
                Attribute::NoUnderline
            };
            let blink = if attrs.contains(Attributes::FLASH) {
                Attribute::SlowBlink
            } else {
                Attribute::NoBlink
            };
            queue!(
                out,
                SetAttribute(reverse),
                SetAttribute(underline),
                SetAttribute(blink)
            )
        }
        Draw::Cursor(true) => queue!(out, Show),
        Draw::Cursor(false) => queue!(out, Hide),
        Draw::Bell => out.write_all(&[protocol::BEL]),
        Draw::Backspace => queue!(out, MoveLeft(1)),
        Draw::LineFeed => queue!(out, MoveToNextLine(1)),
        Draw::CarriageReturn => queue!(out, MoveToColumn(0)),
        Draw::ClearLine => queue!(out, Clear(ClearType::UntilNewLine)),
    }
}
