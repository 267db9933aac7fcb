//! Key mapping for the console emulator
//!
//! Converts host keyboard events to the bytes a Minitel keyboard would send.
//!
//! | Host key | Minitel |
//! |----------|---------|
//! | Enter | CR |
//! | F10 | Envoi |
//! | Esc | Annulation |
//! | Backspace | Retour |
//! | F1 | Sommaire |
//! | F2 | Guide |
//! | F3 | Repetition |
//! | F4 | Retour (navigation) |
//! | F5 | Suite |

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use crate::protocol::{FunctionKey, CR};

/// Key mapper for converting key events to Minitel bytes
pub struct KeyMapper;

impl KeyMapper {
    /// Map a crossterm KeyEvent to the bytes sent by the terminal
    pub fn map(event: &KeyEvent) -> Option<Vec<u8>> {
        if event.modifiers.contains(KeyModifiers::CONTROL) {
            return None;
        }

        match event.code {
            KeyCode::Char(ch) => Self::map_char(ch),
            KeyCode::Enter => Some(vec![CR]),
            KeyCode::Backspace => Some(Self::function(FunctionKey::Retour)),
            KeyCode::Esc => Some(Self::function(FunctionKey::Annulation)),
            KeyCode::F(n) => Self::function_key(n),
            _ => None,
        }
    }

    /// Ctrl+C ends the emulator session
    pub fn is_quit(event: &KeyEvent) -> bool {
        event.modifiers.contains(KeyModifiers::CONTROL)
            && matches!(event.code, KeyCode::Char('c') | KeyCode::Char('C'))
    }

    /// Printable Latin-1 characters go out as a single byte
    fn map_char(ch: char) -> Option<Vec<u8>> {
        let code = ch as u32;
        if (0x20..=0xFF).contains(&code) {
            Some(vec![code as u8])
        } else {
            None
        }
    }

    fn function_key(n: u8) -> Option<Vec<u8>> {
        let key = match n {
            1 => FunctionKey::Sommaire,
            2 => FunctionKey::Guide,
            3 => FunctionKey::Repetition,
            4 => FunctionKey::RetourNav,
            5 => FunctionKey::Suite,
            10 => FunctionKey::Envoi,
            _ => return None,
        };
        Some(Self::function(key))
    }

    fn function(key: FunctionKey) -> Vec<u8> {
        key.sequence().to_vec()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key_event(code: KeyCode, modifiers: KeyModifiers) -> KeyEvent {
        KeyEvent::new(code, modifiers)
    }

    #[test]
    fn test_char_keys() {
        let event = key_event(KeyCode::Char('a'), KeyModifiers::NONE);
        assert_eq!(KeyMapper::map(&event), Some(b"a".to_vec()));

        let event = key_event(KeyCode::Char('é'), KeyModifiers::NONE);
        assert_eq!(KeyMapper::map(&event), Some(vec![0xE9]));

        let event = key_event(KeyCode::Char('€'), KeyModifiers::NONE);
        assert_eq!(KeyMapper::map(&event), None);
    }

    #[test]
    fn test_editing_keys() {
        let event = key_event(KeyCode::Enter, KeyModifiers::NONE);
        assert_eq!(KeyMapper::map(&event), Some(vec![0x0D]));

        let event = key_event(KeyCode::Backspace, KeyModifiers::NONE);
        assert_eq!(KeyMapper::map(&event), Some(vec![0x13, 0x47]));

        let event = key_event(KeyCode::Esc, KeyModifiers::NONE);
        assert_eq!(KeyMapper::map(&event), Some(vec![0x13, 0x45]));
    }

    #[test]
    fn test_function_keys() {
        let event = key_event(KeyCode::F(1), KeyModifiers::NONE);
        assert_eq!(KeyMapper::map(&event), Some(b"\x13F".to_vec()));

        let event = key_event(KeyCode::F(10), KeyModifiers::NONE);
        assert_eq!(KeyMapper::map(&event), Some(vec![0x13, 0x41]));

        let event = key_event(KeyCode::F(7), KeyModifiers::NONE);
        assert_eq!(KeyMapper::map(&event), None);
    }

    #[test]
    fn test_quit() {
        let event = key_event(KeyCode::Char('c'), KeyModifiers::CONTROL);
        assert!(KeyMapper::is_quit(&event));
        assert_eq!(KeyMapper::map(&event), None);
    }
}
