//! Input state machine
//!
//! Classifies incoming bytes into text, editing keys, function keys and quick
//! selections. Visual corrections (beeps, erased characters) are queued on
//! the encoder passed to each `feed` call.

use crate::protocol::{Encoder, FunctionKey, CR, LF, SEP};

use super::mode::{ReadConfig, StrayKeyPolicy};

/// Result of a finished read
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    /// Envoi, CR or LF: the buffer as typed
    Submit(String),
    /// A quick character ended the read
    Quick(u8),
    /// A navigation key ended the read
    Abort(FunctionKey),
    /// A byte outside the allow-list, under the reject policy
    Stray(u8),
}

/// Conditions corrected in place without ending the read
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Recovered {
    Overflow(u8),
    UnrecognizedSequence(u8),
    StrayKey(u8),
    ControlByte(u8),
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
enum DecoderState {
    #[default]
    Idle,
    InFunctionSequence,
}

/// In-progress read. Lives for exactly one read call.
#[derive(Debug)]
pub struct InputSession {
    config: ReadConfig,
    buffer: Vec<u8>,
    state: DecoderState,
}

impl InputSession {
    pub fn new(config: ReadConfig) -> Self {
        Self {
            config,
            buffer: Vec::new(),
            state: DecoderState::Idle,
        }
    }

    /// Current buffer contents
    #[cfg(test)]
    pub fn text(&self) -> String {
        latin1(&self.buffer)
    }

    #[cfg(test)]
    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    /// True while waiting for the selector byte of a function key
    #[cfg(test)]
    pub fn in_function_sequence(&self) -> bool {
        self.state == DecoderState::InFunctionSequence
    }

    /// Feed a chunk of bytes, stopping at the first terminating event.
    ///
    /// Bytes after the terminating one are not consumed; callers that need
    /// them should use [`InputSession::feed_byte`].
    #[allow(dead_code)]
    pub fn feed(&mut self, bytes: &[u8], out: &mut Encoder) -> Option<Event> {
        bytes.iter().find_map(|&byte| self.feed_byte(byte, out))
    }

    /// Feed a single byte
    pub fn feed_byte(&mut self, byte: u8, out: &mut Encoder) -> Option<Event> {
        if self.state == DecoderState::InFunctionSequence {
            self.state = DecoderState::Idle;
            return self.function_key(FunctionKey::classify(byte), out);
        }

        match byte {
            SEP => {
                self.state = DecoderState::InFunctionSequence;
                None
            }
            CR | LF => Some(self.submit()),
            b if self.config.quick.contains(&b) => Some(Event::Quick(b)),
            b if b >= 0x20 => self.printable(b, out),
            b => {
                self.recover(Recovered::ControlByte(b), out);
                None
            }
        }
    }

    fn printable(&mut self, byte: u8, out: &mut Encoder) -> Option<Event> {
        if self.config.allow_only {
            // The terminal already echoed the key; take it back off the screen
            erase_backward(out);
            self.recover(Recovered::StrayKey(byte), out);
            return match self.config.stray {
                StrayKeyPolicy::Beep => None,
                StrayKeyPolicy::Reject => Some(Event::Stray(byte)),
            };
        }

        if let Some(field) = &self.config.field {
            if self.buffer.len() >= usize::from(field.length) {
                self.recover(Recovered::Overflow(byte), out);
                return None;
            }
        }

        // Minitel echoes typed characters itself
        self.buffer.push(byte);
        None
    }

    fn function_key(&mut self, key: FunctionKey, out: &mut Encoder) -> Option<Event> {
        tracing::debug!("Function key: {}", key);
        match key {
            FunctionKey::Envoi => Some(self.submit()),
            FunctionKey::Annulation => {
                self.cancel(out);
                None
            }
            FunctionKey::Retour => {
                if self.buffer.pop().is_some() {
                    self.erase_step(out);
                }
                None
            }
            FunctionKey::Unrecognized(selector) => {
                self.recover(Recovered::UnrecognizedSequence(selector), out);
                None
            }
            nav => Some(Event::Abort(nav)),
        }
    }

    fn submit(&mut self) -> Event {
        Event::Submit(latin1(&std::mem::take(&mut self.buffer)))
    }

    /// Annulation: empty the buffer and blank what was typed.
    fn cancel(&mut self, out: &mut Encoder) {
        match &self.config.field {
            Some(field) => {
                out.position(field.line, field.column);
                out.plot(' ', usize::from(field.length));
                out.position(field.line, field.column);
            }
            None => {
                for _ in 0..self.buffer.len() {
                    erase_backward(out);
                }
            }
        }
        self.buffer.clear();
    }

    /// Blank the character just removed from the buffer.
    fn erase_step(&self, out: &mut Encoder) {
        match &self.config.field {
            Some(field) => {
                let column = field.column.saturating_add(self.buffer.len() as u8);
                out.position(field.line, column);
                out.print(" ");
                out.position(field.line, column);
            }
            None => erase_backward(out),
        }
    }

    fn recover(&self, what: Recovered, out: &mut Encoder) {
        tracing::debug!("Input corrected: {:?}", what);
        out.bip();
    }
}

fn erase_backward(out: &mut Encoder) {
    out.backspace();
    out.print(" ");
    out.backspace();
}

fn latin1(bytes: &[u8]) -> String {
    bytes.iter().map(|&b| b as char).collect()
}
