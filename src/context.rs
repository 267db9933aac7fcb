//! Execution context handed to screens
//!
//! Owns the transport, the output encoder, input left over from the previous
//! read and the global store. Screens queue directives on [`Minitel::out`]
//! and call one of the read methods; only one read can run at a time because
//! each takes `&mut self`.

use crate::input::mode::{self, ChoiceInput};
use crate::input::{Choice, Event, InputSession, ReadConfig, ReadError, Result, StrayKeyPolicy};
use crate::protocol::Encoder;
use crate::state::State;
use crate::transport::{self, Transport};

/// Prompt shown before a free-form multiple-choice answer
pub const CHOICE_PROMPT: &str = "Choix";

const RECV_CHUNK: usize = 64;

pub struct Minitel {
    transport: Box<dyn Transport>,
    out: Encoder,
    /// Bytes received after the last read ended
    pending: Vec<u8>,
    store: State,
    stray: StrayKeyPolicy,
}

impl Minitel {
    pub fn new(transport: Box<dyn Transport>) -> Self {
        Self {
            transport,
            out: Encoder::new(),
            pending: Vec::new(),
            store: State::new(),
            stray: StrayKeyPolicy::default(),
        }
    }

    pub fn with_stray_policy(mut self, stray: StrayKeyPolicy) -> Self {
        self.stray = stray;
        self
    }

    /// Queue screen directives
    pub fn out(&mut self) -> &mut Encoder {
        &mut self.out
    }

    /// Global store shared by every screen
    pub fn store(&self) -> &State {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut State {
        &mut self.store
    }

    pub fn transport_name(&self) -> String {
        self.transport.name()
    }

    /// Send everything queued on the encoder.
    pub fn flush(&mut self) -> transport::Result<()> {
        if self.out.is_empty() {
            return Ok(());
        }
        let data = self.out.take();
        self.transport.send(&data)
    }

    /// Bounded line input at `(line, column)`, at most `length` characters.
    pub fn read_line(&mut self, line: u8, column: u8, length: u8) -> Result<String> {
        self.out.position(line, column);
        self.capture(ReadConfig::line(line, column, length))
    }

    /// Free-form input at the cursor, after an inverse-video label.
    pub fn read_here(&mut self, label: &str) -> Result<String> {
        self.label(label);
        self.capture(ReadConfig::free())
    }

    /// Single keystroke among `allowed`. Envoi or Enter give an empty string.
    pub fn read_key(&mut self, allowed: &[u8]) -> Result<String> {
        self.capture(ReadConfig::keys(allowed, self.stray))
    }

    /// Show `label` and the numbered options, then read the answer.
    pub fn multiple_choice(
        &mut self,
        label: &str,
        options: &[Choice],
        input: ChoiceInput,
    ) -> Result<Choice> {
        self.out.print(label);
        self.next_line();
        for (i, option) in options.iter().enumerate() {
            self.out.print(&format!("{}. {}", i + 1, option.label));
            self.next_line();
        }

        let text = match input {
            ChoiceInput::Free => {
                self.label(CHOICE_PROMPT);
                let quick = mode::quick_keys(options.len());
                self.capture(ReadConfig::free().with_quick(&quick))?
            }
            ChoiceInput::Key => {
                let keys = mode::index_keys(options.len());
                self.capture(ReadConfig::keys(&keys, self.stray))?
            }
        };

        let choice = mode::resolve_choice(options, &text, input)?;
        tracing::debug!("Choice {:?} -> {}", text, choice.value);
        Ok(choice)
    }

    /// Next chunk of raw input, undecoded.
    pub fn wait_for_key(&mut self) -> Result<Vec<u8>> {
        if !self.pending.is_empty() {
            return Ok(std::mem::take(&mut self.pending));
        }
        self.flush()?;
        let mut buf = [0u8; RECV_CHUNK];
        let n = self.transport.recv(&mut buf)?;
        Ok(buf[..n].to_vec())
    }

    fn label(&mut self, label: &str) {
        self.out.inverse(true);
        self.out.print(label);
        self.out.inverse(false);
        self.out.print(": ");
    }

    fn next_line(&mut self) {
        self.out.new_line();
        self.out.start_line();
    }

    /// Run one read with the cursor shown, and turn the event into text.
    fn capture(&mut self, config: ReadConfig) -> Result<String> {
        self.out.cursor(true);
        let event = self.read(config);
        self.out.cursor(false);
        let flushed = self.flush();

        let text = match event? {
            Event::Submit(text) => text,
            Event::Quick(byte) => (byte as char).to_string(),
            Event::Abort(key) => {
                tracing::info!("Read aborted by {}", key);
                warn_unflushed(flushed);
                return Err(ReadError::NavigationAbort(key));
            }
            Event::Stray(byte) => {
                warn_unflushed(flushed);
                return Err(ReadError::StrayKey(byte));
            }
        };
        flushed?;
        Ok(text)
    }

    fn read(&mut self, config: ReadConfig) -> Result<Event> {
        let mut session = InputSession::new(config);
        let mut buf = [0u8; RECV_CHUNK];

        loop {
            let chunk = if self.pending.is_empty() {
                self.flush()?;
                let n = self.transport.recv(&mut buf)?;
                buf[..n].to_vec()
            } else {
                std::mem::take(&mut self.pending)
            };

            for (i, &byte) in chunk.iter().enumerate() {
                if let Some(event) = session.feed_byte(byte, &mut self.out) {
                    self.pending = chunk[i + 1..].to_vec();
                    return Ok(event);
                }
            }
            self.flush()?;
        }
    }
}

/// The read already failed; a write error after it is only logged.
fn warn_unflushed(flushed: transport::Result<()>) {
    if let Err(e) = flushed {
        tracing::warn!("Output lost after aborted read: {}", e);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::FunctionKey;
    use crate::transport::memory::MemoryTransport;

    fn context() -> (Minitel, MemoryTransport) {
        let link = MemoryTransport::new();
        (Minitel::new(Box::new(link.clone())), link)
    }

    fn options() -> Vec<Choice> {
        vec![Choice::new("a", "Alpha"), Choice::new("b", "Beta")]
    }

    #[test]
    fn test_read_line_output_and_result() {
        let (mut ctx, link) = context();
        link.push_input(b"hello\x13\x41");
        assert_eq!(ctx.read_line(3, 5, 10).unwrap(), "hello");
        assert_eq!(link.take_output(), vec![0x1F, 0x43, 0x45, 0x11, 0x14]);
    }

    #[test]
    fn test_read_line_overflow() {
        let (mut ctx, link) = context();
        link.push_input(b"abc");
        link.push_input(b"de\r");
        assert_eq!(ctx.read_line(1, 1, 3).unwrap(), "abc");
        // position, cursor on, two beeps, cursor off
        assert_eq!(link.take_output(), vec![0x1E, 0x11, 0x07, 0x07, 0x14]);
    }

    #[test]
    fn test_function_key_split_across_chunks() {
        let (mut ctx, link) = context();
        link.push_input(b"ab\x13");
        link.push_input(b"\x47\r");
        assert_eq!(ctx.read_here("Nom").unwrap(), "a");
    }

    #[test]
    fn test_read_here_label() {
        let (mut ctx, link) = context();
        link.push_input(b"x\r");
        ctx.read_here("Input").unwrap();
        let mut expected = vec![0x1B, 0x5D];
        expected.extend_from_slice(b"Input");
        expected.extend_from_slice(&[0x1B, 0x5C]);
        expected.extend_from_slice(b": ");
        expected.extend_from_slice(&[0x11, 0x14]);
        assert_eq!(link.take_output(), expected);
    }

    #[test]
    fn test_navigation_abort_hides_cursor() {
        let (mut ctx, link) = context();
        link.push_input(b"some text\x13F");
        match ctx.read_here("Input") {
            Err(ReadError::NavigationAbort(FunctionKey::Sommaire)) => {}
            other => panic!("unexpected: {:?}", other),
        }
        assert_eq!(link.take_output().last(), Some(&0x14));
    }

    #[test]
    fn test_abort_wins_over_failed_write() {
        let (mut ctx, link) = context();
        // cursor-on goes out before the read, cursor-off fails after the abort
        link.fail_sends_after(1);
        link.push_input(b"\x13F");
        assert!(matches!(
            ctx.read_here("Input"),
            Err(ReadError::NavigationAbort(FunctionKey::Sommaire))
        ));

        link.push_input(b"x");
        assert!(matches!(ctx.read_key(b"on"), Err(ReadError::Transport(_))));
    }

    #[test]
    fn test_leftover_bytes_feed_next_read() {
        let (mut ctx, link) = context();
        link.push_input(b"one\rtwo\r");
        assert_eq!(ctx.read_here("A").unwrap(), "one");
        assert_eq!(ctx.read_here("B").unwrap(), "two");
    }

    #[test]
    fn test_read_key() {
        let (mut ctx, link) = context();
        link.push_input(b"xo");
        assert_eq!(ctx.read_key(b"on").unwrap(), "o");
        // cursor on, erase stray x, beep, cursor off
        assert_eq!(link.take_output(), b"\x11\x08 \x08\x07\x14".to_vec());
    }

    #[test]
    fn test_read_key_reject_policy() {
        let link = MemoryTransport::new();
        let mut ctx = Minitel::new(Box::new(link.clone())).with_stray_policy(StrayKeyPolicy::Reject);
        link.push_input(b"x");
        assert!(matches!(ctx.read_key(b"on"), Err(ReadError::StrayKey(b'x'))));
    }

    #[test]
    fn test_multiple_choice_free_form() {
        let (mut ctx, link) = context();
        link.push_input(b"1");
        assert_eq!(ctx.multiple_choice("Pick", &options(), ChoiceInput::Free).unwrap().value, "a");

        link.push_input(b"z\r");
        let choice = ctx.multiple_choice("Pick", &options(), ChoiceInput::Free).unwrap();
        assert_eq!(choice, Choice::new("z", "z"));

        link.push_input(b"9\r");
        assert!(matches!(
            ctx.multiple_choice("Pick", &options(), ChoiceInput::Free),
            Err(ReadError::InvalidChoice { .. })
        ));
    }

    #[test]
    fn test_multiple_choice_two_digit_index() {
        let (mut ctx, link) = context();
        let options: Vec<Choice> = (1..=12)
            .map(|i| Choice::new(format!("v{}", i), format!("Option {}", i)))
            .collect();

        link.push_input(b"10\r");
        assert_eq!(ctx.multiple_choice("Pick", &options, ChoiceInput::Free).unwrap().value, "v10");

        link.push_input(b"1\x13\x41");
        assert_eq!(ctx.multiple_choice("Pick", &options, ChoiceInput::Free).unwrap().value, "v1");
    }

    #[test]
    fn test_multiple_choice_key() {
        let (mut ctx, link) = context();
        link.push_input(b"92");
        let choice = ctx.multiple_choice("Pick", &options(), ChoiceInput::Key).unwrap();
        assert_eq!(choice.value, "b");
    }

    #[test]
    fn test_multiple_choice_renders_options() {
        let (mut ctx, link) = context();
        link.push_input(b"2");
        ctx.multiple_choice("Pick", &options(), ChoiceInput::Key).unwrap();
        let out = link.take_output();
        let expected = b"Pick\n\r1. Alpha\n\r2. Beta\n\r";
        assert!(out.starts_with(expected));
    }

    #[test]
    fn test_wait_for_key_returns_raw_chunk() {
        let (mut ctx, link) = context();
        link.push_input(b"\x13F");
        assert_eq!(ctx.wait_for_key().unwrap(), b"\x13F".to_vec());
    }

    #[test]
    fn test_transport_closed_propagates() {
        let (mut ctx, _link) = context();
        assert!(matches!(ctx.read_here("A"), Err(ReadError::Transport(_))));
    }
}
