//! Console emulator.
//!
//! Runs screens on the host terminal instead of a real Minitel:
//!
//! - **renderer**: videotex output parsed into crossterm drawing operations
//! - **keymapper**: host keys mapped to Minitel key codes
//!
//! Like the real terminal, typed characters are echoed locally.

pub mod keymapper;
pub mod renderer;

use std::io::{self, Write};

use crossterm::{
    event::{self, Event, KeyEventKind},
    execute,
    style::{Attribute, ResetColor, SetAttribute},
    terminal::{self, EnterAlternateScreen, LeaveAlternateScreen},
};

use crate::transport::{Result, Transport, TransportError};

pub use keymapper::KeyMapper;
pub use renderer::Renderer;

/// Transport backed by the host terminal
pub struct ConsoleTransport {
    renderer: Renderer,
    raw: bool,
}

impl ConsoleTransport {
    /// Enter raw mode and the alternate screen
    pub fn open() -> Result<Self> {
        terminal::enable_raw_mode().map_err(TransportError::Configure)?;
        let mut this = Self {
            renderer: Renderer::new(),
            raw: true,
        };
        execute!(io::stdout(), EnterAlternateScreen).map_err(TransportError::Write)?;
        // Start from a blank 40x25 page like a freshly connected terminal
        this.draw(b"\x0c")?;
        tracing::info!("Console emulator started");
        Ok(this)
    }

    fn draw(&mut self, data: &[u8]) -> Result<()> {
        let mut stdout = io::stdout().lock();
        for draw in self.renderer.feed_all(data) {
            renderer::apply(&mut stdout, &draw).map_err(TransportError::Write)?;
        }
        stdout.flush().map_err(TransportError::Write)
    }

    fn restore(&mut self) {
        if !self.raw {
            return;
        }
        let mut stdout = io::stdout();
        let _ = execute!(stdout, ResetColor, SetAttribute(Attribute::Reset));
        let _ = execute!(stdout, crossterm::cursor::Show, LeaveAlternateScreen);
        let _ = terminal::disable_raw_mode();
        self.raw = false;
    }
}

impl Transport for ConsoleTransport {
    fn send(&mut self, data: &[u8]) -> Result<()> {
        self.draw(data)
    }

    fn recv(&mut self, buf: &mut [u8]) -> Result<usize> {
        loop {
            let Event::Key(key) = event::read().map_err(TransportError::Read)? else {
                continue;
            };
            if key.kind != KeyEventKind::Press {
                continue;
            }
            if KeyMapper::is_quit(&key) {
                tracing::info!("Console emulator closed by user");
                return Err(TransportError::Closed);
            }
            let Some(bytes) = KeyMapper::map(&key) else {
                continue;
            };

            // Local echo of plain characters
            if bytes.len() == 1 && bytes[0] >= 0x20 {
                self.draw(&bytes)?;
            }

            let n = bytes.len().min(buf.len());
            buf[..n].copy_from_slice(&bytes[..n]);
            return Ok(n);
        }
    }

    fn name(&self) -> String {
        "console".to_string()
    }
}

impl Drop for ConsoleTransport {
    fn drop(&mut self) {
        self.restore();
    }
}
