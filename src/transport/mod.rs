//! Byte transport to the terminal.
//!
//! - **serial**: physical Minitel on a serial line (7E1)
//!
//! The console emulator in [`crate::console`] implements the same trait.
//!
//! Transports move bytes only; they know nothing about the protocol.

pub mod serial;

use std::io;
use thiserror::Error;

pub use serial::SerialTransport;

#[derive(Error, Debug)]
pub enum TransportError {
    #[error("Failed to open {path}: {source}")]
    Open {
        path: String,
        #[source]
        source: io::Error,
    },

    #[error("Failed to configure line: {0}")]
    Configure(#[source] io::Error),

    #[error("Unsupported baud rate: {0}")]
    BaudRate(u32),

    #[error("Failed to read from terminal: {0}")]
    Read(#[source] io::Error),

    #[error("Failed to write to terminal: {0}")]
    Write(#[source] io::Error),

    #[error("Terminal link closed")]
    Closed,

    #[cfg_attr(unix, allow(dead_code))]
    #[error("{0}")]
    Unsupported(String),
}

pub type Result<T> = std::result::Result<T, TransportError>;

/// A bidirectional byte link to one terminal.
pub trait Transport {
    /// Send bytes; returns once they are handed to the link.
    fn send(&mut self, data: &[u8]) -> Result<()>;

    /// Block until at least one byte arrives. Returns the number of bytes read.
    fn recv(&mut self, buf: &mut [u8]) -> Result<usize>;

    /// Short description for logs
    fn name(&self) -> String;
}
