//! Keyboard input decoding.
//!
//! - **session**: the byte-level state machine shared by every read mode
//! - **mode**: read-mode configurations and multiple-choice resolution
//!
//! # Architecture
//!
//! ```text
//! Minitel::read_*()
//! └── InputSession (one per read call)
//!     ├── ReadConfig (bounded field / free-form / allow-list)
//!     ├── FunctionKey::classify (0x13 sequences)
//!     └── Encoder (beeps and visual erasing)
//! ```

pub mod mode;
pub mod session;

use thiserror::Error;

use crate::protocol::FunctionKey;
use crate::transport::TransportError;

pub use mode::{Choice, ReadConfig, StrayKeyPolicy};
pub use session::{Event, InputSession};

/// Ways a read call can end without producing input.
#[derive(Error, Debug)]
pub enum ReadError {
    #[error("Navigation key pressed: {0}")]
    NavigationAbort(FunctionKey),

    #[error("Invalid choice {input:?} (expected 1 to {count})")]
    InvalidChoice { input: String, count: usize },

    #[error("Key 0x{0:02X} is not accepted here")]
    StrayKey(u8),

    #[error(transparent)]
    Transport(#[from] TransportError),
}

pub type Result<T> = std::result::Result<T, ReadError>;

impl ReadError {
    /// The navigation key, if this read was aborted by one
    pub fn navigation_key(&self) -> Option<FunctionKey> {
        match self {
            ReadError::NavigationAbort(key) => Some(*key),
            _ => None,
        }
    }
}
