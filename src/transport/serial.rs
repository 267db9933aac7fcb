//! Serial line transport
//!
//! Opens the device, puts it in raw mode and sets the Minitel line format:
//! 7 data bits, even parity, 1 stop bit, no flow control.

use std::fs::File;
use std::io::{ErrorKind, Read, Write};

use super::{Result, Transport, TransportError};

/// Baud rate the terminal starts with after power-on
pub const DEFAULT_BAUD_RATE: u32 = 1200;

pub struct SerialTransport {
    port: File,
    path: String,
    baud_rate: u32,
    #[cfg(unix)]
    saved: Option<libc::termios>,
}

impl SerialTransport {
    /// Open `path` at `baud_rate` in 7E1 raw mode.
    #[cfg(unix)]
    pub fn open(path: &str, baud_rate: u32) -> Result<Self> {
        use std::fs::OpenOptions;
        use std::os::unix::fs::OpenOptionsExt;
        use std::os::unix::io::AsRawFd;

        let speed = speed_for(baud_rate).ok_or(TransportError::BaudRate(baud_rate))?;
        let port = OpenOptions::new()
            .read(true)
            .write(true)
            .custom_flags(libc::O_NOCTTY)
            .open(path)
            .map_err(|source| TransportError::Open {
                path: path.to_string(),
                source,
            })?;

        let saved = termios::configure(port.as_raw_fd(), speed)?;
        tracing::info!("Opened {} at {} baud (7E1)", path, baud_rate);

        Ok(Self {
            port,
            path: path.to_string(),
            baud_rate,
            saved: Some(saved),
        })
    }

    #[cfg(not(unix))]
    pub fn open(path: &str, _baud_rate: u32) -> Result<Self> {
        Err(TransportError::Unsupported(format!(
            "Serial port {} is only supported on Unix",
            path
        )))
    }
}

impl Transport for SerialTransport {
    fn send(&mut self, data: &[u8]) -> Result<()> {
        self.port.write_all(data).map_err(TransportError::Write)?;
        self.port.flush().map_err(TransportError::Write)
    }

    fn recv(&mut self, buf: &mut [u8]) -> Result<usize> {
        loop {
            match self.port.read(buf) {
                Ok(0) => return Err(TransportError::Closed),
                Ok(n) => return Ok(n),
                Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                Err(e) => return Err(TransportError::Read(e)),
            }
        }
    }

    fn name(&self) -> String {
        format!("serial {} @ {}", self.path, self.baud_rate)
    }
}

#[cfg(unix)]
impl Drop for SerialTransport {
    fn drop(&mut self) {
        use std::os::unix::io::AsRawFd;

        if let Some(saved) = self.saved.take() {
            termios::restore(self.port.as_raw_fd(), &saved);
        }
    }
}

#[cfg(unix)]
fn speed_for(baud_rate: u32) -> Option<libc::speed_t> {
    match baud_rate {
        300 => Some(libc::B300),
        1200 => Some(libc::B1200),
        2400 => Some(libc::B2400),
        4800 => Some(libc::B4800),
        9600 => Some(libc::B9600),
        19200 => Some(libc::B19200),
        _ => None,
    }
}

#[cfg(unix)]
mod termios {
    use std::io::Error;
    use std::mem;
    use std::os::unix::io::RawFd;

    use super::{Result, TransportError};

    /// Switch the line to raw 7E1 at `speed`. Returns the previous settings.
    pub fn configure(fd: RawFd, speed: libc::speed_t) -> Result<libc::termios> {
        let mut tbuf = mem::MaybeUninit::uninit();
        if 0 > unsafe { libc::tcgetattr(fd, tbuf.as_mut_ptr()) } {
            return Err(TransportError::Configure(Error::last_os_error()));
        }
        let saved: libc::termios = unsafe { tbuf.assume_init() };
        let mut tio = saved;

        unsafe { libc::cfmakeraw(&mut tio) };
        tio.c_cflag &= !(libc::CSIZE | libc::PARODD | libc::CSTOPB | libc::CRTSCTS);
        tio.c_cflag |= libc::CS7 | libc::PARENB | libc::CREAD | libc::CLOCAL;
        tio.c_iflag &= !(libc::IXON | libc::IXOFF | libc::INPCK);
        tio.c_cc[libc::VMIN] = 1;
        tio.c_cc[libc::VTIME] = 0;

        unsafe {
            if 0 > libc::cfsetispeed(&mut tio, speed) || 0 > libc::cfsetospeed(&mut tio, speed) {
                return Err(TransportError::Configure(Error::last_os_error()));
            }
            if 0 > libc::tcsetattr(fd, libc::TCSANOW, &tio) {
                return Err(TransportError::Configure(Error::last_os_error()));
            }
            // Drop anything typed before we were listening
            libc::tcflush(fd, libc::TCIOFLUSH);
        }

        Ok(saved)
    }

    pub fn restore(fd: RawFd, saved: &libc::termios) {
        if 0 > unsafe { libc::tcsetattr(fd, libc::TCSANOW, saved) } {
            tracing::warn!(
                "Unable to restore serial line settings: {}",
                Error::last_os_error()
            );
        }
    }
}
