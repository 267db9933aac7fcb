//! minitel - run videotex screens on a Minitel terminal
//!
//! minitel drives a Minitel over a serial line (7E1): it encodes screen
//! directives to videotex control codes and decodes keyboard input, including
//! the ENVOI / ANNULATION / RETOUR / SOMMAIRE function keys.
//!
//! # Quick Start
//!
//! ```text
//! minitel                       # Serial port from config.toml (default /dev/ttyUSB0)
//! minitel -p /dev/ttyS0 -b 4800 # Explicit port and speed
//! minitel -c                    # Emulate the terminal in this console
//! ```
//!
//! # Console emulator keys
//!
//! | Key | Minitel |
//! |-----|---------|
//! | Enter / F10 | Entrée / ENVOI |
//! | Esc | ANNULATION |
//! | Backspace | RETOUR |
//! | F1 | SOMMAIRE |
//! | Ctrl+C | quit |

mod app;
mod config;
mod console;
mod context;
mod input;
mod protocol;
mod router;
mod state;
mod transport;

use std::env;

use tracing::{error, info};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use crate::config::{Config as MinitelConfig, TransportKind};
use crate::console::ConsoleTransport;
use crate::context::Minitel;
use crate::transport::{SerialTransport, Transport};

/// Command line overrides
#[derive(Debug, Default, PartialEq)]
struct Config {
    /// Serial device path
    port: Option<String>,
    /// Serial speed
    baud_rate: Option<u32>,
    /// Transport selected on the command line
    transport: Option<TransportKind>,
}

/// Version string from Cargo.toml
const VERSION: &str = env!("CARGO_PKG_VERSION");

fn print_version() {
    eprintln!("minitel {}", VERSION);
}

fn print_help() {
    eprintln!("minitel {} - videotex screens for Minitel terminals", VERSION);
    eprintln!();
    eprintln!("Usage: minitel [OPTIONS]");
    eprintln!();
    eprintln!("Transport options:");
    eprintln!("  (default)             From config.toml or serial /dev/ttyUSB0");
    eprintln!("  -s, --serial          Use the serial port");
    eprintln!("  -c, --console         Emulate the terminal in this console");
    eprintln!("  -p, --port <PATH>     Serial device path");
    eprintln!("  -b, --baud <RATE>     Serial speed (300, 1200, 4800, 9600...)");
    eprintln!();
    eprintln!("Other options:");
    eprintln!("  -v, --version         Show version");
    eprintln!("  -h, --help            Show this help");
    eprintln!();
    eprintln!("Console emulator keys:");
    eprintln!("  Enter                 Entrée");
    eprintln!("  F10                   ENVOI");
    eprintln!("  Esc                   ANNULATION");
    eprintln!("  Backspace             RETOUR");
    eprintln!("  F1 / F2 / F3          SOMMAIRE / GUIDE / REPETITION");
    eprintln!("  F4 / F5               RETOUR (navigation) / SUITE");
    eprintln!("  Ctrl+C                Quit");
    eprintln!();
    eprintln!("Configuration: ~/.minitel/config.toml");
    eprintln!("Log file:      ~/.minitel/minitel.log");
}

enum Command {
    Run(Config),
    Help,
    Version,
}

fn parse_args<I: IntoIterator<Item = String>>(args: I) -> Result<Command, String> {
    let mut config = Config::default();
    let mut args = args.into_iter();

    while let Some(arg) = args.next() {
        match arg.as_str() {
            "-h" | "--help" => return Ok(Command::Help),
            "-v" | "--version" => return Ok(Command::Version),
            "-s" | "--serial" => {
                config.transport = Some(TransportKind::Serial);
            }
            "-c" | "--console" => {
                config.transport = Some(TransportKind::Console);
            }
            "-p" | "--port" => {
                let path = args.next().ok_or("Missing port argument")?;
                config.port = Some(path);
                config.transport = Some(TransportKind::Serial);
            }
            "-b" | "--baud" => {
                let rate = args.next().ok_or("Missing baud rate argument")?;
                let rate = rate
                    .parse()
                    .map_err(|_| format!("Invalid baud rate: {}", rate))?;
                config.baud_rate = Some(rate);
            }
            arg => {
                return Err(format!("Unknown argument: {}. Use -h for help.", arg));
            }
        }
    }

    Ok(Command::Run(config))
}

/// Log to ~/.minitel/minitel.log; stdout may be the emulated screen.
fn init_logging(level: &str) {
    let log_path = MinitelConfig::get_config_dir()
        .map(|dir| dir.join("minitel.log"))
        .unwrap_or_else(|| std::path::PathBuf::from("minitel.log"));

    if let Some(parent) = log_path.parent() {
        let _ = std::fs::create_dir_all(parent);
    }

    let log_file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&log_path)
        .ok();

    if let Some(file) = log_file {
        let filter = EnvFilter::try_from_default_env()
            .or_else(|_| EnvFilter::try_new(level))
            .unwrap_or_else(|_| EnvFilter::new("info"));
        let subscriber = FmtSubscriber::builder()
            .with_env_filter(filter)
            .with_writer(std::sync::Mutex::new(file))
            .with_ansi(false)
            .finish();
        let _ = tracing::subscriber::set_global_default(subscriber);
    }
}

fn open_transport(config: &MinitelConfig) -> anyhow::Result<Box<dyn Transport>> {
    let transport: Box<dyn Transport> = match config.transport {
        TransportKind::Serial => Box::new(SerialTransport::open(
            &config.serial.path,
            config.serial.baud_rate,
        )?),
        TransportKind::Console => Box::new(ConsoleTransport::open()?),
    };
    Ok(transport)
}

fn main() -> anyhow::Result<()> {
    let cli = match parse_args(env::args().skip(1)) {
        Ok(Command::Run(c)) => c,
        Ok(Command::Help) => {
            print_help();
            return Ok(());
        }
        Ok(Command::Version) => {
            print_version();
            return Ok(());
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            eprintln!("Use --help for usage information");
            std::process::exit(1);
        }
    };

    let mut config = MinitelConfig::load();
    if let Some(transport) = cli.transport {
        config.transport = transport;
    }
    if let Some(port) = cli.port {
        config.serial.path = port;
    }
    if let Some(rate) = cli.baud_rate {
        config.serial.baud_rate = rate;
    }

    init_logging(&config.log_level);
    info!("minitel {} starting...", VERSION);
    info!("Transport: {:?}", config.transport);

    let transport = match open_transport(&config) {
        Ok(t) => t,
        Err(e) => {
            error!("Failed to open transport: {}", e);
            return Err(e);
        }
    };

    let mut ctx = Minitel::new(transport).with_stray_policy(config.input.stray_key);
    let mut router = app::router();
    let result = router.run(&mut ctx, &config.start_route);
    if let Err(e) = &result {
        error!("Stopped: {:#}", e);
    }
    info!("minitel exiting");
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Result<Command, String> {
        parse_args(args.iter().map(|s| s.to_string()))
    }

    #[test]
    fn test_no_args() {
        assert!(matches!(parse(&[]), Ok(Command::Run(c)) if c == Config::default()));
    }

    #[test]
    fn test_port_and_baud() {
        match parse(&["-p", "/dev/ttyS1", "--baud", "4800"]) {
            Ok(Command::Run(c)) => {
                assert_eq!(c.port.as_deref(), Some("/dev/ttyS1"));
                assert_eq!(c.baud_rate, Some(4800));
                assert_eq!(c.transport, Some(TransportKind::Serial));
            }
            _ => panic!("expected run command"),
        }
    }

    #[test]
    fn test_console() {
        assert!(matches!(
            parse(&["-c"]),
            Ok(Command::Run(Config { transport: Some(TransportKind::Console), .. }))
        ));
    }

    #[test]
    fn test_errors() {
        assert!(parse(&["-p"]).is_err());
        assert!(parse(&["-b", "fast"]).is_err());
        assert!(parse(&["--telnet"]).is_err());
        assert!(matches!(parse(&["-h"]), Ok(Command::Help)));
        assert!(matches!(parse(&["--version"]), Ok(Command::Version)));
    }
}
