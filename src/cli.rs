//! Command-line interface for uwb-bridge.
//!
//! Uses lexopt for minimal binary size overhead.

use std::ffi::OsString;
use std::net::IpAddr;
use std::path::PathBuf;

/// Command-line arguments.
#[derive(Debug, Clone)]
pub struct Args {
    /// Host address to bind to.
    pub host: IpAddr,
    /// Port to listen on.
    pub port: u16,
    /// Path to configuration file.
    pub config: Option<PathBuf>,
    /// Simulated ranging report interval in milliseconds.
    pub report_interval_ms: Option<u64>,
    /// Log level (error, warn, info, debug, trace).
    pub log_level: Option<String>,
    /// Show version and exit.
    pub version: bool,
    /// Show help and exit.
    pub help: bool,
}

impl Default for Args {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".parse().unwrap(),
            port: 3000,
            config: None,
            report_interval_ms: None,
            log_level: None,
            version: false,
            help: false,
        }
    }
}

/// Parse command-line arguments.
pub fn parse_args() -> Result<Args, ArgsError> {
    parse_args_from(std::env::args_os())
}

/// Parse arguments from an iterator (for testing).
pub fn parse_args_from<I>(args: I) -> Result<Args, ArgsError>
where
    I: IntoIterator<Item = OsString>,
{
    use lexopt::prelude::*;

    let mut result = Args::default();
    let mut parser = lexopt::Parser::from_iter(args);

    while let Some(arg) = parser.next()? {
        match arg {
            Short('h') | Long("help") => {
                result.help = true;
            }
            Short('V') | Long("version") => {
                result.version = true;
            }
            Short('H') | Long("host") => {
                let value: String = parser.value()?.parse()?;
                result.host = value
                    .parse()
                    .map_err(|_| ArgsError::InvalidValue("host", value))?;
            }
            Short('p') | Long("port") => {
                let value: String = parser.value()?.parse()?;
                result.port = value
                    .parse()
                    .map_err(|_| ArgsError::InvalidValue("port", value))?;
            }
            Short('c') | Long("config") => {
                result.config = Some(parser.value()?.parse()?);
            }
            Short('i') | Long("report-interval") => {
                let value: String = parser.value()?.parse()?;
                result.report_interval_ms = Some(
                    value
                        .parse()
                        .map_err(|_| ArgsError::InvalidValue("report-interval", value))?,
                );
            }
            Short('l') | Long("log-level") => {
                result.log_level = Some(parser.value()?.parse()?);
            }
            Value(val) => {
                return Err(ArgsError::UnexpectedArgument(val.to_string_lossy().into()));
            }
            _ => return Err(arg.unexpected().into()),
        }
    }

    Ok(result)
}

/// Print help message.
pub fn print_help() {
    let version = env!("CARGO_PKG_VERSION");
    println!(
        r#"uwb-bridge {version}
Ranging session registry with an HTTP control surface

USAGE:
    uwb-bridge [OPTIONS]

OPTIONS:
    -H, --host <ADDR>              Host address to bind [default: 127.0.0.1]
    -p, --port <PORT>              Port to listen on [default: 3000]
    -c, --config <FILE>            Path to configuration file (JSON)
    -i, --report-interval <MS>     Simulated ranging report interval in ms
    -l, --log-level <LVL>          Log level (error, warn, info, debug, trace)
    -h, --help                     Print help
    -V, --version                  Print version

ENVIRONMENT VARIABLES:
    UWB_BRIDGE_HOST        Host address (overrides config)
    UWB_BRIDGE_PORT        Port number (overrides config)
    UWB_BRIDGE_LOG_LEVEL   Log level (overrides config)
    RUST_LOG               Alternative log level setting

EXAMPLES:
    # Start with defaults (localhost:3000, empty simulated backend)
    uwb-bridge

    # Start on all interfaces
    uwb-bridge -H 0.0.0.0 -p 8080

    # Start with a config file describing simulated peers
    uwb-bridge -c /etc/uwb-bridge/config.json

    # Faster simulated ranging rounds
    uwb-bridge -i 50
"#
    );
}

/// Print version.
pub fn print_version() {
    println!("uwb-bridge {}", env!("CARGO_PKG_VERSION"));
}

/// Argument parsing errors.
#[derive(Debug)]
pub enum ArgsError {
    /// Lexopt parsing error.
    Lexopt(lexopt::Error),
    /// Invalid argument value.
    InvalidValue(&'static str, String),
    /// Unexpected positional argument.
    UnexpectedArgument(String),
}

impl std::fmt::Display for ArgsError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Lexopt(e) => write!(f, "{}", e),
            Self::InvalidValue(name, value) => {
                write!(f, "invalid value for --{}: '{}'", name, value)
            }
            Self::UnexpectedArgument(arg) => {
                write!(f, "unexpected argument: '{}'", arg)
            }
        }
    }
}

impl std::error::Error for ArgsError {}

impl From<lexopt::Error> for ArgsError {
    fn from(e: lexopt::Error) -> Self {
        Self::Lexopt(e)
    }
}
