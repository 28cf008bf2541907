//! Layered CLI settings: flag, then environment (both via clap), then the
//! JSON config file, then built-in defaults.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use lenframe_frame::HeaderKind;
use serde::Deserialize;
use tracing::info;

use crate::exit::{io_error, CliError, CliResult, DATA_INVALID, USAGE};

pub const DEFAULT_PORT: u16 = 8080;
pub const DEFAULT_HEADER_WIDTH: u64 = 2;
pub const DEFAULT_HOST: &str = "localhost";
pub const CONFIG_FILE_NAME: &str = ".lenframe.json";

/// Values from the global flags; `None` means neither flag nor env var was set.
#[derive(Debug, Default)]
pub struct GlobalOverrides {
    pub port: Option<u16>,
    pub header: Option<u64>,
    pub echo: bool,
    pub config: Option<PathBuf>,
}

/// Contents of the optional config file. Every key may be omitted.
#[derive(Debug, Default, Deserialize, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct FileConfig {
    pub port: Option<u16>,
    pub header: Option<u64>,
    pub echo: Option<bool>,
    pub host: Option<String>,
    pub ip: Option<String>,
}

impl FileConfig {
    pub fn load(path: &Path) -> CliResult<Self> {
        let text = fs::read_to_string(path).map_err(|err| {
            io_error(&format!("failed reading config {}", path.display()), err)
        })?;
        serde_json::from_str(&text).map_err(|err| {
            CliError::new(
                DATA_INVALID,
                format!("invalid config {}: {err}", path.display()),
            )
        })
    }

    /// Load `explicit` if given, else `$HOME/.lenframe.json` when it exists.
    pub fn discover(explicit: Option<&Path>) -> CliResult<Self> {
        let path = match explicit {
            Some(path) => path.to_path_buf(),
            None => match home_config_path() {
                Some(path) if path.is_file() => path,
                _ => return Ok(Self::default()),
            },
        };

        let config = Self::load(&path)?;
        info!("Using config file: {}", path.display());
        Ok(config)
    }
}

fn home_config_path() -> Option<PathBuf> {
    std::env::var_os("HOME")
        .filter(|home| !home.is_empty())
        .map(|home| PathBuf::from(home).join(CONFIG_FILE_NAME))
}

/// Settings shared by both subcommands after all layers are merged.
#[derive(Debug)]
pub struct Settings {
    pub port: u16,
    pub header_width: u64,
    pub echo: bool,
    pub file: FileConfig,
}

impl Settings {
    pub fn resolve(overrides: GlobalOverrides) -> CliResult<Self> {
        let file = FileConfig::discover(overrides.config.as_deref())?;
        Ok(Self::merge(overrides, file))
    }

    fn merge(overrides: GlobalOverrides, file: FileConfig) -> Self {
        Self {
            port: overrides.port.or(file.port).unwrap_or(DEFAULT_PORT),
            header_width: overrides
                .header
                .or(file.header)
                .unwrap_or(DEFAULT_HEADER_WIDTH),
            echo: overrides.echo || file.echo.unwrap_or(false),
            file,
        }
    }

    /// The configured header kind; unsupported widths are a usage error.
    pub fn header(&self) -> CliResult<HeaderKind> {
        match HeaderKind::from_width(self.header_width) {
            HeaderKind::Unknown => Err(CliError::new(
                USAGE,
                format!(
                    "Unknown header type ({})\n\nCurrently only 2 and 4 are supported.",
                    self.header_width
                ),
            )),
            known => Ok(known),
        }
    }
}

/// Join a host and port, bracketing bare IPv6 literals. An empty host binds
/// every interface.
pub fn socket_addr(host: &str, port: u16) -> String {
    if host.is_empty() {
        format!("0.0.0.0:{port}")
    } else if host.contains(':') && !host.starts_with('[') {
        format!("[{host}]:{port}")
    } else {
        format!("{host}:{port}")
    }
}

/// Parse `500ms`, `5s`, or a bare number of seconds.
pub fn parse_duration(input: &str) -> CliResult<Duration> {
    let input = input.trim();
    if input.is_empty() {
        return Err(CliError::new(USAGE, "duration must not be empty"));
    }

    let (number, millis) = match input.strip_suffix("ms") {
        Some(number) => (number, true),
        None => (input.strip_suffix('s').unwrap_or(input), false),
    };

    let value: u64 = number
        .trim()
        .parse()
        .map_err(|_| CliError::new(USAGE, format!("invalid duration value: {input}")))?;

    if value == 0 {
        return Err(CliError::new(USAGE, "duration must be greater than zero"));
    }

    Ok(if millis {
        Duration::from_millis(value)
    } else {
        Duration::from_secs(value)
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flag_beats_file_beats_default() {
        let file = FileConfig {
            port: Some(9000),
            header: Some(4),
            ..FileConfig::default()
        };
        let overrides = GlobalOverrides {
            port: Some(7000),
            ..GlobalOverrides::default()
        };

        let settings = Settings::merge(overrides, file);
        assert_eq!(settings.port, 7000);
        assert_eq!(settings.header_width, 4);
        assert!(!settings.echo);
    }

    #[test]
    fn defaults_without_any_source() {
        let settings = Settings::merge(GlobalOverrides::default(), FileConfig::default());
        assert_eq!(settings.port, DEFAULT_PORT);
        assert_eq!(settings.header().unwrap(), HeaderKind::TwoByteUnsigned);
    }

    #[test]
    fn file_can_enable_echo() {
        let file = FileConfig {
            echo: Some(true),
            ..FileConfig::default()
        };
        assert!(Settings::merge(GlobalOverrides::default(), file).echo);
    }

    #[test]
    fn unknown_header_is_usage_error() {
        let overrides = GlobalOverrides {
            header: Some(3),
            ..GlobalOverrides::default()
        };
        let err = Settings::merge(overrides, FileConfig::default())
            .header()
            .unwrap_err();
        assert_eq!(err.code, USAGE);
        assert!(err.message.starts_with("Unknown header type (3)"));
        assert!(err.message.ends_with("Currently only 2 and 4 are supported."));
    }

    #[test]
    fn parses_file_config() {
        let parsed: FileConfig =
            serde_json::from_str(r#"{"port": 9001, "host": "10.0.0.5", "echo": true}"#).unwrap();
        assert_eq!(parsed.port, Some(9001));
        assert_eq!(parsed.host.as_deref(), Some("10.0.0.5"));
        assert_eq!(parsed.echo, Some(true));
        assert!(parsed.header.is_none());
    }

    #[test]
    fn rejects_unknown_file_keys() {
        assert!(serde_json::from_str::<FileConfig>(r#"{"prot": 1}"#).is_err());
    }

    #[test]
    fn missing_explicit_config_is_an_error() {
        let err = FileConfig::discover(Some(Path::new("/nonexistent/lenframe.json"))).unwrap_err();
        assert!(err.message.contains("failed reading config"));
    }

    #[test]
    fn socket_addr_forms() {
        assert_eq!(socket_addr("", 8080), "0.0.0.0:8080");
        assert_eq!(socket_addr("localhost", 1), "localhost:1");
        assert_eq!(socket_addr("::1", 8080), "[::1]:8080");
        assert_eq!(socket_addr("[::1]", 8080), "[::1]:8080");
    }

    #[test]
    fn parse_duration_units() {
        assert_eq!(parse_duration("60s").unwrap(), Duration::from_secs(60));
        assert_eq!(parse_duration("250ms").unwrap(), Duration::from_millis(250));
        assert_eq!(parse_duration("3").unwrap(), Duration::from_secs(3));
        assert_eq!(parse_duration("0s").unwrap_err().code, USAGE);
        assert_eq!(parse_duration("soon").unwrap_err().code, USAGE);
    }
}
