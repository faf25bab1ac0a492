//! Configuration for the echoline binary.
//!
//! Supports both command-line arguments and a TOML configuration file.
//! CLI arguments take precedence over config file values.

use clap::{Parser, Subcommand};
use serde::Deserialize;
use std::path::PathBuf;
use thiserror::Error;

/// Command-line arguments.
#[derive(Parser, Debug)]
#[command(name = "echoline")]
#[command(version = "0.1.0")]
#[command(about = "A line-oriented TCP echo client/server toolkit", long_about = None)]
pub struct CliArgs {
    /// Path to TOML configuration file
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "info")]
    pub log_level: String,

    #[command(subcommand)]
    pub command: CliCommand,
}

/// The two driver modes.
#[derive(Subcommand, Debug)]
pub enum CliCommand {
    /// Connect to an echo server and copy stdin lines to it
    Connect {
        /// Host to connect to
        #[arg(long)]
        host: Option<String>,

        /// Numeric port to connect to
        #[arg(short, long)]
        port: Option<String>,

        /// Set TCP_NODELAY on the connection
        #[arg(long)]
        nodelay: bool,

        /// Maximum line length in bytes
        #[arg(long)]
        max_line: Option<usize>,
    },

    /// Run an iterative echo server
    Serve {
        /// Numeric port to listen on
        #[arg(short, long)]
        port: Option<String>,

        /// Maximum line length in bytes
        #[arg(long)]
        max_line: Option<usize>,
    },
}

/// TOML configuration file structure.
#[derive(Debug, Deserialize, Default)]
pub struct TomlConfig {
    #[serde(default)]
    pub client: ClientConfig,
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub io: IoConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Client-mode configuration.
#[derive(Debug, Deserialize)]
pub struct ClientConfig {
    /// Host to connect to
    #[serde(default = "default_host")]
    pub host: String,
    /// Numeric port to connect to
    #[serde(default = "default_port")]
    pub port: String,
    /// Set TCP_NODELAY on the connection
    #[serde(default)]
    pub nodelay: bool,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            nodelay: false,
        }
    }
}

/// Server-mode configuration.
#[derive(Debug, Deserialize)]
pub struct ServerConfig {
    /// Numeric port to listen on
    #[serde(default = "default_port")]
    pub port: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: default_port(),
        }
    }
}

/// Line I/O configuration.
#[derive(Debug, Deserialize)]
pub struct IoConfig {
    /// Maximum line length in bytes
    #[serde(default = "default_max_line")]
    pub max_line: usize,
}

impl Default for IoConfig {
    fn default() -> Self {
        Self {
            max_line: default_max_line(),
        }
    }
}

/// Logging configuration.
#[derive(Debug, Deserialize)]
pub struct LoggingConfig {
    /// Log level
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

fn default_host() -> String {
    "localhost".to_string()
}

fn default_port() -> String {
    "9000".to_string()
}

fn default_max_line() -> usize {
    8192
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Which driver to run, with its resolved parameters.
#[derive(Debug, Clone)]
pub enum Mode {
    Client {
        host: String,
        service: String,
        nodelay: bool,
    },
    Server {
        service: String,
    },
}

/// Final resolved configuration.
#[derive(Debug, Clone)]
pub struct Config {
    pub mode: Mode,
    pub max_line: usize,
    pub log_level: String,
}

impl Config {
    /// Load configuration from CLI args and optional TOML file.
    /// CLI arguments take precedence over TOML file values.
    pub fn load() -> Result<Self, ConfigError> {
        let cli = CliArgs::parse();

        let toml_config = if let Some(ref config_path) = cli.config {
            let contents = std::fs::read_to_string(config_path)
                .map_err(|e| ConfigError::FileRead(config_path.clone(), e))?;
            toml::from_str(&contents)
                .map_err(|e| ConfigError::TomlParse(config_path.clone(), e))?
        } else {
            TomlConfig::default()
        };

        Ok(Self::resolve(cli, toml_config))
    }

    /// Merge CLI args with TOML config (CLI takes precedence).
    pub fn resolve(cli: CliArgs, toml_config: TomlConfig) -> Self {
        let log_level = if cli.log_level != "info" {
            cli.log_level
        } else {
            toml_config.logging.level
        };

        let (mode, max_line) = match cli.command {
            CliCommand::Connect {
                host,
                port,
                nodelay,
                max_line,
            } => (
                Mode::Client {
                    host: host.unwrap_or(toml_config.client.host),
                    service: port.unwrap_or(toml_config.client.port),
                    nodelay: nodelay || toml_config.client.nodelay,
                },
                max_line.unwrap_or(toml_config.io.max_line),
            ),
            CliCommand::Serve { port, max_line } => (
                Mode::Server {
                    service: port.unwrap_or(toml_config.server.port),
                },
                max_line.unwrap_or(toml_config.io.max_line),
            ),
        };

        Config {
            mode,
            max_line,
            log_level,
        }
    }
}

/// Configuration loading errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file '{}': {1}", .0.display())]
    FileRead(PathBuf, #[source] std::io::Error),
    #[error("failed to parse config file '{}': {1}", .0.display())]
    TomlParse(PathBuf, #[source] toml::de::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = TomlConfig::default();
        assert_eq!(config.client.host, "localhost");
        assert_eq!(config.client.port, "9000");
        assert!(!config.client.nodelay);
        assert_eq!(config.server.port, "9000");
        assert_eq!(config.io.max_line, 8192);
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn test_toml_parsing() {
        let toml_str = r#"
            [client]
            host = "echo.example.com"
            port = "7"
            nodelay = true

            [server]
            port = "7070"

            [io]
            max_line = 4096

            [logging]
            level = "debug"
        "#;

        let config: TomlConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.client.host, "echo.example.com");
        assert_eq!(config.client.port, "7");
        assert!(config.client.nodelay);
        assert_eq!(config.server.port, "7070");
        assert_eq!(config.io.max_line, 4096);
        assert_eq!(config.logging.level, "debug");
    }

    #[test]
    fn test_cli_overrides_toml() {
        let cli =
            CliArgs::try_parse_from(["echoline", "connect", "--host", "other", "--nodelay"])
                .unwrap();
        let toml_config: TomlConfig = toml::from_str(
            r#"
            [client]
            host = "from-file"
            port = "7001"

            [io]
            max_line = 2048
        "#,
        )
        .unwrap();

        let config = Config::resolve(cli, toml_config);
        match config.mode {
            Mode::Client {
                host,
                service,
                nodelay,
            } => {
                assert_eq!(host, "other");
                assert_eq!(service, "7001"); // from file, no CLI override
                assert!(nodelay);
            }
            other => panic!("unexpected mode: {other:?}"),
        }
        assert_eq!(config.max_line, 2048);
    }

    #[test]
    fn test_serve_mode_defaults() {
        let cli = CliArgs::try_parse_from(["echoline", "serve"]).unwrap();
        let config = Config::resolve(cli, TomlConfig::default());
        match config.mode {
            Mode::Server { service } => assert_eq!(service, "9000"),
            other => panic!("unexpected mode: {other:?}"),
        }
        assert_eq!(config.max_line, 8192);
        assert_eq!(config.log_level, "info");
    }
}
