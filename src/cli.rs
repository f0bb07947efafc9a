// SPDX-License-Identifier: GPL-2.0-or-later
use clap::{Parser, Subcommand, ValueEnum};
use url::Url;

use crate::config::{load_config, Config};

/// Serve the Earmark clip API.
///
/// # Logging
///
/// Log levels and filtering are controlled by tracing_subscriber's EnvFilter using the RUST_LOG
/// environment variable. Refer to the documentation at
/// https://docs.rs/tracing-subscriber/0.3.1/tracing_subscriber/filter/struct.EnvFilter.html
/// for complete details.
///
/// The most basic form is one of "trace", "debug", "info", "warn", or "error". For example:
///
/// RUST_LOG=warn
///
/// # Configuration
///
/// The configuration file is expected to be in TOML format; see earmark.toml.example. The store
/// connection parameters may also be given on the command line or through the environment, in
/// which case they take precedence over the file.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Earmark {
    /// Path to the Earmark configuration file
    #[arg(short, long, value_parser = load_config, env = "EARMARK_CONFIG")]
    pub config: Option<Config>,
    /// Base URL of the hosted clip store
    #[arg(long, env = "EARMARK_STORE_URL")]
    pub store_url: Option<Url>,
    /// API key for the hosted clip store
    #[arg(long, env = "EARMARK_STORE_API_KEY", hide_env_values = true)]
    pub store_api_key: Option<String>,
    #[command(subcommand)]
    pub command: Command,
}

impl Earmark {
    /// The effective configuration, with command-line store settings layered over the file.
    pub fn config(&self) -> Config {
        let mut config = self.config.clone().unwrap_or_default();
        if let Some(url) = &self.store_url {
            config.store.url = Some(url.clone());
        }
        if let Some(key) = &self.store_api_key {
            config.store.api_key = Some(key.clone());
        }
        config
    }
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run the HTTP API
    Run {
        #[arg(
            short,
            long,
            value_enum,
            ignore_case = true,
            default_value_t,
            env = "EARMARK_BACKEND"
        )]
        backend: Backend,
    },
    /// Check that the clip store is reachable and report how many clips it holds
    Check {},
}

/// Where clips are kept.
#[derive(ValueEnum, Clone, Debug, Default, PartialEq, Eq)]
pub enum Backend {
    /// The hosted store configured under `[store]`
    #[default]
    Postgrest,
    /// An in-process store that forgets everything on exit; useful for development
    Memory,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_store_flags_override_file() {
        let opts = Earmark::try_parse_from([
            "earmark-server",
            "--store-url",
            "https://abc.example.co",
            "--store-api-key",
            "secret",
            "run",
        ])
        .unwrap();
        let config = opts.config();
        let (url, key) = config.store.connection().unwrap();
        assert_eq!(url.host_str(), Some("abc.example.co"));
        assert_eq!(key, "secret");
        assert!(matches!(
            opts.command,
            Command::Run {
                backend: Backend::Postgrest
            }
        ));
    }

    #[test]
    fn test_memory_backend() {
        let opts =
            Earmark::try_parse_from(["earmark-server", "run", "--backend", "memory"]).unwrap();
        assert!(matches!(
            opts.command,
            Command::Run {
                backend: Backend::Memory
            }
        ));
    }
}
