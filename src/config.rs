/// Defines the configuration file format for Earmark.
use std::{
    fmt::Display,
    net::{IpAddr, Ipv4Addr, SocketAddr},
    path::PathBuf,
    time::Duration,
};

use serde::{Deserialize, Serialize};
use url::Url;

use crate::Error;

const DEFAULT_TABLE: &str = "audio_clips";

#[derive(Serialize, Deserialize, Debug, Clone, Default)]
pub struct Config {
    /// Connection details for the hosted clip store
    #[serde(default)]
    pub store: Store,
    /// The HTTP server configution options
    #[serde(default)]
    pub http_api: HttpApi,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct Store {
    /// Base URL of the hosted database; the REST endpoint lives under `/rest/v1/`.
    pub url: Option<Url>,
    /// The API key sent with every request to the store.
    pub api_key: Option<String>,
    /// The table holding the clips.
    #[serde(default = "default_table")]
    pub table: String,
    /// Seconds to wait for the store before giving up on a request.
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
}

fn default_table() -> String {
    DEFAULT_TABLE.to_string()
}

fn default_timeout() -> u64 {
    30
}

impl Store {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// The connection parameters the store can't do without.
    ///
    /// Both must be present when the server talks to a real store.
    pub fn connection(&self) -> Result<(Url, String), Error> {
        match (&self.url, &self.api_key) {
            (Some(url), Some(key)) if !key.is_empty() => Ok((url.clone(), key.clone())),
            (None, _) => Err(Error::ConfigValueError(
                "the store URL must be set ('store.url' or EARMARK_STORE_URL)".into(),
            )),
            _ => Err(Error::ConfigValueError(
                "the store API key must be set ('store.api_key' or EARMARK_STORE_API_KEY)".into(),
            )),
        }
    }
}

impl Default for Store {
    fn default() -> Self {
        Store {
            url: None,
            api_key: None,
            table: default_table(),
            timeout_secs: default_timeout(),
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct HttpApi {
    /// The address the HTTP API listens on.
    pub url: SocketAddr,
    /// The path to an x509 certificate the server should use for HTTPS.
    pub tls_certificate: Option<PathBuf>,
    /// The path to the key for the given certificate.
    pub tls_key: Option<PathBuf>,
}

impl Default for HttpApi {
    fn default() -> Self {
        HttpApi {
            url: SocketAddr::new(IpAddr::V4(Ipv4Addr::new(127, 0, 0, 1)), 8080),
            tls_certificate: None,
            tls_key: None,
        }
    }
}

impl Display for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}",
            toml::ser::to_string_pretty(&self).unwrap_or_default()
        )
    }
}

/// Load a [`Config`] instance from the given path.
pub fn load_config(path: &str) -> Result<Config, Error> {
    let path = PathBuf::from(path);
    let config_string = std::fs::read_to_string(path)?;
    let config: Config = toml::from_str(&config_string).map_err(|err| {
        println!("Example config format:\n\n{}", example());
        err
    })?;
    Ok(config)
}

fn example() -> Config {
    Config {
        store: Store {
            url: Url::parse("https://your-project.example.co").ok(),
            api_key: Some("your-anon-key".to_string()),
            ..Default::default()
        },
        http_api: Default::default(),
    }
}
