//! # Configuration
//!
//! Client settings, loaded from an optional TOML file and then overridden
//! by command-line flags. Every key has a default, so an empty file (or no
//! file at all) gives the stock behavior: model `inception`, signature
//! `serving_default`, a 10 second deadline.
//!
//! ```toml
//! [server]
//! address = "localhost:9000"
//! connect_timeout_secs = 5
//!
//! [model]
//! name = "inception"
//! signature_name = "serving_default"
//! # version = 1
//!
//! [request]
//! image = "cat.jpg"
//! timeout_secs = 10
//!
//! [output]
//! format = "text"
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

use super::error::{ClientError, Result};
use crate::client::output::OutputFormat;

/// Default PredictionService address.
pub const DEFAULT_SERVER: &str = "localhost:9000";

/// Model the requests are addressed to.
pub const DEFAULT_MODEL_NAME: &str = "inception";

/// `tf.saved_model.signature_constants.DEFAULT_SERVING_SIGNATURE_DEF_KEY`
pub const DEFAULT_SERVING_SIGNATURE_DEF_KEY: &str = "serving_default";

/// Deadline for the `Predict` call.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(5);

/// Load a TOML configuration file and deserialize it into the specified type.
///
/// # Example
/// ```ignore
/// let config: ClientConfig = load_config("config/client.toml")?;
/// ```
pub fn load_config<T>(path: impl AsRef<Path>) -> Result<T>
where
    T: for<'de> Deserialize<'de>,
{
    let path = path.as_ref();
    let config_error = |source: Box<dyn std::error::Error + Send + Sync>| ClientError::Config {
        path: path.to_path_buf(),
        source,
    };
    let content = fs::read_to_string(path).map_err(|e| config_error(e.into()))?;
    toml::from_str(&content).map_err(|e| config_error(e.into()))
}

/// Complete configuration for one invocation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ClientConfig {
    pub server: ServerConfig,
    pub model: ModelConfig,
    pub request: RequestConfig,
    pub output: OutputConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ServerConfig {
    /// `host:port` of the PredictionService
    pub address: String,
    /// Seconds to wait for the channel to come up. Fractions are allowed.
    pub connect_timeout_secs: f64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            address: DEFAULT_SERVER.to_string(),
            connect_timeout_secs: DEFAULT_CONNECT_TIMEOUT.as_secs_f64(),
        }
    }
}

/// Which model, version and signature to address.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ModelConfig {
    pub name: String,
    pub signature_name: String,
    /// Pin a model version. `None` lets the server pick the latest.
    pub version: Option<i64>,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            name: DEFAULT_MODEL_NAME.to_string(),
            signature_name: DEFAULT_SERVING_SIGNATURE_DEF_KEY.to_string(),
            version: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RequestConfig {
    /// Path to the JPEG to classify
    pub image: PathBuf,
    /// Deadline of the `Predict` call in seconds. Fractions are allowed.
    pub timeout_secs: f64,
}

impl Default for RequestConfig {
    fn default() -> Self {
        Self {
            image: PathBuf::new(),
            timeout_secs: DEFAULT_TIMEOUT.as_secs_f64(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct OutputConfig {
    pub format: OutputFormat,
}

impl ClientConfig {
    /// Loads client configuration from a TOML file and validates it.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let config: Self = load_config(path)?;
        config.validate()?;
        Ok(config)
    }

    /// Rejects timeouts that are not a positive, finite number of seconds.
    pub fn validate(&self) -> Result<()> {
        for (key, secs) in [
            ("server.connect_timeout_secs", self.server.connect_timeout_secs),
            ("request.timeout_secs", self.request.timeout_secs),
        ] {
            if Duration::try_from_secs_f64(secs).map_or(true, |d| d.is_zero()) {
                return Err(ClientError::InvalidConfig(format!(
                    "{} must be a positive number of seconds, got {}",
                    key, secs
                )));
            }
        }
        Ok(())
    }

    pub fn with_server(mut self, address: impl Into<String>) -> Self {
        self.server.address = address.into();
        self
    }

    pub fn with_image(mut self, image: impl Into<PathBuf>) -> Self {
        self.request.image = image.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.request.timeout_secs = timeout.as_secs_f64();
        self
    }

    pub fn with_format(mut self, format: OutputFormat) -> Self {
        self.output.format = format;
        self
    }

    pub fn timeout(&self) -> Duration {
        Duration::try_from_secs_f64(self.request.timeout_secs).unwrap_or(DEFAULT_TIMEOUT)
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::try_from_secs_f64(self.server.connect_timeout_secs).unwrap_or(DEFAULT_CONNECT_TIMEOUT)
    }

    /// Parses `server.address`.
    pub fn server_address(&self) -> Result<ServerAddress> {
        self.server.address.parse()
    }
}

/// A validated `host:port` pair.
///
/// IPv6 literals must be bracketed: `[::1]:9000`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerAddress {
    pub host: String,
    pub port: u16,
}

impl ServerAddress {
    /// URI handed to the gRPC transport, e.g. `http://localhost:9000`.
    pub fn endpoint_uri(&self) -> String {
        format!("http://{}", self)
    }
}

impl fmt::Display for ServerAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.host.contains(':') {
            write!(f, "[{}]:{}", self.host, self.port)
        } else {
            write!(f, "{}:{}", self.host, self.port)
        }
    }
}

impl FromStr for ServerAddress {
    type Err = ClientError;

    fn from_str(s: &str) -> Result<Self> {
        let invalid = |reason: &str| ClientError::InvalidAddress {
            address: s.to_string(),
            reason: reason.to_string(),
        };

        let (host, port) = s.rsplit_once(':').ok_or_else(|| invalid("expected host:port"))?;

        let host = match host.strip_prefix('[') {
            Some(rest) => rest
                .strip_suffix(']')
                .ok_or_else(|| invalid("unterminated '[' in host"))?,
            None if host.contains(':') => return Err(invalid("IPv6 hosts must be bracketed")),
            None => host,
        };
        if host.is_empty() {
            return Err(invalid("empty host"));
        }

        let port: u16 = port.parse().map_err(|_| invalid("port must be a number in 0-65535"))?;
        if port == 0 {
            return Err(invalid("port must be non-zero"));
        }

        Ok(Self {
            host: host.to_string(),
            port,
        })
    }
}
