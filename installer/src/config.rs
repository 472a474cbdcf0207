//! Runtime configuration loaded from the environment.
//!
//! | Variable             | Meaning                           | Default          |
//! |----------------------|-----------------------------------|------------------|
//! | `GOENV_LOCATION`     | Install root                      | `/usr/local/go`  |
//! | `GOCMD`              | Version the shim should run       | newest installed |
//! | `GOENV_ORIGIN`       | Catalog and download origin       | `https://go.dev` |
//! | `GOENV_TIMEOUT_SECS` | HTTP timeout for archive download | `300`            |
//!
//! Blank values count as unset.

use std::time::Duration;

use camino::{Utf8Path, Utf8PathBuf};
use thiserror::Error;

/// Variable naming the install root.
pub const LOCATION_VAR: &str = "GOENV_LOCATION";
/// Variable naming the version the shim runs.
pub const GOCMD_VAR: &str = "GOCMD";
/// Variable overriding the catalog origin.
pub const ORIGIN_VAR: &str = "GOENV_ORIGIN";
/// Variable overriding the download timeout in seconds.
pub const TIMEOUT_VAR: &str = "GOENV_TIMEOUT_SECS";

/// Default install root.
pub const DEFAULT_LOCATION: &str = "/usr/local/go";
/// Default catalog origin.
pub const DEFAULT_ORIGIN: &str = "https://go.dev";
/// Default download timeout.
pub const DEFAULT_DOWNLOAD_TIMEOUT: Duration = Duration::from_secs(300);

const BIN_DIR: &str = "bin";
const GOROOT_DIR: &str = "goroot";
const LOCK_FILE: &str = ".goenv.lock";

/// Errors raised while loading configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// The install root is not an absolute path.
    #[error("install location must be an absolute path, got \"{value}\"")]
    RelativeLocation {
        /// The rejected location.
        value: String,
    },

    /// The timeout is not a positive whole number of seconds.
    #[error("GOENV_TIMEOUT_SECS must be a positive number of seconds, got \"{value}\"")]
    InvalidTimeout {
        /// The rejected timeout text.
        value: String,
    },

    /// The host is not a Unix system.
    #[error("goenv supports Unix hosts only")]
    UnsupportedPlatform,
}

/// Resolved settings shared by every command.
///
/// # Examples
///
/// ```
/// use goenv::config::Config;
///
/// let config = Config::from_lookup(|name| match name {
///     "GOENV_LOCATION" => Some("/opt/go".to_owned()),
///     _ => None,
/// })?;
/// assert_eq!(config.goroot_dir(), "/opt/go/goroot");
/// assert_eq!(config.origin(), "https://go.dev");
/// # Ok::<(), goenv::config::ConfigError>(())
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    location: Utf8PathBuf,
    instructed_version: Option<String>,
    origin: String,
    download_timeout: Duration,
}

impl Config {
    /// Load configuration from the process environment.
    ///
    /// Variables that are not valid UTF-8 count as unset.
    ///
    /// # Errors
    ///
    /// See [`Config::from_lookup`].
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Load configuration through `lookup`, which maps a variable name to its
    /// value.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::UnsupportedPlatform`] on non-Unix hosts,
    /// [`ConfigError::RelativeLocation`] for a relative install root, and
    /// [`ConfigError::InvalidTimeout`] for a timeout that is not a positive
    /// integer.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        if !cfg!(unix) {
            return Err(ConfigError::UnsupportedPlatform);
        }
        let value = |name: &str| {
            lookup(name)
                .map(|raw| raw.trim().to_owned())
                .filter(|trimmed| !trimmed.is_empty())
        };

        let location = value(LOCATION_VAR).unwrap_or_else(|| DEFAULT_LOCATION.to_owned());
        let download_timeout = match value(TIMEOUT_VAR) {
            Some(raw) => parse_timeout(&raw)?,
            None => DEFAULT_DOWNLOAD_TIMEOUT,
        };
        let origin = value(ORIGIN_VAR)
            .map_or_else(|| DEFAULT_ORIGIN.to_owned(), |raw| raw.trim_end_matches('/').to_owned());

        Ok(Self {
            location: absolute_location(&location)?,
            instructed_version: value(GOCMD_VAR),
            origin,
            download_timeout,
        })
    }

    /// Replace the install root, e.g. from a command-line flag.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::RelativeLocation`] for a relative path.
    pub fn with_location(self, location: &Utf8Path) -> Result<Self, ConfigError> {
        Ok(Self {
            location: absolute_location(location.as_str())?,
            ..self
        })
    }

    /// Install root.
    #[must_use]
    pub fn location(&self) -> &Utf8Path {
        &self.location
    }

    /// Directory holding the `goenv` binary and tool symlinks.
    #[must_use]
    pub fn bin_dir(&self) -> Utf8PathBuf {
        self.location.join(BIN_DIR)
    }

    /// Directory holding one subdirectory per installed version.
    #[must_use]
    pub fn goroot_dir(&self) -> Utf8PathBuf {
        self.location.join(GOROOT_DIR)
    }

    /// Lock file serialising installs into this location.
    #[must_use]
    pub fn lock_path(&self) -> Utf8PathBuf {
        self.location.join(LOCK_FILE)
    }

    /// Version text from `GOCMD`, if set.
    #[must_use]
    pub fn instructed_version(&self) -> Option<&str> {
        self.instructed_version.as_deref()
    }

    /// Catalog and download origin, without a trailing slash.
    #[must_use]
    pub fn origin(&self) -> &str {
        &self.origin
    }

    /// Timeout for archive downloads.
    #[must_use]
    pub const fn download_timeout(&self) -> Duration {
        self.download_timeout
    }
}

fn absolute_location(value: &str) -> Result<Utf8PathBuf, ConfigError> {
    let path = Utf8PathBuf::from(value);
    if path.is_absolute() {
        Ok(path)
    } else {
        Err(ConfigError::RelativeLocation {
            value: value.to_owned(),
        })
    }
}

fn parse_timeout(raw: &str) -> Result<Duration, ConfigError> {
    match raw.parse::<u64>() {
        Ok(secs) if secs > 0 => Ok(Duration::from_secs(secs)),
        _ => Err(ConfigError::InvalidTimeout {
            value: raw.to_owned(),
        }),
    }
}
