//! Error types for the goenv CLI.
//!
//! Component errors convert into [`InstallerError`] so commands can use `?`
//! throughout; only the binary turns them into exit codes.

use camino::Utf8PathBuf;
use thiserror::Error;

use crate::catalog::CrawlError;
use crate::config::ConfigError;
use crate::release::download::FetchError;
use crate::release::extraction::ExtractError;
use crate::version::ParseError;

/// Errors that can occur while running a goenv command.
#[derive(Debug, Error)]
pub enum InstallerError {
    /// Configuration could not be loaded.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// The release catalog could not be fetched or parsed.
    #[error(transparent)]
    Catalog(#[from] CrawlError),

    /// A release archive could not be downloaded.
    #[error(transparent)]
    Fetch(#[from] FetchError),

    /// A release archive could not be verified or unpacked.
    #[error(transparent)]
    Extract(#[from] ExtractError),

    /// A version named by `GOCMD` does not parse.
    #[error(transparent)]
    InvalidVersion(#[from] ParseError),

    /// Another goenv process holds the install lock.
    #[error("another goenv process is installing into this location (lock: {path})")]
    Locked {
        /// Path of the held lock file.
        path: Utf8PathBuf,
    },

    /// No release is installed under the goroot.
    #[error("no Go version is installed under {goroot}; run: goenv install")]
    NoInstalledVersion {
        /// The scanned goroot.
        goroot: Utf8PathBuf,
    },

    /// The version named by `GOCMD` is not installed.
    #[error("{version} is not installed; run: goenv install {version}")]
    VersionNotFound {
        /// The requested version text.
        version: String,
    },

    /// The catalog does not list the requested version.
    #[error("{version} is not listed in the release catalog")]
    ReleaseNotFound {
        /// The requested version text.
        version: String,
    },

    /// Every eligible catalog release is already installed.
    #[error("every available release is already installed")]
    NothingToInstall,

    /// The chosen release already has an installation directory.
    #[error("{version} is already installed at {path}")]
    AlreadyInstalled {
        /// The release version text.
        version: String,
        /// The existing installation directory.
        path: Utf8PathBuf,
    },

    /// A path that must be a directory is something else.
    #[error("{path} exists and is not a directory")]
    NotADirectory {
        /// The offending path.
        path: Utf8PathBuf,
    },

    /// The user declined the confirmation prompt.
    #[error("aborted")]
    Aborted,

    /// An I/O operation failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Failed to write output.
    #[error("failed to write output")]
    WriteFailed {
        /// The underlying error that caused the write to fail.
        #[source]
        source: std::io::Error,
    },
}

impl InstallerError {
    /// Whether running the same command again may succeed without changes.
    #[must_use]
    pub const fn is_retriable(&self) -> bool {
        match self {
            Self::Catalog(err) => err.is_retriable(),
            Self::Fetch(err) => err.is_retriable(),
            Self::Locked { .. } => true,
            _ => false,
        }
    }
}

/// Result type alias using [`InstallerError`].
pub type Result<T> = std::result::Result<T, InstallerError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn version_not_found_suggests_install_command() {
        let err = InstallerError::VersionNotFound {
            version: "go1.21.0".to_owned(),
        };
        let msg = err.to_string();
        assert!(msg.contains("goenv install go1.21.0"));
    }

    #[test]
    fn component_errors_are_shown_verbatim() {
        let err = InstallerError::from(ExtractError::PathTraversal {
            path: "../etc/passwd".to_owned(),
        });
        assert_eq!(err.to_string(), "path traversal detected: ../etc/passwd");
    }

    #[test]
    fn write_failed_preserves_source() {
        let err = InstallerError::WriteFailed {
            source: std::io::Error::other("broken pipe"),
        };
        assert!(err.to_string().contains("write"));
        assert!(std::error::Error::source(&err).is_some());
    }

    #[test]
    fn retriability_follows_the_component() {
        let transient = InstallerError::from(FetchError::Transport {
            url: "https://go.dev/dl/x".to_owned(),
            reason: "reset".to_owned(),
        });
        let permanent = InstallerError::from(ExtractError::ChecksumMismatch {
            expected: "aa".to_owned(),
            actual: "bb".to_owned(),
        });
        assert!(transient.is_retriable());
        assert!(!permanent.is_retriable());
        assert!(!InstallerError::Aborted.is_retriable());
    }
}
