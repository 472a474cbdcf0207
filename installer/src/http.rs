//! Shared HTTP plumbing for catalog and archive requests.
//!
//! Both the crawler and the release downloader issue plain GET requests
//! through `ureq`. Non-success statuses surface as `ureq::Error::StatusCode`
//! and are kept apart from transport failures so callers can report the
//! status code.

use std::time::Duration;

/// Build an agent whose global timeout bounds connect, headers, and body.
pub(crate) fn agent(timeout: Duration) -> ureq::Agent {
    let config = ureq::Agent::config_builder()
        .timeout_global(Some(timeout))
        .build();
    ureq::Agent::new_with_config(config)
}

/// A failed GET, split by cause.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Failure {
    /// The server answered with a non-success status.
    Status(u16),
    /// The request never produced a response.
    Transport(String),
}

impl From<&ureq::Error> for Failure {
    fn from(err: &ureq::Error) -> Self {
        match err {
            ureq::Error::StatusCode(status) => Self::Status(*status),
            other => Self::Transport(other.to_string()),
        }
    }
}

/// Whether a status is worth retrying later.
pub(crate) const fn is_retriable_status(status: u16) -> bool {
    status >= 500 || status == 429
}
