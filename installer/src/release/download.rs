//! Release archive download.
//!
//! Provides a trait-based abstraction for fetching a release's source
//! archive to local storage, enabling dependency injection for testing.
//! Downloading only retrieves bytes; checksum verification belongs to
//! [`super::extraction`].

use std::fs::File;
use std::io::{self, Read, Write};
use std::path::Path;
use std::time::Duration;

use log::{debug, info};

use super::record::{ArchiveHandle, ReleaseRecord};
use crate::http::{self, Failure};

/// Trait for downloading release archives.
///
/// # Examples
///
/// ```
/// use goenv::release::download::HttpReleaseDownloader;
/// use std::time::Duration;
///
/// let downloader = HttpReleaseDownloader::new("https://go.dev", Duration::from_secs(300));
/// // Use downloader.download(&record, dest_dir) in production
/// # let _ = downloader;
/// ```
#[cfg_attr(test, mockall::automock)]
pub trait ReleaseDownloader {
    /// Download the archive for `record` into `destination_dir`.
    ///
    /// The file is named `<version>.src.tar.gz`; an existing file of that
    /// name is truncated.
    ///
    /// # Errors
    ///
    /// Returns [`FetchError::UnexpectedStatus`] for a non-success response,
    /// [`FetchError::Transport`] when no response arrives, and
    /// [`FetchError::Io`] when the local file cannot be written.
    fn download(
        &self,
        record: &ReleaseRecord,
        destination_dir: &Path,
    ) -> Result<ArchiveHandle, FetchError>;
}

/// Errors arising from archive downloads.
#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    /// The server answered with a non-success status.
    #[error("download of {url} failed with HTTP status {status}")]
    UnexpectedStatus {
        /// The URL that was requested.
        url: String,
        /// The HTTP status code.
        status: u16,
    },

    /// The request or body transfer failed.
    #[error("download of {url} failed: {reason}")]
    Transport {
        /// The URL that was requested.
        url: String,
        /// A human-readable description of the failure.
        reason: String,
    },

    /// I/O error writing the downloaded file.
    #[error("I/O error writing download: {0}")]
    Io(#[from] io::Error),
}

impl FetchError {
    /// Whether repeating the download may succeed.
    ///
    /// Transport failures and server-side statuses are retriable; client
    /// errors and local I/O failures are not.
    #[must_use]
    pub const fn is_retriable(&self) -> bool {
        match self {
            Self::UnexpectedStatus { status, .. } => http::is_retriable_status(*status),
            Self::Transport { .. } => true,
            Self::Io(_) => false,
        }
    }
}

/// HTTP-based downloader using `ureq`.
pub struct HttpReleaseDownloader {
    origin: String,
    agent: ureq::Agent,
}

impl HttpReleaseDownloader {
    /// Create a downloader resolving record paths against `origin`.
    #[must_use]
    pub fn new(origin: &str, timeout: Duration) -> Self {
        Self {
            origin: origin.to_owned(),
            agent: http::agent(timeout),
        }
    }
}

impl ReleaseDownloader for HttpReleaseDownloader {
    fn download(
        &self,
        record: &ReleaseRecord,
        destination_dir: &Path,
    ) -> Result<ArchiveHandle, FetchError> {
        let url = record.download_url(&self.origin);
        info!("downloading {} from {url}", record.version());

        let response = self
            .agent
            .get(&url)
            .call()
            .map_err(|err| map_failure(&url, &err))?;

        let dest = destination_dir.join(record.archive_filename());
        let mut file = File::create(&dest)?;
        let body = response.into_body().into_reader();
        let written = copy_body(body, &mut file).map_err(|failure| match failure {
            CopyFailure::Read(err) => FetchError::Transport {
                url: url.clone(),
                reason: err.to_string(),
            },
            CopyFailure::Write(err) => FetchError::Io(err),
        })?;
        file.sync_all()?;
        debug!(
            "wrote {written} bytes to {} (catalog declared {})",
            dest.display(),
            record.size()
        );

        Ok(ArchiveHandle::new(dest, record.clone()))
    }
}

/// Which side of a body copy failed.
#[derive(Debug)]
enum CopyFailure {
    Read(io::Error),
    Write(io::Error),
}

/// Reader that remembers whether one of its reads failed.
struct TrackedReader<R> {
    inner: R,
    failed: bool,
}

impl<R: Read> Read for TrackedReader<R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.inner.read(buf).inspect_err(|err| {
            if err.kind() != io::ErrorKind::Interrupted {
                self.failed = true;
            }
        })
    }
}

/// Stream `body` into `file`.
///
/// A failed read is a network failure while a failed write is local I/O, so
/// the two are reported apart.
fn copy_body(body: impl Read, file: &mut impl Write) -> Result<u64, CopyFailure> {
    let mut reader = TrackedReader {
        inner: body,
        failed: false,
    };
    io::copy(&mut reader, file).map_err(|err| {
        if reader.failed {
            CopyFailure::Read(err)
        } else {
            CopyFailure::Write(err)
        }
    })
}

/// Map a ureq error to a [`FetchError`].
fn map_failure(url: &str, err: &ureq::Error) -> FetchError {
    match Failure::from(err) {
        Failure::Status(status) => FetchError::UnexpectedStatus {
            url: url.to_owned(),
            status,
        },
        Failure::Transport(reason) => FetchError::Transport {
            url: url.to_owned(),
            reason,
        },
    }
}
