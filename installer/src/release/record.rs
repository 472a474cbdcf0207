//! Release records and downloaded archive handles.

use std::io;
use std::path::{Path, PathBuf};

use super::sha256_digest::Sha256Digest;
use crate::version::Version;

/// Filename suffix of Go source archives.
pub const SOURCE_ARCHIVE_SUFFIX: &str = ".src.tar.gz";

/// One downloadable source release from the catalog.
///
/// Records are built by [`crate::catalog`] from a listing row and are not
/// modified afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReleaseRecord {
    version: Version,
    href: String,
    size: u64,
    sha256: Sha256Digest,
}

impl ReleaseRecord {
    /// Assemble a record from its parsed parts.
    #[must_use]
    pub const fn new(version: Version, href: String, size: u64, sha256: Sha256Digest) -> Self {
        Self {
            version,
            href,
            size,
            sha256,
        }
    }

    /// Release version.
    #[must_use]
    pub const fn version(&self) -> &Version {
        &self.version
    }

    /// Download path relative to the catalog origin.
    #[must_use]
    pub fn href(&self) -> &str {
        &self.href
    }

    /// Declared archive size in bytes. Informational only.
    #[must_use]
    pub const fn size(&self) -> u64 {
        self.size
    }

    /// Expected SHA-256 digest of the archive.
    #[must_use]
    pub const fn sha256(&self) -> &Sha256Digest {
        &self.sha256
    }

    /// Resolve the download path against `origin`.
    ///
    /// Absolute `href` values are returned unchanged.
    ///
    /// # Examples
    ///
    /// ```
    /// use goenv::release::record::ReleaseRecord;
    /// use goenv::release::sha256_digest::Sha256Digest;
    /// use goenv::version::Version;
    ///
    /// let record = ReleaseRecord::new(
    ///     Version::parse("go1.21.0")?,
    ///     "/dl/go1.21.0.src.tar.gz".to_owned(),
    ///     1024,
    ///     Sha256Digest::of_bytes(b""),
    /// );
    /// assert_eq!(
    ///     record.download_url("https://go.dev/"),
    ///     "https://go.dev/dl/go1.21.0.src.tar.gz"
    /// );
    /// # Ok::<(), goenv::version::ParseError>(())
    /// ```
    #[must_use]
    pub fn download_url(&self, origin: &str) -> String {
        if self.href.starts_with("http://") || self.href.starts_with("https://") {
            return self.href.clone();
        }
        let base = origin.trim_end_matches('/');
        if self.href.starts_with('/') {
            format!("{base}{}", self.href)
        } else {
            format!("{base}/{}", self.href)
        }
    }

    /// Filename the archive is stored under locally.
    #[must_use]
    pub fn archive_filename(&self) -> String {
        format!("{}{SOURCE_ARCHIVE_SUFFIX}", self.version)
    }
}

/// A downloaded archive that has not yet been verified.
///
/// The handle owns nothing but the path; the file stays on disk until the
/// caller calls [`ArchiveHandle::discard`] or removes it another way.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchiveHandle {
    path: PathBuf,
    record: ReleaseRecord,
}

impl ArchiveHandle {
    /// Pair a local archive file with the record it was fetched for.
    #[must_use]
    pub const fn new(path: PathBuf, record: ReleaseRecord) -> Self {
        Self { path, record }
    }

    /// Location of the archive file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Record describing the expected archive contents.
    #[must_use]
    pub const fn record(&self) -> &ReleaseRecord {
        &self.record
    }

    /// Delete the archive file.
    ///
    /// # Errors
    ///
    /// Returns the I/O error from removing the file.
    pub fn discard(self) -> io::Result<()> {
        std::fs::remove_file(&self.path)
    }
}
