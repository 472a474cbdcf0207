//! Checksum-gated extraction of release archives.
//!
//! Extracts `.tar.gz` archives to a target directory. The archive's SHA-256
//! digest must match the catalog before any entry is written, and every
//! entry path is validated to prevent zip-slip attacks. Only directories and
//! regular files are materialised.

use std::fs::{self, File, OpenOptions};
use std::io::{self, Seek, SeekFrom};
use std::path::{Component, Path};

use flate2::read::GzDecoder;
use log::{debug, info};

use super::record::ArchiveHandle;
use super::sha256_digest::Sha256Digest;
use crate::deadline::Deadline;

/// Mask selecting the permission bits of a tar mode field.
const PERMISSION_BITS: u32 = 0o777;

/// Trait for extracting release archives, enabling test mocking.
///
/// # Examples
///
/// ```
/// use goenv::release::extraction::GzipTarExtractor;
///
/// let extractor = GzipTarExtractor::default();
/// // Use extractor.extract(&handle, target_dir) in production
/// # let _ = extractor;
/// ```
#[cfg_attr(test, mockall::automock)]
pub trait ArchiveExtractor {
    /// Verify and unpack the archive behind `handle` into `target_dir`.
    ///
    /// # Errors
    ///
    /// Returns [`ExtractError::ChecksumMismatch`] before writing anything if
    /// the digest differs from the record. Returns
    /// [`ExtractError::UnsupportedEntryType`] or
    /// [`ExtractError::PathTraversal`] for rejected entries; entries written
    /// before the rejected one are left in place.
    fn extract(&self, handle: &ArchiveHandle, target_dir: &Path) -> Result<(), ExtractError>;
}

/// Errors arising from archive extraction.
#[derive(Debug, thiserror::Error)]
pub enum ExtractError {
    /// The archive's digest differs from the catalog's.
    #[error("checksum mismatch: expected {expected}, got {actual}")]
    ChecksumMismatch {
        /// Hex digest published in the catalog.
        expected: String,
        /// Hex digest of the downloaded file.
        actual: String,
    },

    /// The compressed stream or tar headers cannot be read.
    #[error("corrupt archive stream: {reason}")]
    CorruptStream {
        /// Description of the decoding failure.
        reason: String,
    },

    /// The archive contains an entry that is neither a directory nor a
    /// regular file.
    #[error("unsupported entry type {kind} for {path}")]
    UnsupportedEntryType {
        /// The offending entry path.
        path: String,
        /// The tar entry type.
        kind: String,
    },

    /// A path in the archive attempts to traverse outside the destination.
    #[error("path traversal detected: {path}")]
    PathTraversal {
        /// The offending path from the archive entry.
        path: String,
    },

    /// The caller's deadline passed before extraction finished.
    #[error("extraction deadline exceeded")]
    DeadlineExceeded,

    /// I/O error during extraction.
    #[error("extraction I/O error: {0}")]
    Io(#[from] io::Error),
}

/// Default extractor using the `flate2` and `tar` crates.
#[derive(Debug, Clone, Copy, Default)]
pub struct GzipTarExtractor {
    deadline: Deadline,
}

impl GzipTarExtractor {
    /// Create an extractor that stops between entries once `deadline` passes.
    #[must_use]
    pub const fn with_deadline(deadline: Deadline) -> Self {
        Self { deadline }
    }
}

impl ArchiveExtractor for GzipTarExtractor {
    fn extract(&self, handle: &ArchiveHandle, target_dir: &Path) -> Result<(), ExtractError> {
        let mut file = File::open(handle.path())?;
        verify_checksum(&mut file, handle.record().sha256())?;
        file.seek(SeekFrom::Start(0))?;

        let decoder = GzDecoder::new(file);
        if decoder.header().is_none() {
            return Err(ExtractError::CorruptStream {
                reason: format!("{} has no readable gzip header", handle.path().display()),
            });
        }

        let mut archive = tar::Archive::new(decoder);
        let mut directories = 0usize;
        let mut files = 0usize;

        for entry_result in archive.entries().map_err(corrupt)? {
            if self.deadline.has_passed() {
                return Err(ExtractError::DeadlineExceeded);
            }
            let mut entry = entry_result.map_err(corrupt)?;
            let entry_type = entry.header().entry_type();
            if entry_type.is_pax_global_extensions() {
                debug!("skipping pax global header");
                continue;
            }

            let entry_path = entry.path().map_err(corrupt)?.into_owned();
            validate_entry_path(&entry_path)?;
            let mode = entry.header().mode().map_err(corrupt)? & PERMISSION_BITS;
            let dest = target_dir.join(&entry_path);

            if entry_type.is_dir() {
                unpack_directory(&dest, mode)?;
                directories += 1;
            } else if entry_type.is_file() {
                unpack_file(&mut entry, &dest, mode)?;
                files += 1;
            } else {
                return Err(ExtractError::UnsupportedEntryType {
                    path: entry_path.display().to_string(),
                    kind: format!("{entry_type:?}"),
                });
            }
        }

        info!(
            "extracted {} ({directories} directories, {files} files) into {}",
            handle.record().version(),
            target_dir.display()
        );
        Ok(())
    }
}

/// Hash the whole file and compare it with the expected digest.
fn verify_checksum(file: &mut File, expected: &Sha256Digest) -> Result<(), ExtractError> {
    let actual = Sha256Digest::of_reader(file)?;
    if actual.as_bytes() != expected.as_bytes() {
        return Err(ExtractError::ChecksumMismatch {
            expected: expected.to_string(),
            actual: actual.to_string(),
        });
    }
    debug!("checksum verified: {actual}");
    Ok(())
}

fn corrupt(err: io::Error) -> ExtractError {
    ExtractError::CorruptStream {
        reason: err.to_string(),
    }
}

/// Validate that a tar entry path does not escape the destination
/// directory via `..` components, roots, or prefixes.
fn validate_entry_path(path: &Path) -> Result<(), ExtractError> {
    let escapes = path.is_absolute()
        || path.components().any(|component| {
            matches!(
                component,
                Component::ParentDir | Component::RootDir | Component::Prefix(_)
            )
        });
    if escapes {
        return Err(ExtractError::PathTraversal {
            path: path.display().to_string(),
        });
    }
    Ok(())
}

fn unpack_directory(dest: &Path, mode: u32) -> Result<(), ExtractError> {
    fs::create_dir_all(dest)?;
    apply_mode(dest, mode)?;
    Ok(())
}

fn unpack_file(entry: &mut impl io::Read, dest: &Path, mode: u32) -> Result<(), ExtractError> {
    if let Some(parent) = dest.parent() {
        fs::create_dir_all(parent)?;
    }
    let mut options = OpenOptions::new();
    options.write(true).create(true).truncate(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        options.mode(mode);
    }
    let mut out = options.open(dest)?;
    io::copy(entry, &mut out)?;
    drop(out);
    apply_mode(dest, mode)?;
    Ok(())
}

/// Set permission bits exactly, independent of the process umask.
#[cfg(unix)]
fn apply_mode(path: &Path, mode: u32) -> io::Result<()> {
    use std::os::unix::fs::PermissionsExt;
    fs::set_permissions(path, fs::Permissions::from_mode(mode))
}

#[cfg(not(unix))]
fn apply_mode(_path: &Path, _mode: u32) -> io::Result<()> {
    Ok(())
}

#[cfg(test)]
#[path = "extraction_tests.rs"]
mod tests;
