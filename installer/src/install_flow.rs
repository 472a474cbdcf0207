//! Release selection and installation into the goroot.
//!
//! Selection works on the catalog's newest-first record list and the
//! installed versions. Installation downloads the chosen archive into a
//! scratch directory inside the location, extracts it into
//! `goroot/<version>`, and holds an exclusive lock on the location while
//! doing so.

use std::fs::{self, File, OpenOptions};
use std::io::Write;
use std::time::Duration;

use camino::{Utf8Path, Utf8PathBuf};
use log::{debug, info, warn};

use crate::config::Config;
use crate::error::{InstallerError, Result};
use crate::installed::InstalledVersion;
use crate::output::write_stderr_line;
use crate::release::download::ReleaseDownloader;
use crate::release::extraction::ArchiveExtractor;
use crate::release::record::ReleaseRecord;
use crate::version::{VERSION_PREFIX, Version};

/// Time allowed for extracting one archive.
pub const EXTRACTION_TIMEOUT: Duration = Duration::from_secs(600);

/// Directory under the location that receives kept archives.
pub const DOWNLOADS_DIR: &str = "downloads";

const STAGING_PREFIX: &str = ".goenv-download-";

/// Which release to install.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReleaseRequest {
    /// A version named by the user, with or without the `go` prefix.
    Exact(String),
    /// The newest release that is not installed yet.
    Newest {
        /// Whether betas and release candidates are eligible.
        allow_pre: bool,
    },
}

/// Flags controlling [`install_release`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct InstallOptions {
    /// Move the archive to `<location>/downloads/` instead of deleting it.
    pub keep_archive: bool,
    /// Suppress progress output.
    pub quiet: bool,
}

/// Result of a successful installation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstallOutcome {
    /// The installed version.
    pub version: Version,
    /// The new `goroot/<version>` directory.
    pub path: Utf8PathBuf,
    /// Where the archive was kept, when requested.
    pub kept_archive: Option<Utf8PathBuf>,
}

/// Pick the record to install.
///
/// An exact request matches the record whose original text equals the
/// request, accepting the request with or without the `go` prefix. A newest
/// request takes the first eligible record not already installed.
///
/// # Errors
///
/// Returns [`InstallerError::ReleaseNotFound`] when an exact request is not
/// listed, and [`InstallerError::NothingToInstall`] when every eligible
/// release is installed.
pub fn select_release<'r>(
    records: &'r [ReleaseRecord],
    installed: &[InstalledVersion],
    request: &ReleaseRequest,
) -> Result<&'r ReleaseRecord> {
    match request {
        ReleaseRequest::Exact(text) => {
            let wanted = if text.starts_with(VERSION_PREFIX) {
                text.clone()
            } else {
                format!("{VERSION_PREFIX}{text}")
            };
            records
                .iter()
                .find(|record| record.version().as_str() == wanted)
                .ok_or(InstallerError::ReleaseNotFound { version: wanted })
        }
        ReleaseRequest::Newest { allow_pre } => records
            .iter()
            .filter(|record| is_eligible(record, *allow_pre))
            .find(|record| !is_installed(installed, record.version()))
            .ok_or(InstallerError::NothingToInstall),
    }
}

/// The newest eligible record, if it is newer than every installed version.
#[must_use]
pub fn upgrade_target<'r>(
    records: &'r [ReleaseRecord],
    installed: &[InstalledVersion],
    allow_pre: bool,
) -> Option<&'r ReleaseRecord> {
    let newest = records
        .iter()
        .find(|record| is_eligible(record, allow_pre))?;
    match installed.iter().map(|entry| &entry.version).max() {
        Some(current) if current >= newest.version() => None,
        _ => Some(newest),
    }
}

fn is_eligible(record: &ReleaseRecord, allow_pre: bool) -> bool {
    allow_pre || record.version().is_stable()
}

fn is_installed(installed: &[InstalledVersion], version: &Version) -> bool {
    installed.iter().any(|entry| &entry.version == version)
}

/// Download, verify, and extract `record` into `goroot/<version>`.
///
/// A failed extraction removes the partially written version directory.
///
/// # Errors
///
/// Returns [`InstallerError::Locked`] if another process holds the location
/// lock, [`InstallerError::AlreadyInstalled`] if the version directory
/// exists, and the downloader's or extractor's error otherwise.
pub fn install_release(
    config: &Config,
    record: &ReleaseRecord,
    downloader: &dyn ReleaseDownloader,
    extractor: &dyn ArchiveExtractor,
    options: InstallOptions,
    stderr: &mut dyn Write,
) -> Result<InstallOutcome> {
    let version = record.version();
    let goroot = config.goroot_dir();
    fs::create_dir_all(&goroot)?;
    let _lock = LocationLock::acquire(&config.lock_path())?;

    let target = goroot.join(version.as_str());
    if target.exists() {
        return Err(InstallerError::AlreadyInstalled {
            version: version.to_string(),
            path: target,
        });
    }

    let staging = tempfile::Builder::new()
        .prefix(STAGING_PREFIX)
        .tempdir_in(config.location())?;
    progress(stderr, options, format!("Downloading {version}..."));
    let handle = downloader.download(record, staging.path())?;

    progress(stderr, options, format!("Verifying and extracting {version}..."));
    fs::create_dir(&target)?;
    if let Err(err) = extractor.extract(&handle, target.as_std_path()) {
        remove_partial(&target);
        return Err(err.into());
    }

    let kept_archive = if options.keep_archive {
        let downloads = config.location().join(DOWNLOADS_DIR);
        fs::create_dir_all(&downloads)?;
        let kept = downloads.join(handle.record().archive_filename());
        fs::rename(handle.path(), &kept)?;
        Some(kept)
    } else {
        handle.discard()?;
        None
    };

    info!("installed {version} into {target}");
    progress(stderr, options, format!("Installed {version} into {target}"));
    Ok(InstallOutcome {
        version: version.clone(),
        path: target,
        kept_archive,
    })
}

fn progress(stderr: &mut dyn Write, options: InstallOptions, message: String) {
    if !options.quiet {
        write_stderr_line(stderr, message);
    }
}

fn remove_partial(target: &Utf8Path) {
    match fs::remove_dir_all(target) {
        Ok(()) => debug!("removed partial install at {target}"),
        Err(err) => warn!("could not remove partial install at {target}: {err}"),
    }
}

/// Exclusive advisory lock on the location, released on drop.
struct LocationLock {
    file: File,
}

impl LocationLock {
    fn acquire(path: &Utf8Path) -> Result<Self> {
        let file = OpenOptions::new()
            .create(true)
            .truncate(false)
            .write(true)
            .open(path)?;
        match fs2::FileExt::try_lock_exclusive(&file) {
            Ok(()) => {
                debug!("acquired install lock {path}");
                Ok(Self { file })
            }
            Err(err) if err.kind() == fs2::lock_contended_error().kind() => {
                Err(InstallerError::Locked {
                    path: path.to_owned(),
                })
            }
            Err(err) => Err(err.into()),
        }
    }
}

impl Drop for LocationLock {
    fn drop(&mut self) {
        if let Err(err) = fs2::FileExt::unlock(&self.file) {
            warn!("could not release install lock: {err}");
        }
    }
}

#[cfg(test)]
#[path = "install_flow_tests.rs"]
mod tests;
