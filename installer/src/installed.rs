//! Discovery of locally installed toolchain versions.
//!
//! Each installed release lives in its own directory under the goroot:
//!
//! ```text
//! {location}/goroot/{version}/go/bin/go
//! ```

use std::io;

use camino::{Utf8Path, Utf8PathBuf};
use log::warn;

use crate::version::Version;

/// One installed release.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstalledVersion {
    /// Parsed directory name.
    pub version: Version,
    /// Directory holding the release's `go/` tree.
    pub path: Utf8PathBuf,
}

impl InstalledVersion {
    /// Path of `tool` inside this release, e.g. `go` or `gofmt`.
    #[must_use]
    pub fn tool_path(&self, tool: &str) -> Utf8PathBuf {
        self.path.join("go").join("bin").join(tool)
    }
}

/// Scan `goroot` for installed releases, newest first.
///
/// Entries whose names do not parse as a version, and plain files, are
/// logged and skipped. A missing `goroot` yields an empty list.
///
/// # Errors
///
/// Returns an error if the directory exists but cannot be read.
pub fn scan_installed(goroot: &Utf8Path) -> io::Result<Vec<InstalledVersion>> {
    if !goroot.exists() {
        return Ok(Vec::new());
    }

    let mut installed = Vec::new();
    for entry_result in goroot.read_dir_utf8()? {
        let entry = entry_result?;
        let name = entry.file_name();
        if !entry.path().is_dir() {
            continue;
        }
        match Version::parse(name) {
            Ok(version) => installed.push(InstalledVersion {
                version,
                path: entry.path().to_owned(),
            }),
            Err(err) => warn!("ignoring {}: {err}", entry.path()),
        }
    }

    installed.sort_by(|left, right| right.version.cmp(&left.version));
    Ok(installed)
}

/// The newest installed release, if any.
///
/// # Errors
///
/// See [`scan_installed`].
pub fn latest_installed(goroot: &Utf8Path) -> io::Result<Option<InstalledVersion>> {
    Ok(scan_installed(goroot)?.into_iter().next())
}
