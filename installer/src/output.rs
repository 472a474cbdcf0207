//! Output formatting for the goenv CLI.
//!
//! Progress and errors go to stderr through [`write_stderr_line`]; listings
//! are rendered to lines here and printed by the binary.

use std::io::Write;

use crate::installed::InstalledVersion;
use crate::release::record::ReleaseRecord;
use crate::version::Version;

/// Marker printed before the active version in `goenv list`.
const ACTIVE_MARKER: &str = "* ";
const INACTIVE_MARKER: &str = "  ";

/// Write one line to `stderr`, ignoring write failures.
pub fn write_stderr_line(stderr: &mut dyn Write, message: impl std::fmt::Display) {
    if writeln!(stderr, "{message}").is_err() {
        // Best-effort progress output.
    }
}

/// Catalog versions for display, newest first.
///
/// Rows sharing a version (`go1.12` and `go1.12.0`) are shown once, using
/// the first spelling in the catalog.
///
/// # Examples
///
/// ```
/// use goenv::output::remote_version_lines;
///
/// let lines = remote_version_lines(&[]);
/// assert!(lines.is_empty());
/// ```
#[must_use]
pub fn remote_version_lines(records: &[ReleaseRecord]) -> Vec<String> {
    let mut lines: Vec<String> = Vec::with_capacity(records.len());
    let mut previous: Option<&Version> = None;
    for record in records {
        if previous == Some(record.version()) {
            continue;
        }
        previous = Some(record.version());
        lines.push(record.version().to_string());
    }
    lines
}

/// Installed versions for display, marking `active` with `*`.
#[must_use]
pub fn installed_version_lines(
    installed: &[InstalledVersion],
    active: Option<&Version>,
) -> Vec<String> {
    installed
        .iter()
        .map(|entry| {
            let marker = if active == Some(&entry.version) {
                ACTIVE_MARKER
            } else {
                INACTIVE_MARKER
            };
            format!("{marker}{}", entry.version)
        })
        .collect()
}
