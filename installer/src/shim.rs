//! Tool shim: run `go` or `gofmt` from the selected installed release.
//!
//! The version comes from `GOCMD` when set, otherwise the newest installed
//! release is used.

use std::ffi::OsString;
use std::io;
use std::process::{Command, ExitStatus};

use camino::{Utf8Path, Utf8PathBuf};
use log::debug;

use crate::config::Config;
use crate::error::{InstallerError, Result};
use crate::installed::scan_installed;
use crate::version::{ParseError, VERSION_PREFIX, Version};

/// Exit code reported when the child's status carries no code.
const UNKNOWN_EXIT: i32 = 1;

/// Offset added to a terminating signal number, as shells do.
const SIGNAL_EXIT_BASE: i32 = 128;

/// Locate `tool` in the release selected by `config`.
///
/// `GOCMD` may name the version with or without the `go` prefix; it is
/// matched against installed versions by precedence, so `go1.21` finds an
/// installed `go1.21.0`.
///
/// # Errors
///
/// Returns [`InstallerError::InvalidVersion`] when `GOCMD` is not a Go
/// version, [`InstallerError::VersionNotFound`] when the instructed version is
/// not installed, [`InstallerError::NoInstalledVersion`] when nothing is, and
/// [`InstallerError::Io`] when the goroot cannot be read.
pub fn resolve_binary(config: &Config, tool: &str) -> Result<Utf8PathBuf> {
    let goroot = config.goroot_dir();
    let installed = scan_installed(&goroot)?;

    let chosen = match config.instructed_version() {
        Some(text) => {
            let wanted = parse_instructed(text)?;
            installed
                .into_iter()
                .find(|entry| entry.version == wanted)
                .ok_or_else(|| InstallerError::VersionNotFound {
                    version: text.to_owned(),
                })?
        }
        None => installed
            .into_iter()
            .next()
            .ok_or(InstallerError::NoInstalledVersion { goroot })?,
    };

    let binary = chosen.tool_path(tool);
    debug!("{tool} resolves to {binary}");
    Ok(binary)
}

/// Parse a `GOCMD` value, which may omit the `go` prefix.
///
/// # Errors
///
/// Returns the [`ParseError`] for text that is not a Go version.
pub fn parse_instructed(text: &str) -> std::result::Result<Version, ParseError> {
    if text.starts_with(VERSION_PREFIX) {
        Version::parse(text)
    } else {
        Version::parse(&format!("{VERSION_PREFIX}{text}"))
    }
}

/// Run `binary` with `args`, inheriting stdio, and return its exit code.
///
/// # Errors
///
/// Returns the I/O error if the process cannot be spawned or waited on.
pub fn run(binary: &Utf8Path, args: impl IntoIterator<Item = OsString>) -> io::Result<i32> {
    let status = Command::new(binary).args(args).status()?;
    Ok(exit_code(status))
}

/// Map a child's status to the code this process should exit with.
#[must_use]
pub fn exit_code(status: ExitStatus) -> i32 {
    if let Some(code) = status.code() {
        return code;
    }
    #[cfg(unix)]
    {
        use std::os::unix::process::ExitStatusExt;
        if let Some(signal) = status.signal() {
            return SIGNAL_EXIT_BASE.saturating_add(signal);
        }
    }
    UNKNOWN_EXIT
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::{fixture, rstest};
    use tempfile::TempDir;

    struct Location {
        _temp: TempDir,
        root: String,
    }

    impl Location {
        fn config(&self, gocmd: Option<&str>) -> Config {
            let root = self.root.clone();
            let gocmd = gocmd.map(str::to_owned);
            Config::from_lookup(move |name| match name {
                crate::config::LOCATION_VAR => Some(root.clone()),
                crate::config::GOCMD_VAR => gocmd.clone(),
                _ => None,
            })
            .expect("config loads")
        }

        fn install(&self, version: &str) {
            let bin = std::path::Path::new(&self.root)
                .join("goroot")
                .join(version)
                .join("go/bin");
            std::fs::create_dir_all(bin).expect("create bin dir");
        }
    }

    #[fixture]
    fn location() -> Location {
        let temp = TempDir::new().expect("temp dir");
        let root = temp.path().to_str().expect("utf-8 temp path").to_owned();
        Location { _temp: temp, root }
    }

    #[rstest]
    fn newest_installed_version_is_the_default(location: Location) {
        location.install("go1.20.7");
        location.install("go1.21.0");
        location.install("go1.22rc1");

        let binary = resolve_binary(&location.config(None), "gofmt").expect("resolves");

        assert_eq!(
            binary,
            format!("{}/goroot/go1.22rc1/go/bin/gofmt", location.root)
        );
    }

    #[rstest]
    #[case::exact("go1.20.7")]
    #[case::bare("1.20.7")]
    fn gocmd_selects_the_version(location: Location, #[case] gocmd: &str) {
        location.install("go1.20.7");
        location.install("go1.21.0");

        let binary = resolve_binary(&location.config(Some(gocmd)), "go").expect("resolves");

        assert_eq!(binary, format!("{}/goroot/go1.20.7/go/bin/go", location.root));
    }

    #[rstest]
    fn gocmd_matches_by_precedence(location: Location) {
        location.install("go1.21.0");

        let binary = resolve_binary(&location.config(Some("go1.21")), "go").expect("resolves");

        assert_eq!(binary, format!("{}/goroot/go1.21.0/go/bin/go", location.root));
    }

    #[rstest]
    fn missing_gocmd_version_is_reported(location: Location) {
        location.install("go1.21.0");

        let err = resolve_binary(&location.config(Some("go1.19.1")), "go").expect_err("missing");

        assert!(matches!(err, InstallerError::VersionNotFound { ref version } if version == "go1.19.1"));
    }

    #[rstest]
    #[case::name("tip")]
    #[case::four_segments("go1.2.3.4")]
    fn malformed_gocmd_is_an_invalid_version(location: Location, #[case] gocmd: &str) {
        location.install("go1.21.0");

        let err = resolve_binary(&location.config(Some(gocmd)), "go").expect_err("malformed");

        assert!(
            matches!(err, InstallerError::InvalidVersion(ParseError::MalformedVersion { .. })),
            "expected InvalidVersion, got {err:?}"
        );
    }

    #[rstest]
    #[case::prefixed("go1.21rc1", "go1.21rc1")]
    #[case::bare("1.21rc1", "go1.21rc1")]
    fn parse_instructed_accepts_both_spellings(#[case] text: &str, #[case] expected: &str) {
        let version = parse_instructed(text).expect("parses");
        assert_eq!(version.to_string(), expected);
    }

    #[rstest]
    fn gocmd_is_read_from_the_environment(location: Location) {
        location.install("go1.20.7");
        location.install("go1.21.0");

        let binary = crate::test_utils::with_goenv_env(
            &location.root,
            "http://127.0.0.1:9",
            Some("go1.20.7"),
            || {
                let config = Config::from_env().expect("config loads");
                resolve_binary(&config, "go").expect("resolves")
            },
        );

        assert_eq!(binary, format!("{}/goroot/go1.20.7/go/bin/go", location.root));
    }

    #[rstest]
    fn empty_goroot_is_reported(location: Location) {
        let err = resolve_binary(&location.config(None), "go").expect_err("nothing installed");
        assert!(matches!(err, InstallerError::NoInstalledVersion { .. }));
    }

    #[cfg(unix)]
    #[test]
    fn run_propagates_exit_code() {
        let code = run(
            Utf8Path::new("/bin/sh"),
            ["-c", "exit 7"].map(OsString::from),
        )
        .expect("sh runs");
        assert_eq!(code, 7);
    }

    #[cfg(unix)]
    #[test]
    fn signals_map_above_128() {
        use std::os::unix::process::ExitStatusExt;
        assert_eq!(exit_code(ExitStatus::from_raw(9)), 137);
        assert_eq!(exit_code(ExitStatus::from_raw(3 << 8)), 3);
    }
}
