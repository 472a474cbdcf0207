//! First-time setup of an install location.
//!
//! `goenv init` creates the directory skeleton, installs the running binary
//! as `bin/goenv`, and points `bin/go` and `bin/gofmt` at it so that the
//! binary can act as the tool shim.

use std::fmt;
use std::fs;
use std::path::Path;

use camino::{Utf8Path, Utf8PathBuf};
use log::debug;

use crate::config::Config;
use crate::error::{InstallerError, Result};

/// Name of the installed binary.
pub const BINARY_NAME: &str = "goenv";

/// Tool names that resolve to the shim.
pub const SHIM_TOOLS: [&str; 2] = ["go", "gofmt"];

const DIRECTORY_MODE: u32 = 0o755;
const BINARY_MODE: u32 = 0o755;

/// One change made by [`initialise`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BootstrapAction {
    /// A directory was created.
    CreatedDirectory(Utf8PathBuf),
    /// The binary was copied into place.
    InstalledBinary(Utf8PathBuf),
    /// A tool symlink was (re)created.
    LinkedTool {
        /// The symlink.
        link: Utf8PathBuf,
        /// What it points at.
        target: Utf8PathBuf,
    },
}

impl fmt::Display for BootstrapAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::CreatedDirectory(path) => write!(f, "create directory: {path}"),
            Self::InstalledBinary(path) => write!(f, "install binary: {path}"),
            Self::LinkedTool { link, target } => write!(f, "create symlink: {link} => {target}"),
        }
    }
}

/// Set up the location described by `config`.
///
/// Existing directories are reused. The binary is overwritten and the tool
/// links are replaced, so running this twice is harmless.
///
/// # Errors
///
/// Returns [`InstallerError::NotADirectory`] when `bin` or `goroot` exists
/// as something else, and [`InstallerError::Io`] for filesystem failures.
pub fn initialise(config: &Config, current_exe: &Path) -> Result<Vec<BootstrapAction>> {
    let mut actions = Vec::new();
    let bin_dir = config.bin_dir();

    for dir in [bin_dir.clone(), config.goroot_dir()] {
        if ensure_directory(&dir)? {
            actions.push(BootstrapAction::CreatedDirectory(dir));
        }
    }

    let binary = bin_dir.join(BINARY_NAME);
    install_binary(current_exe, &binary)?;
    actions.push(BootstrapAction::InstalledBinary(binary.clone()));

    for tool in SHIM_TOOLS {
        let link = bin_dir.join(tool);
        replace_symlink(&binary, &link)?;
        actions.push(BootstrapAction::LinkedTool {
            link,
            target: binary.clone(),
        });
    }

    Ok(actions)
}

/// Create `dir` if missing. Returns whether it was created.
fn ensure_directory(dir: &Utf8Path) -> Result<bool> {
    match fs::symlink_metadata(dir) {
        Ok(meta) if meta.is_dir() => Ok(false),
        Ok(_) => Err(InstallerError::NotADirectory {
            path: dir.to_owned(),
        }),
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
            fs::create_dir_all(dir)?;
            set_mode(dir.as_std_path(), DIRECTORY_MODE)?;
            debug!("created {dir}");
            Ok(true)
        }
        Err(err) => Err(err.into()),
    }
}

fn install_binary(source: &Path, destination: &Utf8Path) -> Result<()> {
    // Copying onto a running binary fails with ETXTBSY; unlink first.
    if destination.exists() {
        fs::remove_file(destination)?;
    }
    fs::copy(source, destination)?;
    set_mode(destination.as_std_path(), BINARY_MODE)?;
    Ok(())
}

fn replace_symlink(target: &Utf8Path, link: &Utf8Path) -> Result<()> {
    if fs::symlink_metadata(link).is_ok() {
        fs::remove_file(link)?;
    }
    symlink(target.as_std_path(), link.as_std_path())?;
    debug!("linked {link} -> {target}");
    Ok(())
}

#[cfg(unix)]
fn symlink(target: &Path, link: &Path) -> std::io::Result<()> {
    std::os::unix::fs::symlink(target, link)
}

#[cfg(not(unix))]
fn symlink(_target: &Path, _link: &Path) -> std::io::Result<()> {
    Err(std::io::Error::new(
        std::io::ErrorKind::Unsupported,
        "symlinks require a Unix host",
    ))
}

#[cfg(unix)]
fn set_mode(path: &Path, mode: u32) -> std::io::Result<()> {
    use std::os::unix::fs::PermissionsExt;
    fs::set_permissions(path, fs::Permissions::from_mode(mode))
}

#[cfg(not(unix))]
fn set_mode(_path: &Path, _mode: u32) -> std::io::Result<()> {
    Ok(())
}
