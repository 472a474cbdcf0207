//! CLI argument definitions for goenv.
//!
//! This module defines the command-line interface using clap. It is separated
//! from the main entrypoint to keep the binary focused on orchestration.

use camino::Utf8PathBuf;
use clap::{Args, Parser, Subcommand};
use log::LevelFilter;

/// Install and switch between Go toolchain releases.
#[derive(Parser, Debug)]
#[command(name = "goenv")]
#[command(version, about)]
#[command(long_about = concat!(
    "Install and switch between Go toolchain releases.\n\n",
    "goenv reads the release catalog from the downloads page, installs source ",
    "releases after verifying their SHA-256 checksums, and links `go` and ",
    "`gofmt` to itself so that every invocation runs the newest installed ",
    "release, or the one named by GOCMD.",
))]
#[command(after_help = concat!(
    "ENVIRONMENT:\n",
    "  GOENV_LOCATION        Install root [default: /usr/local/go]\n",
    "  GOCMD                 Version the go/gofmt shims run\n",
    "  GOENV_ORIGIN          Catalog origin [default: https://go.dev]\n",
    "  GOENV_TIMEOUT_SECS    Download timeout in seconds [default: 300]\n\n",
    "EXAMPLES:\n",
    "  Set up the install location:\n",
    "    $ goenv init\n\n",
    "  Install the newest stable release:\n",
    "    $ goenv install\n\n",
    "  Install a specific release:\n",
    "    $ goenv install go1.21.5\n\n",
    "  Show releases available for download:\n",
    "    $ goenv list-remote --pre",
))]
pub struct Cli {
    /// Subcommand to execute.
    #[command(subcommand)]
    pub command: Command,

    /// Install root, overriding GOENV_LOCATION.
    #[arg(long, global = true, value_name = "DIR")]
    pub location: Option<Utf8PathBuf>,

    /// Increase log verbosity (repeatable: -v, -vv).
    #[arg(
        short,
        long = "verbose",
        global = true,
        action = clap::ArgAction::Count,
        conflicts_with = "quiet"
    )]
    pub verbosity: u8,

    /// Suppress progress output (errors still shown).
    #[arg(short, long, global = true, conflicts_with = "verbosity")]
    pub quiet: bool,
}

impl Cli {
    /// Log filter implied by `-v`/`-q`.
    #[must_use]
    pub const fn log_level(&self) -> LevelFilter {
        if self.quiet {
            return LevelFilter::Error;
        }
        match self.verbosity {
            0 => LevelFilter::Warn,
            1 => LevelFilter::Debug,
            _ => LevelFilter::Trace,
        }
    }
}

/// Available subcommands.
#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Create the install location and link go/gofmt to goenv.
    Init(InitArgs),

    /// Install a release.
    Install(InstallArgs),

    /// Install the newest release if it is newer than every installed one.
    Upgrade(UpgradeArgs),

    /// List releases available for download, newest first.
    ListRemote(ListRemoteArgs),

    /// List installed releases, marking the one go/gofmt run.
    List,
}

/// Arguments for the init command.
#[derive(Args, Debug, Clone, Default, PartialEq, Eq)]
pub struct InitArgs {
    /// Do not ask for confirmation.
    #[arg(short, long)]
    pub yes: bool,
}

/// Arguments for the install command.
#[derive(Args, Debug, Clone, Default, PartialEq, Eq)]
pub struct InstallArgs {
    /// Release to install, e.g. go1.21.5 [default: newest not installed].
    #[arg(value_name = "VERSION")]
    pub version: Option<String>,

    /// Consider betas and release candidates.
    #[arg(long, conflicts_with = "version")]
    pub pre: bool,

    /// Keep the downloaded archive under <location>/downloads.
    #[arg(long)]
    pub keep_archive: bool,
}

/// Arguments for the upgrade command.
#[derive(Args, Debug, Clone, Default, PartialEq, Eq)]
pub struct UpgradeArgs {
    /// Consider betas and release candidates.
    #[arg(long)]
    pub pre: bool,
}

/// Arguments for the list-remote command.
#[derive(Args, Debug, Clone, Default, PartialEq, Eq)]
pub struct ListRemoteArgs {
    /// Include betas and release candidates.
    #[arg(long)]
    pub pre: bool,
}

#[cfg(test)]
#[path = "cli_tests.rs"]
mod tests;
