//! goenv library.
//!
//! This crate discovers Go source releases from the public downloads page,
//! installs them after checksum verification, and selects which installed
//! release the `go` and `gofmt` shims run. It is used by the `goenv` binary
//! and can be consumed programmatically for testing.
//!
//! # Modules
//!
//! - [`bootstrap`] - First-time setup of an install location
//! - [`catalog`] - Release catalog discovery from the downloads page
//! - [`cli`] - Command-line argument definitions
//! - [`config`] - Environment-driven configuration
//! - [`deadline`] - Caller-supplied time limits
//! - [`error`] - CLI-level error type with component conversions
//! - [`install_flow`] - Release selection and installation
//! - [`installed`] - Discovery of installed releases
//! - [`output`] - Progress and listing output
//! - [`prompt`] - Yes/no confirmation
//! - [`release`] - Release records, download, and extraction
//! - [`shim`] - `go`/`gofmt` dispatch to the selected release
//! - [`version`] - Go version parsing and ordering

pub mod bootstrap;
pub mod catalog;
pub mod cli;
pub mod config;
pub mod deadline;
pub mod error;
mod http;
pub mod install_flow;
pub mod installed;
pub mod output;
pub mod prompt;
pub mod release;
pub mod shim;
#[cfg(any(test, feature = "test-support"))]
pub mod test_utils;
pub mod version;
