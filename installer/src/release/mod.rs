//! Release records, archive download, and checksum-gated extraction.
//!
//! # Sub-modules
//!
//! - [`download`] - Archive download trait and HTTP implementation.
//! - [`extraction`] - Archive extraction with checksum gate and path
//!   traversal protection.
//! - [`record`] - Catalog rows (`ReleaseRecord`) and downloaded files
//!   (`ArchiveHandle`).
//! - [`sha256_digest`] - SHA-256 digest newtype (`Sha256Digest`).
//! - [`size`] - Parsing of `KB`/`MB`/`GB` suffixed sizes.

pub mod download;
pub mod extraction;
pub mod record;
pub mod sha256_digest;
pub mod size;
