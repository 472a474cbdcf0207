//! Release catalog discovery.
//!
//! Fetches the public downloads page and turns its download tables into
//! [`ReleaseRecord`] values, newest first. Only source-archive rows are
//! kept; binary distributions and installers are skipped.
//!
//! # Sub-modules
//!
//! - [`markup`] - Generic traversal helpers over the parsed page.

pub mod markup;

use std::time::Duration;

use log::{debug, info};
use scraper::{ElementRef, Html};
use thiserror::Error;

use crate::http::{self, Failure};
use crate::release::record::{ReleaseRecord, SOURCE_ARCHIVE_SUFFIX};
use crate::release::sha256_digest::{DigestError, Sha256Digest};
use crate::release::size::{SizeError, parse_size};
use crate::version::{ParseError, Version};
use markup::{
    child_elements, find_descendants, find_first, has_class, is_tag, own_text, raw_text,
};

/// Path of the downloads page below the origin.
pub const LISTING_PATH: &str = "/dl/";

/// Timeout for fetching the listing page.
pub const LISTING_TIMEOUT: Duration = Duration::from_secs(30);

/// Upper bound on the listing body. The real page is a few megabytes.
const LISTING_BODY_LIMIT: u64 = 32 * 1024 * 1024;

/// Class of the tables that hold release rows.
const TABLE_CLASS: &str = "downloadtable";

/// Kind column value of source-archive rows.
const SOURCE_KIND: &str = "Source";

/// Cells per release row.
const ROW_CELLS: usize = 6;

/// Errors raised while fetching or parsing the catalog.
#[derive(Debug, Error)]
pub enum CrawlError {
    /// The listing page could not be retrieved.
    #[error("cannot reach {url}: {reason}")]
    Unreachable {
        /// The URL that was requested.
        url: String,
        /// Description of the transport failure.
        reason: String,
    },

    /// The server answered with a non-success status.
    #[error("{url} answered with HTTP status {status}")]
    UnexpectedStatus {
        /// The URL that was requested.
        url: String,
        /// The HTTP status code.
        status: u16,
    },

    /// The page lacks the structure every listing has.
    #[error("malformed listing page: {reason}")]
    MalformedDocument {
        /// What was missing.
        reason: String,
    },

    /// A source row names a version that does not parse.
    #[error("listing row has an invalid version: {0}")]
    Version(#[from] ParseError),

    /// A source row carries an unparsable size.
    #[error("listing row has an invalid size: {0}")]
    InvalidSize(#[from] SizeError),

    /// A source row carries an unparsable checksum.
    #[error("listing row has an invalid checksum: {0}")]
    InvalidChecksum(#[from] DigestError),
}

impl CrawlError {
    /// Whether fetching again may succeed.
    #[must_use]
    pub const fn is_retriable(&self) -> bool {
        match self {
            Self::Unreachable { .. } => true,
            Self::UnexpectedStatus { status, .. } => http::is_retriable_status(*status),
            Self::MalformedDocument { .. }
            | Self::Version(_)
            | Self::InvalidSize(_)
            | Self::InvalidChecksum(_) => false,
        }
    }
}

/// Result type for catalog operations.
pub type Result<T> = std::result::Result<T, CrawlError>;

/// Source of the raw listing page, enabling test mocking.
#[cfg_attr(test, mockall::automock)]
pub trait ListingSource {
    /// Retrieve the listing page body.
    ///
    /// # Errors
    ///
    /// Returns [`CrawlError::Unreachable`] or [`CrawlError::UnexpectedStatus`]
    /// when the page cannot be retrieved.
    fn fetch_listing(&self) -> Result<String>;
}

/// Listing source backed by `ureq`.
pub struct HttpListingSource {
    url: String,
    agent: ureq::Agent,
}

impl HttpListingSource {
    /// Create a source for `<origin>/dl/`.
    ///
    /// # Examples
    ///
    /// ```
    /// use goenv::catalog::{HttpListingSource, LISTING_TIMEOUT};
    ///
    /// let source = HttpListingSource::new("https://go.dev", LISTING_TIMEOUT);
    /// assert_eq!(source.url(), "https://go.dev/dl/");
    /// ```
    #[must_use]
    pub fn new(origin: &str, timeout: Duration) -> Self {
        Self {
            url: format!("{}{LISTING_PATH}", origin.trim_end_matches('/')),
            agent: http::agent(timeout),
        }
    }

    /// The URL that will be requested.
    #[must_use]
    pub fn url(&self) -> &str {
        &self.url
    }
}

impl ListingSource for HttpListingSource {
    fn fetch_listing(&self) -> Result<String> {
        debug!("fetching release listing from {}", self.url);
        let response = self
            .agent
            .get(&self.url)
            .call()
            .map_err(|err| map_failure(&self.url, &err))?;
        response
            .into_body()
            .with_config()
            .limit(LISTING_BODY_LIMIT)
            .read_to_string()
            .map_err(|err| CrawlError::Unreachable {
                url: self.url.clone(),
                reason: err.to_string(),
            })
    }
}

fn map_failure(url: &str, err: &ureq::Error) -> CrawlError {
    match Failure::from(err) {
        Failure::Status(status) => CrawlError::UnexpectedStatus {
            url: url.to_owned(),
            status,
        },
        Failure::Transport(reason) => CrawlError::Unreachable {
            url: url.to_owned(),
            reason,
        },
    }
}

/// The release catalog behind a [`ListingSource`].
///
/// # Examples
///
/// ```no_run
/// use goenv::catalog::{Catalog, HttpListingSource, LISTING_TIMEOUT};
///
/// let catalog = Catalog::new(HttpListingSource::new("https://go.dev", LISTING_TIMEOUT));
/// let records = catalog.fetch()?;
/// if let Some(newest) = records.first() {
///     println!("newest release: {}", newest.version());
/// }
/// # Ok::<(), goenv::catalog::CrawlError>(())
/// ```
pub struct Catalog<S> {
    source: S,
}

impl<S: ListingSource> Catalog<S> {
    /// Wrap a listing source.
    pub const fn new(source: S) -> Self {
        Self { source }
    }

    /// Fetch and parse the listing, newest release first.
    ///
    /// # Errors
    ///
    /// Propagates retrieval failures from the source and any
    /// [`parse_listing`] error.
    pub fn fetch(&self) -> Result<Vec<ReleaseRecord>> {
        let body = self.source.fetch_listing()?;
        let records = parse_listing(&body)?;
        info!("catalog lists {} source releases", records.len());
        Ok(records)
    }
}

/// Parse a listing page into records sorted newest first.
///
/// # Errors
///
/// See [`parse_document`].
///
/// # Examples
///
/// ```
/// use goenv::catalog::parse_listing;
///
/// let page = "<html><body><p>No downloads today.</p></body></html>";
/// assert!(parse_listing(page)?.is_empty());
/// # Ok::<(), goenv::catalog::CrawlError>(())
/// ```
pub fn parse_listing(html: &str) -> Result<Vec<ReleaseRecord>> {
    parse_document(&Html::parse_document(html))
}

/// Extract source-archive records from a parsed page.
///
/// Rows are read from every `table.downloadtable` under `<body>`. A row
/// counts as a source row when it has six cells, the first holds a
/// `filename` cell with a download link, the second reads exactly `Source`
/// with no surrounding whitespace, and the size and checksum cells are
/// filled. Other rows are skipped. The result is sorted by descending
/// version; equal versions keep page order.
///
/// # Errors
///
/// Returns [`CrawlError::MalformedDocument`] when the page has no body, and
/// [`CrawlError::Version`], [`CrawlError::InvalidSize`], or
/// [`CrawlError::InvalidChecksum`] when a source row's fields do not parse.
pub fn parse_document(document: &Html) -> Result<Vec<ReleaseRecord>> {
    let body = find_first(document.root_element(), |e| is_tag(e, "body")).ok_or_else(|| {
        CrawlError::MalformedDocument {
            reason: "document has no <body>".to_owned(),
        }
    })?;

    let mut records = Vec::new();
    for table in find_descendants(body, |e| is_tag(e, "table") && has_class(e, TABLE_CLASS)) {
        for row in find_descendants(table, |e| is_tag(e, "tr")) {
            if let Some(fields) = source_row_fields(row) {
                records.push(fields.into_record()?);
            }
        }
    }

    records.sort_by(|left, right| right.version().cmp(left.version()));
    Ok(records)
}

/// Raw text pulled from one structurally valid source row.
#[derive(Debug)]
struct RowFields {
    filename: String,
    href: String,
    size: String,
    checksum: String,
}

impl RowFields {
    fn into_record(self) -> Result<ReleaseRecord> {
        let version_text = self
            .filename
            .strip_suffix(SOURCE_ARCHIVE_SUFFIX)
            .unwrap_or(&self.filename);
        let version = Version::parse(version_text)?;
        let size = parse_size(&self.size)?;
        let sha256 = Sha256Digest::from_hex(&self.checksum)?;
        debug!("listed {version} ({size} bytes) at {}", self.href);
        Ok(ReleaseRecord::new(version, self.href, size, sha256))
    }
}

/// Read the fields of `row` if it is a source-archive row.
fn source_row_fields(row: ElementRef<'_>) -> Option<RowFields> {
    let cells = child_elements(row, "td");
    let [filename_cell, kind_cell, _os, _arch, size_cell, checksum_cell] = cells.as_slice() else {
        if !cells.is_empty() {
            debug!("skipping row with {} cells, expected {ROW_CELLS}", cells.len());
        }
        return None;
    };

    if !has_class(filename_cell, "filename") {
        return None;
    }
    let anchor = find_first(*filename_cell, |e| is_tag(e, "a") && has_class(e, "download"))?;
    let filename = own_text(&anchor)?;
    let href = anchor.value().attr("href")?.to_owned();

    if raw_text(kind_cell) != SOURCE_KIND {
        debug!("skipping {filename}: not a source archive");
        return None;
    }

    let size = own_text(size_cell)?;
    let checksum_tt = find_first(*checksum_cell, |e| is_tag(e, "tt"))?;
    let checksum = own_text(&checksum_tt)?;

    Some(RowFields {
        filename,
        href,
        size,
        checksum,
    })
}

#[cfg(test)]
#[path = "catalog_tests.rs"]
mod tests;
