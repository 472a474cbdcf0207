//! Shared test utilities for the goenv crate.
//!
//! Builders for listing pages, tar.gz fixtures, and archive handles, plus a
//! one-shot loopback HTTP server so that the `ureq` paths run without
//! reaching the network.

use std::io::{BufRead, BufReader, Write};
use std::net::TcpListener;
use std::path::Path;
use std::thread::{self, JoinHandle};

use flate2::Compression;
use flate2::write::GzEncoder;

use crate::config::{GOCMD_VAR, LOCATION_VAR, ORIGIN_VAR, TIMEOUT_VAR};
use crate::release::record::{ArchiveHandle, ReleaseRecord};
use crate::release::sha256_digest::Sha256Digest;
use crate::version::Version;

/// Returns the lowercase hex SHA-256 of `data`.
pub fn sha256_hex(data: &[u8]) -> String {
    Sha256Digest::of_bytes(data).to_string()
}

/// Builds a record for `version` whose checksum matches `archive`.
pub fn record_for(version: &str, archive: &[u8]) -> ReleaseRecord {
    ReleaseRecord::new(
        Version::parse(version).expect("fixture version parses"),
        format!("/dl/{version}.src.tar.gz"),
        u64::try_from(archive.len()).expect("fixture size fits"),
        Sha256Digest::of_bytes(archive),
    )
}

/// Runs `f` with the goenv variables set to `location`, `origin`, and
/// `gocmd`, and the timeout unset.
pub fn with_goenv_env<R>(
    location: &str,
    origin: &str,
    gocmd: Option<&str>,
    f: impl FnOnce() -> R,
) -> R {
    temp_env::with_vars(
        [
            (LOCATION_VAR, Some(location)),
            (ORIGIN_VAR, Some(origin)),
            (GOCMD_VAR, gocmd),
            (TIMEOUT_VAR, None),
        ],
        f,
    )
}

/// Writes `archive` into `dir` and returns a handle whose record expects
/// `expected` as the checksum.
pub fn archive_handle(
    dir: &Path,
    version: &str,
    archive: &[u8],
    expected: Sha256Digest,
) -> ArchiveHandle {
    let record = ReleaseRecord::new(
        Version::parse(version).expect("fixture version parses"),
        format!("/dl/{version}.src.tar.gz"),
        u64::try_from(archive.len()).expect("fixture size fits"),
        expected,
    );
    let path = dir.join(record.archive_filename());
    std::fs::write(&path, archive).expect("write fixture archive");
    ArchiveHandle::new(path, record)
}

/// One entry of a tar.gz fixture.
#[derive(Debug, Clone)]
pub enum FixtureEntry {
    /// A directory entry.
    Directory {
        /// Entry path inside the archive.
        path: &'static str,
        /// Permission bits.
        mode: u32,
    },
    /// A regular file entry.
    File {
        /// Entry path inside the archive.
        path: &'static str,
        /// Permission bits.
        mode: u32,
        /// File payload.
        contents: Vec<u8>,
    },
    /// A symbolic link entry.
    Symlink {
        /// Entry path inside the archive.
        path: &'static str,
        /// Link target.
        target: &'static str,
    },
    /// A regular file whose name bypasses the builder's path checks.
    RawName {
        /// Name bytes written straight into the header.
        name: &'static str,
        /// File payload.
        contents: Vec<u8>,
    },
    /// A pax global extended header.
    PaxGlobal,
}

/// Builds a gzip-compressed tar archive from `entries`.
pub fn gzip_tar(entries: &[FixtureEntry]) -> Vec<u8> {
    let encoder = GzEncoder::new(Vec::new(), Compression::default());
    let mut builder = tar::Builder::new(encoder);
    for entry in entries {
        append_fixture(&mut builder, entry);
    }
    let encoder = builder.into_inner().expect("tar finish");
    encoder.finish().expect("gzip finish")
}

fn append_fixture<W: Write>(builder: &mut tar::Builder<W>, entry: &FixtureEntry) {
    let mut header = tar::Header::new_gnu();
    match entry {
        FixtureEntry::Directory { path, mode } => {
            header.set_entry_type(tar::EntryType::Directory);
            header.set_mode(*mode);
            header.set_size(0);
            builder
                .append_data(&mut header, path, std::io::empty())
                .expect("append directory");
        }
        FixtureEntry::File {
            path,
            mode,
            contents,
        } => {
            header.set_entry_type(tar::EntryType::Regular);
            header.set_mode(*mode);
            header.set_size(u64::try_from(contents.len()).expect("size fits"));
            builder
                .append_data(&mut header, path, contents.as_slice())
                .expect("append file");
        }
        FixtureEntry::Symlink { path, target } => {
            header.set_entry_type(tar::EntryType::Symlink);
            header.set_mode(0o777);
            header.set_size(0);
            builder
                .append_link(&mut header, path, target)
                .expect("append symlink");
        }
        FixtureEntry::RawName { name, contents } => {
            let field = &mut header.as_old_mut().name;
            field
                .get_mut(..name.len())
                .expect("name fits in header")
                .copy_from_slice(name.as_bytes());
            header.set_entry_type(tar::EntryType::Regular);
            header.set_mode(0o644);
            header.set_size(u64::try_from(contents.len()).expect("size fits"));
            header.set_cksum();
            builder
                .append(&header, contents.as_slice())
                .expect("append raw entry");
        }
        FixtureEntry::PaxGlobal => {
            let records = b"22 comment=goenv test\n";
            header.set_entry_type(tar::EntryType::XGlobalHeader);
            header.set_mode(0o644);
            header.set_size(u64::try_from(records.len()).expect("size fits"));
            builder
                .append_data(&mut header, "pax_global_header", records.as_slice())
                .expect("append pax header");
        }
    }
}

/// One row of a listing page fixture.
#[derive(Debug, Clone)]
pub struct ListingRow {
    filename: String,
    kind: String,
    size: String,
    checksum: String,
}

impl ListingRow {
    /// A source-archive row for `version` with a checksum of `payload`.
    pub fn source(version: &str, size: &str, payload: &[u8]) -> Self {
        Self {
            filename: format!("{version}.src.tar.gz"),
            kind: "Source".to_owned(),
            size: size.to_owned(),
            checksum: sha256_hex(payload),
        }
    }

    /// Replaces the kind column.
    #[must_use]
    pub fn with_kind(mut self, kind: &str) -> Self {
        kind.clone_into(&mut self.kind);
        self
    }

    /// Replaces the filename anchor text.
    #[must_use]
    pub fn with_filename(mut self, filename: &str) -> Self {
        filename.clone_into(&mut self.filename);
        self
    }

    /// Replaces the size column.
    #[must_use]
    pub fn with_size(mut self, size: &str) -> Self {
        size.clone_into(&mut self.size);
        self
    }

    /// Replaces the checksum column.
    #[must_use]
    pub fn with_checksum(mut self, checksum: &str) -> Self {
        checksum.clone_into(&mut self.checksum);
        self
    }

    /// Renders the row the way the download page lays it out.
    pub fn to_html(&self) -> String {
        format!(
            concat!(
                "<tr>\n",
                "  <td class=\"filename\"><a class=\"download\" href=\"/dl/{filename}\">{filename}</a></td>\n",
                "  <td>{kind}</td>\n",
                "  <td></td>\n",
                "  <td></td>\n",
                "  <td>{size}</td>\n",
                "  <td><tt>{checksum}</tt></td>\n",
                "</tr>\n"
            ),
            filename = self.filename,
            kind = self.kind,
            size = self.size,
            checksum = self.checksum,
        )
    }
}

/// Renders a listing page with one download table holding `rows`.
pub fn listing_html(rows: &[ListingRow]) -> String {
    let body: String = rows.iter().map(ListingRow::to_html).collect();
    format!(
        concat!(
            "<!DOCTYPE html>\n<html>\n<head><title>All releases</title></head>\n<body>\n",
            "<h2>Stable versions</h2>\n",
            "<table class=\"downloadtable\">\n",
            "<thead><tr class=\"first\">\n",
            "  <th>File name</th><th>Kind</th><th>OS</th><th>Arch</th><th>Size</th><th>SHA256 Checksum</th>\n",
            "</tr></thead>\n",
            "{body}",
            "</table>\n</body>\n</html>\n"
        ),
        body = body,
    )
}

/// A canned HTTP response for [`serve_once`].
#[derive(Debug, Clone)]
pub struct ServedResponse {
    status: u16,
    body: Vec<u8>,
}

impl ServedResponse {
    /// `200 OK` with `body`.
    pub fn ok(body: Vec<u8>) -> Self {
        Self { status: 200, body }
    }

    /// An empty response with `status`.
    pub fn status(status: u16) -> Self {
        Self {
            status,
            body: Vec::new(),
        }
    }

    fn to_bytes(&self) -> Vec<u8> {
        let mut bytes = format!(
            "HTTP/1.1 {} Fixture\r\nContent-Length: {}\r\nConnection: close\r\n\r\n",
            self.status,
            self.body.len()
        )
        .into_bytes();
        bytes.extend_from_slice(&self.body);
        bytes
    }
}

/// A loopback server that answers exactly one request.
#[derive(Debug)]
pub struct OneShotServer {
    origin: String,
    handle: Option<JoinHandle<String>>,
}

impl OneShotServer {
    /// `http://127.0.0.1:<port>`.
    pub fn origin(&self) -> String {
        self.origin.clone()
    }

    /// Waits for the request and returns its path.
    ///
    /// # Panics
    ///
    /// Panics if called twice or if the server thread panicked.
    pub fn requested_path(mut self) -> String {
        self.handle
            .take()
            .expect("request path already taken")
            .join()
            .expect("server thread")
    }
}

/// Starts a server that answers the next request with `response`.
pub fn serve_once(response: ServedResponse) -> OneShotServer {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind loopback");
    let address = listener.local_addr().expect("local address");
    let handle = thread::spawn(move || {
        let (mut stream, _) = listener.accept().expect("accept connection");
        let mut reader = BufReader::new(stream.try_clone().expect("clone stream"));
        let mut request_line = String::new();
        reader
            .read_line(&mut request_line)
            .expect("read request line");
        let mut header = String::new();
        loop {
            header.clear();
            let read = reader.read_line(&mut header).expect("read header");
            if read == 0 || header == "\r\n" || header == "\n" {
                break;
            }
        }
        stream
            .write_all(&response.to_bytes())
            .expect("write response");
        stream.flush().expect("flush response");
        request_line
            .split_whitespace()
            .nth(1)
            .unwrap_or_default()
            .to_owned()
    });
    OneShotServer {
        origin: format!("http://{address}"),
        handle: Some(handle),
    }
}

/// An origin on which nothing is listening.
pub fn closed_port_origin() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind loopback");
    let address = listener.local_addr().expect("local address");
    drop(listener);
    format!("http://{address}")
}
