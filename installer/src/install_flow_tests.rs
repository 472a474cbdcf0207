//! Unit tests for release selection and the install pipeline.

use super::*;
use crate::release::download::{FetchError, MockReleaseDownloader};
use crate::release::extraction::{ExtractError, MockArchiveExtractor};
use crate::release::record::ArchiveHandle;
use crate::test_utils::record_for;
use rstest::{fixture, rstest};
use std::path::Path;
use tempfile::TempDir;

fn records(names: &[&str]) -> Vec<ReleaseRecord> {
    names
        .iter()
        .map(|name| record_for(name, name.as_bytes()))
        .collect()
}

fn installed(names: &[&str]) -> Vec<InstalledVersion> {
    names
        .iter()
        .map(|name| InstalledVersion {
            version: Version::parse(name).expect("valid version"),
            path: Utf8PathBuf::from("/usr/local/go/goroot").join(name),
        })
        .collect()
}

const CATALOG: [&str; 4] = ["go1.22rc1", "go1.21.1", "go1.21.0", "go1.20.8"];

#[rstest]
#[case::prefixed("go1.21.0")]
#[case::bare("1.21.0")]
fn exact_request_matches_version_text(#[case] text: &str) {
    let catalog = records(&CATALOG);
    let request = ReleaseRequest::Exact(text.to_owned());

    let chosen = select_release(&catalog, &[], &request).expect("listed");

    assert_eq!(chosen.version().as_str(), "go1.21.0");
}

#[test]
fn exact_request_for_unlisted_version_fails() {
    let catalog = records(&CATALOG);
    let request = ReleaseRequest::Exact("go1.19.1".to_owned());

    let err = select_release(&catalog, &[], &request).expect_err("not listed");

    assert!(matches!(err, InstallerError::ReleaseNotFound { ref version } if version == "go1.19.1"));
}

#[rstest]
#[case::stable_only(false, &[], "go1.21.1")]
#[case::pre_releases(true, &[], "go1.22rc1")]
#[case::skips_installed(false, &["go1.21.1"], "go1.21.0")]
#[case::skips_installed_pre(true, &["go1.22rc1", "go1.21.1"], "go1.21.0")]
fn newest_request_skips_ineligible_and_installed(
    #[case] allow_pre: bool,
    #[case] present: &[&str],
    #[case] expected: &str,
) {
    let catalog = records(&CATALOG);
    let request = ReleaseRequest::Newest { allow_pre };

    let chosen = select_release(&catalog, &installed(present), &request).expect("eligible");

    assert_eq!(chosen.version().as_str(), expected);
}

#[test]
fn newest_request_with_everything_installed_fails() {
    let catalog = records(&["go1.21.0", "go1.20.8"]);
    let request = ReleaseRequest::Newest { allow_pre: false };

    let err = select_release(&catalog, &installed(&["go1.20.8", "go1.21.0"]), &request)
        .expect_err("nothing left");

    assert!(matches!(err, InstallerError::NothingToInstall));
}

#[rstest]
#[case::nothing_installed(&[], false, Some("go1.21.1"))]
#[case::older_installed(&["go1.20.8"], false, Some("go1.21.1"))]
#[case::up_to_date(&["go1.21.1"], false, None)]
#[case::newer_pre_release_installed(&["go1.22rc1"], false, None)]
#[case::pre_release_upgrade(&["go1.21.1"], true, Some("go1.22rc1"))]
fn upgrade_target_requires_a_newer_release(
    #[case] present: &[&str],
    #[case] allow_pre: bool,
    #[case] expected: Option<&str>,
) {
    let catalog = records(&CATALOG);

    let target = upgrade_target(&catalog, &installed(present), allow_pre);

    assert_eq!(target.map(|record| record.version().as_str()), expected);
}

struct Location {
    _temp: TempDir,
    config: Config,
}

impl Location {
    fn target(&self, version: &str) -> Utf8PathBuf {
        self.config.goroot_dir().join(version)
    }
}

#[fixture]
fn location() -> Location {
    let temp = TempDir::new().expect("temp dir");
    let root = temp.path().to_str().expect("utf-8 temp path").to_owned();
    let config = Config::from_lookup(move |name| {
        (name == crate::config::LOCATION_VAR).then(|| root.clone())
    })
    .expect("config loads");
    Location {
        _temp: temp,
        config,
    }
}

fn writing_downloader() -> MockReleaseDownloader {
    let mut downloader = MockReleaseDownloader::new();
    downloader
        .expect_download()
        .times(1)
        .returning(|record: &ReleaseRecord, dir: &Path| {
            let path = dir.join(record.archive_filename());
            std::fs::write(&path, b"archive bytes")?;
            Ok(ArchiveHandle::new(path, record.clone()))
        });
    downloader
}

fn unpacking_extractor() -> MockArchiveExtractor {
    let mut extractor = MockArchiveExtractor::new();
    extractor
        .expect_extract()
        .times(1)
        .returning(|_handle: &ArchiveHandle, target: &Path| {
            let bin = target.join("go").join("bin");
            std::fs::create_dir_all(&bin)?;
            std::fs::write(bin.join("go"), b"#!/bin/sh\n")?;
            Ok(())
        });
    extractor
}

#[rstest]
fn installs_into_version_directory(location: Location) {
    let record = record_for("go1.21.0", b"archive bytes");
    let mut stderr = Vec::new();

    let outcome = install_release(
        &location.config,
        &record,
        &writing_downloader(),
        &unpacking_extractor(),
        InstallOptions::default(),
        &mut stderr,
    )
    .expect("install succeeds");

    assert_eq!(outcome.path, location.target("go1.21.0"));
    assert_eq!(outcome.kept_archive, None);
    assert!(outcome.path.join("go/bin/go").is_file());
    let progress = String::from_utf8(stderr).expect("utf-8 output");
    assert!(progress.contains("Downloading go1.21.0..."));
    assert!(progress.contains("Installed go1.21.0"));
    let leftovers: Vec<_> = std::fs::read_dir(location.config.location())
        .expect("read location")
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.file_name().to_string_lossy().into_owned())
        .filter(|name| name.starts_with(STAGING_PREFIX))
        .collect();
    assert!(leftovers.is_empty(), "staging left behind: {leftovers:?}");
}

#[rstest]
fn keep_archive_moves_it_to_downloads(location: Location) {
    let record = record_for("go1.21.0", b"archive bytes");

    let outcome = install_release(
        &location.config,
        &record,
        &writing_downloader(),
        &unpacking_extractor(),
        InstallOptions {
            keep_archive: true,
            quiet: true,
        },
        &mut std::io::sink(),
    )
    .expect("install succeeds");

    let kept = outcome.kept_archive.expect("archive kept");
    assert_eq!(
        kept,
        location
            .config
            .location()
            .join("downloads/go1.21.0.src.tar.gz")
    );
    assert_eq!(std::fs::read(&kept).expect("read kept"), b"archive bytes");
}

#[rstest]
fn quiet_install_writes_nothing(location: Location) {
    let record = record_for("go1.21.0", b"archive bytes");
    let mut stderr = Vec::new();

    install_release(
        &location.config,
        &record,
        &writing_downloader(),
        &unpacking_extractor(),
        InstallOptions {
            keep_archive: false,
            quiet: true,
        },
        &mut stderr,
    )
    .expect("install succeeds");

    assert!(stderr.is_empty());
}

#[rstest]
fn existing_version_directory_is_refused(location: Location) {
    let record = record_for("go1.21.0", b"archive bytes");
    std::fs::create_dir_all(location.target("go1.21.0")).expect("pre-create");
    let mut downloader = MockReleaseDownloader::new();
    downloader.expect_download().times(0);
    let mut extractor = MockArchiveExtractor::new();
    extractor.expect_extract().times(0);

    let err = install_release(
        &location.config,
        &record,
        &downloader,
        &extractor,
        InstallOptions::default(),
        &mut std::io::sink(),
    )
    .expect_err("already installed");

    assert!(matches!(err, InstallerError::AlreadyInstalled { .. }));
}

#[rstest]
fn failed_extraction_removes_partial_tree(location: Location) {
    let record = record_for("go1.21.0", b"archive bytes");
    let mut extractor = MockArchiveExtractor::new();
    extractor
        .expect_extract()
        .returning(|_handle: &ArchiveHandle, target: &Path| {
            std::fs::create_dir_all(target.join("go/src"))?;
            Err(ExtractError::UnsupportedEntryType {
                path: "go/src/link".to_owned(),
                kind: "Symlink".to_owned(),
            })
        });

    let err = install_release(
        &location.config,
        &record,
        &writing_downloader(),
        &extractor,
        InstallOptions::default(),
        &mut std::io::sink(),
    )
    .expect_err("extraction fails");

    assert!(matches!(
        err,
        InstallerError::Extract(ExtractError::UnsupportedEntryType { .. })
    ));
    assert!(!location.target("go1.21.0").exists());
}

#[rstest]
fn failed_download_creates_no_version_directory(location: Location) {
    let record = record_for("go1.21.0", b"archive bytes");
    let mut downloader = MockReleaseDownloader::new();
    downloader.expect_download().returning(|_, _| {
        Err(FetchError::UnexpectedStatus {
            url: "https://go.dev/dl/go1.21.0.src.tar.gz".to_owned(),
            status: 503,
        })
    });
    let mut extractor = MockArchiveExtractor::new();
    extractor.expect_extract().times(0);

    let err = install_release(
        &location.config,
        &record,
        &downloader,
        &extractor,
        InstallOptions::default(),
        &mut std::io::sink(),
    )
    .expect_err("download fails");

    assert!(err.is_retriable());
    assert!(!location.target("go1.21.0").exists());
}

#[rstest]
fn held_lock_fails_fast(location: Location) {
    std::fs::create_dir_all(location.config.location()).expect("location exists");
    let holder = File::create(location.config.lock_path()).expect("create lock");
    fs2::FileExt::lock_exclusive(&holder).expect("hold lock");
    let record = record_for("go1.21.0", b"archive bytes");
    let mut downloader = MockReleaseDownloader::new();
    downloader.expect_download().times(0);

    let err = install_release(
        &location.config,
        &record,
        &downloader,
        &MockArchiveExtractor::new(),
        InstallOptions::default(),
        &mut std::io::sink(),
    )
    .expect_err("lock held");

    assert!(matches!(err, InstallerError::Locked { .. }));
}
