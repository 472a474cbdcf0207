//! goenv CLI entrypoint.
//!
//! Invoked as `goenv`, this binary manages installed Go releases. Invoked
//! through the `go` or `gofmt` symlinks that `goenv init` creates, it runs
//! that tool from the selected release instead.

use std::ffi::{OsStr, OsString};
use std::io::{self, Write};
use std::path::Path;

use clap::Parser;
use log::LevelFilter;

use goenv::bootstrap::{SHIM_TOOLS, initialise};
use goenv::catalog::{Catalog, HttpListingSource, LISTING_TIMEOUT};
use goenv::cli::{Cli, Command, InstallArgs};
use goenv::config::Config;
use goenv::deadline::Deadline;
use goenv::error::{InstallerError, Result};
use goenv::install_flow::{
    EXTRACTION_TIMEOUT, InstallOptions, ReleaseRequest, install_release, select_release,
    upgrade_target,
};
use goenv::installed::scan_installed;
use goenv::output::{installed_version_lines, remote_version_lines, write_stderr_line};
use goenv::prompt::confirm;
use goenv::release::download::HttpReleaseDownloader;
use goenv::release::extraction::GzipTarExtractor;
use goenv::release::record::ReleaseRecord;
use goenv::shim;

fn main() {
    let args: Vec<OsString> = std::env::args_os().collect();
    let mut stderr = io::stderr();

    let exit_code = if let Some(tool) = args.first().and_then(|argv0| shim_tool(argv0)) {
        init_logging(LevelFilter::Warn);
        let forwarded = args.into_iter().skip(1);
        match shim_binary(tool)
            .and_then(|binary| shim::run(&binary, forwarded).map_err(InstallerError::from))
        {
            Ok(code) => code,
            Err(err) => {
                write_stderr_line(&mut stderr, format!("goenv: {err}"));
                1
            }
        }
    } else {
        let cli = Cli::parse_from(args);
        init_logging(cli.log_level());
        let run_result = run(&cli, &mut io::stdout(), &mut stderr);
        exit_code_for_run_result(run_result, &mut stderr)
    };

    if exit_code != 0 {
        std::process::exit(exit_code);
    }
}

fn init_logging(level: LevelFilter) {
    env_logger::Builder::new()
        .filter_level(level)
        .parse_default_env()
        .format_timestamp(None)
        .init();
}

/// The shimmed tool named by `argv0`, if any.
fn shim_tool(argv0: &OsStr) -> Option<&'static str> {
    let name = Path::new(argv0).file_name()?.to_str()?;
    SHIM_TOOLS.into_iter().find(|tool| *tool == name)
}

fn shim_binary(tool: &str) -> Result<camino::Utf8PathBuf> {
    let config = Config::from_env()?;
    shim::resolve_binary(&config, tool)
}

fn run(cli: &Cli, stdout: &mut dyn Write, stderr: &mut dyn Write) -> Result<()> {
    let from_env = Config::from_env()?;
    let config = match &cli.location {
        Some(location) => from_env.with_location(location)?,
        None => from_env,
    };

    match &cli.command {
        Command::Init(args) => run_init(cli, &config, args.yes, stderr),
        Command::Install(args) => run_install(cli, &config, args, stderr),
        Command::Upgrade(args) => run_upgrade(cli, &config, args.pre, stderr),
        Command::ListRemote(args) => {
            let records = fetch_catalog(&config)?;
            let shown: Vec<ReleaseRecord> = records
                .into_iter()
                .filter(|record| args.pre || record.version().is_stable())
                .collect();
            write_lines(stdout, &remote_version_lines(&shown))
        }
        Command::List => {
            let installed = scan_installed(&config.goroot_dir())?;
            let active = match config.instructed_version() {
                Some(text) => Some(shim::parse_instructed(text)?),
                None => installed.first().map(|entry| entry.version.clone()),
            };
            write_lines(stdout, &installed_version_lines(&installed, active.as_ref()))
        }
    }
}

fn run_init(cli: &Cli, config: &Config, assume_yes: bool, stderr: &mut dyn Write) -> Result<()> {
    let question = format!("Set up goenv in {}?", config.location());
    if !assume_yes && !confirm(&question, &mut io::stdin().lock(), stderr)? {
        return Err(InstallerError::Aborted);
    }

    let current_exe = std::env::current_exe()?;
    for action in initialise(config, &current_exe)? {
        if !cli.quiet {
            write_stderr_line(stderr, action);
        }
    }
    if !cli.quiet {
        write_stderr_line(
            stderr,
            format!("Add {} to PATH to use the go and gofmt shims.", config.bin_dir()),
        );
    }
    Ok(())
}

fn run_install(
    cli: &Cli,
    config: &Config,
    args: &InstallArgs,
    stderr: &mut dyn Write,
) -> Result<()> {
    let records = fetch_catalog(config)?;
    let installed = scan_installed(&config.goroot_dir())?;
    let request = match &args.version {
        Some(version) => ReleaseRequest::Exact(version.clone()),
        None => ReleaseRequest::Newest { allow_pre: args.pre },
    };
    let record = select_release(&records, &installed, &request)?;
    install(cli, config, record, args.keep_archive, stderr)
}

fn run_upgrade(cli: &Cli, config: &Config, allow_pre: bool, stderr: &mut dyn Write) -> Result<()> {
    let records = fetch_catalog(config)?;
    let installed = scan_installed(&config.goroot_dir())?;
    match upgrade_target(&records, &installed, allow_pre) {
        Some(record) => install(cli, config, record, false, stderr),
        None => {
            if !cli.quiet {
                write_stderr_line(stderr, "Already up to date.");
            }
            Ok(())
        }
    }
}

fn install(
    cli: &Cli,
    config: &Config,
    record: &ReleaseRecord,
    keep_archive: bool,
    stderr: &mut dyn Write,
) -> Result<()> {
    let downloader = HttpReleaseDownloader::new(config.origin(), config.download_timeout());
    let deadline = Deadline::after(config.download_timeout().saturating_add(EXTRACTION_TIMEOUT));
    let extractor = GzipTarExtractor::with_deadline(deadline);
    let options = InstallOptions {
        keep_archive,
        quiet: cli.quiet,
    };
    let outcome = install_release(config, record, &downloader, &extractor, options, stderr)?;
    match outcome.kept_archive {
        Some(archive) if !cli.quiet => {
            write_stderr_line(stderr, format!("Archive kept at {archive}"));
        }
        _ => {}
    }
    Ok(())
}

fn fetch_catalog(config: &Config) -> Result<Vec<ReleaseRecord>> {
    let catalog = Catalog::new(HttpListingSource::new(config.origin(), LISTING_TIMEOUT));
    Ok(catalog.fetch()?)
}

fn write_lines(stdout: &mut dyn Write, lines: &[String]) -> Result<()> {
    for line in lines {
        writeln!(stdout, "{line}").map_err(|source| InstallerError::WriteFailed { source })?;
    }
    Ok(())
}

fn exit_code_for_run_result(result: Result<()>, stderr: &mut dyn Write) -> i32 {
    match result {
        Ok(()) => 0,
        Err(err) => {
            write_stderr_line(stderr, format!("goenv: {err}"));
            if err.is_retriable() {
                write_stderr_line(stderr, "This failure may be temporary; try again later.");
            }
            1
        }
    }
}
