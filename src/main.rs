//! cstyler - Source code beautifier for C-family languages

#![warn(clippy::all)]
#![warn(clippy::pedantic)]

use std::io::{self, IsTerminal, Read, Write};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};

use cstyler::config::{Options, PartialOptions};
use cstyler::process::{format_file, format_with_options, FileOutcome};
use cstyler::{parse_args, CliArgs, Result};
use glob::Pattern;
use rayon::prelude::*;
use walkdir::WalkDir;

/// C-family file extensions to process
const C_EXTENSIONS: &[&str] = &[
    "c", "cc", "cpp", "cxx", "c++", "h", "hh", "hpp", "hxx", "h++", "m", "mm",
];

/// Maximum file size in bytes; larger files are skipped
const MAX_FILE_SIZE: u64 = 100 * 1024 * 1024;

fn main() -> Result<()> {
    let args = parse_args();

    let mut builder = env_logger::Builder::from_default_env();
    if args.verbose {
        builder.filter_level(log::LevelFilter::Debug);
    } else if args.quiet {
        builder.filter_level(log::LevelFilter::Warn);
    } else {
        builder.filter_level(log::LevelFilter::Info);
    }
    builder.format_timestamp(None).init();

    if args.inputs.is_empty() {
        if io::stdin().is_terminal() {
            cstyler::build_cli().print_help()?;
            println!();
            return Ok(());
        }
        return process_stdin(&args);
    }

    if let Some(jobs) = args.jobs {
        if jobs > 0 {
            if let Err(e) = rayon::ThreadPoolBuilder::new()
                .num_threads(jobs)
                .build_global()
            {
                log::warn!("failed to configure thread pool: {e}");
            }
        }
    }

    let files = collect_files(&args);
    if files.is_empty() {
        log::warn!("no C-family files found to format");
        return Ok(());
    }

    if args.stdout || args.jobs == Some(1) {
        process_files_sequential(&files, &args);
    } else {
        process_files_parallel(&files, &args);
    }
    Ok(())
}

/// Resolve the option set for one file: discovered TOML config, then an
/// options file in the classic syntax, then CLI flags, most specific last.
/// `--project` pins the discovery root; otherwise each file's directory is
/// the starting point.
fn build_options(args: &CliArgs, for_path: Option<&Path>) -> Result<Options> {
    let mut partial = match args.options_file.as_deref() {
        Some("none") => PartialOptions::default(),
        Some(path) => {
            let text = std::fs::read_to_string(path)?;
            cstyler::opts::parse_option_text(&text)?
        }
        None => {
            let start = args
                .project
                .clone()
                .or_else(|| for_path.map(Path::to_path_buf))
                .or_else(|| std::env::current_dir().ok())
                .unwrap_or_default();
            PartialOptions::from_discovered_files(&start)
        }
    };
    partial.merge(&args.format);
    let options = Options::resolve(&partial);
    if let Some(problem) = options.validate() {
        anyhow::bail!("invalid option value: {problem}");
    }
    Ok(options)
}

/// Collect all files to process, handling directories and the recursive flag.
fn collect_files(args: &CliArgs) -> Vec<PathBuf> {
    let exclude_patterns: Vec<Pattern> = args
        .exclude
        .iter()
        .filter_map(|p| Pattern::new(p).ok())
        .collect();

    let mut files = Vec::new();
    for input in &args.inputs {
        if input.is_file() {
            if !is_excluded(input, &exclude_patterns) {
                files.push(input.clone());
            }
        } else if input.is_dir() {
            if args.recursive {
                for entry in WalkDir::new(input)
                    .follow_links(true)
                    .max_depth(256)
                    .into_iter()
                    .filter_map(std::result::Result::ok)
                {
                    let path = entry.path();
                    if path.is_file()
                        && is_c_family_file(path)
                        && !is_excluded(path, &exclude_patterns)
                    {
                        files.push(path.to_path_buf());
                    }
                }
            } else if let Ok(entries) = std::fs::read_dir(input) {
                for entry in entries.filter_map(std::result::Result::ok) {
                    let path = entry.path();
                    if path.is_file()
                        && is_c_family_file(&path)
                        && !is_excluded(&path, &exclude_patterns)
                    {
                        files.push(path);
                    }
                }
            }
        } else {
            log::warn!("skipping {}: not a file or directory", input.display());
        }
    }
    files
}

/// Check if a path matches any exclusion pattern: the full path, the file
/// name, or any path component.
fn is_excluded(path: &Path, patterns: &[Pattern]) -> bool {
    if patterns.is_empty() {
        return false;
    }
    let path_str = path.to_string_lossy();
    for pattern in patterns {
        if pattern.matches(&path_str) {
            return true;
        }
        if let Some(file_name) = path.file_name() {
            if pattern.matches(&file_name.to_string_lossy()) {
                return true;
            }
        }
        for component in path.components() {
            if let std::path::Component::Normal(c) = component {
                if pattern.matches(&c.to_string_lossy()) {
                    return true;
                }
            }
        }
    }
    false
}

fn is_c_family_file(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| {
            let lower = ext.to_ascii_lowercase();
            C_EXTENSIONS.contains(&lower.as_str())
        })
}

fn process_files_sequential(files: &[PathBuf], args: &CliArgs) {
    for path in files {
        if let Err(e) = process_single_file(path, args) {
            log::error!("{}: {e}", path.display());
        }
    }
}

fn process_files_parallel(files: &[PathBuf], args: &CliArgs) {
    let formatted_count = AtomicUsize::new(0);
    let error_count = AtomicUsize::new(0);

    files.par_iter().for_each(|path| match process_single_file(path, args) {
        Ok(FileOutcome::Formatted) => {
            formatted_count.fetch_add(1, Ordering::Relaxed);
        }
        Ok(FileOutcome::Unchanged) => {}
        Err(e) => {
            error_count.fetch_add(1, Ordering::Relaxed);
            log::error!("{}: {e}", path.display());
        }
    });

    let formatted = formatted_count.load(Ordering::Relaxed);
    let errors = error_count.load(Ordering::Relaxed);
    if !args.quiet {
        if errors == 0 {
            log::info!("formatted {formatted} of {} files", files.len());
        } else {
            log::info!(
                "formatted {formatted} of {} files, {errors} errors",
                files.len()
            );
        }
    }
}

fn process_single_file(path: &PathBuf, args: &CliArgs) -> Result<FileOutcome> {
    let metadata = std::fs::metadata(path)?;
    if metadata.len() > MAX_FILE_SIZE {
        log::warn!(
            "skipping {} ({} MB exceeds the {} MB limit)",
            path.display(),
            metadata.len() / (1024 * 1024),
            MAX_FILE_SIZE / (1024 * 1024)
        );
        return Ok(FileOutcome::Unchanged);
    }

    let options = build_options(args, Some(path))?;

    if args.stdout {
        let source = std::fs::read_to_string(path)?;
        let text = format_with_options(&source, &options)?;
        io::stdout().write_all(text.as_bytes())?;
        return Ok(FileOutcome::Formatted);
    }

    let suffix = if args.suffix == "none" {
        None
    } else {
        Some(args.suffix.as_str())
    };
    let outcome = format_file(path, &options, suffix, args.dry_run)?;
    match outcome {
        FileOutcome::Formatted => {
            if args.formatted_only {
                println!("{}", path.display());
            } else {
                log::info!("formatted  {}", path.display());
            }
        }
        FileOutcome::Unchanged => {
            if !args.formatted_only {
                log::debug!("unchanged  {}", path.display());
            }
        }
    }
    Ok(outcome)
}

/// Format stdin to stdout.
fn process_stdin(args: &CliArgs) -> Result<()> {
    let mut source = String::new();
    io::stdin().read_to_string(&mut source)?;
    let options = build_options(args, None)?;
    let text = format_with_options(&source, &options)?;
    io::stdout().write_all(text.as_bytes())?;
    Ok(())
}
