//! Library entry points and the per-file driver.
//!
//! `format_source` is the bit-exact entry point: source text plus option
//! text in, formatted text out. The option text is parsed first and all
//! option errors are reported before any formatting happens. `format_file`
//! wraps it with reading, the identical-output check, backups and writing.

use std::path::{Path, PathBuf};

use anyhow::{bail, Context};

use crate::config::Options;
use crate::error::Result;
use crate::format::Formatter;
use crate::opts::parse_option_text;

/// A formatted document plus the line-end bookkeeping the driver needs.
#[derive(Debug)]
pub struct FormattedDocument {
    pub text: String,
    /// Any input line end differed from the configured output style.
    pub line_ends_changed: bool,
}

/// What `format_file` did with a file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileOutcome {
    Unchanged,
    Formatted,
}

/// Format source text according to an option text string.
///
/// The options use the classic syntax: space/comma/newline/tab separated,
/// `--name` or `--name=value` long options, concatenated short options,
/// `#` line comments. All unrecognized options are collected into one
/// error and nothing is formatted.
pub fn format_source(source: &str, options_text: &str) -> Result<String> {
    let partial = parse_option_text(options_text)?;
    let options = Options::resolve(&partial);
    if let Some(problem) = options.validate() {
        bail!("invalid option value: {problem}");
    }
    format_with_options(source, &options)
}

/// Format source text with an already-resolved option set.
pub fn format_with_options(source: &str, options: &Options) -> Result<String> {
    Ok(format_document(source, options).text)
}

/// Format source text, returning the output plus line-end metadata.
#[must_use]
pub fn format_document(source: &str, options: &Options) -> FormattedDocument {
    let mut formatter = Formatter::from_source(options, source);
    let mut text = String::with_capacity(source.len() + source.len() / 8);
    let explicit_eol = options.line_end.as_str();

    while formatter.has_more_lines() {
        let line = formatter.next_line();
        text.push_str(&line);
        if formatter.has_more_lines() {
            text.push_str(explicit_eol.unwrap_or_else(|| formatter.output_eol()));
        }
    }

    let diff = formatter.checksum_diff();
    debug_assert!(
        diff == 0,
        "formatter checksum mismatch: in={} out={}",
        formatter.checksum_in(),
        formatter.checksum_out()
    );
    if diff != 0 {
        log::warn!("internal checksum mismatch ({diff}); output may have lost characters");
    }

    FormattedDocument {
        text,
        line_ends_changed: formatter.line_ends_changed(),
    }
}

/// Format one file in place.
///
/// Unchanged files are left untouched. When `backup_suffix` is set, the
/// original is first copied next to the file with that suffix appended.
/// With `dry_run` nothing is written.
pub fn format_file(
    path: &Path,
    options: &Options,
    backup_suffix: Option<&str>,
    dry_run: bool,
) -> Result<FileOutcome> {
    let source = std::fs::read_to_string(path)
        .with_context(|| format!("cannot read {}", path.display()))?;

    let document = format_document(&source, options);
    if document.text == source {
        return Ok(FileOutcome::Unchanged);
    }
    log::debug!(
        "{}: content changed{}",
        path.display(),
        if document.line_ends_changed {
            " (line ends rewritten)"
        } else {
            ""
        }
    );

    if dry_run {
        return Ok(FileOutcome::Formatted);
    }

    if let Some(suffix) = backup_suffix {
        let backup = backup_path(path, suffix);
        std::fs::write(&backup, &source)
            .with_context(|| format!("cannot write backup {}", backup.display()))?;
    }
    std::fs::write(path, &document.text)
        .with_context(|| format!("cannot write {}", path.display()))?;
    Ok(FileOutcome::Formatted)
}

fn backup_path(path: &Path, suffix: &str) -> PathBuf {
    let mut name = path.as_os_str().to_os_string();
    name.push(suffix);
    PathBuf::from(name)
}
