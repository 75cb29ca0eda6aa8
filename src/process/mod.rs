//! The formatting pipeline: library entry points and the file driver.

pub mod pipeline;

pub use pipeline::{
    format_document, format_file, format_source, format_with_options, FileOutcome,
    FormattedDocument,
};
