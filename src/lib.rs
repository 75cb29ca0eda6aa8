//! cstyler - Source code beautifier for C-family languages
//!
//! A C/C++ beautifier that normalizes indentation, brace placement,
//! operator and parenthesis padding, and line-end style.

#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::too_many_lines)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::struct_excessive_bools)]

pub mod cli;
pub mod config;
pub mod error;
pub mod format;
pub mod lexer;
pub mod opts;
pub mod process;

// Re-export commonly used types
pub use cli::{build_cli, parse_args, parse_args_from, CliArgs};
pub use config::{
    BraceMode, FormatStyle, IndentStyle, LineEnding, MethodColonPad, MinConditional, Options,
    PointerAlign, ReferenceAlign,
};
pub use error::Result;
pub use process::{format_source, format_with_options};
