//! Command-line interface for cstyler.
//!
//! Defines CLI arguments using the clap builder API. Formatting flags map
//! onto [`PartialOptions`] so they can be merged over discovered config
//! files and an explicit options file.

use std::path::PathBuf;

use clap::{Arg, ArgAction, Command};

use crate::config::{IndentStyle, LineEnding, PartialOptions, PointerAlign, ReferenceAlign};

/// CLI arguments parsed from the command line.
#[derive(Debug, Clone)]
pub struct CliArgs {
    /// Files or directories to format
    pub inputs: Vec<PathBuf>,

    /// Formatting options set on the command line
    pub format: PartialOptions,

    /// Options file in the classic syntax (`none` disables discovery)
    pub options_file: Option<String>,

    /// Project root for TOML config discovery
    pub project: Option<PathBuf>,

    /// Process directories recursively
    pub recursive: bool,

    /// Exclusion patterns (matched against path, file name, components)
    pub exclude: Vec<String>,

    /// Backup suffix; `none` disables backups
    pub suffix: String,

    /// Report what would change without writing
    pub dry_run: bool,

    /// Print only the names of files that were formatted
    pub formatted_only: bool,

    /// Write the result to stdout instead of in place
    pub stdout: bool,

    /// Number of parallel jobs (0 = automatic)
    pub jobs: Option<usize>,

    /// Raise log verbosity
    pub verbose: bool,

    /// Suppress per-file messages
    pub quiet: bool,
}

/// Build the clap command definition.
#[must_use]
pub fn build_cli() -> Command {
    Command::new("cstyler")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Source code beautifier for C-family languages")
        .arg(
            Arg::new("inputs")
                .value_name("FILE")
                .num_args(0..)
                .value_parser(clap::value_parser!(PathBuf))
                .help("Files or directories to format; stdin when omitted"),
        )
        .arg(
            Arg::new("style")
                .long("style")
                .value_name("NAME")
                .help("Brace style: allman, java, kr, stroustrup, whitesmith, banner, gnu, linux, horstmann, 1tbs, google, pico, lisp"),
        )
        .arg(
            Arg::new("indent")
                .short('s')
                .long("indent")
                .value_name("N")
                .value_parser(clap::value_parser!(usize))
                .help("Spaces per indent level (2-20)"),
        )
        .arg(
            Arg::new("indent-style")
                .long("indent-style")
                .value_name("KIND")
                .help("Indent characters: spaces, tab, force-tab, force-tab-x"),
        )
        .arg(
            Arg::new("tab-length")
                .long("tab-length")
                .value_name("N")
                .value_parser(clap::value_parser!(usize))
                .help("Tab width for force-tab-x"),
        )
        .arg(flag("indent-classes", 'C', "Indent class bodies an extra level"))
        .arg(flag("indent-modifiers", 'G', "Indent access modifiers one half level"))
        .arg(flag("indent-switches", 'S', "Indent switch bodies"))
        .arg(flag("indent-cases", 'K', "Indent case blocks"))
        .arg(flag("indent-namespaces", 'N', "Indent namespace bodies"))
        .arg(flag("indent-labels", 'L', "Indent goto labels"))
        .arg(flag("indent-preproc-define", 'w', "Indent multi-line #define bodies"))
        .arg(flag("indent-preproc-cond", 'x', "Indent #if/#else/#endif like code"))
        .arg(flag("indent-col1-comments", 'Y', "Indent comments starting in column 1"))
        .arg(flag("pad-oper", 'p', "Pad binary operators with spaces"))
        .arg(flag("pad-paren", 'P', "Pad parentheses outside and inside"))
        .arg(long_flag("pad-paren-out", "Pad parentheses on the outside"))
        .arg(long_flag("pad-first-paren-out", "Pad only the first paren outside"))
        .arg(long_flag("pad-paren-in", "Pad parentheses on the inside"))
        .arg(long_flag("pad-header", "Pad the paren after headers"))
        .arg(flag("unpad-paren", 'U', "Remove extra paren padding"))
        .arg(long_flag("delete-empty-lines", "Delete empty lines inside functions"))
        .arg(long_flag("fill-empty-lines", "Fill empty lines with the previous indent"))
        .arg(flag("convert-tabs", 'c', "Convert tabs to spaces in code"))
        .arg(long_flag("close-templates", "Close template angle brackets: > > to >>"))
        .arg(long_flag("remove-comment-prefix", "Strip leading * from comment lines"))
        .arg(long_flag("attach-classes", "Attach braces to class declarations"))
        .arg(long_flag("attach-namespaces", "Attach braces to namespace declarations"))
        .arg(long_flag("attach-inlines", "Attach braces to class inline methods"))
        .arg(long_flag("attach-extern-c", "Attach braces to extern \"C\" blocks"))
        .arg(flag("break-closing-brackets", 'y', "Break closing header braces"))
        .arg(flag("break-elseifs", 'e', "Break else-if chains apart"))
        .arg(flag("add-brackets", 'j', "Add braces to unbraced one-line bodies"))
        .arg(flag("add-one-line-brackets", 'J', "Add braces without breaking the line"))
        .arg(long_flag("remove-brackets", "Remove braces from single-statement bodies"))
        .arg(flag("keep-one-line-blocks", 'O', "Do not break one-line blocks"))
        .arg(flag("keep-one-line-statements", 'o', "Do not break multi-statement lines"))
        .arg(flag("break-blocks", 'f', "Insert empty lines around blocks"))
        .arg(flag("break-blocks-all", 'F', "Insert empty lines around closing blocks too"))
        .arg(long_flag("break-after-logical", "Put && and || at line ends when splitting"))
        .arg(
            Arg::new("align-pointer")
                .short('k')
                .long("align-pointer")
                .value_name("POS")
                .help("Pointer alignment: type, middle, name"),
        )
        .arg(
            Arg::new("align-reference")
                .short('W')
                .long("align-reference")
                .value_name("POS")
                .help("Reference alignment: none, type, middle, name"),
        )
        .arg(
            Arg::new("max-code-length")
                .short('M')
                .long("max-code-length")
                .value_name("N")
                .value_parser(clap::value_parser!(usize))
                .help("Break lines longer than N columns (50-200)"),
        )
        .arg(
            Arg::new("lineend")
                .short('z')
                .long("lineend")
                .value_name("KIND")
                .help("Output line ends: windows, linux, macold"),
        )
        .arg(
            Arg::new("options")
                .long("options")
                .value_name("FILE")
                .help("Options file in the classic syntax; `none` disables discovery"),
        )
        .arg(
            Arg::new("project")
                .long("project")
                .value_name("DIR")
                .value_parser(clap::value_parser!(PathBuf))
                .help("Start cstyler.toml discovery from DIR instead of each file's directory"),
        )
        .arg(flag("recursive", 'r', "Process directories recursively"))
        .arg(
            Arg::new("exclude")
                .long("exclude")
                .value_name("PATTERN")
                .action(ArgAction::Append)
                .help("Exclude files and directories matching the pattern"),
        )
        .arg(
            Arg::new("suffix")
                .long("suffix")
                .value_name("SUFFIX")
                .default_value(".orig")
                .help("Backup suffix for changed files; `none` disables backups"),
        )
        .arg(flag("dry-run", 'n', "Report changes without writing files"))
        .arg(flag("formatted", 'Q', "Print only the names of changed files"))
        .arg(long_flag("stdout", "Write the result to stdout instead of in place"))
        .arg(
            Arg::new("jobs")
                .long("jobs")
                .value_name("N")
                .value_parser(clap::value_parser!(usize))
                .help("Parallel jobs (0 = automatic, 1 = sequential)"),
        )
        .arg(flag("verbose", 'v', "Verbose output"))
        .arg(flag("quiet", 'q', "Suppress per-file messages"))
}

fn flag(name: &'static str, short: char, help: &'static str) -> Arg {
    Arg::new(name)
        .short(short)
        .long(name)
        .action(ArgAction::SetTrue)
        .help(help)
}

fn long_flag(name: &'static str, help: &'static str) -> Arg {
    Arg::new(name)
        .long(name)
        .action(ArgAction::SetTrue)
        .help(help)
}

/// Parse process arguments.
#[must_use]
pub fn parse_args() -> CliArgs {
    parse_args_from(std::env::args_os())
}

/// Parse an explicit argument list (used by tests).
pub fn parse_args_from<I, T>(args: I) -> CliArgs
where
    I: IntoIterator<Item = T>,
    T: Into<std::ffi::OsString> + Clone,
{
    let matches = build_cli().get_matches_from(args);

    let mut format = PartialOptions::default();
    if let Some(style) = matches.get_one::<String>("style") {
        format.style = parse_style(style);
        if format.style.is_none() {
            eprintln!("Warning: unknown style '{style}' ignored");
        }
    }
    if let Some(&n) = matches.get_one::<usize>("indent") {
        format.indent_length = Some(n);
    }
    if let Some(kind) = matches.get_one::<String>("indent-style") {
        format.indent_style = match kind.as_str() {
            "spaces" => Some(IndentStyle::Spaces),
            "tab" => Some(IndentStyle::Tab),
            "force-tab" => Some(IndentStyle::ForceTab),
            "force-tab-x" => Some(IndentStyle::ForceTabX),
            other => {
                eprintln!("Warning: unknown indent style '{other}' ignored");
                None
            }
        };
    }
    if let Some(&n) = matches.get_one::<usize>("tab-length") {
        format.tab_length = Some(n);
    }
    if let Some(&n) = matches.get_one::<usize>("max-code-length") {
        format.max_code_length = Some(n);
    }
    if let Some(pos) = matches.get_one::<String>("align-pointer") {
        format.pointer_align = match pos.as_str() {
            "none" => Some(PointerAlign::None),
            "type" => Some(PointerAlign::Type),
            "middle" => Some(PointerAlign::Middle),
            "name" => Some(PointerAlign::Name),
            _ => None,
        };
    }
    if let Some(pos) = matches.get_one::<String>("align-reference") {
        format.reference_align = match pos.as_str() {
            "none" => Some(ReferenceAlign::None),
            "type" => Some(ReferenceAlign::Type),
            "middle" => Some(ReferenceAlign::Middle),
            "name" => Some(ReferenceAlign::Name),
            _ => None,
        };
    }
    if let Some(kind) = matches.get_one::<String>("lineend") {
        format.line_end = match kind.as_str() {
            "windows" => Some(LineEnding::Crlf),
            "linux" => Some(LineEnding::Lf),
            "macold" => Some(LineEnding::Cr),
            _ => None,
        };
    }

    macro_rules! set_flag {
        ($($cli:literal => $field:ident),* $(,)?) => {
            $(if matches.get_flag($cli) {
                format.$field = Some(true);
            })*
        };
    }
    set_flag!(
        "indent-classes" => indent_classes,
        "indent-modifiers" => indent_modifiers,
        "indent-switches" => indent_switches,
        "indent-cases" => indent_cases,
        "indent-namespaces" => indent_namespaces,
        "indent-labels" => indent_labels,
        "indent-preproc-define" => indent_preproc_define,
        "indent-preproc-cond" => indent_preproc_cond,
        "indent-col1-comments" => indent_col1_comments,
        "pad-oper" => pad_oper,
        "pad-paren-out" => pad_paren_out,
        "pad-first-paren-out" => pad_first_paren_out,
        "pad-paren-in" => pad_paren_in,
        "pad-header" => pad_header,
        "unpad-paren" => unpad_paren,
        "delete-empty-lines" => delete_empty_lines,
        "fill-empty-lines" => fill_empty_lines,
        "convert-tabs" => convert_tabs,
        "close-templates" => close_templates,
        "remove-comment-prefix" => strip_comment_prefix,
        "attach-classes" => attach_classes,
        "attach-namespaces" => attach_namespaces,
        "attach-inlines" => attach_inlines,
        "attach-extern-c" => attach_extern_c,
        "break-closing-brackets" => break_closing_braces,
        "break-elseifs" => break_elseifs,
        "add-brackets" => add_braces,
        "add-one-line-brackets" => add_one_line_braces,
        "remove-brackets" => remove_braces,
        "keep-one-line-blocks" => keep_one_line_blocks,
        "keep-one-line-statements" => keep_one_line_statements,
        "break-blocks" => break_blocks,
        "break-after-logical" => break_after_logical,
    );
    if matches.get_flag("pad-paren") {
        format.pad_paren_out = Some(true);
        format.pad_paren_in = Some(true);
    }
    if matches.get_flag("break-blocks-all") {
        format.break_blocks = Some(true);
        format.break_closing_blocks = Some(true);
    }

    CliArgs {
        inputs: matches
            .get_many::<PathBuf>("inputs")
            .map(|values| values.cloned().collect())
            .unwrap_or_default(),
        format,
        options_file: matches.get_one::<String>("options").cloned(),
        project: matches.get_one::<PathBuf>("project").cloned(),
        recursive: matches.get_flag("recursive"),
        exclude: matches
            .get_many::<String>("exclude")
            .map(|values| values.cloned().collect())
            .unwrap_or_default(),
        suffix: matches
            .get_one::<String>("suffix")
            .cloned()
            .unwrap_or_else(|| ".orig".to_string()),
        dry_run: matches.get_flag("dry-run"),
        formatted_only: matches.get_flag("formatted"),
        stdout: matches.get_flag("stdout"),
        jobs: matches.get_one::<usize>("jobs").copied(),
        verbose: matches.get_flag("verbose"),
        quiet: matches.get_flag("quiet"),
    }
}

fn parse_style(name: &str) -> Option<crate::config::FormatStyle> {
    use crate::config::FormatStyle;
    match name {
        "allman" | "ansi" | "bsd" | "break" => Some(FormatStyle::Allman),
        "java" | "attach" => Some(FormatStyle::Java),
        "kr" | "k&r" | "k/r" => Some(FormatStyle::KAndR),
        "stroustrup" => Some(FormatStyle::Stroustrup),
        "whitesmith" => Some(FormatStyle::Whitesmith),
        "banner" => Some(FormatStyle::Banner),
        "gnu" => Some(FormatStyle::Gnu),
        "linux" | "knf" => Some(FormatStyle::Linux),
        "horstmann" => Some(FormatStyle::Horstmann),
        "1tbs" | "otbs" => Some(FormatStyle::OneTbs),
        "google" => Some(FormatStyle::Google),
        "pico" => Some(FormatStyle::Pico),
        "lisp" | "python" => Some(FormatStyle::Lisp),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::FormatStyle;

    #[test]
    fn test_parse_style_and_flags() {
        let args = parse_args_from([
            "cstyler",
            "--style",
            "allman",
            "--pad-oper",
            "--indent-switches",
            "src/main.c",
        ]);
        assert_eq!(args.format.style, Some(FormatStyle::Allman));
        assert_eq!(args.format.pad_oper, Some(true));
        assert_eq!(args.format.indent_switches, Some(true));
        assert_eq!(args.inputs.len(), 1);
    }

    #[test]
    fn test_pad_paren_sets_both_sides() {
        let args = parse_args_from(["cstyler", "-P", "x.c"]);
        assert_eq!(args.format.pad_paren_out, Some(true));
        assert_eq!(args.format.pad_paren_in, Some(true));
    }

    #[test]
    fn test_default_suffix() {
        let args = parse_args_from(["cstyler", "x.c"]);
        assert_eq!(args.suffix, ".orig");
        assert!(!args.recursive);
    }

    #[test]
    fn test_excludes_accumulate() {
        let args = parse_args_from([
            "cstyler",
            "--exclude",
            "build",
            "--exclude",
            "*.gen.c",
            "-r",
            "src",
        ]);
        assert_eq!(args.exclude, vec!["build", "*.gen.c"]);
        assert!(args.recursive);
    }

    #[test]
    fn test_pointer_alignment_values() {
        let args = parse_args_from(["cstyler", "--align-pointer", "middle", "x.c"]);
        assert_eq!(
            args.format.pointer_align,
            Some(crate::config::PointerAlign::Middle)
        );
    }

    #[test]
    fn test_lineend_values() {
        let args = parse_args_from(["cstyler", "--lineend", "linux", "x.c"]);
        assert_eq!(args.format.line_end, Some(crate::config::LineEnding::Lf));
    }

    #[test]
    fn test_project_discovery_root() {
        let args = parse_args_from(["cstyler", "--project", "/tmp/proj", "x.c"]);
        assert_eq!(args.project, Some(PathBuf::from("/tmp/proj")));
        let args = parse_args_from(["cstyler", "x.c"]);
        assert_eq!(args.project, None);
    }
}
