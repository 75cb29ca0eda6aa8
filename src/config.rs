//! Configuration management for cstyler.
//!
//! This module provides the [`Options`] struct which controls all formatting
//! behavior. Options can be loaded from:
//! - TOML files (`cstyler.toml`)
//! - Option text in the classic syntax (`--style=allman --pad-oper`), see
//!   [`crate::opts`]
//! - CLI arguments (which override file settings)
//!
//! Config files are auto-discovered by searching parent directories from the
//! file being formatted up to the filesystem root, plus the user's home
//! directory.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// Config file names to search for (in order of priority, later overrides earlier)
const CONFIG_FILE_NAMES: &[&str] = &["cstyler.toml"];

/// Get the user's home directory
fn dirs_home() -> Option<PathBuf> {
    if let Ok(home) = std::env::var("HOME") {
        return Some(PathBuf::from(home));
    }
    // Fallback for Windows
    if let Ok(userprofile) = std::env::var("USERPROFILE") {
        return Some(PathBuf::from(userprofile));
    }
    None
}

/// Predefined formatting style composing several primitive options.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FormatStyle {
    None,
    Allman,
    Java,
    KAndR,
    Stroustrup,
    Whitesmith,
    Banner,
    Gnu,
    Linux,
    Horstmann,
    OneTbs,
    Google,
    Pico,
    Lisp,
}

/// How opening braces are placed relative to their statement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum BraceMode {
    /// Leave braces where the author put them.
    None,
    /// `if (x) {`
    Attach,
    /// `{` on its own line.
    Break,
    /// Break for function definitions, attach otherwise.
    Linux,
    /// Attach, except broken for function definitions.
    Stroustrup,
    /// `{` at start of line with the first statement run in.
    RunIn,
}

/// Indentation character selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum IndentStyle {
    Spaces,
    Tab,
    ForceTab,
    ForceTabX,
}

/// Minimum added indent for broken conditionals.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum MinConditional {
    Zero,
    One,
    Two,
    OneHalf,
}

/// Pointer glyph placement in declarations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PointerAlign {
    None,
    Type,
    Middle,
    Name,
}

/// Reference glyph placement; follows the pointer setting unless set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ReferenceAlign {
    SameAsPointer,
    None,
    Type,
    Middle,
    Name,
}

/// Output line-end selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum LineEnding {
    /// Match the input file's majority line end.
    Default,
    Crlf,
    Lf,
    Cr,
}

impl LineEnding {
    /// The terminator string for an explicit setting.
    #[must_use]
    pub fn as_str(self) -> Option<&'static str> {
        match self {
            LineEnding::Default => None,
            LineEnding::Crlf => Some("\r\n"),
            LineEnding::Lf => Some("\n"),
            LineEnding::Cr => Some("\r"),
        }
    }
}

/// Objective-C method colon padding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum MethodColonPad {
    NoChange,
    None,
    All,
    After,
    Before,
}

// Serde default functions
fn default_indent_length() -> usize {
    4
}
fn default_tab_length() -> usize {
    8
}
fn default_style() -> FormatStyle {
    FormatStyle::None
}
fn default_brace_mode() -> BraceMode {
    BraceMode::None
}
fn default_indent_style() -> IndentStyle {
    IndentStyle::Spaces
}
fn default_min_conditional() -> MinConditional {
    MinConditional::Two
}
fn default_max_in_statement() -> usize {
    40
}
fn default_pointer_align() -> PointerAlign {
    PointerAlign::None
}
fn default_reference_align() -> ReferenceAlign {
    ReferenceAlign::SameAsPointer
}
fn default_line_ending() -> LineEnding {
    LineEnding::Default
}
fn default_method_colon() -> MethodColonPad {
    MethodColonPad::NoChange
}

/// Main configuration record for cstyler.
///
/// Set once per file and read-only while formatting.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Options {
    /// Predefined style; composed into primitives by [`Options::resolve`]
    #[serde(default = "default_style")]
    pub style: FormatStyle,

    /// Opening brace placement mode
    #[serde(default = "default_brace_mode")]
    pub brace_mode: BraceMode,

    /// Indent with spaces, tabs, or forced tabs
    #[serde(default = "default_indent_style")]
    pub indent_style: IndentStyle,

    /// Columns per indent level (2-20)
    #[serde(default = "default_indent_length")]
    pub indent_length: usize,

    /// Tab width, independent of `indent_length` only for force-tab-x
    #[serde(default = "default_tab_length")]
    pub tab_length: usize,

    // --- indent scopes ---
    pub indent_classes: bool,
    pub indent_modifiers: bool,
    pub indent_switches: bool,
    pub indent_cases: bool,
    pub indent_namespaces: bool,
    pub indent_labels: bool,
    pub indent_preproc_define: bool,
    pub indent_preproc_cond: bool,
    pub indent_col1_comments: bool,

    // --- limits ---
    #[serde(default = "default_min_conditional")]
    pub min_conditional_option: MinConditional,
    #[serde(default = "default_max_in_statement")]
    pub max_in_statement_indent: usize,
    pub max_code_length: Option<usize>,
    pub break_after_logical: bool,

    // --- padding ---
    pub pad_oper: bool,
    pub pad_paren_out: bool,
    pub pad_first_paren_out: bool,
    pub pad_paren_in: bool,
    pub pad_header: bool,
    pub unpad_paren: bool,
    pub delete_empty_lines: bool,
    pub fill_empty_lines: bool,
    pub convert_tabs: bool,
    pub close_templates: bool,
    pub strip_comment_prefix: bool,

    // --- brace placement details ---
    pub attach_classes: bool,
    pub attach_namespaces: bool,
    pub attach_inlines: bool,
    pub attach_extern_c: bool,
    pub break_closing_braces: bool,
    pub break_elseifs: bool,
    pub add_braces: bool,
    pub add_one_line_braces: bool,
    pub remove_braces: bool,
    pub keep_one_line_blocks: bool,
    pub keep_one_line_statements: bool,
    pub break_blocks: bool,
    pub break_closing_blocks: bool,

    // --- pointer / reference ---
    #[serde(default = "default_pointer_align")]
    pub pointer_align: PointerAlign,
    #[serde(default = "default_reference_align")]
    pub reference_align: ReferenceAlign,

    // --- line ends ---
    #[serde(default = "default_line_ending")]
    pub line_end: LineEnding,

    // --- Objective-C ---
    pub align_method_colon: bool,
    pub pad_method_prefix: bool,
    pub unpad_method_prefix: bool,
    #[serde(default = "default_method_colon")]
    pub pad_method_colon: MethodColonPad,

    // --- internal, composed by styles ---
    /// Indent broken braces one level (Whitesmith, Banner)
    #[serde(skip)]
    pub brace_indent: bool,
    /// Indent blocks one level beyond the brace (GNU)
    #[serde(skip)]
    pub block_indent: bool,
    /// Attach closing braces to the following statement (Pico, Lisp)
    #[serde(skip)]
    pub attach_closing_brace: bool,
}

impl Default for Options {
    fn default() -> Self {
        Options {
            style: FormatStyle::None,
            brace_mode: BraceMode::None,
            indent_style: IndentStyle::Spaces,
            indent_length: 4,
            tab_length: 8,
            indent_classes: false,
            indent_modifiers: false,
            indent_switches: false,
            indent_cases: false,
            indent_namespaces: false,
            indent_labels: false,
            indent_preproc_define: false,
            indent_preproc_cond: false,
            indent_col1_comments: false,
            min_conditional_option: MinConditional::Two,
            max_in_statement_indent: 40,
            max_code_length: None,
            break_after_logical: false,
            pad_oper: false,
            pad_paren_out: false,
            pad_first_paren_out: false,
            pad_paren_in: false,
            pad_header: false,
            unpad_paren: false,
            delete_empty_lines: false,
            fill_empty_lines: false,
            convert_tabs: false,
            close_templates: false,
            strip_comment_prefix: false,
            attach_classes: false,
            attach_namespaces: false,
            attach_inlines: false,
            attach_extern_c: false,
            break_closing_braces: false,
            break_elseifs: false,
            add_braces: false,
            add_one_line_braces: false,
            remove_braces: false,
            keep_one_line_blocks: false,
            keep_one_line_statements: false,
            break_blocks: false,
            break_closing_blocks: false,
            pointer_align: PointerAlign::None,
            reference_align: ReferenceAlign::SameAsPointer,
            line_end: LineEnding::Default,
            align_method_colon: false,
            pad_method_prefix: false,
            unpad_method_prefix: false,
            pad_method_colon: MethodColonPad::NoChange,
            brace_indent: false,
            block_indent: false,
            attach_closing_brace: false,
        }
    }
}

/// Partial configuration for TOML parsing and option-text parsing.
///
/// All fields are `Option<T>` so that "explicitly set" can be distinguished
/// from "not specified" when composing with a style's defaults.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PartialOptions {
    pub style: Option<FormatStyle>,
    pub brace_mode: Option<BraceMode>,
    pub indent_style: Option<IndentStyle>,
    pub indent_length: Option<usize>,
    pub tab_length: Option<usize>,
    pub indent_classes: Option<bool>,
    pub indent_modifiers: Option<bool>,
    pub indent_switches: Option<bool>,
    pub indent_cases: Option<bool>,
    pub indent_namespaces: Option<bool>,
    pub indent_labels: Option<bool>,
    pub indent_preproc_define: Option<bool>,
    pub indent_preproc_cond: Option<bool>,
    pub indent_col1_comments: Option<bool>,
    pub min_conditional_option: Option<MinConditional>,
    pub max_in_statement_indent: Option<usize>,
    pub max_code_length: Option<usize>,
    pub break_after_logical: Option<bool>,
    pub pad_oper: Option<bool>,
    pub pad_paren_out: Option<bool>,
    pub pad_first_paren_out: Option<bool>,
    pub pad_paren_in: Option<bool>,
    pub pad_header: Option<bool>,
    pub unpad_paren: Option<bool>,
    pub delete_empty_lines: Option<bool>,
    pub fill_empty_lines: Option<bool>,
    pub convert_tabs: Option<bool>,
    pub close_templates: Option<bool>,
    pub strip_comment_prefix: Option<bool>,
    pub attach_classes: Option<bool>,
    pub attach_namespaces: Option<bool>,
    pub attach_inlines: Option<bool>,
    pub attach_extern_c: Option<bool>,
    pub break_closing_braces: Option<bool>,
    pub break_elseifs: Option<bool>,
    pub add_braces: Option<bool>,
    pub add_one_line_braces: Option<bool>,
    pub remove_braces: Option<bool>,
    pub keep_one_line_blocks: Option<bool>,
    pub keep_one_line_statements: Option<bool>,
    pub break_blocks: Option<bool>,
    pub break_closing_blocks: Option<bool>,
    pub pointer_align: Option<PointerAlign>,
    pub reference_align: Option<ReferenceAlign>,
    pub line_end: Option<LineEnding>,
    pub align_method_colon: Option<bool>,
    pub pad_method_prefix: Option<bool>,
    pub unpad_method_prefix: Option<bool>,
    pub pad_method_colon: Option<MethodColonPad>,
}

impl PartialOptions {
    /// Overlay another partial set; explicitly set fields win.
    pub fn merge(&mut self, over: &PartialOptions) {
        merge_partial(self, over);
    }

    /// Merge every discovered config file, least specific first.
    #[must_use]
    pub fn from_discovered_files(start_path: &Path) -> Self {
        let mut merged = PartialOptions::default();
        for path in Options::discover_config_files(start_path) {
            match std::fs::read_to_string(&path) {
                Ok(contents) => match toml::from_str::<PartialOptions>(&contents) {
                    Ok(partial) => merged.merge(&partial),
                    Err(e) => log::warn!("failed to parse {}: {e}", path.display()),
                },
                Err(e) => log::warn!("failed to read {}: {e}", path.display()),
            }
        }
        merged
    }
}

impl Options {
    /// Minimum indent length
    const MIN_INDENT: usize = 2;
    /// Maximum indent length
    const MAX_INDENT: usize = 20;
    /// Bounds for max-in-statement-indent
    const MIN_IN_STATEMENT: usize = 40;
    const MAX_IN_STATEMENT: usize = 120;
    /// Bounds for max-code-length
    const MIN_CODE_LENGTH: usize = 50;
    const MAX_CODE_LENGTH: usize = 200;

    /// Compose a style and explicit overrides into a resolved option set.
    ///
    /// The style's primitive effects are applied first; explicitly set
    /// options then override the style defaults.
    #[must_use]
    pub fn resolve(partial: &PartialOptions) -> Self {
        let mut options = Options::default();
        if let Some(style) = partial.style {
            options.apply_style(style);
        }
        options.apply_partial(partial);
        options.fix_conflicts();
        options
    }

    /// Apply a style's primitive effects.
    pub fn apply_style(&mut self, style: FormatStyle) {
        self.style = style;
        match style {
            FormatStyle::None => {}
            FormatStyle::Allman => self.brace_mode = BraceMode::Break,
            FormatStyle::Java => self.brace_mode = BraceMode::Attach,
            FormatStyle::KAndR => self.brace_mode = BraceMode::Linux,
            FormatStyle::Stroustrup => self.brace_mode = BraceMode::Stroustrup,
            FormatStyle::Whitesmith => {
                self.brace_mode = BraceMode::Break;
                self.brace_indent = true;
            }
            FormatStyle::Banner => {
                self.brace_mode = BraceMode::Attach;
                self.brace_indent = true;
            }
            FormatStyle::Gnu => {
                self.brace_mode = BraceMode::Break;
                self.block_indent = true;
            }
            FormatStyle::Linux => {
                self.brace_mode = BraceMode::Linux;
                self.min_conditional_option = MinConditional::OneHalf;
            }
            FormatStyle::Horstmann => {
                self.brace_mode = BraceMode::RunIn;
                self.indent_switches = true;
            }
            FormatStyle::OneTbs => {
                self.brace_mode = BraceMode::Linux;
                self.add_braces = true;
            }
            FormatStyle::Google => {
                self.brace_mode = BraceMode::Attach;
                self.indent_modifiers = true;
            }
            FormatStyle::Pico => {
                self.brace_mode = BraceMode::RunIn;
                self.attach_closing_brace = true;
                self.keep_one_line_blocks = true;
                self.keep_one_line_statements = true;
                self.indent_switches = true;
            }
            FormatStyle::Lisp => {
                self.brace_mode = BraceMode::Attach;
                self.attach_closing_brace = true;
                self.keep_one_line_statements = true;
            }
        }
    }

    /// Apply a partial set, only overriding fields that are explicitly set.
    pub fn apply_partial(&mut self, partial: &PartialOptions) {
        macro_rules! take {
            ($($field:ident),* $(,)?) => {
                $(if let Some(v) = partial.$field {
                    self.$field = v;
                })*
            };
        }
        take!(
            brace_mode,
            indent_style,
            indent_length,
            tab_length,
            indent_classes,
            indent_modifiers,
            indent_switches,
            indent_cases,
            indent_namespaces,
            indent_labels,
            indent_preproc_define,
            indent_preproc_cond,
            indent_col1_comments,
            min_conditional_option,
            max_in_statement_indent,
            break_after_logical,
            pad_oper,
            pad_paren_out,
            pad_first_paren_out,
            pad_paren_in,
            pad_header,
            unpad_paren,
            delete_empty_lines,
            fill_empty_lines,
            convert_tabs,
            close_templates,
            strip_comment_prefix,
            attach_classes,
            attach_namespaces,
            attach_inlines,
            attach_extern_c,
            break_closing_braces,
            break_elseifs,
            add_braces,
            add_one_line_braces,
            remove_braces,
            keep_one_line_blocks,
            keep_one_line_statements,
            break_blocks,
            break_closing_blocks,
            pointer_align,
            reference_align,
            line_end,
            align_method_colon,
            pad_method_prefix,
            unpad_method_prefix,
            pad_method_colon,
        );
        if partial.max_code_length.is_some() {
            self.max_code_length = partial.max_code_length;
        }
        if let Some(style) = partial.style {
            self.style = style;
        }
    }

    /// Resolve conflicting option combinations.
    fn fix_conflicts(&mut self) {
        // add-one-line-braces implies add-braces with one-line placement
        if self.add_one_line_braces {
            self.add_braces = true;
        }
        // adding braces wins over removing them
        if self.add_braces {
            self.remove_braces = false;
        }
        // tab length tracks indent length except for force-tab-x
        if self.indent_style != IndentStyle::ForceTabX {
            self.tab_length = self.indent_length;
        }
        // break-blocks=all implies break-blocks
        if self.break_closing_blocks {
            self.break_blocks = true;
        }
    }

    /// Validate option values are within bounds.
    ///
    /// Returns an error message if validation fails, None if valid.
    #[must_use]
    pub fn validate(&self) -> Option<String> {
        if self.indent_length < Self::MIN_INDENT || self.indent_length > Self::MAX_INDENT {
            return Some(format!(
                "indent length {} is outside {}-{}",
                self.indent_length,
                Self::MIN_INDENT,
                Self::MAX_INDENT
            ));
        }
        if self.tab_length < Self::MIN_INDENT || self.tab_length > Self::MAX_INDENT {
            return Some(format!(
                "tab length {} is outside {}-{}",
                self.tab_length,
                Self::MIN_INDENT,
                Self::MAX_INDENT
            ));
        }
        if self.max_in_statement_indent < Self::MIN_IN_STATEMENT
            || self.max_in_statement_indent > Self::MAX_IN_STATEMENT
        {
            return Some(format!(
                "max in-statement indent {} is outside {}-{}",
                self.max_in_statement_indent,
                Self::MIN_IN_STATEMENT,
                Self::MAX_IN_STATEMENT
            ));
        }
        if let Some(len) = self.max_code_length {
            if !(Self::MIN_CODE_LENGTH..=Self::MAX_CODE_LENGTH).contains(&len) {
                return Some(format!(
                    "max code length {} is outside {}-{}",
                    len,
                    Self::MIN_CODE_LENGTH,
                    Self::MAX_CODE_LENGTH
                ));
            }
        }
        None
    }

    /// Effective reference alignment (inherits the pointer setting).
    #[must_use]
    pub fn reference_alignment(&self) -> PointerAlign {
        match self.reference_align {
            ReferenceAlign::SameAsPointer => self.pointer_align,
            ReferenceAlign::None => PointerAlign::None,
            ReferenceAlign::Type => PointerAlign::Type,
            ReferenceAlign::Middle => PointerAlign::Middle,
            ReferenceAlign::Name => PointerAlign::Name,
        }
    }

    /// The minimum extra indent for broken conditionals, in columns.
    #[must_use]
    pub fn min_conditional_indent(&self) -> usize {
        match self.min_conditional_option {
            MinConditional::Zero => 0,
            MinConditional::One => self.indent_length,
            MinConditional::Two => self.indent_length * 2,
            MinConditional::OneHalf => self.indent_length / 2,
        }
    }

    /// Whether indentation uses tab characters.
    #[must_use]
    pub fn use_tabs(&self) -> bool {
        !matches!(self.indent_style, IndentStyle::Spaces)
    }

    /// Whether continuation indents are also tabbed.
    #[must_use]
    pub fn force_tab(&self) -> bool {
        matches!(
            self.indent_style,
            IndentStyle::ForceTab | IndentStyle::ForceTabX
        )
    }

    /// Load options from a TOML file.
    pub fn from_toml_file(path: &Path) -> anyhow::Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        let partial: PartialOptions = toml::from_str(&contents)?;
        Ok(Self::resolve(&partial))
    }

    /// Discover config files from parent directories of a given path.
    ///
    /// Searches from the file's directory up to the root, with the home
    /// directory config first (lowest priority).
    #[must_use]
    pub fn discover_config_files(start_path: &Path) -> Vec<PathBuf> {
        let mut config_files = Vec::new();

        if let Some(home) = dirs_home() {
            for config_name in CONFIG_FILE_NAMES {
                let home_config = home.join(config_name);
                if home_config.is_file() {
                    config_files.push(home_config);
                }
            }
        }

        let start_dir = if start_path.is_file() {
            start_path.parent().map(Path::to_path_buf)
        } else if start_path.is_dir() {
            Some(start_path.to_path_buf())
        } else {
            std::env::current_dir().ok()
        };

        if let Some(dir) = start_dir {
            let mut ancestors: Vec<PathBuf> = dir.ancestors().map(Path::to_path_buf).collect();
            // root first, most specific last
            ancestors.reverse();
            for ancestor in ancestors {
                for config_name in CONFIG_FILE_NAMES {
                    let config_path = ancestor.join(config_name);
                    if config_path.is_file() && !config_files.contains(&config_path) {
                        config_files.push(config_path);
                    }
                }
            }
        }

        config_files
    }

    /// Load and merge options from discovered config files.
    ///
    /// Later files override earlier ones (only explicitly set values).
    /// Returns default options if no files are found.
    #[must_use]
    pub fn from_discovered_files(start_path: &Path) -> Self {
        Self::resolve(&PartialOptions::from_discovered_files(start_path))
    }
}

/// Overlay `over` onto `base`, field by field.
fn merge_partial(base: &mut PartialOptions, over: &PartialOptions) {
    macro_rules! merge {
        ($($field:ident),* $(,)?) => {
            $(if over.$field.is_some() {
                base.$field = over.$field;
            })*
        };
    }
    merge!(
        style,
        brace_mode,
        indent_style,
        indent_length,
        tab_length,
        indent_classes,
        indent_modifiers,
        indent_switches,
        indent_cases,
        indent_namespaces,
        indent_labels,
        indent_preproc_define,
        indent_preproc_cond,
        indent_col1_comments,
        min_conditional_option,
        max_in_statement_indent,
        max_code_length,
        break_after_logical,
        pad_oper,
        pad_paren_out,
        pad_first_paren_out,
        pad_paren_in,
        pad_header,
        unpad_paren,
        delete_empty_lines,
        fill_empty_lines,
        convert_tabs,
        close_templates,
        strip_comment_prefix,
        attach_classes,
        attach_namespaces,
        attach_inlines,
        attach_extern_c,
        break_closing_braces,
        break_elseifs,
        add_braces,
        add_one_line_braces,
        remove_braces,
        keep_one_line_blocks,
        keep_one_line_statements,
        break_blocks,
        break_closing_blocks,
        pointer_align,
        reference_align,
        line_end,
        align_method_colon,
        pad_method_prefix,
        unpad_method_prefix,
        pad_method_colon,
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_options() {
        let options = Options::default();
        assert_eq!(options.indent_length, 4);
        assert_eq!(options.style, FormatStyle::None);
        assert_eq!(options.brace_mode, BraceMode::None);
        assert!(!options.keep_one_line_blocks);
        assert!(options.validate().is_none());
    }

    #[test]
    fn test_style_allman_breaks_braces() {
        let partial = PartialOptions {
            style: Some(FormatStyle::Allman),
            ..Default::default()
        };
        let options = Options::resolve(&partial);
        assert_eq!(options.brace_mode, BraceMode::Break);
        assert!(!options.brace_indent);
    }

    #[test]
    fn test_style_whitesmith_indents_braces() {
        let partial = PartialOptions {
            style: Some(FormatStyle::Whitesmith),
            ..Default::default()
        };
        let options = Options::resolve(&partial);
        assert_eq!(options.brace_mode, BraceMode::Break);
        assert!(options.brace_indent);
    }

    #[test]
    fn test_explicit_primitive_overrides_style() {
        // java attaches braces; an explicit brace mode wins
        let partial = PartialOptions {
            style: Some(FormatStyle::Java),
            brace_mode: Some(BraceMode::Break),
            ..Default::default()
        };
        let options = Options::resolve(&partial);
        assert_eq!(options.brace_mode, BraceMode::Break);
    }

    #[test]
    fn test_pico_keeps_one_liners() {
        let partial = PartialOptions {
            style: Some(FormatStyle::Pico),
            ..Default::default()
        };
        let options = Options::resolve(&partial);
        assert_eq!(options.brace_mode, BraceMode::RunIn);
        assert!(options.keep_one_line_blocks);
        assert!(options.keep_one_line_statements);
        assert!(options.attach_closing_brace);
    }

    #[test]
    fn test_add_one_line_braces_implies_add_braces() {
        let partial = PartialOptions {
            add_one_line_braces: Some(true),
            remove_braces: Some(true),
            ..Default::default()
        };
        let options = Options::resolve(&partial);
        assert!(options.add_braces);
        assert!(!options.remove_braces);
    }

    #[test]
    fn test_tab_length_tracks_indent_unless_force_tab_x() {
        let partial = PartialOptions {
            indent_style: Some(IndentStyle::Tab),
            indent_length: Some(6),
            ..Default::default()
        };
        let options = Options::resolve(&partial);
        assert_eq!(options.tab_length, 6);

        let partial = PartialOptions {
            indent_style: Some(IndentStyle::ForceTabX),
            indent_length: Some(4),
            tab_length: Some(8),
            ..Default::default()
        };
        let options = Options::resolve(&partial);
        assert_eq!(options.tab_length, 8);
    }

    #[test]
    fn test_validate_bounds() {
        let mut options = Options::default();
        options.indent_length = 1;
        assert!(options.validate().is_some());
        options.indent_length = 4;
        options.max_in_statement_indent = 30;
        assert!(options.validate().is_some());
        options.max_in_statement_indent = 40;
        options.max_code_length = Some(30);
        assert!(options.validate().is_some());
        options.max_code_length = Some(80);
        assert!(options.validate().is_none());
    }

    #[test]
    fn test_min_conditional_indent() {
        let mut options = Options::default();
        options.min_conditional_option = MinConditional::Two;
        assert_eq!(options.min_conditional_indent(), 8);
        options.min_conditional_option = MinConditional::OneHalf;
        assert_eq!(options.min_conditional_indent(), 2);
        options.min_conditional_option = MinConditional::Zero;
        assert_eq!(options.min_conditional_indent(), 0);
    }

    #[test]
    fn test_reference_alignment_inherits_pointer() {
        let mut options = Options::default();
        options.pointer_align = PointerAlign::Type;
        assert_eq!(options.reference_alignment(), PointerAlign::Type);
        options.reference_align = ReferenceAlign::Name;
        assert_eq!(options.reference_alignment(), PointerAlign::Name);
    }

    #[test]
    fn test_toml_partial_parse() {
        let partial: PartialOptions = toml::from_str(
            r#"
            style = "allman"
            indent_length = 2
            pad_oper = true
            pointer_align = "type"
            "#,
        )
        .expect("toml should parse");
        let options = Options::resolve(&partial);
        assert_eq!(options.style, FormatStyle::Allman);
        assert_eq!(options.indent_length, 2);
        assert!(options.pad_oper);
        assert_eq!(options.pointer_align, PointerAlign::Type);
    }

    #[test]
    fn test_merge_partial_overrides() {
        let mut base = PartialOptions {
            indent_length: Some(2),
            pad_oper: Some(true),
            ..Default::default()
        };
        let over = PartialOptions {
            indent_length: Some(8),
            ..Default::default()
        };
        merge_partial(&mut base, &over);
        assert_eq!(base.indent_length, Some(8));
        assert_eq!(base.pad_oper, Some(true));
    }
}
