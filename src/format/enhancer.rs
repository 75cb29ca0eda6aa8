//! Post-beautifier line enhancement.
//!
//! Runs after the beautifier on every output line. Unindents case blocks
//! when indent-cases is off, adds a level inside event-table and SQL
//! declare-section regions, and converts leading whitespace when the tab
//! settings ask for it.

use std::sync::LazyLock;

use regex::Regex;

use crate::config::Options;
use crate::lexer::chars::{get_current_word, is_char_potential_header, is_whitespace};

static EVENT_TABLE_BEGIN_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*(BEGIN_EVENT_TABLE|BEGIN_MESSAGE_MAP)\b").unwrap());
static EVENT_TABLE_END_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*(END_EVENT_TABLE|END_MESSAGE_MAP)\b").unwrap());
static SQL_DECLARE_BEGIN_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)EXEC\s+SQL\s+BEGIN\s+DECLARE\s+SECTION").unwrap()
});
static SQL_DECLARE_END_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)EXEC\s+SQL\s+END\s+DECLARE\s+SECTION").unwrap());

/// Per-switch bookkeeping for case-block unindenting.
#[derive(Debug, Clone, Copy)]
struct SwitchFrame {
    /// Brace depth outside the switch's own block.
    switch_brace_count: usize,
    /// Nested case blocks currently being unindented.
    unindent_depth: usize,
}

/// Stateful across the lines of one file; stateless across files after
/// `init`.
#[derive(Debug)]
pub struct Enhancer {
    indent_length: usize,
    tab_length: usize,
    use_tabs: bool,
    force_tab: bool,
    case_indent: bool,

    is_in_quote: bool,
    quote_char: char,
    is_in_comment: bool,
    brace_count: usize,
    switch_stack: Vec<SwitchFrame>,
    case_block_levels: Vec<usize>,
    pending_case_label: bool,
    looking_for_case_brace: bool,

    is_in_event_table: bool,
    next_line_is_event_indent: bool,
    is_in_declare_section: bool,
    next_line_is_declare_indent: bool,
}

impl Enhancer {
    #[must_use]
    pub fn new(opt: &Options) -> Self {
        Self {
            indent_length: opt.indent_length,
            tab_length: opt.tab_length,
            use_tabs: opt.use_tabs(),
            force_tab: opt.force_tab(),
            case_indent: opt.indent_cases,
            is_in_quote: false,
            quote_char: ' ',
            is_in_comment: false,
            brace_count: 0,
            switch_stack: Vec::new(),
            case_block_levels: Vec::new(),
            pending_case_label: false,
            looking_for_case_brace: false,
            is_in_event_table: false,
            next_line_is_event_indent: false,
            is_in_declare_section: false,
            next_line_is_declare_indent: false,
        }
    }

    /// Reset per-file state.
    pub fn init(&mut self) {
        self.is_in_quote = false;
        self.is_in_comment = false;
        self.brace_count = 0;
        self.switch_stack.clear();
        self.case_block_levels.clear();
        self.pending_case_label = false;
        self.looking_for_case_brace = false;
        self.is_in_event_table = false;
        self.next_line_is_event_indent = false;
        self.is_in_declare_section = false;
        self.next_line_is_declare_indent = false;
    }

    /// Adjust one beautified line in place.
    pub fn enhance(&mut self, line: &mut String, is_in_preprocessor: bool, is_in_sql: bool) {
        if self.next_line_is_event_indent {
            self.is_in_event_table = true;
            self.next_line_is_event_indent = false;
        }
        if self.next_line_is_declare_indent {
            self.is_in_declare_section = true;
            self.next_line_is_declare_indent = false;
        }

        if !self.is_in_comment {
            if EVENT_TABLE_BEGIN_RE.is_match(line) {
                self.next_line_is_event_indent = true;
            } else if EVENT_TABLE_END_RE.is_match(line) {
                self.is_in_event_table = false;
            }
            if SQL_DECLARE_BEGIN_RE.is_match(line) {
                self.next_line_is_declare_indent = true;
            } else if SQL_DECLARE_END_RE.is_match(line) {
                self.is_in_declare_section = false;
            }
        }

        if (self.is_in_event_table || self.is_in_declare_section) && !line.trim().is_empty() {
            self.indent_line(line, 1);
        }

        if !is_in_preprocessor && !is_in_sql && !line.trim().is_empty() {
            let before = self.current_unindent();
            self.parse_line(line);
            let after = self.current_unindent();
            let depth = before.max(after);
            if depth > 0 {
                self.unindent_line(line, depth);
            }
        }

        self.convert_leading_whitespace(line);
    }

    fn current_unindent(&self) -> usize {
        self.switch_stack.last().map_or(0, |f| f.unindent_depth)
    }

    fn parse_line(&mut self, line: &str) {
        let chars: Vec<char> = line.chars().collect();
        let mut i = 0;
        while i < chars.len() {
            let ch = chars[i];
            if self.is_in_comment {
                if ch == '*' && chars.get(i + 1) == Some(&'/') {
                    self.is_in_comment = false;
                    i += 2;
                    continue;
                }
                i += 1;
                continue;
            }
            if self.is_in_quote {
                if ch == '\\' {
                    i += 2;
                    continue;
                }
                if ch == self.quote_char {
                    self.is_in_quote = false;
                }
                i += 1;
                continue;
            }
            match ch {
                '/' if chars.get(i + 1) == Some(&'/') => return,
                '/' if chars.get(i + 1) == Some(&'*') => {
                    self.is_in_comment = true;
                    i += 2;
                    continue;
                }
                '"' | '\'' => {
                    self.is_in_quote = true;
                    self.quote_char = ch;
                }
                '{' => {
                    self.brace_count += 1;
                    if self.looking_for_case_brace {
                        self.looking_for_case_brace = false;
                        if let Some(frame) = self.switch_stack.last_mut() {
                            frame.unindent_depth += 1;
                            self.case_block_levels.push(self.brace_count);
                        }
                    }
                }
                '}' => {
                    if self.case_block_levels.last() == Some(&self.brace_count) {
                        self.case_block_levels.pop();
                        if let Some(frame) = self.switch_stack.last_mut() {
                            frame.unindent_depth = frame.unindent_depth.saturating_sub(1);
                        }
                    }
                    self.brace_count = self.brace_count.saturating_sub(1);
                    if self
                        .switch_stack
                        .last()
                        .is_some_and(|f| f.switch_brace_count == self.brace_count)
                    {
                        self.switch_stack.pop();
                    }
                    self.looking_for_case_brace = false;
                }
                ':' if self.pending_case_label && chars.get(i + 1) != Some(&':') => {
                    self.pending_case_label = false;
                    if !self.case_indent {
                        if self.switch_stack.last().is_some() {
                            self.looking_for_case_brace = true;
                        }
                    }
                }
                _ => {
                    if is_char_potential_header(&chars, i) {
                        let word = get_current_word(&chars, i);
                        match word.as_str() {
                            "switch" => {
                                self.looking_for_case_brace = false;
                                self.switch_stack.push(SwitchFrame {
                                    switch_brace_count: self.brace_count,
                                    unindent_depth: 0,
                                });
                            }
                            "case" | "default" if !self.switch_stack.is_empty() => {
                                self.pending_case_label = true;
                            }
                            _ => {
                                self.looking_for_case_brace = false;
                            }
                        }
                        i += word.chars().count();
                        continue;
                    }
                    if !is_whitespace(ch) && !self.pending_case_label {
                        self.looking_for_case_brace = false;
                    }
                }
            }
            i += 1;
        }
    }

    /// Add `count` indent units at the start of the line.
    fn indent_line(&self, line: &mut String, count: usize) {
        let unit = if self.use_tabs {
            "\t".repeat(count)
        } else {
            " ".repeat(self.indent_length * count)
        };
        line.insert_str(0, &unit);
    }

    /// Remove up to `count` indent units from the start of the line.
    fn unindent_line(&self, line: &mut String, count: usize) {
        for _ in 0..count {
            if line.starts_with('\t') {
                line.remove(0);
            } else {
                let spaces = line.chars().take_while(|c| *c == ' ').count();
                let strip = spaces.min(self.indent_length);
                if strip == 0 {
                    break;
                }
                line.drain(..strip);
            }
        }
    }

    /// Rewrite leading whitespace when the tab settings disagree with it.
    fn convert_leading_whitespace(&self, line: &mut String) {
        if line.is_empty() {
            return;
        }
        if self.force_tab && self.tab_length != self.indent_length {
            // force-tab-x repacks the leading columns with the tab length
            let cols = leading_columns(line, self.tab_length);
            let body = line.trim_start_matches([' ', '\t']).to_string();
            let tab = self.tab_length.max(1);
            let mut ws = "\t".repeat(cols / tab);
            ws.push_str(&" ".repeat(cols % tab));
            *line = format!("{ws}{body}");
        } else if !self.use_tabs && line.starts_with('\t') {
            // leading tabs from pass-through lines become spaces
            let tabs = line.chars().take_while(|c| *c == '\t').count();
            let rest = line[tabs..].to_string();
            *line = format!("{}{rest}", " ".repeat(tabs * self.indent_length));
        }
    }
}

/// Width of the leading whitespace in columns.
fn leading_columns(line: &str, tab_length: usize) -> usize {
    let mut cols = 0;
    for ch in line.chars() {
        match ch {
            ' ' => cols += 1,
            '\t' => {
                let tab = tab_length.max(1);
                cols += tab - (cols % tab);
            }
            _ => break,
        }
    }
    cols
}
