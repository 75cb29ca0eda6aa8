//! The formatter: per-character reshaping of source lines.
//!
//! Pulls raw input through a [`SourceLines`] iterator and exposes its own
//! `has_more_lines`/`next_line` pair. Brace placement lives in `braces.rs`,
//! operator/paren padding in `padding.rs`, and long-line splitting in
//! `line_split.rs`; this module owns the state machine and the line loop.

use std::collections::VecDeque;

use crate::config::{BraceMode, Options};
use crate::format::beautifier::{Beautifier, LineSignals};
use crate::format::braces::{BraceKind, BraceState};
use crate::format::enhancer::Enhancer;
use crate::format::line_split::SplitPoints;
use crate::lexer::chars::{
    get_current_word, is_char_potential_header, is_char_potential_operator, is_legal_name_char,
    is_whitespace, peek_next_char_from, starts_with_at,
};
use crate::lexer::stream::SourceLines;
use crate::lexer::tables::{
    find_header, CASE, CATCH, DEFAULT, DO, ELSE, FOR, HEADERS, IF, SEH_EXCEPT, SEH_FINALLY,
    SEH_TRY, TRY, WHILE,
};
use crate::lexer::LineReader;

/// Kind of the most recently emitted line, used by break-blocks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum EmittedKind {
    None,
    Empty,
    OpenBrace,
    CloseBrace,
    Comment,
    Preproc,
    CaseLabel,
    Code,
}

/// Sum of the code points of all non-whitespace characters.
fn text_checksum(text: &str) -> i64 {
    text.chars()
        .filter(|ch| !is_whitespace(*ch))
        .map(|ch| i64::from(ch as u32))
        .sum()
}

/// Stateful per-file formatter.
pub struct Formatter {
    pub(crate) opt: Options,
    pub(crate) beautifier: Beautifier,
    pub(crate) enhancer: Enhancer,
    pub(crate) src: Box<dyn SourceLines>,

    // current raw line
    pub(crate) line: Vec<char>,
    pub(crate) char_num: usize,

    // output
    pub(crate) formatted: Vec<char>,
    out_queue: VecDeque<String>,
    end_of_stream: bool,
    prev_empty_deleted: bool,

    // lexical state
    pub(crate) in_quote: bool,
    pub(crate) quote_char: char,
    pub(crate) in_comment: bool,
    pub(crate) in_line_comment: bool,
    preproc_continues: bool,
    pub(crate) template_depth: usize,
    pub(crate) in_case: bool,
    in_exec_sql: bool,
    pub(crate) paren_depth: usize,
    pub(crate) square_brackets: usize,
    pub(crate) question_depth: usize,

    // statement state
    pub(crate) braces: Vec<BraceState>,
    pub(crate) current_header: Option<&'static str>,
    pub(crate) in_header: bool,
    header_paren_depth: Option<usize>,
    pub(crate) post_header: bool,
    pub(crate) found_pre_definition: Option<&'static str>,
    pub(crate) found_extern: bool,
    pub(crate) found_enum: bool,
    pub(crate) found_pre_command: bool,
    pub(crate) post_return: bool,
    pub(crate) in_potential_calculation: bool,
    pub(crate) in_statement: bool,
    pub(crate) prev_non_ws: char,
    pub(crate) prev_command_char: char,
    pub(crate) last_word: String,
    pub(crate) last_closed_header: Option<&'static str>,

    // output control
    pub(crate) suppress_ws: bool,
    need_join_space: bool,
    pub(crate) run_in_open: bool,
    pub(crate) break_before_content: bool,
    passed_semicolon: bool,
    passed_case_colon: bool,
    post_close_brace: bool,
    pub(crate) one_line_depth: usize,
    hold_join: bool,
    emit_comment_col1: bool,
    line_is_sql: bool,

    prev_emitted: EmittedKind,

    // checksums
    checksum_in: i64,
    checksum_out: i64,

    pub(crate) split: SplitPoints,
}

impl Formatter {
    #[must_use]
    pub fn new(opt: &Options, src: Box<dyn SourceLines>) -> Self {
        Self {
            beautifier: Beautifier::new(opt),
            enhancer: Enhancer::new(opt),
            opt: opt.clone(),
            src,
            line: Vec::new(),
            char_num: 0,
            formatted: Vec::new(),
            out_queue: VecDeque::new(),
            end_of_stream: false,
            prev_empty_deleted: false,
            in_quote: false,
            quote_char: ' ',
            in_comment: false,
            in_line_comment: false,
            preproc_continues: false,
            template_depth: 0,
            in_case: false,
            in_exec_sql: false,
            paren_depth: 0,
            square_brackets: 0,
            question_depth: 0,
            braces: Vec::new(),
            current_header: None,
            in_header: false,
            header_paren_depth: None,
            post_header: false,
            found_pre_definition: None,
            found_extern: false,
            found_enum: false,
            found_pre_command: false,
            post_return: false,
            in_potential_calculation: false,
            in_statement: false,
            prev_non_ws: ' ',
            prev_command_char: ' ',
            last_word: String::new(),
            last_closed_header: None,
            suppress_ws: false,
            need_join_space: false,
            run_in_open: false,
            break_before_content: false,
            passed_semicolon: false,
            passed_case_colon: false,
            post_close_brace: false,
            one_line_depth: 0,
            hold_join: false,
            emit_comment_col1: false,
            line_is_sql: false,
            prev_emitted: EmittedKind::None,
            checksum_in: 0,
            checksum_out: 0,
            split: SplitPoints::default(),
        }
    }

    /// Convenience constructor over an in-memory source.
    #[must_use]
    pub fn from_source(opt: &Options, source: &str) -> Self {
        Self::new(opt, Box::new(LineReader::new(source)))
    }

    /// Reset for another file with a fresh source iterator.
    pub fn init(&mut self, src: Box<dyn SourceLines>) {
        let opt = self.opt.clone();
        *self = Formatter::new(&opt, src);
    }

    pub fn has_more_lines(&self) -> bool {
        if !self.out_queue.is_empty() {
            return true;
        }
        if self.end_of_stream {
            return false;
        }
        self.src.has_more_lines() || self.formatted.iter().any(|c| !is_whitespace(*c))
    }

    /// Produce the next reformatted output line, without a terminator.
    pub fn next_line(&mut self) -> String {
        while self.out_queue.is_empty() && !self.end_of_stream {
            self.process_next_raw_line();
        }
        self.out_queue.pop_front().unwrap_or_default()
    }

    /// The line end matching the majority of the input.
    #[must_use]
    pub fn output_eol(&self) -> &'static str {
        self.src.get_output_eol()
    }

    /// True if any input line end differs from the configured output style.
    #[must_use]
    pub fn line_ends_changed(&self) -> bool {
        self.src.get_line_end_change(self.opt.line_end)
    }

    #[must_use]
    pub fn checksum_in(&self) -> i64 {
        self.checksum_in
    }

    #[must_use]
    pub fn checksum_out(&self) -> i64 {
        self.checksum_out
    }

    /// Difference between input and output checksums; zero on success.
    #[must_use]
    pub fn checksum_diff(&self) -> i64 {
        self.checksum_in - self.checksum_out
    }

    /// Record characters inserted into (positive) or removed from
    /// (negative) the stream, keeping the checksum invariant intact.
    pub(crate) fn adjust_checksum_in(&mut self, delta: i64) {
        self.checksum_in += delta;
    }

    // --- raw line management ------------------------------------------------

    fn process_next_raw_line(&mut self) {
        if !self.src.has_more_lines() {
            self.finish_file();
            return;
        }
        let raw = self.src.next_line(self.prev_empty_deleted);
        self.prev_empty_deleted = false;
        self.checksum_in += text_checksum(&raw);
        self.in_line_comment = false;

        // continuation of a multi-line construct keeps its own layout
        if self.in_comment {
            self.handle_comment_continuation(&raw);
            return;
        }
        if self.in_quote {
            // unterminated or backslash-continued string literal
            self.flush_formatted();
            self.line = raw.chars().collect();
            self.char_num = 0;
            self.process_line_chars();
            self.end_of_line();
            return;
        }

        let start = raw
            .char_indices()
            .find(|(_, c)| !is_whitespace(*c))
            .map(|(i, _)| i);
        let Some(start) = start else {
            self.handle_empty_line();
            return;
        };
        let text = &raw[start..];

        if self.preproc_continues || text.starts_with('#') {
            self.handle_preproc_line(text);
            return;
        }
        if self.in_exec_sql || is_exec_sql_start(text) {
            self.handle_sql_line(text);
            return;
        }
        if text.starts_with("//") {
            self.handle_comment_only_line(text, start == 0);
            return;
        }

        if self.hold_join && !self.formatted.is_empty() {
            self.need_join_space = true;
        } else {
            self.flush_formatted();
        }
        self.hold_join = false;

        self.line = text.chars().collect();
        self.char_num = 0;
        self.process_line_chars();
        self.end_of_line();
    }

    fn process_line_chars(&mut self) {
        while self.char_num < self.line.len() {
            let ch = self.line[self.char_num];
            self.process_char(ch);
            self.char_num += 1;
        }
    }

    fn end_of_line(&mut self) {
        self.in_line_comment = false;
        self.emit_comment_col1 = false;
        if self.in_quote {
            self.flush_formatted();
            return;
        }
        if self.should_hold_join() {
            self.hold_join = true;
            return;
        }
        self.flush_formatted();
    }

    fn finish_file(&mut self) {
        self.flush_formatted();
        self.beautifier.end_of_file();
        self.src.save_last_input_line();
        self.end_of_stream = true;
    }

    fn handle_empty_line(&mut self) {
        self.flush_formatted();
        self.hold_join = false;
        // delete-empty-lines applies within functions and blocks
        if self.opt.delete_empty_lines && !self.braces.is_empty() && self.src.has_more_lines() {
            self.prev_empty_deleted = true;
            return;
        }
        self.emit("", EmittedKind::Empty);
    }

    fn handle_comment_continuation(&mut self, raw: &str) {
        let mut text = raw.to_string();
        let trimmed = raw.trim_start();
        if self.opt.strip_comment_prefix
            && trimmed.starts_with('*')
            && !trimmed.starts_with("*/")
        {
            // drop the decorative `*` and indent the body one step
            let body = trimmed[1..].strip_prefix(' ').unwrap_or(&trimmed[1..]);
            self.adjust_checksum_in(-i64::from('*' as u32));
            text = format!("{}{}", " ".repeat(self.opt.indent_length), body);
        }
        if raw.contains("*/") {
            self.in_comment = false;
        }
        self.emit_preserved(&text, EmittedKind::Comment);
    }

    fn handle_comment_only_line(&mut self, text: &str, at_col1: bool) {
        self.flush_formatted();
        self.hold_join = false;
        self.emit_comment_col1 = at_col1 && !self.opt.indent_col1_comments;
        self.emit(text, EmittedKind::Comment);
        self.emit_comment_col1 = false;
    }

    fn handle_preproc_line(&mut self, text: &str) {
        self.flush_formatted();
        self.hold_join = false;
        self.preproc_continues = text.trim_end().ends_with('\\');
        self.emit_preproc(text);
    }

    fn handle_sql_line(&mut self, text: &str) {
        self.flush_formatted();
        self.hold_join = false;
        self.in_exec_sql = true;
        self.line_is_sql = true;
        self.emit(text, EmittedKind::Code);
        self.line_is_sql = false;
        if text.trim_end().ends_with(';') {
            self.in_exec_sql = false;
        }
    }

    // --- emission -----------------------------------------------------------

    pub(crate) fn flush_formatted(&mut self) {
        while matches!(self.formatted.last(), Some(c) if is_whitespace(*c)) {
            self.formatted.pop();
        }
        if self.formatted.is_empty() {
            self.break_before_content = false;
            self.passed_semicolon = false;
            self.passed_case_colon = false;
            self.split.clear();
            return;
        }
        let text: String = self.formatted.iter().collect();
        self.formatted.clear();
        let kind = classify_emitted(&text);
        self.emit(&text, kind);
        self.break_before_content = false;
        self.passed_semicolon = false;
        self.passed_case_colon = false;
        self.run_in_open = false;
        self.split.clear();
    }

    pub(crate) fn emit(&mut self, text: &str, kind: EmittedKind) {
        self.beautifier.signals = LineSignals {
            line_comment_no_indent: self.emit_comment_col1,
            is_in_preprocessor: false,
        };
        let mut out = self.beautifier.beautify(text);
        self.enhancer.enhance(&mut out, false, self.line_is_sql);
        self.checksum_out += text_checksum(&out);
        self.out_queue.push_back(out);
        self.prev_emitted = kind;
    }

    /// Emit a line whose layout must not change (comment interiors).
    fn emit_preserved(&mut self, text: &str, kind: EmittedKind) {
        self.beautifier.signals = LineSignals {
            line_comment_no_indent: false,
            is_in_preprocessor: false,
        };
        let mut out = self.beautifier.beautify(text);
        self.enhancer.enhance(&mut out, false, false);
        self.checksum_out += text_checksum(&out);
        self.out_queue.push_back(out);
        self.prev_emitted = kind;
    }

    fn emit_preproc(&mut self, text: &str) {
        self.beautifier.signals = LineSignals {
            line_comment_no_indent: false,
            is_in_preprocessor: true,
        };
        let mut out = self.beautifier.beautify(text);
        self.enhancer.enhance(&mut out, true, false);
        self.checksum_out += text_checksum(&out);
        self.out_queue.push_back(out);
        self.prev_emitted = EmittedKind::Preproc;
    }

    /// Queue a blank separator line (break-blocks).
    pub(crate) fn emit_blank_separator(&mut self) {
        self.out_queue.push_back(String::new());
        self.prev_emitted = EmittedKind::Empty;
    }

    // --- character dispatch -------------------------------------------------

    fn process_char(&mut self, ch: char) {
        if self.in_line_comment {
            self.append_raw(ch);
            return;
        }
        if self.in_comment {
            if ch == '*' && self.peek_char() == Some('/') {
                self.append_raw('*');
                self.append_raw('/');
                self.char_num += 1;
                self.in_comment = false;
            } else {
                self.append_raw(ch);
            }
            return;
        }
        if self.in_quote {
            self.append_raw(ch);
            if ch == '\\' {
                if let Some(next) = self.peek_char() {
                    self.append_raw(next);
                    self.char_num += 1;
                }
                return;
            }
            if ch == self.quote_char {
                self.in_quote = false;
                self.prev_non_ws = ch;
            }
            return;
        }

        if ch == '/' && self.peek_char() == Some('/') {
            self.start_line_comment();
            return;
        }
        if ch == '/' && self.peek_char() == Some('*') {
            self.start_block_comment();
            return;
        }
        if ch == '"' || ch == '\'' {
            self.suppress_ws = false;
            self.handle_break_before(ch);
            self.apply_join_space();
            self.in_quote = true;
            self.quote_char = ch;
            self.append(ch);
            return;
        }
        if is_whitespace(ch) {
            self.handle_whitespace(ch);
            return;
        }
        self.handle_significant(ch);
    }

    fn start_line_comment(&mut self) {
        self.suppress_ws = false;
        self.apply_join_space();
        if !self.formatted.is_empty() && !matches!(self.formatted.last(), Some(' ')) {
            // keep one space between code and a trailing comment
            self.formatted.push(' ');
        }
        self.in_line_comment = true;
        self.append_raw('/');
        self.append_raw('/');
        self.char_num += 1;
    }

    fn start_block_comment(&mut self) {
        self.suppress_ws = false;
        self.apply_join_space();
        self.in_comment = true;
        self.append_raw('/');
        self.append_raw('*');
        self.char_num += 1;
    }

    fn handle_whitespace(&mut self, ch: char) {
        if self.suppress_ws || self.formatted.is_empty() {
            return;
        }
        if ch == '\t' && self.opt.convert_tabs {
            let col = self.formatted.len();
            let tab = self.opt.tab_length.max(1);
            let spaces = tab - (col % tab);
            for _ in 0..spaces {
                self.formatted.push(' ');
            }
            return;
        }
        self.formatted.push(ch);
        self.split.note_whitespace(self.formatted.len());
    }

    fn handle_significant(&mut self, ch: char) {
        self.suppress_ws = false;
        self.handle_break_before(ch);

        // a header body without braces may need them synthesized
        let was_post_header = self.post_header;
        if was_post_header && self.opt.add_braces && self.wants_added_brace(ch) {
            self.insert_open_brace();
            self.handle_break_before(ch);
        }

        self.apply_join_space();

        match ch {
            '{' => self.handle_open_brace(),
            '}' => self.handle_close_brace(),
            ';' => self.handle_semicolon(),
            ',' => self.handle_comma(),
            '(' => self.handle_open_paren(),
            ')' => self.handle_close_paren(),
            '[' => {
                self.square_brackets += 1;
                self.append(ch);
            }
            ']' => {
                self.square_brackets = self.square_brackets.saturating_sub(1);
                self.append(ch);
            }
            '#' => self.append(ch),
            _ => {
                if is_char_potential_header(&self.line, self.char_num) {
                    self.handle_word();
                } else if is_char_potential_operator(ch) {
                    self.handle_operator();
                } else {
                    self.append(ch);
                    self.in_statement = true;
                }
            }
        }

        if was_post_header {
            self.post_header = false;
        }
        self.maybe_split_line();
    }

    pub(crate) fn set_post_close_brace(&mut self) {
        self.post_close_brace = true;
    }

    /// Resolve any pending line break before appending new content.
    fn handle_break_before(&mut self, ch: char) {
        if self.post_close_brace {
            self.post_close_brace = false;
            if self.formatted.iter().any(|c| !is_whitespace(*c))
                && !self.close_brace_may_attach(ch)
            {
                self.flush_formatted();
            }
            return;
        }
        if self.break_before_content
            || (self.passed_semicolon && ch != '}')
            || (self.passed_case_colon && ch != '}')
        {
            self.flush_formatted();
        }
        self.passed_semicolon = false;
        self.passed_case_colon = false;
        self.break_before_content = false;
    }

    /// True when the char after a broken `}` stays on the brace line.
    fn close_brace_may_attach(&mut self, ch: char) -> bool {
        if ch == ';' || ch == ',' || ch == ')' {
            return true;
        }
        if self.opt.attach_closing_brace {
            self.need_join_space = true;
            return true;
        }
        if ch.is_ascii_alphabetic() || ch == '_' {
            let word = get_current_word(&self.line, self.char_num);
            if self.is_closing_header_word(&word) && self.closing_headers_attach() {
                return true;
            }
        }
        false
    }

    pub(crate) fn is_closing_header_word(&self, word: &str) -> bool {
        match word {
            w if w == ELSE => true,
            w if w == WHILE => self.last_closed_header == Some(DO),
            w if w == CATCH || w == "finally" => {
                matches!(self.last_closed_header, Some(h) if h == TRY || h == CATCH)
            }
            w if w == SEH_EXCEPT || w == SEH_FINALLY => self.last_closed_header == Some(SEH_TRY),
            _ => false,
        }
    }

    pub(crate) fn closing_headers_attach(&self) -> bool {
        if self.opt.break_closing_braces {
            return false;
        }
        matches!(
            self.opt.brace_mode,
            BraceMode::Attach | BraceMode::Linux | BraceMode::Stroustrup | BraceMode::None
        )
    }

    pub(crate) fn apply_join_space(&mut self) {
        if self.run_in_open {
            self.run_in_open = false;
            self.need_join_space = false;
            let pad = self.opt.indent_length.saturating_sub(1).max(1);
            for _ in 0..pad {
                self.formatted.push(' ');
            }
            return;
        }
        if self.need_join_space {
            self.need_join_space = false;
            if !self.formatted.is_empty() && !matches!(self.formatted.last(), Some(' ')) {
                self.formatted.push(' ');
            }
        }
    }

    // --- words and headers --------------------------------------------------

    fn handle_word(&mut self) {
        let start = self.char_num;
        let word = get_current_word(&self.line, start);
        let len = word.chars().count();

        if let Some(header) = find_header(&self.line, start, &HEADERS) {
            self.handle_header(header);
            self.char_num = start + len - 1;
            self.last_word = word;
            return;
        }

        match word.as_str() {
            "class" if self.paren_depth == 0 => {
                self.found_pre_definition = Some("class");
            }
            "struct" | "union" if self.paren_depth == 0 => {
                if self.found_pre_definition.is_none() {
                    self.found_pre_definition = Some("struct");
                }
            }
            "interface" if self.paren_depth == 0 => {
                self.found_pre_definition = Some("interface");
            }
            "namespace" if self.paren_depth == 0 => {
                self.found_pre_definition = Some("namespace");
            }
            "extern" if self.paren_depth == 0 && !self.in_statement => {
                self.found_extern = true;
            }
            "enum" if self.paren_depth == 0 => {
                self.found_enum = true;
            }
            "return" | "throw" => {
                self.post_return = true;
                self.in_potential_calculation = true;
            }
            w if self.paren_depth == 0
                && self.prev_non_ws == ')'
                && crate::lexer::tables::PRE_COMMAND_HEADERS.iter().any(|h| *h == w) =>
            {
                self.found_pre_command = true;
            }
            _ => {}
        }

        self.append_word(&word);
        self.in_statement = true;
        self.char_num = start + len - 1;
    }

    fn handle_header(&mut self, header: &'static str) {
        if header == CASE || header == DEFAULT {
            self.maybe_break_block_before(header);
            self.in_case = true;
            self.current_header = Some(header);
            self.append_word(header);
            self.char_num += header.chars().count() - 1;
            self.last_word = header.to_string();
            return;
        }

        if header == IF && self.last_word == ELSE {
            // `else if` chain
            if self.opt.break_elseifs {
                self.flush_formatted();
            }
            self.start_paren_header(header);
            return;
        }

        let closing = self.is_closing_header_word(header);
        if closing && ends_with_close_brace(&self.formatted) {
            if self.closing_headers_attach() {
                self.strip_trailing_ws();
                self.formatted.push(' ');
            } else {
                self.flush_formatted();
                self.maybe_break_block_before(header);
            }
        } else if self.formatted.iter().all(|c| is_whitespace(*c)) {
            self.maybe_break_block_before(header);
        }

        match header {
            h if h == ELSE || h == DO || h == TRY || h == SEH_TRY || h == SEH_FINALLY => {
                self.current_header = Some(header);
                self.post_header = true;
                self.in_header = false;
                self.append_word(header);
                self.char_num += header.chars().count() - 1;
            }
            _ => {
                // if, for, while, switch, catch, __except
                self.start_paren_header(header);
            }
        }
    }

    fn start_paren_header(&mut self, header: &'static str) {
        self.current_header = Some(header);
        self.in_header = true;
        self.header_paren_depth = None;
        self.append_word(header);
        self.char_num += header.chars().count() - 1;
        // headers are separated from their paren by one space
        if peek_next_char_from(&self.line, self.char_num + 1) == '(' {
            self.formatted.push(' ');
            self.suppress_ws = true;
        }
        self.last_word = header.to_string();
    }

    /// Insert a blank line before a block header (break-blocks).
    fn maybe_break_block_before(&mut self, header: &'static str) {
        if !self.opt.break_blocks {
            return;
        }
        if !self.formatted.iter().all(|c| is_whitespace(*c)) {
            return;
        }
        let closing = self.is_closing_header_word(header) || header == CASE || header == DEFAULT;
        if closing && !self.opt.break_closing_blocks {
            return;
        }
        if matches!(
            self.prev_emitted,
            EmittedKind::Code | EmittedKind::CloseBrace
        ) {
            self.emit_blank_separator();
        }
    }

    fn append_word(&mut self, word: &str) {
        for ch in word.chars() {
            self.append(ch);
        }
        self.last_word = word.to_string();
    }

    // --- simple separators --------------------------------------------------

    fn handle_semicolon(&mut self) {
        self.append(';');
        if self.paren_depth > 0 {
            // inside a for statement
            self.split.note_semicolon(self.formatted.len());
            if self.opt.pad_oper && self.peek_char().is_some_and(|c| !is_whitespace(c)) {
                self.formatted.push(' ');
                self.suppress_ws = true;
            }
            return;
        }
        let closed_added = self.close_added_braces();
        self.reset_statement();
        self.prev_command_char = ';';
        if closed_added {
            // a closing header may still attach to the synthesized brace
            self.set_post_close_brace();
        } else if !self.opt.keep_one_line_statements && self.one_line_depth == 0 {
            self.passed_semicolon = true;
        }
    }

    fn handle_comma(&mut self) {
        self.append(',');
        self.split.note_comma(self.formatted.len());
        if self.opt.pad_oper && self.peek_char().is_some_and(|c| !is_whitespace(c)) {
            self.formatted.push(' ');
            self.suppress_ws = true;
        }
    }

    fn handle_open_paren(&mut self) {
        if self.in_header && self.header_paren_depth.is_none() {
            self.header_paren_depth = Some(self.paren_depth);
            self.in_potential_calculation = true;
        }
        self.pad_before_open_paren();
        self.append('(');
        self.paren_depth += 1;
        self.split.note_paren(self.formatted.len());
        self.pad_after_open_paren();
        self.in_statement = true;
    }

    fn handle_close_paren(&mut self) {
        self.pad_before_close_paren();
        self.append(')');
        self.paren_depth = self.paren_depth.saturating_sub(1);
        if self.in_header && Some(self.paren_depth) == self.header_paren_depth {
            self.in_header = false;
            self.header_paren_depth = None;
            self.post_header = true;
            self.in_potential_calculation = false;
            // one space between the condition and a same-line body
            if is_legal_name_char(self.peek_next_visible()) {
                self.formatted.push(' ');
                self.suppress_ws = true;
            }
        }
        self.pad_after_close_paren();
    }

    /// Reset per-statement classification state.
    pub(crate) fn reset_statement(&mut self) {
        self.current_header = None;
        self.in_header = false;
        self.header_paren_depth = None;
        self.post_header = false;
        self.found_pre_definition = None;
        self.found_extern = false;
        self.found_enum = false;
        self.found_pre_command = false;
        self.post_return = false;
        self.in_potential_calculation = false;
        self.in_statement = false;
        self.question_depth = 0;
        self.in_case = false;
    }

    // --- case colons, handled from the operator path ------------------------

    pub(crate) fn handle_case_colon(&mut self) {
        self.append(':');
        self.in_case = false;
        self.prev_command_char = ':';
        if !self.opt.keep_one_line_statements && self.one_line_depth == 0 {
            self.passed_case_colon = true;
        }
    }

    // --- small helpers ------------------------------------------------------

    pub(crate) fn peek_char(&self) -> Option<char> {
        self.line.get(self.char_num + 1).copied()
    }

    /// The next non-whitespace char on the raw line after the cursor.
    pub(crate) fn peek_next_visible(&self) -> char {
        peek_next_char_from(&self.line, self.char_num + 1)
    }

    pub(crate) fn append(&mut self, ch: char) {
        self.formatted.push(ch);
        if !is_whitespace(ch) {
            self.prev_non_ws = ch;
        }
    }

    pub(crate) fn append_raw(&mut self, ch: char) {
        self.formatted.push(ch);
    }

    pub(crate) fn append_str(&mut self, s: &str) {
        for ch in s.chars() {
            self.append(ch);
        }
    }

    pub(crate) fn ensure_space_before(&mut self) {
        if let Some(&last) = self.formatted.last() {
            if !is_whitespace(last) {
                self.formatted.push(' ');
            }
        }
    }

    pub(crate) fn strip_trailing_ws(&mut self) {
        while matches!(self.formatted.last(), Some(c) if is_whitespace(*c)) {
            self.formatted.pop();
        }
    }

    /// Whether the add-braces body check should fire for this char.
    fn wants_added_brace(&self, ch: char) -> bool {
        let Some(header) = self.current_header else {
            return false;
        };
        if !(header == IF
            || header == ELSE
            || header == FOR
            || header == WHILE
            || header == DO)
        {
            return false;
        }
        if ch == '{' || ch == ';' {
            return false;
        }
        // never wrap an else-if chain in braces
        if header == ELSE && self.word_at_cursor_is(IF) {
            return false;
        }
        true
    }

    pub(crate) fn word_at_cursor_is(&self, word: &str) -> bool {
        starts_with_at(&self.line, self.char_num, word)
            && !self
                .line
                .get(self.char_num + word.chars().count())
                .copied()
                .is_some_and(is_legal_name_char)
    }

    // --- join decision at end of line ---------------------------------------

    fn should_hold_join(&mut self) -> bool {
        if self.formatted.is_empty() || self.in_comment || self.in_line_comment || self.in_quote {
            return false;
        }
        if !self.src.has_more_lines() {
            return false;
        }
        let peeked = self.src.peek_next_line();
        self.src.peek_reset();
        let next = peeked.trim_start();
        if next.is_empty() {
            return false;
        }
        let next_chars: Vec<char> = next.chars().collect();

        // a run-in brace pulls the first statement up to its own line
        if self.run_in_open && next_chars[0] != '}' {
            return true;
        }

        // `{` on the next line may attach to this one
        if next_chars[0] == '{' {
            let kind = self.classify_brace();
            if !kind.contains(BraceKind::ARRAY) && !self.is_brace_broken(kind, true) {
                return true;
            }
        }

        // `} else` style joins
        if ends_with_close_brace(&self.formatted) {
            let word = get_current_word(&next_chars, 0);
            if !word.is_empty()
                && self.is_closing_header_word(&word)
                && self.closing_headers_attach()
                && self.opt.brace_mode != BraceMode::None
            {
                return true;
            }
        }

        // hold the header line so synthesized braces can attach to it
        if self.opt.add_braces && self.post_header {
            if let Some(header) = self.current_header {
                let body_starts = !matches!(next_chars[0], '{' | ';' | '#' | '/');
                let else_if = header == ELSE && get_current_word(&next_chars, 0) == IF;
                if body_starts
                    && !else_if
                    && (header == IF
                        || header == ELSE
                        || header == FOR
                        || header == WHILE
                        || header == DO)
                {
                    return true;
                }
            }
        }

        false
    }
}

/// True when the last non-whitespace char in the buffer is `}`.
pub(crate) fn ends_with_close_brace(formatted: &[char]) -> bool {
    formatted
        .iter()
        .rev()
        .find(|c| !is_whitespace(**c))
        .is_some_and(|c| *c == '}')
}

fn classify_emitted(text: &str) -> EmittedKind {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return EmittedKind::Empty;
    }
    if trimmed.starts_with("//") || trimmed.starts_with("/*") {
        return EmittedKind::Comment;
    }
    if trimmed.ends_with('{') {
        return EmittedKind::OpenBrace;
    }
    if trimmed.starts_with('}') {
        return EmittedKind::CloseBrace;
    }
    if trimmed.starts_with("case ") || trimmed.starts_with("default") {
        return EmittedKind::CaseLabel;
    }
    EmittedKind::Code
}

fn is_exec_sql_start(text: &str) -> bool {
    let upper: String = text.chars().take(8).collect::<String>().to_ascii_uppercase();
    upper.starts_with("EXEC SQL")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{Options, PartialOptions};

    fn format(source: &str, options: &Options) -> Vec<String> {
        let mut formatter = Formatter::from_source(options, source);
        let mut lines = Vec::new();
        while formatter.has_more_lines() {
            lines.push(formatter.next_line());
        }
        assert_eq!(
            formatter.checksum_diff(),
            0,
            "checksum mismatch for {source:?}"
        );
        lines
    }

    fn with(partial: PartialOptions) -> Options {
        Options::resolve(&partial)
    }

    #[test]
    fn test_passthrough_simple_statement() {
        let out = format("int x;", &Options::default());
        assert_eq!(out, vec!["int x;"]);
    }

    #[test]
    fn test_allman_brace_break() {
        let options = with(PartialOptions {
            style: Some(crate::config::FormatStyle::Allman),
            ..Default::default()
        });
        let out = format("if(x){y;}", &options);
        assert_eq!(out, vec!["if (x)", "{", "    y;", "}"]);
    }

    #[test]
    fn test_java_brace_attach() {
        let options = with(PartialOptions {
            style: Some(crate::config::FormatStyle::Java),
            ..Default::default()
        });
        let out = format("if (x)\n{\ny;\n}\n", &options);
        assert_eq!(out, vec!["if (x) {", "    y;", "}", ""]);
    }

    #[test]
    fn test_attach_classes() {
        let options = with(PartialOptions {
            attach_classes: Some(true),
            ..Default::default()
        });
        let out = format("class A\n{\n};\n", &options);
        assert_eq!(out, vec!["class A {", "};", ""]);
    }

    #[test]
    fn test_operator_padding() {
        let options = with(PartialOptions {
            pad_oper: Some(true),
            ..Default::default()
        });
        let out = format("a=b+c;", &options);
        assert_eq!(out, vec!["a = b + c;"]);
    }

    #[test]
    fn test_pointer_alignment_variants() {
        let type_align = with(PartialOptions {
            pointer_align: Some(crate::config::PointerAlign::Type),
            ..Default::default()
        });
        assert_eq!(format("int *p;", &type_align), vec!["int* p;"]);

        let name_align = with(PartialOptions {
            pointer_align: Some(crate::config::PointerAlign::Name),
            ..Default::default()
        });
        assert_eq!(format("int* p;", &name_align), vec!["int *p;"]);

        let middle_align = with(PartialOptions {
            pointer_align: Some(crate::config::PointerAlign::Middle),
            ..Default::default()
        });
        assert_eq!(format("int *p;", &middle_align), vec!["int * p;"]);
    }

    #[test]
    fn test_switch_indent_levels() {
        let options = with(PartialOptions {
            style: Some(crate::config::FormatStyle::Allman),
            indent_switches: Some(true),
            ..Default::default()
        });
        let out = format("switch(x){\ncase 1:\nfoo();\nbreak;\n}\n", &options);
        assert_eq!(
            out,
            vec![
                "switch (x)",
                "{",
                "    case 1:",
                "        foo();",
                "        break;",
                "}",
                ""
            ]
        );
    }

    #[test]
    fn test_keep_one_line_blocks() {
        let options = with(PartialOptions {
            keep_one_line_blocks: Some(true),
            keep_one_line_statements: Some(true),
            ..Default::default()
        });
        let out = format("if (x) { y; }", &options);
        assert_eq!(out, vec!["if (x) { y; }"]);
    }

    #[test]
    fn test_break_one_line_statements() {
        let out = format("x; y;", &Options::default());
        assert_eq!(out, vec!["x;", "y;"]);
    }

    #[test]
    fn test_keep_one_line_statements() {
        let options = with(PartialOptions {
            keep_one_line_statements: Some(true),
            ..Default::default()
        });
        let out = format("x; y;", &options);
        assert_eq!(out, vec!["x; y;"]);
    }

    #[test]
    fn test_trailing_line_comment_stays() {
        let out = format("x; // note\n", &Options::default());
        assert_eq!(out, vec!["x; // note", ""]);
    }

    #[test]
    fn test_block_comment_passthrough() {
        let out = format("/* a\n   b\n*/\nx;\n", &Options::default());
        assert_eq!(out, vec!["/* a", "   b", "*/", "x;", ""]);
    }

    #[test]
    fn test_empty_brace_pair_stays_together() {
        let options = with(PartialOptions {
            style: Some(crate::config::FormatStyle::Allman),
            ..Default::default()
        });
        let out = format("void f()\n{}\n", &options);
        assert_eq!(out, vec!["void f()", "{}", ""]);
    }

    #[test]
    fn test_add_braces() {
        let options = with(PartialOptions {
            add_braces: Some(true),
            style: Some(crate::config::FormatStyle::Java),
            ..Default::default()
        });
        let out = format("if (x)\ny;\n", &options);
        assert_eq!(out, vec!["if (x) {", "    y;", "}", ""]);
    }

    #[test]
    fn test_remove_braces() {
        let options = with(PartialOptions {
            remove_braces: Some(true),
            style: Some(crate::config::FormatStyle::Allman),
            ..Default::default()
        });
        let out = format("if (x) { y(); }", &options);
        assert_eq!(out, vec!["if (x)", "    y();"]);
    }

    #[test]
    fn test_remove_braces_keeps_declarations() {
        let options = with(PartialOptions {
            remove_braces: Some(true),
            ..Default::default()
        });
        let out = format("if (x) { int y; }", &options);
        assert!(out.iter().any(|l| l.contains('{')));
    }

    #[test]
    fn test_delete_empty_lines() {
        let options = with(PartialOptions {
            delete_empty_lines: Some(true),
            ..Default::default()
        });
        let out = format("void f()\n{\nx;\n\ny;\n}\n", &options);
        assert_eq!(out, vec!["void f()", "{", "    x;", "    y;", "}", ""]);
    }

    #[test]
    fn test_do_while_attaches_in_java_style() {
        let options = with(PartialOptions {
            style: Some(crate::config::FormatStyle::Java),
            ..Default::default()
        });
        let out = format("do\n{\nx();\n}\nwhile (y);\n", &options);
        assert_eq!(out, vec!["do {", "    x();", "} while (y);", ""]);
    }

    #[test]
    fn test_preprocessor_untouched() {
        let out = format("#define FOO 1\nint x;\n", &Options::default());
        assert_eq!(out, vec!["#define FOO 1", "int x;", ""]);
    }

    #[test]
    fn test_pad_paren() {
        let options = with(PartialOptions {
            pad_paren_out: Some(true),
            pad_paren_in: Some(true),
            ..Default::default()
        });
        let out = format("foo(x);", &options);
        assert_eq!(out, vec!["foo ( x );"]);
    }

    #[test]
    fn test_unpad_paren() {
        let options = with(PartialOptions {
            unpad_paren: Some(true),
            ..Default::default()
        });
        let out = format("foo ( x );", &options);
        assert_eq!(out, vec!["foo(x);"]);
    }

    #[test]
    fn test_convert_tabs_in_code() {
        let options = with(PartialOptions {
            convert_tabs: Some(true),
            ..Default::default()
        });
        let out = format("int\tx;", &options);
        assert_eq!(out, vec!["int x;"]);
    }

    #[test]
    fn test_checksum_tracks_added_braces() {
        let options = with(PartialOptions {
            add_braces: Some(true),
            ..Default::default()
        });
        let mut formatter = Formatter::from_source(&options, "if (x)\ny;\n");
        while formatter.has_more_lines() {
            formatter.next_line();
        }
        assert_eq!(formatter.checksum_diff(), 0);
    }
}
