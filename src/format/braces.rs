//! Brace classification and placement.
//!
//! Every `{` is classified into a [`BraceKind`] bitmask from the statement
//! context, then placed according to the brace mode and the per-kind attach
//! overrides. Brace insertion (`add-braces`) and removal (`remove-braces`)
//! also live here so the checksum adjustments stay next to the edits.

use crate::config::BraceMode;
use crate::format::formatter::Formatter;
use crate::lexer::chars::{get_current_word, is_legal_name_char, is_whitespace, peek_next_char_from};
use crate::lexer::tables::{find_header, ELSE, FOR, HEADERS, IF, WHILE};

/// Bitmask classification of an open brace.
///
/// One structural bit plus zero or more modifier bits; NAMESPACE, CLASS,
/// STRUCT and INTERFACE imply DEFINITION, ARRAY_NIS implies ARRAY.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BraceKind(u16);

impl BraceKind {
    pub const NONE: BraceKind = BraceKind(0);
    pub const NAMESPACE: BraceKind = BraceKind(1);
    pub const CLASS: BraceKind = BraceKind(2);
    pub const STRUCT: BraceKind = BraceKind(4);
    pub const INTERFACE: BraceKind = BraceKind(8);
    pub const DEFINITION: BraceKind = BraceKind(16);
    pub const COMMAND: BraceKind = BraceKind(32);
    pub const ARRAY_NIS: BraceKind = BraceKind(64);
    pub const ARRAY: BraceKind = BraceKind(128);
    pub const EXTERN: BraceKind = BraceKind(256);
    pub const SINGLE_LINE: BraceKind = BraceKind(512);

    #[must_use]
    pub fn with(self, other: BraceKind) -> BraceKind {
        BraceKind(self.0 | other.0)
    }

    #[must_use]
    pub fn contains(self, other: BraceKind) -> bool {
        self.0 & other.0 != 0
    }
}

/// Per-brace bookkeeping kept on the formatter's brace stack.
#[derive(Debug, Clone)]
pub(crate) struct BraceState {
    pub kind: BraceKind,
    /// The header that owns this brace, if any (`if`, `do`, ...).
    pub header: Option<&'static str>,
    /// The block stays on one physical line.
    pub one_line: bool,
    /// The brace pair is being removed from the output.
    pub removed: bool,
    /// The brace pair was synthesized by add-braces.
    pub added: bool,
}

impl Formatter {
    /// Classify the `{` at the cursor from the statement context.
    pub(crate) fn classify_brace(&self) -> BraceKind {
        if let Some(pre) = self.found_pre_definition {
            let kind = match pre {
                "class" => BraceKind::CLASS,
                "interface" => BraceKind::INTERFACE,
                "namespace" => BraceKind::NAMESPACE,
                _ => BraceKind::STRUCT,
            };
            return kind.with(BraceKind::DEFINITION);
        }
        if self.found_extern {
            return BraceKind::EXTERN;
        }
        if self.found_enum {
            return BraceKind::ARRAY;
        }
        if self.current_header.is_some() {
            return BraceKind::COMMAND;
        }
        if self.is_function_definition_brace() {
            return BraceKind::COMMAND;
        }
        // initializer braces open mid-expression
        if self.in_statement && matches!(self.prev_non_ws, '=' | ',' | '(' | '[') {
            if matches!(self.prev_non_ws, ',' | '(' | '[') {
                return BraceKind::ARRAY.with(BraceKind::ARRAY_NIS);
            }
            return BraceKind::ARRAY;
        }
        // nested rows of an initializer list
        if self
            .braces
            .last()
            .is_some_and(|b| b.kind.contains(BraceKind::ARRAY))
            && self.prev_non_ws == '{'
        {
            return BraceKind::ARRAY;
        }
        BraceKind::COMMAND
    }

    pub(crate) fn is_function_definition_brace(&self) -> bool {
        self.current_header.is_none()
            && self.found_pre_definition.is_none()
            && !self.found_enum
            && !self.found_extern
            && (self.prev_non_ws == ')' || self.found_pre_command)
    }

    fn inside_class_body(&self) -> bool {
        self.braces.last().is_some_and(|b| {
            b.kind.contains(BraceKind::CLASS) || b.kind.contains(BraceKind::STRUCT)
        })
    }

    /// Whether a brace of `kind` goes on its own line. `prospective` is set
    /// when deciding about a `{` peeked on the next input line.
    pub(crate) fn is_brace_broken(&self, kind: BraceKind, prospective: bool) -> bool {
        if (kind.contains(BraceKind::CLASS) || kind.contains(BraceKind::INTERFACE))
            && self.opt.attach_classes
        {
            return false;
        }
        if kind.contains(BraceKind::NAMESPACE) && self.opt.attach_namespaces {
            return false;
        }
        if kind.contains(BraceKind::EXTERN) && self.opt.attach_extern_c {
            return false;
        }
        let function = self.is_function_definition_brace();
        if function && self.opt.attach_inlines && self.inside_class_body() {
            return false;
        }
        match self.opt.brace_mode {
            BraceMode::None => {
                if prospective {
                    true
                } else {
                    self.formatted.iter().all(|c| is_whitespace(*c))
                }
            }
            BraceMode::Attach => false,
            BraceMode::Break | BraceMode::RunIn => true,
            BraceMode::Linux => function || kind.contains(BraceKind::DEFINITION),
            BraceMode::Stroustrup => function,
        }
    }

    pub(crate) fn handle_open_brace(&mut self) {
        let kind = self.classify_brace();
        let header = self.current_header;

        if self.opt.remove_braces && self.can_remove_brace(kind) {
            self.adjust_checksum_in(-i64::from('{' as u32));
            self.strip_trailing_ws();
            self.braces.push(BraceState {
                kind,
                header,
                one_line: false,
                removed: true,
                added: false,
            });
            self.reset_statement();
            self.prev_command_char = '{';
            self.break_before_content = true;
            return;
        }

        // initializer braces keep their authored placement
        if kind.contains(BraceKind::ARRAY) {
            self.append('{');
            self.braces.push(BraceState {
                kind,
                header,
                one_line: true,
                removed: false,
                added: false,
            });
            self.one_line_depth += 1;
            self.prev_command_char = '{';
            return;
        }

        let block_state = self.one_line_block_state();
        let keep_one = block_state == 2 || (block_state == 1 && self.opt.keep_one_line_blocks);
        if keep_one {
            if self.formatted.iter().any(|c| !is_whitespace(*c)) {
                self.strip_trailing_ws();
                self.formatted.push(' ');
            }
            self.append('{');
            self.braces.push(BraceState {
                kind: kind.with(BraceKind::SINGLE_LINE),
                header,
                one_line: true,
                removed: false,
                added: false,
            });
            self.one_line_depth += 1;
            self.reset_statement();
            self.prev_command_char = '{';
            return;
        }

        if self.is_brace_broken(kind, false) {
            if self.formatted.iter().any(|c| !is_whitespace(*c)) {
                self.flush_formatted();
            }
            self.append('{');
            if self.opt.brace_mode == BraceMode::RunIn {
                self.run_in_open = true;
            } else {
                self.break_before_content = true;
            }
        } else {
            if self.formatted.iter().any(|c| !is_whitespace(*c)) {
                self.strip_trailing_ws();
                self.formatted.push(' ');
            }
            self.append('{');
            self.break_before_content = true;
        }
        self.braces.push(BraceState {
            kind,
            header,
            one_line: false,
            removed: false,
            added: false,
        });
        self.reset_statement();
        self.prev_command_char = '{';
    }

    pub(crate) fn handle_close_brace(&mut self) {
        let top = self.braces.pop().unwrap_or(BraceState {
            kind: BraceKind::COMMAND,
            header: None,
            one_line: false,
            removed: false,
            added: false,
        });
        self.last_closed_header = top.header;

        if top.removed {
            self.adjust_checksum_in(-i64::from('}' as u32));
            self.strip_trailing_ws();
            self.prev_command_char = '}';
            self.reset_statement();
            // whatever follows the removed block starts its own line
            self.break_before_content = true;
            return;
        }

        if top.kind.contains(BraceKind::ARRAY) {
            self.append('}');
            self.one_line_depth = self.one_line_depth.saturating_sub(1);
            self.prev_command_char = '}';
            return;
        }

        if top.one_line {
            if self.prev_non_ws != '{' && !matches!(self.formatted.last(), Some(' ')) {
                self.formatted.push(' ');
            }
            self.append('}');
            self.one_line_depth = self.one_line_depth.saturating_sub(1);
            self.prev_command_char = '}';
            self.reset_statement();
            return;
        }

        if self.formatted.iter().any(|c| !is_whitespace(*c)) {
            self.flush_formatted();
        }
        self.run_in_open = false;
        self.append('}');
        self.prev_command_char = '}';
        self.reset_statement();
        self.set_post_close_brace();
    }

    /// Synthesize a `{` after a header whose body has no braces.
    pub(crate) fn insert_open_brace(&mut self) {
        self.adjust_checksum_in(i64::from('{' as u32));
        let header = self.current_header;
        if self.opt.add_one_line_braces {
            if self.formatted.iter().any(|c| !is_whitespace(*c)) {
                self.strip_trailing_ws();
                self.formatted.push(' ');
            }
            self.append('{');
            self.formatted.push(' ');
            self.braces.push(BraceState {
                kind: BraceKind::COMMAND.with(BraceKind::SINGLE_LINE),
                header,
                one_line: true,
                removed: false,
                added: true,
            });
            self.one_line_depth += 1;
            self.prev_command_char = '{';
            return;
        }
        let broken = matches!(self.opt.brace_mode, BraceMode::Break | BraceMode::RunIn);
        if broken {
            if self.formatted.iter().any(|c| !is_whitespace(*c)) {
                self.flush_formatted();
            }
            self.append('{');
        } else if self.formatted.iter().any(|c| !is_whitespace(*c)) {
            self.strip_trailing_ws();
            self.formatted.push(' ');
            self.append('{');
        } else {
            self.append('{');
        }
        self.break_before_content = true;
        self.braces.push(BraceState {
            kind: BraceKind::COMMAND,
            header,
            one_line: false,
            removed: false,
            added: true,
        });
        self.prev_command_char = '{';
    }

    /// Close synthesized braces once their single statement has ended.
    /// Returns true when any brace was closed.
    pub(crate) fn close_added_braces(&mut self) -> bool {
        let mut closed = false;
        while matches!(self.braces.last(), Some(b) if b.added) {
            let brace = self.braces.pop().expect("checked by the loop condition");
            self.adjust_checksum_in(i64::from('}' as u32));
            if brace.one_line {
                self.formatted.push(' ');
                self.append('}');
                self.one_line_depth = self.one_line_depth.saturating_sub(1);
            } else {
                self.flush_formatted();
                self.append('}');
            }
            self.last_closed_header = brace.header;
            self.prev_command_char = '}';
            closed = true;
        }
        closed
    }

    /// 0 = block continues past this line, 1 = closes on this line,
    /// 2 = closes with no content (`{}`).
    pub(crate) fn one_line_block_state(&self) -> u8 {
        let mut depth = 1usize;
        let mut has_content = false;
        let mut in_q = false;
        let mut qc = ' ';
        let mut j = self.char_num + 1;
        while j < self.line.len() {
            let c = self.line[j];
            if in_q {
                if c == '\\' {
                    j += 2;
                    continue;
                }
                if c == qc {
                    in_q = false;
                }
                j += 1;
                continue;
            }
            match c {
                '"' | '\'' => {
                    in_q = true;
                    qc = c;
                    has_content = true;
                }
                '/' if self.line.get(j + 1) == Some(&'/') => return 0,
                '/' if self.line.get(j + 1) == Some(&'*') => {
                    // an inline comment must close on the same line
                    let mut k = j + 2;
                    loop {
                        if k + 1 >= self.line.len() {
                            return 0;
                        }
                        if self.line[k] == '*' && self.line[k + 1] == '/' {
                            break;
                        }
                        k += 1;
                    }
                    has_content = true;
                    j = k + 1;
                }
                '{' => depth += 1,
                '}' => {
                    depth -= 1;
                    if depth == 0 {
                        return if has_content { 1 } else { 2 };
                    }
                }
                c if !is_whitespace(c) => has_content = true,
                _ => {}
            }
            j += 1;
        }
        0
    }

    /// Safety check for remove-braces: the block must hold exactly one
    /// simple statement with no declarations, comments or nesting.
    fn can_remove_brace(&mut self, kind: BraceKind) -> bool {
        if !kind.contains(BraceKind::COMMAND) || kind.contains(BraceKind::SINGLE_LINE) {
            return false;
        }
        let Some(header) = self.current_header else {
            return false;
        };
        if !(header == IF || header == ELSE || header == FOR || header == WHILE) {
            return false;
        }
        match self.one_line_block_state() {
            2 => false,
            1 => self
                .inline_block_body()
                .is_some_and(|body| is_removable_statement(&body)),
            _ => {
                // the brace ends its line; peek for `stmt` + `}`
                if peek_next_char_from(&self.line, self.char_num + 1) != ' ' {
                    return false;
                }
                let first = self.src.peek_next_line();
                let second = self.src.peek_next_line();
                self.src.peek_reset();
                second.trim() == "}" && is_removable_statement(first.trim())
            }
        }
    }

    /// The text between the `{` at the cursor and its matching `}` on the
    /// same line, if the block is free of nesting.
    fn inline_block_body(&self) -> Option<String> {
        let mut body = String::new();
        let mut j = self.char_num + 1;
        while j < self.line.len() {
            let c = self.line[j];
            if c == '}' {
                return Some(body.trim().to_string());
            }
            if c == '{' {
                return None;
            }
            body.push(c);
            j += 1;
        }
        None
    }
}

/// True when a statement is safe to unwrap from its braces.
fn is_removable_statement(text: &str) -> bool {
    let trimmed = text.trim();
    if trimmed.is_empty() || trimmed.starts_with('#') {
        return false;
    }
    if trimmed.contains('{')
        || trimmed.contains('}')
        || trimmed.contains("//")
        || trimmed.contains("/*")
    {
        return false;
    }
    // exactly one statement, terminated on this line
    if trimmed.matches(';').count() != 1 || !trimmed.ends_with(';') {
        return false;
    }
    let chars: Vec<char> = trimmed.chars().collect();
    if find_header(&chars, 0, &HEADERS).is_some() {
        return false;
    }
    // `word word` at the start reads as a declaration
    let first = get_current_word(&chars, 0);
    if !first.is_empty()
        && !matches!(
            first.as_str(),
            "return" | "break" | "continue" | "goto" | "delete" | "throw"
        )
    {
        let mut i = first.chars().count();
        while i < chars.len() && is_whitespace(chars[i]) {
            i += 1;
        }
        if i < chars.len() && is_legal_name_char(chars[i]) {
            return false;
        }
    }
    true
}
