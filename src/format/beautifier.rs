//! The beautifier: computes the leading whitespace of every emitted line.
//!
//! The formatter reshapes each line and hands it here; the beautifier keeps
//! a running parse of the bracket/statement context and prepends the right
//! indent. It never changes anything but leading whitespace.

use crate::config::{IndentStyle, Options};
use crate::lexer::chars::{
    is_char_potential_header, is_legal_name_char, is_whitespace, peek_next_char_from,
};
use crate::lexer::tables::{
    find_header, find_operator, ASSIGNMENT_OPERATORS, CASE, CATCH, DEFAULT, DO, ELSE, HEADERS,
    IF, OPERATORS, SEH_EXCEPT, SEH_FINALLY, SEH_TRY, SWITCH, TRY, WHILE,
};

/// What kind of construct an open brace belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ScopeKind {
    /// Code block; `under_header` when it is the body of a control header.
    Command { under_header: bool },
    /// Free-standing block opened under a case label. Indented as if
    /// indent-cases were on; the enhancer unindents it otherwise.
    CaseBlock,
    Namespace,
    Class,
    Struct,
    Switch,
    Extern,
    Array,
}

/// An active header awaiting or owning an unbraced body.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ChainEntry {
    Header(&'static str),
    Case,
}

/// Per-line lexical signals forwarded by the formatter.
#[derive(Debug, Clone, Copy, Default)]
pub struct LineSignals {
    /// Column-1 line comment that must not be re-indented.
    pub line_comment_no_indent: bool,
    /// The line is inside a preprocessor directive.
    pub is_in_preprocessor: bool,
}

/// The clonable indent context. `#if`/`#else` branches restore a deep copy
/// of this so both arms of a conditional parse from the same state.
#[derive(Debug, Clone, Default)]
struct IndentState {
    scopes: Vec<Scope>,
    chain: Vec<ChainEntry>,
    /// Saved header chains, one per open brace.
    temp_stacks: Vec<Vec<ChainEntry>>,
    /// True once the innermost header's body has completed.
    chain_body_done: bool,
    paren_depth: usize,
    paren_indent_stack: Vec<usize>,
    in_statement_indent: Option<usize>,
    is_in_statement: bool,
    square_bracket_count: usize,
    // lexical carry-over between lines
    is_in_comment: bool,
    is_in_quote: bool,
    quote_char: char,
    is_in_define: bool,
    backslash_continues: bool,
    // pending construct words seen before a `{`
    pending_scope: Option<ScopeKind>,
    // transient per-statement flags
    just_closed_header_paren: bool,
    in_case_label: bool,
    last_word_was_else: bool,
    assign_col: Option<usize>,
    /// Column of the last selector colon in an open bracketed message send.
    objc_colon_col: Option<usize>,
    last_significant_char: char,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Scope {
    kind: ScopeKind,
}

/// Stateful per-file indent engine.
#[derive(Debug)]
pub struct Beautifier {
    opt: Options,
    state: IndentState,
    /// One snapshot per open `#if`, restored at `#else`/`#elif`.
    snapshots: Vec<IndentState>,
    /// (indent count, space indent) recorded at each open `#if`, so the
    /// whole conditional group sits at the same column.
    preproc_indent_stack: Vec<(usize, usize)>,
    prev_leading_ws: String,
    /// Signals set by the formatter before each call.
    pub signals: LineSignals,
}

impl Beautifier {
    #[must_use]
    pub fn new(opt: &Options) -> Self {
        Self {
            opt: opt.clone(),
            state: IndentState::default(),
            snapshots: Vec::new(),
            preproc_indent_stack: Vec::new(),
            prev_leading_ws: String::new(),
            signals: LineSignals::default(),
        }
    }

    /// Reset all per-file state so the instance can format another file.
    pub fn init(&mut self) {
        self.state = IndentState::default();
        self.snapshots.clear();
        self.preproc_indent_stack.clear();
        self.prev_leading_ws.clear();
        self.signals = LineSignals::default();
    }

    /// Drop any chain still waiting for a continuation at end of file.
    pub fn end_of_file(&mut self) {
        self.state.chain.clear();
        self.state.chain_body_done = false;
    }

    /// True when all scope bookkeeping has unwound (well-formed input).
    #[must_use]
    pub fn stacks_balanced(&self) -> bool {
        self.state.scopes.is_empty()
            && self.state.chain.is_empty()
            && self.state.temp_stacks.is_empty()
            && self.state.paren_indent_stack.is_empty()
            && self.snapshots.is_empty()
            && self.preproc_indent_stack.is_empty()
    }

    /// Prepend the correct leading whitespace to an already-reshaped line.
    pub fn beautify(&mut self, line: &str) -> String {
        // comment and verbatim-quote continuations keep their own layout
        if self.state.is_in_comment || (self.state.is_in_quote && self.state.quote_char == '"') {
            let chars: Vec<char> = line.chars().collect();
            if self.state.is_in_comment {
                self.scan_comment_continuation(&chars);
            } else {
                self.scan_quote_continuation(&chars);
            }
            return line.to_string();
        }

        if line.trim().is_empty() {
            if self.opt.fill_empty_lines {
                return self.prev_leading_ws.clone();
            }
            return String::new();
        }

        if self.signals.line_comment_no_indent {
            return line.to_string();
        }

        // preprocessor lines manage their own indent and state
        if self.state.backslash_continues {
            return self.continue_preprocessor(line);
        }
        if let Some(out) = self.maybe_define_continuation(line) {
            return out;
        }
        let chars: Vec<char> = line.chars().collect();
        if chars[0] == '#' {
            return self.handle_preprocessor(line, &chars);
        }

        let first_word = leading_word(&chars);
        self.resolve_pending_chain(&first_word);

        let (indent_count, space_indent) = self.compute_indent(&chars, &first_word);
        let leading = self.lead_ws(indent_count, space_indent);
        let line_cols = indent_count * self.opt.indent_length + space_indent;
        self.parse_line(&chars, line_cols);

        self.prev_leading_ws.clone_from(&leading);
        format!("{leading}{line}")
    }

    // --- indent computation -------------------------------------------------

    /// Sum the indent contributed by every open scope for a content line.
    fn scopes_indent(&self) -> usize {
        let mut count = 0;
        for scope in &self.state.scopes {
            count += self.scope_contribution(scope.kind);
        }
        count
    }

    fn scope_contribution(&self, kind: ScopeKind) -> usize {
        match kind {
            ScopeKind::Command { under_header } => {
                if self.opt.block_indent && under_header {
                    2
                } else {
                    1
                }
            }
            ScopeKind::CaseBlock => 2,
            ScopeKind::Namespace => usize::from(self.opt.indent_namespaces),
            ScopeKind::Class => 1 + usize::from(self.opt.indent_classes),
            ScopeKind::Struct | ScopeKind::Extern | ScopeKind::Array => 1,
            ScopeKind::Switch => usize::from(self.opt.indent_switches),
        }
    }

    /// Extra indent applied to the brace line itself (Whitesmith, GNU).
    fn brace_line_adjustment(&self, under_header: bool) -> usize {
        let mut extra = 0;
        if self.opt.brace_indent {
            extra += 1;
        }
        if self.opt.block_indent && under_header {
            extra += 1;
        }
        extra
    }

    fn compute_indent(&mut self, chars: &[char], first_word: &str) -> (usize, usize) {
        let first = chars[0];

        // opening brace on its own line aligns under its header; a block
        // under a case label sits one deeper, at the case body level
        if first == '{' {
            if matches!(self.state.chain.last(), Some(ChainEntry::Case)) {
                let base = self.scopes_indent() + self.state.chain.len();
                return (base + self.brace_line_adjustment(false), 0);
            }
            let under_header = !self.state.chain.is_empty();
            let base = self.scopes_indent() + self.state.chain.len().saturating_sub(1);
            return (base + self.brace_line_adjustment(under_header), 0);
        }

        // closing brace aligns with the line that opened the scope
        if first == '}' {
            if let Some(scope) = self.state.scopes.last() {
                let mut base = self.scopes_indent() - self.scope_contribution(scope.kind);
                match scope.kind {
                    ScopeKind::Command { under_header } => {
                        base += self.brace_line_adjustment(under_header);
                    }
                    ScopeKind::CaseBlock => {
                        base += 1 + usize::from(self.opt.brace_indent);
                    }
                    _ => {
                        if self.opt.brace_indent {
                            base += 1;
                        }
                    }
                }
                return (base, 0);
            }
            return (0, 0);
        }

        // selector continuations align on the previous line's colon
        if self.state.square_bracket_count > 0 && self.opt.align_method_colon {
            if let Some(col) = self.state.objc_colon_col {
                return (0, col);
            }
        }

        // continuation inside an unfinished expression
        if self.state.paren_depth > 0 {
            let col = self
                .state
                .paren_indent_stack
                .last()
                .copied()
                .unwrap_or(self.opt.indent_length);
            return (0, col);
        }
        if let Some(col) = self.state.in_statement_indent {
            if self.state.is_in_statement {
                return (0, col);
            }
        }

        let scopes = self.scopes_indent();

        // case labels sit at the switch body level
        if first_word == CASE || first_word == DEFAULT {
            let chain = self.chain_without_trailing_case();
            return (scopes + chain, 0);
        }

        // closing headers line up with the header they continue
        if self.continues_chain(first_word) {
            return (scopes + self.state.chain.len().saturating_sub(1), 0);
        }

        // access modifiers belong to the innermost class scope
        if is_access_modifier(chars, first_word) {
            if let Some(adjust) = self.access_modifier_indent(scopes) {
                return adjust;
            }
        }

        // goto labels are flush left, or one level back with indent-labels
        if self.is_goto_label(chars, first_word) {
            let content = scopes + self.state.chain.len();
            if self.opt.indent_labels {
                return (content.saturating_sub(1), 0);
            }
            return (0, 0);
        }

        // comments between a body and its continuation align with the
        // continuation, not the body
        if chars[0] == '/' && self.state.chain_body_done {
            return (scopes + self.state.chain.len().saturating_sub(1), 0);
        }

        (scopes + self.state.chain.len(), 0)
    }

    fn chain_without_trailing_case(&self) -> usize {
        let mut len = self.state.chain.len();
        if matches!(self.state.chain.last(), Some(ChainEntry::Case)) {
            len -= 1;
        }
        len
    }

    fn access_modifier_indent(&self, scopes: usize) -> Option<(usize, usize)> {
        let innermost = self.state.scopes.last()?;
        if !matches!(innermost.kind, ScopeKind::Class | ScopeKind::Struct) {
            return None;
        }
        let class_contribution = self.scope_contribution(innermost.kind);
        let mut indent = scopes - class_contribution;
        if self.opt.indent_classes {
            indent += 1;
        }
        let half = if self.opt.indent_modifiers {
            self.opt.indent_length / 2
        } else {
            0
        };
        Some((indent, half))
    }

    fn is_goto_label(&self, chars: &[char], first_word: &str) -> bool {
        if first_word.is_empty()
            || first_word == CASE
            || first_word == DEFAULT
            || is_access_modifier(chars, first_word)
        {
            return false;
        }
        if HEADERS.iter().any(|h| *h == first_word) {
            return false;
        }
        let after = first_word.chars().count();
        let mut i = after;
        while i < chars.len() && is_whitespace(chars[i]) {
            i += 1;
        }
        // a lone colon, not `::` and not `?:`
        i < chars.len()
            && chars[i] == ':'
            && chars.get(i + 1) != Some(&':')
            && !self.state.is_in_statement
            && self.state.square_bracket_count == 0
    }

    /// True when `word` continues the pending header chain (else after if,
    /// while after do, catch after try).
    fn continues_chain(&self, word: &str) -> bool {
        if !self.state.chain_body_done {
            return false;
        }
        let Some(&ChainEntry::Header(last)) = self.state.chain.last() else {
            return false;
        };
        match word {
            w if w == ELSE => last == IF,
            w if w == WHILE => last == DO,
            w if w == CATCH => last == TRY || last == CATCH,
            w if w == SEH_EXCEPT || w == SEH_FINALLY => last == SEH_TRY,
            "finally" => last == TRY || last == CATCH,
            _ => false,
        }
    }

    /// Drop a completed header chain unless the new line continues it.
    fn resolve_pending_chain(&mut self, first_word: &str) {
        if !self.state.chain_body_done || first_word.is_empty() {
            return;
        }
        if self.continues_chain(first_word) {
            return;
        }
        // comment lines do not resolve the chain
        if first_word.starts_with('/') {
            return;
        }
        // keep open case labels, drop completed header entries above them
        while let Some(ChainEntry::Header(_)) = self.state.chain.last() {
            self.state.chain.pop();
        }
        self.state.chain_body_done = false;
    }

    // --- line parsing -------------------------------------------------------

    #[allow(clippy::cognitive_complexity)]
    fn parse_line(&mut self, chars: &[char], line_cols: usize) {
        let mut i = 0;
        let mut in_line_comment = false;
        self.state.just_closed_header_paren = false;
        self.state.assign_col = None;

        while i < chars.len() {
            let ch = chars[i];

            if self.state.is_in_comment {
                if ch == '*' && chars.get(i + 1) == Some(&'/') {
                    self.state.is_in_comment = false;
                    i += 2;
                    continue;
                }
                i += 1;
                continue;
            }
            if in_line_comment {
                i += 1;
                continue;
            }
            if self.state.is_in_quote {
                if ch == '\\' {
                    i += 2;
                    continue;
                }
                if ch == self.state.quote_char {
                    self.state.is_in_quote = false;
                }
                i += 1;
                continue;
            }

            match ch {
                '/' if chars.get(i + 1) == Some(&'/') => {
                    in_line_comment = true;
                    i += 2;
                    continue;
                }
                '/' if chars.get(i + 1) == Some(&'*') => {
                    self.state.is_in_comment = true;
                    i += 2;
                    continue;
                }
                '"' | '\'' => {
                    self.state.is_in_quote = true;
                    self.state.quote_char = ch;
                    self.state.is_in_statement = true;
                    self.state.just_closed_header_paren = false;
                    self.state.last_significant_char = ch;
                    i += 1;
                    continue;
                }
                _ => {}
            }

            if is_whitespace(ch) {
                i += 1;
                continue;
            }

            match ch {
                '(' => {
                    self.register_paren_indent(chars, i, line_cols);
                    self.state.paren_depth += 1;
                    self.state.is_in_statement = true;
                }
                ')' => {
                    if self.state.paren_depth > 0 {
                        self.state.paren_depth -= 1;
                        self.state.paren_indent_stack.pop();
                        if self.state.paren_depth == 0 && !self.state.chain.is_empty() {
                            self.state.just_closed_header_paren = true;
                        }
                    }
                }
                '[' => {
                    self.state.square_bracket_count += 1;
                    self.state.just_closed_header_paren = false;
                }
                ']' => {
                    self.state.square_bracket_count =
                        self.state.square_bracket_count.saturating_sub(1);
                    if self.state.square_bracket_count == 0 {
                        self.state.objc_colon_col = None;
                    }
                    self.state.just_closed_header_paren = false;
                }
                // the brace classifier needs the char before the `{`
                '{' => self.open_scope(),
                '}' => self.close_scope(),
                ';' if self.state.paren_depth == 0 => {
                    self.end_statement();
                    self.state.just_closed_header_paren = false;
                }
                ':' if self.state.in_case_label && chars.get(i + 1) != Some(&':') => {
                    // the colon closes the case label; the body indents below it
                    self.state.in_case_label = false;
                    if !matches!(self.state.chain.last(), Some(ChainEntry::Case)) {
                        self.state.chain.push(ChainEntry::Case);
                    }
                    self.state.chain_body_done = false;
                    self.state.is_in_statement = false;
                }
                ':' if chars.get(i + 1) == Some(&':') => {
                    self.state.just_closed_header_paren = false;
                    self.state.last_significant_char = ':';
                    i += 2;
                    continue;
                }
                _ => {
                    if is_char_potential_header(chars, i) {
                        let word_len = self.handle_word(chars, i);
                        self.state.last_significant_char = chars[i + word_len - 1];
                        i += word_len;
                        continue;
                    }
                    if self.state.paren_depth == 0 {
                        if let Some(op) = find_operator(chars, i, &OPERATORS) {
                            if ASSIGNMENT_OPERATORS.contains(&op) {
                                self.state.assign_col =
                                    Some(line_cols + i + op.chars().count() + 1);
                            }
                            if op == ":" && self.state.square_bracket_count > 0 {
                                self.state.objc_colon_col = Some(line_cols + i);
                            }
                            self.state.is_in_statement = true;
                            self.state.just_closed_header_paren = false;
                            self.state.last_significant_char =
                                op.chars().last().unwrap_or(ch);
                            i += op.chars().count();
                            continue;
                        }
                    }
                    self.state.is_in_statement = true;
                    self.state.just_closed_header_paren = false;
                }
            }
            self.state.last_significant_char = ch;
            i += 1;
        }

        self.finish_line(line_cols);
    }

    /// Handle an identifier/keyword starting at `i`; returns its length.
    fn handle_word(&mut self, chars: &[char], i: usize) -> usize {
        let mut end = i;
        while end < chars.len() && is_legal_name_char(chars[end]) {
            end += 1;
        }
        let len = end - i;

        if self.state.paren_depth == 0 && !self.state.in_case_label {
            if let Some(header) = find_header(chars, i, &HEADERS) {
                self.handle_header(header);
                return len;
            }
            let word: String = chars[i..end].iter().collect();
            match word.as_str() {
                "class" => self.state.pending_scope = Some(ScopeKind::Class),
                "struct" | "union" => {
                    if self.state.pending_scope.is_none() {
                        self.state.pending_scope = Some(ScopeKind::Struct);
                    }
                }
                "interface" => self.state.pending_scope = Some(ScopeKind::Class),
                "namespace" => self.state.pending_scope = Some(ScopeKind::Namespace),
                "extern" => self.state.pending_scope = Some(ScopeKind::Extern),
                "enum" => {
                    if self.state.pending_scope.is_none() {
                        self.state.pending_scope = Some(ScopeKind::Array);
                    }
                }
                _ => {}
            }
        }
        self.state.is_in_statement = true;
        self.state.just_closed_header_paren = false;
        len
    }

    fn handle_header(&mut self, header: &'static str) {
        match header {
            h if h == CASE || h == DEFAULT => {
                // pop the previous case so the label list stays flat
                if matches!(self.state.chain.last(), Some(ChainEntry::Case)) {
                    self.state.chain.pop();
                }
                self.state.in_case_label = true;
            }
            h if h == ELSE => {
                if self.state.chain_body_done
                    && matches!(self.state.chain.last(), Some(&ChainEntry::Header(last)) if last == IF)
                {
                    // revive the chain: the else takes the if's place
                    self.state.chain_body_done = false;
                    self.state.last_word_was_else = true;
                } else {
                    self.state.chain.push(ChainEntry::Header(IF));
                    self.state.chain_body_done = false;
                    self.state.last_word_was_else = true;
                }
            }
            h if h == IF => {
                if self.state.last_word_was_else {
                    // `else if` shares the else's chain entry
                    self.state.last_word_was_else = false;
                } else {
                    self.state.chain.push(ChainEntry::Header(IF));
                    self.state.chain_body_done = false;
                }
            }
            h if h == WHILE => {
                if self.state.chain_body_done
                    && matches!(self.state.chain.last(), Some(&ChainEntry::Header(last)) if last == DO)
                {
                    // while of do-while; the terminating `;` drops the chain
                    self.state.chain_body_done = false;
                    self.state.chain.pop();
                } else {
                    self.state.chain.push(ChainEntry::Header(WHILE));
                    self.state.chain_body_done = false;
                }
            }
            h if h == CATCH || h == SEH_EXCEPT || h == SEH_FINALLY => {
                if self.state.chain_body_done {
                    self.state.chain_body_done = false;
                } else {
                    self.state.chain.push(ChainEntry::Header(header));
                }
            }
            _ => {
                self.state.chain.push(ChainEntry::Header(header));
                self.state.chain_body_done = false;
            }
        }
        self.state.is_in_statement = true;
        self.state.last_word_was_else = header == ELSE;
    }

    fn open_scope(&mut self) {
        let kind = if let Some(pending) = self.state.pending_scope.take() {
            pending
        } else if matches!(self.state.chain.last(), Some(ChainEntry::Header(h)) if *h == SWITCH) {
            ScopeKind::Switch
        } else if matches!(self.state.chain.last(), Some(ChainEntry::Case))
            && !self.state.is_in_statement
        {
            ScopeKind::CaseBlock
        } else if matches!(self.state.chain.last(), Some(ChainEntry::Header(_))) {
            ScopeKind::Command { under_header: true }
        } else if matches!(self.state.last_significant_char, '=' | ',') {
            ScopeKind::Array
        } else {
            ScopeKind::Command {
                under_header: false,
            }
        };
        // an array scope opened mid-statement keeps the statement alive
        if kind != ScopeKind::Array {
            self.state.is_in_statement = false;
            self.state.in_statement_indent = None;
        }
        self.state.scopes.push(Scope { kind });
        self.state
            .temp_stacks
            .push(std::mem::take(&mut self.state.chain));
        self.state.chain_body_done = false;
        self.state.last_word_was_else = false;
    }

    fn close_scope(&mut self) {
        let closed = self.state.scopes.pop();
        if let Some(saved) = self.state.temp_stacks.pop() {
            self.state.chain = saved;
        } else {
            self.state.chain.clear();
        }
        // the block completed the innermost header's body
        if !self.state.chain.is_empty() {
            self.state.chain_body_done = true;
            self.drop_uncontinuable_chain();
        }
        if matches!(closed, Some(Scope { kind: ScopeKind::Array })) {
            // array braces close mid-statement
        } else {
            self.state.is_in_statement = false;
            self.state.in_statement_indent = None;
        }
        self.state.pending_scope = None;
    }

    /// Pop trailing chain entries that nothing can continue (switch, for,
    /// while); if/do/try stay and wait for else/while/catch.
    fn drop_uncontinuable_chain(&mut self) {
        while let Some(&ChainEntry::Header(h)) = self.state.chain.last() {
            let continuable = h == IF || h == DO || h == TRY || h == CATCH || h == SEH_TRY;
            if continuable {
                break;
            }
            self.state.chain.pop();
        }
        if self.state.chain.is_empty() {
            self.state.chain_body_done = false;
        }
    }

    fn end_statement(&mut self) {
        self.state.is_in_statement = false;
        self.state.in_statement_indent = None;
        self.state.pending_scope = None;
        self.state.last_word_was_else = false;
        if !matches!(self.state.chain.last(), Some(ChainEntry::Case)) && !self.state.chain.is_empty()
        {
            self.state.chain_body_done = true;
        }
    }

    fn register_paren_indent(&mut self, chars: &[char], i: usize, line_cols: usize) {
        let next = peek_next_char_from(chars, i + 1);
        let col = if next == ' ' {
            // nothing follows the paren on this line
            let floor = if self.state.chain.is_empty() {
                self.opt.indent_length
            } else {
                self.opt.min_conditional_indent()
            };
            line_cols + floor
        } else {
            let mut j = i + 1;
            while j < chars.len() && is_whitespace(chars[j]) {
                j += 1;
            }
            line_cols + j
        };
        let col = if col > self.opt.max_in_statement_indent {
            self.opt.indent_length * 2
        } else {
            col
        };
        self.state.paren_indent_stack.push(col);
    }

    fn finish_line(&mut self, line_cols: usize) {
        // `else if` merges only within one line
        self.state.last_word_was_else = false;
        if self.state.last_significant_char == ':' {
            // a label or access modifier closed this line
            self.state.is_in_statement = false;
        }
        if self.state.paren_depth > 0 || !self.state.is_in_statement {
            return;
        }
        if self.state.just_closed_header_paren {
            // `if (x)` at end of line awaits its body, not a continuation
            return;
        }
        if matches!(self.state.last_significant_char, ';' | '{' | '}' | ':') {
            return;
        }
        if non_paren_body_pending(self.state.last_significant_char) {
            return;
        }
        if self.state.in_statement_indent.is_none() {
            let col = self
                .state
                .assign_col
                .unwrap_or(line_cols + self.opt.indent_length);
            let col = if col > self.opt.max_in_statement_indent {
                self.opt.indent_length * 2
            } else {
                col
            };
            self.state.in_statement_indent = Some(col);
        }
    }

    // --- continuations of comments, quotes, preprocessor --------------------

    fn scan_comment_continuation(&mut self, chars: &[char]) {
        let mut i = 0;
        while i < chars.len() {
            if chars[i] == '*' && chars.get(i + 1) == Some(&'/') {
                self.state.is_in_comment = false;
                i += 2;
                // anything after the closer on this line keeps its layout
                break;
            }
            i += 1;
        }
    }

    fn scan_quote_continuation(&mut self, chars: &[char]) {
        let mut i = 0;
        while i < chars.len() {
            if chars[i] == '\\' {
                i += 2;
                continue;
            }
            if chars[i] == self.state.quote_char {
                self.state.is_in_quote = false;
                break;
            }
            i += 1;
        }
    }

    fn handle_preprocessor(&mut self, line: &str, chars: &[char]) -> String {
        let directive = preproc_directive(chars);
        let continues = line.trim_end().ends_with('\\');

        match directive.as_str() {
            "define" => {
                if continues && self.opt.indent_preproc_define {
                    self.state.is_in_define = true;
                }
                self.state.backslash_continues = continues && !self.opt.indent_preproc_define;
                line.to_string()
            }
            "if" | "ifdef" | "ifndef" => {
                self.snapshots.push(self.state.clone());
                // the directive indents like an ordinary statement here
                let pair = (self.scopes_indent() + self.state.chain.len(), 0);
                self.preproc_indent_stack.push(pair);
                self.state.backslash_continues = continues;
                self.preproc_cond_line(line, pair)
            }
            "else" | "elif" => {
                if let Some(snapshot) = self.snapshots.last() {
                    self.state = snapshot.clone();
                }
                self.state.backslash_continues = continues;
                let pair = self.preproc_indent_stack.last().copied().unwrap_or((0, 0));
                self.preproc_cond_line(line, pair)
            }
            "endif" => {
                self.snapshots.pop();
                let pair = self.preproc_indent_stack.pop().unwrap_or((0, 0));
                self.state.backslash_continues = continues;
                self.preproc_cond_line(line, pair)
            }
            _ => {
                self.state.backslash_continues = continues;
                line.to_string()
            }
        }
    }

    fn preproc_cond_line(&self, line: &str, pair: (usize, usize)) -> String {
        if self.opt.indent_preproc_cond {
            format!("{}{line}", self.lead_ws(pair.0, pair.1))
        } else {
            line.to_string()
        }
    }

    fn continue_preprocessor(&mut self, line: &str) -> String {
        self.state.backslash_continues = line.trim_end().ends_with('\\');
        line.to_string()
    }

    /// Indent continuation lines of a `#define` one step.
    fn beautify_define_continuation(&mut self, line: &str) -> String {
        if !line.trim_end().ends_with('\\') {
            self.state.is_in_define = false;
        }
        format!("{}{line}", self.lead_ws(1, 0))
    }

    // --- whitespace emission ------------------------------------------------

    /// Build the leading whitespace for `indent_count` levels plus
    /// `space_indent` columns.
    fn lead_ws(&self, indent_count: usize, space_indent: usize) -> String {
        let len = self.opt.indent_length;
        match self.opt.indent_style {
            IndentStyle::Spaces => " ".repeat(indent_count * len + space_indent),
            IndentStyle::Tab => {
                let mut ws = "\t".repeat(indent_count);
                ws.push_str(&" ".repeat(space_indent));
                ws
            }
            IndentStyle::ForceTab => {
                let total = indent_count * len + space_indent;
                let mut ws = "\t".repeat(total / len);
                ws.push_str(&" ".repeat(total % len));
                ws
            }
            IndentStyle::ForceTabX => {
                let total = indent_count * len + space_indent;
                let tab = self.opt.tab_length.max(1);
                let mut ws = "\t".repeat(total / tab);
                ws.push_str(&" ".repeat(total % tab));
                ws
            }
        }
    }
}

/// A line inside an indentable `#define` gets routed here by `beautify`.
impl Beautifier {
    pub(crate) fn maybe_define_continuation(&mut self, line: &str) -> Option<String> {
        if self.state.is_in_define {
            return Some(self.beautify_define_continuation(line));
        }
        None
    }
}

/// The directive word of a `#` line, skipping whitespace after the `#`.
fn preproc_directive(chars: &[char]) -> String {
    let mut i = 1;
    while i < chars.len() && is_whitespace(chars[i]) {
        i += 1;
    }
    let mut word = String::new();
    while i < chars.len() && is_legal_name_char(chars[i]) {
        word.push(chars[i]);
        i += 1;
    }
    word
}

/// The first identifier on the line, or empty.
fn leading_word(chars: &[char]) -> String {
    if chars.is_empty() || !is_legal_name_char(chars[0]) {
        return String::new();
    }
    let mut end = 0;
    while end < chars.len() && is_legal_name_char(chars[end]) {
        end += 1;
    }
    chars[..end].iter().collect()
}

fn is_access_modifier(chars: &[char], first_word: &str) -> bool {
    if !matches!(first_word, "public" | "protected" | "private") {
        return false;
    }
    let mut i = first_word.len();
    while i < chars.len() && is_whitespace(chars[i]) {
        i += 1;
    }
    chars.get(i) == Some(&':') && chars.get(i + 1) != Some(&':')
}

/// Headers whose body follows without parens leave the statement pending.
fn non_paren_body_pending(last: char) -> bool {
    // `else`, `do`, `try` end their line on a keyword letter
    is_legal_name_char(last)
}
