//! Operator and parenthesis padding, pointer/reference alignment.
//!
//! Operators are recognized longest-first against the operator table.
//! Unary and binary uses are disambiguated from the previous significant
//! character and the statement context; pointer and reference glyphs take
//! a separate path so the alignment options can move them.

use crate::config::{MethodColonPad, PointerAlign};
use crate::format::formatter::Formatter;
use crate::lexer::chars::{is_legal_name_char, is_whitespace};
use crate::lexer::tables::{find_operator, ASSIGNMENT_OPERATORS, HEADERS, OPERATORS};

impl Formatter {
    pub(crate) fn handle_operator(&mut self) {
        let ch = self.line[self.char_num];
        let Some(op) = find_operator(&self.line, self.char_num, &OPERATORS) else {
            self.append(ch);
            self.in_statement = true;
            return;
        };
        let len = op.chars().count();

        if op == "::" {
            self.append_str("::");
            self.char_num += 1;
            return;
        }
        if op == ":" {
            self.handle_colon();
            return;
        }
        if op == "?" {
            self.question_depth += 1;
            self.pad_binary_operator("?");
            return;
        }

        // template angle brackets are not operators
        if op == "<" && self.check_template_opener() {
            self.template_depth += 1;
            self.append('<');
            return;
        }
        if (op == ">" || op == ">>") && self.template_depth > 0 {
            self.handle_template_close(op);
            return;
        }

        // overload declarations: `operator+(...)`
        if self.last_word == "operator" {
            self.append_str(op);
            self.char_num += len - 1;
            return;
        }

        // Objective-C method prefix at the start of a line
        if (op == "+" || op == "-")
            && self.formatted.iter().all(|c| is_whitespace(*c))
            && self.peek_next_visible() == '('
            && (self.opt.pad_method_prefix || self.opt.unpad_method_prefix)
        {
            self.append(ch);
            if self.opt.pad_method_prefix {
                self.formatted.push(' ');
            }
            self.suppress_ws = true;
            return;
        }

        // pointer and reference glyphs
        if (op == "*" || op == "&") && self.is_pointer_or_reference() {
            self.format_pointer_or_reference(ch);
            return;
        }

        // glyphs that are never padded
        if matches!(op, "++" | "--" | "!" | "~" | "->") {
            self.append_str(op);
            self.char_num += len - 1;
            self.in_statement = true;
            return;
        }

        // unary +/-/*/& and exponent signs keep their operand
        if matches!(op, "+" | "-" | "*" | "&") && (self.is_unary_context() || self.is_in_exponent())
        {
            self.append(ch);
            self.in_statement = true;
            return;
        }

        if ASSIGNMENT_OPERATORS.contains(&op) {
            self.in_potential_calculation = true;
        }
        self.in_statement = true;
        self.pad_binary_operator(op);
    }

    /// Append a binary operator, padded when pad-oper is set.
    fn pad_binary_operator(&mut self, op: &str) {
        let len = op.chars().count();
        if self.opt.pad_oper {
            self.ensure_space_before();
        }
        let start = self.formatted.len();
        self.append_str(op);
        self.char_num += len - 1;
        if self.opt.pad_oper {
            self.formatted.push(' ');
            self.suppress_ws = true;
        }
        if op == "&&" || op == "||" {
            self.split
                .note_logical(start, self.formatted.len(), self.opt.break_after_logical);
        }
    }

    /// Colons wear many hats: case labels, ternaries, labels, access
    /// modifiers, class inheritance, Objective-C message selectors.
    fn handle_colon(&mut self) {
        if self.in_case {
            self.handle_case_colon();
            return;
        }
        if self.question_depth > 0 {
            self.question_depth -= 1;
            self.pad_binary_operator(":");
            return;
        }
        if self.square_brackets > 0 && self.opt.pad_method_colon != MethodColonPad::NoChange {
            self.pad_method_colon();
            return;
        }
        self.append(':');
    }

    fn pad_method_colon(&mut self) {
        match self.opt.pad_method_colon {
            MethodColonPad::All => {
                self.ensure_space_before();
                self.append(':');
                self.formatted.push(' ');
                self.suppress_ws = true;
            }
            MethodColonPad::Before => {
                self.ensure_space_before();
                self.append(':');
                self.suppress_ws = true;
            }
            MethodColonPad::After => {
                self.strip_trailing_ws();
                self.append(':');
                self.formatted.push(' ');
                self.suppress_ws = true;
            }
            MethodColonPad::None => {
                self.strip_trailing_ws();
                self.append(':');
                self.suppress_ws = true;
            }
            MethodColonPad::NoChange => self.append(':'),
        }
    }

    fn is_unary_context(&self) -> bool {
        if self.formatted.iter().all(|c| is_whitespace(*c)) {
            return true;
        }
        if self.post_return || self.in_case || self.post_header {
            return true;
        }
        matches!(
            self.prev_non_ws,
            '=' | '+'
                | '-'
                | '*'
                | '/'
                | '%'
                | '<'
                | '>'
                | '|'
                | '&'
                | '^'
                | '!'
                | '~'
                | '?'
                | ':'
                | ','
                | '('
                | '['
                | '{'
                | ';'
        )
    }

    /// `1.5e-3` style exponents keep their sign attached.
    fn is_in_exponent(&self) -> bool {
        let n = self.formatted.len();
        if n < 2 {
            return false;
        }
        let last = self.formatted[n - 1];
        let before = self.formatted[n - 2];
        matches!(last, 'e' | 'E') && (before.is_ascii_digit() || before == '.')
    }

    /// Heuristic: is this `*`/`&` a pointer or reference glyph in a
    /// declaration rather than an arithmetic operator?
    pub(crate) fn is_pointer_or_reference(&self) -> bool {
        if self.in_potential_calculation || self.in_header || self.post_header {
            return false;
        }
        if !(is_legal_name_char(self.prev_non_ws) || self.prev_non_ws == '*') {
            return false;
        }
        // skip over the glyph run and whitespace to the following token
        let mut j = self.char_num;
        while j < self.line.len() && matches!(self.line[j], '*' | '&') {
            j += 1;
        }
        while j < self.line.len() && is_whitespace(self.line[j]) {
            j += 1;
        }
        let next = self.line.get(j).copied().unwrap_or(' ');
        is_legal_name_char(next) || matches!(next, ')' | ',' | ';' | '(' | '>' | '=')
    }

    /// Move the pointer/reference glyph per the alignment options.
    pub(crate) fn format_pointer_or_reference(&mut self, glyph: char) {
        let align = if glyph == '*' {
            self.opt.pointer_align
        } else {
            self.opt.reference_alignment()
        };
        self.in_statement = true;
        let next = self.peek_next_visible();
        match align {
            PointerAlign::None => {
                self.append(glyph);
            }
            PointerAlign::Type => {
                self.strip_trailing_ws();
                self.append(glyph);
                if is_legal_name_char(next) {
                    self.formatted.push(' ');
                }
                self.suppress_ws = true;
            }
            PointerAlign::Middle => {
                self.strip_trailing_ws();
                self.formatted.push(' ');
                self.append(glyph);
                if is_legal_name_char(next) {
                    self.formatted.push(' ');
                }
                self.suppress_ws = true;
            }
            PointerAlign::Name => {
                if self.prev_non_ws != glyph {
                    self.ensure_space_before();
                }
                self.append(glyph);
                self.suppress_ws = true;
            }
        }
    }

    // --- parenthesis padding ------------------------------------------------

    pub(crate) fn pad_before_open_paren(&mut self) {
        let pad_out =
            self.opt.pad_paren_out || (self.opt.pad_first_paren_out && self.paren_depth == 0);
        if pad_out {
            if is_legal_name_char(self.prev_non_ws) || self.prev_non_ws == ')' {
                self.ensure_space_before();
            }
        } else if self.opt.unpad_paren
            && matches!(self.formatted.last(), Some(' '))
            && is_legal_name_char(self.prev_non_ws)
            && !self.last_word_is_keyword()
        {
            self.strip_trailing_ws();
        }
    }

    pub(crate) fn pad_after_open_paren(&mut self) {
        if self.opt.pad_paren_in {
            if self.peek_next_visible() != ')' {
                self.formatted.push(' ');
                self.suppress_ws = true;
            }
        } else if self.opt.unpad_paren {
            self.suppress_ws = true;
        }
    }

    pub(crate) fn pad_before_close_paren(&mut self) {
        if self.opt.pad_paren_in {
            if self.prev_non_ws != '(' {
                self.ensure_space_before();
            }
        } else if self.opt.unpad_paren {
            self.strip_trailing_ws();
        }
    }

    pub(crate) fn pad_after_close_paren(&mut self) {
        if self.opt.pad_paren_out && is_legal_name_char(self.peek_next_visible()) {
            self.formatted.push(' ');
            self.suppress_ws = true;
        }
    }

    fn last_word_is_keyword(&self) -> bool {
        let word = self.last_word.as_str();
        HEADERS.iter().any(|h| *h == word)
            || matches!(word, "return" | "sizeof" | "throw")
    }

    // --- templates ----------------------------------------------------------

    /// Decide whether a `<` opens template arguments by scanning for a
    /// matching `>` with no statement chars in between.
    pub(crate) fn check_template_opener(&self) -> bool {
        if !is_legal_name_char(self.prev_non_ws) {
            return false;
        }
        let mut depth = 0usize;
        let mut j = self.char_num;
        while j < self.line.len() {
            let c = self.line[j];
            match c {
                '<' => depth += 1,
                '>' => {
                    depth -= 1;
                    if depth == 0 {
                        return true;
                    }
                }
                ';' | '{' | '}' | '(' | ')' => return false,
                '&' | '|' if self.line.get(j + 1) == Some(&c) => return false,
                _ => {}
            }
            j += 1;
        }
        false
    }

    fn handle_template_close(&mut self, op: &str) {
        if op == ">>" && self.template_depth >= 2 {
            self.template_depth -= 2;
            self.append_str(">>");
            self.char_num += 1;
            return;
        }
        self.template_depth -= 1;
        self.append('>');
        if self.opt.close_templates && self.template_depth > 0 && self.peek_next_visible() == '>' {
            // `> >` collapses to `>>`
            self.suppress_ws = true;
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::config::{Options, PartialOptions};
    use crate::format::formatter::Formatter;

    fn format(source: &str, partial: PartialOptions) -> String {
        let options = Options::resolve(&partial);
        let mut formatter = Formatter::from_source(&options, source);
        let mut lines = Vec::new();
        while formatter.has_more_lines() {
            lines.push(formatter.next_line());
        }
        lines.join("\n")
    }

    #[test]
    fn test_assignment_padding() {
        let out = format("x+=2;", PartialOptions {
            pad_oper: Some(true),
            ..Default::default()
        });
        assert_eq!(out, "x += 2;");
    }

    #[test]
    fn test_unary_minus_not_padded() {
        let out = format("x = -y;", PartialOptions {
            pad_oper: Some(true),
            ..Default::default()
        });
        assert_eq!(out, "x = -y;");
    }

    #[test]
    fn test_increment_not_padded() {
        let out = format("i++;", PartialOptions {
            pad_oper: Some(true),
            ..Default::default()
        });
        assert_eq!(out, "i++;");
    }

    #[test]
    fn test_exponent_sign_kept() {
        let out = format("x = 1.5e-3;", PartialOptions {
            pad_oper: Some(true),
            ..Default::default()
        });
        assert_eq!(out, "x = 1.5e-3;");
    }

    #[test]
    fn test_arrow_not_padded() {
        let out = format("p->x = 1;", PartialOptions {
            pad_oper: Some(true),
            ..Default::default()
        });
        assert_eq!(out, "p->x = 1;");
    }

    #[test]
    fn test_scope_resolution_not_padded() {
        let out = format("a::b();", PartialOptions {
            pad_oper: Some(true),
            ..Default::default()
        });
        assert_eq!(out, "a::b();");
    }

    #[test]
    fn test_longest_match_shift_assign() {
        let out = format("x>>=2;", PartialOptions {
            pad_oper: Some(true),
            ..Default::default()
        });
        assert_eq!(out, "x >>= 2;");
    }

    #[test]
    fn test_ternary_padding() {
        let out = format("x=a?b:c;", PartialOptions {
            pad_oper: Some(true),
            ..Default::default()
        });
        assert_eq!(out, "x = a ? b : c;");
    }

    #[test]
    fn test_template_args_not_padded() {
        let out = format("vector<int> v;", PartialOptions {
            pad_oper: Some(true),
            ..Default::default()
        });
        assert_eq!(out, "vector<int> v;");
    }

    #[test]
    fn test_comparison_still_padded() {
        let out = format("if (a<b) x();", PartialOptions {
            pad_oper: Some(true),
            keep_one_line_statements: Some(true),
            ..Default::default()
        });
        assert_eq!(out, "if (a < b) x();");
    }

    #[test]
    fn test_reference_follows_pointer_alignment() {
        let out = format("int &r = x;", PartialOptions {
            pointer_align: Some(crate::config::PointerAlign::Type),
            ..Default::default()
        });
        assert_eq!(out, "int& r = x;");
    }

    #[test]
    fn test_pointer_in_cast() {
        let out = format("p = (int*)q;", PartialOptions {
            pointer_align: Some(crate::config::PointerAlign::Type),
            ..Default::default()
        });
        assert_eq!(out, "p = (int*)q;");
    }

    #[test]
    fn test_address_of_not_aligned() {
        let out = format("foo(&x);", PartialOptions {
            pointer_align: Some(crate::config::PointerAlign::Type),
            ..Default::default()
        });
        assert_eq!(out, "foo(&x);");
    }

    #[test]
    fn test_double_pointer() {
        let out = format("char **argv;", PartialOptions {
            pointer_align: Some(crate::config::PointerAlign::Type),
            ..Default::default()
        });
        assert_eq!(out, "char** argv;");
    }

    #[test]
    fn test_pad_header_space() {
        let out = format("while(x) y();", PartialOptions {
            keep_one_line_statements: Some(true),
            ..Default::default()
        });
        assert_eq!(out, "while (x) y();");
    }

    #[test]
    fn test_close_templates() {
        let out = format("vector<vector<int> > v;", PartialOptions {
            close_templates: Some(true),
            ..Default::default()
        });
        assert_eq!(out, "vector<vector<int>> v;");
    }
}
