//! Long-line splitting for max-code-length.
//!
//! While the formatter appends to the current line it records candidate
//! split positions. When the line exceeds the limit, the best candidate is
//! chosen by priority: the last `;` (a for statement), the last `&&`/`||`,
//! the last comma, the last `(`, the last whitespace.

use crate::format::formatter::{EmittedKind, Formatter};
use crate::lexer::chars::is_whitespace;

/// Candidate split positions within the formatted line, as indices where
/// the continuation line would start.
#[derive(Debug, Default)]
pub(crate) struct SplitPoints {
    semi: Option<usize>,
    logical: Option<usize>,
    comma: Option<usize>,
    paren: Option<usize>,
    ws: Option<usize>,
}

impl SplitPoints {
    pub fn clear(&mut self) {
        *self = SplitPoints::default();
    }

    /// A `;` inside parens, split after it.
    pub fn note_semicolon(&mut self, after: usize) {
        self.semi = Some(after);
    }

    pub fn note_comma(&mut self, after: usize) {
        self.comma = Some(after);
    }

    pub fn note_paren(&mut self, after: usize) {
        self.paren = Some(after);
    }

    pub fn note_whitespace(&mut self, after: usize) {
        self.ws = Some(after);
    }

    /// `&&`/`||` splits before the operator, or after it with
    /// break-after-logical.
    pub fn note_logical(&mut self, before: usize, after: usize, break_after: bool) {
        self.logical = Some(if break_after { after } else { before });
    }

    fn best(&self) -> Option<usize> {
        self.semi
            .or(self.logical)
            .or(self.comma)
            .or(self.paren)
            .or(self.ws)
    }
}

impl Formatter {
    /// Split the formatted line when it exceeds max-code-length.
    pub(crate) fn maybe_split_line(&mut self) {
        let Some(max) = self.opt.max_code_length else {
            return;
        };
        if self.formatted.len() <= max {
            return;
        }
        if self.in_comment || self.in_line_comment || self.in_quote || self.one_line_depth > 0 {
            return;
        }
        let Some(point) = self.split.best() else {
            return;
        };
        if point == 0 || point >= self.formatted.len() {
            return;
        }
        let head: String = self.formatted[..point]
            .iter()
            .collect::<String>()
            .trim_end()
            .to_string();
        if head.is_empty() {
            return;
        }
        let tail: Vec<char> = self.formatted[point..]
            .iter()
            .copied()
            .skip_while(|c| is_whitespace(*c))
            .collect();
        self.formatted = tail;
        self.split.clear();
        self.emit(&head, EmittedKind::Code);
    }
}

#[cfg(test)]
mod tests {
    use crate::config::{Options, PartialOptions};
    use crate::format::formatter::Formatter;

    fn format(source: &str, partial: PartialOptions) -> Vec<String> {
        let options = Options::resolve(&partial);
        let mut formatter = Formatter::from_source(&options, source);
        let mut lines = Vec::new();
        while formatter.has_more_lines() {
            lines.push(formatter.next_line());
        }
        assert_eq!(formatter.checksum_diff(), 0);
        lines
    }

    #[test]
    fn test_long_call_splits_at_comma() {
        let arg = "a".repeat(30);
        let source = format!("foo({arg}, {arg}, {arg});");
        let out = format(
            &source,
            PartialOptions {
                max_code_length: Some(50),
                ..Default::default()
            },
        );
        assert!(out.len() > 1, "expected a split, got {out:?}");
        assert!(out[0].trim_end().ends_with(','));
    }

    #[test]
    fn test_logical_operator_starts_next_line() {
        let cond = "value_".to_string() + &"x".repeat(28);
        let source = format!("ok = {cond} && {cond};");
        let out = format(
            &source,
            PartialOptions {
                max_code_length: Some(50),
                ..Default::default()
            },
        );
        assert!(out.len() > 1);
        assert!(out[1].trim_start().starts_with("&&"), "got {out:?}");
    }

    #[test]
    fn test_break_after_logical() {
        let cond = "value_".to_string() + &"x".repeat(28);
        let source = format!("ok = {cond} && {cond};");
        let out = format(
            &source,
            PartialOptions {
                max_code_length: Some(50),
                break_after_logical: Some(true),
                ..Default::default()
            },
        );
        assert!(out.len() > 1);
        assert!(out[0].trim_end().ends_with("&&"), "got {out:?}");
    }

    #[test]
    fn test_short_lines_untouched() {
        let out = format(
            "x = y + z;",
            PartialOptions {
                max_code_length: Some(50),
                ..Default::default()
            },
        );
        assert_eq!(out, vec!["x = y + z;"]);
    }
}
