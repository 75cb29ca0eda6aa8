//! Keyword and operator tables.
//!
//! All tables are built once at first access using `LazyLock`. Tables
//! searched by longest-prefix match (`find_operator`) are sorted by length
//! descending; tables searched by word comparison are sorted by name.
//! Duplicates are forbidden and checked by tests.

use std::sync::LazyLock;

use super::chars::{find_keyword, is_char_potential_operator, starts_with_at};

// Keywords
pub const IF: &str = "if";
pub const ELSE: &str = "else";
pub const FOR: &str = "for";
pub const DO: &str = "do";
pub const WHILE: &str = "while";
pub const SWITCH: &str = "switch";
pub const CASE: &str = "case";
pub const DEFAULT: &str = "default";
pub const TRY: &str = "try";
pub const CATCH: &str = "catch";
pub const SEH_TRY: &str = "__try";
pub const SEH_FINALLY: &str = "__finally";
pub const SEH_EXCEPT: &str = "__except";
pub const CLASS: &str = "class";
pub const STRUCT: &str = "struct";
pub const UNION: &str = "union";
pub const INTERFACE: &str = "interface";
pub const NAMESPACE: &str = "namespace";
pub const EXTERN: &str = "extern";
pub const ENUM: &str = "enum";
pub const TEMPLATE: &str = "template";
pub const RETURN: &str = "return";
pub const OPERATOR: &str = "operator";
pub const CONST: &str = "const";
pub const VOLATILE: &str = "volatile";
pub const SEALED: &str = "sealed";
pub const OVERRIDE: &str = "override";
pub const PUBLIC: &str = "public";
pub const PROTECTED: &str = "protected";
pub const PRIVATE: &str = "private";
pub const ASM: &str = "asm";
pub const GNU_ASM: &str = "__asm__";
pub const MS_ASM: &str = "_asm";
pub const MS_ASM2: &str = "__asm";

/// Control-flow keywords that may introduce a block.
pub static HEADERS: LazyLock<Vec<&'static str>> = LazyLock::new(|| {
    let mut v = vec![
        IF,
        ELSE,
        FOR,
        WHILE,
        DO,
        SWITCH,
        CASE,
        DEFAULT,
        TRY,
        CATCH,
        SEH_TRY,     // __try
        SEH_FINALLY, // __finally
        SEH_EXCEPT,  // __except
    ];
    v.sort_unstable();
    v
});

/// Headers that are not (necessarily) followed by a paren block.
pub static NON_PAREN_HEADERS: LazyLock<Vec<&'static str>> = LazyLock::new(|| {
    let mut v = vec![
        ELSE,
        DO,
        TRY,
        CATCH, // can be paren or non-paren
        CASE,  // can be paren or non-paren
        DEFAULT,
        SEH_TRY,
        SEH_FINALLY,
    ];
    v.sort_unstable();
    v
});

/// Keywords that precede a `{` but are not control-flow headers.
pub static PRE_BLOCK_STATEMENTS: LazyLock<Vec<&'static str>> = LazyLock::new(|| {
    let mut v = vec![CLASS, STRUCT, UNION, INTERFACE, NAMESPACE];
    v.sort_unstable();
    v
});

/// Qualifiers between a function signature's `)` and its `{`.
pub static PRE_COMMAND_HEADERS: LazyLock<Vec<&'static str>> = LazyLock::new(|| {
    let mut v = vec![CONST, VOLATILE, SEALED, OVERRIDE];
    v.sort_unstable();
    v
});

/// Keywords that open a definition brace.
pub static PRE_DEFINITION_HEADERS: LazyLock<Vec<&'static str>> = LazyLock::new(|| {
    let mut v = vec![CLASS, STRUCT, UNION, INTERFACE, NAMESPACE];
    v.sort_unstable();
    v
});

/// Headers whose argument may be indented as a continuation (`return`).
pub static INDENTABLE_HEADERS: LazyLock<Vec<&'static str>> = LazyLock::new(|| {
    let mut v = vec![RETURN];
    v.sort_unstable();
    v
});

/// Assignment operators, longest first.
pub static ASSIGNMENT_OPERATORS: LazyLock<Vec<&'static str>> = LazyLock::new(|| {
    let mut v = vec![
        "=", "+=", "-=", "*=", "/=", "%=", "|=", "&=", "^=", ">>>=", ">>=", "<<<=", "<<=",
    ];
    v.sort_unstable_by(|a, b| b.len().cmp(&a.len()).then(a.cmp(b)));
    v
});

/// Non-assignment operators, longest first.
pub static NON_ASSIGNMENT_OPERATORS: LazyLock<Vec<&'static str>> = LazyLock::new(|| {
    let mut v = vec![
        "==", "++", "--", "!=", ">=", ">>>", ">>", "<=", "<<<", "<<", "->", "&&", "||", "=>",
    ];
    v.sort_unstable_by(|a, b| b.len().cmp(&a.len()).then(a.cmp(b)));
    v
});

/// The full operator table used by the formatter, longest first so that
/// `find_operator` always recognizes the longest match.
pub static OPERATORS: LazyLock<Vec<&'static str>> = LazyLock::new(|| {
    let mut v = vec![
        "+=", "-=", "*=", "/=", "%=", "|=", "&=", "^=", "==", "++", "--", "!=", ">=", ">>>=",
        ">>=", ">>>", ">>", "<=", "<<<=", "<<=", "<<<", "<<", "??", "=>", "->", "&&", "||", "::",
        "+", "-", "*", "/", "%", "?", ":", "=", "<", ">", "!", "|", "&", "~", "^", "<?", ">?",
    ];
    v.sort_unstable_by(|a, b| b.len().cmp(&a.len()).then(a.cmp(b)));
    v
});

/// C++ cast keywords.
pub static CAST_OPERATORS: LazyLock<Vec<&'static str>> = LazyLock::new(|| {
    let mut v = vec![
        "const_cast",
        "dynamic_cast",
        "reinterpret_cast",
        "static_cast",
    ];
    v.sort_unstable();
    v
});

/// Find a header keyword from `table` at position `i`, or None.
///
/// The position must be a potential header start; word boundaries are
/// enforced by [`find_keyword`].
#[must_use]
pub fn find_header(line: &[char], i: usize, table: &[&'static str]) -> Option<&'static str> {
    table.iter().find(|kw| find_keyword(line, i, kw)).copied()
}

/// Find the longest operator from `table` matching at position `i`.
///
/// `table` must be sorted longest-first; the first match wins.
#[must_use]
pub fn find_operator(line: &[char], i: usize, table: &[&'static str]) -> Option<&'static str> {
    if !is_char_potential_operator(line[i]) {
        return None;
    }
    table
        .iter()
        .find(|op| starts_with_at(line, i, op))
        .copied()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chars(s: &str) -> Vec<char> {
        s.chars().collect()
    }

    fn assert_no_duplicates(table: &[&'static str], name: &str) {
        for (i, a) in table.iter().enumerate() {
            for b in &table[i + 1..] {
                assert_ne!(a, b, "duplicate {a:?} in {name}");
            }
        }
    }

    #[test]
    fn test_tables_have_no_duplicates() {
        assert_no_duplicates(&HEADERS, "HEADERS");
        assert_no_duplicates(&NON_PAREN_HEADERS, "NON_PAREN_HEADERS");
        assert_no_duplicates(&PRE_BLOCK_STATEMENTS, "PRE_BLOCK_STATEMENTS");
        assert_no_duplicates(&PRE_COMMAND_HEADERS, "PRE_COMMAND_HEADERS");
        assert_no_duplicates(&PRE_DEFINITION_HEADERS, "PRE_DEFINITION_HEADERS");
        assert_no_duplicates(&ASSIGNMENT_OPERATORS, "ASSIGNMENT_OPERATORS");
        assert_no_duplicates(&NON_ASSIGNMENT_OPERATORS, "NON_ASSIGNMENT_OPERATORS");
        assert_no_duplicates(&OPERATORS, "OPERATORS");
        assert_no_duplicates(&CAST_OPERATORS, "CAST_OPERATORS");
    }

    #[test]
    fn test_operators_sorted_by_length_desc() {
        for w in OPERATORS.windows(2) {
            assert!(w[0].len() >= w[1].len(), "{:?} before {:?}", w[0], w[1]);
        }
        for w in ASSIGNMENT_OPERATORS.windows(2) {
            assert!(w[0].len() >= w[1].len());
        }
    }

    #[test]
    fn test_headers_include_seh() {
        assert!(HEADERS.contains(&"__try"));
        assert!(HEADERS.contains(&"__finally"));
        assert!(HEADERS.contains(&"__except"));
    }

    #[test]
    fn test_find_header() {
        let line = chars("if (x)");
        assert_eq!(find_header(&line, 0, &HEADERS), Some("if"));
        let line = chars("ifdef");
        assert_eq!(find_header(&line, 0, &HEADERS), None);
        let line = chars("__finally {");
        assert_eq!(find_header(&line, 0, &HEADERS), Some("__finally"));
    }

    #[test]
    fn test_find_operator_longest_match() {
        let line = chars("a >>= b");
        assert_eq!(find_operator(&line, 2, &OPERATORS), Some(">>="));
        let line = chars("a >> b");
        assert_eq!(find_operator(&line, 2, &OPERATORS), Some(">>"));
        let line = chars("a > b");
        assert_eq!(find_operator(&line, 2, &OPERATORS), Some(">"));
        let line = chars("a <<<= b");
        assert_eq!(find_operator(&line, 2, &OPERATORS), Some("<<<="));
    }

    #[test]
    fn test_find_operator_rejects_non_operator_chars() {
        let line = chars("a ( b");
        assert_eq!(find_operator(&line, 2, &OPERATORS), None);
        let line = chars("a ; b");
        assert_eq!(find_operator(&line, 2, &OPERATORS), None);
    }

    #[test]
    fn test_every_operator_prefix_resolves_to_longest() {
        // For any operator in the table, matching at position 0 of that
        // operator's text must return the operator itself or a longer one.
        for op in OPERATORS.iter() {
            let line = chars(&format!("{op} x"));
            let found = find_operator(&line, 0, &OPERATORS).expect("operator should match");
            assert!(found.len() >= op.len(), "{op:?} resolved to {found:?}");
        }
    }
}
