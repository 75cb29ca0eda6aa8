//! Lexical layer shared by the formatter and the beautifier.
//!
//! Contains the character/keyword predicates, the precomputed keyword and
//! operator tables, and the source line iterator.

pub mod chars;
pub mod stream;
pub mod tables;

pub use chars::{
    find_keyword, get_current_word, is_char_potential_header, is_char_potential_operator,
    is_digit, is_legal_name_char, is_whitespace, peek_next_char, peek_next_char_from,
    starts_with_at,
};
pub use stream::{LineReader, SourceLines};
pub use tables::{
    find_header, find_operator, ASSIGNMENT_OPERATORS, CAST_OPERATORS, HEADERS,
    INDENTABLE_HEADERS, NON_ASSIGNMENT_OPERATORS, NON_PAREN_HEADERS, OPERATORS,
    PRE_BLOCK_STATEMENTS, PRE_COMMAND_HEADERS, PRE_DEFINITION_HEADERS,
};
