//! Option text parser.
//!
//! Parses the classic option syntax used by options files and the library
//! entry point: options are separated by spaces, tabs, commas or new-lines;
//! `#` begins a line comment; long options are `--name` or `--name=value`
//! (the leading dashes are optional); short options are single letters, some
//! with a numeric parameter, and may be concatenated (`-Cps4` is `-C -p -s4`).
//! A concatenation breaks before any alphabetic character not preceded by
//! `x`, so `-xj` is one option.
//!
//! All unrecognized options are collected and reported together; nothing is
//! formatted when any option is in error.

use anyhow::bail;

use crate::config::{
    BraceMode, FormatStyle, IndentStyle, LineEnding, MethodColonPad, MinConditional,
    PartialOptions, PointerAlign, ReferenceAlign,
};
use crate::error::Result;

/// Parse option text into a partial option set.
///
/// Returns an error naming every unrecognized or out-of-range option.
pub fn parse_option_text(text: &str) -> Result<PartialOptions> {
    let tokens = split_options(text);
    let mut partial = PartialOptions::default();
    let mut errors: Vec<String> = Vec::new();

    for token in &tokens {
        if let Some(long) = token.strip_prefix("--") {
            parse_option(long, &mut partial, &mut errors);
        } else if let Some(shorts) = token.strip_prefix('-') {
            // split concatenated short options; the break is suppressed
            // after an 'x' so that "xj" stays one option
            let chars: Vec<char> = shorts.chars().collect();
            let mut sub = String::new();
            for (i, &ch) in chars.iter().enumerate() {
                if i > 0 && ch.is_ascii_alphabetic() && chars[i - 1] != 'x' {
                    parse_option(&sub, &mut partial, &mut errors);
                    sub.clear();
                }
                sub.push(ch);
            }
            parse_option(&sub, &mut partial, &mut errors);
        } else {
            parse_option(token, &mut partial, &mut errors);
        }
    }

    if !errors.is_empty() {
        bail!("invalid option(s): {}", errors.join(", "));
    }
    Ok(partial)
}

/// Split option text on whitespace, commas and line ends; `#` starts a
/// comment running to the end of the line.
fn split_options(text: &str) -> Vec<String> {
    let mut tokens = Vec::new();
    let mut current = String::new();
    let mut in_comment = false;
    for ch in text.chars() {
        if in_comment {
            if ch == '\n' || ch == '\r' {
                in_comment = false;
            }
            continue;
        }
        match ch {
            '#' => {
                in_comment = true;
                if !current.is_empty() {
                    tokens.push(std::mem::take(&mut current));
                }
            }
            ' ' | '\t' | ',' | '\n' | '\r' => {
                if !current.is_empty() {
                    tokens.push(std::mem::take(&mut current));
                }
            }
            _ => current.push(ch),
        }
    }
    if !current.is_empty() {
        tokens.push(current);
    }
    tokens
}

fn is_option(arg: &str, op: &str) -> bool {
    arg == op
}

fn is_option2(arg: &str, op1: &str, op2: &str) -> bool {
    arg == op1 || arg == op2
}

/// True when `arg` begins with `prefix`; a one-letter prefix additionally
/// requires the next character to be a digit (so `s4` is a parameter option
/// but `style=...` never matches `s`).
fn is_param_option(arg: &str, prefix: &str) -> bool {
    if !arg.starts_with(prefix) {
        return false;
    }
    if prefix.len() == 1 && arg.len() > 1 {
        return arg.as_bytes()[1].is_ascii_digit();
    }
    true
}

fn is_param_option2(arg: &str, prefix1: &str, prefix2: &str) -> bool {
    is_param_option(arg, prefix1) || is_param_option(arg, prefix2)
}

fn get_param<'a>(arg: &'a str, prefix: &str) -> &'a str {
    &arg[prefix.len()..]
}

fn get_param2<'a>(arg: &'a str, prefix1: &str, prefix2: &str) -> &'a str {
    if is_param_option(arg, prefix1) {
        get_param(arg, prefix1)
    } else {
        get_param(arg, prefix2)
    }
}

/// Parse a numeric parameter with a default for the empty string.
fn num_param(param: &str, default: usize) -> Option<usize> {
    if param.is_empty() {
        Some(default)
    } else {
        param.parse().ok()
    }
}

fn parse_option(arg: &str, partial: &mut PartialOptions, errors: &mut Vec<String>) {
    let mut error = |arg: &str| errors.push(arg.to_string());

    if is_option2(arg, "style=allman", "style=ansi")
        || is_option2(arg, "style=bsd", "style=break")
    {
        partial.style = Some(FormatStyle::Allman);
    } else if is_option2(arg, "style=java", "style=attach") {
        partial.style = Some(FormatStyle::Java);
    } else if is_option2(arg, "style=k&r", "style=kr") || is_option(arg, "style=k/r") {
        partial.style = Some(FormatStyle::KAndR);
    } else if is_option(arg, "style=stroustrup") {
        partial.style = Some(FormatStyle::Stroustrup);
    } else if is_option(arg, "style=whitesmith") {
        partial.style = Some(FormatStyle::Whitesmith);
    } else if is_option(arg, "style=banner") {
        partial.style = Some(FormatStyle::Banner);
    } else if is_option(arg, "style=gnu") {
        partial.style = Some(FormatStyle::Gnu);
    } else if is_option2(arg, "style=linux", "style=knf") {
        partial.style = Some(FormatStyle::Linux);
    } else if is_option(arg, "style=horstmann") {
        partial.style = Some(FormatStyle::Horstmann);
    } else if is_option2(arg, "style=1tbs", "style=otbs") {
        partial.style = Some(FormatStyle::OneTbs);
    } else if is_option(arg, "style=google") {
        partial.style = Some(FormatStyle::Google);
    } else if is_option(arg, "style=pico") {
        partial.style = Some(FormatStyle::Pico);
    } else if is_option2(arg, "style=lisp", "style=python") {
        partial.style = Some(FormatStyle::Lisp);
    } else if is_param_option(arg, "A") {
        match get_param(arg, "A").parse::<u32>() {
            Ok(1) => partial.style = Some(FormatStyle::Allman),
            Ok(2) => partial.style = Some(FormatStyle::Java),
            Ok(3) => partial.style = Some(FormatStyle::KAndR),
            Ok(4) => partial.style = Some(FormatStyle::Stroustrup),
            Ok(5) => partial.style = Some(FormatStyle::Whitesmith),
            Ok(6) => partial.style = Some(FormatStyle::Banner),
            Ok(7) => partial.style = Some(FormatStyle::Gnu),
            Ok(8) => partial.style = Some(FormatStyle::Linux),
            Ok(9) => partial.style = Some(FormatStyle::Horstmann),
            Ok(10) => partial.style = Some(FormatStyle::OneTbs),
            Ok(11) => partial.style = Some(FormatStyle::Pico),
            Ok(12) => partial.style = Some(FormatStyle::Lisp),
            Ok(14) => partial.style = Some(FormatStyle::Google),
            _ => error(arg),
        }
    } else if is_option(arg, "mode=c") {
        // C-family is the only mode; accepted for compatibility
    } else if is_param_option2(arg, "t", "indent=tab=") {
        match num_param(get_param2(arg, "t", "indent=tab="), 4) {
            Some(n) if (2..=20).contains(&n) => {
                partial.indent_style = Some(IndentStyle::Tab);
                partial.indent_length = Some(n);
            }
            _ => error(arg),
        }
    } else if is_option(arg, "indent=tab") {
        partial.indent_style = Some(IndentStyle::Tab);
        partial.indent_length = Some(4);
    } else if is_param_option2(arg, "xT", "indent=force-tab-x=") {
        match num_param(get_param2(arg, "xT", "indent=force-tab-x="), 8) {
            Some(n) if (2..=20).contains(&n) => {
                partial.indent_style = Some(IndentStyle::ForceTabX);
                partial.tab_length = Some(n);
            }
            _ => error(arg),
        }
    } else if is_option(arg, "indent=force-tab-x") {
        partial.indent_style = Some(IndentStyle::ForceTabX);
        partial.tab_length = Some(8);
    } else if is_param_option2(arg, "T", "indent=force-tab=") {
        match num_param(get_param2(arg, "T", "indent=force-tab="), 4) {
            Some(n) if (2..=20).contains(&n) => {
                partial.indent_style = Some(IndentStyle::ForceTab);
                partial.indent_length = Some(n);
            }
            _ => error(arg),
        }
    } else if is_option(arg, "indent=force-tab") {
        partial.indent_style = Some(IndentStyle::ForceTab);
        partial.indent_length = Some(4);
    } else if is_param_option2(arg, "s", "indent=spaces=") {
        match num_param(get_param2(arg, "s", "indent=spaces="), 4) {
            Some(n) if (2..=20).contains(&n) => {
                partial.indent_style = Some(IndentStyle::Spaces);
                partial.indent_length = Some(n);
            }
            _ => error(arg),
        }
    } else if is_option(arg, "indent=spaces") {
        partial.indent_style = Some(IndentStyle::Spaces);
        partial.indent_length = Some(4);
    } else if is_param_option2(arg, "m", "min-conditional-indent=") {
        match num_param(get_param2(arg, "m", "min-conditional-indent="), 2) {
            Some(0) => partial.min_conditional_option = Some(MinConditional::Zero),
            Some(1) => partial.min_conditional_option = Some(MinConditional::One),
            Some(2) => partial.min_conditional_option = Some(MinConditional::Two),
            Some(3) => partial.min_conditional_option = Some(MinConditional::OneHalf),
            _ => error(arg),
        }
    } else if is_param_option2(arg, "M", "max-instatement-indent=") {
        match num_param(get_param2(arg, "M", "max-instatement-indent="), 40) {
            Some(n) if (40..=120).contains(&n) => partial.max_in_statement_indent = Some(n),
            _ => error(arg),
        }
    } else if is_option2(arg, "N", "indent-namespaces") {
        partial.indent_namespaces = Some(true);
    } else if is_option2(arg, "C", "indent-classes") {
        partial.indent_classes = Some(true);
    } else if is_option2(arg, "xG", "indent-modifiers") {
        partial.indent_modifiers = Some(true);
    } else if is_option2(arg, "S", "indent-switches") {
        partial.indent_switches = Some(true);
    } else if is_option2(arg, "K", "indent-cases") {
        partial.indent_cases = Some(true);
    } else if is_option2(arg, "L", "indent-labels") {
        partial.indent_labels = Some(true);
    } else if is_option2(arg, "w", "indent-preproc-define") {
        partial.indent_preproc_define = Some(true);
    } else if is_option2(arg, "xw", "indent-preproc-cond") {
        partial.indent_preproc_cond = Some(true);
    } else if is_option2(arg, "y", "break-closing-brackets") {
        partial.break_closing_braces = Some(true);
    } else if is_option2(arg, "O", "keep-one-line-blocks") {
        partial.keep_one_line_blocks = Some(true);
    } else if is_option2(arg, "o", "keep-one-line-statements") {
        partial.keep_one_line_statements = Some(true);
    } else if is_option2(arg, "P", "pad-paren") {
        partial.pad_paren_out = Some(true);
        partial.pad_paren_in = Some(true);
    } else if is_option2(arg, "d", "pad-paren-out") {
        partial.pad_paren_out = Some(true);
    } else if is_option2(arg, "xd", "pad-first-paren-out") {
        partial.pad_first_paren_out = Some(true);
    } else if is_option2(arg, "D", "pad-paren-in") {
        partial.pad_paren_in = Some(true);
    } else if is_option2(arg, "H", "pad-header") {
        partial.pad_header = Some(true);
    } else if is_option2(arg, "U", "unpad-paren") {
        partial.unpad_paren = Some(true);
    } else if is_option2(arg, "p", "pad-oper") {
        partial.pad_oper = Some(true);
    } else if is_option2(arg, "xe", "delete-empty-lines") {
        partial.delete_empty_lines = Some(true);
    } else if is_option2(arg, "E", "fill-empty-lines") {
        partial.fill_empty_lines = Some(true);
    } else if is_option2(arg, "c", "convert-tabs") {
        partial.convert_tabs = Some(true);
    } else if is_option2(arg, "xy", "close-templates") {
        partial.close_templates = Some(true);
    } else if is_option2(arg, "F", "break-blocks=all") {
        partial.break_blocks = Some(true);
        partial.break_closing_blocks = Some(true);
    } else if is_option2(arg, "f", "break-blocks") {
        partial.break_blocks = Some(true);
    } else if is_option2(arg, "e", "break-elseifs") {
        partial.break_elseifs = Some(true);
    } else if is_option2(arg, "j", "add-brackets") {
        partial.add_braces = Some(true);
    } else if is_option2(arg, "J", "add-one-line-brackets") {
        partial.add_one_line_braces = Some(true);
    } else if is_option2(arg, "xj", "remove-brackets") {
        partial.remove_braces = Some(true);
    } else if is_option2(arg, "Y", "indent-col1-comments") {
        partial.indent_col1_comments = Some(true);
    } else if is_option(arg, "align-pointer=none") {
        partial.pointer_align = Some(PointerAlign::None);
    } else if is_option(arg, "align-pointer=type") {
        partial.pointer_align = Some(PointerAlign::Type);
    } else if is_option(arg, "align-pointer=middle") {
        partial.pointer_align = Some(PointerAlign::Middle);
    } else if is_option(arg, "align-pointer=name") {
        partial.pointer_align = Some(PointerAlign::Name);
    } else if is_param_option(arg, "k") {
        match get_param(arg, "k").parse::<u32>() {
            Ok(1) => partial.pointer_align = Some(PointerAlign::Type),
            Ok(2) => partial.pointer_align = Some(PointerAlign::Middle),
            Ok(3) => partial.pointer_align = Some(PointerAlign::Name),
            _ => error(arg),
        }
    } else if is_option(arg, "align-reference=none") {
        partial.reference_align = Some(ReferenceAlign::None);
    } else if is_option(arg, "align-reference=type") {
        partial.reference_align = Some(ReferenceAlign::Type);
    } else if is_option(arg, "align-reference=middle") {
        partial.reference_align = Some(ReferenceAlign::Middle);
    } else if is_option(arg, "align-reference=name") {
        partial.reference_align = Some(ReferenceAlign::Name);
    } else if is_param_option(arg, "W") {
        match get_param(arg, "W").parse::<u32>() {
            Ok(0) => partial.reference_align = Some(ReferenceAlign::None),
            Ok(1) => partial.reference_align = Some(ReferenceAlign::Type),
            Ok(2) => partial.reference_align = Some(ReferenceAlign::Middle),
            Ok(3) => partial.reference_align = Some(ReferenceAlign::Name),
            _ => error(arg),
        }
    } else if is_param_option(arg, "max-code-length=") {
        match num_param(get_param(arg, "max-code-length="), 50) {
            Some(n) if (50..=200).contains(&n) => partial.max_code_length = Some(n),
            _ => error(arg),
        }
    } else if is_param_option(arg, "xC") {
        match num_param(get_param(arg, "xC"), 50) {
            Some(n) if (50..=200).contains(&n) => partial.max_code_length = Some(n),
            _ => error(arg),
        }
    } else if is_option2(arg, "xL", "break-after-logical") {
        partial.break_after_logical = Some(true);
    } else if is_option2(arg, "xc", "attach-classes") {
        partial.attach_classes = Some(true);
    } else if is_option2(arg, "xk", "attach-extern-c") {
        partial.attach_extern_c = Some(true);
    } else if is_option2(arg, "xn", "attach-namespaces") {
        partial.attach_namespaces = Some(true);
    } else if is_option2(arg, "xl", "attach-inlines") {
        partial.attach_inlines = Some(true);
    } else if is_option2(arg, "xp", "remove-comment-prefix") {
        partial.strip_comment_prefix = Some(true);
    } else if is_option2(arg, "xM", "align-method-colon") {
        partial.align_method_colon = Some(true);
    } else if is_option2(arg, "xQ", "pad-method-prefix") {
        partial.pad_method_prefix = Some(true);
    } else if is_option2(arg, "xR", "unpad-method-prefix") {
        partial.unpad_method_prefix = Some(true);
    } else if is_option2(arg, "xP0", "pad-method-colon=none") {
        partial.pad_method_colon = Some(MethodColonPad::None);
    } else if is_option2(arg, "xP1", "pad-method-colon=all") {
        partial.pad_method_colon = Some(MethodColonPad::All);
    } else if is_option2(arg, "xP2", "pad-method-colon=after") {
        partial.pad_method_colon = Some(MethodColonPad::After);
    } else if is_option2(arg, "xP3", "pad-method-colon=before") {
        partial.pad_method_colon = Some(MethodColonPad::Before);
    } else if is_option(arg, "indent-preprocessor") {
        // deprecated alias
        partial.indent_preproc_define = Some(true);
    } else if is_option(arg, "lineend=windows") {
        partial.line_end = Some(LineEnding::Crlf);
    } else if is_option(arg, "lineend=linux") {
        partial.line_end = Some(LineEnding::Lf);
    } else if is_option(arg, "lineend=macold") {
        partial.line_end = Some(LineEnding::Cr);
    } else if is_param_option(arg, "z") {
        match get_param(arg, "z").parse::<u32>() {
            Ok(1) => partial.line_end = Some(LineEnding::Crlf),
            Ok(2) => partial.line_end = Some(LineEnding::Lf),
            Ok(3) => partial.line_end = Some(LineEnding::Cr),
            _ => error(arg),
        }
    } else if is_option(arg, "brackets=none") {
        partial.brace_mode = Some(BraceMode::None);
    } else {
        error(arg);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Options;

    #[test]
    fn test_style_long_option() {
        let partial = parse_option_text("--style=allman").unwrap();
        assert_eq!(partial.style, Some(FormatStyle::Allman));
    }

    #[test]
    fn test_style_aliases() {
        for text in ["--style=ansi", "--style=bsd", "--style=break", "style=allman"] {
            let partial = parse_option_text(text).unwrap();
            assert_eq!(partial.style, Some(FormatStyle::Allman), "{text}");
        }
        let partial = parse_option_text("--style=k&r").unwrap();
        assert_eq!(partial.style, Some(FormatStyle::KAndR));
    }

    #[test]
    fn test_numbered_style() {
        let partial = parse_option_text("-A1").unwrap();
        assert_eq!(partial.style, Some(FormatStyle::Allman));
        let partial = parse_option_text("-A14").unwrap();
        assert_eq!(partial.style, Some(FormatStyle::Google));
        assert!(parse_option_text("-A13").is_err());
    }

    #[test]
    fn test_concatenated_short_options() {
        let partial = parse_option_text("-Cps4").unwrap();
        assert_eq!(partial.indent_classes, Some(true));
        assert_eq!(partial.pad_oper, Some(true));
        assert_eq!(partial.indent_style, Some(IndentStyle::Spaces));
        assert_eq!(partial.indent_length, Some(4));
    }

    #[test]
    fn test_x_prefixed_short_is_one_option() {
        // -xj is remove-brackets, not -x -j
        let partial = parse_option_text("-xj").unwrap();
        assert_eq!(partial.remove_braces, Some(true));
        let partial = parse_option_text("-Oxj").unwrap();
        assert_eq!(partial.keep_one_line_blocks, Some(true));
        assert_eq!(partial.remove_braces, Some(true));
    }

    #[test]
    fn test_xd_binds_to_pad_first_paren_out() {
        let partial = parse_option_text("-xd").unwrap();
        assert_eq!(partial.pad_first_paren_out, Some(true));
        assert_eq!(partial.delete_empty_lines, None);
        let partial = parse_option_text("-xe").unwrap();
        assert_eq!(partial.delete_empty_lines, Some(true));
    }

    #[test]
    fn test_separators_and_comments() {
        let partial = parse_option_text("pad-oper,\tindent-switches\n# a comment\npad-paren-in")
            .unwrap();
        assert_eq!(partial.pad_oper, Some(true));
        assert_eq!(partial.indent_switches, Some(true));
        assert_eq!(partial.pad_paren_in, Some(true));
    }

    #[test]
    fn test_indent_spaces_with_param() {
        let partial = parse_option_text("--indent=spaces=2").unwrap();
        assert_eq!(partial.indent_length, Some(2));
        assert!(parse_option_text("--indent=spaces=1").is_err());
        assert!(parse_option_text("--indent=spaces=21").is_err());
    }

    #[test]
    fn test_force_tab_x() {
        let partial = parse_option_text("-xT6").unwrap();
        assert_eq!(partial.indent_style, Some(IndentStyle::ForceTabX));
        assert_eq!(partial.tab_length, Some(6));
    }

    #[test]
    fn test_max_code_length_bounds() {
        let partial = parse_option_text("--max-code-length=80").unwrap();
        assert_eq!(partial.max_code_length, Some(80));
        assert!(parse_option_text("--max-code-length=49").is_err());
        assert!(parse_option_text("--max-code-length=201").is_err());
    }

    #[test]
    fn test_pointer_and_reference_alignment() {
        let partial = parse_option_text("--align-pointer=type --align-reference=name").unwrap();
        assert_eq!(partial.pointer_align, Some(PointerAlign::Type));
        assert_eq!(partial.reference_align, Some(ReferenceAlign::Name));
        let partial = parse_option_text("-k3 -W2").unwrap();
        assert_eq!(partial.pointer_align, Some(PointerAlign::Name));
        assert_eq!(partial.reference_align, Some(ReferenceAlign::Middle));
    }

    #[test]
    fn test_all_errors_collected() {
        let err = parse_option_text("--bogus --style=allman --nope").unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("bogus"));
        assert!(msg.contains("nope"));
    }

    #[test]
    fn test_lineend() {
        let partial = parse_option_text("--lineend=linux").unwrap();
        assert_eq!(partial.line_end, Some(LineEnding::Lf));
        let partial = parse_option_text("-z1").unwrap();
        assert_eq!(partial.line_end, Some(LineEnding::Crlf));
    }

    #[test]
    fn test_resolves_into_options() {
        let partial = parse_option_text("--style=allman --indent-switches -p").unwrap();
        let options = Options::resolve(&partial);
        assert_eq!(options.brace_mode, BraceMode::Break);
        assert!(options.indent_switches);
        assert!(options.pad_oper);
    }
}
