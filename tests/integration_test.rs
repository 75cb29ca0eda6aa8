//! Integration tests for cstyler
//!
//! These tests exercise the full pipeline through the library entry point:
//! option text in, formatted text out.

#![warn(clippy::all)]
#![warn(clippy::pedantic)]

use cstyler::format_source;

/// Sum of the code points of all non-whitespace characters, the integrity
/// measure the formatter maintains between input and output.
fn content_checksum(text: &str) -> u64 {
    text.chars()
        .filter(|c| !matches!(c, ' ' | '\t' | '\n' | '\r'))
        .map(|c| u64::from(c as u32))
        .sum()
}

#[test]
fn test_allman_brace_break_scenario() {
    let out = format_source("if(x){y;}", "--style=allman").unwrap();
    assert_eq!(out, "if (x)\n{\n    y;\n}");
}

#[test]
fn test_attach_classes_scenario() {
    let out = format_source("class A\n{\n};", "--attach-classes").unwrap();
    assert_eq!(out, "class A {\n};");
}

#[test]
fn test_operator_padding_scenario() {
    let out = format_source("a=b+c;", "--pad-oper").unwrap();
    assert_eq!(out, "a = b + c;");
}

#[test]
fn test_pointer_alignment_scenario() {
    assert_eq!(
        format_source("int *p;", "--align-pointer=type").unwrap(),
        "int* p;"
    );
    assert_eq!(
        format_source("int* p;", "--align-pointer=name").unwrap(),
        "int *p;"
    );
    assert_eq!(
        format_source("int *p;", "--align-pointer=middle").unwrap(),
        "int * p;"
    );
}

#[test]
fn test_switch_case_indent_scenario() {
    let out = format_source(
        "switch(x){\ncase 1:\nfoo();\nbreak;\n}",
        "--indent-switches --style=allman",
    )
    .unwrap();
    assert_eq!(
        out,
        "switch (x)\n{\n    case 1:\n        foo();\n        break;\n}"
    );
}

#[test]
fn test_line_end_normalization_scenario() {
    let out = format_source("int a;\r\nint b;\nint c;\r\n", "--lineend=linux").unwrap();
    assert!(!out.contains('\r'));
    assert_eq!(out.matches('\n').count(), 3);
}

#[test]
fn test_checksum_preserved_across_option_matrix() {
    let source = "\
int main(int argc, char **argv)\n\
{\n\
    int total = 0;\n\
    for (int i = 0; i < argc; i++) {\n\
        if (argv[i][0] == '-')\n\
            total += 1;\n\
        else {\n\
            total -= 1;\n\
        }\n\
    }\n\
    switch (total) {\n\
    case 0:\n\
        return 0;\n\
    default:\n\
        break;\n\
    }\n\
    return total;\n\
}\n";
    let option_sets = [
        "",
        "--style=allman",
        "--style=java",
        "--style=kr",
        "--style=whitesmith",
        "--style=gnu",
        "--style=horstmann",
        "--pad-oper",
        "--pad-paren",
        "--unpad-paren",
        "--style=allman --pad-oper --indent-switches",
        "--keep-one-line-blocks --keep-one-line-statements",
        "--align-pointer=type --align-reference=name",
        "--indent=spaces=2",
        "--indent=tab",
        "--convert-tabs",
        "--lineend=windows",
    ];
    let expected = content_checksum(source);
    for options in option_sets {
        let out = format_source(source, options)
            .unwrap_or_else(|e| panic!("options {options:?} failed: {e}"));
        assert_eq!(
            content_checksum(&out),
            expected,
            "checksum broken by options {options:?}\n--- output ---\n{out}"
        );
    }
}

#[test]
fn test_idempotence_across_option_matrix() {
    let source = "\
void report(const char *name, int value)\n\
{\n\
    if (value > 0) {\n\
        printf(\"%s=%d\", name, value);\n\
    } else if (value < 0) {\n\
        abort();\n\
    }\n\
    while (value--)\n\
        tick();\n\
}\n";
    let option_sets = [
        "--style=allman",
        "--style=java --pad-oper",
        "--style=linux",
        "--pad-paren --pad-oper",
        "--align-pointer=type",
        "--indent=tab --style=allman",
    ];
    for options in option_sets {
        let once = format_source(source, options).unwrap();
        let twice = format_source(&once, options).unwrap();
        assert_eq!(once, twice, "not idempotent under {options:?}");
    }
}

#[test]
fn test_line_count_preserved_with_keep_options() {
    let source = "\
int f(int x) {\n\
    if (x) { return 1; }\n\
    int a = 1; int b = 2;\n\
    return a + b;\n\
}\n";
    let out = format_source(source, "--keep-one-line-blocks --keep-one-line-statements").unwrap();
    assert_eq!(
        out.matches('\n').count(),
        source.matches('\n').count(),
        "line count changed:\n{out}"
    );
}

#[test]
fn test_option_errors_reported_together() {
    let err = format_source("int x;", "--wrong-one --style=allman --wrong-two").unwrap_err();
    let message = err.to_string();
    assert!(message.contains("wrong-one"));
    assert!(message.contains("wrong-two"));
}

#[test]
fn test_out_of_range_option_is_an_error() {
    assert!(format_source("int x;", "--indent=spaces=1").is_err());
    assert!(format_source("int x;", "--max-code-length=30").is_err());
    assert!(format_source("int x;", "-m9").is_err());
}

#[test]
fn test_unterminated_comment_is_tolerated() {
    let out = format_source("int x;\n/* unterminated\nint y;\n", "").unwrap();
    assert!(out.contains("unterminated"));
    assert!(out.contains("int y;"));
}

#[test]
fn test_unbalanced_braces_are_tolerated() {
    let out = format_source("}\n}\nint x;\n{\n", "--style=allman").unwrap();
    assert!(out.contains("int x;"));
}

#[test]
fn test_preprocessor_conditional_restores_indent_context() {
    let source = "\
void f()\n\
{\n\
#ifdef FAST\n\
    if (a) {\n\
#else\n\
    if (b) {\n\
#endif\n\
        work();\n\
    }\n\
}\n";
    let out = format_source(source, "--style=java").unwrap();
    let lines: Vec<&str> = out.lines().collect();
    assert_eq!(lines[0], "void f() {");
    assert_eq!(lines[1], "#ifdef FAST");
    assert_eq!(lines[2], "    if (a) {");
    assert_eq!(lines[4], "    if (b) {");
    assert_eq!(lines[6], "        work();");
}

#[test]
fn test_indent_preproc_cond_option() {
    let source = "void f()\n{\n#ifdef A\nx();\n#endif\n}\n";
    let plain = format_source(source, "--style=allman").unwrap();
    assert_eq!(plain, "void f()\n{\n#ifdef A\n    x();\n#endif\n}\n");

    let indented = format_source(source, "--style=allman --indent-preproc-cond").unwrap();
    assert_eq!(indented, "void f()\n{\n    #ifdef A\n    x();\n    #endif\n}\n");
}

#[test]
fn test_do_while_loop() {
    let out = format_source("do{x();}while(y);", "--style=java").unwrap();
    assert_eq!(out, "do {\n    x();\n} while (y);");
}

#[test]
fn test_else_if_chain() {
    let out = format_source("if(a)x();else if(b)y();else z();", "--style=allman").unwrap();
    assert_eq!(out, "if (a) x();\nelse if (b) y();\nelse z();");
}

#[test]
fn test_nested_blocks_full_program() {
    let source = "int main(){if(a){while(b){poll();}}return 0;}";
    let out = format_source(source, "--style=allman").unwrap();
    assert_eq!(
        out,
        "int main()\n{\n    if (a)\n    {\n        while (b)\n        {\n            poll();\n        }\n    }\n    return 0;\n}"
    );
}

#[test]
fn test_add_brackets_option() {
    let out = format_source("if (x)\n    y;\n", "--style=java --add-brackets").unwrap();
    assert_eq!(out, "if (x) {\n    y;\n}\n");
}

#[test]
fn test_one_tbs_style_adds_braces_and_attaches() {
    let out = format_source("if (x)\ny;\nelse\nz;\n", "--style=1tbs").unwrap();
    assert_eq!(out, "if (x) {\n    y;\n} else {\n    z;\n}\n");
}

#[test]
fn test_remove_brackets_option() {
    let out = format_source("if (x) { y(); }", "--style=allman --remove-brackets").unwrap();
    assert_eq!(out, "if (x)\n    y();");
}

#[test]
fn test_comments_keep_their_shape() {
    let source = "/*\n * first\n * second\n */\nint x; // trailing\n";
    let out = format_source(source, "--style=allman").unwrap();
    assert!(out.contains(" * first"));
    assert!(out.contains(" * second"));
    assert!(out.contains("int x; // trailing"));
}

#[test]
fn test_remove_comment_prefix() {
    let source = "/* start\n * middle\n */\n";
    let out = format_source(source, "--remove-comment-prefix").unwrap();
    assert!(out.contains("    middle"));
    assert!(!out.contains("* middle"));
}

#[test]
fn test_fill_and_delete_empty_lines() {
    let source = "void f()\n{\nx;\n\ny;\n}\n";
    let deleted = format_source(source, "--delete-empty-lines").unwrap();
    assert!(!deleted.contains("\n\n"));

    let filled = format_source(source, "--fill-empty-lines").unwrap();
    assert!(filled.contains("\n    \n"));
}

#[test]
fn test_max_code_length_splits_long_lines() {
    let arg = "argument".repeat(5);
    let source = format!("result = combine({arg}, {arg}, {arg});\n");
    let out = format_source(&source, "--max-code-length=60").unwrap();
    assert!(out.lines().count() > 2);
    assert_eq!(content_checksum(&out), content_checksum(&source));
}

#[test]
fn test_break_blocks_inserts_empty_line() {
    let out = format_source("x();\nif (y)\nz();\n", "--break-blocks").unwrap();
    assert_eq!(out, "x();\n\nif (y)\n    z();\n");
}

#[test]
fn test_mode_c_accepted() {
    let out = format_source("int x;", "--mode=c").unwrap();
    assert_eq!(out, "int x;");
}

#[test]
fn test_options_separated_by_commas_and_comments() {
    let out = format_source(
        "if(x){y;}",
        "# project defaults\nstyle=allman,indent-switches\n",
    )
    .unwrap();
    assert!(out.starts_with("if (x)"));
}
