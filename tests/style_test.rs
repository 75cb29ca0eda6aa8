//! Per-style brace and indent fixtures.
//!
//! Each test feeds the same small constructs through one predefined style
//! and checks the exact output shape.

#![warn(clippy::all)]
#![warn(clippy::pedantic)]

use cstyler::format_source;

#[test]
fn test_style_allman() {
    let out = format_source("void f() {\nif (x) {\ny;\n}\n}\n", "--style=allman").unwrap();
    assert_eq!(out, "void f()\n{\n    if (x)\n    {\n        y;\n    }\n}\n");
}

#[test]
fn test_style_java() {
    let out = format_source("void f()\n{\nif (x)\n{\ny;\n}\n}\n", "--style=java").unwrap();
    assert_eq!(out, "void f() {\n    if (x) {\n        y;\n    }\n}\n");
}

#[test]
fn test_style_kr_breaks_functions_only() {
    let out = format_source("void f() {\nif (x) {\ny;\n}\n}\n", "--style=kr").unwrap();
    assert_eq!(out, "void f()\n{\n    if (x) {\n        y;\n    }\n}\n");
}

#[test]
fn test_style_stroustrup_attaches_classes() {
    let out = format_source(
        "class A\n{\npublic:\nvoid f()\n{\nx;\n}\n};\n",
        "--style=stroustrup",
    )
    .unwrap();
    assert_eq!(
        out,
        "class A {\npublic:\n    void f()\n    {\n        x;\n    }\n};\n"
    );
}

#[test]
fn test_style_whitesmith() {
    let out = format_source("if (x)\n{\ny;\n}\n", "--style=whitesmith").unwrap();
    assert_eq!(out, "if (x)\n    {\n    y;\n    }\n");
}

#[test]
fn test_style_banner() {
    let out = format_source("if (x) {\ny;\n}\n", "--style=banner").unwrap();
    assert_eq!(out, "if (x) {\n    y;\n    }\n");
}

#[test]
fn test_style_gnu() {
    let out = format_source(
        "void f()\n{\nif (x)\n{\ny;\n}\n}\n",
        "--style=gnu --indent=spaces=2",
    )
    .unwrap();
    assert_eq!(out, "void f()\n{\n  if (x)\n    {\n      y;\n    }\n}\n");
}

#[test]
fn test_style_linux_minconditional() {
    let out = format_source("void f() {\nwhile (x) {\ny;\n}\n}\n", "--style=linux").unwrap();
    assert_eq!(out, "void f()\n{\n    while (x) {\n        y;\n    }\n}\n");
}

#[test]
fn test_style_horstmann_run_in() {
    let out = format_source("if (x)\n{\ny;\nz;\n}\n", "--style=horstmann").unwrap();
    assert_eq!(out, "if (x)\n{   y;\n    z;\n}\n");
}

#[test]
fn test_style_pico_keeps_one_liners() {
    let out = format_source("if (x) { y; }", "--style=pico").unwrap();
    assert_eq!(out, "if (x) { y; }");
}

#[test]
fn test_style_lisp_keeps_statements() {
    let out = format_source("a; b;\n", "--style=lisp").unwrap();
    assert_eq!(out, "a; b;\n");
}

#[test]
fn test_style_google_attaches() {
    let out = format_source("if (x)\n{\ny;\n}\n", "--style=google").unwrap();
    assert_eq!(out, "if (x) {\n    y;\n}\n");
}

#[test]
fn test_break_closing_brackets() {
    let out = format_source(
        "if (x) {\ny;\n} else {\nz;\n}\n",
        "--style=java --break-closing-brackets",
    )
    .unwrap();
    assert_eq!(out, "if (x) {\n    y;\n}\nelse {\n    z;\n}\n");
}

#[test]
fn test_break_elseifs() {
    let out = format_source(
        "if (a) x();\nelse if (b) y();\n",
        "--style=allman --break-elseifs",
    )
    .unwrap();
    assert_eq!(out, "if (a) x();\nelse\n    if (b) y();\n");
}

#[test]
fn test_force_tab_indentation() {
    let out = format_source("if (x)\n{\ny;\n}\n", "--style=allman --indent=force-tab").unwrap();
    assert_eq!(out, "if (x)\n{\n\ty;\n}\n");
}

#[test]
fn test_indent_namespaces_option() {
    let out = format_source(
        "namespace n\n{\nint x;\n}\n",
        "--style=allman --indent-namespaces",
    )
    .unwrap();
    assert_eq!(out, "namespace n\n{\n    int x;\n}\n");
}

#[test]
fn test_attach_namespaces_option() {
    let out = format_source("namespace n\n{\nint x;\n}\n", "--attach-namespaces").unwrap();
    assert_eq!(out, "namespace n {\nint x;\n}\n");
}

#[test]
fn test_indent_classes_option() {
    let out = format_source(
        "class A\n{\npublic:\nint x;\n};\n",
        "--style=allman --indent-classes",
    )
    .unwrap();
    assert_eq!(out, "class A\n{\n    public:\n        int x;\n};\n");
}

#[test]
fn test_indent_labels_option() {
    // the label sits in a nested block so the option has a column to move
    let source = "void f()\n{\nif (x)\n{\nout:\ny();\n}\n}\n";
    let plain = format_source(source, "--style=allman").unwrap();
    assert_eq!(
        plain,
        "void f()\n{\n    if (x)\n    {\nout:\n        y();\n    }\n}\n"
    );

    let indented = format_source(source, "--style=allman --indent-labels").unwrap();
    assert_eq!(
        indented,
        "void f()\n{\n    if (x)\n    {\n    out:\n        y();\n    }\n}\n"
    );
}

#[test]
fn test_case_blocks_follow_indent_cases() {
    let source = "switch (x)\n{\ncase 1:\n{\nfoo();\n}\nbreak;\n}\n";
    let plain = format_source(source, "--style=allman").unwrap();
    assert_eq!(
        plain,
        "switch (x)\n{\ncase 1:\n{\n    foo();\n}\n    break;\n}\n"
    );

    let indented = format_source(source, "--style=allman --indent-cases").unwrap();
    assert_eq!(
        indented,
        "switch (x)\n{\ncase 1:\n    {\n        foo();\n    }\n    break;\n}\n"
    );
}
