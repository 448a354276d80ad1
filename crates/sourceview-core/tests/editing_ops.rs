use pretty_assertions::assert_eq;
use sourceview_core::{
    CommentToggle, IndentUnit, LanguageConfig, PasteMode, SourceConfig, SourceSession,
};

fn session(language: Option<&str>, text: &str) -> SourceSession {
    let config = SourceConfig {
        auto_tab_char_and_size: false,
        default_tab_size: 4,
        ..SourceConfig::default()
    };
    SourceSession::new(text, LanguageConfig::from_id(language), config)
}

fn select_all(session: &mut SourceSession) {
    let len = session.buffer().len_chars();
    session.buffer_mut().select_range(len, 0);
}

#[test]
fn test_toggle_comments_mixed_selection_round_trips() {
    let original = "// foo\nbar();";
    let mut s = session(Some("cpp"), original);
    select_all(&mut s);

    assert_eq!(s.toggle_comments(), CommentToggle::Commented(2));
    assert_eq!(s.text(), "// // foo\n// bar();");

    select_all(&mut s);
    assert_eq!(s.toggle_comments(), CommentToggle::Uncommented(2));
    assert_eq!(s.text(), original);
}

#[test]
fn test_toggle_comments_is_one_undo_step() {
    let mut s = session(Some("python"), "a = 1\n  b = 2\n");
    select_all(&mut s);
    assert_eq!(s.toggle_comments(), CommentToggle::Commented(2));
    assert_eq!(s.text(), "# a = 1\n#   b = 2\n");
    assert!(s.buffer_mut().undo());
    assert_eq!(s.text(), "a = 1\n  b = 2\n");
    assert!(!s.buffer().can_undo());
}

#[test]
fn test_toggle_comments_without_prefix() {
    let mut s = session(None, "plain");
    assert_eq!(s.toggle_comments(), CommentToggle::Unchanged);
    assert_eq!(s.text(), "plain");
}

#[test]
fn test_toggle_comments_cursor_line_only() {
    let mut s = session(Some("lua"), "a\nb\nc");
    s.buffer_mut().place_cursor(2);
    s.toggle_comments();
    assert_eq!(s.text(), "a\n-- b\nc");
}

#[test]
fn test_smart_paste_onto_indented_line() {
    let mut s = session(Some("cpp"), "{\n    \n}");
    s.buffer_mut().place_cursor(6);
    assert_eq!(s.paste("a();\n    b();\n"), PasteMode::Reindented);
    assert_eq!(s.text(), "{\n    a();\n    b();\n}");

    assert!(s.buffer_mut().undo());
    assert_eq!(s.text(), "{\n    \n}");
}

#[test]
fn test_paste_mid_line_is_verbatim() {
    let mut s = session(Some("cpp"), "ab");
    s.buffer_mut().place_cursor(1);
    assert_eq!(s.paste("x\r\n  y"), PasteMode::Verbatim);
    assert_eq!(s.text(), "ax\n  yb");
}

#[test]
fn test_reindent_buffer() {
    let mut s = session(Some("cpp"), "void f() {\nif (x)\ny();\nz();\n  }\n");
    assert_eq!(s.reindent_buffer(), 4);
    assert_eq!(s.text(), "void f() {\n    if (x)\n        y();\n    z();\n}\n");

    assert!(s.buffer_mut().undo());
    assert_eq!(s.text(), "void f() {\nif (x)\ny();\nz();\n  }\n");
}

#[test]
fn test_reindent_keeps_continuations_and_directives() {
    let text = "int f() {\n#if X\nreturn g(1,\n         2);\n}";
    let mut s = session(Some("c"), text);
    s.reindent_buffer();
    assert_eq!(s.text(), "int f() {\n#if X\n    return g(1,\n         2);\n}");
}

#[test]
fn test_reindent_skips_other_languages() {
    let mut s = session(Some("python"), "if x:\ny\n");
    assert_eq!(s.reindent_buffer(), 0);
    assert_eq!(s.text(), "if x:\ny\n");
}

#[test]
fn test_cleanup_and_save() {
    let config = SourceConfig {
        cleanup_whitespace_characters: true,
        ..SourceConfig::default()
    };
    let mut s = SourceSession::new("a  \r\nb\t", LanguageConfig::plain_text(), config);
    assert_eq!(s.prepare_for_save(), "a\r\nb\r\n");
    assert_eq!(s.text(), "a\nb\n");
}

#[test]
fn test_reapply_tab_style() {
    let mut s = session(Some("cpp"), "");
    assert_eq!(s.indent_unit(), IndentUnit::spaces(4));
    assert_eq!(s.reapply_tab_style(), None);

    s.buffer_mut().insert(0, "f() {\n\tg();\n}\n");
    assert_eq!(s.reapply_tab_style(), Some(IndentUnit::tab()));
    assert_eq!(s.indent_unit(), IndentUnit::tab());
}
