use sourceview_core::{LanguageConfig, SearchMatch, SourceConfig, SourceError, SourceSession};

fn session(text: &str) -> SourceSession {
    SourceSession::new(text, LanguageConfig::plain_text(), SourceConfig::default())
}

#[test]
fn test_search_forward_and_backward_wrap() {
    let mut s = session("foo bar foo");
    assert_eq!(s.search_highlight("foo", true, false).unwrap(), 2);

    assert_eq!(s.search_forward(), Some(SearchMatch { start: 0, end: 3 }));
    assert_eq!(s.buffer().selection_bounds(), (0, 3));
    assert_eq!(s.search_forward(), Some(SearchMatch { start: 8, end: 11 }));
    assert_eq!(s.search_forward(), Some(SearchMatch { start: 0, end: 3 }));
    assert_eq!(s.search_backward(), Some(SearchMatch { start: 8, end: 11 }));
}

#[test]
fn test_case_insensitive_count() {
    let mut s = session("Foo FOO foo");
    assert_eq!(s.search_highlight("foo", false, false).unwrap(), 3);
    assert_eq!(s.search_highlight("foo", true, false).unwrap(), 1);
    assert_eq!(s.search_highlight("zzz", true, false).unwrap(), 0);
    assert_eq!(s.search_forward(), None);
}

#[test]
fn test_empty_search_clears() {
    let mut s = session("abc");
    s.search_highlight("b", true, false).unwrap();
    assert!(s.search().is_some());
    assert_eq!(s.search_highlight("", true, false).unwrap(), 0);
    assert!(s.search().is_none());
    assert_eq!(s.search_forward(), None);
}

#[test]
fn test_invalid_regex_is_reported() {
    let mut s = session("abc");
    let err = s.search_highlight("a(", true, true).unwrap_err();
    assert!(matches!(err, SourceError::InvalidSearchPattern { .. }));
}

#[test]
fn test_replace_forward_selects_replacement() {
    let mut s = session("foo bar foo");
    s.search_highlight("foo", true, false).unwrap();
    s.buffer_mut().select_range(11, 8);

    assert_eq!(s.replace_forward("bazz"), Some(SearchMatch { start: 8, end: 12 }));
    assert_eq!(s.text(), "foo bar bazz");
    assert_eq!(s.buffer().selection_bounds(), (8, 12));

    assert_eq!(s.replace_forward("bazz"), Some(SearchMatch { start: 0, end: 4 }));
    assert_eq!(s.text(), "bazz bar bazz");
    assert_eq!(s.replace_forward("bazz"), None);
}

#[test]
fn test_replace_backward() {
    let mut s = session("a1 a2 a3");
    s.search_highlight("a", true, false).unwrap();
    s.buffer_mut().place_cursor(5);
    assert_eq!(s.replace_backward("b"), Some(SearchMatch { start: 3, end: 4 }));
    assert_eq!(s.text(), "a1 b2 a3");
}

#[test]
fn test_regex_replace_all_is_one_undo_step() {
    let mut s = session("x=1, y=2");
    s.search_highlight(r"(\w)=(\d)", true, true).unwrap();
    assert_eq!(s.replace_all("$2=$1"), 2);
    assert_eq!(s.text(), "1=x, 2=y");

    assert!(s.buffer_mut().undo());
    assert_eq!(s.text(), "x=1, y=2");
    assert!(!s.buffer().can_undo());
}

#[test]
fn test_replace_all_without_matches() {
    let mut s = session("abc");
    assert_eq!(s.replace_all("x"), 0);
    s.search_highlight("z", true, false).unwrap();
    assert_eq!(s.replace_all("x"), 0);
    assert!(!s.buffer().can_undo());
}
