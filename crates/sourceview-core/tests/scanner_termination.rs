use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use sourceview_core::scanner::{
    find_enclosing_statement_start, find_matching_close_brace, find_matching_open_brace,
    find_open_expression_symbol, ScanState,
};
use sourceview_core::{Key, LanguageConfig, Modifiers, NoContext, SourceConfig, SourceSession, TextBuffer};

const ALPHABET: &[char] = &[
    '{', '}', '(', ')', '[', ']', '\'', '"', '\\', '\n', ' ', ' ', '\t', 'a', 'b', ';', ':', '#',
];

fn random_text(rng: &mut StdRng, len: usize) -> String {
    (0..len)
        .map(|_| ALPHABET[rng.gen_range(0..ALPHABET.len())])
        .collect()
}

#[test]
fn test_scans_stay_in_bounds() {
    let mut rng = StdRng::seed_from_u64(0x5eed);
    for _ in 0..200 {
        let len = rng.gen_range(0..80);
        let text = random_text(&mut rng, len);
        let buffer = TextBuffer::new(&text);
        for offset in 0..=buffer.len_chars() {
            let from = buffer.iter_at_offset(offset);
            let start = find_enclosing_statement_start(from, ' ', &NoContext);
            assert!(start <= from, "{text:?} @ {offset}");

            // Nesting from the start line up to `from` is closed, unless the scan hit buffer start.
            let line_start = buffer.line_start(start.line());
            let mut state = ScanState::default();
            for at in (line_start..=offset).rev() {
                state.observe_backward(&buffer.iter_at_offset(at), &NoContext);
            }
            assert!(
                state.is_closed() || line_start == 0,
                "{text:?} @ {offset}: {state:?}"
            );

            if let Some(open) = find_open_expression_symbol(from, start, &NoContext) {
                assert!(open >= start && open < from);
                assert!(matches!(open.char(), '(' | '['));
            }
            match from.char() {
                '{' => {
                    if let Some(close) = find_matching_close_brace(from, &NoContext) {
                        assert!(close > from);
                        assert_eq!(close.char(), '}');
                    }
                }
                '}' => {
                    if let Some(open) = find_matching_open_brace(from, &NoContext) {
                        assert!(open < from);
                        assert_eq!(open.char(), '{');
                    }
                }
                _ => {}
            }
        }
    }
}

#[test]
fn test_random_enter_is_undoable() {
    let mut rng = StdRng::seed_from_u64(42);
    let config = SourceConfig {
        auto_tab_char_and_size: false,
        ..SourceConfig::default()
    };
    for _ in 0..300 {
        let len = rng.gen_range(1..60);
        let text = random_text(&mut rng, len);
        let mut session = SourceSession::new(&text, LanguageConfig::from_id(Some("cpp")), config.clone());
        let cursor = rng.gen_range(0..=session.buffer().len_chars());
        session.buffer_mut().place_cursor(cursor);

        let before = session.text();
        session.press_key(Key::Enter, Modifiers::empty());
        let after = session.text();
        let added = after.matches('\n').count() - before.matches('\n').count();
        assert!((1..=2).contains(&added), "{before:?} @ {cursor} -> {after:?}");
        assert!(session.buffer().cursor() <= session.buffer().len_chars());

        assert!(session.buffer_mut().undo());
        assert_eq!(session.text(), before);
    }
}
