use criterion::{BatchSize, Criterion, black_box, criterion_group, criterion_main};
use sourceview_core::tab_style::infer_tab_style;
use sourceview_core::{Key, LanguageConfig, Modifiers, SourceConfig, SourceSession, TextBuffer};

fn large_source(function_count: usize) -> String {
    let mut out = String::with_capacity(function_count * 160);
    for i in 0..function_count {
        out.push_str(&format!(
            "int f{i}(int a, int b) {{\n    if (a > b) {{\n        return g(a,\n                 b);\n    }}\n    /* {{ */ return '{{';\n}}\n\n"
        ));
    }
    out
}

fn cpp() -> LanguageConfig {
    LanguageConfig::from_id(Some("cpp"))
}

fn bench_tab_inference(c: &mut Criterion) {
    let buffer = TextBuffer::new(&large_source(10_000));
    let language = cpp();
    c.bench_function("tab_inference/10k_functions", |b| {
        b.iter(|| black_box(infer_tab_style(black_box(&buffer), &language)))
    });
}

fn bench_enter_deep_in_file(c: &mut Criterion) {
    let text = large_source(10_000);
    let cursor = text.len() / 2;
    let cursor = text[..cursor].rfind(";\n").map_or(0, |byte| byte + 1);
    c.bench_function("enter/middle_of_large_file", |b| {
        b.iter_batched(
            || {
                let mut session = SourceSession::new(&text, cpp(), SourceConfig::default());
                session.buffer_mut().place_cursor(cursor);
                session
            },
            |mut session| {
                session.press_key(Key::Enter, Modifiers::empty());
                black_box(session.buffer().cursor());
            },
            BatchSize::LargeInput,
        )
    });
}

fn bench_reindent(c: &mut Criterion) {
    let text = large_source(2_000).replace("    ", "");
    c.bench_function("reindent/2k_functions", |b| {
        b.iter_batched(
            || SourceSession::new(&text, cpp(), SourceConfig::default()),
            |mut session| black_box(session.reindent_buffer()),
            BatchSize::LargeInput,
        )
    });
}

criterion_group!(
    benches,
    bench_tab_inference,
    bench_enter_deep_in_file,
    bench_reindent
);
criterion_main!(benches);
