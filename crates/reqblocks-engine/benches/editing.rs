use criterion::{Criterion, criterion_group, criterion_main};
use reqblocks_engine::{Cmd, Dictionary, Editor, MonospaceLayout};
mod common;

fn bench_editor_commands(c: &mut Criterion) {
    let mut group = c.benchmark_group("editing");
    group.sample_size(10);

    let content = common::generate_plain_words(2000, 12);
    let editor = Editor::from_text(&content, Dictionary::ears());

    group.bench_function("type_word", |b| {
        let mut e = editor.clone();
        b.iter(|| {
            e.apply(Cmd::Input {
                text: std::hint::black_box("shall".to_string()),
            });
            let patch = e.apply(Cmd::Space);
            std::hint::black_box(patch);
        });
    });

    group.bench_function("paste", |b| {
        let mut e = editor.clone();
        b.iter(|| {
            let patch = e.apply(Cmd::Paste {
                text: std::hint::black_box("aircraft speed is greater than\nthen".to_string()),
            });
            std::hint::black_box(patch);
        });
    });

    group.bench_function("layout_and_arrow_up", |b| {
        let mut e = editor.clone();
        b.iter(|| {
            e.apply(Cmd::ArrowUp);
            let layout = MonospaceLayout::compute(&e.lines(), 80, e.caret(), e.pending());
            std::hint::black_box(e.after_layout(&layout));
        });
    });

    group.finish();
}

criterion_group!(benches, bench_editor_commands);
criterion_main!(benches);
