use criterion::{Criterion, criterion_group, criterion_main};
use marginalia_engine::{BlockType, Cmd, Document, InlineStyle, Point, Selection};

fn sample_document(paragraphs: usize) -> Document {
    let text = vec!["lorem ipsum dolor sit amet"; paragraphs].join("\n");
    Document::new().apply(Cmd::InsertText(text)).unwrap()
}

fn bench_command_operations(c: &mut Criterion) {
    let mut group = c.benchmark_group("commands");
    group.sample_size(10);

    let doc = sample_document(100);

    group.bench_function("insert_text", |b| {
        b.iter(|| {
            let next = doc
                .apply(Cmd::InsertText(std::hint::black_box("x".to_string())))
                .unwrap();
            std::hint::black_box(next);
        });
    });

    group.bench_function("toggle_inline_style_over_range", |b| {
        let selected = doc
            .with_selection(Selection::new(Point::new(0, 0), Point::new(50, 10)))
            .unwrap();
        b.iter(|| {
            let next = selected
                .apply(Cmd::ToggleInlineStyle(std::hint::black_box(
                    InlineStyle::Bold,
                )))
                .unwrap();
            std::hint::black_box(next);
        });
    });

    group.bench_function("toggle_block_type", |b| {
        b.iter(|| {
            let next = doc
                .apply(Cmd::ToggleBlockType(std::hint::black_box(
                    BlockType::Heading { level: 2 },
                )))
                .unwrap();
            std::hint::black_box(next);
        });
    });

    group.finish();
}

criterion_group!(benches, bench_command_operations);
criterion_main!(benches);
