use criterion::{Criterion, black_box, criterion_group, criterion_main};

use vocabq::session::history::EditHistory;
use vocabq::vocab::{QuestionType, build_prompts, parse_vocab};

fn make_vocab(lines: usize) -> String {
    let senses = ["shore", "money place", "tilt", "rely on", "thin", "bend"];
    (0..lines)
        .map(|i| {
            let extra = senses[(i + 1) % senses.len()];
            if i % 9 == 0 {
                // Malformed lines the parser has to skip.
                format!("word{i} without separator")
            } else {
                format!("  word{i} = {}, {extra}; sense{i}  ", senses[i % senses.len()])
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn bench_parse(c: &mut Criterion) {
    let text = make_vocab(1000);

    c.bench_function("parse_vocab (1000 lines)", |b| {
        b.iter(|| parse_vocab(black_box(&text)))
    });
}

fn bench_prompts(c: &mut Criterion) {
    let entries = parse_vocab(&make_vocab(200));

    c.bench_function("build_prompts fill-in-blank (200 entries)", |b| {
        b.iter(|| build_prompts(black_box(&entries), QuestionType::FillInBlank, 2))
    });
}

fn bench_history(c: &mut Criterion) {
    let text = make_vocab(300);

    c.bench_function("edit_history record 500 snapshots (limit 200)", |b| {
        b.iter(|| {
            let mut history = EditHistory::new(200);
            for _ in 0..500 {
                history.record(black_box(text.clone()));
            }
            history
        })
    });
}

criterion_group!(benches, bench_parse, bench_prompts, bench_history);
criterion_main!(benches);
