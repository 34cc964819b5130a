//! Benchmarks for offline intent classification.
//!
//! The fallback parser runs on every failed backend call, so a full
//! `classify` (intent, parameters and reply composition) is measured
//! alongside bare term extraction.

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use enrollcast_chat::IntentParser;

const INPUTS: &[&str] = &[
    "Forecast Spring 2026",
    "what about fall 26 for FOUN 110 online?",
    "help",
    "show settings",
    "Could you compare the prophet and sequence methods for next year?",
];

fn bench_classify(c: &mut Criterion) {
    let parser = IntentParser::new();
    c.bench_function("classify_mixed_inputs", |b| {
        b.iter(|| {
            for input in INPUTS {
                black_box(parser.classify(black_box(input), "Spring 2026"));
            }
        })
    });
}

fn bench_extract_term(c: &mut Criterion) {
    let parser = IntentParser::new();
    c.bench_function("extract_term", |b| {
        b.iter(|| black_box(parser.extract_term(black_box("please forecast winter 27 sections"))))
    });
}

criterion_group!(benches, bench_classify, bench_extract_term);
criterion_main!(benches);
