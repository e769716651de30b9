//! Benchmarks for search operations.
//!
//! Covers the two paths every keystroke can hit:
//! - `rank_prompts` (quick picker and `search --ranked`)
//! - `matches_filter` (main listing)
//!
//! at 100, 1,000, and 10,000 prompts.

// Criterion macros generate items without docs - this is expected for benchmarks
// Benchmarks use expect/unwrap for simplicity - panics are acceptable in benchmarks
#![allow(missing_docs)]
#![allow(clippy::expect_used, clippy::unwrap_used)]

use chrono::Utc;
use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use promptdock::models::{NewPrompt, Prompt};
use promptdock::rank_prompts;
use promptdock::services::search::matches_filter;
use std::hint::black_box;

// ============================================================================
// Helper Functions
// ============================================================================

const WORDS: [&str; 8] = [
    "email", "review", "summary", "bug", "release", "meeting", "draft", "report",
];

/// Builds `count` prompts with varied titles, content, and tags.
fn generate_prompts(count: usize) -> Vec<Prompt> {
    let now = Utc::now();
    (0..count)
        .map(|i| {
            let a = WORDS[i % WORDS.len()];
            let b = WORDS[(i / WORDS.len()) % WORDS.len()];
            NewPrompt::new(
                format!("{a} {b} {i}"),
                format!("Write a {{tone}} {b} about {{topic}} for item {i}"),
            )
            .with_tags([a.to_string(), format!("group-{}", i % 10)])
            .with_description(format!("{b} helper"))
        })
        .map(|fields| Prompt::create(fields, now))
        .collect()
}

// ============================================================================
// Benchmarks
// ============================================================================

fn bench_rank(c: &mut Criterion) {
    let mut group = c.benchmark_group("rank_prompts");

    for size in [100, 1_000, 10_000] {
        let prompts = generate_prompts(size);
        group.bench_with_input(BenchmarkId::from_parameter(size), &prompts, |b, prompts| {
            b.iter(|| rank_prompts(black_box(prompts), black_box("review")));
        });
    }

    group.finish();
}

fn bench_filter(c: &mut Criterion) {
    let mut group = c.benchmark_group("matches_filter");
    let tags = vec!["bug".to_string(), "group-3".to_string()];

    for size in [100, 1_000, 10_000] {
        let prompts = generate_prompts(size);
        group.bench_with_input(BenchmarkId::from_parameter(size), &prompts, |b, prompts| {
            b.iter(|| {
                prompts
                    .iter()
                    .filter(|p| matches_filter(p, black_box("draft"), black_box(&tags)))
                    .count()
            });
        });
    }

    group.finish();
}

criterion_group!(benches, bench_rank, bench_filter);
criterion_main!(benches);
