//! This bench test measures adding questionnaires and follow-ups to a store
//! that persists to disk, where every write rewrites the whole collection.

#![allow(missing_docs)]

use criterion::{criterion_group, criterion_main, BatchSize, Criterion};
use questrack::{FileBackend, NewFollowUp, NewQuestionnaire, Store};
use tempfile::TempDir;

fn add_many(c: &mut Criterion) {
    c.bench_function("add 100 questionnaires with follow-ups", |b| {
        b.iter_batched(
            || TempDir::new().unwrap(),
            |tmp_dir| {
                let mut store = Store::new(FileBackend::new(tmp_dir.path().to_path_buf()));
                for i in 0..100 {
                    let questionnaire = store
                        .add_questionnaire(NewQuestionnaire {
                            total_questions: 20,
                            answered_questions: i % 20,
                            ..NewQuestionnaire::new(format!("Review {i}"), "https://example.org")
                        })
                        .unwrap();
                    store
                        .add_follow_up(NewFollowUp::new(questionnaire.id(), "Clarification"))
                        .unwrap();
                }
            },
            BatchSize::SmallInput,
        );
    });
}

criterion_group!(benches, add_many);
criterion_main!(benches);
