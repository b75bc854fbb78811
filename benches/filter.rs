//! This bench measures searching a large sheet, and the cost of an empty
//! query which should hand back the topics untouched.

#![allow(missing_docs)]

use criterion::{Criterion, criterion_group, criterion_main};
use sheet::{Config, Id, IdGenerator, Question, SequentialIds, Sheet, Subtopic, Topic};

/// Builds a sheet of 50 topics, each with 10 subtopics of 20 questions.
fn large_sheet() -> Sheet<SequentialIds> {
    let mut ids = SequentialIds::new("bench");
    let topics = (0..50)
        .map(|t| Topic {
            id: ids.next_id(),
            title: format!("Topic {t}"),
            subtopics: (0..10)
                .map(|s| Subtopic {
                    id: ids.next_id(),
                    title: format!("Subtopic {s}"),
                    questions: (0..20)
                        .map(|q| Question::new(ids.next_id(), format!("Question {t}-{s}-{q}")))
                        .collect(),
                })
                .collect(),
        })
        .collect();
    Sheet::with_topics(Config::default(), ids, topics)
}

fn filter(c: &mut Criterion) {
    let mut sheet = large_sheet();

    c.bench_function("filter empty query", |b| {
        b.iter(|| sheet.filtered_topics().len());
    });

    sheet.set_search_query("question 7-3");
    c.bench_function("filter narrow query", |b| {
        b.iter(|| sheet.filtered_topics().len());
    });

    sheet.set_search_query("QUESTION");
    c.bench_function("filter broad query", |b| {
        b.iter(|| sheet.filtered_topics().len());
    });

    let id = Id::from("bench-1");
    c.bench_function("progress", |b| {
        b.iter(|| sheet.topic(&id).map(Topic::progress));
    });
}

criterion_group!(benches, filter);
criterion_main!(benches);
