//! Criterion benchmarks for candor.
//!
//! Covers the per-review scoring path and the pieces it is made of:
//! cleaning, TF-IDF transformation, and classification.

use std::hint::black_box;

use candor::analysis::analyzer::ReviewCleaner;
use candor::ml::classifier::Classifier;
use candor::ml::label::Label;
use candor::ml::logistic::{LogisticRegression, LogisticRegressionConfig};
use candor::ml::tfidf::{TfIdfVectorizer, VectorizerConfig};
use candor::scoring::{Scorer, ScoringService};
use criterion::{Criterion, Throughput, criterion_group, criterion_main};

/// Generate synthetic labeled reviews for benchmarking.
fn generate_reviews(count: usize) -> (Vec<String>, Vec<Label>) {
    let genuine_words = [
        "battery", "lasts", "arrived", "late", "sturdy", "instructions", "confusing", "bracket",
        "refund", "shipping", "strap", "replacement", "setting", "noise", "fits", "older",
    ];
    let fake_words = [
        "amazing", "best", "ever", "perfect", "highly", "recommend", "love", "awesome",
        "fantastic", "quality", "purchase", "everyone", "stars", "wonderful", "great", "must",
    ];

    let mut texts = Vec::with_capacity(count);
    let mut labels = Vec::with_capacity(count);
    for i in 0..count {
        let (words, label) = if i % 2 == 0 {
            (&genuine_words, Label::Genuine)
        } else {
            (&fake_words, Label::Fake)
        };
        let len = 8 + (i % 24);
        let text: Vec<&str> = (0..len).map(|j| words[(i * 7 + j * 3) % words.len()]).collect();
        texts.push(format!("{}!", text.join(" ")));
        labels.push(label);
    }
    (texts, labels)
}

fn build_scorer(texts: &[String], labels: &[Label]) -> Scorer {
    let cleaner = ReviewCleaner::new().unwrap();
    let cleaned = cleaner.clean_all(texts).unwrap();
    let vectorizer = TfIdfVectorizer::fit(&cleaned, VectorizerConfig::default()).unwrap();
    let features = vectorizer.transform_all(&cleaned).unwrap();
    let classifier =
        LogisticRegression::fit(&features, labels, &LogisticRegressionConfig::default()).unwrap();
    Scorer::new(cleaner, vectorizer, Box::new(classifier))
}

/// Benchmark the individual stages of scoring.
fn bench_stages(c: &mut Criterion) {
    let (texts, labels) = generate_reviews(500);
    let scorer = build_scorer(&texts, &labels);
    let cleaner = ReviewCleaner::new().unwrap();
    let review = "Sturdy bracket, instructions were confusing but the battery lasts. Would buy again!";
    let cleaned = cleaner.clean(review).unwrap();
    let features = scorer.vectorizer().transform(&cleaned).unwrap();

    let mut group = c.benchmark_group("stages");
    group.bench_function("clean_review", |b| {
        b.iter(|| black_box(cleaner.clean(black_box(review)).unwrap()))
    });
    group.bench_function("tfidf_transform", |b| {
        b.iter(|| black_box(scorer.vectorizer().transform(black_box(&cleaned)).unwrap()))
    });
    group.bench_function("predict_with_confidence", |b| {
        b.iter(|| {
            black_box(
                scorer
                    .classifier()
                    .predict_with_confidence(black_box(&features))
                    .unwrap(),
            )
        })
    });
    group.finish();
}

/// Benchmark end-to-end review checks.
fn bench_scoring(c: &mut Criterion) {
    let (texts, labels) = generate_reviews(500);
    let service = ScoringService::new(build_scorer(&texts, &labels));
    let (queries, _) = generate_reviews(200);

    let mut group = c.benchmark_group("scoring");
    group.bench_function("check_review", |b| {
        b.iter(|| black_box(service.check_review(black_box(&queries[3])).unwrap()))
    });

    group.throughput(Throughput::Elements(queries.len() as u64));
    group.bench_function("check_all_parallel", |b| {
        b.iter(|| black_box(service.check_all(black_box(&queries))))
    });
    group.finish();
}

/// Benchmark vectorizer fitting and classifier training.
fn bench_training(c: &mut Criterion) {
    let (texts, labels) = generate_reviews(1000);
    let cleaner = ReviewCleaner::new().unwrap();
    let cleaned = cleaner.clean_all(&texts).unwrap();
    let vectorizer = TfIdfVectorizer::fit(&cleaned, VectorizerConfig::default()).unwrap();
    let features = vectorizer.transform_all(&cleaned).unwrap();

    let mut group = c.benchmark_group("training");
    group.sample_size(10);
    group.throughput(Throughput::Elements(texts.len() as u64));
    group.bench_function("tfidf_fit", |b| {
        b.iter(|| {
            black_box(TfIdfVectorizer::fit(black_box(&cleaned), VectorizerConfig::default()).unwrap())
        })
    });
    group.bench_function("logistic_regression_fit", |b| {
        b.iter(|| {
            black_box(
                LogisticRegression::fit(
                    black_box(&features),
                    &labels,
                    &LogisticRegressionConfig::default(),
                )
                .unwrap(),
            )
        })
    });
    group.finish();
}

criterion_group!(benches, bench_stages, bench_scoring, bench_training);
criterion_main!(benches);
