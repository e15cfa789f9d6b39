use std::sync::atomic::Ordering;

use crate::app::AppError;
use crate::semantic::SemanticSearchError;
use crate::sentiment::{Sentiment, SentimentCounts, TokenizerOptions};

use super::fakes::{at, comment, cs1010s_thread, FakeClassifier, FakeForum, Harness};

fn positive_harness() -> Harness {
    Harness::new(
        FakeForum::with_thread("CS1010S", cs1010s_thread()),
        FakeClassifier::answering(&[
            ("great module", "LABEL_2", 0.9),
            ("agree", "LABEL_2", 0.7),
        ]),
    )
}

#[test]
fn test_keyword_scenario() {
    let harness = positive_harness();
    let report = harness
        .service()
        .keyword_report("CS1010S", false, false)
        .unwrap();

    let texts: Vec<&str> = report.records.iter().map(|r| r.record.text.as_str()).collect();
    assert_eq!(texts, vec!["great module", "agree"]);
    assert_eq!(
        report.counts,
        SentimentCounts {
            negative: 0,
            neutral: 0,
            positive: 2
        }
    );

    let signed: Vec<f32> = report.records.iter().map(|r| r.signed).collect();
    assert_eq!(signed, vec![0.9, 0.7]);
    assert!(report
        .records
        .iter()
        .all(|r| r.sentiment.label == Sentiment::Positive));
    assert_eq!(report.indexed, None);
}

#[test]
fn test_repeat_request_is_served_from_caches() {
    let harness = positive_harness();
    let service = harness.service();

    let first = service.keyword_report("CS1010S", false, false).unwrap();
    let second = service.keyword_report("CS1010S", false, false).unwrap();

    assert_eq!(first, second);
    assert_eq!(harness.forum.searches.load(Ordering::SeqCst), 1);
    assert_eq!(harness.classifier.calls.load(Ordering::SeqCst), 1);
}

#[test]
fn test_keywords_are_cached_separately() {
    let harness = positive_harness();
    let service = harness.service();

    service.keyword_report("CS1010S", false, false).unwrap();
    let other = service.keyword_report("cs1010s", false, false).unwrap();

    assert!(other.records.is_empty());
    assert_eq!(harness.forum.searches.load(Ordering::SeqCst), 2);
    // empty input never reaches the model
    assert_eq!(harness.classifier.calls.load(Ordering::SeqCst), 1);
}

#[test]
fn test_exclude_neutral_only_changes_buckets() {
    let harness = Harness::new(
        FakeForum::with_thread("CS1010S", cs1010s_thread()),
        FakeClassifier::answering(&[("great module", "LABEL_2", 0.9)]),
    );
    let service = harness.service();

    let all = service.keyword_report("CS1010S", false, false).unwrap();
    assert_eq!(
        all.buckets,
        vec![
            (Sentiment::Negative, 0),
            (Sentiment::Neutral, 1),
            (Sentiment::Positive, 1)
        ]
    );

    let without = service.keyword_report("CS1010S", true, false).unwrap();
    assert_eq!(
        without.buckets,
        vec![(Sentiment::Negative, 0), (Sentiment::Positive, 1)]
    );
    assert_eq!(without.counts.neutral, 1);
    assert_eq!(without.records.len(), 2);
}

#[test]
fn test_course_codes_removed_before_scoring() {
    let mut thread = cs1010s_thread();
    thread.body = "Take CS1010S now".to_string();
    thread.comments = vec![
        comment("c1", Some("bob"), "CS1010S CS2030S CS2040S all hard", 2),
        comment("c2", Some("AutoModerator"), "Please read the rules", 2),
        comment("c3", Some("carol"), "agree", 3),
    ];

    let harness = Harness::new(
        FakeForum::with_thread("CS1010S", thread),
        FakeClassifier::answering(&[("Take  now", "LABEL_0", 0.8)]),
    );
    let report = harness
        .service()
        .keyword_report("CS1010S", false, false)
        .unwrap();

    let texts: Vec<&str> = report.records.iter().map(|r| r.record.text.as_str()).collect();
    assert_eq!(texts, vec!["Take CS1010S now", "agree"]);
    assert_eq!(report.records[0].sentiment.label, Sentiment::Negative);
    assert_eq!(report.records[0].signed, -0.8);
    assert_eq!(report.records[1].signed, 0.0);
}

#[test]
fn test_tokenizer_options_reach_the_model() {
    let harness = positive_harness();
    harness
        .service()
        .keyword_report("CS1010S", false, false)
        .unwrap();

    let options = harness.classifier.last_options.lock().unwrap().unwrap();
    assert_eq!(
        options,
        TokenizerOptions {
            padding: true,
            truncation: true,
            max_length: 512
        }
    );
}

#[test]
fn test_classifier_failure_is_not_cached() {
    let harness = positive_harness();
    let service = harness.service();

    harness.classifier.fail.store(true, Ordering::SeqCst);
    let err = service.keyword_report("CS1010S", false, false).unwrap_err();
    assert!(matches!(err, AppError::Score(_)));

    harness.classifier.fail.store(false, Ordering::SeqCst);
    let report = service.keyword_report("CS1010S", false, false).unwrap();
    assert_eq!(report.counts.positive, 2);
    assert_eq!(harness.classifier.calls.load(Ordering::SeqCst), 2);
    // the scrape itself was cached
    assert_eq!(harness.forum.searches.load(Ordering::SeqCst), 1);
}

#[test]
fn test_index_then_search() {
    let harness = positive_harness();
    let service = harness.service();

    let report = service.keyword_report("CS1010S", false, true).unwrap();
    assert_eq!(report.indexed, Some(2));

    let found = service.semantic_report("is cs1010s good", Some(10)).unwrap();
    let texts: Vec<&str> = found.matches.iter().map(|m| m.post.text.as_str()).collect();
    assert_eq!(texts, vec!["great module", "agree"]);
    assert_eq!(found.matches[0].post.author.as_deref(), Some("op"));
    assert_eq!(found.counts.positive, 2);
    assert_eq!(found.trend, vec![(at(1), 0.9), (at(2), 0.7)]);

    let top_one = service.semantic_report("is cs1010s good", Some(1)).unwrap();
    assert_eq!(top_one.matches.len(), 1);
}

#[test]
fn test_reindexing_keyword_does_not_duplicate_posts() {
    let harness = positive_harness();

    // second run is served from the caches, third one scrapes again
    let service = harness.service();
    assert_eq!(service.keyword_report("CS1010S", false, true).unwrap().indexed, Some(2));
    assert_eq!(service.keyword_report("CS1010S", false, true).unwrap().indexed, Some(2));
    let rescraped = harness.service();
    assert_eq!(rescraped.keyword_report("CS1010S", false, true).unwrap().indexed, Some(2));

    let found = service.semantic_report("is cs1010s good", Some(10)).unwrap();
    let texts: Vec<&str> = found.matches.iter().map(|m| m.post.text.as_str()).collect();
    assert_eq!(texts, vec!["great module", "agree"]);
    assert_eq!(found.counts.positive, 2);
    assert_eq!(harness.store.vectors.lock().unwrap().len(), 2);
}

#[test]
fn test_search_uses_default_top_k() {
    let harness = positive_harness();
    let service = harness.service();
    service.keyword_report("CS1010S", false, true).unwrap();

    // default_top_k is 10, more than what is indexed
    let found = service.semantic_report("module", None).unwrap();
    assert_eq!(found.matches.len(), 2);
}

#[test]
fn test_search_rejects_bad_top_k() {
    let harness = positive_harness();
    let service = harness.service();

    for top_k in [0, 501] {
        let err = service.semantic_report("q", Some(top_k)).unwrap_err();
        assert!(matches!(
            err,
            AppError::Semantic(SemanticSearchError::InvalidTopK(k)) if k == top_k
        ));
        assert!(err.is_client_error());
    }
}

#[test]
fn test_index_stats_degrade_to_none() {
    let harness = positive_harness();
    let service = harness.service();
    service.keyword_report("CS1010S", false, true).unwrap();

    assert_eq!(service.index_stats().map(|s| s.total_count), Some(2));

    harness.store.unreachable.store(true, Ordering::SeqCst);
    assert!(service.index_stats().is_none());

    assert!(harness.service_without_index().index_stats().is_none());
}

#[test]
fn test_indexing_requires_semantic_search() {
    let harness = positive_harness();
    let service = harness.service_without_index();

    assert!(matches!(
        service.keyword_report("CS1010S", false, true),
        Err(AppError::SemanticDisabled)
    ));
    assert!(service.keyword_report("CS1010S", false, false).is_ok());
}
