//! Generation pipeline: captured entries through mining, synthesis, and store writes

mod common;

use common::{entry, record, MockStore};
use shorthand_core::generation::similarity::similarity;
use shorthand_core::generation::{Fingerprinter, LetterFrequency};
use shorthand_core::{
    AcronymRecord, AcronymStore, CapturedEntry, GenerationConfig, GenerationError, GenerationOrchestrator, InMemoryStore,
    ShorthandError, StoreCapabilities,
};
use std::collections::HashSet;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

const DEPLOY_NOTES: [&str; 2] = [
    "remember to deploy the staging cluster tonight",
    "we should deploy the staging cluster after review",
];

async fn capture_all(store: &InMemoryStore, texts: &[&str]) {
    for text in texts {
        store.create_entry(text).await.unwrap();
    }
}

fn failing_store(entries: Vec<CapturedEntry>) -> MockStore {
    let mut store = MockStore::new();
    store
        .expect_capabilities()
        .returning(StoreCapabilities::full);
    store
        .expect_list_unprocessed()
        .returning(move |_| Ok(entries.clone()));
    store
}

#[tokio::test]
async fn test_labels_stay_unique_across_passes() {
    let store = Arc::new(InMemoryStore::new());
    let orchestrator =
        GenerationOrchestrator::with_seed(store.clone(), GenerationConfig::default(), 42);

    capture_all(&store, &DEPLOY_NOTES).await;
    let first = orchestrator.process_pending().await.unwrap();
    assert_eq!(first.entries_processed, 2);
    assert!(!first.acronyms_created.is_empty());

    // Same phrases again: already expanded, so nothing new is written
    capture_all(&store, &DEPLOY_NOTES).await;
    let second = orchestrator.process_pending().await.unwrap();
    assert_eq!(second.entries_processed, 2);
    assert_eq!(second.phrases_known, first.acronyms_created.len());
    assert!(second.acronyms_created.is_empty());
    assert_eq!(store.list_all().await.unwrap().len(), first.acronyms_created.len());

    let labels: Vec<String> = store
        .list_all()
        .await
        .unwrap()
        .into_iter()
        .map(|r| r.acronym)
        .collect();
    let unique: HashSet<&String> = labels.iter().collect();
    assert_eq!(unique.len(), labels.len());

    for record in store.list_all().await.unwrap() {
        assert!(record.is_auto_generated());
        assert!(record.enabled);
        assert_eq!(record.usage_count, 0);
    }
}

#[tokio::test]
async fn test_label_length_bounds() {
    let store = Arc::new(InMemoryStore::new());
    capture_all(&store, &["alpha beta gamma", "alpha beta gamma"]).await;

    let config = GenerationConfig {
        max_label_len: 2,
        ..Default::default()
    };
    let orchestrator = GenerationOrchestrator::with_seed(store.clone(), config, 1);

    let report = orchestrator.process_pending().await.unwrap();
    assert_eq!(report.phrases_mined, 1);
    assert_eq!(report.labels_discarded, 1);
    assert!(report.acronyms_created.is_empty());
    assert!(store.list_all().await.unwrap().is_empty());
    assert!(store.list_unprocessed(10).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_feedback_after_pass() {
    let store = Arc::new(InMemoryStore::new());
    capture_all(&store, &DEPLOY_NOTES).await;

    let orchestrator =
        GenerationOrchestrator::with_seed(store.clone(), GenerationConfig::default(), 5);
    let report = orchestrator.process_pending().await.unwrap();
    let label = report.acronyms_created.first().unwrap();

    assert!(orchestrator.feedback(label, true).await);
    assert!(orchestrator.feedback(label, false).await);
    assert!(!orchestrator.feedback("NEVER-SEEN", true).await);
}

#[tokio::test]
async fn test_report_serializes_duration_as_millis() {
    let store = Arc::new(InMemoryStore::new());
    capture_all(&store, &DEPLOY_NOTES).await;

    let orchestrator =
        GenerationOrchestrator::with_seed(store, GenerationConfig::default(), 5);
    let report = orchestrator.process_pending().await.unwrap();

    let json = serde_json::to_value(&report).unwrap();
    assert!(json["duration"].is_u64());
    assert_eq!(json["entries_processed"], 2);
    assert_eq!(json["skipped"], false);
}

#[tokio::test]
async fn test_requires_prompt_capture_capability() {
    let mut store = MockStore::new();
    store
        .expect_capabilities()
        .returning(StoreCapabilities::lookup_only);

    let orchestrator =
        GenerationOrchestrator::with_seed(Arc::new(store), GenerationConfig::default(), 1);
    assert!(matches!(
        orchestrator.process_pending().await,
        Err(GenerationError::Unsupported)
    ));
}

#[tokio::test]
async fn test_repeated_failures_abandon_batch() {
    let entries = vec![entry(1, DEPLOY_NOTES[0]), entry(2, DEPLOY_NOTES[1])];
    let mut store = failing_store(entries);
    store
        .expect_list_all()
        .returning(|| Err(ShorthandError::Storage("connection reset".to_string())));
    store.expect_mark_processed().times(2).returning(|_| Ok(()));

    let orchestrator =
        GenerationOrchestrator::with_seed(Arc::new(store), GenerationConfig::default(), 1);

    for _ in 0..2 {
        assert!(matches!(
            orchestrator.process_pending().await,
            Err(GenerationError::Store(_))
        ));
    }

    match orchestrator.process_pending().await {
        Err(GenerationError::Abandoned { entries, failures }) => {
            assert_eq!(entries, 2);
            assert_eq!(failures, 3);
        }
        other => panic!("expected abandoned batch, got {:?}", other),
    }
}

#[tokio::test]
async fn test_success_resets_failure_count() {
    let entries = vec![entry(1, DEPLOY_NOTES[0]), entry(2, DEPLOY_NOTES[1])];
    let mut store = failing_store(entries);

    // Calls 3 and 4 succeed; every other call fails
    let calls = Arc::new(AtomicUsize::new(0));
    let counter = calls.clone();
    store.expect_list_all().returning(move || {
        let call = counter.fetch_add(1, Ordering::SeqCst);
        if call == 2 || call == 3 {
            Ok(vec![record("ZZZZ", "placeholder", 0)])
        } else {
            Err(ShorthandError::Storage("connection reset".to_string()))
        }
    });
    store
        .expect_search()
        .returning(|_| Ok(Vec::new()));
    store
        .expect_create()
        .returning(|new| Ok(AcronymRecord::from_new(new)));
    store.expect_mark_processed().returning(|_| Ok(()));

    let config = GenerationConfig {
        max_phrases: 1,
        ..Default::default()
    };
    let orchestrator = GenerationOrchestrator::with_seed(Arc::new(store), config, 1);

    // One phrase per pass, so one list_all call per pass
    assert!(orchestrator.process_pending().await.is_err());
    assert!(orchestrator.process_pending().await.is_err());
    assert!(orchestrator.process_pending().await.is_ok());

    // Counter was reset, so two more failures do not abandon
    assert!(orchestrator.process_pending().await.is_ok());
    assert!(matches!(
        orchestrator.process_pending().await,
        Err(GenerationError::Store(_))
    ));
    assert!(matches!(
        orchestrator.process_pending().await,
        Err(GenerationError::Store(_))
    ));
    assert_eq!(calls.load(Ordering::SeqCst), 6);
}

#[tokio::test]
async fn test_label_claimed_meanwhile_is_skipped() {
    let entries = vec![entry(1, DEPLOY_NOTES[0]), entry(2, DEPLOY_NOTES[1])];
    let mut store = failing_store(entries);
    store.expect_list_all().returning(|| Ok(Vec::new()));
    // Every label already shows up somewhere: as a label under a different
    // case, or only inside another record's expansion
    store.expect_search().returning(|label| {
        if label.len() % 2 == 0 {
            Ok(vec![record(&label.to_lowercase(), "taken elsewhere", 0)])
        } else {
            Ok(vec![record("ZZ", &format!("see the {} runbook", label), 0)])
        }
    });
    store.expect_create().never();
    store.expect_mark_processed().times(2).returning(|_| Ok(()));

    let orchestrator =
        GenerationOrchestrator::with_seed(Arc::new(store), GenerationConfig::default(), 1);
    let report = orchestrator.process_pending().await.unwrap();

    assert!(report.phrases_mined > 0);
    assert_eq!(report.labels_discarded, report.phrases_mined);
    assert!(report.acronyms_created.is_empty());
    assert_eq!(report.entries_processed, 2);
}

#[tokio::test]
async fn test_create_failure_counted_not_fatal() {
    let entries = vec![entry(1, DEPLOY_NOTES[0]), entry(2, DEPLOY_NOTES[1])];
    let mut store = failing_store(entries);
    store.expect_list_all().returning(|| Ok(Vec::new()));
    store.expect_search().returning(|_| Ok(Vec::new()));
    store
        .expect_create()
        .returning(|_| Err(ShorthandError::Storage("write rejected".to_string())));
    store.expect_mark_processed().times(2).returning(|_| Ok(()));

    let orchestrator =
        GenerationOrchestrator::with_seed(Arc::new(store), GenerationConfig::default(), 1);
    let report = orchestrator.process_pending().await.unwrap();

    assert_eq!(report.errors, report.phrases_mined);
    assert_eq!(report.entries_processed, 2);
}

#[tokio::test]
async fn test_session_labels_respect_threshold_without_store_writes() {
    let entries = vec![entry(1, DEPLOY_NOTES[0]), entry(2, DEPLOY_NOTES[1])];
    let mut store = failing_store(entries);
    store.expect_list_all().returning(|| Ok(Vec::new()));
    store.expect_search().returning(|_| Ok(Vec::new()));
    store
        .expect_create()
        .returning(|_| Err(ShorthandError::Storage("write rejected".to_string())));
    store.expect_mark_processed().returning(|_| Ok(()));

    let config = GenerationConfig::default();
    let threshold = config.similarity_threshold;
    let orchestrator = GenerationOrchestrator::with_seed(Arc::new(store), config, 1);
    let report = orchestrator.process_pending().await.unwrap();
    assert!(report.acronyms_created.is_empty());

    let labels = orchestrator.session_labels().await;
    assert_eq!(labels.len(), report.phrases_mined);
    assert!(labels.contains(&"DS".to_string()));
    assert!(!labels.contains(&"DSC".to_string()));

    let fingerprinter = LetterFrequency;
    for (i, a) in labels.iter().enumerate() {
        for b in &labels[i + 1..] {
            let score = similarity(&fingerprinter.fingerprint(a), &fingerprinter.fingerprint(b));
            assert!(score <= threshold, "{} vs {} scored {:.3}", a, b, score);
        }
    }
}
