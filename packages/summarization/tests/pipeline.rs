//! Integration tests for the summarization pipeline.
//!
//! These tests drive the public API end to end with a scripted generator:
//! 1. Classify a document
//! 2. Prepare, chunk and MAP it
//! 3. REDUCE the partials (or join them for MAP-only categories)
//! 4. Clean up and fall back when the output degrades

use std::sync::{Arc, Mutex};
use std::time::Duration;

use summarization::{
    classify,
    testing::MockGenerator,
    types::category::DEFAULT_CATEGORIES,
    BuiltinTemplates, CategoryCode, CategorySet, DirectoryTemplates, MemoryTemplates,
    ProgressEvent, SerializedGenerator, Summarizer, SummarizerConfig, TemplatePair, NO_TEXT_FOUND,
};

const REPORT: &str = "Op 3 maart werd door aangever melding gedaan van een inbraak in zijn woning.\n\
    Volgens aangever was de achterdeur geforceerd en ontbraken een laptop en sieraden.\n\
    Een buurvrouw verklaarde die avond een onbekende auto in de straat te hebben gezien.";

const SUMMARY: &str = "Aangever deed melding van een inbraak in zijn woning. \
    Er werden een laptop en sieraden weggenomen nadat de achterdeur was geforceerd.";

/// Helper to build templates with one MAP-only category.
fn templates() -> MemoryTemplates {
    MemoryTemplates::new()
        .with("UNKNOWN", TemplatePair::new("Vat samen.", "Schrijf de eindtekst."))
        .with("X", TemplatePair::new("Vat samen in bullets.", ""))
}

fn recorder() -> (Arc<Mutex<Vec<ProgressEvent>>>, impl Fn(&ProgressEvent) + Send + Sync) {
    let events = Arc::new(Mutex::new(Vec::new()));
    let sink_events = events.clone();
    let sink = move |e: &ProgressEvent| sink_events.lock().unwrap().push(e.clone());
    (events, sink)
}

#[tokio::test]
async fn test_every_category_yields_non_empty_output() {
    let categories = DEFAULT_CATEGORIES.iter().copied().chain(["UNKNOWN", "X"]);

    for code in categories {
        for response in ["ok", "- feit", SUMMARY] {
            let mock = MockGenerator::new().with_default_response(response);
            let summarizer = Summarizer::new(&mock, BuiltinTemplates);

            let out = summarizer.summarize(Some(code), REPORT).await.unwrap();
            assert!(!out.trim().is_empty(), "{code} with {response:?} produced empty output");
        }
    }
}

#[tokio::test]
async fn test_map_only_category_joins_bullets_without_reduce_call() {
    let mock = MockGenerator::new()
        .with_response("ALFA", "* Betrokkene werd op straat aangehouden door twee agenten.")
        .with_response("BRAVO", "1) Bij de fouillering werd een mes in zijn jas gevonden.");
    let config = SummarizerConfig::default().with_max_chars_per_chunk(40);
    let summarizer = Summarizer::new(&mock, templates()).with_config(config);

    let (events, sink) = recorder();
    let text = "Melding ALFA over een aanhouding.\nMelding BRAVO over een fouillering.";
    let out = summarizer
        .summarize_document(&CategoryCode::new("X"), text, &sink)
        .await
        .unwrap();

    assert_eq!(
        out,
        "- Betrokkene werd op straat aangehouden door twee agenten.\n\
         - Bij de fouillering werd een mes in zijn jas gevonden."
    );
    assert_eq!(mock.calls().len(), 2);
    assert!(events.lock().unwrap().contains(&ProgressEvent::ReduceSkipped));
}

#[tokio::test]
async fn test_whitespace_document_reports_no_text() {
    let mock = MockGenerator::new().with_default_response(SUMMARY);
    let summarizer = Summarizer::new(&mock, templates());

    let (events, sink) = recorder();
    let out = summarizer
        .summarize_document(&CategoryCode::unknown(), "\r\n  \r\n\t", &sink)
        .await
        .unwrap();

    assert_eq!(out, NO_TEXT_FOUND);
    assert_eq!(*events.lock().unwrap(), vec![ProgressEvent::NoText]);
    assert!(mock.calls().is_empty());
}

#[tokio::test]
async fn test_map_failure_is_retried_once() {
    let mock = MockGenerator::new()
        .with_response("Schrijf de eindtekst.", SUMMARY)
        .with_default_response("- Aangever meldde een inbraak.")
        .fail_first(1);
    let summarizer = Summarizer::new(&mock, templates());

    let (events, sink) = recorder();
    let out = summarizer
        .summarize_document(&CategoryCode::unknown(), REPORT, &sink)
        .await
        .unwrap();

    assert_eq!(out, SUMMARY);
    assert!(events.lock().unwrap().contains(&ProgressEvent::MapRetry { index: 1 }));
    // failed MAP, retried MAP, REDUCE
    assert_eq!(mock.calls().len(), 3);
}

#[tokio::test]
async fn test_map_failure_after_retry_is_an_error() {
    let mock = MockGenerator::new().with_default_response(SUMMARY).fail_first(2);
    let summarizer = Summarizer::new(&mock, templates());

    let err = summarizer.summarize(None, REPORT).await.unwrap_err();
    assert!(err.is_generation());
    assert_eq!(mock.calls().len(), 2);
}

#[tokio::test]
async fn test_progress_streams_through_channel() {
    let mock = MockGenerator::new()
        .with_response("Schrijf de eindtekst.", SUMMARY)
        .with_default_response("- Aangever meldde een inbraak.");
    let summarizer = Summarizer::new(&mock, templates());

    let (tx, mut rx) = tokio::sync::mpsc::unbounded_channel::<ProgressEvent>();
    summarizer
        .summarize_document(&CategoryCode::unknown(), REPORT, &tx)
        .await
        .unwrap();
    drop(tx);

    let mut events = Vec::new();
    while let Some(event) = rx.recv().await {
        events.push(event);
    }

    assert!(matches!(events[0], ProgressEvent::Started { chunks: 1, reduce: true, .. }));
    assert_eq!(events[1], ProgressEvent::MapStarted { index: 1, total: 1 });
    assert!(matches!(events[2], ProgressEvent::MapDone { index: 1, .. }));
    assert_eq!(events[3], ProgressEvent::ReduceSingle);
    assert_eq!(events.last(), Some(&ProgressEvent::Finished));
}

#[tokio::test]
async fn test_multi_round_reduce_for_long_documents() {
    let mock = MockGenerator::new()
        .with_response("Schrijf de eindtekst.", SUMMARY)
        .with_default_response("- Aangever meldde een inbraak.");
    let config = SummarizerConfig::default()
        .with_max_chars_per_chunk(60)
        .with_group_size(2)
        .with_max_partials(0);
    let summarizer = Summarizer::new(&mock, templates()).with_config(config);

    let (events, sink) = recorder();
    let text = "Regel van het proces-verbaal met een feit erin.\n".repeat(5);
    let out = summarizer
        .summarize_document(&CategoryCode::unknown(), &text, &sink)
        .await
        .unwrap();

    assert_eq!(out, SUMMARY);
    let rounds = events
        .lock()
        .unwrap()
        .iter()
        .filter(|e| matches!(e, ProgressEvent::ReduceRoundStarted { .. }))
        .count();
    // 5 -> 3 -> 2 -> 1
    assert_eq!(rounds, 3);
}

#[tokio::test]
async fn test_partials_are_capped() {
    let mock = MockGenerator::new()
        .with_response("Schrijf de eindtekst.", SUMMARY)
        .with_default_response("- Aangever meldde een inbraak.");
    let config = SummarizerConfig::default()
        .with_max_chars_per_chunk(60)
        .with_max_partials(2);
    let summarizer = Summarizer::new(&mock, templates()).with_config(config);

    let (events, sink) = recorder();
    let text = "Regel van het proces-verbaal met een feit erin.\n".repeat(5);
    summarizer
        .summarize_document(&CategoryCode::unknown(), &text, &sink)
        .await
        .unwrap();

    assert!(events
        .lock()
        .unwrap()
        .contains(&ProgressEvent::PartialsTrimmed { from: 5, to: 2 }));
}

#[tokio::test]
async fn test_shared_generator_serializes_concurrent_documents() {
    let mock = MockGenerator::new()
        .with_response("Schrijf de eindtekst.", SUMMARY)
        .with_default_response("- Aangever meldde een inbraak.")
        .with_delay(Duration::from_millis(5));
    let shared = Arc::new(SerializedGenerator::new(mock));

    let first = Summarizer::new(shared.clone(), templates());
    let second = Summarizer::new(shared.clone(), templates());
    let (a, b) = tokio::join!(first.summarize(None, REPORT), second.summarize(None, REPORT));

    assert_eq!(a.unwrap(), SUMMARY);
    assert_eq!(b.unwrap(), SUMMARY);
    assert_eq!(shared.inner().max_concurrent_calls(), 1);
    assert_eq!(shared.inner().calls().len(), 4);
}

#[tokio::test]
async fn test_classified_document_uses_directory_templates() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(
        dir.path().join("pv.txt"),
        "Vat het proces-verbaal samen.\r\n---REDUCE---\r\nSchrijf het PV-verslag.\r\n",
    )
    .unwrap();
    std::fs::write(dir.path().join("unknown.txt"), "Vat samen.\n---REDUCE---\nSchrijf.").unwrap();

    let category = classify("PV_verhoor_01.pdf", "", &CategorySet::default());
    assert_eq!(category, "PV");

    let mock = MockGenerator::new()
        .with_response("Schrijf het PV-verslag.", SUMMARY)
        .with_default_response("- Aangever meldde een inbraak.");
    let summarizer = Summarizer::new(&mock, DirectoryTemplates::new(dir.path()));

    let out = summarizer.summarize(Some(category.as_str()), REPORT).await.unwrap();
    assert_eq!(out, SUMMARY);
    assert!(mock.calls()[0].prompt.contains("Vat het proces-verbaal samen."));
}

#[tokio::test]
async fn test_missing_template_is_reported() {
    let mock = MockGenerator::new().with_default_response(SUMMARY);
    let summarizer = Summarizer::new(
        &mock,
        MemoryTemplates::new().with("PV", TemplatePair::new("Vat samen.", "")),
    );

    let err = summarizer.summarize(Some("TLL"), REPORT).await.unwrap_err();
    assert!(!err.is_generation());
    assert!(err.to_string().contains("TLL"));
    assert!(mock.calls().is_empty());
}
