//! End-to-end tests for the gate against an in-memory document

use aegis_analysis::MockClassifier;
use aegis_domain::{AnalysisOutcome, Classifier, DocumentSource, Element, NodeId, Verdict};
use aegis_gate::{Gate, GateConfig, MemoryDocument, Presentation, BANNER_MARKER};
use aegis_redact::redact;
use std::time::Duration;

const PHISH: &str =
    "URGENT ALPHA: account 1234567890123 is locked. Send Ksh 5,000 to 0712345678 to restore access.";
const NEWSLETTER: &str =
    "BRAVO: Hello team, the quarterly all-hands has moved to Thursday afternoon in room B.";

fn message(text: &str) -> Element {
    Element::new("div")
        .with_class("a3s")
        .with_class("aiL")
        .with_content(text)
}

fn open_message(document: &MemoryDocument, text: &str) -> NodeId {
    document.append_child(document.root(), message(text)).unwrap()
}

fn banner_class(document: &MemoryDocument) -> Option<String> {
    let banner = document.find_marked(BANNER_MARKER)?;
    document.element(banner)?.classes.first().cloned()
}

#[tokio::test(start_paused = true)]
async fn test_burst_of_mutations_extracts_once() {
    let document = MemoryDocument::new();
    let mutations = document.observe();
    let classifier = MockClassifier::new(Verdict::threat("Credential harvesting", 93.0));
    let gate = Gate::new(GateConfig::default(), document.clone(), classifier.clone());
    let running = tokio::spawn(gate.run(mutations));

    let body = open_message(&document, "");
    for i in 1..10 {
        document.set_text(body, format!("{} ({})", PHISH, i)).unwrap();
    }
    document.disconnect();

    let metrics = running.await.unwrap();
    assert_eq!(metrics.triggers, 1);
    assert_eq!(metrics.dispatched, 1);
    assert_eq!(classifier.call_count(), 1);
    assert_eq!(classifier.requests()[0], redact(&format!("{} (9)", PHISH)));
    assert_eq!(banner_class(&document).as_deref(), Some("aegis-threat"));
}

#[tokio::test(start_paused = true)]
async fn test_unchanged_text_is_classified_once() {
    let document = MemoryDocument::new();
    let mutations = document.observe();
    let classifier = MockClassifier::default();
    let gate = Gate::new(GateConfig::default(), document.clone(), classifier.clone());
    let running = tokio::spawn(gate.run(mutations));

    open_message(&document, PHISH);
    tokio::time::sleep(Duration::from_millis(1_500)).await;

    // Unrelated page churn in a later window
    document
        .append_child(document.root(), Element::new("span").with_content("typing..."))
        .unwrap();
    tokio::time::sleep(Duration::from_millis(1_500)).await;
    document.disconnect();

    let metrics = running.await.unwrap();
    assert_eq!(metrics.triggers, 2);
    assert_eq!(metrics.skipped_unchanged, 1);
    assert_eq!(classifier.call_count(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_short_text_never_sent() {
    let document = MemoryDocument::new();
    let mutations = document.observe();
    let classifier = MockClassifier::default();
    let gate = Gate::new(GateConfig::default(), document.clone(), classifier.clone());
    let running = tokio::spawn(gate.run(mutations));

    open_message(&document, "Thanks, see you tomorrow!");
    document.disconnect();

    let metrics = running.await.unwrap();
    assert_eq!(metrics.skipped_short, 1);
    assert_eq!(metrics.dispatched, 0);
    assert_eq!(classifier.call_count(), 0);
}

#[tokio::test(start_paused = true)]
async fn test_late_response_for_previous_message_is_discarded() {
    let document = MemoryDocument::new();
    let mutations = document.observe();
    let mut classifier = MockClassifier::default();
    classifier.add_response("ALPHA", Verdict::threat("Fake account lock", 97.0));
    classifier.add_delay("ALPHA", Duration::from_secs(5));

    let gate = Gate::new(GateConfig::default(), document.clone(), classifier.clone());
    let running = tokio::spawn(gate.run(mutations));

    // A is dispatched at 1s and answers at 6s
    let body = open_message(&document, PHISH);
    tokio::time::sleep(Duration::from_millis(1_500)).await;

    // B replaces A while A's request is still in flight
    document.set_text(body, NEWSLETTER).unwrap();
    document.disconnect();

    let metrics = running.await.unwrap();
    assert_eq!(classifier.call_count(), 2);
    assert_eq!(metrics.suppressed, 1);
    assert_eq!(metrics.stale_discarded, 1);
    assert_eq!(metrics.total_shown(), 0);
    assert_eq!(metrics.total_settled(), metrics.dispatched);
    assert!(document.find_marked(BANNER_MARKER).is_none());
}

#[tokio::test(start_paused = true)]
async fn test_late_verdict_dropped_when_message_turns_short() {
    let document = MemoryDocument::new();
    let mutations = document.observe();
    let mut classifier = MockClassifier::default();
    classifier.add_response("ALPHA", Verdict::threat("Fake account lock", 97.0));
    classifier.add_delay("ALPHA", Duration::from_secs(5));

    let gate = Gate::new(GateConfig::default(), document.clone(), classifier.clone());
    let running = tokio::spawn(gate.run(mutations));

    let body = open_message(&document, PHISH);
    tokio::time::sleep(Duration::from_millis(1_500)).await;

    // Too short to pass the gate, so the epoch does not move
    document.set_text(body, "Thanks, see you!").unwrap();
    document.disconnect();

    let metrics = running.await.unwrap();
    assert_eq!(metrics.dispatched, 1);
    assert_eq!(metrics.skipped_short, 1);
    assert_eq!(metrics.stale_discarded, 1);
    assert_eq!(metrics.total_shown(), 0);
    assert!(document.find_marked(BANNER_MARKER).is_none());
}

#[tokio::test(start_paused = true)]
async fn test_transport_failure_shows_nothing() {
    let document = MemoryDocument::new();
    let mutations = document.observe();
    let mut classifier = MockClassifier::default();
    classifier.add_error("ALPHA");

    let gate = Gate::new(GateConfig::permissive(), document.clone(), classifier);
    let running = tokio::spawn(gate.run(mutations));

    open_message(&document, PHISH);
    document.disconnect();

    let metrics = running.await.unwrap();
    assert_eq!(metrics.failures, 1);
    assert!(document.find_marked(BANNER_MARKER).is_none());
}

#[tokio::test]
async fn test_safe_verdict_strict_vs_permissive() {
    for (config, expect_banner) in [(GateConfig::default(), false), (GateConfig::permissive(), true)] {
        let document = MemoryDocument::new();
        open_message(&document, NEWSLETTER);
        let classifier = MockClassifier::new(Verdict::safe("Internal announcement", 2.0));
        let mut gate = Gate::new(config, document.clone(), classifier.clone());

        let dispatch = gate.extract().unwrap();
        let outcome = classifier.classify(&dispatch.text).await;
        gate.apply(&dispatch, outcome);

        assert_eq!(document.find_marked(BANNER_MARKER).is_some(), expect_banner);
        if expect_banner {
            assert_eq!(banner_class(&document).as_deref(), Some("aegis-safe"));
        }
    }
}

#[tokio::test]
async fn test_invalid_response_is_never_safe() {
    let document = MemoryDocument::new();
    open_message(&document, NEWSLETTER);
    let classifier = MockClassifier::new(AnalysisOutcome::InvalidResponse(
        "Missing or invalid 'is_threat'".to_string(),
    ));
    let mut gate = Gate::new(GateConfig::default(), document.clone(), classifier.clone());

    let dispatch = gate.extract().unwrap();
    let outcome = classifier.classify(&dispatch.text).await;
    gate.apply(&dispatch, outcome);

    assert_eq!(banner_class(&document).as_deref(), Some("aegis-unknown"));
}

#[tokio::test]
async fn test_invalid_response_warning_can_be_disabled() {
    let document = MemoryDocument::new();
    open_message(&document, NEWSLETTER);
    let config = GateConfig {
        warn_on_invalid_response: false,
        ..GateConfig::default()
    };
    let classifier = MockClassifier::new(AnalysisOutcome::InvalidResponse("bad".to_string()));
    let mut gate = Gate::new(config, document.clone(), classifier.clone());

    let dispatch = gate.extract().unwrap();
    let outcome = classifier.classify(&dispatch.text).await;
    gate.apply(&dispatch, outcome);

    assert!(document.find_marked(BANNER_MARKER).is_none());
    assert_eq!(gate.metrics().suppressed, 1);
}

#[tokio::test]
async fn test_banner_goes_on_last_message_and_only_once() {
    let document = MemoryDocument::new();
    open_message(&document, NEWSLETTER);
    let active = open_message(&document, PHISH);
    let classifier = MockClassifier::new(Verdict::threat("Fake account lock", 97.0));
    let mut gate = Gate::new(GateConfig::default(), document.clone(), classifier.clone());

    let dispatch = gate.extract().unwrap();
    assert!(dispatch.text.contains("ALPHA"));

    let outcome = classifier.classify(&dispatch.text).await.unwrap();
    gate.apply(&dispatch, Ok(outcome.clone()));
    gate.apply(&dispatch, Ok(outcome));

    let banner = document.find_marked(BANNER_MARKER).unwrap();
    assert_eq!(document.children(active).first(), Some(&banner));
    assert_eq!(document.query_all("#aegis-x-root").len(), 1);
    assert_eq!(gate.metrics().total_shown(), 1);

    // The banner does not change the message's visible text
    assert_eq!(document.inner_text(active).as_deref(), Some(PHISH));
}

#[tokio::test]
async fn test_switching_message_removes_old_banner() {
    let document = MemoryDocument::new();
    let body = open_message(&document, PHISH);
    let classifier = MockClassifier::new(Verdict::threat("Fake account lock", 97.0));
    let mut gate = Gate::new(GateConfig::default(), document.clone(), classifier.clone());

    let first = gate.extract().unwrap();
    gate.apply(&first, classifier.classify(&first.text).await);
    assert!(document.find_marked(BANNER_MARKER).is_some());

    document.set_text(body, NEWSLETTER).unwrap();
    let second = gate.extract().unwrap();
    assert_eq!(second.epoch, first.epoch + 1);
    assert!(document.find_marked(BANNER_MARKER).is_none());

    // A late answer about the first message stays off the page
    gate.apply(&first, Ok(Verdict::threat("late", 99.0).into()));
    assert!(document.find_marked(BANNER_MARKER).is_none());
    assert_eq!(gate.metrics().stale_discarded, 1);
}

#[tokio::test]
async fn test_verdict_never_lands_on_an_unclassified_message() {
    let document = MemoryDocument::new();
    open_message(&document, PHISH);
    let classifier = MockClassifier::new(Verdict::threat("Fake account lock", 97.0));
    let mut gate = Gate::new(GateConfig::default(), document.clone(), classifier.clone());

    let first = gate.extract().unwrap();

    // A short reply is opened before the answer arrives
    let reply = open_message(&document, "See you at lunch!");
    assert!(gate.extract().is_none());
    assert_eq!(gate.metrics().skipped_short, 1);
    assert!(gate.state().is_current(first.epoch));

    gate.apply(&first, classifier.classify(&first.text).await);

    assert!(document.find_marked(BANNER_MARKER).is_none());
    assert!(document.children(reply).is_empty());
    assert_eq!(document.inner_text(reply).as_deref(), Some("See you at lunch!"));
    assert_eq!(gate.metrics().stale_discarded, 1);
    assert_eq!(gate.metrics().total_shown(), 0);
}

#[tokio::test]
async fn test_verdict_dropped_when_message_closed() {
    let document = MemoryDocument::new();
    let body = open_message(&document, PHISH);
    let classifier = MockClassifier::new(Verdict::threat("Fake account lock", 97.0));
    let mut gate = Gate::new(GateConfig::default(), document.clone(), classifier.clone());

    let dispatch = gate.extract().unwrap();
    assert_eq!(dispatch.container, body);
    document.remove_node(body).unwrap();

    gate.apply(&dispatch, classifier.classify(&dispatch.text).await);
    assert!(document.find_marked(BANNER_MARKER).is_none());
    assert_eq!(gate.metrics().stale_discarded, 1);
}

#[tokio::test]
async fn test_full_css_selector_picks_the_message() {
    let document = MemoryDocument::new();
    let quoted = document
        .append_html(
            document.root(),
            &format!(r#"<div class="thread"><blockquote><div class="a3s aiL">{}</div></blockquote></div>"#, NEWSLETTER),
        )
        .unwrap();
    let thread = document
        .append_html(
            document.root(),
            &format!(r#"<div class="thread"><div class="a3s aiL">{}</div></div>"#, PHISH),
        )
        .unwrap();
    assert_eq!((quoted.len(), thread.len()), (1, 1));

    let config = GateConfig {
        selector: "div.thread > .a3s.aiL".to_string(),
        ..GateConfig::default()
    };
    config.validate().unwrap();
    let classifier = MockClassifier::new(Verdict::threat("Fake account lock", 97.0));
    let mut gate = Gate::new(config, document.clone(), classifier.clone());

    let dispatch = gate.extract().unwrap();
    assert!(dispatch.text.starts_with("URGENT ALPHA"));
    gate.apply(&dispatch, classifier.classify(&dispatch.text).await);

    let banner = document.find_marked(BANNER_MARKER).unwrap();
    assert_eq!(document.children(dispatch.container).first(), Some(&banner));
}

#[tokio::test]
async fn test_notification_presentation() {
    let mut document = MemoryDocument::new();
    open_message(&document, PHISH);
    let config = GateConfig {
        presentation: Presentation::Notification,
        ..GateConfig::default()
    };
    let classifier = MockClassifier::new(Verdict::threat("Fake account lock", 97.0));
    let mut gate = Gate::new(config, document.clone(), classifier.clone());

    let dispatch = gate.extract().unwrap();
    gate.apply(&dispatch, classifier.classify(&dispatch.text).await);

    assert!(document.find_marked(BANNER_MARKER).is_none());
    let alerts = document.alerts();
    assert_eq!(alerts.len(), 1);
    assert!(alerts[0].starts_with("⚠️ PHISHING THREAT DETECTED"));
    assert!(alerts[0].contains("AI Risk Confidence: 97%"));

    document.alert("host notice");
    assert_eq!(document.alerts().len(), 2);
}

#[tokio::test]
async fn test_only_sanitized_text_leaves() {
    let document = MemoryDocument::new();
    open_message(&document, PHISH);
    let classifier = MockClassifier::default();
    let mut gate = Gate::new(GateConfig::default(), document.clone(), classifier.clone());

    let dispatch = gate.extract().unwrap();
    classifier.classify(&dispatch.text).await.unwrap();

    let sent = &classifier.requests()[0];
    assert_eq!(
        sent,
        "URGENT ALPHA: account {{ACC_NUM}} is locked. Send {{MONEY_VAL}} to {{PHONE_ID}} to restore access."
    );
    assert!(!sent.contains("0712345678"));
    assert!(!sent.contains("1234567890123"));
    assert_eq!(gate.metrics().redacted_tokens, 3);
}

#[test]
fn test_no_active_message() {
    let document = MemoryDocument::new();
    let mut gate = Gate::new(GateConfig::default(), document, MockClassifier::default());

    assert!(gate.extract().is_none());
    assert_eq!(gate.metrics().no_match, 1);
    assert_eq!(gate.state().epoch(), 0);
}
