//! Envelope contract of the research facade, driven by a stub engine

use async_trait::async_trait;
use researchdesk_agent::facade::{HEALTH_QUERY, MIN_ANSWER_LEN};
use researchdesk_agent::{
    Answer, EngineError, InitError, ResearchEngine, ResearchFacade, ResearchService, Transcript,
};
use researchdesk_provider::{Message, ProviderError};
use serde_json::{json, Value};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

#[derive(Clone)]
enum Behavior {
    Tools(Vec<Message>),
    RateLimited,
}

struct StubEngine {
    behavior: Behavior,
    calls: Arc<AtomicUsize>,
    last_input: Arc<Mutex<Vec<Message>>>,
}

#[async_trait]
impl ResearchEngine for StubEngine {
    async fn run(&self, messages: Vec<Message>) -> Result<Transcript, EngineError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        *self.last_input.lock().unwrap() = messages.clone();

        match &self.behavior {
            Behavior::RateLimited => Err(ProviderError::RateLimited.into()),
            Behavior::Tools(tool_messages) => {
                let mut transcript = messages;
                transcript.extend(tool_messages.iter().cloned());
                transcript.push(Message::assistant("{}"));
                Ok(Transcript::new(transcript))
            }
        }
    }
}

struct Harness {
    facade: ResearchFacade,
    calls: Arc<AtomicUsize>,
    last_input: Arc<Mutex<Vec<Message>>>,
}

fn harness(behavior: Behavior) -> Harness {
    let calls = Arc::new(AtomicUsize::new(0));
    let last_input = Arc::new(Mutex::new(Vec::new()));
    let engine = StubEngine {
        behavior,
        calls: calls.clone(),
        last_input: last_input.clone(),
    };
    Harness {
        facade: ResearchFacade::from_init(Ok(ResearchService::new(engine))),
        calls,
        last_input,
    }
}

fn full_run() -> Behavior {
    Behavior::Tools(vec![
        Message::tool(
            "c1",
            "wikipedia",
            "Artificial intelligence is the capability of computational systems to perform tasks.",
        ),
        Message::tool(
            "c2",
            "arxiv_papers",
            json!([{"title": "Deep Learning", "summary": "A review.", "url": "http://arxiv.org/pdf/1"}])
                .to_string(),
        ),
        Message::tool("c3", "news_search", "❌ No articles found for this query."),
    ])
}

fn envelope_json(envelope: &researchdesk_agent::ResponseEnvelope) -> Value {
    serde_json::to_value(envelope).unwrap()
}

#[tokio::test]
async fn test_successful_search_aggregates_tools() {
    let h = harness(full_run());
    let envelope = h.facade.search("  What is AI?  ").await;

    assert!(envelope.is_success());
    assert_eq!(envelope.query(), "What is AI?");
    assert!(envelope.error().is_none());

    let value = envelope_json(&envelope);
    assert!(value["answer"]["background"]
        .as_str()
        .unwrap()
        .starts_with("Artificial intelligence"));
    assert_eq!(value["answer"]["papers"][0]["title"], "Deep Learning");
    assert_eq!(value["answer"]["news"], "❌ No articles found for this query.");
}

#[tokio::test]
async fn test_engine_receives_one_wrapped_user_message() {
    let h = harness(full_run());
    h.facade.search("  quantum dots ").await;

    let input = h.last_input.lock().unwrap().clone();
    assert_eq!(input.len(), 1);
    assert_eq!(input[0].role, "user");
    assert!(input[0]
        .content
        .as_deref()
        .unwrap()
        .starts_with("Research Query: quantum dots\n"));
}

#[tokio::test]
async fn test_answer_is_three_keys_or_string() {
    for behavior in [full_run(), Behavior::Tools(vec![]), Behavior::RateLimited] {
        let h = harness(behavior);
        let value = envelope_json(&h.facade.search("topic").await);
        match &value["answer"] {
            Value::Object(map) => {
                let mut keys: Vec<&str> = map.keys().map(String::as_str).collect();
                keys.sort_unstable();
                assert_eq!(keys, vec!["background", "news", "papers"]);
            }
            Value::String(_) => {}
            other => panic!("unexpected answer: {}", other),
        }
    }
}

#[tokio::test]
async fn test_empty_query_is_rejected_without_engine_call() {
    let h = harness(full_run());

    for query in ["", "   ", "\n\t"] {
        let envelope = h.facade.search(query).await;
        assert!(!envelope.is_success());
        assert_eq!(envelope.error(), Some("empty query"));
        assert_eq!(
            envelope.answer(),
            &Answer::Message("Please provide a research question.".to_string())
        );
    }
    assert_eq!(h.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_no_tool_messages_yield_defaults() {
    let h = harness(Behavior::Tools(vec![]));
    let value = envelope_json(&h.facade.search("anything").await);

    assert_eq!(
        value["answer"],
        json!({"background": "...", "papers": [], "news": []})
    );
}

#[tokio::test]
async fn test_encyclopedia_only_run() {
    let h = harness(Behavior::Tools(vec![Message::tool("c1", "wikipedia", "X")]));
    let value = envelope_json(&h.facade.search("x").await);

    assert_eq!(
        value["answer"],
        json!({"background": "X", "papers": [], "news": []})
    );
}

#[tokio::test]
async fn test_list_shaped_encyclopedia_text_stays_a_string() {
    let h = harness(Behavior::Tools(vec![Message::tool("c1", "wikipedia", "[]")]));
    let value = envelope_json(&h.facade.search("x").await);

    assert_eq!(
        value["answer"],
        json!({"background": "[]", "papers": [], "news": []})
    );
}

#[tokio::test]
async fn test_no_papers_message_lands_in_papers() {
    let h = harness(Behavior::Tools(vec![Message::tool(
        "c1",
        "arxiv_papers",
        "❌ No papers found for this query.",
    )]));
    let value = envelope_json(&h.facade.search("x").await);

    assert_eq!(value["answer"]["papers"], "❌ No papers found for this query.");
}

#[tokio::test]
async fn test_engine_error_becomes_failure_envelope() {
    let h = harness(Behavior::RateLimited);
    let envelope = h.facade.search("climate").await;

    assert!(!envelope.is_success());
    assert_eq!(envelope.error(), Some("rate limit exceeded"));
    assert_eq!(envelope.query(), "climate");
    match envelope.answer() {
        Answer::Message(text) => {
            assert_eq!(text, "Research error: rate limit exceeded");
        }
        Answer::Result(_) => panic!("failure must not carry a result"),
    }
}

#[tokio::test]
async fn test_identical_queries_give_identical_envelopes() {
    let h = harness(full_run());

    let first = serde_json::to_string(&h.facade.search("graph neural networks").await).unwrap();
    let second = serde_json::to_string(&h.facade.search("graph neural networks").await).unwrap();

    assert_eq!(first, second);
    assert_eq!(h.calls.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn test_unavailable_facade_never_runs() {
    let facade = ResearchFacade::from_init(Err(InitError::MissingCredential));

    for query in ["What is AI?", ""] {
        let envelope = facade.search(query).await;
        assert!(!envelope.is_success());
        assert_eq!(envelope.error(), Some("not initialized"));
        assert_eq!(
            envelope.answer(),
            &Answer::Message("Research service unavailable.".to_string())
        );
    }
    assert_eq!(facade.init_error(), Some(&InitError::MissingCredential));
}

#[tokio::test]
async fn test_health_check_healthy_with_content() {
    let h = harness(full_run());
    let report = h.facade.health_check().await;

    assert!(report.healthy);
    assert!(report.answer_len > MIN_ANSWER_LEN);
    assert!(report.error.is_none());

    let input = h.last_input.lock().unwrap().clone();
    assert!(input[0].content.as_deref().unwrap().contains(HEALTH_QUERY));
}

#[tokio::test]
async fn test_health_check_unhealthy_with_defaults_only() {
    let h = harness(Behavior::Tools(vec![]));
    let report = h.facade.health_check().await;

    assert!(!report.healthy);
    assert!(report.answer_len <= MIN_ANSWER_LEN);
}

#[tokio::test]
async fn test_health_check_unhealthy_when_unavailable() {
    let facade = ResearchFacade::from_init(Err(InitError::NoTools));
    let report = facade.health_check().await;

    assert!(!report.healthy);
    assert_eq!(report.error.as_deref(), Some("not initialized"));
}
