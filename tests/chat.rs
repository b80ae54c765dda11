//! Chat Engine Integration Tests
//!
//! Wires the engine to the mock retriever over a real store and checks
//! the transcript contract end to end.

use std::sync::Arc;
use std::time::Duration;

use docmind::adapters::MockRetriever;
use docmind::chat::{ChatEngine, SendOutcome};
use docmind::pipeline::{PipelineSimulator, StageDelays};
use docmind::store::{DocumentStore, JsonStore};
use docmind::{Role, Uploader};
use tempfile::TempDir;
use uuid::Uuid;

const OWNER: &str = "user@example.com";

struct Fixture {
    store: Arc<JsonStore>,
    _temp: TempDir,
}

impl Fixture {
    async fn new() -> Self {
        let temp = TempDir::new().unwrap();
        let store = Arc::new(JsonStore::open(temp.path()).await.unwrap());
        Self { store, _temp: temp }
    }

    /// Engine over the mock retriever with no simulated latency
    fn engine(&self) -> ChatEngine {
        let retriever = MockRetriever::new(self.store.clone() as Arc<dyn DocumentStore>, OWNER)
            .with_thinking(Duration::ZERO);
        ChatEngine::new(Arc::new(retriever))
    }

    /// Seed the demonstration documents, returning the queryable ids
    async fn seeded_completed_ids(&self) -> Vec<Uuid> {
        let simulator =
            PipelineSimulator::new(self.store.clone() as Arc<dyn DocumentStore>);
        simulator
            .ensure_seeded(OWNER)
            .await
            .unwrap()
            .into_iter()
            .filter(|d| d.is_queryable())
            .map(|d| d.id)
            .collect()
    }
}

#[tokio::test]
async fn test_two_sequential_sends_keep_exact_transcript_order() {
    let fixture = Fixture::new().await;
    let ids = fixture.seeded_completed_ids().await;
    let engine = fixture.engine();
    engine.select_all(ids);

    assert_eq!(engine.send("What is covered?").await, SendOutcome::Sent);
    assert_eq!(engine.send("How do I apply it?").await, SendOutcome::Sent);

    let messages = engine.messages();
    assert_eq!(messages.len(), 4);
    assert_eq!(messages[0].role, Role::User);
    assert_eq!(messages[0].content, "What is covered?");
    assert_eq!(messages[1].role, Role::Assistant);
    assert_eq!(messages[2].role, Role::User);
    assert_eq!(messages[2].content, "How do I apply it?");
    assert_eq!(messages[3].role, Role::Assistant);

    // Issuance order, not arrival order: each reply's timestamp is not
    // earlier than its prompt's.
    assert!(messages[1].timestamp >= messages[0].timestamp);
    assert!(messages[2].timestamp >= messages[1].timestamp);
}

#[tokio::test]
async fn test_empty_selection_executes_even_with_zero_completed_documents() {
    let fixture = Fixture::new().await;
    let engine = fixture.engine();

    // No documents at all for this owner, empty selection: the query
    // still runs (selection-independent), just with no citations.
    assert_eq!(engine.send("What is X?").await, SendOutcome::Sent);

    let messages = engine.messages();
    assert_eq!(messages.len(), 2);
    assert_eq!(messages[1].role, Role::Assistant);
    assert!(messages[1].sources.is_empty());
}

#[tokio::test]
async fn test_blank_query_leaves_transcript_unchanged() {
    let fixture = Fixture::new().await;
    let engine = fixture.engine();

    assert_eq!(engine.send("").await, SendOutcome::EmptyQuery);
    assert_eq!(engine.send("  \t ").await, SendOutcome::EmptyQuery);
    assert_eq!(engine.messages().len(), 0);
}

#[tokio::test]
async fn test_stale_selection_becomes_assistant_error_turn() {
    let fixture = Fixture::new().await;
    let engine = fixture.engine();

    // A document id that was never registered (e.g. deleted elsewhere).
    engine.toggle_document(Uuid::new_v4());

    assert_eq!(engine.send("What is X?").await, SendOutcome::Sent);

    let messages = engine.messages();
    assert_eq!(messages.len(), 2);
    assert_eq!(messages[0].role, Role::User);
    assert_eq!(messages[1].role, Role::Assistant);
    assert!(messages[1].content.starts_with("Error:"));
    assert!(messages[1].content.contains("not found"));
}

#[tokio::test]
async fn test_sources_cite_selected_documents() {
    let fixture = Fixture::new().await;
    let ids = fixture.seeded_completed_ids().await;
    assert_eq!(ids.len(), 2);

    let engine = fixture.engine();
    engine.select_all(ids.clone());

    engine.send("What are the key concepts?").await;

    let messages = engine.messages();
    let sources = &messages[1].sources;
    assert_eq!(sources.len(), 2);
    assert!(ids.contains(&sources[0].document_id));
    assert!(ids.contains(&sources[1].document_id));

    // Scores descend and stay within [0, 1].
    let first = sources[0].score.unwrap();
    let second = sources[1].score.unwrap();
    assert!(first > second);
    assert!((0.0..=1.0).contains(&first) && (0.0..=1.0).contains(&second));
}

#[tokio::test(start_paused = true)]
async fn test_upload_then_query_round_trip() {
    let temp = TempDir::new().unwrap();
    let store = Arc::new(JsonStore::open(temp.path().join("store")).await.unwrap());
    let simulator = Arc::new(PipelineSimulator::with_delays(
        store.clone() as Arc<dyn DocumentStore>,
        StageDelays {
            upload: Duration::from_secs(2),
            processing: Duration::from_secs(3),
        },
    ));
    let uploader = Uploader::new(simulator, temp.path().join("uploads"), 1024 * 1024);

    let receipt = uploader
        .upload(OWNER, "lecture.pdf", b"%PDF-1.7\nlecture body")
        .await
        .unwrap();

    // Let the pipeline finish, then query the new document.
    tokio::time::sleep(Duration::from_secs(6)).await;

    let retriever = MockRetriever::new(store.clone() as Arc<dyn DocumentStore>, OWNER)
        .with_thinking(Duration::ZERO);
    let engine = ChatEngine::new(Arc::new(retriever));
    engine.toggle_document(receipt.document_id);

    assert_eq!(engine.send("What is this lecture about?").await, SendOutcome::Sent);

    let messages = engine.messages();
    assert_eq!(messages[1].role, Role::Assistant);
    assert_eq!(messages[1].sources[0].document_id, receipt.document_id);
}
