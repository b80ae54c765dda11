//! Conversational query engine.
//!
//! Owns the transcript and the document selection, and executes one
//! retrieval request at a time. The user's turn is appended before the
//! request is issued (optimistic write); success and failure both
//! resolve into exactly one assistant turn, so the transcript never
//! desynchronizes from the request stream.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use tracing::debug;
use uuid::Uuid;

use crate::adapters::Retriever;
use crate::domain::ChatMessage;

/// Result of a [`ChatEngine::send`] call.
///
/// `send` never fails: a retrieval error becomes an assistant message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SendOutcome {
    /// User turn and its assistant reply were appended
    Sent,

    /// Blank or whitespace-only input; transcript untouched
    EmptyQuery,

    /// A query is already in flight; transcript untouched
    Busy,
}

#[derive(Default)]
struct EngineState {
    transcript: Vec<ChatMessage>,

    /// Insertion-ordered, deduplicated document ids scoping queries;
    /// empty means "search all eligible documents"
    selection: Vec<Uuid>,
}

/// Transcript + selection manager with a one-query-in-flight invariant
pub struct ChatEngine {
    retriever: Arc<dyn Retriever>,

    /// Locked only for short synchronous sections, never across an await
    state: Mutex<EngineState>,

    in_flight: AtomicBool,
}

/// Releases the in-flight slot even if the retrieval future panics
struct InFlightGuard<'a>(&'a AtomicBool);

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

impl ChatEngine {
    pub fn new(retriever: Arc<dyn Retriever>) -> Self {
        Self {
            retriever,
            state: Mutex::new(EngineState::default()),
            in_flight: AtomicBool::new(false),
        }
    }

    /// Issue a query scoped to the current selection.
    ///
    /// The user message is visible in the transcript before the request
    /// resolves; the matching assistant message (answer or error text)
    /// is appended when it does. Rejected calls leave no trace.
    pub async fn send(&self, query: &str) -> SendOutcome {
        let query = query.trim();
        if query.is_empty() {
            return SendOutcome::EmptyQuery;
        }

        if self
            .in_flight
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            debug!("Rejecting send: query already in flight");
            return SendOutcome::Busy;
        }
        let _guard = InFlightGuard(&self.in_flight);

        let selection = {
            let mut state = self.state.lock().expect("engine state lock");
            state.transcript.push(ChatMessage::user(query));
            state.selection.clone()
        };

        let message = match self.retriever.query(query, &selection).await {
            Ok(response) => ChatMessage::assistant(response.answer, response.sources),
            Err(e) => ChatMessage::assistant(format!("Error: {}", e), Vec::new()),
        };

        self.state
            .lock()
            .expect("engine state lock")
            .transcript
            .push(message);

        SendOutcome::Sent
    }

    /// Empty the transcript; the selection is untouched
    pub fn clear(&self) {
        self.state.lock().expect("engine state lock").transcript.clear();
    }

    /// Add the document to the selection, or remove it if present
    pub fn toggle_document(&self, id: Uuid) {
        let mut state = self.state.lock().expect("engine state lock");
        if let Some(position) = state.selection.iter().position(|&d| d == id) {
            state.selection.remove(position);
        } else {
            state.selection.push(id);
        }
    }

    /// Replace the selection wholesale (deduplicated, order kept)
    pub fn select_all(&self, ids: impl IntoIterator<Item = Uuid>) {
        let mut state = self.state.lock().expect("engine state lock");
        state.selection.clear();
        for id in ids {
            if !state.selection.contains(&id) {
                state.selection.push(id);
            }
        }
    }

    pub fn clear_selection(&self) {
        self.state.lock().expect("engine state lock").selection.clear();
    }

    pub fn selection(&self) -> Vec<Uuid> {
        self.state.lock().expect("engine state lock").selection.clone()
    }

    /// Snapshot of the transcript in issuance order
    pub fn messages(&self) -> Vec<ChatMessage> {
        self.state.lock().expect("engine state lock").transcript.clone()
    }

    pub fn is_busy(&self) -> bool {
        self.in_flight.load(Ordering::SeqCst)
    }
}
