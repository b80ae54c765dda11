//! Conversational querying over processed documents.

pub mod engine;

pub use engine::{ChatEngine, SendOutcome};
