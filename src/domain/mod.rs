//! Domain data structures: documents, derived content, transcript entries.

pub mod content;
pub mod document;
pub mod message;
pub mod mindmap;

pub use content::{ContentPayload, ContentType, Flashcard, GeneratedContent};
pub use document::{Document, ProcessingStatus};
pub use message::{ChatMessage, Role, Source};
pub use mindmap::{MindMap, MindMapEdge, MindMapError, MindMapNode};
