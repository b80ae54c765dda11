//! Synthesis of derived artifacts.
//!
//! Stands in for the real extraction backend: deposits a deterministic
//! summary, mind map, and flashcard deck for a completed document.

use uuid::Uuid;

use crate::domain::{
    ContentPayload, Flashcard, GeneratedContent, MindMap, MindMapNode,
};

/// Summary text synthesized for a document
pub fn sample_summary(filename: &str) -> String {
    format!(
        "This is a comprehensive summary of {filename}. The document covers \
key concepts and provides detailed explanations of important topics.\n\n\
Key Points:\n\
- Fundamental principles and their applications\n\
- Practical examples and use cases\n\
- Best practices and recommendations\n\n\
The content is well-structured and provides valuable insights for learners \
at all levels."
    )
}

/// A three-level, eight-node forest rooted at the document's main topic
pub fn sample_mindmap() -> MindMap {
    MindMap::new(vec![
        MindMapNode::root("1", "Main Topic"),
        MindMapNode::child("2", "Concept 1", "1"),
        MindMapNode::child("3", "Concept 2", "1"),
        MindMapNode::child("4", "Concept 3", "1"),
        MindMapNode::child("5", "Subtopic 1.1", "2"),
        MindMapNode::child("6", "Subtopic 1.2", "2"),
        MindMapNode::child("7", "Subtopic 2.1", "3"),
        MindMapNode::child("8", "Subtopic 3.1", "4"),
    ])
    .expect("static sample forest is valid")
}

/// A five-card question/answer deck
pub fn sample_flashcards() -> Vec<Flashcard> {
    vec![
        Flashcard::new(
            "What is the main concept discussed in this document?",
            "The document discusses fundamental principles and their practical applications in the field.",
        ),
        Flashcard::new(
            "What are the key benefits mentioned?",
            "The key benefits include improved understanding, practical implementation strategies, and real-world applications.",
        ),
        Flashcard::new(
            "What best practices are recommended?",
            "The document recommends following industry standards, continuous learning, and practical experimentation.",
        ),
        Flashcard::new(
            "How can this knowledge be applied?",
            "This knowledge can be applied through hands-on projects, collaborative work, and iterative improvement.",
        ),
        Flashcard::new(
            "What are the common challenges?",
            "Common challenges include initial complexity, resource requirements, and the learning curve for beginners.",
        ),
    ]
}

/// Build the full artifact triple for a document: exactly one record per
/// content type.
pub fn generate_set(document_id: Uuid, owner: &str, filename: &str) -> Vec<GeneratedContent> {
    vec![
        GeneratedContent::new(
            document_id,
            owner,
            ContentPayload::Summary {
                summary: sample_summary(filename),
            },
        ),
        GeneratedContent::new(document_id, owner, ContentPayload::Mindmap(sample_mindmap())),
        GeneratedContent::new(
            document_id,
            owner,
            ContentPayload::Flashcards {
                flashcards: sample_flashcards(),
            },
        ),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ContentType;
    use std::collections::HashSet;

    #[test]
    fn test_generate_set_covers_each_type_once() {
        let id = Uuid::new_v4();
        let set = generate_set(id, "user@example.com", "notes.pdf");

        assert_eq!(set.len(), 3);

        let types: HashSet<ContentType> = set.iter().map(|c| c.content_type()).collect();
        assert_eq!(types.len(), 3);
        assert!(set.iter().all(|c| c.document_id == id));
    }

    #[test]
    fn test_sample_mindmap_levels() {
        let map = sample_mindmap();
        let levels = map.levels();

        assert_eq!(map.roots().len(), 1);
        assert_eq!(levels["1"], 0);
        assert_eq!(levels["2"], 1);
        assert_eq!(levels["5"], 2);
        assert_eq!(map.edges().len(), 7);
    }

    #[test]
    fn test_summary_mentions_filename() {
        let text = sample_summary("linear-algebra.pdf");
        assert!(text.contains("linear-algebra.pdf"));
    }
}
