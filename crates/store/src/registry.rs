use std::collections::HashMap;

use chrono::Utc;
use papier_core::{ChunkRecord, Document, DocumentId, DocumentStatus};

/// In-memory bookkeeping for ingested documents and their chunk records.
///
/// Methods are synchronous and take `&mut self`; callers share the registry
/// behind a lock.
pub struct DocumentRegistry {
    documents: HashMap<DocumentId, Document>,
    chunks: HashMap<DocumentId, Vec<ChunkRecord>>,
}

impl DocumentRegistry {
    pub fn new() -> Self {
        Self {
            documents: HashMap::new(),
            chunks: HashMap::new(),
        }
    }

    /// Register a document, typically still in `Processing` state.
    pub fn insert(&mut self, document: Document) {
        self.documents.insert(document.id, document);
    }

    /// Flip a document to `Completed` and record what ingestion produced.
    /// Returns false when the id is unknown.
    pub fn mark_completed(
        &mut self,
        id: DocumentId,
        extracted_chars: usize,
        chunk_records: Vec<ChunkRecord>,
    ) -> bool {
        let Some(document) = self.documents.get_mut(&id) else {
            return false;
        };
        document.status = DocumentStatus::Completed;
        document.chunk_count = chunk_records.len();
        document.extracted_chars = extracted_chars;
        document.error_message = None;
        document.updated_at = Utc::now();
        self.chunks.insert(id, chunk_records);
        true
    }

    /// Flip a document to `Failed`, keeping the reason for later inspection.
    /// Returns false when the id is unknown.
    pub fn mark_failed(&mut self, id: DocumentId, message: &str) -> bool {
        let Some(document) = self.documents.get_mut(&id) else {
            return false;
        };
        document.status = DocumentStatus::Failed;
        document.error_message = Some(message.to_string());
        document.updated_at = Utc::now();
        true
    }

    pub fn get(&self, id: &DocumentId) -> Option<&Document> {
        self.documents.get(id)
    }

    /// All documents, newest first.
    pub fn list(&self) -> Vec<&Document> {
        let mut documents: Vec<&Document> = self.documents.values().collect();
        documents.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        documents
    }

    pub fn chunks_for(&self, id: &DocumentId) -> Option<&[ChunkRecord]> {
        self.chunks.get(id).map(Vec::as_slice)
    }

    /// Drop a document and its chunk records. Returns the removed document.
    pub fn remove(&mut self, id: &DocumentId) -> Option<Document> {
        self.chunks.remove(id);
        self.documents.remove(id)
    }

    pub fn len(&self) -> usize {
        self.documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use papier_core::FileType;
    use uuid::Uuid;

    fn doc(filename: &str) -> Document {
        Document::new(filename.to_string(), FileType::Txt, 100)
    }

    fn chunk_record(document_id: DocumentId, index: usize) -> ChunkRecord {
        ChunkRecord {
            id: Uuid::new_v4(),
            document_id,
            chunk_index: index,
            text: format!("chunk {index}"),
            token_count: 10,
        }
    }

    #[test]
    fn insert_and_get_round_trip() {
        let mut registry = DocumentRegistry::new();
        let document = doc("a.txt");
        let id = document.id;
        registry.insert(document);

        let fetched = registry.get(&id).unwrap();
        assert_eq!(fetched.filename, "a.txt");
        assert_eq!(fetched.status, DocumentStatus::Processing);
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn mark_completed_updates_status_and_counts() {
        let mut registry = DocumentRegistry::new();
        let document = doc("b.txt");
        let id = document.id;
        registry.insert(document);

        let records = vec![chunk_record(id, 0), chunk_record(id, 1)];
        assert!(registry.mark_completed(id, 1234, records));

        let fetched = registry.get(&id).unwrap();
        assert_eq!(fetched.status, DocumentStatus::Completed);
        assert_eq!(fetched.chunk_count, 2);
        assert_eq!(fetched.extracted_chars, 1234);
        assert!(fetched.error_message.is_none());
        assert_eq!(registry.chunks_for(&id).unwrap().len(), 2);
    }

    #[test]
    fn mark_failed_keeps_the_reason() {
        let mut registry = DocumentRegistry::new();
        let document = doc("c.pdf");
        let id = document.id;
        registry.insert(document);

        assert!(registry.mark_failed(id, "no extractable text"));

        let fetched = registry.get(&id).unwrap();
        assert_eq!(fetched.status, DocumentStatus::Failed);
        assert_eq!(fetched.error_message.as_deref(), Some("no extractable text"));
    }

    #[test]
    fn marking_unknown_ids_is_a_no_op() {
        let mut registry = DocumentRegistry::new();
        assert!(!registry.mark_completed(Uuid::new_v4(), 0, Vec::new()));
        assert!(!registry.mark_failed(Uuid::new_v4(), "nope"));
    }

    #[test]
    fn list_is_newest_first() {
        let mut registry = DocumentRegistry::new();
        let mut first = doc("old.txt");
        first.created_at = first.created_at - Duration::seconds(60);
        let mut second = doc("mid.txt");
        second.created_at = second.created_at - Duration::seconds(30);
        let third = doc("new.txt");

        registry.insert(first);
        registry.insert(second);
        registry.insert(third);

        let names: Vec<&str> = registry.list().iter().map(|d| d.filename.as_str()).collect();
        assert_eq!(names, vec!["new.txt", "mid.txt", "old.txt"]);
    }

    #[test]
    fn remove_drops_document_and_chunks() {
        let mut registry = DocumentRegistry::new();
        let document = doc("d.md");
        let id = document.id;
        registry.insert(document);
        registry.mark_completed(id, 10, vec![chunk_record(id, 0)]);

        let removed = registry.remove(&id).unwrap();
        assert_eq!(removed.filename, "d.md");
        assert!(registry.get(&id).is_none());
        assert!(registry.chunks_for(&id).is_none());
        assert!(registry.is_empty());
    }

    #[test]
    fn remove_unknown_returns_none() {
        let mut registry = DocumentRegistry::new();
        assert!(registry.remove(&Uuid::new_v4()).is_none());
    }
}
