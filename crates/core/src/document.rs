use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Unique document identifier.
pub type DocumentId = Uuid;

/// Unique chunk identifier.
pub type ChunkId = Uuid;

/// Source formats the pipeline accepts, keyed by filename extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FileType {
    Pdf,
    Docx,
    Txt,
    Md,
}

impl FileType {
    /// Detect from the filename extension (case-insensitive).
    /// Returns None for unknown or missing extensions.
    pub fn from_filename(filename: &str) -> Option<Self> {
        let (_, ext) = filename.rsplit_once('.')?;
        match ext.to_lowercase().as_str() {
            "pdf" => Some(FileType::Pdf),
            "docx" => Some(FileType::Docx),
            "txt" | "text" => Some(FileType::Txt),
            "md" | "markdown" => Some(FileType::Md),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            FileType::Pdf => "pdf",
            FileType::Docx => "docx",
            FileType::Txt => "txt",
            FileType::Md => "md",
        }
    }
}

impl fmt::Display for FileType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Processing state of an ingested document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DocumentStatus {
    Processing,
    Completed,
    Failed,
}

impl fmt::Display for DocumentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            DocumentStatus::Processing => "processing",
            DocumentStatus::Completed => "completed",
            DocumentStatus::Failed => "failed",
        };
        f.write_str(s)
    }
}

/// An ingested source document and its processing state.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Document {
    pub id: DocumentId,
    pub filename: String,
    pub file_type: FileType,
    /// Size of the uploaded file in bytes.
    pub file_size: u64,
    pub status: DocumentStatus,
    /// Number of chunks produced (0 until processing completes).
    pub chunk_count: usize,
    /// Character count of the extracted text.
    pub extracted_chars: usize,
    /// Populated when status is Failed.
    pub error_message: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Document {
    /// Create a new document in the Processing state.
    pub fn new(filename: impl Into<String>, file_type: FileType, file_size: u64) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            filename: filename.into(),
            file_type,
            file_size,
            status: DocumentStatus::Processing,
            chunk_count: 0,
            extracted_chars: 0,
            error_message: None,
            created_at: now,
            updated_at: now,
        }
    }
}

/// The persisted rendering of one chunk: the chunker's output plus identity.
/// `chunk_index` is the chunk's position in the document's emission order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChunkRecord {
    pub id: ChunkId,
    pub document_id: DocumentId,
    pub chunk_index: usize,
    pub text: String,
    pub token_count: usize,
}
