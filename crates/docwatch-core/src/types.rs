//! Core domain types for docwatch.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use uuid::Uuid;

/// Unique identifier for documents (content hash).
pub type DocumentId = String;

/// Unique identifier for embedding chunks.
pub type ChunkId = String;

/// Generate a fresh chunk identifier.
///
/// Chunk ids are random, not content-derived, so they are not stable
/// across recomputation of the same document.
pub fn new_chunk_id() -> ChunkId {
    Uuid::new_v4().to_string()
}

/// Broad content family of a file, derived from its extension's MIME family.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DocumentType {
    Audio,
    Image,
    Video,
    Document,
    Unknown,
}

impl DocumentType {
    pub fn as_str(&self) -> &'static str {
        match self {
            DocumentType::Audio => "audio",
            DocumentType::Image => "image",
            DocumentType::Video => "video",
            DocumentType::Document => "document",
            DocumentType::Unknown => "unknown",
        }
    }

    /// Classify a file extension into a document type.
    ///
    /// Office, PDF, CSV and XML family extensions all map to `Document`;
    /// anything recognizable as text does too. Unrecognized extensions fall
    /// back to `Document` as the safe default, only a missing extension is
    /// `Unknown`.
    pub fn from_extension(ext: &str) -> Self {
        match ext.trim_start_matches('.').to_lowercase().as_str() {
            "" => DocumentType::Unknown,
            // Audio formats
            "mp3" | "wav" | "m4a" | "flac" | "ogg" | "aac" => DocumentType::Audio,
            // Image formats
            "png" | "jpg" | "jpeg" | "gif" | "webp" | "bmp" | "tif" | "tiff" => {
                DocumentType::Image
            }
            // Video formats
            "mp4" | "mov" | "mkv" | "webm" | "avi" | "m4v" => DocumentType::Video,
            // Text, office, PDF, CSV, XML families
            "txt" | "md" | "markdown" | "rtf" | "pdf" | "doc" | "docx" | "odt" | "xls"
            | "xlsx" | "ods" | "ppt" | "pptx" | "odp" | "csv" | "tsv" | "xml" | "html"
            | "json" | "yaml" | "yml" => DocumentType::Document,
            _ => DocumentType::Document,
        }
    }
}

impl std::fmt::Display for DocumentType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Recognition outcome for a document.
///
/// Downstream consumers expect the historical sentinel encoding on the wire
/// (-1 not attempted, 0 attempted and failed, 10000 fully recognized), so
/// serde maps this enum to those integers. It is a tri-state, never a score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RecognitionQuality {
    #[default]
    Unattempted,
    Failed,
    Recognized,
}

impl RecognitionQuality {
    pub const fn as_sentinel(self) -> i32 {
        match self {
            RecognitionQuality::Unattempted => -1,
            RecognitionQuality::Failed => 0,
            RecognitionQuality::Recognized => 10_000,
        }
    }

    pub fn from_sentinel(value: i32) -> Self {
        match value {
            10_000 => RecognitionQuality::Recognized,
            0 => RecognitionQuality::Failed,
            _ => RecognitionQuality::Unattempted,
        }
    }
}

impl Serialize for RecognitionQuality {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_i32(self.as_sentinel())
    }
}

impl<'de> Deserialize<'de> for RecognitionQuality {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        i32::deserialize(deserializer).map(Self::from_sentinel)
    }
}

/// One embedded text chunk of a document.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Embedding {
    pub chunk_id: ChunkId,
    pub text_chunk: String,
    pub vector: Vec<f32>,
}

impl Embedding {
    pub fn new(text_chunk: impl Into<String>, vector: Vec<f32>) -> Self {
        Self {
            chunk_id: new_chunk_id(),
            text_chunk: text_chunk.into(),
            vector,
        }
    }
}

/// The in-flight record describing one file through recognition, embedding
/// and persistence. Created by the enumerator, owned by exactly one
/// processing task for its lifetime.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Document {
    /// Exact content hash; recomputed over recognized text after OCR.
    pub document_id: DocumentId,
    /// Fuzzy similarity hash, advisory only; empty when unavailable.
    #[serde(default)]
    pub ssdeep_hash: String,
    /// Logical name of the watch root this document came from.
    pub folder_id: String,
    pub folder_path: String,
    pub document_path: String,
    pub document_name: String,
    pub document_extension: String,
    pub size: u64,
    /// Octal permission bits, e.g. "644".
    pub permissions: String,
    pub created_at: DateTime<Utc>,
    pub modified_at: DateTime<Utc>,
    pub document_type: DocumentType,
    /// Free-text topic label, set by summarization.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub document_class: Option<String>,
    /// Extracted text, mutated in place as stages run.
    #[serde(default)]
    pub content: String,
    pub quality_recognized: RecognitionQuality,
    #[serde(default)]
    pub embeddings: Vec<Embedding>,
}

impl Document {
    pub fn new(folder_id: impl Into<String>, document_path: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            document_id: String::new(),
            ssdeep_hash: String::new(),
            folder_id: folder_id.into(),
            folder_path: String::new(),
            document_path: document_path.into(),
            document_name: String::new(),
            document_extension: String::new(),
            size: 0,
            permissions: String::new(),
            created_at: now,
            modified_at: now,
            document_type: DocumentType::Unknown,
            document_class: None,
            content: String::new(),
            quality_recognized: RecognitionQuality::Unattempted,
            embeddings: Vec::new(),
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.document_name = name.into();
        self
    }

    pub fn with_extension(mut self, ext: impl Into<String>) -> Self {
        let ext = ext.into();
        self.document_type = DocumentType::from_extension(&ext);
        self.document_extension = ext;
        self
    }

    /// Append one embedded chunk with a freshly generated chunk id.
    pub fn push_chunk(&mut self, text: impl Into<String>, vector: Vec<f32>) {
        self.embeddings.push(Embedding::new(text, vector));
    }
}
