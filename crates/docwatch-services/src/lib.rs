//! Docwatch Services - Clients for the external collaborators of the watch
//! pipeline: OCR, tokenizer/embeddings, search index, and summarizer.
//!
//! Each collaborator is a trait with one implementation per backend; the
//! backend is selected once at construction from configuration, never by
//! mode string at call sites.

mod chunker;
mod error;
mod ocr;
mod search;
mod summarizer;
mod tokenizer;
mod types;

pub use chunker::{ChunkConfig, Chunker};
pub use error::{ServiceError, ServiceResult};
pub use ocr::{recognizer_from_config, HttpOcr, Recognizer, TesseractOcr};
pub use search::{search_from_config, HttpSearch, SearchSink};
pub use summarizer::{summarizer_from_config, OllamaSummarizer, Summarizer, Summary};
pub use tokenizer::{tokenizer_from_config, HttpTokenizer, OllamaTokenizer, Tokenized, Tokenizer};
