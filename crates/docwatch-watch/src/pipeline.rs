//! Pipeline coordinator.
//!
//! Drives each document through recognize → fingerprint → chunk/embed →
//! persist. Stages mutate the document in place; the document is owned by
//! exactly one task for its whole lifetime. Failures are isolated per
//! document: OCR failure abandons the document (fail-closed), embedding
//! failure by default persists whatever partial embeddings exist
//! (fail-open, configurable), persistence failure is logged and the
//! document is simply absent from the index until the path triggers again.

use docwatch_config::{Config, EmbedFailurePolicy};
use docwatch_core::{fuzzy_hash, sha256_hex, Document, DocumentId, RecognitionQuality};
use docwatch_services::{Recognizer, SearchSink, Summarizer, Tokenizer};
use futures_util::future::join_all;
use std::collections::HashMap;
use std::path::Path;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tracing::{debug, error, info, warn};

/// Coordinates per-document processing against the external services.
pub struct Pipeline {
    recognizer: Arc<dyn Recognizer>,
    tokenizer: Arc<dyn Tokenizer>,
    search: Arc<dyn SearchSink>,
    summarizer: Option<Arc<dyn Summarizer>>,
    embed_failure_policy: EmbedFailurePolicy,
    /// Pause between dispatching documents of one batch; paces downstream
    /// load, not a rate limit.
    stagger: Duration,
    /// Also store each document to the "<folder>-vector" destination.
    vector_destinations: bool,
    /// Recognized documents by id, held for a later administrative pop
    /// (move/cleanup workflows). Entries leave only via `pop`.
    recognized: Mutex<HashMap<DocumentId, Document>>,
}

impl Pipeline {
    pub fn new(
        recognizer: Arc<dyn Recognizer>,
        tokenizer: Arc<dyn Tokenizer>,
        search: Arc<dyn SearchSink>,
        summarizer: Option<Arc<dyn Summarizer>>,
        config: &Config,
    ) -> Self {
        Self {
            recognizer,
            tokenizer,
            search,
            summarizer,
            embed_failure_policy: config.processing.embed_failure_policy,
            stagger: Duration::from_millis(config.processing.stagger_ms),
            vector_destinations: config.search.vector_destinations,
            recognized: Mutex::new(HashMap::new()),
        }
    }

    /// Process every document of one enumeration batch, one task per
    /// document with a fixed stagger between dispatches, joined before the
    /// trigger is considered complete. One document's failure never aborts
    /// its siblings.
    pub async fn process_batch(self: &Arc<Self>, documents: Vec<Document>) {
        let mut tasks = Vec::with_capacity(documents.len());

        for (i, document) in documents.into_iter().enumerate() {
            if i > 0 && !self.stagger.is_zero() {
                tokio::time::sleep(self.stagger).await;
            }
            let pipeline = Arc::clone(self);
            tasks.push(tokio::spawn(async move {
                pipeline.process(document).await;
            }));
        }

        for joined in join_all(tasks).await {
            if let Err(e) = joined {
                error!("Document task panicked: {}", e);
            }
        }
    }

    /// Drive one document through the stage sequence. Returns the final
    /// document state.
    pub async fn process(&self, mut document: Document) -> Document {
        // Stage 1: recognize (fail-closed)
        let text = match self
            .recognizer
            .recognize(Path::new(&document.document_path), &document.document_name)
            .await
        {
            Ok(text) => text,
            Err(e) => {
                warn!(
                    "Recognition failed for {}: {}",
                    document.document_name, e
                );
                document.quality_recognized = RecognitionQuality::Failed;
                return document;
            }
        };
        document.content = text;
        document.quality_recognized = RecognitionQuality::Recognized;

        // Stage 2: fingerprint the recognized text; this digest is the
        // canonical persisted identity, replacing the discovery digest
        document.document_id = sha256_hex(document.content.as_bytes());
        document.ssdeep_hash = fuzzy_hash(document.content.as_bytes());
        document.embeddings.clear();

        self.remember(&document);

        // Stage 3: chunk and embed
        match self.tokenizer.tokenize(&document.content).await {
            Ok(tokenized) => {
                // Arrays are positionally aligned; the reported chunk count
                // is not trusted to match either length
                for (text_chunk, vector) in tokenized
                    .chunked_text
                    .into_iter()
                    .zip(tokenized.vectors.into_iter())
                {
                    document.push_chunk(text_chunk, vector);
                }
                debug!(
                    "Embedded {} chunk(s) for {}",
                    document.embeddings.len(),
                    document.document_name
                );
            }
            Err(e) => match self.embed_failure_policy {
                EmbedFailurePolicy::PersistPartial => {
                    warn!(
                        "Embedding failed for {}, persisting partial result: {}",
                        document.document_name, e
                    );
                }
                EmbedFailurePolicy::Abort => {
                    warn!(
                        "Embedding failed for {}, aborting document: {}",
                        document.document_name, e
                    );
                    return document;
                }
            },
        }

        // Stage 4: persist. No retry, no rollback of earlier stages.
        if let Err(e) = self.search.store(&document.folder_id, &document).await {
            error!(
                "Failed to store {} in index {}: {}",
                document.document_name, document.folder_id, e
            );
            return document;
        }
        info!(
            "Stored {} ({} chunks) in {}",
            document.document_name,
            document.embeddings.len(),
            document.folder_id
        );

        if self.vector_destinations {
            let destination = format!("{}-vector", document.folder_id);
            if let Err(e) = self.search.store(&destination, &document).await {
                error!(
                    "Failed to store {} in vector index {}: {}",
                    document.document_name, destination, e
                );
            }
        }

        // Optional hook outside the transactional boundary: summarize,
        // rewrite content/class, and store again
        if let Some(summarizer) = &self.summarizer {
            match summarizer.summarize(&document.content).await {
                Ok(summary) => {
                    document.content = summary.summary;
                    if !summary.thematic.is_empty() {
                        document.document_class = Some(summary.thematic);
                    }
                    if let Err(e) = self.search.store(&document.folder_id, &document).await {
                        error!(
                            "Failed to re-store summarized {}: {}",
                            document.document_name, e
                        );
                    }
                }
                Err(e) => {
                    warn!("Summarization failed for {}: {}", document.document_name, e);
                }
            }
        }

        document
    }

    /// Keep a recognized document for a later administrative pull.
    fn remember(&self, document: &Document) {
        let mut recognized = self.recognized.lock().expect("recognized lock poisoned");
        recognized.insert(document.document_id.clone(), document.clone());
    }

    /// Remove and return a recognized document by id. Each entry can be
    /// popped exactly once.
    pub fn pop(&self, document_id: &str) -> Option<Document> {
        let mut recognized = self.recognized.lock().expect("recognized lock poisoned");
        recognized.remove(document_id)
    }

    /// Number of recognized documents awaiting a pop.
    pub fn recognized_count(&self) -> usize {
        let recognized = self.recognized.lock().expect("recognized lock poisoned");
        recognized.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use docwatch_services::{ServiceError, ServiceResult, Summary, Tokenized};

    struct StubRecognizer {
        response: Option<String>,
        fail_for: Option<String>,
        calls: Mutex<Vec<String>>,
    }

    impl StubRecognizer {
        fn ok(text: &str) -> Self {
            Self {
                response: Some(text.to_string()),
                fail_for: None,
                calls: Mutex::new(vec![]),
            }
        }

        fn failing() -> Self {
            Self {
                response: None,
                fail_for: None,
                calls: Mutex::new(vec![]),
            }
        }

        fn failing_for(mut self, file_name: &str) -> Self {
            self.fail_for = Some(file_name.to_string());
            self
        }
    }

    #[async_trait]
    impl Recognizer for StubRecognizer {
        async fn recognize(&self, _path: &Path, file_name: &str) -> ServiceResult<String> {
            self.calls.lock().unwrap().push(file_name.to_string());
            if self.fail_for.as_deref() == Some(file_name) {
                return Err(ServiceError::EmptyRecognition {
                    file_name: file_name.to_string(),
                });
            }
            match &self.response {
                Some(text) => Ok(text.clone()),
                None => Err(ServiceError::EmptyRecognition {
                    file_name: file_name.to_string(),
                }),
            }
        }
    }

    struct StubTokenizer {
        response: Option<Tokenized>,
        calls: Mutex<usize>,
    }

    impl StubTokenizer {
        fn ok(texts: &[&str], vectors: Vec<Vec<f32>>) -> Self {
            Self {
                response: Some(Tokenized {
                    chunks: 999, // deliberately wrong, must not be trusted
                    chunked_text: texts.iter().map(|s| s.to_string()).collect(),
                    vectors,
                }),
                calls: Mutex::new(0),
            }
        }

        fn failing() -> Self {
            Self {
                response: None,
                calls: Mutex::new(0),
            }
        }

        fn call_count(&self) -> usize {
            *self.calls.lock().unwrap()
        }
    }

    #[async_trait]
    impl Tokenizer for StubTokenizer {
        async fn tokenize(&self, _text: &str) -> ServiceResult<Tokenized> {
            *self.calls.lock().unwrap() += 1;
            match &self.response {
                Some(t) => Ok(t.clone()),
                None => Err(ServiceError::Unreachable {
                    host: "http://tokenizer".to_string(),
                }),
            }
        }
    }

    struct StubSearch {
        fail: bool,
        stored: Mutex<Vec<(String, Document)>>,
    }

    impl StubSearch {
        fn ok() -> Self {
            Self {
                fail: false,
                stored: Mutex::new(vec![]),
            }
        }

        fn stored(&self) -> Vec<(String, Document)> {
            self.stored.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl SearchSink for StubSearch {
        async fn store(&self, destination: &str, document: &Document) -> ServiceResult<()> {
            if self.fail {
                return Err(ServiceError::Unreachable {
                    host: "http://search".to_string(),
                });
            }
            self.stored
                .lock()
                .unwrap()
                .push((destination.to_string(), document.clone()));
            Ok(())
        }
    }

    struct StubSummarizer;

    #[async_trait]
    impl Summarizer for StubSummarizer {
        async fn summarize(&self, _content: &str) -> ServiceResult<Summary> {
            Ok(Summary {
                summary: "short summary".to_string(),
                thematic: "testing".to_string(),
            })
        }
    }

    fn document() -> Document {
        Document::new("inbox", "/watch/inbox/a.txt")
            .with_name("a.txt")
            .with_extension("txt")
    }

    fn pipeline(
        recognizer: Arc<StubRecognizer>,
        tokenizer: Arc<StubTokenizer>,
        search: Arc<StubSearch>,
        summarizer: Option<Arc<dyn Summarizer>>,
        config: Config,
    ) -> Arc<Pipeline> {
        Arc::new(Pipeline::new(
            recognizer,
            tokenizer,
            search,
            summarizer,
            &config,
        ))
    }

    fn quiet_config() -> Config {
        let mut config = Config::default();
        config.processing.stagger_ms = 0;
        config
    }

    #[tokio::test]
    async fn test_ocr_failure_is_fail_closed() {
        let recognizer = Arc::new(StubRecognizer::failing());
        let tokenizer = Arc::new(StubTokenizer::ok(&["x"], vec![vec![1.0]]));
        let search = Arc::new(StubSearch::ok());
        let pipe = pipeline(
            recognizer,
            tokenizer.clone(),
            search.clone(),
            None,
            quiet_config(),
        );

        let doc = pipe.process(document()).await;

        assert_eq!(doc.quality_recognized, RecognitionQuality::Failed);
        // Never submitted downstream
        assert_eq!(tokenizer.call_count(), 0);
        assert!(search.stored().is_empty());
    }

    #[tokio::test]
    async fn test_tokenizer_failure_is_fail_open_by_default() {
        let recognizer = Arc::new(StubRecognizer::ok("recognized text"));
        let tokenizer = Arc::new(StubTokenizer::failing());
        let search = Arc::new(StubSearch::ok());
        let pipe = pipeline(
            recognizer,
            tokenizer,
            search.clone(),
            None,
            quiet_config(),
        );

        let doc = pipe.process(document()).await;

        assert_eq!(doc.quality_recognized, RecognitionQuality::Recognized);
        assert!(doc.embeddings.is_empty());
        // Still persisted, with empty embeddings
        let stored = search.stored();
        assert_eq!(stored.len(), 1);
        assert_eq!(stored[0].0, "inbox");
        assert!(stored[0].1.embeddings.is_empty());
    }

    #[tokio::test]
    async fn test_tokenizer_failure_with_abort_policy_skips_persist() {
        let mut config = quiet_config();
        config.processing.embed_failure_policy = EmbedFailurePolicy::Abort;

        let recognizer = Arc::new(StubRecognizer::ok("recognized text"));
        let tokenizer = Arc::new(StubTokenizer::failing());
        let search = Arc::new(StubSearch::ok());
        let pipe = pipeline(recognizer, tokenizer, search.clone(), None, config);

        pipe.process(document()).await;
        assert!(search.stored().is_empty());
    }

    #[tokio::test]
    async fn test_successful_run_realigns_identity_and_embeds() {
        let recognizer = Arc::new(StubRecognizer::ok("recognized text"));
        // Three chunks but only two vectors: zip takes the aligned pairs
        let tokenizer = Arc::new(StubTokenizer::ok(
            &["one", "two", "three"],
            vec![vec![0.1], vec![0.2]],
        ));
        let search = Arc::new(StubSearch::ok());
        let pipe = pipeline(
            recognizer,
            tokenizer,
            search.clone(),
            None,
            quiet_config(),
        );

        let mut input = document();
        input.document_id = sha256_hex(b"raw bytes");
        let doc = pipe.process(input).await;

        // Identity is recomputed over the recognized text
        assert_eq!(doc.document_id, sha256_hex(b"recognized text"));
        assert_eq!(doc.embeddings.len(), 2);
        assert_eq!(doc.embeddings[0].text_chunk, "one");
        assert_eq!(doc.embeddings[0].vector, vec![0.1]);

        let stored = search.stored();
        assert_eq!(stored.len(), 1);
        assert_eq!(stored[0].1.embeddings.len(), 2);
    }

    #[tokio::test]
    async fn test_vector_destination_second_write() {
        let mut config = quiet_config();
        config.search.vector_destinations = true;

        let recognizer = Arc::new(StubRecognizer::ok("text"));
        let tokenizer = Arc::new(StubTokenizer::ok(&["text"], vec![vec![0.5]]));
        let search = Arc::new(StubSearch::ok());
        let pipe = pipeline(recognizer, tokenizer, search.clone(), None, config);

        pipe.process(document()).await;

        let destinations: Vec<String> =
            search.stored().into_iter().map(|(d, _)| d).collect();
        assert_eq!(destinations, vec!["inbox", "inbox-vector"]);
    }

    #[tokio::test]
    async fn test_summarizer_rewrites_and_restores() {
        let recognizer = Arc::new(StubRecognizer::ok("long recognized text"));
        let tokenizer = Arc::new(StubTokenizer::ok(&["chunk"], vec![vec![0.5]]));
        let search = Arc::new(StubSearch::ok());
        let pipe = pipeline(
            recognizer,
            tokenizer,
            search.clone(),
            Some(Arc::new(StubSummarizer)),
            quiet_config(),
        );

        let doc = pipe.process(document()).await;

        assert_eq!(doc.content, "short summary");
        assert_eq!(doc.document_class.as_deref(), Some("testing"));
        // Primary store plus the post-summary store
        let stored = search.stored();
        assert_eq!(stored.len(), 2);
        assert_eq!(stored[1].1.content, "short summary");
    }

    #[tokio::test]
    async fn test_batch_isolates_failures() {
        let recognizer = Arc::new(StubRecognizer::ok("content").failing_for("b.txt"));
        let tokenizer = Arc::new(StubTokenizer::ok(&["content"], vec![vec![1.0]]));
        let search = Arc::new(StubSearch::ok());
        let pipe = pipeline(
            recognizer,
            tokenizer,
            search.clone(),
            None,
            quiet_config(),
        );

        let mut failing = document();
        failing.document_name = "b.txt".to_string();

        pipe.process_batch(vec![document(), failing]).await;

        // The failing document is abandoned without aborting its sibling
        let stored = search.stored();
        assert_eq!(stored.len(), 1);
        assert_eq!(stored[0].1.document_name, "a.txt");
    }

    #[tokio::test]
    async fn test_pop_removes_exactly_once() {
        let recognizer = Arc::new(StubRecognizer::ok("pop me"));
        let tokenizer = Arc::new(StubTokenizer::ok(&["pop me"], vec![vec![1.0]]));
        let search = Arc::new(StubSearch::ok());
        let pipe = pipeline(recognizer, tokenizer, search, None, quiet_config());

        let doc = pipe.process(document()).await;
        assert_eq!(pipe.recognized_count(), 1);

        let popped = pipe.pop(&doc.document_id);
        assert!(popped.is_some());
        assert!(pipe.pop(&doc.document_id).is_none());
        assert_eq!(pipe.recognized_count(), 0);
    }
}
