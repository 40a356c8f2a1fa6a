//! Text chunking for the local tokenizer backend.
//!
//! Splits recognized text into chunks suitable for embedding, preferring
//! paragraph and sentence boundaries over hard character cuts.

use docwatch_config::ProcessingConfig;

/// Configuration for chunking.
#[derive(Debug, Clone)]
pub struct ChunkConfig {
    /// Target size of each chunk in characters.
    pub chunk_size: usize,
    /// Number of characters to overlap between chunks.
    pub chunk_overlap: usize,
    /// Minimum chunk size (won't create chunks smaller than this).
    pub min_chunk_size: usize,
}

impl Default for ChunkConfig {
    fn default() -> Self {
        Self {
            chunk_size: 1000,
            chunk_overlap: 100,
            min_chunk_size: 100,
        }
    }
}

impl ChunkConfig {
    pub fn from_processing_config(config: &ProcessingConfig) -> Self {
        Self {
            chunk_size: config.chunk_size,
            chunk_overlap: config.chunk_overlap,
            min_chunk_size: 100,
        }
    }
}

/// Content chunker for splitting text.
pub struct Chunker {
    config: ChunkConfig,
}

impl Chunker {
    pub fn new(config: ChunkConfig) -> Self {
        Self { config }
    }

    /// Split text into chunks on paragraph/sentence boundaries where
    /// possible, falling back to hard character splits for unbroken runs.
    pub fn chunk_text(&self, text: &str) -> Vec<String> {
        let trimmed = text.trim();
        if trimmed.is_empty() {
            return vec![];
        }

        if trimmed.chars().count() <= self.config.chunk_size {
            return vec![trimmed.to_string()];
        }

        let mut chunks = Vec::new();
        let mut current = String::new();

        for para in trimmed.split("\n\n") {
            let para = para.trim();
            if para.is_empty() {
                continue;
            }

            if para.chars().count() > self.config.chunk_size {
                // Paragraph too long on its own; split it into sentences
                for piece in self.split_sentences(para) {
                    self.push_piece(&mut chunks, &mut current, &piece);
                }
            } else {
                self.push_piece(&mut chunks, &mut current, para);
            }
        }

        let last = current.trim();
        if !last.is_empty() {
            chunks.push(last.to_string());
        }

        chunks
    }

    /// Append a piece to the current chunk, flushing when it would overflow.
    fn push_piece(&self, chunks: &mut Vec<String>, current: &mut String, piece: &str) {
        let current_len = current.chars().count();
        let piece_len = piece.chars().count();

        if current_len > 0 && current_len + piece_len + 2 > self.config.chunk_size {
            let chunk_text = current.trim().to_string();
            if chunk_text.chars().count() >= self.config.min_chunk_size || chunks.is_empty() {
                chunks.push(chunk_text);
            }

            // Start the next chunk with trailing overlap from this one
            if self.config.chunk_overlap > 0 {
                let chars: Vec<char> = current.chars().collect();
                let skip = chars.len().saturating_sub(self.config.chunk_overlap);
                *current = chars[skip..].iter().collect();
            } else {
                current.clear();
            }
        }

        if !current.is_empty() {
            current.push_str("\n\n");
        }
        current.push_str(piece);
    }

    /// Split a long paragraph into sentences, hard-splitting any sentence
    /// that still exceeds the chunk size.
    fn split_sentences(&self, para: &str) -> Vec<String> {
        let mut pieces = Vec::new();
        let mut current = String::new();

        for ch in para.chars() {
            current.push(ch);
            let boundary = matches!(ch, '.' | '!' | '?');
            if (boundary && current.chars().count() >= self.config.min_chunk_size)
                || current.chars().count() >= self.config.chunk_size
            {
                pieces.push(current.trim().to_string());
                current.clear();
            }
        }

        let rest = current.trim();
        if !rest.is_empty() {
            pieces.push(rest.to_string());
        }

        pieces
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chunker(size: usize, overlap: usize) -> Chunker {
        Chunker::new(ChunkConfig {
            chunk_size: size,
            chunk_overlap: overlap,
            min_chunk_size: 10,
        })
    }

    #[test]
    fn test_empty_text_no_chunks() {
        assert!(chunker(100, 0).chunk_text("   ").is_empty());
    }

    #[test]
    fn test_short_text_single_chunk() {
        let chunks = chunker(100, 0).chunk_text("A short note.");
        assert_eq!(chunks, vec!["A short note.".to_string()]);
    }

    #[test]
    fn test_paragraphs_split_into_multiple_chunks() {
        let text = format!("{}\n\n{}", "alpha ".repeat(20), "beta ".repeat(20));
        let chunks = chunker(80, 0).chunk_text(&text);
        assert!(chunks.len() >= 2);
        assert!(chunks[0].contains("alpha"));
    }

    #[test]
    fn test_unbroken_run_is_force_split() {
        let text = "x".repeat(500);
        let chunks = chunker(100, 0).chunk_text(&text);
        assert!(chunks.len() >= 5);
        for chunk in &chunks {
            assert!(chunk.chars().count() <= 100);
        }
    }

    #[test]
    fn test_overlap_carries_tail_forward() {
        let text = format!("{}\n\n{}", "a".repeat(90), "b".repeat(90));
        let chunks = chunker(100, 20).chunk_text(&text);
        assert!(chunks.len() >= 2);
        // Second chunk starts with the tail of the first
        assert!(chunks[1].starts_with(&"a".repeat(20)));
    }
}
