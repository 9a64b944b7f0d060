//! Fixed-size overlapping chunker.
//!
//! Documents are split on a character cursor: each chunk covers at most `chunk_size`
//! characters and shares its leading `overlap` characters with the tail of the previous
//! chunk, so spans near boundaries stay visible to retrieval. Chunks are stored untrimmed;
//! trimming only decides whether an all-whitespace window is dropped.

use thiserror::Error;

/// Errors produced while splitting a document into chunks.
#[derive(Debug, Error)]
pub enum ChunkingError {
    /// Overlap must be strictly smaller than the chunk size or the cursor never advances.
    #[error("invalid chunk configuration: overlap {overlap} must be smaller than chunk size {chunk_size}")]
    InvalidChunkConfig {
        /// Configured maximum chunk length in characters.
        chunk_size: usize,
        /// Configured overlap between adjacent chunks in characters.
        overlap: usize,
    },
}

/// Split `text` into overlapping chunks of at most `chunk_size` characters.
///
/// The cursor advances by `chunk_size - overlap` after each window, so adjacent chunks
/// share exactly `overlap` characters. Windows that are empty after trimming are skipped;
/// kept chunks retain their original whitespace. Empty input yields an empty vector.
pub fn chunk_text(
    text: &str,
    chunk_size: usize,
    overlap: usize,
) -> Result<Vec<String>, ChunkingError> {
    if chunk_size == 0 || overlap >= chunk_size {
        return Err(ChunkingError::InvalidChunkConfig {
            chunk_size,
            overlap,
        });
    }

    let characters: Vec<char> = text.chars().collect();
    let step = chunk_size - overlap;
    let mut chunks = Vec::new();
    let mut cursor = 0;

    while cursor < characters.len() {
        let end = (cursor + chunk_size).min(characters.len());
        let chunk: String = characters[cursor..end].iter().collect();
        if !chunk.trim().is_empty() {
            chunks.push(chunk);
        }
        cursor += step;
    }

    Ok(chunks)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_text_yields_single_untrimmed_chunk() {
        let text = "  a short document \n";
        let chunks = chunk_text(text, 1000, 200).unwrap();
        assert_eq!(chunks, vec![text.to_string()]);
    }

    #[test]
    fn empty_input_yields_no_chunks() {
        assert!(chunk_text("", 1000, 200).unwrap().is_empty());
    }

    #[test]
    fn whitespace_only_windows_are_dropped() {
        let chunks = chunk_text("   \n\t  ", 4, 0).unwrap();
        assert!(chunks.is_empty());
    }

    #[test]
    fn adjacent_chunks_share_the_overlap_region() {
        let text: String = (0..1800)
            .map(|i| char::from(b'a' + (i % 26) as u8))
            .collect();
        let chunks = chunk_text(&text, 1000, 200).unwrap();

        assert_eq!(chunks.len(), 2);
        assert_eq!(chunks[0].chars().count(), 1000);
        let tail: String = chunks[0].chars().skip(800).collect();
        let head: String = chunks[1].chars().take(200).collect();
        assert_eq!(tail, head);
    }

    #[test]
    fn chunk_count_follows_cursor_arithmetic() {
        let text = "x".repeat(4200);
        let chunks = chunk_text(&text, 1000, 200).unwrap();
        // Cursor positions 0, 800, ..., 4000 stay below 4200, producing six windows.
        assert_eq!(chunks.len(), 6);
        assert!(chunks[..5].iter().all(|chunk| chunk.len() == 1000));
        assert_eq!(chunks[5].len(), 200);
    }

    #[test]
    fn overlap_equal_to_chunk_size_is_rejected() {
        let error = chunk_text("hello", 100, 100).unwrap_err();
        assert!(matches!(
            error,
            ChunkingError::InvalidChunkConfig {
                chunk_size: 100,
                overlap: 100
            }
        ));
    }

    #[test]
    fn zero_chunk_size_is_rejected() {
        assert!(chunk_text("hello", 0, 0).is_err());
    }

    #[test]
    fn multibyte_text_chunks_on_character_boundaries() {
        let text = "é".repeat(10);
        let chunks = chunk_text(&text, 4, 1).unwrap();
        assert!(chunks.iter().all(|chunk| chunk.chars().count() <= 4));
        assert_eq!(chunks[0], "é".repeat(4));
    }
}
