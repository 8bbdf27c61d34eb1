//! Clause chunker: segments extracted text into independently-classifiable
//! units at paragraph boundaries, not raw byte windows.
//!
//! Chunks below the minimum length are merged with a neighbor so fragments
//! don't waste classification calls; chunks above the maximum are split at
//! the nearest sentence boundary to respect the classifier's input limit.
//! Ids are 0-based ordinals in reading order, assigned after merging and
//! splitting, and never reused.

use serde::{Deserialize, Serialize};

/// A contiguous, independently-classifiable unit of document text.
/// Immutable once extracted; order is significant end-to-end.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Chunk {
    pub id: usize,
    pub text: String,
    /// Byte offset of the chunk's first character in the extracted text.
    pub source_offset: Option<usize>,
}

pub struct ClauseChunker {
    max_chunk_chars: usize,
    min_chunk_chars: usize,
}

impl ClauseChunker {
    pub fn new() -> Self {
        Self {
            max_chunk_chars: 1200,
            min_chunk_chars: 80,
        }
    }

    pub fn with_limits(max_chunk_chars: usize, min_chunk_chars: usize) -> Self {
        Self {
            max_chunk_chars,
            min_chunk_chars,
        }
    }

    /// Segment `text` into ordered chunks.
    pub fn chunk(&self, text: &str) -> Vec<Chunk> {
        let mut pieces = Vec::new();
        for para in split_paragraphs(text) {
            if para.text.len() > self.max_chunk_chars {
                split_long_paragraph(&para, self.max_chunk_chars, &mut pieces);
            } else {
                pieces.push(para);
            }
        }

        merge_tiny_pieces(&mut pieces, self.min_chunk_chars);

        pieces
            .into_iter()
            .enumerate()
            .map(|(id, p)| Chunk {
                id,
                text: p.text,
                source_offset: Some(p.offset),
            })
            .collect()
    }
}

impl Default for ClauseChunker {
    fn default() -> Self {
        Self::new()
    }
}

struct Piece {
    text: String,
    offset: usize,
}

/// Split on blank lines, keeping the byte offset of each paragraph.
fn split_paragraphs(text: &str) -> Vec<Piece> {
    let mut pieces = Vec::new();
    let mut offset = 0;

    for raw in text.split("\n\n") {
        let trimmed = raw.trim();
        if !trimmed.is_empty() {
            let lead = raw.len() - raw.trim_start().len();
            pieces.push(Piece {
                text: trimmed.to_string(),
                offset: offset + lead,
            });
        }
        offset += raw.len() + 2;
    }

    pieces
}

/// Split an oversized paragraph at sentence boundaries. The break point is
/// searched for in the final 20% of the window so pieces stay near the
/// maximum instead of degenerating into sentence-sized slivers.
fn split_long_paragraph(para: &Piece, max_chars: usize, out: &mut Vec<Piece>) {
    let text = para.text.as_str();
    let mut start = 0;

    while start < text.len() {
        let hard_end = floor_char_boundary(text, start + max_chars);
        let end = if hard_end < text.len() {
            let window_start = floor_char_boundary(text, start + max_chars * 4 / 5);
            text[window_start..hard_end]
                .rfind(". ")
                .map(|pos| window_start + pos + 2)
                .unwrap_or(hard_end)
        } else {
            text.len()
        };

        let slice = text[start..end].trim();
        if !slice.is_empty() {
            out.push(Piece {
                text: slice.to_string(),
                offset: para.offset + start,
            });
        }

        if end == start {
            break;
        }
        start = end;
    }
}

/// Merge below-minimum pieces with a neighbor. A trailing tiny piece folds
/// backwards into its predecessor; everywhere else the next piece is pulled
/// in. The merged piece keeps the earlier offset.
fn merge_tiny_pieces(pieces: &mut Vec<Piece>, min_chars: usize) {
    let mut i = 0;
    while i < pieces.len() {
        if pieces[i].text.len() >= min_chars {
            i += 1;
            continue;
        }
        if i + 1 < pieces.len() {
            let next = pieces.remove(i + 1);
            pieces[i].text.push_str("\n\n");
            pieces[i].text.push_str(&next.text);
        } else if i > 0 {
            let last = pieces.remove(i);
            pieces[i - 1].text.push_str("\n\n");
            pieces[i - 1].text.push_str(&last.text);
            break;
        } else {
            // A single tiny paragraph is still a document.
            break;
        }
    }
}

/// Largest index `<= i` that lands on a char boundary.
fn floor_char_boundary(s: &str, i: usize) -> usize {
    if i >= s.len() {
        return s.len();
    }
    let mut i = i;
    while !s.is_char_boundary(i) {
        i -= 1;
    }
    i
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_contract() -> String {
        [
            "1. Term. This agreement commences on the effective date and continues for a period of twelve months unless terminated earlier.",
            "2. Payment. The client shall pay all invoices within thirty days of receipt; late payments accrue interest at two percent monthly.",
            "3. Liability. The provider's aggregate liability shall not exceed the fees paid in the preceding twelve month period of the engagement.",
        ]
        .join("\n\n")
    }

    #[test]
    fn chunks_at_paragraph_boundaries() {
        let chunker = ClauseChunker::new();
        let chunks = chunker.chunk(&sample_contract());

        assert_eq!(chunks.len(), 3);
        assert!(chunks[0].text.starts_with("1. Term"));
        assert!(chunks[1].text.starts_with("2. Payment"));
        assert!(chunks[2].text.starts_with("3. Liability"));
    }

    #[test]
    fn ids_are_zero_based_ordinals() {
        let chunker = ClauseChunker::new();
        let chunks = chunker.chunk(&sample_contract());

        for (i, chunk) in chunks.iter().enumerate() {
            assert_eq!(chunk.id, i);
        }
    }

    #[test]
    fn offsets_are_strictly_increasing() {
        let chunker = ClauseChunker::new();
        let chunks = chunker.chunk(&sample_contract());

        let offsets: Vec<usize> = chunks.iter().map(|c| c.source_offset.unwrap()).collect();
        assert!(offsets.windows(2).all(|w| w[0] < w[1]));
        assert_eq!(offsets[0], 0);
    }

    #[test]
    fn tiny_paragraphs_merge_into_a_neighbor() {
        let text = "WHEREAS,\n\nthe parties wish to enter into this agreement on the terms and conditions set out below for mutual benefit.";
        let chunker = ClauseChunker::new();
        let chunks = chunker.chunk(text);

        assert_eq!(chunks.len(), 1);
        assert!(chunks[0].text.contains("WHEREAS"));
        assert!(chunks[0].text.contains("mutual benefit"));
    }

    #[test]
    fn trailing_tiny_paragraph_merges_backwards() {
        let text = "The indemnifying party shall defend and hold harmless the indemnified party from any third-party claims arising out of the services.\n\nSigned.";
        let chunker = ClauseChunker::new();
        let chunks = chunker.chunk(text);

        assert_eq!(chunks.len(), 1);
        assert!(chunks[0].text.ends_with("Signed."));
    }

    #[test]
    fn oversized_paragraph_splits_at_sentence_boundary() {
        let sentence = "The receiving party shall keep all disclosed information strictly confidential. ";
        let long_para = sentence.repeat(30);
        let chunker = ClauseChunker::with_limits(400, 40);
        let chunks = chunker.chunk(&long_para);

        assert!(chunks.len() > 1, "Oversized paragraph should be split");
        for chunk in &chunks {
            assert!(
                chunk.text.len() <= 400,
                "Chunk too large: {} chars",
                chunk.text.len()
            );
            assert!(
                chunk.text.ends_with('.'),
                "Split should land on a sentence boundary: ...{:?}",
                &chunk.text[chunk.text.len().saturating_sub(20)..]
            );
        }
    }

    #[test]
    fn split_without_sentence_boundary_still_bounded() {
        // One unbroken run of characters — falls back to a hard split.
        let text = "x".repeat(1000);
        let chunker = ClauseChunker::with_limits(300, 40);
        let chunks = chunker.chunk(&text);

        assert!(chunks.len() >= 3);
        for chunk in &chunks {
            assert!(chunk.text.len() <= 300);
        }
    }

    #[test]
    fn multibyte_text_never_splits_inside_a_character() {
        let text = "ü".repeat(500);
        let chunker = ClauseChunker::with_limits(301, 10);
        let chunks = chunker.chunk(&text);

        assert!(!chunks.is_empty());
        for chunk in &chunks {
            assert!(chunk.text.chars().all(|c| c == 'ü'));
        }
    }

    #[test]
    fn concatenation_reconstructs_source_text() {
        let source = sample_contract();
        let chunker = ClauseChunker::with_limits(200, 20);
        let chunks = chunker.chunk(&source);

        let reconstructed: String = chunks
            .iter()
            .map(|c| c.text.as_str())
            .collect::<Vec<_>>()
            .join(" ");
        let normalize = |s: &str| s.split_whitespace().collect::<Vec<_>>().join(" ");
        assert_eq!(normalize(&reconstructed), normalize(&source));
    }

    #[test]
    fn empty_input_produces_no_chunks() {
        let chunker = ClauseChunker::new();
        assert!(chunker.chunk("").is_empty());
        assert!(chunker.chunk("   \n\n  \n ").is_empty());
    }

    #[test]
    fn windows_line_endings_are_tolerated() {
        let text = "First clause of the agreement, written with enough text that it comfortably stands on its own as an independent unit.\r\n\r\nSecond clause of the agreement, which is also long enough to stand alone as an independent unit for classification.";
        let normalized = text.replace("\r\n", "\n");
        let chunker = ClauseChunker::new();
        let chunks = chunker.chunk(&normalized);
        assert_eq!(chunks.len(), 2);
    }
}
