//! Document segmentation for indexing.
//!
//! Documents are split into sections at H2 headings; sections within the
//! chunk-size budget become one chunk verbatim, oversized sections are split
//! on word boundaries with a trailing word overlap carried into each
//! successive chunk. Pure and deterministic for a fixed configuration.

use std::sync::OnceLock;

use regex::Regex;

use crate::config::RagConfig;

use super::models::Chunk;

/// Section title used for content preceding the first H2 heading.
const INTRO_SECTION: &str = "Introduction";

/// Segment a document into chunks.
///
/// Sections shorter than the configured minimum are dropped entirely. A
/// section exactly at the budget is kept whole.
pub fn chunk_document(content: &str, config: &RagConfig) -> Vec<Chunk> {
    let mut chunks = Vec::new();

    for (i, piece) in content.split("\n## ").enumerate() {
        // Re-attach the heading marker consumed by the split. The first
        // piece keeps whatever leading content existed, including the
        // document's H1.
        let section = if i > 0 {
            format!("## {piece}")
        } else {
            piece.to_string()
        };
        let section = section.trim();

        if section.len() < config.min_section_chars {
            continue;
        }

        let title = section_title(section);

        if section.len() <= config.chunk_size {
            chunks.push(Chunk {
                text: section.to_string(),
                section: title,
                size: section.len(),
            });
        } else {
            split_oversized(section, &title, config, &mut chunks);
        }
    }

    chunks
}

/// Split an over-budget section on word boundaries.
///
/// Words accumulate at a cost of `len + 1` (separator included). When adding
/// a word would exceed the budget, the buffer is emitted and re-seeded with
/// the trailing overlap words plus the word that triggered the overflow. A
/// section with fewer words than the overlap window reuses the whole buffer
/// as the seed.
fn split_oversized(section: &str, title: &str, config: &RagConfig, out: &mut Vec<Chunk>) {
    let mut current: Vec<&str> = Vec::new();
    let mut current_size = 0usize;

    for word in section.split_whitespace() {
        let word_size = word.len() + 1;

        if current_size + word_size > config.chunk_size && !current.is_empty() {
            push_chunk(&current, title, out);

            let keep = current.len().saturating_sub(config.overlap_words);
            current.drain(..keep);
            current.push(word);
            current_size = current.iter().map(|w| w.len() + 1).sum();
        } else {
            current.push(word);
            current_size += word_size;
        }
    }

    if !current.is_empty() {
        push_chunk(&current, title, out);
    }
}

fn push_chunk(words: &[&str], title: &str, out: &mut Vec<Chunk>) {
    let text = words.join(" ");
    out.push(Chunk {
        size: text.len(),
        text,
        section: title.to_string(),
    });
}

/// Extract a section's own H2 title, falling back to "Introduction".
fn section_title(section: &str) -> String {
    static H2: OnceLock<Regex> = OnceLock::new();
    let re = H2.get_or_init(|| Regex::new(r"(?m)^## (.+)$").expect("valid regex"));

    re.captures(section)
        .map(|c| c[1].trim().to_string())
        .unwrap_or_else(|| INTRO_SECTION.to_string())
}
