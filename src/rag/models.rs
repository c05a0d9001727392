//! Data models shared by the indexing and query pipelines.

use serde::{Deserialize, Serialize};

use crate::corpus::Document;

/// A segmented slice of a document, ready for embedding.
///
/// Chunk text is a contiguous, whitespace-joined subsequence of its source
/// section; chunks split from the same over-long section overlap by a fixed
/// trailing window of words.
#[derive(Debug, Clone, PartialEq)]
pub struct Chunk {
    /// The chunk text.
    pub text: String,
    /// Nearest enclosing H2 title, or "Introduction".
    pub section: String,
    /// Character length of `text`.
    pub size: usize,
}

/// Typed payload persisted with every point in the vector store.
///
/// Fields other than the text are optional on the way back out so that a
/// point written by an older indexer cannot break a query; missing values
/// surface as "unknown" at the retrieval layer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChunkPayload {
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub module: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub chapter: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub section: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<usize>,
}

impl ChunkPayload {
    /// Attach a document's provenance to one of its chunks.
    pub fn from_chunk(chunk: Chunk, doc: &Document) -> Self {
        Self {
            text: chunk.text,
            source: Some(doc.relative_path.clone()),
            module: Some(doc.module.clone()),
            chapter: Some(doc.chapter_title.clone()),
            section: Some(chunk.section),
            file: Some(doc.file_name.clone()),
            size: Some(chunk.size),
        }
    }
}

/// Provenance subset returned with each retrieved result.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SourceRef {
    pub source: String,
    pub chapter: String,
    pub section: String,
}

/// One retrieved result: ephemeral, constructed per query.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetrievedChunk {
    pub text: String,
    /// Provider similarity score; higher is more relevant.
    pub score: f32,
    pub metadata: SourceRef,
}
