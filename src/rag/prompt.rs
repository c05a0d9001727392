//! Grounded prompt composition and answer generation.
//!
//! The prompt is the entire grounding mechanism: the system preamble binds
//! the model to the supplied context and to one fixed refusal sentence. No
//! post-hoc fact checking or citation validation happens on the response.

use std::sync::Arc;

use crate::providers::{GenerationError, GenerationProvider, GenerationRequest};

use super::models::RetrievedChunk;

/// Fixed refusal sentence the model must emit verbatim when the context does
/// not answer the question.
pub const REFUSAL_SENTENCE: &str =
    "I cannot answer that based on the textbook content provided.";

/// Substituted for the context block when retrieval produced nothing.
pub const EMPTY_CONTEXT_MARKER: &str = "No relevant context was found in the textbook.";

/// Invariant system instruction. Must quote [`REFUSAL_SENTENCE`] verbatim.
const SYSTEM_PREAMBLE: &str = "You are an expert assistant for the Physical AI & Humanoid \
Robotics textbook. Answer using only the context provided below; general world knowledge is \
not allowed. If the context does not contain the information needed to answer, reply with \
exactly this sentence: \"I cannot answer that based on the textbook content provided.\"";

/// Low temperature favors determinism and factuality over creativity.
const TEMPERATURE: f32 = 0.3;
const MAX_OUTPUT_TOKENS: u32 = 500;

/// Format up to `max_chunks` retrieved results as provenance-tagged blocks.
///
/// An empty result list yields the explicit no-context marker rather than an
/// omitted section; the instruction text is present in every prompt.
pub fn build_context(chunks: &[RetrievedChunk], max_chunks: usize) -> String {
    if chunks.is_empty() {
        return EMPTY_CONTEXT_MARKER.to_string();
    }

    chunks
        .iter()
        .take(max_chunks)
        .map(|chunk| format!("[Source: {}]\n{}", chunk.metadata.source, chunk.text))
        .collect::<Vec<_>>()
        .join("\n\n")
}

/// Assemble the user message: context first, then the question.
pub fn build_message(query: &str, context: &str) -> String {
    format!(
        "Context from the textbook:\n{context}\n\nQuestion: {query}\n\n\
         Provide a clear, accurate answer based on the context above."
    )
}

/// Builds the constrained prompt and calls the generation provider.
pub struct Composer {
    generator: Arc<dyn GenerationProvider>,
    context_chunks: usize,
}

impl Composer {
    pub fn new(generator: Arc<dyn GenerationProvider>, context_chunks: usize) -> Self {
        Self {
            generator,
            context_chunks,
        }
    }

    /// Generate an answer grounded in `chunks`. The response text is trimmed
    /// and returned verbatim.
    pub async fn answer(
        &self,
        query: &str,
        chunks: &[RetrievedChunk],
    ) -> Result<String, GenerationError> {
        let context = build_context(chunks, self.context_chunks);
        let request = GenerationRequest {
            system: SYSTEM_PREAMBLE.to_string(),
            message: build_message(query, &context),
            temperature: TEMPERATURE,
            max_tokens: MAX_OUTPUT_TOKENS,
        };

        let text = self.generator.generate(&request).await?;
        Ok(text.trim().to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rag::models::SourceRef;
    use crate::rag::retriever::{PINNED_SCORE, PINNED_SOURCE};
    use crate::rag::testing::{ContextAwareGenerator, EchoGenerator};

    fn chunk(text: &str, score: f32, source: &str) -> RetrievedChunk {
        RetrievedChunk {
            text: text.to_string(),
            score,
            metadata: SourceRef {
                source: source.to_string(),
                chapter: "Physical AI".to_string(),
                section: "Overview".to_string(),
            },
        }
    }

    #[test]
    fn test_system_preamble_quotes_refusal_sentence() {
        assert!(SYSTEM_PREAMBLE.contains(REFUSAL_SENTENCE));
    }

    #[test]
    fn test_empty_context_substitutes_marker() {
        assert_eq!(build_context(&[], 5), EMPTY_CONTEXT_MARKER);
    }

    #[test]
    fn test_context_blocks_are_source_tagged_in_order() {
        let chunks = vec![
            chunk("First.", 0.9, "docs/module-1/chapter-1.md"),
            chunk("Second.", 0.8, "docs/module-1/chapter-2.md"),
        ];
        let context = build_context(&chunks, 5);
        let first = context.find("[Source: docs/module-1/chapter-1.md]\nFirst.").unwrap();
        let second = context.find("[Source: docs/module-1/chapter-2.md]\nSecond.").unwrap();
        assert!(first < second);
    }

    #[test]
    fn test_context_truncated_to_max_chunks() {
        let chunks: Vec<_> = (0..6)
            .map(|i| chunk(&format!("c{i}"), 0.9, &format!("s{i}")))
            .collect();
        let context = build_context(&chunks, 3);
        assert!(context.contains("c2"));
        assert!(!context.contains("c3"));
    }

    #[test]
    fn test_pinned_excerpt_survives_truncation() {
        // Pinned excerpt is always index 0, so the top-M cutoff never drops it.
        let mut chunks = vec![chunk("Pinned text.", PINNED_SCORE, PINNED_SOURCE)];
        chunks.extend((0..5).map(|i| chunk(&format!("c{i}"), 0.9, "docs/x.md")));
        let context = build_context(&chunks, 3);
        assert!(context.contains(&format!("[Source: {PINNED_SOURCE}]")));
    }

    #[test]
    fn test_message_places_context_before_question() {
        let chunks = vec![chunk("ROS 2 basics.", 0.9, "docs/module-1/chapter-1.md")];
        let message = build_message("What is ROS 2?", &build_context(&chunks, 5));
        let source = message.find("[Source: docs/module-1/chapter-1.md]").unwrap();
        let question = message.find("Question: What is ROS 2?").unwrap();
        assert!(source < question);
    }

    #[tokio::test]
    async fn test_answer_is_trimmed() {
        let composer = Composer::new(Arc::new(ContextAwareGenerator), 5);
        let answer = composer.answer("anything", &[]).await.unwrap();
        assert_eq!(answer, REFUSAL_SENTENCE);
    }

    #[tokio::test]
    async fn test_empty_context_yields_refusal() {
        let composer = Composer::new(Arc::new(ContextAwareGenerator), 5);
        let answer = composer.answer("What is ROS 2?", &[]).await.unwrap();
        assert_eq!(answer, REFUSAL_SENTENCE);
    }

    #[tokio::test]
    async fn test_grounded_prompt_reaches_provider_intact() {
        let composer = Composer::new(Arc::new(EchoGenerator), 5);
        let chunks = vec![chunk("ROS 2 basics.", 0.9, "docs/module-1/chapter-1.md")];
        let echoed = composer.answer("What is ROS 2?", &chunks).await.unwrap();

        assert!(echoed.contains(REFUSAL_SENTENCE));
        assert!(echoed.contains("[Source: docs/module-1/chapter-1.md]"));
        assert!(echoed.contains("Question: What is ROS 2?"));
    }
}
