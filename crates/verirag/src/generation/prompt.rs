//! Prompt templates for verified answer generation

use crate::types::ScoredRecord;

/// Separator between passages in the context block
pub const CONTEXT_SEPARATOR: &str = "\n---\n";

/// Prompt builder for the retrieve-then-verify query
pub struct PromptBuilder;

impl PromptBuilder {
    /// Build the context block from search hits, preserving retrieval order
    pub fn build_context(hits: &[ScoredRecord]) -> String {
        hits.iter()
            .enumerate()
            .map(|(i, hit)| {
                let meta = &hit.record.metadata;
                format!(
                    "[Source {} | {}, page {}]\n{}",
                    i + 1,
                    meta.title,
                    meta.page_number,
                    hit.record.content
                )
            })
            .collect::<Vec<_>>()
            .join(CONTEXT_SEPARATOR)
    }

    /// Build the generation prompt with strict grounding and the output schema
    pub fn build_verification_prompt(query: &str, context: &str) -> String {
        format!(
            r#"You are a strictly faithful AI Librarian. You answer questions using ONLY the context retrieved from the user's PDF documents.

RULES - YOU MUST FOLLOW THESE EXACTLY:
1. Answer ONLY from the CONTEXT below. Never use outside or general knowledge.
2. If the context does not support an answer, say so in "answer" and set "faithfulness_score" to 0.
3. "source_citation" MUST be a short quote copied verbatim from the CONTEXT.
4. Respond with a single JSON object matching the schema below exactly: no extra fields, no markdown.

CONTEXT FROM PDF:
{context}

USER QUESTION: {query}

RESPONSE SCHEMA:
{{
    "answer": "Your clear answer here.",
    "faithfulness_score": <number from 0.0 to 1.0>,
    "explanation": "Briefly explain why this score was given.",
    "source_citation": "Verbatim quote from the context."
}}"#,
            context = context,
            query = query
        )
    }
}
