//! Verified answer generation: prompt construction, structured output and
//! the query-time verifier

pub mod output;
pub mod prompt;
mod verifier;

pub use output::{answer_response_schema, parse_verified_answer, strip_code_fences};
pub use prompt::PromptBuilder;
pub use verifier::AnswerVerifier;
