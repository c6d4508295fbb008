//! Instruction template for the summarisation request.
//!
//! Callers can override the instruction via
//! [`crate::config::SummarizerConfig::instruction`]; the constant here is used
//! when no override is provided.

/// Default instruction placed before the extracted text.
pub const DEFAULT_INSTRUCTION: &str = "Summarize the following text:";

/// Build the single prompt sent to the service: the instruction, a blank
/// line, then the document text.
pub fn build_prompt(instruction: &str, text: &str) -> String {
    format!("{}\n\n{}", instruction.trim_end(), text)
}
