//! Fixed prompt templates used by the answer and summarize paths.

/// Prompt asking the generation model for a grounded, citation-aware answer.
pub(crate) fn build_answer_prompt(context: &str, question: &str) -> String {
    format!(
        "Based on the following context from multiple documents, answer the question accurately and concisely.\n\
         \n\
         Context:\n\
         {context}\n\
         \n\
         Question: {question}\n\
         \n\
         Answer (be specific and cite which document if relevant):"
    )
}

/// Prompt asking the generation model for a 5-7 bullet summary of the sampled content.
pub(crate) fn build_summary_prompt(sample: &str) -> String {
    format!(
        "Summarize the following document content in 5-7 bullet points, highlighting the main points and key information:\n\
         \n\
         {sample}\n\
         \n\
         Summary:"
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn answer_prompt_embeds_context_and_question() {
        let prompt = build_answer_prompt("chunk one\n\nchunk two", "What changed?");
        assert!(prompt.contains("Context:\nchunk one\n\nchunk two"));
        assert!(prompt.contains("Question: What changed?"));
        assert!(prompt.ends_with("Answer (be specific and cite which document if relevant):"));
    }

    #[test]
    fn summary_prompt_requests_bullets() {
        let prompt = build_summary_prompt("sampled text");
        assert!(prompt.contains("5-7 bullet points"));
        assert!(prompt.contains("sampled text"));
        assert!(prompt.ends_with("Summary:"));
    }
}
