//! Grading prompt construction.

/// Sent in place of a blank answer.
pub const NO_ANSWER_PLACEHOLDER: &str = "(No answer provided)";

/// System and user messages for one grading request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GradingPrompt {
    pub system: String,
    pub user: String,
}

impl GradingPrompt {
    pub fn new(subject: &str, question: &str, reference_answer: &str, user_answer: &str) -> Self {
        let system = format!(
            "You are an expert senior {subject} engineer and interviewer. \
             Given an interview question, a reference answer and a candidate's answer, do the following:\n\
             1. Assess whether the candidate's answer is correct, partially correct or incorrect.\n\
             2. List the important points the candidate missed or got wrong.\n\
             3. Give the corrected or ideal explanation, using the reference answer as ground truth.\n\
             4. Format your response with Markdown (bold for emphasis, code blocks for examples).\n\
             5. Be detailed but concise, suitable for an engineer preparing for interviews."
        );

        let answer = if user_answer.trim().is_empty() {
            NO_ANSWER_PLACEHOLDER
        } else {
            user_answer
        };

        let user = format!(
            "Question: {question}\n\
             Reference answer: {reference_answer}\n\
             User's answer: {answer}"
        );

        Self { system, user }
    }
}
