use crate::llm::models::provider_base::CodeError;

pub const ASSISTANT_SYSTEM_PROMPT: &str = "You are an expert coding assistant in JupyterLab. \
You have access to the current notebook content and chat history. \
Provide helpful, concise responses to code-related questions. \
When providing code suggestions, ensure they are correct, well-documented, and follow best practices. \
You can reference specific cells from the notebook in your responses. \
For code suggestions, wrap the code in ```python and ``` tags.";

pub const DEBUGGER_SYSTEM_PROMPT: &str = "You are an expert Python code debugger. \
When provided code with errors, fix the errors and return only the corrected code \
without explanations or markdown formatting.";

/// The current user turn: rendered notebook followed by the request.
pub fn notebook_turn(notebook_context: &str, prompt: &str) -> String {
    format!(
        "Current notebook:\n{}\n\nUser request: {}",
        notebook_context, prompt
    )
}

pub fn fix_request(code: &str, errors: &[CodeError]) -> String {
    let error_text = errors
        .iter()
        .enumerate()
        .map(|(i, e)| format!("Error {}: {}", i + 1, e.message))
        .collect::<Vec<_>>()
        .join("\n");

    format!(
        "Fix the following Python code that has errors:\n\n```python\n{}\n```\n\nErrors:\n{}\n\nProvide only the fixed code without explanations.",
        code, error_text
    )
}
