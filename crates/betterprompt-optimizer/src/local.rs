//! Rule-based prompt rewriting that needs no network access.
//!
//! Rules are additive and applied in order. The function is not idempotent:
//! feeding its output back in appends the blocks again.

/// Model name reported for locally optimized results.
pub const LOCAL_MODEL: &str = "local-optimizer";

/// Prompts shorter than this (in characters, after trimming) get the guidance block.
pub const SHORT_PROMPT_CHARS: usize = 50;

pub const CONTEXT_PREFIX: &str = "Please help me with the following: ";

pub const GUIDANCE_BLOCK: &str = "Please provide:
- Clear and detailed instructions
- Specific examples if relevant
- Step-by-step guidance where appropriate
- Any important context or constraints";

pub const FORMAT_BLOCK: &str = "Format requirements:
- Use clear, professional language
- Include proper structure and organization
- Consider the target audience
- Ensure the content is engaging and informative";

pub const CODE_BLOCK: &str = "Code requirements:
- Use best practices and clean code principles
- Include proper comments and documentation
- Handle edge cases and errors appropriately
- Follow relevant coding standards";

pub const EMAIL_BLOCK: &str = "Email requirements:
- Use appropriate professional tone
- Include clear subject line suggestion
- Structure with proper greeting, body, and closing
- Keep it concise but comprehensive";

pub fn rewrite(text: &str) -> String {
    let prompt = text.trim();
    let lower = prompt.to_lowercase();

    let mut out = if !prompt.contains("please") && !prompt.contains("help") {
        format!("{CONTEXT_PREFIX}{prompt}")
    } else {
        prompt.to_string()
    };

    let blocks = [
        (prompt.chars().count() < SHORT_PROMPT_CHARS, GUIDANCE_BLOCK),
        (lower.contains("write"), FORMAT_BLOCK),
        (lower.contains("code"), CODE_BLOCK),
        (lower.contains("email"), EMAIL_BLOCK),
    ];
    for (applies, block) in blocks {
        if applies {
            out.push_str("\n\n");
            out.push_str(block);
        }
    }
    out
}
