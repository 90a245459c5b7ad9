use betterprompt_core::{PromptType, Tone};

/// Base system instruction sent with every remote optimization.
pub const SYSTEM_PROMPT: &str = "You are a professional Prompt Engineer who helps users rewrite vague, poorly structured prompts into clear, detailed, and highly effective prompts optimized for large language models.

Instructions:
- Read the user's input prompt carefully.
- Rewrite it clearly, filling in missing context if needed.
- Format the result so it's suitable to be directly used with GPT or Claude for best results.
- Preserve original intent but make it more actionable and detailed.

Respond ONLY with the improved prompt.
Do not add explanations or extra comments.";

/// Base instruction plus the fixed tone and type suffixes.
pub fn build_system_instruction(tone: Tone, prompt_type: PromptType) -> String {
    let mut instruction = String::from(SYSTEM_PROMPT);
    if let Some(suffix) = tone.instruction_suffix() {
        instruction.push_str(suffix);
    }
    if let Some(suffix) = prompt_type.instruction_suffix() {
        instruction.push_str(suffix);
    }
    instruction
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_send_the_bare_instruction() {
        assert_eq!(
            build_system_instruction(Tone::Professional, PromptType::General),
            SYSTEM_PROMPT
        );
    }

    #[test]
    fn tone_then_type_suffixes() {
        let s = build_system_instruction(Tone::Casual, PromptType::Research);
        assert!(s.starts_with(SYSTEM_PROMPT));
        assert!(s.ends_with(
            "\n\nTone: Make the optimized prompt casual.\n\nPrompt Type: Optimize specifically for research."
        ));
    }
}
