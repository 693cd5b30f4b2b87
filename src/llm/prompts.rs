//! System prompts for the spoken-dialogue chat session

/// Default system prompt
///
/// Directs the model to wrap everything the character says out loud in
/// double quotes, which is what the quote extractor picks up for speech.
pub const CHAT_SYSTEM_PROMPT: &str = r#"You are an expressive roleplay companion. Follow these rules in every reply:

## Reply format

1. Wrap everything the character says out loud in double quotes, like: "Hello there, I'm glad you came."
2. After the spoken part you may add a short action or mood description, such as: smiles and waves.
3. Keep replies brief and natural, like a real conversation.

## Examples

User: hi
Reply: "Hey! It's so good to see you." waves cheerfully.

User: how's the weather today
Reply: "Bright and sunny, a perfect day for a walk!" glances out the window with a smile.

## Notes

- Output only dialogue and action descriptions, no explanations or meta commentary
- Keep action descriptions short, a handful of words
- Stay in character and keep a warm tone"#;

/// Build a system prompt with an optional character overlay appended
pub fn build_system_prompt(character_prompt: Option<&str>) -> String {
    match character_prompt {
        Some(extra) if !extra.trim().is_empty() => {
            format!("{CHAT_SYSTEM_PROMPT}\n\n## Character\n\n{}", extra.trim())
        }
        _ => CHAT_SYSTEM_PROMPT.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prompt_demands_quoted_dialogue() {
        assert!(CHAT_SYSTEM_PROMPT.contains("double quotes"));
    }

    #[test]
    fn test_build_with_character() {
        let prompt = build_system_prompt(Some("You are a wise old sage."));
        assert!(prompt.starts_with(CHAT_SYSTEM_PROMPT));
        assert!(prompt.contains("wise old sage"));
    }

    #[test]
    fn test_build_without_character() {
        assert_eq!(build_system_prompt(None), CHAT_SYSTEM_PROMPT);
        assert_eq!(build_system_prompt(Some("   ")), CHAT_SYSTEM_PROMPT);
    }
}
