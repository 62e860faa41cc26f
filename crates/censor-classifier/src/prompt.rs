//! Classification prompt rendering.
//!
//! The instruction and closing blocks are reproduced verbatim; models and
//! downstream tooling expect exactly this wording.

use crate::rating::ClassificationInput;

/// Characters of transcript kept in the prompt.
pub const TRANSCRIPT_CHAR_LIMIT: usize = 1000;

/// Appended after the transcript excerpt, truncated or not.
pub const TRUNCATION_MARKER: &str = "...";

const INSTRUCTIONS: &str = "You are a content rating classifier. Analyze the provided content and assign an appropriate age rating.

RATING GUIDELINES:
- 6+: Minimal, non-detailed violence. No nudity. Family-friendly content.
- 12+: Moderate violence without injury detail. Brief, non-sexual nudity. Mild language.
- 16+: Intense but non-gratuitous violence. Partial nudity and implied sexual content. Strong language.
- 18+: Explicit violence with gore. Nudity, including sexual content. Very strong language.

CONTENT TO ANALYZE:
";

const CLOSING: &str = "

Please respond with ONLY a valid JSON object in this exact format:
{
  \"rating\": \"6+ / 12+ / 16+ / 18+\",
  \"reason\": \"short explanation of why this rating was assigned\"
}";

/// Render the full prompt for one classification request.
pub fn build_prompt(input: &ClassificationInput) -> String {
    let mut prompt = String::from(INSTRUCTIONS);

    if !input.metadata.is_empty() {
        prompt.push_str("\nMETADATA: ");
        prompt.push_str(&render_metadata(&input.metadata));
    }

    if !input.transcript.is_empty() {
        prompt.push_str("\nTRANSCRIPT: ");
        prompt.extend(input.transcript.chars().take(TRANSCRIPT_CHAR_LIMIT));
        prompt.push_str(TRUNCATION_MARKER);
    }

    if !input.vision_labels.is_empty() {
        prompt.push_str("\nVISION LABELS: ");
        prompt.push_str(&input.vision_labels.join(", "));
    }

    prompt.push_str(CLOSING);
    prompt
}

fn render_metadata(metadata: &serde_json::Map<String, serde_json::Value>) -> String {
    // A map of JSON values always serializes; the fallback keeps this infallible.
    serde_json::to_string_pretty(metadata).unwrap_or_else(|_| "{}".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn input(metadata: serde_json::Value, transcript: &str, labels: &[&str]) -> ClassificationInput {
        ClassificationInput::new(
            metadata.as_object().cloned().unwrap_or_default(),
            transcript,
            labels.iter().map(|s| s.to_string()).collect(),
        )
    }

    #[test]
    fn test_empty_input_has_only_fixed_blocks() {
        let prompt = build_prompt(&ClassificationInput::default());
        assert_eq!(prompt, format!("{}{}", INSTRUCTIONS, CLOSING));
        assert!(!prompt.contains("METADATA:"));
        assert!(!prompt.contains("TRANSCRIPT:"));
        assert!(!prompt.contains("VISION LABELS:"));
    }

    #[test]
    fn test_sections_in_fixed_order() {
        let prompt = build_prompt(&input(
            json!({"filename": "test_video.mp4", "duration": 120}),
            "Action scene with characters fighting",
            &["action", "fighting", "outdoor"],
        ));

        let meta = prompt.find("\nMETADATA: ").unwrap();
        let transcript = prompt.find("\nTRANSCRIPT: ").unwrap();
        let labels = prompt.find("\nVISION LABELS: ").unwrap();
        let closing = prompt.find("Please respond with ONLY").unwrap();
        assert!(meta < transcript && transcript < labels && labels < closing);

        assert!(prompt.contains("\nTRANSCRIPT: Action scene with characters fighting...\n"));
        assert!(prompt.contains("\nVISION LABELS: action, fighting, outdoor\n"));
    }

    #[test]
    fn test_metadata_is_indented_json_in_insertion_order() {
        let prompt = build_prompt(&input(
            json!({"title": "Clip", "duration": 120}),
            "",
            &[],
        ));
        assert!(prompt.contains(
            "\nMETADATA: {\n  \"title\": \"Clip\",\n  \"duration\": 120\n}"
        ));
    }

    #[test]
    fn test_transcript_truncated_to_limit_mid_word() {
        let transcript: String = "abcdefghij".repeat(500);
        assert_eq!(transcript.chars().count(), 5000);

        let prompt = build_prompt(&input(json!({}), &transcript, &[]));
        let expected = format!("\nTRANSCRIPT: {}...", &transcript[..TRANSCRIPT_CHAR_LIMIT]);
        assert!(prompt.contains(&expected));
        assert!(!prompt.contains(&transcript[..TRANSCRIPT_CHAR_LIMIT + 1]));
    }

    #[test]
    fn test_truncation_counts_characters_not_bytes() {
        let transcript: String = "é".repeat(1500);
        let prompt = build_prompt(&input(json!({}), &transcript, &[]));
        let kept: String = "é".repeat(TRANSCRIPT_CHAR_LIMIT);
        assert!(prompt.contains(&format!("TRANSCRIPT: {}...", kept)));
        assert!(!prompt.contains(&"é".repeat(TRANSCRIPT_CHAR_LIMIT + 1)));
    }

    #[test]
    fn test_deterministic() {
        let i = input(json!({"a": 1}), "text", &["x"]);
        assert_eq!(build_prompt(&i), build_prompt(&i));
    }

    #[test]
    fn test_closing_block_lists_allowed_ratings() {
        let prompt = build_prompt(&ClassificationInput::default());
        assert!(prompt.ends_with(
            "{\n  \"rating\": \"6+ / 12+ / 16+ / 18+\",\n  \"reason\": \"short explanation of why this rating was assigned\"\n}"
        ));
    }
}
