//! Rating taxonomy and the classification input/output types.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize};

use crate::error::ClassifierError;

/// Age-rating tiers, ordered from most to least permissive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Rating {
    /// Minimal, non-detailed violence. Family-friendly.
    #[serde(rename = "6+")]
    Six,
    /// Moderate violence, brief non-sexual nudity, mild language.
    #[serde(rename = "12+")]
    Twelve,
    /// Intense violence, partial nudity, strong language.
    #[serde(rename = "16+")]
    Sixteen,
    /// Explicit violence, sexual content, very strong language.
    #[serde(rename = "18+")]
    Eighteen,
}

impl Rating {
    pub const ALL: [Rating; 4] = [Rating::Six, Rating::Twelve, Rating::Sixteen, Rating::Eighteen];

    pub fn as_str(&self) -> &'static str {
        match self {
            Rating::Six      => "6+",
            Rating::Twelve   => "12+",
            Rating::Sixteen  => "16+",
            Rating::Eighteen => "18+",
        }
    }

    /// Exact-literal lookup. `"12"`, `" 12+"` or `"PG-13"` are all rejected.
    pub fn parse(s: &str) -> Option<Rating> {
        Rating::ALL.into_iter().find(|r| r.as_str() == s)
    }
}

impl fmt::Display for Rating {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Rating {
    type Err = ClassifierError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Rating::parse(s)
            .ok_or_else(|| ClassifierError::Configuration(format!("unknown rating: {}", s)))
    }
}

/// Content to classify. Also the request shape accepted by the CLI and the
/// `/classify` wire contract; every field is optional on the wire and `null`
/// reads as empty.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ClassificationInput {
    /// Opaque caller metadata, rendered into the prompt as JSON.
    #[serde(default, deserialize_with = "null_as_default")]
    pub metadata: serde_json::Map<String, serde_json::Value>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub transcript: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub vision_labels: Vec<String>,
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

impl ClassificationInput {
    pub fn new(
        metadata: serde_json::Map<String, serde_json::Value>,
        transcript: impl Into<String>,
        vision_labels: Vec<String>,
    ) -> Self {
        Self {
            metadata,
            transcript: transcript.into(),
            vision_labels,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.metadata.is_empty() && self.transcript.is_empty() && self.vision_labels.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassificationResult {
    pub rating: Rating,
    pub reason: String,
}

impl ClassificationResult {
    pub fn new(rating: Rating, reason: impl Into<String>) -> Self {
        Self {
            rating,
            reason: reason.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ratings_ordered_by_permissiveness() {
        assert!(Rating::Six < Rating::Twelve);
        assert!(Rating::Twelve < Rating::Sixteen);
        assert!(Rating::Sixteen < Rating::Eighteen);
        assert_eq!(Rating::ALL.iter().max(), Some(&Rating::Eighteen));
    }

    #[test]
    fn test_parse_accepts_only_exact_literals() {
        for r in Rating::ALL {
            assert_eq!(Rating::parse(r.as_str()), Some(r));
        }
        assert_eq!(Rating::parse("PG-13"), None);
        assert_eq!(Rating::parse("12"), None);
        assert_eq!(Rating::parse(" 12+"), None);
        assert!("R".parse::<Rating>().is_err());
    }

    #[test]
    fn test_result_serializes_to_wire_shape() {
        let result = ClassificationResult::new(Rating::Sixteen, "strong language");
        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json, serde_json::json!({"rating": "16+", "reason": "strong language"}));
    }

    #[test]
    fn test_input_defaults_missing_fields() {
        let input: ClassificationInput =
            serde_json::from_str(r#"{"transcript": "hello"}"#).unwrap();
        assert!(input.metadata.is_empty());
        assert_eq!(input.transcript, "hello");
        assert!(input.vision_labels.is_empty());
        assert!(!input.is_empty());
        assert!(ClassificationInput::default().is_empty());
    }

    #[test]
    fn test_input_null_fields_read_as_empty() {
        let input: ClassificationInput = serde_json::from_str(
            r#"{"metadata": null, "transcript": null, "vision_labels": ["a"]}"#,
        )
        .unwrap();
        assert!(input.metadata.is_empty());
        assert!(input.transcript.is_empty());
        assert_eq!(input.vision_labels, vec!["a"]);
    }
}
