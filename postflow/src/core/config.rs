//! Per-stage configuration map.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Configuration for a single stage.
///
/// Keys are stage-specific; unrecognized keys are carried along but
/// ignored by the engine. Values are free-form JSON so the UI layer can
/// round-trip whatever it stores.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StageConfig {
    values: HashMap<String, serde_json::Value>,
}

/// Well-known configuration keys.
pub mod keys {
    /// Free-text subject of the run.
    pub const TOPIC: &str = "topic";
    /// Base64 reference image payload.
    pub const REFERENCE_IMAGE: &str = "reference_image";
    /// Opaque social-platform credential.
    pub const AUTH_TOKEN: &str = "auth_token";
    /// Writing tone for the compose stage.
    pub const TONE: &str = "tone";
    /// Output language for the compose stage.
    pub const LANGUAGE: &str = "language";
    /// Target post length for the compose stage.
    pub const LENGTH: &str = "length";
    /// Number of images the visual stage requests.
    pub const IMAGE_COUNT: &str = "image_count";
    /// Visual style hint for image generation.
    pub const IMAGE_STYLE: &str = "image_style";
}

impl StageConfig {
    /// Creates an empty configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets a value, builder style.
    #[must_use]
    pub fn with(mut self, key: impl Into<String>, value: serde_json::Value) -> Self {
        self.values.insert(key.into(), value);
        self
    }

    /// Sets a string value, builder style.
    #[must_use]
    pub fn with_str(self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.with(key, serde_json::Value::String(value.into()))
    }

    /// Sets a value in place.
    pub fn set(&mut self, key: impl Into<String>, value: serde_json::Value) {
        self.values.insert(key.into(), value);
    }

    /// Gets a raw value.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&serde_json::Value> {
        self.values.get(key)
    }

    /// Gets a string value, treating empty strings as absent.
    #[must_use]
    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.values
            .get(key)
            .and_then(serde_json::Value::as_str)
            .filter(|s| !s.trim().is_empty())
    }

    /// The run topic, if set.
    #[must_use]
    pub fn topic(&self) -> Option<&str> {
        self.get_str(keys::TOPIC)
    }

    /// The base64 reference image payload, if set.
    #[must_use]
    pub fn reference_image(&self) -> Option<&str> {
        self.get_str(keys::REFERENCE_IMAGE)
    }

    /// The social credential, if set.
    #[must_use]
    pub fn auth_token(&self) -> Option<&str> {
        self.get_str(keys::AUTH_TOKEN)
    }

    /// The compose tone, if set.
    #[must_use]
    pub fn tone(&self) -> Option<&str> {
        self.get_str(keys::TONE)
    }

    /// The compose language, if set.
    #[must_use]
    pub fn language(&self) -> Option<&str> {
        self.get_str(keys::LANGUAGE)
    }

    /// The compose length, if set.
    #[must_use]
    pub fn length(&self) -> Option<&str> {
        self.get_str(keys::LENGTH)
    }

    /// The number of images the visual stage should request (minimum 1).
    #[must_use]
    pub fn image_count(&self) -> usize {
        self.values
            .get(keys::IMAGE_COUNT)
            .and_then(serde_json::Value::as_u64)
            .map_or(1, |n| n.max(1) as usize)
    }

    /// The visual style hint, if set.
    #[must_use]
    pub fn image_style(&self) -> Option<&str> {
        self.get_str(keys::IMAGE_STYLE)
    }

    /// Merges a partial configuration into this one, last writer wins.
    pub fn merge(&mut self, partial: &Self) {
        for (key, value) in &partial.values {
            self.values.insert(key.clone(), value.clone());
        }
    }

    /// Returns true if no keys are set.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Number of keys set.
    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_typed_accessors() {
        let config = StageConfig::new()
            .with_str(keys::TOPIC, "AI tools for startups")
            .with_str(keys::TONE, "Founder Story")
            .with(keys::IMAGE_COUNT, serde_json::json!(4));

        assert_eq!(config.topic(), Some("AI tools for startups"));
        assert_eq!(config.tone(), Some("Founder Story"));
        assert_eq!(config.image_count(), 4);
        assert_eq!(config.language(), None);
    }

    #[test]
    fn test_empty_string_treated_as_absent() {
        let config = StageConfig::new().with_str(keys::TOPIC, "   ");
        assert_eq!(config.topic(), None);
    }

    #[test]
    fn test_image_count_defaults_to_one() {
        assert_eq!(StageConfig::new().image_count(), 1);

        let zero = StageConfig::new().with(keys::IMAGE_COUNT, serde_json::json!(0));
        assert_eq!(zero.image_count(), 1);
    }

    #[test]
    fn test_merge_last_writer_wins() {
        let mut config = StageConfig::new()
            .with_str(keys::TONE, "Professional")
            .with_str(keys::LANGUAGE, "en");

        let partial = StageConfig::new().with_str(keys::TONE, "Casual");
        config.merge(&partial);

        assert_eq!(config.tone(), Some("Casual"));
        assert_eq!(config.language(), Some("en"));
    }

    #[test]
    fn test_unrecognized_keys_preserved() {
        let config = StageConfig::new().with_str("canvas_color", "teal");
        assert_eq!(
            config.get("canvas_color"),
            Some(&serde_json::json!("teal"))
        );
    }

    #[test]
    fn test_serialization_is_transparent() {
        let config = StageConfig::new().with_str(keys::TONE, "Witty");
        let json = serde_json::to_string(&config).unwrap();
        assert_eq!(json, r#"{"tone":"Witty"}"#);

        let back: StageConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(back, config);
    }
}
