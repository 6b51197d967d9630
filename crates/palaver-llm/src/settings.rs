//! Per-call completion settings

use serde::{Deserialize, Serialize};

/// Sampling settings for one completion call.
///
/// Each call owns its own snapshot; adapters never store the settings
/// of an in-flight call on the instance, so concurrent calls through
/// one adapter cannot observe each other's settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompletionSettings {
    /// Sampling temperature
    pub temperature: f32,

    /// Stop sequences: once generated, the engine stops producing output.
    /// When empty, the adapter's constructed anti-prompt list applies.
    pub anti_prompts: Vec<String>,
}

impl Default for CompletionSettings {
    fn default() -> Self {
        Self {
            temperature: 0.0,
            anti_prompts: Vec::new(),
        }
    }
}

impl CompletionSettings {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    pub fn with_anti_prompts(mut self, anti_prompts: Vec<String>) -> Self {
        self.anti_prompts = anti_prompts;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_settings() {
        let settings = CompletionSettings::default();
        assert_eq!(settings.temperature, 0.0);
        assert!(settings.anti_prompts.is_empty());
    }

    #[test]
    fn builder_pattern() {
        let settings = CompletionSettings::new()
            .with_temperature(0.7)
            .with_anti_prompts(vec!["User:".to_string()]);
        assert_eq!(settings.temperature, 0.7);
        assert_eq!(settings.anti_prompts, vec!["User:".to_string()]);
    }
}
