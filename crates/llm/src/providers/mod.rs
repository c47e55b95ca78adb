use crate::error::ModelError;
use async_trait::async_trait;
use serde_json::Value;

pub mod google_provider;

pub use google_provider::GoogleProvider;

/// Response of one successful model call
#[derive(Debug, Clone, PartialEq)]
pub struct ModelResponse {
    text: Option<String>,
    raw: Value,
}

impl ModelResponse {
    pub fn new(text: Option<String>, raw: Value) -> Self {
        Self { text, raw }
    }

    pub fn from_text(text: impl Into<String>) -> Self {
        let text = text.into();
        Self {
            raw: Value::String(text.clone()),
            text: Some(text),
        }
    }

    pub fn text(&self) -> Option<&str> {
        self.text.as_deref()
    }

    pub fn raw(&self) -> &Value {
        &self.raw
    }

    /// Text of the response, or the whole response rendered as a string
    /// when it carries no text
    pub fn into_text(self) -> String {
        match self.text {
            Some(text) => text,
            None => self.raw.to_string(),
        }
    }
}

/// Hosted text-in / text-out generative model
#[async_trait]
pub trait GenerativeModel: Send + Sync {
    async fn generate_content(&self, model: &str, prompt: &str)
        -> Result<ModelResponse, ModelError>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_text_fallback_renders_raw_response() {
        let raw = json!({"candidates": [], "promptFeedback": {"blockReason": "SAFETY"}});
        let response = ModelResponse::new(None, raw.clone());
        assert_eq!(response.into_text(), raw.to_string());

        assert_eq!(ModelResponse::from_text("analysis").into_text(), "analysis");
    }
}
