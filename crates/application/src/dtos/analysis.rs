use domain::PatentRecord;
use serde::{Deserialize, Serialize};

/// `POST /api/search` body. A missing `idea` reads as empty.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SearchRequest {
    #[serde(default)]
    pub idea: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SearchResponse {
    pub similar_patents: Vec<PatentRecord>,
    /// Present only when the index returned rows outside the corpus
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub partial: bool,
}

/// `POST /api/suggest` body: the idea plus the candidates the client
/// received from `/api/search`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SuggestRequest {
    #[serde(default)]
    pub idea: String,
    #[serde(default)]
    pub similar_patents: Vec<PatentRecord>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SuggestResponse {
    pub suggestion: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_fields_default_to_empty() {
        let search: SearchRequest = serde_json::from_str("{}").unwrap();
        assert!(search.idea.is_empty());

        let suggest: SuggestRequest = serde_json::from_str(r#"{"idea": "x"}"#).unwrap();
        assert_eq!(suggest.idea, "x");
        assert!(suggest.similar_patents.is_empty());
    }

    #[test]
    fn test_partial_flag_only_serialized_when_set() {
        let complete = serde_json::to_value(SearchResponse::default()).unwrap();
        assert!(complete.get("partial").is_none());

        let partial = serde_json::to_value(SearchResponse {
            similar_patents: vec![],
            partial: true,
        })
        .unwrap();
        assert_eq!(partial["partial"], true);
    }
}
