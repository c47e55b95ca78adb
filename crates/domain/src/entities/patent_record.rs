//! PatentRecord - a single prior-art entry of the corpus

use crate::RowId;
use serde::{Deserialize, Serialize};

/// Immutable patent record.
///
/// Records loaded from the corpus always carry every field and a `row_id`.
/// Records echoed back by a client (the candidate set of an analysis request)
/// may miss any of them, so every field is optional.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PatentRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,

    #[serde(rename = "abstract", default, skip_serializing_if = "Option::is_none")]
    pub abstract_text: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub publication_number: Option<String>,

    /// Opaque display string, never parsed
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,

    /// Corpus position, assigned on load
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub row_id: Option<RowId>,
}

impl PatentRecord {
    pub fn new(
        title: impl Into<String>,
        abstract_text: impl Into<String>,
        publication_number: impl Into<String>,
        date: impl Into<String>,
    ) -> Self {
        Self {
            title: Some(title.into()),
            abstract_text: Some(abstract_text.into()),
            publication_number: Some(publication_number.into()),
            date: Some(date.into()),
            row_id: None,
        }
    }

    /// Attach the corpus position
    pub fn with_row_id(mut self, row_id: RowId) -> Self {
        self.row_id = Some(row_id);
        self
    }

    pub fn title(&self) -> Option<&str> {
        self.title.as_deref()
    }

    pub fn abstract_text(&self) -> Option<&str> {
        self.abstract_text.as_deref()
    }

    pub fn publication_number(&self) -> Option<&str> {
        self.publication_number.as_deref()
    }

    pub fn date(&self) -> Option<&str> {
        self.date.as_deref()
    }

    /// Text fed to the embedding function when the corpus is embedded
    pub fn embedding_text(&self) -> String {
        match (self.title(), self.abstract_text()) {
            (Some(title), Some(abstract_text)) => format!("{title}. {abstract_text}"),
            (Some(title), None) => title.to_string(),
            (None, Some(abstract_text)) => abstract_text.to_string(),
            (None, None) => String::new(),
        }
    }
}
