//! Prompt construction for patent analysis
//!
//! The prompt is a pure function of the idea and the candidate list:
//! no timestamps, no randomness, identical bytes for identical input.

use domain::PatentRecord;
use std::fmt::{self, Write};

const NOT_AVAILABLE: &str = "N/A";

/// Rendered generation prompt
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Prompt(String);

impl Prompt {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl AsRef<str> for Prompt {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Prompt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, Default)]
pub struct PromptBuilder {
    max_candidates: Option<usize>,
}

impl PromptBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Render at most `max` candidates; the rest are ignored
    pub fn with_max_candidates(mut self, max: usize) -> Self {
        self.max_candidates = Some(max);
        self
    }

    pub fn build(&self, idea: &str, candidates: &[PatentRecord]) -> Prompt {
        let shown = match self.max_candidates {
            Some(max) => &candidates[..candidates.len().min(max)],
            None => candidates,
        };

        let mut patent_info = String::new();
        for (i, patent) in shown.iter().enumerate() {
            render_candidate(&mut patent_info, i + 1, patent);
        }

        Prompt(format!(
            r#"You are an expert patent analyst AI assistant. Analyze the user's invention idea against similar patents found through semantic search.

**User's Invention Idea:**
{idea}

**Similar Patents Found ({count}):**
{patent_info}

**Instructions:**
Provide a comprehensive patent analysis in the following structured format. Use clear headings and professional language.

## 📊 Patent Landscape Analysis

Provide a brief overview of how the user's idea relates to the existing patent landscape.

## 🔍 Key Overlaps with Existing Patents

Identify and explain the main areas where the user's idea overlaps with the similar patents listed above. Reference specific patent titles or numbers.

## ✨ Novelty & Unique Aspects

Highlight what is **new, unique, or different** in the user's idea that is NOT covered by the existing patents. Be specific about the innovative elements.

## 💡 Recommendations to Strengthen Patentability

Suggest 3-5 concrete improvements or modifications that would:
- Increase the novelty of the invention
- Make it more defensible as a patent
- Differentiate it from prior art

## ⚖️ Patentability Assessment

Provide a brief assessment of the overall patentability potential (High/Medium/Low) with reasoning.

**Important Guidelines:**
- Be concise and professional
- Use bullet points for clarity
- Reference specific patents when making comparisons
- Focus on actionable insights
- Do not include disclaimers about missing information
"#,
            count = shown.len(),
        ))
    }
}

fn render_candidate(out: &mut String, index: usize, patent: &PatentRecord) {
    // Writing into a String cannot fail
    let _ = write!(
        out,
        "{index}. **{title}**\n   - Patent Number: {number}\n   - Date: {date}\n   - Abstract: {abstract_text}\n\n",
        title = patent.title().unwrap_or(NOT_AVAILABLE),
        number = patent.publication_number().unwrap_or(""),
        date = patent.date().unwrap_or(NOT_AVAILABLE),
        abstract_text = patent.abstract_text().unwrap_or(NOT_AVAILABLE),
    );
}
