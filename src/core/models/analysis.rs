use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ErrorCategory {
    Grammar,
    Spelling,
    Vocabulary,
    Pronunciation,
    Fluency,
    Content,
}

impl ErrorCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCategory::Grammar => "grammar",
            ErrorCategory::Spelling => "spelling",
            ErrorCategory::Vocabulary => "vocabulary",
            ErrorCategory::Pronunciation => "pronunciation",
            ErrorCategory::Fluency => "fluency",
            ErrorCategory::Content => "content",
        }
    }
}

/// Word offsets into the analysed text, `end` exclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WordPosition {
    pub start: usize,
    pub end: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorSpan {
    pub text: String,
    #[serde(default)]
    pub correction: Option<String>,
    #[serde(default)]
    pub explanation: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub position: Option<WordPosition>,
}

/// Error analysis as returned by the evaluation service.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DetailedAnalysis {
    #[serde(default)]
    pub grammar: Vec<ErrorSpan>,
    #[serde(default)]
    pub spelling: Vec<ErrorSpan>,
    #[serde(default)]
    pub vocabulary: Vec<ErrorSpan>,
    #[serde(default)]
    pub pronunciation: Vec<ErrorSpan>,
    #[serde(default)]
    pub fluency: Vec<ErrorSpan>,
    #[serde(default)]
    pub content: Vec<ErrorSpan>,
}

impl DetailedAnalysis {
    pub fn errors(&self) -> impl Iterator<Item = (ErrorCategory, &ErrorSpan)> {
        [
            (ErrorCategory::Grammar, &self.grammar),
            (ErrorCategory::Spelling, &self.spelling),
            (ErrorCategory::Vocabulary, &self.vocabulary),
            (ErrorCategory::Pronunciation, &self.pronunciation),
            (ErrorCategory::Fluency, &self.fluency),
            (ErrorCategory::Content, &self.content),
        ]
        .into_iter()
        .flat_map(|(category, spans)| spans.iter().map(move |s| (category, s)))
    }
}
