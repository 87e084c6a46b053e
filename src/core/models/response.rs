use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sqlx::FromRow;
use std::collections::BTreeMap;

use super::question::ScoringFamily;
use super::score::Evaluation;
use crate::error::Error;

/// A user's answer, shaped by the scoring family of the question it answers.
#[derive(Debug, Clone, PartialEq)]
pub enum UserResponse {
    SingleChoice { selected_option: String },
    MultiChoice { selected_options: Vec<String> },
    Reorder { ordered_paragraphs: Vec<String> },
    Blanks { blanks: BTreeMap<String, String> },
    HighlightWords { highlighted_words: Vec<String> },
    Text { text: String },
    Spoken { transcript: Option<String>, audio_key: Option<String> },
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct SingleChoiceBody {
    selected_option: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct MultiChoiceBody {
    selected_options: Vec<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ReorderBody {
    ordered_paragraphs: Vec<String>,
}

#[derive(Deserialize)]
struct BlanksBody {
    blanks: BTreeMap<String, String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct HighlightBody {
    highlighted_words: Vec<String>,
}

#[derive(Deserialize)]
struct TextBody {
    text: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct SpokenBody {
    transcript: Option<String>,
    audio_key: Option<String>,
}

impl UserResponse {
    /// Parses a raw response body into the shape the family expects.
    ///
    /// Open-ended families accept either a `text` body (writing) or a
    /// `transcript`/`audioKey` body (speaking).
    pub fn parse(family: ScoringFamily, value: Value) -> Result<Self, Error> {
        let res = match family {
            ScoringFamily::SingleChoice => serde_json::from_value::<SingleChoiceBody>(value).map(|b| UserResponse::SingleChoice { selected_option: b.selected_option }),
            ScoringFamily::MultiChoice => serde_json::from_value::<MultiChoiceBody>(value).map(|b| UserResponse::MultiChoice { selected_options: b.selected_options }),
            ScoringFamily::Reorder => serde_json::from_value::<ReorderBody>(value).map(|b| UserResponse::Reorder {
                ordered_paragraphs: b.ordered_paragraphs,
            }),
            ScoringFamily::Blanks(_) => serde_json::from_value::<BlanksBody>(value).map(|b| UserResponse::Blanks { blanks: b.blanks }),
            ScoringFamily::HighlightIncorrectWords => serde_json::from_value::<HighlightBody>(value).map(|b| UserResponse::HighlightWords {
                highlighted_words: b.highlighted_words,
            }),
            ScoringFamily::Dictation => serde_json::from_value::<TextBody>(value).map(|b| UserResponse::Text { text: b.text }),
            ScoringFamily::External => {
                if value.get("text").is_some() {
                    serde_json::from_value::<TextBody>(value).map(|b| UserResponse::Text { text: b.text })
                } else {
                    serde_json::from_value::<SpokenBody>(value).map(|b| UserResponse::Spoken {
                        transcript: b.transcript,
                        audio_key: b.audio_key,
                    })
                }
            }
        };
        res.map_err(|e| Error::BusinessError(format!("invalid response: {}", e)))
    }

    /// The free text the user produced, if any.
    pub fn text(&self) -> Option<&str> {
        match self {
            UserResponse::Text { text } => Some(text),
            UserResponse::Spoken { transcript, .. } => transcript.as_deref(),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Submission {
    pub response: Value,
    pub time_taken_seconds: Option<i32>,
    pub evaluation: Option<Evaluation>,
}

#[derive(Debug, Clone, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct PracticeResponse {
    pub id: i32,
    pub user_id: i32,
    pub question_id: i32,
    pub question_type: String,
    pub response: Value,
    pub score: f64,
    pub is_correct: bool,
    pub time_taken_seconds: Option<i32>,
    pub evaluation: Option<Value>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct Insert {
    pub user_id: i32,
    pub question_id: i32,
    pub question_type: String,
    pub response: Value,
    pub score: f64,
    pub is_correct: bool,
    pub time_taken_seconds: Option<i32>,
    pub evaluation: Option<Value>,
}

#[derive(Debug, Default, Clone)]
pub struct Query {
    pub user_id_eq: Option<i32>,
    pub question_id_eq: Option<i32>,
}
