use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::FromRow;

use super::question::{ChoiceOption, Paragraph};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Timing {
    pub preparation_seconds: Option<u32>,
    pub recording_seconds: Option<u32>,
}

/// Media references resolved to URLs, signed where signing succeeded.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MediaUrls {
    pub audio: Option<String>,
    pub image: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Blank {
    pub key: String,
    pub index: usize,
    pub options: Vec<String>,
    pub correct_answer: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Content {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub options: Option<Vec<ChoiceOption>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub paragraphs: Option<Vec<Paragraph>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub blanks: Option<Vec<Blank>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub segments: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub blank_count: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub audio_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct AttemptSummary {
    #[serde(skip)]
    pub question_id: i32,
    pub count: i64,
    pub last_score: Option<f64>,
    pub best_score: Option<f64>,
    pub last_attempted_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PracticeQuestion {
    pub id: i32,
    #[serde(rename = "type")]
    pub type_: String,
    pub title: Option<String>,
    pub text: String,
    pub instructions: Option<&'static str>,
    pub preparation_time: Option<u32>,
    pub recording_time: Option<u32>,
    pub difficulty: Option<String>,
    pub content: Content,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub attempts: Option<AttemptSummary>,
}
