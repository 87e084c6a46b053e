use serde::Deserialize;

use crate::core::models::analysis::DetailedAnalysis;
use crate::core::models::question::{PracticeStatus, QuestionType};

#[derive(Debug, Deserialize)]
pub struct Pagination {
    pub page: Option<i64>,
    pub size: Option<i64>,
}

#[derive(Debug, Deserialize)]
pub struct PracticeQuestionsQuery {
    #[serde(rename = "type")]
    pub type_: QuestionType,
    pub limit: Option<i64>,
    #[serde(default)]
    pub random: bool,
    pub difficulty: Option<String>,
    #[serde(default)]
    pub status: PracticeStatus,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnnotationRequest {
    pub text: String,
    #[serde(default)]
    pub detailed_analysis: DetailedAnalysis,
}

#[derive(Debug, Deserialize)]
pub struct MediaToken {
    pub token: String,
}
