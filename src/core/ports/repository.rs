use crate::core::models::{
    common::Pagination,
    practice::AttemptSummary,
    question::{Query as QuestionQuery, Question},
    response::{Insert as ResponseInsert, PracticeResponse, Query as ResponseQuery},
};
use crate::error::Error;

pub trait QuestionCommon {
    async fn query(&mut self, query: &QuestionQuery, pagination: Option<Pagination>) -> Result<Vec<Question>, Error>;
    async fn count(&mut self, query: &QuestionQuery) -> Result<i64, Error>;
    async fn get(&mut self, id: i32) -> Result<Option<Question>, Error>;
}

pub trait PracticeResponseCommon {
    async fn insert(&mut self, response: ResponseInsert) -> Result<i32, Error>;
    async fn query(&mut self, query: &ResponseQuery, pagination: Option<Pagination>) -> Result<Vec<PracticeResponse>, Error>;
    async fn count(&mut self, query: &ResponseQuery) -> Result<i64, Error>;
    async fn attempt_summaries(&mut self, user_id: i32, question_ids: &[i32]) -> Result<Vec<AttemptSummary>, Error>;
}

pub trait Store: QuestionCommon + PracticeResponseCommon {}
