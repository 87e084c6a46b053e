use crate::core::models::{
    common::Pagination,
    practice::AttemptSummary,
    question::{Query as QuestionQuery, Question},
    response::{Insert as ResponseInsert, PracticeResponse, Query as ResponseQuery},
};
use crate::core::ports::repository::{PracticeResponseCommon, QuestionCommon, Store};
use crate::error::Error;
use sqlx::pool::PoolConnection;
use sqlx::{query_as, query_scalar, Executor, Postgres, QueryBuilder, Transaction};

pub struct PgSqlx<E>
where
    for<'e> &'e mut E: Executor<'e>,
{
    executor: E,
}

impl<E> PgSqlx<E>
where
    for<'e> &'e mut E: Executor<'e>,
{
    pub fn new(executor: E) -> Self {
        Self { executor }
    }
}

impl<E> QuestionCommon for PgSqlx<E>
where
    for<'e> &'e mut E: Executor<'e, Database = Postgres>,
{
    async fn query(&mut self, query: &QuestionQuery, pagination: Option<Pagination>) -> Result<Vec<Question>, Error> {
        let mut stmt = QueryBuilder::new("SELECT * FROM questions AS q WHERE 1 = 1");
        push_question_filters(&mut stmt, query);
        stmt.push(if query.random { " ORDER BY random()" } else { " ORDER BY q.id" });
        if let Some(p) = pagination {
            stmt.push(" LIMIT ").push_bind(p.limit);
            stmt.push(" OFFSET ").push_bind(p.offset.unwrap_or(0));
        }
        let questions = stmt.build_query_as().fetch_all(&mut self.executor).await?;
        Ok(questions)
    }

    async fn count(&mut self, query: &QuestionQuery) -> Result<i64, Error> {
        let mut stmt = QueryBuilder::new("SELECT COUNT(*) FROM questions AS q WHERE 1 = 1");
        push_question_filters(&mut stmt, query);
        let (n,) = stmt.build_query_as().fetch_one(&mut self.executor).await?;
        Ok(n)
    }

    async fn get(&mut self, id: i32) -> Result<Option<Question>, Error> {
        let question = query_as("SELECT * FROM questions WHERE id = $1")
            .bind(id)
            .fetch_optional(&mut self.executor)
            .await?;
        Ok(question)
    }
}

impl<E> PracticeResponseCommon for PgSqlx<E>
where
    for<'e> &'e mut E: Executor<'e, Database = Postgres>,
{
    async fn insert(&mut self, response: ResponseInsert) -> Result<i32, Error> {
        let id = query_scalar(
            "
        INSERT INTO practice_responses (user_id, question_id, question_type, response, score, is_correct, time_taken_seconds, evaluation)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
        RETURNING id",
        )
        .bind(response.user_id)
        .bind(response.question_id)
        .bind(response.question_type)
        .bind(response.response)
        .bind(response.score)
        .bind(response.is_correct)
        .bind(response.time_taken_seconds)
        .bind(response.evaluation)
        .fetch_one(&mut self.executor)
        .await?;
        Ok(id)
    }

    async fn query(&mut self, query: &ResponseQuery, pagination: Option<Pagination>) -> Result<Vec<PracticeResponse>, Error> {
        let mut stmt = QueryBuilder::new("SELECT * FROM practice_responses WHERE 1 = 1");
        push_response_filters(&mut stmt, query);
        stmt.push(" ORDER BY created_at DESC, id DESC");
        if let Some(p) = pagination {
            stmt.push(" LIMIT ").push_bind(p.limit);
            stmt.push(" OFFSET ").push_bind(p.offset.unwrap_or(0));
        }
        let responses = stmt.build_query_as().fetch_all(&mut self.executor).await?;
        Ok(responses)
    }

    async fn count(&mut self, query: &ResponseQuery) -> Result<i64, Error> {
        let mut stmt = QueryBuilder::new("SELECT COUNT(*) FROM practice_responses WHERE 1 = 1");
        push_response_filters(&mut stmt, query);
        let (n,) = stmt.build_query_as().fetch_one(&mut self.executor).await?;
        Ok(n)
    }

    async fn attempt_summaries(&mut self, user_id: i32, question_ids: &[i32]) -> Result<Vec<AttemptSummary>, Error> {
        let summaries = query_as(
            "
        SELECT
            question_id,
            COUNT(*) AS count,
            (ARRAY_AGG(score ORDER BY created_at DESC, id DESC))[1] AS last_score,
            MAX(score) AS best_score,
            MAX(created_at) AS last_attempted_at
        FROM practice_responses
        WHERE user_id = $1 AND question_id = ANY($2)
        GROUP BY question_id",
        )
        .bind(user_id)
        .bind(question_ids)
        .fetch_all(&mut self.executor)
        .await?;
        Ok(summaries)
    }
}

fn push_question_filters<'a>(stmt: &mut QueryBuilder<'a, Postgres>, query: &'a QuestionQuery) {
    if let Some(type_) = &query.type_eq {
        stmt.push(" AND q.type_ = ").push_bind(type_);
    }
    if let Some(difficulty) = &query.difficulty_eq {
        stmt.push(" AND q.difficulty = ").push_bind(difficulty);
    }
    if let Some(uid) = query.practiced_by {
        stmt.push(" AND EXISTS (SELECT 1 FROM practice_responses AS r WHERE r.question_id = q.id AND r.user_id = ")
            .push_bind(uid)
            .push(")");
    }
    if let Some(uid) = query.not_practiced_by {
        stmt.push(" AND NOT EXISTS (SELECT 1 FROM practice_responses AS r WHERE r.question_id = q.id AND r.user_id = ")
            .push_bind(uid)
            .push(")");
    }
}

fn push_response_filters(stmt: &mut QueryBuilder<Postgres>, query: &ResponseQuery) {
    if let Some(uid) = query.user_id_eq {
        stmt.push(" AND user_id = ").push_bind(uid);
    }
    if let Some(qid) = query.question_id_eq {
        stmt.push(" AND question_id = ").push_bind(qid);
    }
}

impl Store for PgSqlx<PoolConnection<Postgres>> {}
impl<'a> Store for PgSqlx<Transaction<'a, Postgres>> {}
