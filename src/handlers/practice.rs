use actix_web::web::{Data, Json, Path, Query};
use sqlx::PgPool;

use crate::config::Config;
use crate::context::UserInfo;
use crate::core::models::common::Pagination;
use crate::core::models::practice::PracticeQuestion;
use crate::core::models::response::{PracticeResponse, Submission};
use crate::core::models::score::SubmissionResult;
use crate::core::services::practice::{self, PracticeQuery};
use crate::database::sqlx::PgSqlx;
use crate::error::Error;
use crate::impls::signer::jwt::JwtMediaSigner;
use crate::request::{Pagination as PageRequest, PracticeQuestionsQuery};
use crate::response::List;

const HISTORY_PAGE_SIZE: i64 = 20;

pub async fn questions(
    user: Option<UserInfo>,
    Query(PracticeQuestionsQuery {
        type_,
        limit,
        random,
        difficulty,
        status,
    }): Query<PracticeQuestionsQuery>,
    db: Data<PgPool>,
    signer: Data<JwtMediaSigner>,
    config: Data<Config>,
) -> Result<Json<List<PracticeQuestion>>, Error> {
    let mut store = PgSqlx::new(db.acquire().await?);
    let query = PracticeQuery {
        type_,
        limit,
        random,
        difficulty,
        status,
    };
    let (list, total) = practice::practice_questions(&mut store, signer.get_ref(), config.signing_concurrency, user.map(|u| u.id), query).await?;
    Ok(Json(List::new(list, total)))
}

pub async fn detail(user: Option<UserInfo>, question_id: Path<(i32,)>, db: Data<PgPool>, signer: Data<JwtMediaSigner>) -> Result<Json<PracticeQuestion>, Error> {
    let id = question_id.into_inner().0;
    let mut store = PgSqlx::new(db.acquire().await?);
    let question = practice::practice_question(&mut store, signer.get_ref(), user.map(|u| u.id), id).await?;
    Ok(Json(question))
}

pub async fn submit(user: UserInfo, question_id: Path<(i32,)>, Json(submission): Json<Submission>, db: Data<PgPool>) -> Result<Json<SubmissionResult>, Error> {
    let id = question_id.into_inner().0;
    let mut store = PgSqlx::new(db.acquire().await?);
    let result = practice::submit_response(&mut store, user.id, id, submission).await?;
    Ok(Json(result))
}

pub async fn history(
    user: UserInfo,
    question_id: Path<(i32,)>,
    Query(PageRequest { page, size }): Query<PageRequest>,
    db: Data<PgPool>,
) -> Result<Json<List<PracticeResponse>>, Error> {
    let id = question_id.into_inner().0;
    let mut store = PgSqlx::new(db.acquire().await?);
    let (list, total) = practice::response_history(&mut store, user.id, id, Pagination::from_page(page, size, HISTORY_PAGE_SIZE)).await?;
    Ok(Json(List::new(list, total)))
}
