use futures::stream::{self, StreamExt};
use std::collections::HashMap;

use crate::core::annotation;
use crate::core::models::{
    common::Pagination,
    practice::{AttemptSummary, MediaUrls, PracticeQuestion},
    question::{PracticeStatus, Query as QuestionQuery, Question, QuestionType, ScoringFamily},
    response::{Insert as ResponseInsert, PracticeResponse, Query as ResponseQuery, Submission, UserResponse},
    score::{ScoreResult, SubmissionResult},
};
use crate::core::ports::repository::{PracticeResponseCommon, QuestionCommon, Store};
use crate::core::ports::signer::MediaSigner;
use crate::core::scoring::{self, AnswerKey};
use crate::core::transformer;
use crate::error::Error;

pub const DEFAULT_LIMIT: i64 = 10;
pub const MAX_LIMIT: i64 = 100;

#[derive(Debug, Clone)]
pub struct PracticeQuery {
    pub type_: QuestionType,
    pub limit: Option<i64>,
    pub random: bool,
    pub difficulty: Option<String>,
    pub status: PracticeStatus,
}

pub async fn practice_questions<S, G>(store: &mut S, signer: &G, concurrency: usize, user_id: Option<i32>, query: PracticeQuery) -> Result<(Vec<PracticeQuestion>, i64), Error>
where
    S: Store,
    G: MediaSigner,
{
    let limit = query.limit.unwrap_or(DEFAULT_LIMIT).clamp(1, MAX_LIMIT);
    let filter = QuestionQuery {
        type_eq: Some(query.type_.as_str().into()),
        difficulty_eq: query.difficulty,
        practiced_by: user_id.filter(|_| query.status == PracticeStatus::Practiced),
        not_practiced_by: user_id.filter(|_| query.status == PracticeStatus::Unpracticed),
        random: query.random,
    };
    let total = QuestionCommon::count(store, &filter).await?;
    let questions = QuestionCommon::query(store, &filter, Some(Pagination::new(limit, None))).await?;
    let list = build_payloads(store, signer, concurrency, user_id, questions).await?;
    Ok((list, total))
}

pub async fn practice_question<S, G>(store: &mut S, signer: &G, user_id: Option<i32>, id: i32) -> Result<PracticeQuestion, Error>
where
    S: Store,
    G: MediaSigner,
{
    let question = QuestionCommon::get(store, id).await?.ok_or_else(|| Error::NotFound(format!("question {}", id)))?;
    let mut list = build_payloads(store, signer, 1, user_id, vec![question]).await?;
    list.pop().ok_or_else(|| Error::ServerError(format!("failed to build question {}", id)))
}

async fn build_payloads<S, G>(store: &mut S, signer: &G, concurrency: usize, user_id: Option<i32>, questions: Vec<Question>) -> Result<Vec<PracticeQuestion>, Error>
where
    S: Store,
    G: MediaSigner,
{
    let mut attempts: HashMap<i32, AttemptSummary> = match user_id {
        Some(uid) if !questions.is_empty() => {
            let ids: Vec<i32> = questions.iter().map(|q| q.id).collect();
            PracticeResponseCommon::attempt_summaries(store, uid, &ids)
                .await?
                .into_iter()
                .map(|a| (a.question_id, a))
                .collect()
        }
        _ => HashMap::new(),
    };
    let media: Vec<MediaUrls> = stream::iter(questions.iter().map(|q| resolve_media(signer, q)))
        .buffered(concurrency.max(1))
        .collect()
        .await;
    let mut rng = rand::thread_rng();
    Ok(questions
        .iter()
        .zip(media)
        .map(|(q, m)| transformer::transform(q, m, attempts.remove(&q.id), &mut rng))
        .collect())
}

async fn resolve_media<G: MediaSigner>(signer: &G, question: &Question) -> MediaUrls {
    let (audio, image) = futures::join!(sign_or_raw(signer, question.audio_key.as_deref()), sign_or_raw(signer, question.image_key.as_deref()));
    MediaUrls { audio, image }
}

// A key that cannot be signed is handed out as is.
async fn sign_or_raw<G: MediaSigner>(signer: &G, key: Option<&str>) -> Option<String> {
    let key = key.filter(|k| !k.is_empty())?;
    match signer.sign(key).await {
        Ok(url) => Some(url),
        Err(e) => {
            log::warn!("failed to sign media {}: {}", key, e);
            Some(key.to_owned())
        }
    }
}

pub async fn submit_response<S>(store: &mut S, user_id: i32, question_id: i32, submission: Submission) -> Result<SubmissionResult, Error>
where
    S: Store,
{
    let question = QuestionCommon::get(store, question_id)
        .await?
        .ok_or_else(|| Error::NotFound(format!("question {}", question_id)))?;
    let Submission {
        response: raw_response,
        time_taken_seconds,
        evaluation,
    } = submission;

    let (result, breakdown, response, evaluation) = match question.kind() {
        None => {
            log::warn!("question {} has unknown type {}, scoring zero", question.id, question.type_);
            (ScoreResult::zero(), Vec::new(), None, None)
        }
        Some(t) => {
            let family = t.family();
            let response = UserResponse::parse(family, raw_response.clone())?;
            if family == ScoringFamily::External {
                let evaluation = evaluation.ok_or_else(|| Error::BusinessError(format!("evaluation is required for {}", t)))?;
                let result = ScoreResult {
                    is_correct: evaluation.is_correct,
                    score: evaluation.score,
                };
                (result, Vec::new(), Some(response), Some(evaluation))
            } else {
                let key = AnswerKey::from_question(&question, family);
                (scoring::score(&key, &response), scoring::breakdown(&key, &response), Some(response), None)
            }
        }
    };

    let annotations = match (&evaluation, response.as_ref().and_then(|r| r.text())) {
        (Some(evaluation), Some(text)) => evaluation.detailed_analysis.as_ref().map(|analysis| annotation::annotated(text, analysis)),
        _ => None,
    };

    let id = PracticeResponseCommon::insert(
        store,
        ResponseInsert {
            user_id,
            question_id,
            question_type: question.type_.clone(),
            response: raw_response,
            score: result.score,
            is_correct: result.is_correct,
            time_taken_seconds,
            evaluation: evaluation.as_ref().map(serde_json::to_value).transpose()?,
        },
    )
    .await?;
    log::info!("user {} answered question {} with score {:.3}", user_id, question_id, result.score);

    let (feedback, suggestions) = evaluation.map(|e| (e.feedback, e.suggestions)).unwrap_or_default();
    Ok(SubmissionResult {
        id,
        result,
        breakdown,
        annotations,
        feedback,
        suggestions,
    })
}

pub async fn response_history<S>(store: &mut S, user_id: i32, question_id: i32, pagination: Pagination) -> Result<(Vec<PracticeResponse>, i64), Error>
where
    S: Store,
{
    let query = ResponseQuery {
        user_id_eq: Some(user_id),
        question_id_eq: Some(question_id),
    };
    let total = PracticeResponseCommon::count(store, &query).await?;
    let responses = PracticeResponseCommon::query(store, &query, Some(pagination)).await?;
    Ok((responses, total))
}

#[cfg(test)]
pub(crate) mod test {
    use super::*;
    use crate::core::models::question::QuestionType;
    use crate::core::transformer::test::question;
    use chrono::Utc;
    use serde_json::json;

    #[derive(Default)]
    pub(crate) struct MemoryStore {
        pub questions: Vec<Question>,
        pub responses: Vec<PracticeResponse>,
    }

    impl MemoryStore {
        fn practiced(&self, user_id: i32, question_id: i32) -> bool {
            self.responses.iter().any(|r| r.user_id == user_id && r.question_id == question_id)
        }

        fn matching_questions(&self, query: &QuestionQuery) -> Vec<Question> {
            self.questions
                .iter()
                .filter(|q| query.type_eq.as_ref().map_or(true, |t| &q.type_ == t))
                .filter(|q| query.difficulty_eq.is_none() || q.difficulty == query.difficulty_eq)
                .filter(|q| query.practiced_by.map_or(true, |u| self.practiced(u, q.id)))
                .filter(|q| query.not_practiced_by.map_or(true, |u| !self.practiced(u, q.id)))
                .cloned()
                .collect()
        }

        fn matching(&self, query: &ResponseQuery) -> Vec<PracticeResponse> {
            let mut list: Vec<PracticeResponse> = self
                .responses
                .iter()
                .filter(|r| query.user_id_eq.map_or(true, |v| r.user_id == v) && query.question_id_eq.map_or(true, |v| r.question_id == v))
                .cloned()
                .collect();
            list.sort_by(|a, b| b.id.cmp(&a.id));
            list
        }
    }

    impl QuestionCommon for MemoryStore {
        async fn query(&mut self, query: &QuestionQuery, pagination: Option<Pagination>) -> Result<Vec<Question>, Error> {
            let limit = pagination.map_or(usize::MAX, |p| p.limit as usize);
            Ok(self.matching_questions(query).into_iter().take(limit).collect())
        }

        async fn count(&mut self, query: &QuestionQuery) -> Result<i64, Error> {
            Ok(self.matching_questions(query).len() as i64)
        }

        async fn get(&mut self, id: i32) -> Result<Option<Question>, Error> {
            Ok(self.questions.iter().find(|q| q.id == id).cloned())
        }
    }

    impl PracticeResponseCommon for MemoryStore {
        async fn insert(&mut self, response: ResponseInsert) -> Result<i32, Error> {
            let id = self.responses.len() as i32 + 1;
            self.responses.push(PracticeResponse {
                id,
                user_id: response.user_id,
                question_id: response.question_id,
                question_type: response.question_type,
                response: response.response,
                score: response.score,
                is_correct: response.is_correct,
                time_taken_seconds: response.time_taken_seconds,
                evaluation: response.evaluation,
                created_at: Utc::now(),
            });
            Ok(id)
        }

        async fn query(&mut self, query: &ResponseQuery, pagination: Option<Pagination>) -> Result<Vec<PracticeResponse>, Error> {
            let list = self.matching(query);
            Ok(match pagination {
                Some(p) => list.into_iter().skip(p.offset.unwrap_or(0) as usize).take(p.limit as usize).collect(),
                None => list,
            })
        }

        async fn count(&mut self, query: &ResponseQuery) -> Result<i64, Error> {
            Ok(self.matching(query).len() as i64)
        }

        async fn attempt_summaries(&mut self, user_id: i32, question_ids: &[i32]) -> Result<Vec<AttemptSummary>, Error> {
            Ok(question_ids
                .iter()
                .filter_map(|qid| {
                    let list = self.matching(&ResponseQuery {
                        user_id_eq: Some(user_id),
                        question_id_eq: Some(*qid),
                    });
                    let last = list.first()?;
                    Some(AttemptSummary {
                        question_id: *qid,
                        count: list.len() as i64,
                        last_score: Some(last.score),
                        best_score: list.iter().map(|r| r.score).reduce(f64::max),
                        last_attempted_at: Some(last.created_at),
                    })
                })
                .collect())
        }
    }

    impl Store for MemoryStore {}

    pub(crate) struct FakeSigner {
        pub fail: bool,
    }

    impl MediaSigner for FakeSigner {
        async fn sign(&self, key: &str) -> Result<String, Error> {
            if self.fail {
                return Err(Error::ServerError("signing service unavailable".into()));
            }
            Ok(format!("https://media.test/{}?token=signed", key))
        }
    }

    fn store() -> MemoryStore {
        let mut reorder = question(
            QuestionType::ReOrderParagraphs,
            "",
            Some(json!([{"id": "a", "text": "A", "order": 0}, {"id": "b", "text": "B", "order": 1}, {"id": "c", "text": "C", "order": 2}])),
            Some(json!(["a", "b", "c"])),
        );
        reorder.id = 1;
        reorder.audio_key = Some("audio/1.mp3".into());
        let mut blanks = question(QuestionType::ListeningFillInTheBlanks, "The ___ fox", None, Some(json!(["quick"])));
        blanks.id = 2;
        let mut essay = question(QuestionType::WriteEssay, "Discuss technology.", None, None);
        essay.id = 3;
        let mut second_reorder = reorder.clone();
        second_reorder.id = 4;
        second_reorder.audio_key = None;
        MemoryStore {
            questions: vec![reorder, blanks, essay, second_reorder],
            responses: Vec::new(),
        }
    }

    fn reorder_query(status: PracticeStatus) -> PracticeQuery {
        PracticeQuery {
            type_: QuestionType::ReOrderParagraphs,
            limit: None,
            random: false,
            difficulty: None,
            status,
        }
    }

    #[tokio::test]
    async fn test_practice_questions_signs_media() {
        let mut store = store();
        let (list, total) = practice_questions(&mut store, &FakeSigner { fail: false }, 4, None, reorder_query(PracticeStatus::All)).await.unwrap();
        assert_eq!(total, 2);
        assert_eq!(list[0].content.audio_url.as_deref(), Some("https://media.test/audio/1.mp3?token=signed"));
        assert!(list[1].content.audio_url.is_none());
        assert!(list.iter().all(|q| q.attempts.is_none()));
    }

    #[tokio::test]
    async fn test_total_counts_all_matches_beyond_limit() {
        let mut store = store();
        let mut query = reorder_query(PracticeStatus::All);
        query.limit = Some(1);
        let (list, total) = practice_questions(&mut store, &FakeSigner { fail: false }, 4, None, query).await.unwrap();
        assert_eq!(list.len(), 1);
        assert_eq!(total, 2);
    }

    #[tokio::test]
    async fn test_signing_failure_falls_back_to_raw_key() {
        let mut store = store();
        let payload = practice_question(&mut store, &FakeSigner { fail: true }, None, 1).await.unwrap();
        assert_eq!(payload.content.audio_url.as_deref(), Some("audio/1.mp3"));
        assert_eq!(payload.content.paragraphs.map(|p| p.len()), Some(3));
    }

    #[tokio::test]
    async fn test_missing_question_is_not_found() {
        let mut store = store();
        let res = practice_question(&mut store, &FakeSigner { fail: false }, None, 99).await;
        assert!(matches!(res, Err(Error::NotFound(_))));
    }

    #[tokio::test]
    async fn test_submit_scores_and_persists() {
        let mut store = store();
        let submission = Submission {
            response: json!({"blanks": {"blank1": "QUICK"}}),
            time_taken_seconds: Some(12),
            evaluation: None,
        };
        let result = submit_response(&mut store, 7, 2, submission).await.unwrap();
        assert_eq!(result.result, ScoreResult { is_correct: true, score: 1.0 });
        assert_eq!(result.breakdown.len(), 1);
        assert_eq!(store.responses.len(), 1);
        assert_eq!(store.responses[0].time_taken_seconds, Some(12));
        assert!(store.responses[0].is_correct);
    }

    #[tokio::test]
    async fn test_submit_rejects_wrong_shape() {
        let mut store = store();
        let submission = Submission {
            response: json!({"selectedOption": "a"}),
            time_taken_seconds: None,
            evaluation: None,
        };
        let res = submit_response(&mut store, 7, 1, submission).await;
        assert!(matches!(res, Err(Error::BusinessError(_))));
        assert!(store.responses.is_empty());
    }

    #[tokio::test]
    async fn test_submit_external_requires_evaluation() {
        let mut store = store();
        let submission = Submission {
            response: json!({"text": "Technology helps."}),
            time_taken_seconds: None,
            evaluation: None,
        };
        assert!(matches!(submit_response(&mut store, 7, 3, submission).await, Err(Error::BusinessError(_))));
    }

    #[tokio::test]
    async fn test_submit_external_annotates_text() {
        let mut store = store();
        let submission: Submission = serde_json::from_value(json!({
            "response": {"text": "Technology have changed lifes."},
            "evaluation": {
                "score": 0.6,
                "isCorrect": false,
                "feedback": "Watch agreement.",
                "detailedAnalysis": {
                    "grammar": [{"text": "have", "correction": "has", "explanation": "subject-verb agreement"}],
                    "spelling": [{"text": "lifes.", "correction": "lives"}]
                },
                "suggestions": ["Proofread plurals."]
            }
        }))
        .unwrap();
        let result = submit_response(&mut store, 7, 3, submission).await.unwrap();
        assert_eq!(result.result.score, 0.6);
        assert_eq!(result.feedback.as_deref(), Some("Watch agreement."));
        let annotations = result.annotations.unwrap();
        assert_eq!(annotations.segments.len(), 5);
        assert_eq!(annotations.counts.len(), 2);
        assert!(store.responses[0].evaluation.is_some());
    }

    #[tokio::test]
    async fn test_unknown_type_scores_zero() {
        let mut store = store();
        store.questions[1].type_ = "LEGACY_BLANKS".into();
        let submission = Submission {
            response: json!({"blanks": {"blank1": "quick"}}),
            time_taken_seconds: None,
            evaluation: None,
        };
        let result = submit_response(&mut store, 7, 2, submission).await.unwrap();
        assert_eq!(result.result, ScoreResult::zero());
        assert_eq!(store.responses.len(), 1);
    }

    #[tokio::test]
    async fn test_practice_status_and_attempts() {
        let mut store = store();
        let submission = Submission {
            response: json!({"orderedParagraphs": ["a", "b", "c"]}),
            time_taken_seconds: None,
            evaluation: None,
        };
        submit_response(&mut store, 7, 1, submission).await.unwrap();
        let signer = FakeSigner { fail: false };

        let (practiced, _) = practice_questions(&mut store, &signer, 4, Some(7), reorder_query(PracticeStatus::Practiced)).await.unwrap();
        assert_eq!(practiced.iter().map(|q| q.id).collect::<Vec<_>>(), vec![1]);
        let attempts = practiced[0].attempts.as_ref().unwrap();
        assert_eq!(attempts.count, 1);
        assert_eq!(attempts.best_score, Some(1.0));

        let (unpracticed, _) = practice_questions(&mut store, &signer, 4, Some(7), reorder_query(PracticeStatus::Unpracticed)).await.unwrap();
        assert_eq!(unpracticed.iter().map(|q| q.id).collect::<Vec<_>>(), vec![4]);

        let (history, total) = response_history(&mut store, 7, 1, Pagination::new(10, None)).await.unwrap();
        assert_eq!(total, 1);
        assert_eq!(history[0].score, 1.0);
    }
}
