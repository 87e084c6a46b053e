use itertools::Itertools;
use std::collections::{HashMap, HashSet};
use thiserror::Error as ThisError;

use crate::core::models::question::{Question, ScoringFamily};
use crate::core::models::response::UserResponse;
use crate::core::models::score::{BreakdownRow, ScoreResult};

pub const DICTATION_PASS_MARK: f64 = 0.8;

/// The reference a response is scored against, read from a stored question.
#[derive(Debug, Clone, PartialEq)]
pub enum AnswerKey {
    SingleChoice { correct: Option<String> },
    MultiChoice { correct: Vec<String> },
    Reorder { order: Vec<String> },
    Blanks { answers: Vec<(String, String)> },
    HighlightIncorrectWords { incorrect_words: Vec<String> },
    Dictation { sentence: String },
    External,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ThisError)]
pub enum Unscoreable {
    #[error("question has no correct answer")]
    NoAnswer,
    #[error("question has no correct options")]
    NoCorrectOptions,
    #[error("question has fewer than two paragraphs")]
    TooFewParagraphs,
    #[error("question has no blanks")]
    NoBlanks,
    #[error("question has no incorrect words")]
    NoIncorrectWords,
    #[error("response does not match the question type")]
    ShapeMismatch,
    #[error("question is scored by the evaluation service")]
    External,
}

impl AnswerKey {
    pub fn from_question(question: &Question, family: ScoringFamily) -> Self {
        let answers = question.answers();
        let list = answers.as_ref().map(|a| a.to_list()).unwrap_or_default();
        match family {
            ScoringFamily::SingleChoice => AnswerKey::SingleChoice { correct: list.into_iter().next() },
            ScoringFamily::MultiChoice => AnswerKey::MultiChoice { correct: list },
            ScoringFamily::Reorder => {
                let order = if !list.is_empty() {
                    list
                } else {
                    question
                        .paragraphs()
                        .unwrap_or_default()
                        .into_iter()
                        .sorted_by_key(|p| p.order)
                        .map(|p| p.id)
                        .collect()
                };
                AnswerKey::Reorder { order }
            }
            ScoringFamily::Blanks(_) => AnswerKey::Blanks {
                answers: question.blank_answers(),
            },
            ScoringFamily::HighlightIncorrectWords => AnswerKey::HighlightIncorrectWords { incorrect_words: list },
            ScoringFamily::Dictation => AnswerKey::Dictation {
                sentence: list.into_iter().next().unwrap_or_else(|| question.text.clone()),
            },
            ScoringFamily::External => AnswerKey::External,
        }
    }
}

/// Scores a response, degrading to a zero score when the question cannot be scored.
pub fn score(key: &AnswerKey, response: &UserResponse) -> ScoreResult {
    match evaluate(key, response) {
        Ok(result) => result,
        Err(e) => {
            log::warn!("unscoreable response: {}", e);
            ScoreResult::zero()
        }
    }
}

pub fn evaluate(key: &AnswerKey, response: &UserResponse) -> Result<ScoreResult, Unscoreable> {
    match (key, response) {
        (AnswerKey::SingleChoice { correct }, UserResponse::SingleChoice { selected_option }) => {
            let correct = correct.as_ref().ok_or(Unscoreable::NoAnswer)?;
            Ok(ScoreResult::exact(selected_option == correct))
        }
        (AnswerKey::MultiChoice { correct }, UserResponse::MultiChoice { selected_options }) => {
            let correct: HashSet<&str> = correct.iter().map(String::as_str).collect();
            if correct.is_empty() {
                return Err(Unscoreable::NoCorrectOptions);
            }
            let selected: HashSet<&str> = selected_options.iter().map(String::as_str).collect();
            let hits = selected.intersection(&correct).count() as i64;
            let misses = selected.len() as i64 - hits;
            Ok(ScoreResult::partial(hits - misses, correct.len() as i64))
        }
        (AnswerKey::Reorder { order }, UserResponse::Reorder { ordered_paragraphs }) => {
            if order.len() < 2 {
                return Err(Unscoreable::TooFewParagraphs);
            }
            let position: HashMap<&str, usize> = order.iter().enumerate().map(|(i, id)| (id.as_str(), i)).collect();
            let matched = ordered_paragraphs
                .iter()
                .map(String::as_str)
                .unique()
                .tuple_windows()
                .filter(|(a, b)| match (position.get(a), position.get(b)) {
                    (Some(i), Some(j)) => *j == i + 1,
                    _ => false,
                })
                .count();
            Ok(ScoreResult::partial(matched as i64, order.len() as i64 - 1))
        }
        (AnswerKey::Blanks { answers }, UserResponse::Blanks { blanks }) => {
            if answers.is_empty() {
                return Err(Unscoreable::NoBlanks);
            }
            let correct = answers.iter().filter(|(key, expected)| blanks.get(key).map_or(false, |given| same_answer(given, expected))).count();
            Ok(ScoreResult::partial(correct as i64, answers.len() as i64))
        }
        (AnswerKey::HighlightIncorrectWords { incorrect_words }, UserResponse::HighlightWords { highlighted_words }) => {
            let incorrect: HashSet<String> = incorrect_words.iter().map(|w| normalize_word(w)).filter(|w| !w.is_empty()).collect();
            if incorrect.is_empty() {
                return Err(Unscoreable::NoIncorrectWords);
            }
            let highlighted: HashSet<String> = highlighted_words.iter().map(|w| normalize_word(w)).filter(|w| !w.is_empty()).collect();
            let hits = highlighted.intersection(&incorrect).count() as i64;
            let misses = highlighted.len() as i64 - hits;
            Ok(ScoreResult::partial(hits - misses, incorrect.len() as i64))
        }
        (AnswerKey::Dictation { sentence }, UserResponse::Text { text }) => {
            let similarity = text_similarity(text, sentence);
            Ok(ScoreResult {
                is_correct: similarity >= DICTATION_PASS_MARK,
                score: similarity,
            })
        }
        (AnswerKey::External, _) => Err(Unscoreable::External),
        _ => Err(Unscoreable::ShapeMismatch),
    }
}

/// Per-item rows for the result table. Empty for mismatched or externally scored responses.
pub fn breakdown(key: &AnswerKey, response: &UserResponse) -> Vec<BreakdownRow> {
    match (key, response) {
        (AnswerKey::SingleChoice { correct }, UserResponse::SingleChoice { selected_option }) => vec![BreakdownRow {
            label: "answer".into(),
            response: Some(selected_option.clone()),
            expected: correct.clone(),
            is_correct: correct.as_ref() == Some(selected_option),
        }],
        (AnswerKey::MultiChoice { correct }, UserResponse::MultiChoice { selected_options }) => {
            let selected: HashSet<&String> = selected_options.iter().collect();
            correct
                .iter()
                .chain(selected_options.iter().filter(|o| !correct.contains(o)))
                .unique()
                .map(|option| {
                    let is_selected = selected.contains(option);
                    let should_select = correct.contains(option);
                    BreakdownRow {
                        label: option.clone(),
                        response: is_selected.then(|| option.clone()),
                        expected: should_select.then(|| option.clone()),
                        is_correct: is_selected == should_select,
                    }
                })
                .collect()
        }
        (AnswerKey::Reorder { order }, UserResponse::Reorder { ordered_paragraphs }) => {
            let next: HashMap<&str, &str> = ordered_paragraphs.iter().map(String::as_str).tuple_windows().collect();
            order
                .iter()
                .tuple_windows()
                .map(|(a, b)| {
                    let followed_by = next.get(a.as_str()).map(|s| s.to_string());
                    BreakdownRow {
                        label: format!("{} -> {}", a, b),
                        is_correct: followed_by.as_deref() == Some(b.as_str()),
                        response: followed_by,
                        expected: Some(b.clone()),
                    }
                })
                .collect()
        }
        (AnswerKey::Blanks { answers }, UserResponse::Blanks { blanks }) => answers
            .iter()
            .map(|(key, expected)| {
                let given = blanks.get(key);
                BreakdownRow {
                    label: key.clone(),
                    response: given.cloned(),
                    expected: Some(expected.clone()),
                    is_correct: given.map_or(false, |g| same_answer(g, expected)),
                }
            })
            .collect(),
        (AnswerKey::HighlightIncorrectWords { incorrect_words }, UserResponse::HighlightWords { highlighted_words }) => {
            let incorrect: Vec<String> = incorrect_words.iter().map(|w| normalize_word(w)).filter(|w| !w.is_empty()).unique().collect();
            let highlighted: Vec<String> = highlighted_words.iter().map(|w| normalize_word(w)).filter(|w| !w.is_empty()).unique().collect();
            incorrect
                .iter()
                .chain(highlighted.iter().filter(|w| !incorrect.contains(w)))
                .map(|word| {
                    let is_highlighted = highlighted.contains(word);
                    let is_incorrect = incorrect.contains(word);
                    BreakdownRow {
                        label: word.clone(),
                        response: is_highlighted.then(|| word.clone()),
                        expected: is_incorrect.then(|| word.clone()),
                        is_correct: is_highlighted == is_incorrect,
                    }
                })
                .collect()
        }
        (AnswerKey::Dictation { sentence }, UserResponse::Text { text }) => {
            let mut remaining = word_counts(&words(text));
            words(sentence)
                .into_iter()
                .map(|word| {
                    let matched = match remaining.get_mut(word.as_str()) {
                        Some(n) if *n > 0 => {
                            *n -= 1;
                            true
                        }
                        _ => false,
                    };
                    BreakdownRow {
                        label: word.clone(),
                        response: matched.then(|| word.clone()),
                        expected: Some(word),
                        is_correct: matched,
                    }
                })
                .collect()
        }
        _ => Vec::new(),
    }
}

fn same_answer(given: &str, expected: &str) -> bool {
    given.trim().to_lowercase() == expected.trim().to_lowercase()
}

fn normalize_word(word: &str) -> String {
    word.trim_matches(|c: char| !c.is_alphanumeric()).to_lowercase()
}

fn words(text: &str) -> Vec<String> {
    text.split_whitespace().map(normalize_word).filter(|w| !w.is_empty()).collect()
}

fn word_counts(words: &[String]) -> HashMap<String, usize> {
    words.iter().cloned().counts()
}

/// Word-overlap similarity: shared words (counted with multiplicity) over the longer word list.
///
/// Two texts without words are identical.
pub fn text_similarity(a: &str, b: &str) -> f64 {
    let (words_a, words_b) = (words(a), words(b));
    if words_a.is_empty() && words_b.is_empty() {
        return 1.0;
    }
    let mut remaining = word_counts(&words_b);
    let shared = words_a
        .iter()
        .filter(|w| match remaining.get_mut(w.as_str()) {
            Some(n) if *n > 0 => {
                *n -= 1;
                true
            }
            _ => false,
        })
        .count();
    shared as f64 / words_a.len().max(words_b.len()) as f64
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::core::models::question::QuestionType;
    use crate::core::transformer::test::question;
    use serde_json::json;
    use std::collections::BTreeMap;

    fn single(correct: &str, selected: &str) -> ScoreResult {
        score(
            &AnswerKey::SingleChoice { correct: Some(correct.into()) },
            &UserResponse::SingleChoice { selected_option: selected.into() },
        )
    }

    fn multi(correct: &[&str], selected: &[&str]) -> ScoreResult {
        score(
            &AnswerKey::MultiChoice {
                correct: correct.iter().map(|s| s.to_string()).collect(),
            },
            &UserResponse::MultiChoice {
                selected_options: selected.iter().map(|s| s.to_string()).collect(),
            },
        )
    }

    fn reorder(order: &[&str], given: &[&str]) -> ScoreResult {
        score(
            &AnswerKey::Reorder {
                order: order.iter().map(|s| s.to_string()).collect(),
            },
            &UserResponse::Reorder {
                ordered_paragraphs: given.iter().map(|s| s.to_string()).collect(),
            },
        )
    }

    fn blanks(pairs: &[(&str, &str)]) -> UserResponse {
        UserResponse::Blanks {
            blanks: pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect::<BTreeMap<_, _>>(),
        }
    }

    #[test]
    fn test_single_choice() {
        assert_eq!(single("b", "b"), ScoreResult { is_correct: true, score: 1.0 });
        assert_eq!(single("b", "a"), ScoreResult { is_correct: false, score: 0.0 });
    }

    #[test]
    fn test_multi_choice_partial_credit() {
        let r = multi(&["a", "b", "c"], &["a", "b", "d"]);
        assert!(!r.is_correct);
        assert!((r.score - 1.0 / 3.0).abs() < 1e-9);
        assert_eq!(multi(&["a", "b"], &["b", "a"]), ScoreResult { is_correct: true, score: 1.0 });
        assert_eq!(multi(&["a"], &["b", "c"]).score, 0.0);
    }

    #[test]
    fn test_multi_choice_select_all_never_beats_exact() {
        let exact = multi(&["a", "c"], &["a", "c"]);
        let all = multi(&["a", "c"], &["a", "b", "c", "d"]);
        assert!(all.score <= exact.score);
        assert!(!all.is_correct);
    }

    #[test]
    fn test_multi_choice_duplicate_selections_count_once() {
        assert_eq!(multi(&["a", "b"], &["a", "a"]).score, 0.5);
    }

    #[test]
    fn test_reorder() {
        assert_eq!(reorder(&["a", "b", "c", "d"], &["a", "b", "c", "d"]), ScoreResult { is_correct: true, score: 1.0 });
        assert_eq!(reorder(&["a", "b", "c", "d"], &["d", "c", "b", "a"]).score, 0.0);
        assert_eq!(reorder(&["a", "b"], &["b", "a"]).score, 0.0);
        let r = reorder(&["a", "b", "c", "d"], &["c", "d", "a", "b"]);
        assert!((r.score - 2.0 / 3.0).abs() < 1e-9);
        assert!(!r.is_correct);
    }

    #[test]
    fn test_reorder_single_paragraph_is_unscoreable() {
        let key = AnswerKey::Reorder { order: vec!["a".into()] };
        let resp = UserResponse::Reorder { ordered_paragraphs: vec!["a".into()] };
        assert_eq!(evaluate(&key, &resp), Err(Unscoreable::TooFewParagraphs));
        assert_eq!(score(&key, &resp), ScoreResult::zero());
    }

    #[test]
    fn test_blanks_case_insensitive() {
        let q = question(QuestionType::ListeningFillInTheBlanks, "The ___ fox", None, Some(json!(["quick"])));
        let key = AnswerKey::from_question(&q, q.kind().unwrap().family());
        assert_eq!(score(&key, &blanks(&[("blank1", "QUICK")])), ScoreResult { is_correct: true, score: 1.0 });
        assert_eq!(score(&key, &blanks(&[("blank1", "Quick ")])), score(&key, &blanks(&[("blank1", "quick")])));
    }

    #[test]
    fn test_blanks_partial() {
        let key = AnswerKey::Blanks {
            answers: vec![("blank1".into(), "blue".into()), ("blank2".into(), "sky".into())],
        };
        let r = score(&key, &blanks(&[("blank1", "Blue"), ("blank2", "sea")]));
        assert_eq!(r, ScoreResult { is_correct: false, score: 0.5 });
        assert_eq!(score(&key, &blanks(&[])).score, 0.0);
    }

    #[test]
    fn test_highlight_incorrect_words() {
        let key = AnswerKey::HighlightIncorrectWords {
            incorrect_words: vec!["cat".into(), "blue".into()],
        };
        let r = score(&key, &UserResponse::HighlightWords { highlighted_words: vec!["Cat,".into(), "blue".into()] });
        assert_eq!(r, ScoreResult { is_correct: true, score: 1.0 });
        let r = score(&key, &UserResponse::HighlightWords { highlighted_words: vec!["cat".into(), "dog".into(), "tree".into()] });
        assert_eq!(r.score, 0.0);
    }

    #[test]
    fn test_zero_denominators_are_unscoreable() {
        let key = AnswerKey::MultiChoice { correct: vec![] };
        assert_eq!(evaluate(&key, &UserResponse::MultiChoice { selected_options: vec!["a".into()] }), Err(Unscoreable::NoCorrectOptions));
        let key = AnswerKey::HighlightIncorrectWords { incorrect_words: vec![] };
        assert_eq!(evaluate(&key, &UserResponse::HighlightWords { highlighted_words: vec![] }), Err(Unscoreable::NoIncorrectWords));
    }

    #[test]
    fn test_text_similarity() {
        assert_eq!(text_similarity("the cat sat", "the cat sat"), 1.0);
        assert_eq!(text_similarity("one two", "three four"), 0.0);
        assert_eq!(text_similarity("", ""), 1.0);
        assert_eq!(text_similarity("", "words"), 0.0);
        assert_eq!(text_similarity("The cat.", "the CAT"), 1.0);
        assert_eq!(text_similarity("the the the", "the"), 1.0 / 3.0);
    }

    #[test]
    fn test_dictation_pass_mark() {
        let key = AnswerKey::Dictation {
            sentence: "students must submit their assignments before the end of the week".into(),
        };
        let r = score(&key, &UserResponse::Text { text: "students must submit their assignment before the end of the week".into() });
        assert!(r.is_correct);
        let r = score(&key, &UserResponse::Text { text: "students submit work".into() });
        assert!(!r.is_correct);
    }

    #[test]
    fn test_shape_mismatch_scores_zero() {
        let key = AnswerKey::SingleChoice { correct: Some("a".into()) };
        let resp = UserResponse::Text { text: "a".into() };
        assert_eq!(evaluate(&key, &resp), Err(Unscoreable::ShapeMismatch));
        assert_eq!(score(&key, &resp), ScoreResult::zero());
    }

    #[test]
    fn test_answer_key_blanks_from_definitions() {
        let options = json!([{"options": ["red", "blue"], "correctAnswer": "blue"}, {"options": ["sea", "sky"], "correctAnswer": "sky"}]);
        let q = question(QuestionType::ReadingWritingFillInTheBlanks, "The _____ _____", Some(options), None);
        let key = AnswerKey::from_question(&q, q.kind().unwrap().family());
        assert_eq!(score(&key, &blanks(&[("blank1", "blue"), ("blank2", "sky")])), ScoreResult { is_correct: true, score: 1.0 });
    }

    #[test]
    fn test_answer_key_reorder_from_paragraph_order() {
        let options = json!([{"id": "x", "text": "X", "order": 2}, {"id": "y", "text": "Y", "order": 1}]);
        let q = question(QuestionType::ReOrderParagraphs, "", Some(options), None);
        assert_eq!(AnswerKey::from_question(&q, ScoringFamily::Reorder), AnswerKey::Reorder { order: vec!["y".into(), "x".into()] });
    }

    #[test]
    fn test_breakdown_rows() {
        let key = AnswerKey::Reorder {
            order: vec!["a".into(), "b".into(), "c".into()],
        };
        let rows = breakdown(&key, &UserResponse::Reorder { ordered_paragraphs: vec!["a".into(), "c".into(), "b".into()] });
        assert_eq!(rows.len(), 2);
        assert!(!rows[0].is_correct);
        assert_eq!(rows[0].response.as_deref(), Some("c"));
        assert!(!rows[1].is_correct);

        let key = AnswerKey::MultiChoice { correct: vec!["a".into(), "b".into()] };
        let rows = breakdown(&key, &UserResponse::MultiChoice { selected_options: vec!["a".into(), "c".into()] });
        let labels: Vec<_> = rows.iter().map(|r| (r.label.as_str(), r.is_correct)).collect();
        assert_eq!(labels, vec![("a", true), ("b", false), ("c", false)]);
    }
}
