use rand::seq::SliceRandom;
use rand::Rng;
use std::collections::HashMap;

use crate::core::catalog;
use crate::core::models::practice::{AttemptSummary, Blank, Content, MediaUrls, PracticeQuestion, Timing};
use crate::core::models::question::{blank_key, BlankVariant, Question, ScoringFamily};

// A run of at least this many underscores counts as one blank, the canonical marker being `_____`.
const MIN_MARKER_RUN: usize = 3;

/// Builds the client payload for a stored question.
///
/// Never fails: structured parts that cannot be read from the stored options
/// are left out of `content`, and an unknown type gets neither instructions
/// nor timing.
pub fn transform<R>(question: &Question, media: MediaUrls, attempts: Option<AttemptSummary>, rng: &mut R) -> PracticeQuestion
where
    R: Rng + ?Sized,
{
    let mut content = Content {
        audio_url: media.audio,
        image_url: media.image,
        ..Default::default()
    };
    let kind = question.kind();
    let (instructions, timing) = match kind {
        Some(t) => (Some(catalog::instructions(t)), catalog::resolve_timing(t, question.duration_millis)),
        None => {
            log::warn!("question {} has unknown type {}", question.id, question.type_);
            (None, Timing::default())
        }
    };
    match kind.map(|t| t.family()) {
        Some(ScoringFamily::SingleChoice) | Some(ScoringFamily::MultiChoice) => {
            content.options = question.choice_options().map(|mut options| {
                options.shuffle(rng);
                options
            });
        }
        Some(ScoringFamily::Reorder) => {
            content.paragraphs = question.paragraphs().filter(|p| !p.is_empty()).map(|mut paragraphs| {
                paragraphs.shuffle(rng);
                paragraphs
            });
        }
        Some(ScoringFamily::Blanks(variant)) => shape_blanks(question, variant, &mut content, rng),
        Some(ScoringFamily::HighlightIncorrectWords) | Some(ScoringFamily::Dictation) | Some(ScoringFamily::External) | None => {}
    }
    PracticeQuestion {
        id: question.id,
        type_: question.type_.clone(),
        title: question.title.clone(),
        text: question.text.clone(),
        instructions,
        preparation_time: timing.preparation_seconds,
        recording_time: timing.recording_seconds,
        difficulty: question.difficulty.clone(),
        content,
        attempts,
    }
}

fn shape_blanks<R>(question: &Question, variant: BlankVariant, content: &mut Content, rng: &mut R)
where
    R: Rng + ?Sized,
{
    let segments = split_blanks(&question.text);
    let markers = segments.len() - 1;
    let mut answers: HashMap<String, String> = question.blank_answers().into_iter().collect();
    let definitions = question.blank_definitions().filter(|d| !d.is_empty()).unwrap_or_default();
    let count = if markers > 0 {
        markers
    } else if !definitions.is_empty() {
        definitions.len()
    } else {
        answers.len()
    };
    let blanks = (0..count)
        .map(|i| {
            let mut options = definitions.get(i).map(|d| d.options.clone()).unwrap_or_default();
            if variant == BlankVariant::DragAndDrop {
                options.shuffle(rng);
            }
            let key = blank_key(i);
            Blank {
                correct_answer: answers.remove(&key),
                key,
                index: i,
                options,
            }
        })
        .collect();
    content.blank_count = Some(count);
    content.blanks = Some(blanks);
    if markers > 0 {
        content.segments = Some(segments);
    }
}

/// Splits a blank template into the text around each blank marker.
///
/// The result always has one more element than there are blanks.
pub fn split_blanks(text: &str) -> Vec<String> {
    let mut segments = Vec::new();
    let mut current = String::new();
    let mut run = 0;
    for c in text.chars() {
        if c == '_' {
            run += 1;
            continue;
        }
        flush_run(&mut segments, &mut current, &mut run);
        current.push(c);
    }
    flush_run(&mut segments, &mut current, &mut run);
    segments.push(current);
    segments
}

fn flush_run(segments: &mut Vec<String>, current: &mut String, run: &mut usize) {
    if *run >= MIN_MARKER_RUN {
        segments.push(std::mem::take(current));
    } else {
        current.extend(std::iter::repeat('_').take(*run));
    }
    *run = 0;
}
