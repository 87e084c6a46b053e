//! Overlays an error analysis onto the text it was produced from.
//!
//! Errors carrying word positions are placed by index. The rest are found by
//! a case-insensitive search of the text, longest first. Spans that overlap
//! an already placed span, or that cannot be found at all, are dropped: a
//! partial overlay is always returned.

use itertools::Itertools;
use std::fmt::Write;

use crate::core::models::analysis::{DetailedAnalysis, ErrorCategory, ErrorSpan};
use crate::core::models::score::{Annotated, CategoryCount, Segment};

#[derive(Debug, Clone, Copy)]
struct Placed<'a> {
    start: usize,
    end: usize,
    category: ErrorCategory,
    error: &'a ErrorSpan,
}

pub fn annotated(text: &str, analysis: &DetailedAnalysis) -> Annotated {
    let segments = annotate(text, analysis);
    Annotated {
        html: render_html(&segments),
        counts: category_counts(analysis),
        segments,
    }
}

pub fn annotate(text: &str, analysis: &DetailedAnalysis) -> Vec<Segment> {
    let words = word_ranges(text);
    let haystack = fold_case(text);
    let mut placed: Vec<Placed> = Vec::new();
    let mut unpositioned = Vec::new();

    for (category, error) in analysis.errors() {
        match error.position.and_then(|p| word_span(&words, p.start, p.end)) {
            Some((start, end)) if !overlaps(&placed, start, end) => placed.push(Placed { start, end, category, error }),
            Some(_) => log::debug!("dropping overlapping {} error {:?}", category.as_str(), error.text),
            None => unpositioned.push((category, error, needle(&error.text))),
        }
    }

    for (category, error, needle) in unpositioned.into_iter().sorted_by(|a, b| b.2.len().cmp(&a.2.len())) {
        match find_free(&haystack, &needle, &placed) {
            Some((start, end)) => placed.push(Placed { start, end, category, error }),
            None => log::debug!("dropping unmatched {} error {:?}", category.as_str(), error.text),
        }
    }

    placed.sort_by_key(|p| p.start);
    let mut segments = Vec::with_capacity(placed.len() * 2 + 1);
    let mut cursor = 0;
    for p in placed {
        if p.start > cursor {
            segments.push(Segment::Plain {
                text: text[cursor..p.start].to_owned(),
            });
        }
        segments.push(Segment::Error {
            category: p.category,
            text: text[p.start..p.end].to_owned(),
            correction: p.error.correction.clone(),
            explanation: p.error.explanation.clone(),
        });
        cursor = p.end;
    }
    if cursor < text.len() {
        segments.push(Segment::Plain { text: text[cursor..].to_owned() });
    }
    segments
}

pub fn render_html(segments: &[Segment]) -> String {
    let mut html = String::new();
    for segment in segments {
        match segment {
            Segment::Plain { text } => html.push_str(&html_escape::encode_text(text)),
            Segment::Error {
                category,
                text,
                correction,
                explanation,
            } => {
                let _ = write!(html, r#"<mark class="error error-{}" tabindex="0""#, category.as_str());
                if let Some(correction) = correction {
                    let _ = write!(html, r#" data-correction="{}""#, html_escape::encode_double_quoted_attribute(correction));
                }
                if let Some(explanation) = explanation {
                    let _ = write!(html, r#" data-explanation="{}""#, html_escape::encode_double_quoted_attribute(explanation));
                }
                let _ = write!(html, ">{}</mark>", html_escape::encode_text(text));
            }
        }
    }
    html
}

pub fn category_counts(analysis: &DetailedAnalysis) -> Vec<CategoryCount> {
    analysis
        .errors()
        .map(|(category, _)| category)
        .counts()
        .into_iter()
        .map(|(category, count)| CategoryCount { category, count })
        .sorted_by_key(|c| c.category.as_str())
        .collect()
}

fn word_ranges(text: &str) -> Vec<(usize, usize)> {
    let mut ranges = Vec::new();
    let mut start = None;
    for (i, c) in text.char_indices() {
        match (c.is_whitespace(), start) {
            (true, Some(s)) => {
                ranges.push((s, i));
                start = None;
            }
            (false, None) => start = Some(i),
            _ => {}
        }
    }
    if let Some(s) = start {
        ranges.push((s, text.len()));
    }
    ranges
}

fn word_span(words: &[(usize, usize)], start: usize, end: usize) -> Option<(usize, usize)> {
    if start >= end || end > words.len() {
        return None;
    }
    Some((words[start].0, words[end - 1].1))
}

fn needle(text: &str) -> String {
    fold_case(text.trim_matches(|c: char| c.is_ascii_punctuation() || c.is_whitespace()))
}

// Lowercases every char whose lowercase form has the same UTF-8 width, so byte offsets into the
// folded string stay valid in the original.
fn fold_case(text: &str) -> String {
    text.chars()
        .map(|c| {
            let mut lower = c.to_lowercase();
            match (lower.next(), lower.next()) {
                (Some(l), None) if l.len_utf8() == c.len_utf8() => l,
                _ => c,
            }
        })
        .collect()
}

fn overlaps(placed: &[Placed], start: usize, end: usize) -> bool {
    placed.iter().any(|p| start < p.end && p.start < end)
}

fn at_word_boundary(haystack: &str, start: usize, end: usize) -> bool {
    let before = haystack[..start].chars().next_back().map_or(true, |c| !c.is_alphanumeric());
    let after = haystack[end..].chars().next().map_or(true, |c| !c.is_alphanumeric());
    before && after
}

// Prefers whole-word occurrences, then any free occurrence.
fn find_free(haystack: &str, needle: &str, placed: &[Placed]) -> Option<(usize, usize)> {
    if needle.is_empty() {
        return None;
    }
    let free: Vec<(usize, usize)> = haystack
        .match_indices(needle)
        .map(|(i, m)| (i, i + m.len()))
        .filter(|(s, e)| !overlaps(placed, *s, *e))
        .collect();
    free.iter().find(|(s, e)| at_word_boundary(haystack, *s, *e)).or_else(|| free.first()).copied()
}
