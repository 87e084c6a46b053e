//! Static per-type instructions and timings.

use crate::core::models::practice::Timing;
use crate::core::models::question::QuestionType;

pub fn instructions(type_: QuestionType) -> &'static str {
    match type_ {
        QuestionType::ReadAloud => "Look at the text below. In 40 seconds, you must read this text aloud as naturally and clearly as possible. You have 40 seconds to read aloud.",
        QuestionType::RepeatSentence => "You will hear a sentence. Please repeat the sentence exactly as you hear it. You will hear the sentence only once.",
        QuestionType::DescribeImage => "Look at the image below. In 25 seconds, please speak into the microphone and describe in detail what the image is showing. You will have 40 seconds to give your response.",
        QuestionType::ReTellLecture => "You will hear a lecture. After listening to the lecture, in 10 seconds, please speak into the microphone and retell what you have just heard from the lecture in your own words. You will have 40 seconds to give your response.",
        QuestionType::AnswerShortQuestion => "You will hear a question. Please give a simple and short answer. Often just one or a few words is enough.",
        QuestionType::SummarizeGroupDiscussion => "You will hear three people having a discussion. When you hear the beep, summarize the whole discussion. You will have 10 seconds to prepare and 2 minutes to give your response.",
        QuestionType::RespondToASituation => "Listen to and read a description of a situation. You will have 10 seconds to think about your answer. Then you will hear a beep. You will have 40 seconds to answer the question.",
        QuestionType::SummarizeWrittenText => "Read the passage below and summarize it using one sentence. Type your response in the box at the bottom of the screen. You have 10 minutes to finish this task. Your response will be judged on the quality of your writing and on how well your response presents the key points in the passage.",
        QuestionType::WriteEssay => "You will have 20 minutes to plan, write and revise an essay about the topic below. Your response will be judged on how well you develop a position, organize your ideas, present supporting details, and control the elements of standard written English. You should write 200-300 words.",
        QuestionType::ReadingWritingFillInTheBlanks => "Below is a text with blanks. Click on each blank, a list of choices will appear. Select the appropriate answer choice for each blank.",
        QuestionType::MultipleChoiceMultipleAnswersReading => "Read the text and answer the question by selecting all the correct responses. More than one response is correct.",
        QuestionType::ReOrderParagraphs => "The text boxes below have been placed in a random order. Restore the original order by dragging the text boxes into the correct order.",
        QuestionType::ReadingFillInTheBlanks => "In the text below some words are missing. Drag words from the box below to the appropriate place in the text. To undo an answer choice, drag the word back to the box below the text.",
        QuestionType::MultipleChoiceSingleAnswerReading => "Read the text and answer the multiple-choice question by selecting the correct response. Only one response is correct.",
        QuestionType::SummarizeSpokenText => "You will hear a short lecture. Write a summary for a fellow student who was not present at the lecture. You should write 50-70 words. You have 10 minutes to finish this task.",
        QuestionType::MultipleChoiceMultipleAnswersListening => "Listen to the recording and answer the question by selecting all the correct responses. You will need to select more than one response.",
        QuestionType::ListeningFillInTheBlanks => "You will hear a recording. Type the missing words in each blank.",
        QuestionType::HighlightCorrectSummary => "You will hear a recording. Click on the paragraph that best relates to the recording.",
        QuestionType::MultipleChoiceSingleAnswerListening => "Listen to the recording and answer the multiple-choice question by selecting the correct response. Only one response is correct.",
        QuestionType::SelectMissingWord => "You will hear a recording about a topic. At the end of the recording the last word or group of words has been replaced by a beep. Select the correct option to complete the recording.",
        QuestionType::HighlightIncorrectWords => "You will hear a recording. Below is a transcription of the recording. Some words in the transcription differ from what the speaker said. Please click on the words that are different.",
        QuestionType::WriteFromDictation => "You will hear a sentence. Type the sentence in the box below exactly as you hear it. Write as much of the sentence as you can. You will hear the sentence only once.",
    }
}

/// Fixed preparation phase before recording starts.
pub fn preparation_seconds(type_: QuestionType) -> Option<u32> {
    match type_ {
        QuestionType::ReadAloud => Some(3),
        QuestionType::RepeatSentence => Some(3),
        QuestionType::DescribeImage => Some(25),
        QuestionType::ReTellLecture => Some(10),
        QuestionType::AnswerShortQuestion => Some(3),
        QuestionType::SummarizeGroupDiscussion => Some(10),
        QuestionType::RespondToASituation => Some(10),
        QuestionType::SummarizeWrittenText
        | QuestionType::WriteEssay
        | QuestionType::ReadingWritingFillInTheBlanks
        | QuestionType::MultipleChoiceMultipleAnswersReading
        | QuestionType::ReOrderParagraphs
        | QuestionType::ReadingFillInTheBlanks
        | QuestionType::MultipleChoiceSingleAnswerReading
        | QuestionType::SummarizeSpokenText
        | QuestionType::MultipleChoiceMultipleAnswersListening
        | QuestionType::ListeningFillInTheBlanks
        | QuestionType::HighlightCorrectSummary
        | QuestionType::MultipleChoiceSingleAnswerListening
        | QuestionType::SelectMissingWord
        | QuestionType::HighlightIncorrectWords
        | QuestionType::WriteFromDictation => None,
    }
}

/// Default answer time: recording time for speaking, time limit for writing.
pub fn recording_seconds(type_: QuestionType) -> Option<u32> {
    match type_ {
        QuestionType::ReadAloud => Some(40),
        QuestionType::RepeatSentence => Some(15),
        QuestionType::DescribeImage => Some(40),
        QuestionType::ReTellLecture => Some(40),
        QuestionType::AnswerShortQuestion => Some(10),
        QuestionType::SummarizeGroupDiscussion => Some(120),
        QuestionType::RespondToASituation => Some(40),
        QuestionType::SummarizeWrittenText => Some(600),
        QuestionType::WriteEssay => Some(1200),
        QuestionType::SummarizeSpokenText => Some(600),
        QuestionType::ReadingWritingFillInTheBlanks
        | QuestionType::MultipleChoiceMultipleAnswersReading
        | QuestionType::ReOrderParagraphs
        | QuestionType::ReadingFillInTheBlanks
        | QuestionType::MultipleChoiceSingleAnswerReading
        | QuestionType::MultipleChoiceMultipleAnswersListening
        | QuestionType::ListeningFillInTheBlanks
        | QuestionType::HighlightCorrectSummary
        | QuestionType::MultipleChoiceSingleAnswerListening
        | QuestionType::SelectMissingWord
        | QuestionType::HighlightIncorrectWords
        | QuestionType::WriteFromDictation => None,
    }
}

/// Resolves timing with precedence: preparation table, then stored duration, then recording table.
///
/// A type with a fixed preparation phase keeps its canonical recording time and
/// ignores the stored duration.
pub fn resolve_timing(type_: QuestionType, duration_millis: Option<i64>) -> Timing {
    if let Some(prep) = preparation_seconds(type_) {
        return Timing {
            preparation_seconds: Some(prep),
            recording_seconds: recording_seconds(type_),
        };
    }
    let stored = duration_millis
        .filter(|ms| *ms > 0)
        .map(|ms| (ms / 1000 + i64::from(ms % 1000 != 0)).min(u32::MAX as i64) as u32);
    Timing {
        preparation_seconds: None,
        recording_seconds: stored.or_else(|| recording_seconds(type_)),
    }
}
