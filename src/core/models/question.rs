use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sqlx::FromRow;
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum QuestionType {
    // speaking
    ReadAloud,
    RepeatSentence,
    DescribeImage,
    ReTellLecture,
    AnswerShortQuestion,
    SummarizeGroupDiscussion,
    RespondToASituation,
    // writing
    SummarizeWrittenText,
    WriteEssay,
    // reading
    ReadingWritingFillInTheBlanks,
    MultipleChoiceMultipleAnswersReading,
    ReOrderParagraphs,
    ReadingFillInTheBlanks,
    MultipleChoiceSingleAnswerReading,
    // listening
    SummarizeSpokenText,
    MultipleChoiceMultipleAnswersListening,
    ListeningFillInTheBlanks,
    HighlightCorrectSummary,
    MultipleChoiceSingleAnswerListening,
    SelectMissingWord,
    HighlightIncorrectWords,
    WriteFromDictation,
}

/// How the options of a fill-in-the-blanks question are presented.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlankVariant {
    /// Options shown in a select box, in the stored order.
    Dropdown,
    /// Options dragged from a shuffled word bank.
    DragAndDrop,
    /// Free text, no options.
    Typed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScoringFamily {
    SingleChoice,
    MultiChoice,
    Reorder,
    Blanks(BlankVariant),
    HighlightIncorrectWords,
    Dictation,
    /// Scored by the external evaluation service.
    External,
}

impl QuestionType {
    pub const ALL: [QuestionType; 22] = [
        QuestionType::ReadAloud,
        QuestionType::RepeatSentence,
        QuestionType::DescribeImage,
        QuestionType::ReTellLecture,
        QuestionType::AnswerShortQuestion,
        QuestionType::SummarizeGroupDiscussion,
        QuestionType::RespondToASituation,
        QuestionType::SummarizeWrittenText,
        QuestionType::WriteEssay,
        QuestionType::ReadingWritingFillInTheBlanks,
        QuestionType::MultipleChoiceMultipleAnswersReading,
        QuestionType::ReOrderParagraphs,
        QuestionType::ReadingFillInTheBlanks,
        QuestionType::MultipleChoiceSingleAnswerReading,
        QuestionType::SummarizeSpokenText,
        QuestionType::MultipleChoiceMultipleAnswersListening,
        QuestionType::ListeningFillInTheBlanks,
        QuestionType::HighlightCorrectSummary,
        QuestionType::MultipleChoiceSingleAnswerListening,
        QuestionType::SelectMissingWord,
        QuestionType::HighlightIncorrectWords,
        QuestionType::WriteFromDictation,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            QuestionType::ReadAloud => "READ_ALOUD",
            QuestionType::RepeatSentence => "REPEAT_SENTENCE",
            QuestionType::DescribeImage => "DESCRIBE_IMAGE",
            QuestionType::ReTellLecture => "RE_TELL_LECTURE",
            QuestionType::AnswerShortQuestion => "ANSWER_SHORT_QUESTION",
            QuestionType::SummarizeGroupDiscussion => "SUMMARIZE_GROUP_DISCUSSION",
            QuestionType::RespondToASituation => "RESPOND_TO_A_SITUATION",
            QuestionType::SummarizeWrittenText => "SUMMARIZE_WRITTEN_TEXT",
            QuestionType::WriteEssay => "WRITE_ESSAY",
            QuestionType::ReadingWritingFillInTheBlanks => "READING_WRITING_FILL_IN_THE_BLANKS",
            QuestionType::MultipleChoiceMultipleAnswersReading => "MULTIPLE_CHOICE_MULTIPLE_ANSWERS_READING",
            QuestionType::ReOrderParagraphs => "RE_ORDER_PARAGRAPHS",
            QuestionType::ReadingFillInTheBlanks => "READING_FILL_IN_THE_BLANKS",
            QuestionType::MultipleChoiceSingleAnswerReading => "MULTIPLE_CHOICE_SINGLE_ANSWER_READING",
            QuestionType::SummarizeSpokenText => "SUMMARIZE_SPOKEN_TEXT",
            QuestionType::MultipleChoiceMultipleAnswersListening => "MULTIPLE_CHOICE_MULTIPLE_ANSWERS_LISTENING",
            QuestionType::ListeningFillInTheBlanks => "LISTENING_FILL_IN_THE_BLANKS",
            QuestionType::HighlightCorrectSummary => "HIGHLIGHT_CORRECT_SUMMARY",
            QuestionType::MultipleChoiceSingleAnswerListening => "MULTIPLE_CHOICE_SINGLE_ANSWER_LISTENING",
            QuestionType::SelectMissingWord => "SELECT_MISSING_WORD",
            QuestionType::HighlightIncorrectWords => "HIGHLIGHT_INCORRECT_WORDS",
            QuestionType::WriteFromDictation => "WRITE_FROM_DICTATION",
        }
    }

    pub fn family(&self) -> ScoringFamily {
        match self {
            QuestionType::MultipleChoiceSingleAnswerReading
            | QuestionType::MultipleChoiceSingleAnswerListening
            | QuestionType::HighlightCorrectSummary
            | QuestionType::SelectMissingWord => ScoringFamily::SingleChoice,
            QuestionType::MultipleChoiceMultipleAnswersReading | QuestionType::MultipleChoiceMultipleAnswersListening => ScoringFamily::MultiChoice,
            QuestionType::ReOrderParagraphs => ScoringFamily::Reorder,
            QuestionType::ReadingWritingFillInTheBlanks => ScoringFamily::Blanks(BlankVariant::Dropdown),
            QuestionType::ReadingFillInTheBlanks => ScoringFamily::Blanks(BlankVariant::DragAndDrop),
            QuestionType::ListeningFillInTheBlanks => ScoringFamily::Blanks(BlankVariant::Typed),
            QuestionType::HighlightIncorrectWords => ScoringFamily::HighlightIncorrectWords,
            QuestionType::WriteFromDictation => ScoringFamily::Dictation,
            QuestionType::ReadAloud
            | QuestionType::RepeatSentence
            | QuestionType::DescribeImage
            | QuestionType::ReTellLecture
            | QuestionType::AnswerShortQuestion
            | QuestionType::SummarizeGroupDiscussion
            | QuestionType::RespondToASituation
            | QuestionType::SummarizeWrittenText
            | QuestionType::WriteEssay
            | QuestionType::SummarizeSpokenText => ScoringFamily::External,
        }
    }
}

impl fmt::Display for QuestionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownQuestionType(pub String);

impl fmt::Display for UnknownQuestionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown question type: {}", self.0)
    }
}

impl FromStr for QuestionType {
    type Err = UnknownQuestionType;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        QuestionType::ALL
            .iter()
            .find(|t| t.as_str() == s)
            .copied()
            .ok_or_else(|| UnknownQuestionType(s.to_owned()))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PracticeStatus {
    #[default]
    All,
    Practiced,
    Unpracticed,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChoiceOption {
    pub id: String,
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Paragraph {
    pub id: String,
    pub text: String,
    pub order: i32,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BlankDefinition {
    #[serde(default)]
    pub options: Vec<String>,
    pub correct_answer: Option<String>,
}

/// Stored answer key. Its meaning depends on the question type.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum CorrectAnswers {
    One(String),
    Many(Vec<String>),
    Map(BTreeMap<String, String>),
}

impl CorrectAnswers {
    /// Answers as an ordered list; map entries are ordered by their blank number.
    pub fn to_list(&self) -> Vec<String> {
        match self {
            CorrectAnswers::One(v) => vec![v.clone()],
            CorrectAnswers::Many(v) => v.clone(),
            CorrectAnswers::Map(m) => blank_entries(m).into_iter().map(|(_, v)| v).collect(),
        }
    }

    /// Answers keyed `blank1..blankN` by position, whatever the stored keys were.
    pub fn to_blank_map(&self) -> Vec<(String, String)> {
        self.to_list().into_iter().enumerate().map(|(i, v)| (blank_key(i), v)).collect()
    }
}

pub fn blank_key(index: usize) -> String {
    format!("blank{}", index + 1)
}

fn blank_number(key: &str) -> Option<usize> {
    let digits: String = key.chars().rev().take_while(|c| c.is_ascii_digit()).collect::<Vec<_>>().into_iter().rev().collect();
    digits.parse().ok()
}

fn blank_entries(map: &BTreeMap<String, String>) -> Vec<(String, String)> {
    let mut entries: Vec<(String, String)> = map.iter().map(|(k, v)| (k.clone(), v.clone())).collect();
    entries.sort_by_key(|(k, _)| (blank_number(k).unwrap_or(usize::MAX), k.clone()));
    entries
}

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Question {
    pub id: i32,
    pub type_: String,
    pub title: Option<String>,
    pub text: String,
    pub options: Option<Value>,
    pub correct_answers: Option<Value>,
    pub audio_key: Option<String>,
    pub image_key: Option<String>,
    pub duration_millis: Option<i64>,
    pub difficulty: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Question {
    pub fn kind(&self) -> Option<QuestionType> {
        self.type_.parse().ok()
    }

    fn options_as<T: for<'d> Deserialize<'d>>(&self) -> Option<Vec<T>> {
        let value = self.options.as_ref()?;
        serde_json::from_value(value.clone()).ok()
    }

    pub fn choice_options(&self) -> Option<Vec<ChoiceOption>> {
        self.options_as()
    }

    pub fn paragraphs(&self) -> Option<Vec<Paragraph>> {
        self.options_as()
    }

    pub fn blank_definitions(&self) -> Option<Vec<BlankDefinition>> {
        self.options_as()
    }

    pub fn answers(&self) -> Option<CorrectAnswers> {
        let value = self.correct_answers.as_ref()?;
        serde_json::from_value(value.clone()).ok()
    }

    /// The expected answer of each blank, keyed `blank1..blankN`.
    ///
    /// Stored `correct_answers` win; without them each definition's
    /// `correctAnswer` is used.
    pub fn blank_answers(&self) -> Vec<(String, String)> {
        match self.answers() {
            Some(answers) => answers.to_blank_map(),
            None => self
                .blank_definitions()
                .unwrap_or_default()
                .into_iter()
                .enumerate()
                .filter_map(|(i, d)| d.correct_answer.map(|c| (blank_key(i), c)))
                .collect(),
        }
    }
}

#[derive(Debug, Default, Clone)]
pub struct Query {
    pub type_eq: Option<String>,
    pub difficulty_eq: Option<String>,
    pub practiced_by: Option<i32>,
    pub not_practiced_by: Option<i32>,
    pub random: bool,
}
