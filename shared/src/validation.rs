use std::collections::{BTreeMap, HashMap, HashSet};
use std::str::FromStr;
use crate::models::{Answer, Question, SelectedAnswer, Survey, VoteEntry};

pub const MAX_TITLE_LENGTH: usize = 200;
pub const MAX_ANSWER_LENGTH: usize = 200;
pub const MAX_QUESTIONS: usize = 50;
pub const MAX_ANSWERS: usize = 50;
pub const MIN_QUESTIONS: usize = 1;
pub const MIN_ANSWERS: usize = 1;

const SURVEY_TITLE_FIELD: &str = "survey";
const QUESTION_TITLE_FIELD: &str = "question";
const EXCLUSIVE_FIELD: &str = "excl";

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("Malformed vote entry: {name}={value}")]
    MalformedEntry { name: String, value: String },
    #[error("Question {0} accepts a single answer")]
    ExclusiveViolation(i64),
    #[error("Survey title is empty")]
    EmptyTitle,
    #[error("Title exceeds maximum length of {MAX_TITLE_LENGTH}")]
    TitleTooLong,
    #[error("Too few questions (minimum {MIN_QUESTIONS})")]
    TooFewQuestions,
    #[error("Too many questions (maximum {MAX_QUESTIONS})")]
    TooManyQuestions,
    #[error("Duplicate question id: {0}")]
    DuplicateQuestion(i64),
    #[error("Question {0} has too few answers (minimum {MIN_ANSWERS})")]
    TooFewAnswers(i64),
    #[error("Question {0} has too many answers (maximum {MAX_ANSWERS})")]
    TooManyAnswers(i64),
    #[error("Duplicate answer id {answer_id} in question {question_id}")]
    DuplicateAnswer { question_id: i64, answer_id: i64 },
    #[error("Empty answer text in question {0}")]
    EmptyAnswer(i64),
    #[error("Answer text exceeds maximum length of {MAX_ANSWER_LENGTH}")]
    AnswerTooLong,
    #[error("New survey must start with zero counters")]
    NonZeroCounter,
    #[error("Invalid form field: {0}")]
    InvalidField(String),
}

/// How entries that do not parse as `question_id=answer_id` are handled.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum VoteParsing {
    /// Malformed entries are dropped.
    #[default]
    Lenient,
    /// The first malformed entry rejects the whole vote.
    Strict,
}

impl FromStr for VoteParsing {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "lenient" => Ok(Self::Lenient),
            "strict" => Ok(Self::Strict),
            other => Err(format!("unknown vote parsing mode: {}", other)),
        }
    }
}

/// Turns the raw form payload into answer selections. Repeated pairs are
/// kept once, in first-seen order.
pub fn parse_vote(entries: &[VoteEntry], mode: VoteParsing) -> Result<Vec<SelectedAnswer>, ValidationError> {
    let mut seen = HashSet::new();
    let mut selections = Vec::with_capacity(entries.len());

    for entry in entries {
        let parsed = entry.name.parse::<i64>()
            .and_then(|q| entry.value.parse::<i64>().map(|a| SelectedAnswer::new(q, a)));

        match (parsed, mode) {
            (Ok(selection), _) => {
                if seen.insert(selection) {
                    selections.push(selection);
                }
            }
            (Err(_), VoteParsing::Lenient) => continue,
            (Err(_), VoteParsing::Strict) => {
                return Err(ValidationError::MalformedEntry {
                    name: entry.name.clone(),
                    value: entry.value.clone(),
                });
            }
        }
    }

    Ok(selections)
}

/// Rejects selections that pick more than one answer of an exclusive question.
/// Only pairs naming an existing answer count; unknown ids are ignored here
/// like they are when counters are applied.
pub fn check_exclusive(survey: &Survey, selections: &[SelectedAnswer]) -> Result<(), ValidationError> {
    let mut per_question: HashMap<i64, usize> = HashMap::new();
    for selection in selections {
        let known = survey.question(selection.question_id)
            .and_then(|q| q.answer(selection.answer_id))
            .is_some();
        if known {
            *per_question.entry(selection.question_id).or_insert(0) += 1;
        }
    }

    let violation = survey.questions.iter()
        .filter(|q| q.exclusive)
        .find(|q| per_question.get(&q.id).copied().unwrap_or(0) > 1);

    match violation {
        Some(q) => Err(ValidationError::ExclusiveViolation(q.id)),
        None => Ok(()),
    }
}

pub fn validate_survey(survey: &Survey) -> Result<(), ValidationError> {
    if survey.title.trim().is_empty() { return Err(ValidationError::EmptyTitle); }
    if survey.title.len() > MAX_TITLE_LENGTH { return Err(ValidationError::TitleTooLong); }
    if survey.questions.len() < MIN_QUESTIONS { return Err(ValidationError::TooFewQuestions); }
    if survey.questions.len() > MAX_QUESTIONS { return Err(ValidationError::TooManyQuestions); }

    let mut question_ids = HashSet::new();
    for question in &survey.questions {
        if !question_ids.insert(question.id) {
            return Err(ValidationError::DuplicateQuestion(question.id));
        }
        validate_question(question)?;
    }

    Ok(())
}

fn validate_question(question: &Question) -> Result<(), ValidationError> {
    if question.title.len() > MAX_TITLE_LENGTH { return Err(ValidationError::TitleTooLong); }
    if question.answers.len() < MIN_ANSWERS { return Err(ValidationError::TooFewAnswers(question.id)); }
    if question.answers.len() > MAX_ANSWERS { return Err(ValidationError::TooManyAnswers(question.id)); }

    let mut answer_ids = HashSet::new();
    for answer in &question.answers {
        if !answer_ids.insert(answer.id) {
            return Err(ValidationError::DuplicateAnswer {
                question_id: question.id,
                answer_id: answer.id,
            });
        }
        if answer.text.trim().is_empty() { return Err(ValidationError::EmptyAnswer(question.id)); }
        if answer.text.len() > MAX_ANSWER_LENGTH { return Err(ValidationError::AnswerTooLong); }
        if answer.counter != 0 { return Err(ValidationError::NonZeroCounter); }
    }

    Ok(())
}

#[derive(Default)]
struct QuestionDraft {
    title: String,
    exclusive: bool,
    answers: Vec<String>,
}

/// Builds an unsaved survey out of the admin creation form.
///
/// Field names: `survey` for the title, `question:<n>` and `excl:<n>` for the
/// title and exclusive flag of slot `n`, and `<n>` or `<n>:<m>` for an answer
/// of slot `n`. Empty values are skipped. Slots are numbered in ascending
/// order of `n` starting at 0, and slots without answers are dropped.
pub fn survey_from_form(entries: &[VoteEntry]) -> Result<Survey, ValidationError> {
    let mut title = String::new();
    let mut drafts: BTreeMap<i64, QuestionDraft> = BTreeMap::new();

    for entry in entries.iter().filter(|e| !e.value.trim().is_empty()) {
        let (key, slot) = match entry.name.split_once(':') {
            Some((key, slot)) => (key, Some(slot)),
            None => (entry.name.as_str(), None),
        };

        match (key, slot) {
            (SURVEY_TITLE_FIELD, _) => title = entry.value.trim().to_string(),
            (QUESTION_TITLE_FIELD, Some(slot)) => {
                drafts.entry(parse_slot(slot, &entry.name)?).or_default().title = entry.value.trim().to_string();
            }
            (EXCLUSIVE_FIELD, Some(slot)) => {
                let exclusive = parse_flag(&entry.value)
                    .ok_or_else(|| ValidationError::InvalidField(entry.name.clone()))?;
                drafts.entry(parse_slot(slot, &entry.name)?).or_default().exclusive = exclusive;
            }
            (slot, _) => {
                drafts.entry(parse_slot(slot, &entry.name)?).or_default().answers.push(entry.value.trim().to_string());
            }
        }
    }

    let questions: Vec<Question> = drafts.into_values()
        .filter(|draft| !draft.answers.is_empty())
        .zip(0..)
        .map(|(draft, id)| Question {
            id,
            title: draft.title,
            exclusive: draft.exclusive,
            answers: draft.answers.into_iter()
                .zip(0..)
                .map(|(text, id)| Answer { id, text, counter: 0 })
                .collect(),
        })
        .collect();

    let survey = Survey {
        id: String::new(),
        title,
        questions,
        revision: 0,
    };
    validate_survey(&survey)?;
    Ok(survey)
}

fn parse_slot(slot: &str, field: &str) -> Result<i64, ValidationError> {
    slot.parse::<i64>().map_err(|_| ValidationError::InvalidField(field.to_string()))
}

fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "true" | "on" | "1" | "yes" => Some(true),
        "false" | "off" | "0" | "no" => Some(false),
        _ => None,
    }
}
