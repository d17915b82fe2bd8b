use serde::{Serialize, Deserialize};
use time::OffsetDateTime;

/// One `{name, value}` pair as posted by the survey and creation forms.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct VoteEntry {
    pub name: String,
    pub value: String,
}

impl VoteEntry {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self { name: name.into(), value: value.into() }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Answer {
    pub id: i64,
    pub text: String,
    #[serde(default)]
    pub counter: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Question {
    pub id: i64,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub exclusive: bool,
    pub answers: Vec<Answer>,
}

impl Question {
    pub fn answer(&self, answer_id: i64) -> Option<&Answer> {
        self.answers.iter().find(|a| a.id == answer_id)
    }

    pub fn answer_mut(&mut self, answer_id: i64) -> Option<&mut Answer> {
        self.answers.iter_mut().find(|a| a.id == answer_id)
    }

    pub fn total_votes(&self) -> u64 {
        self.answers.iter().map(|a| a.counter).sum()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Survey {
    pub id: String,
    pub title: String,
    pub questions: Vec<Question>,
    /// Bumped by the store on every successful replace.
    #[serde(default)]
    pub revision: i64,
}

impl Survey {
    pub fn question(&self, question_id: i64) -> Option<&Question> {
        self.questions.iter().find(|q| q.id == question_id)
    }

    pub fn question_mut(&mut self, question_id: i64) -> Option<&mut Question> {
        self.questions.iter_mut().find(|q| q.id == question_id)
    }

    /// Increments the counter of every answer referenced by `selections`.
    /// Pairs naming an unknown question or answer are ignored. Returns the
    /// number of counters that moved.
    pub fn apply_selections(&mut self, selections: &[SelectedAnswer]) -> usize {
        let mut applied = 0;
        for selection in selections {
            let answer = self
                .question_mut(selection.question_id)
                .and_then(|q| q.answer_mut(selection.answer_id));
            if let Some(answer) = answer {
                answer.counter += 1;
                applied += 1;
            }
        }
        applied
    }

    pub fn reset_counters(&mut self) {
        self.questions
            .iter_mut()
            .flat_map(|q| q.answers.iter_mut())
            .for_each(|a| a.counter = 0);
    }

    pub fn public_view(&self) -> SurveyView {
        SurveyView {
            id: self.id.clone(),
            title: self.title.clone(),
            vote_link: format!("/api/vote/{}", self.id),
            questions: self.questions.iter().enumerate()
                .map(|(position, q)| QuestionView {
                    id: q.id,
                    title: q.title.clone(),
                    subtitle: format!("Question {}", position + 1),
                    exclusive: q.exclusive,
                    answers: q.answers.iter()
                        .map(|a| AnswerView { id: a.id, text: a.text.clone() })
                        .collect(),
                })
                .collect(),
        }
    }
}

/// A `(question_id, answer_id)` pair as recorded in a participation.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct SelectedAnswer {
    pub question_id: i64,
    pub answer_id: i64,
}

impl SelectedAnswer {
    pub const fn new(question_id: i64, answer_id: i64) -> Self {
        Self { question_id, answer_id }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SurveyParticipation {
    pub survey_id: String,
    pub answers: Vec<SelectedAnswer>,
    pub cast_at: OffsetDateTime,
}

impl SurveyParticipation {
    pub fn new(survey_id: impl Into<String>, answers: Vec<SelectedAnswer>) -> Self {
        Self {
            survey_id: survey_id.into(),
            answers,
            cast_at: OffsetDateTime::now_utc(),
        }
    }

    pub fn contains(&self, selection: &SelectedAnswer) -> bool {
        self.answers.contains(selection)
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Respondent {
    pub id: String,
    #[serde(default)]
    pub participations: Vec<SurveyParticipation>,
    #[serde(default)]
    pub revision: i64,
}

impl Respondent {
    pub fn participation(&self, survey_id: &str) -> Option<&SurveyParticipation> {
        self.participations.iter().find(|p| p.survey_id == survey_id)
    }

    pub fn has_participated(&self, survey_id: &str) -> bool {
        self.participation(survey_id).is_some()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct VoteResult {
    pub accepted: bool,
    pub echo: Vec<VoteEntry>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AnswerView {
    pub id: i64,
    pub text: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct QuestionView {
    pub id: i64,
    pub title: String,
    pub subtitle: String,
    pub exclusive: bool,
    pub answers: Vec<AnswerView>,
}

/// Survey as shown to respondents; counters are never exposed here.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SurveyView {
    pub id: String,
    pub title: String,
    pub vote_link: String,
    pub questions: Vec<QuestionView>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SurveyListEntry {
    pub id: String,
    pub title: String,
    pub link: String,
    pub survey_link: String,
    pub question_count: usize,
}

impl From<&Survey> for SurveyListEntry {
    fn from(survey: &Survey) -> Self {
        Self {
            id: survey.id.clone(),
            title: survey.title.clone(),
            link: format!("/api/admin/survey/{}", survey.id),
            survey_link: format!("/api/survey/{}", survey.id),
            question_count: survey.questions.len(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct QuestionSlots {
    pub answers: Vec<usize>,
}

/// Blank creation form: `questions[n].answers` lists the answer slot numbers
/// for question slot `n`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CreateSurveyForm {
    pub questions: Vec<QuestionSlots>,
}

impl CreateSurveyForm {
    pub fn blank(questions: usize, answers: usize) -> Self {
        Self {
            questions: (0..questions)
                .map(|_| QuestionSlots { answers: (0..answers).collect() })
                .collect(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ChartHeading {
    pub id: i64,
    pub title: String,
    pub total_votes: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SurveyReview {
    pub title: String,
    pub chart_link: String,
    pub charts: Vec<ChartHeading>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ChartDataset {
    pub label: String,
    pub data: Vec<u64>,
    pub background_color: Vec<String>,
    pub border_color: Vec<String>,
    pub border_width: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ChartData {
    pub labels: Vec<String>,
    pub datasets: Vec<ChartDataset>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ChartSet {
    pub id: i64,
    pub data: ChartData,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ChartPage {
    pub dataset: Vec<ChartSet>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CounterMismatch {
    pub question_id: i64,
    pub answer_id: i64,
    pub stored: u64,
    pub replayed: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AuditReport {
    pub survey_id: String,
    pub participations: usize,
    pub consistent: bool,
    pub mismatches: Vec<CounterMismatch>,
}
