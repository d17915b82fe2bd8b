use tracing::{debug, error, info, instrument, warn};
use shared::models::*;
use shared::tally;
use shared::validation::{check_exclusive, parse_vote, survey_from_form, ValidationError, VoteParsing};
use crate::store::{RespondentStore, StoreError, SurveyStore};
use crate::utils::random_color;

pub const DEFAULT_COMMIT_ATTEMPTS: usize = 8;
const CHART_LABEL: &str = "# of Votes";

#[derive(Debug, thiserror::Error)]
pub enum VoteError {
    #[error("Survey not found")]
    NotFound,
    #[error("Vote already done")]
    DuplicateVote,
    #[error("Invalid vote: {0}")]
    Validation(#[from] ValidationError),
    #[error("Persistence error: {0}")]
    Persistence(#[from] StoreError),
}

/// Knobs for how strictly votes are checked and how hard the processor
/// retries a contended commit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VotePolicy {
    pub parsing: VoteParsing,
    pub enforce_exclusive: bool,
    pub commit_attempts: usize,
}

impl Default for VotePolicy {
    fn default() -> Self {
        Self {
            parsing: VoteParsing::Lenient,
            enforce_exclusive: true,
            commit_attempts: DEFAULT_COMMIT_ATTEMPTS,
        }
    }
}

pub struct VoteProcessor<'a> {
    surveys: &'a dyn SurveyStore,
    respondents: &'a dyn RespondentStore,
    policy: VotePolicy,
}

impl<'a> VoteProcessor<'a> {
    pub fn new(surveys: &'a dyn SurveyStore, respondents: &'a dyn RespondentStore, policy: VotePolicy) -> Self {
        Self { surveys, respondents, policy }
    }

    /// Validates and applies one respondent's vote.
    ///
    /// The participation is written to the respondent first, then the answer
    /// counters are committed to the survey. Both writes are revision checked:
    /// a respondent conflict is re-examined for a concurrent vote on the same
    /// survey, and a survey conflict reloads the survey and reapplies the
    /// selections.
    #[instrument(skip(self, respondent, raw_vote), fields(respondent_id = %respondent.id))]
    pub async fn submit_vote(
        &self,
        survey_id: &str,
        respondent: Respondent,
        raw_vote: &[VoteEntry],
    ) -> Result<VoteResult, VoteError> {
        let survey = self.load_survey(survey_id).await?;

        if respondent.has_participated(survey_id) {
            debug!("Respondent already voted");
            return Err(VoteError::DuplicateVote);
        }

        let selections = parse_vote(raw_vote, self.policy.parsing)?;
        if self.policy.enforce_exclusive {
            check_exclusive(&survey, &selections)?;
        }

        self.record_participation(survey_id, respondent, &selections).await?;
        let applied = self.commit_counters(survey, &selections).await?;
        info!(selections = selections.len(), applied, "Vote recorded");

        Ok(VoteResult {
            accepted: true,
            echo: raw_vote.to_vec(),
        })
    }

    async fn load_survey(&self, survey_id: &str) -> Result<Survey, VoteError> {
        self.surveys.get(survey_id).await.map_err(|e| match e {
            StoreError::NotFound => VoteError::NotFound,
            other => VoteError::Persistence(other),
        })
    }

    async fn record_participation(
        &self,
        survey_id: &str,
        mut respondent: Respondent,
        selections: &[SelectedAnswer],
    ) -> Result<(), VoteError> {
        let participation = SurveyParticipation::new(survey_id, selections.to_vec());

        for attempt in 1..=self.policy.commit_attempts {
            respondent.participations.push(participation.clone());
            match self.respondents.replace(&respondent).await {
                Ok(()) => return Ok(()),
                Err(StoreError::Conflict) => {
                    warn!(attempt, "Respondent modified concurrently, reloading");
                    respondent = self.respondents.get(&respondent.id).await?;
                    if respondent.has_participated(survey_id) {
                        return Err(VoteError::DuplicateVote);
                    }
                }
                Err(e) => {
                    error!("Failed to save respondent {}: {}", respondent.id, e);
                    return Err(e.into());
                }
            }
        }

        Err(VoteError::Persistence(StoreError::Conflict))
    }

    async fn commit_counters(&self, mut survey: Survey, selections: &[SelectedAnswer]) -> Result<usize, VoteError> {
        for attempt in 1..=self.policy.commit_attempts {
            let applied = survey.apply_selections(selections);
            match self.surveys.replace(&survey).await {
                Ok(()) => return Ok(applied),
                Err(StoreError::Conflict) => {
                    debug!(attempt, "Survey modified concurrently, retrying");
                    survey = self.load_survey(&survey.id).await?;
                }
                Err(e) => {
                    error!("Failed to save survey {}: {}", survey.id, e);
                    return Err(e.into());
                }
            }
        }

        error!("Gave up committing counters for survey {} after {} attempts", survey.id, self.policy.commit_attempts);
        Err(VoteError::Persistence(StoreError::Conflict))
    }

    #[instrument(skip(self, form))]
    pub async fn create_survey(&self, form: &[VoteEntry]) -> Result<Survey, VoteError> {
        let mut survey = survey_from_form(form)?;
        survey.id = self.surveys.insert(&survey).await?;
        info!(survey_id = %survey.id, questions = survey.questions.len(), "Survey created");
        Ok(survey)
    }

    pub async fn fetch_survey(&self, survey_id: &str) -> Result<Survey, VoteError> {
        self.load_survey(survey_id).await
    }

    pub async fn list_surveys(&self) -> Result<Vec<SurveyListEntry>, VoteError> {
        let surveys = self.surveys.list().await?;
        Ok(surveys.iter().map(SurveyListEntry::from).collect())
    }

    /// Replays every stored participation for the survey and compares the
    /// result with the stored counters.
    #[instrument(skip(self))]
    pub async fn audit(&self, survey_id: &str) -> Result<AuditReport, VoteError> {
        let survey = self.load_survey(survey_id).await?;
        let participations = self.respondents.participations(survey_id).await?;
        let replayed = tally::recount(&survey, &participations);
        let mismatches = tally::mismatches(&survey, &replayed);

        if !mismatches.is_empty() {
            warn!(mismatches = mismatches.len(), "Stored counters diverge from participations");
        }

        Ok(AuditReport {
            survey_id: survey.id,
            participations: participations.len(),
            consistent: mismatches.is_empty(),
            mismatches,
        })
    }

    pub fn review(survey: &Survey) -> SurveyReview {
        let totals = tally::totals(survey);
        SurveyReview {
            title: survey.title.clone(),
            chart_link: format!("/api/chart/{}", survey.id),
            charts: survey.questions.iter()
                .map(|q| ChartHeading {
                    id: q.id,
                    title: q.title.clone(),
                    total_votes: totals.get(&q.id).copied().unwrap_or(0),
                })
                .collect(),
        }
    }

    pub fn chart_page(survey: &Survey) -> ChartPage {
        let dataset = survey.questions.iter()
            .map(|q| ChartSet {
                id: q.id,
                data: ChartData {
                    labels: q.answers.iter().map(|a| a.text.clone()).collect(),
                    datasets: vec![ChartDataset {
                        label: CHART_LABEL.into(),
                        data: q.answers.iter().map(|a| a.counter).collect(),
                        background_color: q.answers.iter().map(|_| random_color()).collect(),
                        border_color: Vec::new(),
                        border_width: 1,
                    }],
                },
            })
            .collect();

        ChartPage { dataset }
    }
}
