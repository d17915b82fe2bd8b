use std::collections::HashMap;
use std::sync::Mutex;
use rocket::async_trait;
use uuid::Uuid;
use shared::models::*;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StoreError {
    #[error("Document not found")]
    NotFound,
    #[error("Document was modified concurrently")]
    Conflict,
    #[error("Store lock poisoned")]
    LockFailed,
    #[error("Database error: {0}")]
    Database(String),
}

/// Persistence for survey documents.
///
/// `replace` is a compare-and-swap on `Survey::revision`: it only succeeds
/// when the stored revision still equals the one the caller loaded, and fails
/// with `StoreError::Conflict` otherwise.
#[async_trait]
pub trait SurveyStore: Send + Sync {
    async fn get(&self, id: &str) -> Result<Survey, StoreError>;
    async fn list(&self) -> Result<Vec<Survey>, StoreError>;
    /// Stores a new survey and returns the generated id.
    async fn insert(&self, survey: &Survey) -> Result<String, StoreError>;
    async fn replace(&self, survey: &Survey) -> Result<(), StoreError>;
}

/// Persistence for respondent documents, with the same revision contract as
/// `SurveyStore`.
#[async_trait]
pub trait RespondentStore: Send + Sync {
    async fn get(&self, id: &str) -> Result<Respondent, StoreError>;
    async fn insert(&self, respondent: &Respondent) -> Result<String, StoreError>;
    async fn replace(&self, respondent: &Respondent) -> Result<(), StoreError>;
    /// Every recorded participation for `survey_id`, across all respondents.
    async fn participations(&self, survey_id: &str) -> Result<Vec<SurveyParticipation>, StoreError>;
}

pub fn generate_id() -> String {
    Uuid::new_v4().to_string()
}

/// Process-local store with the same revision semantics as `PgStore`.
#[derive(Debug, Default)]
pub struct MemoryStore {
    surveys: Mutex<HashMap<String, Survey>>,
    respondents: Mutex<HashMap<String, Respondent>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SurveyStore for MemoryStore {
    async fn get(&self, id: &str) -> Result<Survey, StoreError> {
        let surveys = self.surveys.lock().map_err(|_| StoreError::LockFailed)?;
        surveys.get(id).cloned().ok_or(StoreError::NotFound)
    }

    async fn list(&self) -> Result<Vec<Survey>, StoreError> {
        let surveys = self.surveys.lock().map_err(|_| StoreError::LockFailed)?;
        let mut all: Vec<Survey> = surveys.values().cloned().collect();
        all.sort_by(|a, b| a.title.cmp(&b.title).then_with(|| a.id.cmp(&b.id)));
        Ok(all)
    }

    async fn insert(&self, survey: &Survey) -> Result<String, StoreError> {
        let mut surveys = self.surveys.lock().map_err(|_| StoreError::LockFailed)?;
        let id = generate_id();
        surveys.insert(id.clone(), Survey { id: id.clone(), revision: 0, ..survey.clone() });
        Ok(id)
    }

    async fn replace(&self, survey: &Survey) -> Result<(), StoreError> {
        let mut surveys = self.surveys.lock().map_err(|_| StoreError::LockFailed)?;
        let stored = surveys.get_mut(&survey.id).ok_or(StoreError::NotFound)?;
        if stored.revision != survey.revision {
            return Err(StoreError::Conflict);
        }
        *stored = Survey { revision: survey.revision + 1, ..survey.clone() };
        Ok(())
    }
}

#[async_trait]
impl RespondentStore for MemoryStore {
    async fn get(&self, id: &str) -> Result<Respondent, StoreError> {
        let respondents = self.respondents.lock().map_err(|_| StoreError::LockFailed)?;
        respondents.get(id).cloned().ok_or(StoreError::NotFound)
    }

    async fn insert(&self, respondent: &Respondent) -> Result<String, StoreError> {
        let mut respondents = self.respondents.lock().map_err(|_| StoreError::LockFailed)?;
        let id = generate_id();
        respondents.insert(id.clone(), Respondent { id: id.clone(), revision: 0, ..respondent.clone() });
        Ok(id)
    }

    async fn replace(&self, respondent: &Respondent) -> Result<(), StoreError> {
        let mut respondents = self.respondents.lock().map_err(|_| StoreError::LockFailed)?;
        let stored = respondents.get_mut(&respondent.id).ok_or(StoreError::NotFound)?;
        if stored.revision != respondent.revision {
            return Err(StoreError::Conflict);
        }
        *stored = Respondent { revision: respondent.revision + 1, ..respondent.clone() };
        Ok(())
    }

    async fn participations(&self, survey_id: &str) -> Result<Vec<SurveyParticipation>, StoreError> {
        let respondents = self.respondents.lock().map_err(|_| StoreError::LockFailed)?;
        Ok(respondents.values()
            .filter_map(|r| r.participation(survey_id).cloned())
            .collect())
    }
}
