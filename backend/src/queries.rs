use rocket::async_trait;
use serde_json::json;
use sqlx::{types::Json, FromRow, PgPool};
use shared::models::*;
use crate::store::{generate_id, RespondentStore, StoreError, SurveyStore};

/// Postgres-backed store. Each document lives in one row with its nested
/// data as JSONB and an integer revision used for compare-and-swap.
pub struct PgStore {
    pool: PgPool,
}

#[derive(FromRow)]
struct SurveyRow {
    id: String,
    title: String,
    questions: Json<Vec<Question>>,
    revision: i64,
}

impl From<SurveyRow> for Survey {
    fn from(row: SurveyRow) -> Self {
        Survey {
            id: row.id,
            title: row.title,
            questions: row.questions.0,
            revision: row.revision,
        }
    }
}

#[derive(FromRow)]
struct RespondentRow {
    id: String,
    participations: Json<Vec<SurveyParticipation>>,
    revision: i64,
}

impl From<RespondentRow> for Respondent {
    fn from(row: RespondentRow) -> Self {
        Respondent {
            id: row.id,
            participations: row.participations.0,
            revision: row.revision,
        }
    }
}

/// JSONB containment filter matching respondents with a participation for
/// `survey_id`. Relies on the serialized field name of
/// `SurveyParticipation::survey_id`.
pub(crate) fn participation_filter(survey_id: &str) -> serde_json::Value {
    json!([{ "survey_id": survey_id }])
}

fn db_error(e: sqlx::Error) -> StoreError {
    StoreError::Database(e.to_string())
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Distinguishes a lost compare-and-swap from a missing row after an
    /// update touched nothing.
    async fn missed_update(&self, table: &str, id: &str) -> StoreError {
        let query = format!("SELECT EXISTS (SELECT 1 FROM {} WHERE id = $1)", table);
        match sqlx::query_scalar::<_, bool>(&query).bind(id).fetch_one(&self.pool).await {
            Ok(true) => StoreError::Conflict,
            Ok(false) => StoreError::NotFound,
            Err(e) => db_error(e),
        }
    }
}

#[async_trait]
impl SurveyStore for PgStore {
    async fn get(&self, id: &str) -> Result<Survey, StoreError> {
        sqlx::query_as::<_, SurveyRow>(
            "SELECT id, title, questions, revision FROM surveys WHERE id = $1"
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(db_error)?
        .map(Survey::from)
        .ok_or(StoreError::NotFound)
    }

    async fn list(&self) -> Result<Vec<Survey>, StoreError> {
        let rows = sqlx::query_as::<_, SurveyRow>(
            r#"SELECT id, title, questions, revision FROM surveys ORDER BY title COLLATE "C", id"#
        )
        .fetch_all(&self.pool)
        .await
        .map_err(db_error)?;

        Ok(rows.into_iter().map(Survey::from).collect())
    }

    async fn insert(&self, survey: &Survey) -> Result<String, StoreError> {
        let id = generate_id();
        sqlx::query(
            "INSERT INTO surveys (id, title, questions, revision) VALUES ($1, $2, $3, 0)"
        )
        .bind(&id)
        .bind(&survey.title)
        .bind(Json(&survey.questions))
        .execute(&self.pool)
        .await
        .map_err(db_error)?;

        Ok(id)
    }

    async fn replace(&self, survey: &Survey) -> Result<(), StoreError> {
        let result = sqlx::query(
            "UPDATE surveys SET title = $2, questions = $3, revision = revision + 1
             WHERE id = $1 AND revision = $4"
        )
        .bind(&survey.id)
        .bind(&survey.title)
        .bind(Json(&survey.questions))
        .bind(survey.revision)
        .execute(&self.pool)
        .await
        .map_err(db_error)?;

        if result.rows_affected() == 0 {
            return Err(self.missed_update("surveys", &survey.id).await);
        }
        Ok(())
    }
}

#[async_trait]
impl RespondentStore for PgStore {
    async fn get(&self, id: &str) -> Result<Respondent, StoreError> {
        sqlx::query_as::<_, RespondentRow>(
            "SELECT id, participations, revision FROM respondents WHERE id = $1"
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(db_error)?
        .map(Respondent::from)
        .ok_or(StoreError::NotFound)
    }

    async fn insert(&self, respondent: &Respondent) -> Result<String, StoreError> {
        let id = generate_id();
        sqlx::query(
            "INSERT INTO respondents (id, participations, revision) VALUES ($1, $2, 0)"
        )
        .bind(&id)
        .bind(Json(&respondent.participations))
        .execute(&self.pool)
        .await
        .map_err(db_error)?;

        Ok(id)
    }

    async fn replace(&self, respondent: &Respondent) -> Result<(), StoreError> {
        let result = sqlx::query(
            "UPDATE respondents SET participations = $2, revision = revision + 1
             WHERE id = $1 AND revision = $3"
        )
        .bind(&respondent.id)
        .bind(Json(&respondent.participations))
        .bind(respondent.revision)
        .execute(&self.pool)
        .await
        .map_err(db_error)?;

        if result.rows_affected() == 0 {
            return Err(self.missed_update("respondents", &respondent.id).await);
        }
        Ok(())
    }

    async fn participations(&self, survey_id: &str) -> Result<Vec<SurveyParticipation>, StoreError> {
        let rows = sqlx::query_as::<_, RespondentRow>(
            "SELECT id, participations, revision FROM respondents WHERE participations @> $1"
        )
        .bind(Json(participation_filter(survey_id)))
        .fetch_all(&self.pool)
        .await
        .map_err(db_error)?;

        Ok(rows.into_iter()
            .map(Respondent::from)
            .filter_map(|r| r.participation(survey_id).cloned())
            .collect())
    }
}
