use std::sync::Arc;
use rocket::{State, get, post, serde::json::Json};
use rocket::http::{Cookie, CookieJar};
use tracing::{debug, info, instrument};
use shared::models::*;
use crate::{
    auth::AdminUser,
    config::AppConfig,
    error::ApiError,
    identity::{IdentityResolver, RESPONDENT_COOKIE},
    processor::VoteProcessor,
    store::{RespondentStore, SurveyStore},
    utils::parse_survey_id,
};

pub struct AppState {
    pub surveys: Arc<dyn SurveyStore>,
    pub respondents: Arc<dyn RespondentStore>,
    pub config: AppConfig,
}

impl AppState {
    pub fn new(surveys: Arc<dyn SurveyStore>, respondents: Arc<dyn RespondentStore>, config: AppConfig) -> Self {
        Self { surveys, respondents, config }
    }

    pub fn processor(&self) -> VoteProcessor<'_> {
        VoteProcessor::new(self.surveys.as_ref(), self.respondents.as_ref(), self.config.policy)
    }

    pub fn identity(&self) -> IdentityResolver<'_> {
        IdentityResolver::new(self.respondents.as_ref())
    }
}

#[get("/survey/<id>")]
pub async fn get_survey(state: &State<AppState>, id: &str) -> Result<Json<SurveyView>, ApiError> {
    let survey_id = parse_survey_id(id)?;
    let survey = state.processor().fetch_survey(&survey_id).await?;
    Ok(Json(survey.public_view()))
}

#[instrument(skip(state, vote, cookies), fields(survey_id = %id))]
#[post("/vote/<id>", format = "json", data = "<vote>")]
pub async fn cast_vote(
    state: &State<AppState>,
    id: &str,
    vote: Json<Vec<VoteEntry>>,
    cookies: &CookieJar<'_>,
) -> Result<Json<Vec<VoteEntry>>, ApiError> {
    let survey_id = parse_survey_id(id)?;
    let token = cookies.get(RESPONDENT_COOKIE).map(|c| c.value().to_string());

    let identity = state.identity().resolve(token.as_deref()).await?;
    if let Some(new_token) = identity.new_token {
        debug!("Issuing respondent cookie");
        cookies.add(Cookie::build((RESPONDENT_COOKIE, new_token)).path("/").http_only(true));
    }

    let result = state.processor()
        .submit_vote(&survey_id, identity.respondent, &vote)
        .await?;

    Ok(Json(result.echo))
}

#[get("/admin/surveys")]
pub async fn list_surveys(state: &State<AppState>, _admin: AdminUser) -> Result<Json<Vec<SurveyListEntry>>, ApiError> {
    state.processor().list_surveys().await.map(Json).map_err(ApiError::from)
}

#[get("/admin/create")]
pub async fn create_form(state: &State<AppState>, _admin: AdminUser) -> Json<CreateSurveyForm> {
    let poll = state.config.poll;
    Json(CreateSurveyForm::blank(poll.questions, poll.answers))
}

#[instrument(skip(state, form, admin), fields(admin = %admin.name))]
#[post("/admin/create", format = "json", data = "<form>")]
pub async fn create_survey(
    state: &State<AppState>,
    admin: AdminUser,
    form: Json<Vec<VoteEntry>>,
) -> Result<Json<Survey>, ApiError> {
    let survey = state.processor().create_survey(&form).await?;
    info!(survey_id = %survey.id, "Survey published");
    Ok(Json(survey))
}

#[get("/admin/survey/<id>")]
pub async fn review_survey(state: &State<AppState>, id: &str, _admin: AdminUser) -> Result<Json<SurveyReview>, ApiError> {
    let survey_id = parse_survey_id(id)?;
    let survey = state.processor().fetch_survey(&survey_id).await?;
    Ok(Json(VoteProcessor::review(&survey)))
}

#[get("/admin/survey/<id>/audit")]
pub async fn audit_survey(state: &State<AppState>, id: &str, _admin: AdminUser) -> Result<Json<AuditReport>, ApiError> {
    let survey_id = parse_survey_id(id)?;
    state.processor().audit(&survey_id).await.map(Json).map_err(ApiError::from)
}

#[get("/chart/<id>")]
pub async fn chart_data(state: &State<AppState>, id: &str, _admin: AdminUser) -> Result<Json<ChartPage>, ApiError> {
    let survey_id = parse_survey_id(id)?;
    let survey = state.processor().fetch_survey(&survey_id).await?;
    Ok(Json(VoteProcessor::chart_page(&survey)))
}
