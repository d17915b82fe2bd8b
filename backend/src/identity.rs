use tracing::{debug, info};
use shared::models::Respondent;
use crate::store::{RespondentStore, StoreError};

/// Name of the cookie carrying the respondent token.
pub const RESPONDENT_COOKIE: &str = "poll_respondent";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedIdentity {
    pub respondent: Respondent,
    /// Set only when a respondent was created for this request.
    pub new_token: Option<String>,
}

/// Maps an opaque client token onto a stored respondent.
pub struct IdentityResolver<'a> {
    respondents: &'a dyn RespondentStore,
}

impl<'a> IdentityResolver<'a> {
    pub fn new(respondents: &'a dyn RespondentStore) -> Self {
        Self { respondents }
    }

    /// Loads the respondent named by `token`, or creates and persists a new
    /// one when the token is absent or unknown. Only the creating path
    /// writes to the store.
    pub async fn resolve(&self, token: Option<&str>) -> Result<ResolvedIdentity, StoreError> {
        if let Some(token) = token.filter(|t| !t.is_empty()) {
            match self.respondents.get(token).await {
                Ok(respondent) => {
                    return Ok(ResolvedIdentity { respondent, new_token: None });
                }
                Err(StoreError::NotFound) => debug!("Unknown respondent token, issuing a new one"),
                Err(e) => return Err(e),
            }
        }

        let mut respondent = Respondent::default();
        let id = self.respondents.insert(&respondent).await?;
        respondent.id = id.clone();
        info!("Created respondent {}", id);

        Ok(ResolvedIdentity { respondent, new_token: Some(id) })
    }
}
