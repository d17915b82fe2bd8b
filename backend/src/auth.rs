use rocket::http::Status;
use rocket::request::{FromRequest, Outcome};
use rocket::Request;
use tracing::{debug, warn};
use shared::credentials::BasicCredentials;
use crate::routes::AppState;

/// Request guard for the admin API. Fails with 401 unless the request
/// carries Basic credentials matching the configured admin.
#[derive(Debug, Clone)]
pub struct AdminUser {
    pub name: String,
}

#[rocket::async_trait]
impl<'r> FromRequest<'r> for AdminUser {
    type Error = ();

    async fn from_request(req: &'r Request<'_>) -> Outcome<Self, Self::Error> {
        let Some(state) = req.rocket().state::<AppState>() else {
            return Outcome::Error((Status::InternalServerError, ()));
        };

        let Some(admin) = &state.config.admin else {
            warn!("Admin request rejected - admin credentials are not configured");
            return Outcome::Error((Status::Unauthorized, ()));
        };

        let credentials = match BasicCredentials::from_request(req).await {
            Outcome::Success(credentials) => credentials,
            _ => return Outcome::Error((Status::Unauthorized, ())),
        };

        if admin.verify(&credentials) {
            Outcome::Success(AdminUser { name: credentials.user })
        } else {
            debug!("Admin credentials rejected");
            Outcome::Error((Status::Unauthorized, ()))
        }
    }
}
