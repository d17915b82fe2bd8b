pub mod processor;
pub mod identity;
pub mod routes;
pub mod store;
pub mod queries;
pub mod config;
pub mod auth;
pub mod error;
pub mod utils;
pub mod catchers;
pub use shared::models::*;

use rocket::{catchers, routes, Build, Rocket};
use crate::catchers::{bad_request, internal_error, not_found, unauthorized, unprocessable};
use crate::routes::{
    audit_survey, cast_vote, chart_data, create_form, create_survey, get_survey, list_surveys,
    review_survey, AppState,
};

/// Assembles the API around `state`; shared by the service entry point and
/// the HTTP tests.
pub fn build_rocket(state: AppState) -> Rocket<Build> {
    rocket::build()
        .manage(state)
        .mount(
            "/api",
            routes![
                get_survey,
                cast_vote,
                list_surveys,
                create_form,
                create_survey,
                review_survey,
                audit_survey,
                chart_data
            ],
        )
        .register(
            "/",
            catchers![
                unauthorized,
                bad_request,
                unprocessable,
                internal_error,
                not_found
            ],
        )
}

#[cfg(test)]
mod tests;
