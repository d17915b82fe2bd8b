use rocket::http::Status;
use rocket::response::Responder;
use rocket::serde::json::Json;
use serde::Serialize;
use thiserror::Error;
use tracing::error;
use shared::{Error as ErrorBody, ErrorCode};
use crate::processor::VoteError;
use crate::store::StoreError;

#[derive(Error, Debug, Serialize)]
pub enum ApiError {
    #[error("Survey not found")]
    NotFound,
    #[error("Invalid survey ID")]
    InvalidId,
    #[error("Already voted")]
    AlreadyVoted,
    #[error("Invalid request: {0}")]
    Validation(String),
    #[error("Internal error: {0}")]
    Internal(String),
}

impl ApiError {
    fn status(&self) -> Status {
        match self {
            ApiError::NotFound => Status::NotFound,
            ApiError::InvalidId => Status::BadRequest,
            ApiError::AlreadyVoted => Status::Forbidden,
            ApiError::Validation(_) => Status::UnprocessableEntity,
            ApiError::Internal(_) => Status::InternalServerError,
        }
    }

    fn body(&self) -> ErrorBody {
        match self {
            ApiError::NotFound => ErrorBody::new(ErrorCode::NotFound, self.to_string()),
            ApiError::InvalidId => ErrorBody::new(ErrorCode::InvalidInput, self.to_string()),
            ApiError::AlreadyVoted => ErrorBody::new(ErrorCode::AlreadyVoted, self.to_string()),
            ApiError::Validation(details) => {
                ErrorBody::with_details(ErrorCode::ValidationFailed, "Invalid request", details.clone())
            }
            // Store details stay in the logs.
            ApiError::Internal(_) => ErrorBody::new(ErrorCode::SystemError, "Internal error"),
        }
    }
}

impl From<VoteError> for ApiError {
    fn from(e: VoteError) -> Self {
        match e {
            VoteError::NotFound => ApiError::NotFound,
            VoteError::DuplicateVote => ApiError::AlreadyVoted,
            VoteError::Validation(v) => ApiError::Validation(v.to_string()),
            VoteError::Persistence(p) => ApiError::Internal(p.to_string()),
        }
    }
}

impl From<StoreError> for ApiError {
    fn from(e: StoreError) -> Self {
        ApiError::Internal(e.to_string())
    }
}

impl<'r, 'o: 'r> Responder<'r, 'o> for ApiError {
    fn respond_to(self, req: &'r rocket::Request<'_>) -> rocket::response::Result<'o> {
        if let ApiError::Internal(details) = &self {
            error!("{} {} failed: {}", req.method(), req.uri(), details);
        }

        rocket::Response::build_from(Json(self.body()).respond_to(req)?)
            .status(self.status())
            .ok()
    }
}
