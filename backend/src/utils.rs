use ring::rand::{SecureRandom, SystemRandom};
use uuid::Uuid;
use crate::error::ApiError;

const FALLBACK_COLOR: &str = "rgba(128, 128, 128, 0.5)";

/// Survey ids are generated as UUIDs; anything else cannot name a survey.
pub fn parse_survey_id(id: &str) -> Result<String, ApiError> {
    Uuid::parse_str(id)
        .map(|uuid| uuid.to_string())
        .map_err(|_| ApiError::InvalidId)
}

pub fn random_color() -> String {
    let mut rgb = [0u8; 3];
    match SystemRandom::new().fill(&mut rgb) {
        Ok(()) => format!("rgba({}, {}, {}, 0.5)", rgb[0], rgb[1], rgb[2]),
        Err(_) => FALLBACK_COLOR.into(),
    }
}
