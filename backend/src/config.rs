use ring::constant_time::verify_slices_are_equal;
use tracing::warn;
use shared::credentials::BasicCredentials;
use shared::validation::{VoteParsing, MAX_ANSWERS, MAX_QUESTIONS};
use crate::processor::{VotePolicy, DEFAULT_COMMIT_ATTEMPTS};

pub const ADMIN_USER: &str = "ADMIN_USER";
pub const ADMIN_PASSWORD: &str = "ADMIN_PASSWORD";
pub const POLL_QUESTIONS: &str = "POLL_QUESTIONS";
pub const POLL_ANSWERS: &str = "POLL_ANSWERS";
pub const VOTE_PARSING: &str = "VOTE_PARSING";
pub const ENFORCE_EXCLUSIVE: &str = "ENFORCE_EXCLUSIVE";

const DEFAULT_QUESTIONS: usize = 5;
const DEFAULT_ANSWERS: usize = 4;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error("{key} must be a number between 1 and {max}, got {value:?}")]
    OutOfRange { key: &'static str, value: String, max: usize },
    #[error("{key} is invalid: {reason}")]
    Invalid { key: &'static str, reason: String },
}

#[derive(Debug, Clone)]
pub struct AdminCredentials {
    credentials: BasicCredentials,
}

impl AdminCredentials {
    pub fn new(user: impl Into<String>, password: impl Into<String>) -> Self {
        Self { credentials: BasicCredentials::new(user, password) }
    }

    pub fn verify(&self, candidate: &BasicCredentials) -> bool {
        let user_ok = verify_slices_are_equal(self.credentials.user.as_bytes(), candidate.user.as_bytes()).is_ok();
        let password_ok = verify_slices_are_equal(self.credentials.password.as_bytes(), candidate.password.as_bytes()).is_ok();
        user_ok & password_ok
    }
}

/// Slot counts for the blank survey creation form.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollDefaults {
    pub questions: usize,
    pub answers: usize,
}

impl Default for PollDefaults {
    fn default() -> Self {
        Self { questions: DEFAULT_QUESTIONS, answers: DEFAULT_ANSWERS }
    }
}

#[derive(Debug, Clone, Default)]
pub struct AppConfig {
    /// `None` disables the admin API.
    pub admin: Option<AdminCredentials>,
    pub poll: PollDefaults,
    pub policy: VotePolicy,
}

impl AppConfig {
    /// Reads the configuration through `lookup`, which maps a secret name to
    /// its value.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let admin = match (lookup(ADMIN_USER), lookup(ADMIN_PASSWORD)) {
            (Some(user), Some(password)) if !user.trim().is_empty() && !password.is_empty() => {
                Some(AdminCredentials::new(user.trim(), password))
            }
            _ => {
                warn!("{} or {} not set - admin API will be disabled", ADMIN_USER, ADMIN_PASSWORD);
                None
            }
        };

        let poll = PollDefaults {
            questions: slot_count(&lookup, POLL_QUESTIONS, DEFAULT_QUESTIONS, MAX_QUESTIONS)?,
            answers: slot_count(&lookup, POLL_ANSWERS, DEFAULT_ANSWERS, MAX_ANSWERS)?,
        };

        let parsing = match lookup(VOTE_PARSING) {
            Some(value) => value.parse::<VoteParsing>()
                .map_err(|reason| ConfigError::Invalid { key: VOTE_PARSING, reason })?,
            None => VoteParsing::default(),
        };

        let enforce_exclusive = match lookup(ENFORCE_EXCLUSIVE) {
            Some(value) => value.trim().parse::<bool>()
                .map_err(|e| ConfigError::Invalid { key: ENFORCE_EXCLUSIVE, reason: e.to_string() })?,
            None => true,
        };

        Ok(Self {
            admin,
            poll,
            policy: VotePolicy {
                parsing,
                enforce_exclusive,
                commit_attempts: DEFAULT_COMMIT_ATTEMPTS,
            },
        })
    }
}

fn slot_count<F>(lookup: &F, key: &'static str, default: usize, max: usize) -> Result<usize, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let Some(value) = lookup(key) else { return Ok(default) };
    match value.trim().parse::<usize>() {
        Ok(n) if (1..=max).contains(&n) => Ok(n),
        _ => Err(ConfigError::OutOfRange { key, value, max }),
    }
}
