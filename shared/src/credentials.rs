use serde::{Serialize, Deserialize};
use base64::engine::general_purpose::STANDARD;
use base64::Engine;

pub const AUTHORIZATION_HEADER: &str = "Authorization";

/// User name and password carried by an `Authorization: Basic ...` header.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BasicCredentials {
    pub user: String,
    pub password: String,
}

impl BasicCredentials {
    pub fn new(user: impl Into<String>, password: impl Into<String>) -> Self {
        Self { user: user.into(), password: password.into() }
    }

    pub fn parse_header(value: &str) -> Option<Self> {
        let (scheme, encoded) = value.trim().split_once(' ')?;
        if !scheme.eq_ignore_ascii_case("basic") {
            return None;
        }

        let decoded = STANDARD.decode(encoded.trim()).ok()?;
        let decoded = String::from_utf8(decoded).ok()?;
        let (user, password) = decoded.split_once(':')?;

        Some(Self::new(user, password))
    }

    pub fn to_header(&self) -> String {
        format!("Basic {}", STANDARD.encode(format!("{}:{}", self.user, self.password)))
    }
}

#[cfg(feature = "backend")]
mod backend_impl {
    use super::*;
    use rocket::http::Status;
    use rocket::request::{FromRequest, Outcome};
    use rocket::Request;

    #[rocket::async_trait]
    impl<'r> FromRequest<'r> for BasicCredentials {
        type Error = ();

        async fn from_request(req: &'r Request<'_>) -> Outcome<Self, Self::Error> {
            match req.headers().get_one(AUTHORIZATION_HEADER).and_then(BasicCredentials::parse_header) {
                Some(credentials) => Outcome::Success(credentials),
                None => Outcome::Error((Status::Unauthorized, ())),
            }
        }
    }
}
