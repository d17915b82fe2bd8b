use rocket::{Request, Responder, catch, serde::json::Json};
use rocket::http::Header;
use serde::Serialize;

#[derive(Serialize)]
pub struct ErrorMessage {
    error: String,
    status: u16,
}

#[derive(Responder)]
#[response(status = 401, content_type = "json")]
pub struct Challenge {
    body: Json<ErrorMessage>,
    authenticate: Header<'static>,
}

#[catch(401)]
pub fn unauthorized(_req: &Request) -> Challenge {
    Challenge {
        body: Json(ErrorMessage {
            error: "Not authorized".into(),
            status: 401
        }),
        authenticate: Header::new("WWW-Authenticate", r#"Basic realm="Restricted""#),
    }
}

#[catch(400)]
pub fn bad_request(_req: &Request) -> Json<ErrorMessage> {
    Json(ErrorMessage {
        error: "Invalid request parameters.".into(),
        status: 400
    })
}

#[catch(422)]
pub fn unprocessable(_req: &Request) -> Json<ErrorMessage> {
    Json(ErrorMessage {
        error: "The request body could not be processed.".into(),
        status: 422
    })
}

#[catch(500)]
pub fn internal_error(_req: &Request) -> Json<ErrorMessage> {
    Json(ErrorMessage {
        error: "An internal server error occurred.".into(),
        status: 500
    })
}

#[catch(404)]
pub fn not_found(_req: &Request) -> Json<ErrorMessage> {
    Json(ErrorMessage {
        error: "The requested resource was not found.".into(),
        status: 404
    })
}
