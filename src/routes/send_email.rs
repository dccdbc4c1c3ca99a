use crate::domain::{MissingParameters, RelayMessage};
use crate::email_client::{EmailClient, SendEmailError};
use crate::routes::error_chain_fmt;
use actix_web::error::JsonPayloadError;
use actix_web::http::StatusCode;
use actix_web::{web, HttpRequest, HttpResponse, ResponseError};

#[derive(serde::Deserialize)]
pub struct SendEmailBody {
    email: Option<String>,
    subject: Option<String>,
    message: Option<String>,
}

#[derive(serde::Serialize, serde::Deserialize, Debug, PartialEq)]
pub struct RelayResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl RelayResponse {
    fn sent() -> Self {
        Self {
            success: true,
            error: None,
        }
    }

    fn failed(error: String) -> Self {
        Self {
            success: false,
            error: Some(error),
        }
    }
}

#[derive(thiserror::Error)]
pub enum SendEmailRouteError {
    #[error(transparent)]
    MissingParameters(#[from] MissingParameters),
    #[error("{0}")]
    MalformedBody(String),
    #[error(transparent)]
    Transport(#[from] SendEmailError),
}

impl std::fmt::Debug for SendEmailRouteError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        error_chain_fmt(self, f)
    }
}

impl ResponseError for SendEmailRouteError {
    fn status_code(&self) -> StatusCode {
        match self {
            SendEmailRouteError::MissingParameters(_) | SendEmailRouteError::MalformedBody(_) => {
                StatusCode::BAD_REQUEST
            }
            SendEmailRouteError::Transport(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code()).json(RelayResponse::failed(self.to_string()))
    }
}

/// Keeps the `{success, error}` envelope for bodies that fail to deserialize.
///
/// A request without a JSON body carries none of the fields, so it is
/// reported as missing parameters rather than as a malformed body.
pub fn json_error_handler(err: JsonPayloadError, _req: &HttpRequest) -> actix_web::Error {
    tracing::warn!("Rejected relay payload: {}", err);
    match err {
        JsonPayloadError::ContentType => SendEmailRouteError::MissingParameters(MissingParameters),
        JsonPayloadError::Deserialize(e) if is_empty_payload(&e) => {
            SendEmailRouteError::MissingParameters(MissingParameters)
        }
        other => SendEmailRouteError::MalformedBody(other.to_string()),
    }
    .into()
}

fn is_empty_payload(e: &serde_json::Error) -> bool {
    e.is_eof() && e.line() == 1 && e.column() == 0
}

#[tracing::instrument(
    name = "Relaying an email",
    skip(body, email_client),
    fields(recipient = ?body.email, subject = ?body.subject)
)]
pub async fn send_email(
    body: web::Json<SendEmailBody>,
    email_client: web::Data<EmailClient>,
) -> Result<HttpResponse, SendEmailRouteError> {
    let body = body.into_inner();
    let relay = RelayMessage::parse(body.email, body.subject, body.message)?;

    email_client
        .send_email(relay.recipient(), relay.subject(), &relay.html_body())
        .await
        .map_err(|e| {
            tracing::error!("Failed to send email: {:?}", e);
            e
        })?;

    Ok(HttpResponse::Ok().json(RelayResponse::sent()))
}
