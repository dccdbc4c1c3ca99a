//! src/email_client.rs
use crate::configuration::{HttpTransportSettings, SmtpSettings, SmtpTls, TransportSettings};
use lettre::message::{header, Mailbox, Message};
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Tokio1Executor};
use reqwest::Client;
use secrecy::{ExposeSecret, Secret};
use std::time::Duration;

/// Errors are transparent: the relay hands their text back to the caller.
#[derive(thiserror::Error, Debug)]
pub enum SendEmailError {
    #[error(transparent)]
    InvalidAddress(#[from] lettre::address::AddressError),
    #[error(transparent)]
    Message(#[from] lettre::error::Error),
    #[error(transparent)]
    Smtp(#[from] lettre::transport::smtp::Error),
    #[error(transparent)]
    Http(#[from] reqwest::Error),
    #[error("{0}")]
    InvalidSettings(&'static str),
}

pub struct EmailClient {
    sender: Mailbox,
    transport: Transport,
}

enum Transport {
    Smtp(AsyncSmtpTransport<Tokio1Executor>),
    Http {
        http_client: Client,
        base_url: String,
        authorization_token: Secret<String>,
    },
}

impl EmailClient {
    pub fn new(
        sender: &str,
        settings: TransportSettings,
        timeout: Duration,
    ) -> Result<Self, SendEmailError> {
        let sender = sender.parse::<Mailbox>()?;
        let transport = match settings {
            TransportSettings::Smtp(smtp) => Transport::Smtp(smtp_transport(smtp, timeout)?),
            TransportSettings::Http(http) => http_transport(http, timeout)?,
        };
        Ok(Self { sender, transport })
    }

    #[tracing::instrument(name = "Dispatching an outbound email", skip(self, html_content))]
    pub async fn send_email(
        &self,
        recipient: &str,
        subject: &str,
        html_content: &str,
    ) -> Result<(), SendEmailError> {
        match &self.transport {
            Transport::Smtp(transport) => {
                let message = build_message(&self.sender, recipient, subject, html_content)?;
                transport.send(message).await?;
            }
            Transport::Http {
                http_client,
                base_url,
                authorization_token,
            } => {
                let url = format!("{}/email", base_url);
                let from = self.sender.email.to_string();
                let request_body = SendEmailRequest {
                    from: &from,
                    to: recipient,
                    subject,
                    html_body: html_content,
                };
                http_client
                    .post(&url)
                    .header(
                        "X-Postmark-Server-Token",
                        authorization_token.expose_secret(),
                    )
                    .json(&request_body)
                    .send()
                    .await?
                    .error_for_status()?;
            }
        }
        tracing::info!("Email accepted by the transport");
        Ok(())
    }
}

fn build_message(
    sender: &Mailbox,
    recipient: &str,
    subject: &str,
    html_content: &str,
) -> Result<Message, SendEmailError> {
    let to = recipient.parse::<Mailbox>()?;
    let message = Message::builder()
        .from(sender.clone())
        .to(to)
        .subject(subject)
        .header(header::ContentType::TEXT_HTML)
        .body(html_content.to_string())?;
    Ok(message)
}

fn smtp_transport(
    settings: SmtpSettings,
    timeout: Duration,
) -> Result<AsyncSmtpTransport<Tokio1Executor>, SendEmailError> {
    let credentials = match (settings.username, settings.password) {
        (Some(username), Some(password)) => Some(Credentials::new(
            username,
            password.expose_secret().to_string(),
        )),
        (None, None) => None,
        _ => {
            return Err(SendEmailError::InvalidSettings(
                "SMTP username and password must be set together",
            ))
        }
    };

    let builder = match settings.tls {
        SmtpTls::Starttls => {
            AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&settings.host)?
        }
        SmtpTls::Implicit => AsyncSmtpTransport::<Tokio1Executor>::relay(&settings.host)?,
        SmtpTls::Plaintext => {
            AsyncSmtpTransport::<Tokio1Executor>::builder_dangerous(settings.host)
        }
    }
    .port(settings.port)
    .timeout(Some(timeout));

    let builder = match credentials {
        Some(credentials) => builder.credentials(credentials),
        None => {
            tracing::info!("No SMTP credentials configured; sending unauthenticated");
            builder
        }
    };
    Ok(builder.build())
}

fn http_transport(
    settings: HttpTransportSettings,
    timeout: Duration,
) -> Result<Transport, SendEmailError> {
    let http_client = Client::builder().timeout(timeout).build()?;
    Ok(Transport::Http {
        http_client,
        base_url: settings.base_url,
        authorization_token: settings.authorization_token,
    })
}

#[derive(serde::Serialize)]
#[serde(rename_all = "PascalCase")]
struct SendEmailRequest<'a> {
    from: &'a str,
    to: &'a str,
    subject: &'a str,
    html_body: &'a str,
}
