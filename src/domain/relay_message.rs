/// A complete relay request: recipient, subject and an HTML fragment.
#[derive(Debug, Clone, PartialEq)]
pub struct RelayMessage {
    recipient: String,
    subject: String,
    message: String,
}

#[derive(Debug, PartialEq, thiserror::Error)]
#[error("Missing parameters")]
pub struct MissingParameters;

impl RelayMessage {
    /// Absent and empty fields both count as missing. Nothing else is
    /// checked: the address format is left to the mail transport.
    pub fn parse(
        email: Option<String>,
        subject: Option<String>,
        message: Option<String>,
    ) -> Result<Self, MissingParameters> {
        match (present(email), present(subject), present(message)) {
            (Some(recipient), Some(subject), Some(message)) => Ok(Self {
                recipient,
                subject,
                message,
            }),
            _ => Err(MissingParameters),
        }
    }

    pub fn recipient(&self) -> &str {
        &self.recipient
    }

    pub fn subject(&self) -> &str {
        &self.subject
    }

    /// The caller's fragment inside the mail wrapper. The fragment is not
    /// escaped: callers send their own markup templates.
    pub fn html_body(&self) -> String {
        format!(
            r#"<div style="font-family: Arial, sans-serif;">{}</div>"#,
            self.message
        )
    }
}

fn present(field: Option<String>) -> Option<String> {
    field.filter(|value| !value.is_empty())
}
