use std::sync::{Arc, Mutex};
use std::time::Duration;

use lettre::message::header::ContentType;
use lettre::message::Mailbox;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{Message, SmtpTransport, Transport};
use serde::Serialize;
use tracing::info;

use crate::candidates::domain::{CandidateId, CandidateRecord};
use crate::config::NotifyConfig;

const SMTP_TIMEOUT: Duration = Duration::from_secs(10);

/// Outbound message inviting a candidate to follow up on a role.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ContactMessage {
    pub candidate_id: CandidateId,
    pub recipient: String,
    pub subject: String,
    pub body: String,
}

impl ContactMessage {
    pub fn compose(record: &CandidateRecord, role: &str, score: f64) -> Self {
        let body = format!(
            "Hola {name},\n\n\
             Hemos revisado tu perfil y nos interesa contactarte para una oportunidad como {role}.\n\n\
             Tu puntuación para este puesto es: {score}%\n\n\
             Por favor, contáctanos para más información.\n\n\
             Saludos,\n\
             Equipo LinkenChamba\n",
            name = record.name,
        );

        Self {
            candidate_id: record.id.clone(),
            recipient: record.email.clone(),
            subject: format!("Oportunidad laboral - {role}"),
            body,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum NotifyError {
    #[error("contact delivery is not configured")]
    NotConfigured,
    #[error("invalid email address '{address}': {reason}")]
    InvalidAddress { address: String, reason: String },
    #[error("contact delivery failed: {0}")]
    Transport(String),
}

/// Delivery channel for contact messages.
pub trait ContactNotifier: Send + Sync {
    fn deliver(&self, message: &ContactMessage) -> Result<(), NotifyError>;
}

struct Mailer {
    transport: SmtpTransport,
    sender: Mailbox,
}

/// Sends contact messages over SMTP with STARTTLS and login.
///
/// Built without credentials, every delivery is refused with [`NotifyError::NotConfigured`].
pub struct SmtpNotifier {
    mailer: Option<Mailer>,
}

impl SmtpNotifier {
    pub fn disabled() -> Self {
        Self { mailer: None }
    }

    pub fn from_config(config: &NotifyConfig) -> Result<Self, NotifyError> {
        let Some((username, password)) = config.credentials() else {
            return Ok(Self::disabled());
        };

        let sender = parse_mailbox(username)?;
        let transport = SmtpTransport::starttls_relay(&config.smtp_server)
            .map_err(|err| NotifyError::Transport(err.to_string()))?
            .port(config.smtp_port)
            .credentials(Credentials::new(username.to_string(), password.to_string()))
            .timeout(Some(SMTP_TIMEOUT))
            .build();

        Ok(Self {
            mailer: Some(Mailer { transport, sender }),
        })
    }

    pub fn is_enabled(&self) -> bool {
        self.mailer.is_some()
    }
}

impl std::fmt::Debug for SmtpNotifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SmtpNotifier")
            .field("sender", &self.mailer.as_ref().map(|mailer| mailer.sender.to_string()))
            .finish_non_exhaustive()
    }
}

impl ContactNotifier for SmtpNotifier {
    fn deliver(&self, message: &ContactMessage) -> Result<(), NotifyError> {
        let mailer = self.mailer.as_ref().ok_or(NotifyError::NotConfigured)?;

        let email = Message::builder()
            .from(mailer.sender.clone())
            .to(parse_mailbox(&message.recipient)?)
            .subject(message.subject.as_str())
            .header(ContentType::TEXT_PLAIN)
            .body(message.body.clone())
            .map_err(|err| NotifyError::Transport(err.to_string()))?;

        mailer
            .transport
            .send(&email)
            .map_err(|err| NotifyError::Transport(err.to_string()))?;

        info!(
            to = %message.recipient,
            candidate_id = %message.candidate_id,
            subject = %message.subject,
            "contact email sent"
        );
        Ok(())
    }
}

fn parse_mailbox(address: &str) -> Result<Mailbox, NotifyError> {
    address
        .trim()
        .parse::<Mailbox>()
        .map_err(|err| NotifyError::InvalidAddress {
            address: address.to_string(),
            reason: err.to_string(),
        })
}

/// Keeps delivered messages in memory for inspection.
#[derive(Debug, Clone, Default)]
pub struct OutboxNotifier {
    sent: Arc<Mutex<Vec<ContactMessage>>>,
}

impl OutboxNotifier {
    pub fn sent(&self) -> Vec<ContactMessage> {
        self.sent
            .lock()
            .map(|messages| messages.clone())
            .unwrap_or_default()
    }
}

impl ContactNotifier for OutboxNotifier {
    fn deliver(&self, message: &ContactMessage) -> Result<(), NotifyError> {
        self.sent
            .lock()
            .map_err(|_| NotifyError::Transport("outbox lock poisoned".to_string()))?
            .push(message.clone());
        Ok(())
    }
}
