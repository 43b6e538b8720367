//! Outbound account emails.
//!
//! The [`Notifier`] trait is the seam between the auth flows and the mail
//! transport. [`SmtpNotifier`] (feature `smtp`) sends real mail,
//! [`LogNotifier`] only logs a redacted link and is meant for local development.

use thiserror::Error;

use crate::config::AuthConfig;

#[derive(Debug, Error)]
pub enum NotifierError {
    #[error("Invalid email address {0}")]
    InvalidAddress(String),

    #[error("Failed to build message: {0}")]
    Message(String),

    #[error("Failed to deliver message: {0}")]
    Transport(String),
}

/// Delivers the verification and password reset emails.
#[async_trait::async_trait]
pub trait Notifier: Send + Sync {
    async fn send_verify_account_email(&self, to: &str, token: &str) -> Result<(), NotifierError>;

    async fn send_reset_password_email(&self, to: &str, token: &str) -> Result<(), NotifierError>;
}

/// Builds the frontend links embedded in emails: `{client_url}/{path}?token={token}`.
#[derive(Debug, Clone)]
pub struct LinkBuilder {
    client_url: String,
    verification_path: String,
    reset_path: String,
}

impl LinkBuilder {
    pub fn new(config: &AuthConfig) -> Self {
        LinkBuilder {
            client_url: config.client_url.trim_end_matches('/').to_string(),
            verification_path: config.verification_token_path.trim_matches('/').to_string(),
            reset_path: config.password_reset_path.trim_matches('/').to_string(),
        }
    }

    pub fn verify_account(&self, token: &str) -> String {
        format!("{}/{}?token={}", self.client_url, self.verification_path, token)
    }

    pub fn reset_password(&self, token: &str) -> String {
        format!("{}/{}?token={}", self.client_url, self.reset_path, token)
    }
}

const REDACTED: &str = "<redacted>";

/// Writes links to the log instead of sending mail.
///
/// The token is replaced by a placeholder. With `reveal_links` the usable
/// link is also emitted at debug level, which only development setups enable.
#[derive(Debug, Clone)]
pub struct LogNotifier {
    links: LinkBuilder,
    reveal_links: bool,
}

impl LogNotifier {
    pub fn new(config: &AuthConfig) -> Self {
        LogNotifier {
            links: LinkBuilder::new(config),
            reveal_links: false,
        }
    }

    pub fn reveal_links(mut self, reveal: bool) -> Self {
        self.reveal_links = reveal;
        self
    }
}

#[async_trait::async_trait]
impl Notifier for LogNotifier {
    async fn send_verify_account_email(&self, to: &str, token: &str) -> Result<(), NotifierError> {
        tracing::info!(to, link = %self.links.verify_account(REDACTED), "Verification email (not sent)");
        if self.reveal_links {
            tracing::debug!(link = %self.links.verify_account(token), "Development verification link");
        }
        Ok(())
    }

    async fn send_reset_password_email(&self, to: &str, token: &str) -> Result<(), NotifierError> {
        tracing::info!(to, link = %self.links.reset_password(REDACTED), "Password reset email (not sent)");
        if self.reveal_links {
            tracing::debug!(link = %self.links.reset_password(token), "Development password reset link");
        }
        Ok(())
    }
}

#[cfg(feature = "smtp")]
pub use smtp::SmtpNotifier;

#[cfg(feature = "smtp")]
mod smtp {
    use lettre::message::header::ContentType;
    use lettre::transport::smtp::authentication::Credentials;
    use lettre::{Address, AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};

    use super::{LinkBuilder, Notifier, NotifierError};
    use crate::config::{AuthConfig, SmtpConfig};

    /// Sends mail over SMTP with STARTTLS.
    pub struct SmtpNotifier {
        transport: AsyncSmtpTransport<Tokio1Executor>,
        sender: Address,
        links: LinkBuilder,
    }

    impl SmtpNotifier {
        pub fn new(smtp: &SmtpConfig, auth: &AuthConfig) -> Result<Self, NotifierError> {
            let sender = smtp
                .sender
                .parse::<Address>()
                .map_err(|_| NotifierError::InvalidAddress(smtp.sender.clone()))?;

            let transport = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&smtp.host)
                .map_err(|e| NotifierError::Transport(e.to_string()))?
                .port(smtp.port)
                .credentials(Credentials::new(
                    smtp.username.clone(),
                    smtp.password.clone(),
                ))
                .build();

            Ok(SmtpNotifier {
                transport,
                sender,
                links: LinkBuilder::new(auth),
            })
        }

        #[tracing::instrument(name = "Send email", skip(self, body), fields(to = %to))]
        async fn send(&self, to: &str, subject: &str, body: String) -> Result<(), NotifierError> {
            let to = to
                .parse::<Address>()
                .map_err(|_| NotifierError::InvalidAddress(to.to_string()))?;

            let message = Message::builder()
                .from(self.sender.clone().into())
                .to(to.into())
                .subject(subject)
                .header(ContentType::TEXT_HTML)
                .body(body)
                .map_err(|e| NotifierError::Message(e.to_string()))?;

            self.transport
                .send(message)
                .await
                .map_err(|e| NotifierError::Transport(e.to_string()))?;

            Ok(())
        }
    }

    #[async_trait::async_trait]
    impl Notifier for SmtpNotifier {
        async fn send_verify_account_email(
            &self,
            to: &str,
            token: &str,
        ) -> Result<(), NotifierError> {
            let body = format!(
                "Follow <a href=\"{}\">this link</a> to verify your email address.",
                self.links.verify_account(token)
            );
            self.send(to, "Email verification", body).await
        }

        async fn send_reset_password_email(
            &self,
            to: &str,
            token: &str,
        ) -> Result<(), NotifierError> {
            let body = format!(
                "Follow <a href=\"{}\">this link</a> to reset your password.",
                self.links.reset_password(token)
            );
            self.send(to, "Password reset", body).await
        }
    }
}
