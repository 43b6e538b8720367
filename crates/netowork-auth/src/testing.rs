//! Helpers for integration tests: an in-memory [`App`] and a notifier that
//! records what would have been emailed.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use chrono::{DateTime, Utc};
use sea_orm::sea_query::Expr;
use sea_orm::{ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter};
use tokio::sync::Mutex;

use crate::app::App;
use crate::auth::{AuthService, SignUpRequest, SignedIn};
use crate::config::Config;
use crate::context::RequestContext;
use crate::models::{Role, password_reset_token, user, verification_token};
use crate::notifier::{Notifier, NotifierError};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EmailKind {
    VerifyAccount,
    ResetPassword,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SentEmail {
    pub kind: EmailKind,
    pub to: String,
    pub token: String,
}

/// Captures outgoing emails. Can be switched to fail every send.
#[derive(Default)]
pub struct RecordingNotifier {
    sent: Mutex<Vec<SentEmail>>,
    failing: AtomicBool,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    pub async fn sent(&self) -> Vec<SentEmail> {
        self.sent.lock().await.clone()
    }

    /// Token of the most recent email of `kind` sent to `to`.
    pub async fn last_token(&self, kind: EmailKind, to: &str) -> Option<String> {
        self.sent
            .lock()
            .await
            .iter()
            .rev()
            .find(|email| email.kind == kind && email.to == to)
            .map(|email| email.token.clone())
    }

    async fn record(&self, kind: EmailKind, to: &str, token: &str) -> Result<(), NotifierError> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(NotifierError::Transport("simulated delivery failure".to_string()));
        }
        self.sent.lock().await.push(SentEmail {
            kind,
            to: to.to_string(),
            token: token.to_string(),
        });
        Ok(())
    }
}

#[async_trait::async_trait]
impl Notifier for RecordingNotifier {
    async fn send_verify_account_email(&self, to: &str, token: &str) -> Result<(), NotifierError> {
        self.record(EmailKind::VerifyAccount, to, token).await
    }

    async fn send_reset_password_email(&self, to: &str, token: &str) -> Result<(), NotifierError> {
        self.record(EmailKind::ResetPassword, to, token).await
    }
}

/// A wired [`App`] over in-memory sqlite and an in-memory cache.
///
/// ```rust,ignore
/// #[tokio::test]
/// async fn test_sign_in() {
///     let h = TestHarness::new().await;
///     h.sign_up_verified("a@x.com", "Passw0rd!").await;
///     let signed_in = h.auth().sign_in(&h.ctx(), "a@x.com", "Passw0rd!").await.unwrap();
/// }
/// ```
pub struct TestHarness {
    pub app: App,
    pub notifier: Arc<RecordingNotifier>,
}

impl TestHarness {
    pub async fn new() -> Self {
        Self::with_config(Config::test()).await
    }

    pub async fn with_config(config: Config) -> Self {
        let notifier = Arc::new(RecordingNotifier::new());
        let app = App::with_notifier(config, notifier.clone())
            .await
            .expect("Failed to create test app");
        TestHarness { app, notifier }
    }

    pub fn auth(&self) -> &AuthService {
        self.app.auth()
    }

    pub fn ctx(&self) -> RequestContext {
        RequestContext::from_request_id("test")
    }

    pub fn sign_up_request(email: &str, password: &str) -> SignUpRequest {
        SignUpRequest {
            email: email.to_string(),
            password: password.to_string(),
            first_name: "Test".to_string(),
            last_name: "User".to_string(),
            role: Role::Freelancer,
        }
    }

    /// Sign up and return the user id and the emailed verification token.
    pub async fn sign_up(&self, email: &str, password: &str) -> (i32, String) {
        let user_id = self
            .auth()
            .sign_up(&self.ctx(), Self::sign_up_request(email, password))
            .await
            .expect("sign up should succeed");
        let token = self
            .notifier
            .last_token(EmailKind::VerifyAccount, email)
            .await
            .expect("verification email should be sent");
        (user_id, token)
    }

    /// Sign up and verify, returning the session issued by verification.
    pub async fn sign_up_verified(&self, email: &str, password: &str) -> SignedIn {
        let (_, token) = self.sign_up(email, password).await;
        self.auth()
            .verify_account(&self.ctx(), &token)
            .await
            .expect("verification should succeed")
    }

    pub async fn user_count(&self) -> u64 {
        user::Entity::find()
            .count(&self.app.db)
            .await
            .expect("count users")
    }

    pub async fn verification_token_count(&self) -> u64 {
        verification_token::Entity::find()
            .count(&self.app.db)
            .await
            .expect("count verification tokens")
    }

    pub async fn reset_token_count(&self) -> u64 {
        password_reset_token::Entity::find()
            .count(&self.app.db)
            .await
            .expect("count reset tokens")
    }

    pub async fn find_user(&self, email: &str) -> Option<user::Model> {
        user::Entity::find()
            .filter(user::Column::Email.eq(email))
            .one(&self.app.db)
            .await
            .expect("load user")
    }

    pub async fn set_verification_token_expiry(&self, token: &str, expires: DateTime<Utc>) {
        verification_token::Entity::update_many()
            .col_expr(verification_token::Column::Expires, Expr::value(expires))
            .filter(verification_token::Column::Token.eq(token))
            .exec(&self.app.db)
            .await
            .expect("update verification token");
    }

    pub async fn set_reset_token_expiry(&self, token: &str, expires: DateTime<Utc>) {
        password_reset_token::Entity::update_many()
            .col_expr(password_reset_token::Column::Expires, Expr::value(expires))
            .filter(password_reset_token::Column::Token.eq(token))
            .exec(&self.app.db)
            .await
            .expect("update reset token");
    }

    pub async fn set_user_created_at(&self, user_id: i32, created_at: DateTime<Utc>) {
        user::Entity::update_many()
            .col_expr(user::Column::CreatedAt, Expr::value(created_at))
            .filter(user::Column::Id.eq(user_id))
            .exec(&self.app.db)
            .await
            .expect("update user");
    }
}
