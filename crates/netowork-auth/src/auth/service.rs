use std::sync::Arc;

use serde::Deserialize;

use crate::auth::password::CredentialHasher;
use crate::auth::session::SessionStore;
use crate::auth::token::{RESET_TOKEN_BYTES, VERIFICATION_TOKEN_BYTES, expiry_from_now, generate_token};
use crate::config::AuthConfig;
use crate::context::RequestContext;
use crate::error::{AuthError, StoreError};
use crate::models::{Role, user};
use crate::notifier::Notifier;
use crate::store::{
    NewToken, NewUser, PasswordResetTokenRepository, Store, TransactionRepository,
    UserRepository, VerificationTokenRepository,
};

/// Registration data for [`AuthService::sign_up`].
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignUpRequest {
    pub email: String,
    pub password: String,
    pub first_name: String,
    pub last_name: String,
    pub role: Role,
}

/// A user together with the session key just issued for them.
#[derive(Debug, Clone)]
pub struct SignedIn {
    pub user: user::Model,
    pub session_key: String,
}

/// Outcome of validating a session key.
#[derive(Debug, Clone)]
pub struct Authenticated {
    pub user: user::Model,
    /// Key the caller should use from now on. Differs from the presented key
    /// when `refreshed` is set.
    pub session_key: String,
    pub refreshed: bool,
}

/// Sign-up, verification, sign-in, session and password reset flows.
#[derive(Clone)]
pub struct AuthService {
    users: Arc<dyn UserRepository>,
    verification_tokens: Arc<dyn VerificationTokenRepository>,
    reset_tokens: Arc<dyn PasswordResetTokenRepository>,
    transactions: Arc<dyn TransactionRepository>,
    sessions: SessionStore,
    notifier: Arc<dyn Notifier>,
    hasher: CredentialHasher,
    config: Arc<AuthConfig>,
}

/// Log an infrastructure failure before it is handed back to the caller.
fn logged<E: Into<AuthError>>(err: E) -> AuthError {
    let err = err.into();
    tracing::error!(error = %err, code = err.error_code(), "Auth operation failed");
    err
}

impl AuthService {
    pub fn new(
        store: &Store,
        sessions: SessionStore,
        notifier: Arc<dyn Notifier>,
        hasher: CredentialHasher,
        config: Arc<AuthConfig>,
    ) -> Self {
        AuthService {
            users: store.users.clone(),
            verification_tokens: store.verification_tokens.clone(),
            reset_tokens: store.reset_tokens.clone(),
            transactions: store.transactions.clone(),
            sessions,
            notifier,
            hasher,
            config,
        }
    }

    pub fn sessions(&self) -> &SessionStore {
        &self.sessions
    }

    /// Register a new, unverified user and email them a verification link.
    /// Returns the new user id.
    ///
    /// If the email cannot be sent the user and token rows are kept and the
    /// notifier error is returned.
    #[tracing::instrument(name = "sign_up", skip_all, fields(request_id = %ctx.request_id()))]
    pub async fn sign_up(
        &self,
        ctx: &RequestContext,
        request: SignUpRequest,
    ) -> Result<i32, AuthError> {
        if self
            .users
            .get_by_email(&request.email)
            .await
            .map_err(logged)?
            .is_some()
        {
            tracing::info!("User already exists");
            return Err(AuthError::UserExists);
        }

        let hashed_password = self.hasher.hash(&request.password).await.map_err(logged)?;
        let token = NewToken {
            token: generate_token(VERIFICATION_TOKEN_BYTES).map_err(logged)?,
            expires: expiry_from_now(self.config.verification_token_ttl),
        };
        let new_user = NewUser {
            email: request.email,
            hashed_password,
            first_name: request.first_name,
            last_name: request.last_name,
            role: request.role,
        };

        let user_id = match self
            .transactions
            .create_user_and_verification_token(&new_user, &token)
            .await
        {
            Ok(id) => id,
            Err(StoreError::Conflict(_)) => {
                tracing::info!("User already exists (concurrent sign-up)");
                return Err(AuthError::UserExists);
            }
            Err(e) => return Err(logged(e)),
        };

        self.notifier
            .send_verify_account_email(&new_user.email, &token.token)
            .await
            .map_err(logged)?;

        tracing::info!(user_id, "User signed up");
        Ok(user_id)
    }

    /// Consume a verification token, mark its user verified and sign them in.
    #[tracing::instrument(name = "verify_account", skip_all, fields(request_id = %ctx.request_id()))]
    pub async fn verify_account(
        &self,
        ctx: &RequestContext,
        token: &str,
    ) -> Result<SignedIn, AuthError> {
        let Some(record) = self
            .verification_tokens
            .get_by_token(token)
            .await
            .map_err(logged)?
        else {
            tracing::info!("Verification token not found");
            return Err(AuthError::TokenDoesNotExist);
        };

        if record.is_expired() {
            tracing::info!(user_id = record.user_id, "Verification token expired");
            self.verification_tokens
                .delete_by_token(token)
                .await
                .map_err(logged)?;
            return Err(AuthError::TokenExpired);
        }

        let Some(mut user) = self.users.get_by_id(record.user_id).await.map_err(logged)? else {
            tracing::warn!(user_id = record.user_id, "Verification token owner is missing");
            return Err(AuthError::UserDoesNotExist);
        };

        match self
            .transactions
            .set_verified_and_consume_token(user.id, token)
            .await
        {
            Ok(()) => {}
            Err(StoreError::Conflict(_)) => {
                tracing::info!(user_id = user.id, "Verification token consumed concurrently");
                return Err(AuthError::TokenDoesNotExist);
            }
            Err(e) => return Err(logged(e)),
        }
        user.is_verified = true;

        let session_key = self.store_session(&user).await?;
        tracing::info!(user_id = user.id, "Account verified");
        Ok(SignedIn { user, session_key })
    }

    /// Check credentials and open a session.
    ///
    /// An unknown email and a wrong password yield the same error. The
    /// verification check only runs once the password matched.
    #[tracing::instrument(name = "sign_in", skip_all, fields(request_id = %ctx.request_id()))]
    pub async fn sign_in(
        &self,
        ctx: &RequestContext,
        email: &str,
        password: &str,
    ) -> Result<SignedIn, AuthError> {
        let Some(user) = self.users.get_by_email(email).await.map_err(logged)? else {
            tracing::info!("Sign-in for unknown email");
            return Err(AuthError::InvalidCredentials);
        };

        if !self
            .hasher
            .verify(&user.hashed_password, password)
            .await
            .map_err(logged)?
        {
            tracing::info!(user_id = user.id, "Sign-in with wrong password");
            return Err(AuthError::InvalidCredentials);
        }

        if !user.is_verified {
            tracing::info!(user_id = user.id, "Sign-in to unverified account");
            return Err(AuthError::AccountNotVerified);
        }

        let session_key = self.store_session(&user).await?;
        tracing::info!(user_id = user.id, "User signed in");
        Ok(SignedIn { user, session_key })
    }

    /// Issue a new session for `user` and return its key.
    pub async fn store_session(&self, user: &user::Model) -> Result<String, AuthError> {
        self.sessions.create(user.id).await.map_err(logged)
    }

    /// Resolve a session key to its user, refreshing the session once its
    /// logical expiry has passed.
    #[tracing::instrument(name = "authenticate", skip_all, fields(request_id = %ctx.request_id()))]
    pub async fn authenticate(
        &self,
        ctx: &RequestContext,
        session_key: &str,
    ) -> Result<Authenticated, AuthError> {
        let Some(record) = self.sessions.load(session_key).await.map_err(logged)? else {
            return Err(AuthError::Unauthenticated);
        };

        let Some(user) = self.users.get_by_id(record.id).await.map_err(logged)? else {
            tracing::info!(user_id = record.id, "Session owner no longer exists");
            self.sessions.remove(session_key).await.map_err(logged)?;
            return Err(AuthError::Unauthenticated);
        };

        if !record.is_expired() {
            return Ok(Authenticated {
                user,
                session_key: session_key.to_string(),
                refreshed: false,
            });
        }

        self.sessions.remove(session_key).await.map_err(logged)?;
        let session_key = self.store_session(&user).await?;
        tracing::info!(user_id = user.id, "Session refreshed");

        Ok(Authenticated {
            user,
            session_key,
            refreshed: true,
        })
    }

    /// End a session. An unknown or already removed key is an error.
    #[tracing::instrument(name = "logout", skip_all, fields(request_id = %ctx.request_id()))]
    pub async fn logout(&self, ctx: &RequestContext, session_key: &str) -> Result<(), AuthError> {
        if self.sessions.load(session_key).await.map_err(logged)?.is_none() {
            return Err(AuthError::SessionDoesNotExist);
        }

        self.sessions.remove(session_key).await.map_err(logged)?;
        Ok(())
    }

    /// Create a password reset token and email it to the user.
    #[tracing::instrument(name = "forgot_password", skip_all, fields(request_id = %ctx.request_id()))]
    pub async fn forgot_password(&self, ctx: &RequestContext, email: &str) -> Result<(), AuthError> {
        let Some(user) = self.users.get_by_email(email).await.map_err(logged)? else {
            tracing::info!("Password reset for unknown email");
            return Err(AuthError::UserDoesNotExist);
        };

        let token = NewToken {
            token: generate_token(RESET_TOKEN_BYTES).map_err(logged)?,
            expires: expiry_from_now(self.config.password_reset_token_ttl),
        };
        self.reset_tokens
            .create(user.id, &token)
            .await
            .map_err(logged)?;

        self.notifier
            .send_reset_password_email(&user.email, &token.token)
            .await
            .map_err(logged)?;

        tracing::info!(user_id = user.id, "Password reset requested");
        Ok(())
    }

    /// Set a new password using a reset token. The token is consumed in the
    /// same transaction as the password update.
    ///
    /// Expired tokens are left in place for the maintenance sweep.
    #[tracing::instrument(name = "reset_password", skip_all, fields(request_id = %ctx.request_id()))]
    pub async fn reset_password(
        &self,
        ctx: &RequestContext,
        token: &str,
        new_password: &str,
    ) -> Result<(), AuthError> {
        let Some(record) = self.reset_tokens.get_by_token(token).await.map_err(logged)? else {
            tracing::info!("Password reset token not found");
            return Err(AuthError::ResetTokenDoesNotExist);
        };

        if record.is_expired() {
            tracing::info!(user_id = record.user_id, "Password reset token expired");
            return Err(AuthError::ResetTokenExpired);
        }

        let Some(user) = self.users.get_by_id(record.user_id).await.map_err(logged)? else {
            tracing::warn!(user_id = record.user_id, "Password reset token owner is missing");
            return Err(AuthError::UserDoesNotExist);
        };

        let hashed_password = self.hasher.hash(new_password).await.map_err(logged)?;
        match self
            .transactions
            .set_password_and_consume_reset_token(user.id, &hashed_password, token)
            .await
        {
            Ok(()) => {}
            Err(StoreError::Conflict(_)) => {
                tracing::info!(user_id = user.id, "Password reset token consumed concurrently");
                return Err(AuthError::ResetTokenDoesNotExist);
            }
            Err(e) => return Err(logged(e)),
        }

        tracing::info!(user_id = user.id, "Password reset");
        Ok(())
    }
}
