use std::sync::Arc;

use sea_orm::DatabaseConnection;
use sea_orm_migration::MigratorTrait;

use crate::auth::{AuthService, CredentialHasher, SessionStore};
use crate::cache::CacheService;
use crate::config::Config;
use crate::cookie::SessionCookie;
use crate::error::BootstrapError;
use crate::maintenance::Maintenance;
use crate::migrations::Migrator;
use crate::notifier::{LogNotifier, Notifier};
use crate::store::Store;

/// Fully wired auth subsystem: pool, cache, store, service and sweep.
pub struct App {
    pub config: Config,
    pub db: DatabaseConnection,
    pub cache: CacheService,
    pub store: Store,
    auth: AuthService,
    maintenance: Maintenance,
    session_cookie: SessionCookie,
}

impl App {
    /// Build from environment variables.
    pub async fn new() -> Result<Self, BootstrapError> {
        Self::from_config(Config::from_env()?).await
    }

    /// Build from `config`, picking the notifier it describes.
    pub async fn from_config(config: Config) -> Result<Self, BootstrapError> {
        let notifier = Self::init_notifier(&config)?;
        Self::with_notifier(config, notifier).await
    }

    /// Build from `config` with a caller supplied notifier.
    pub async fn with_notifier(
        config: Config,
        notifier: Arc<dyn Notifier>,
    ) -> Result<Self, BootstrapError> {
        let hasher = CredentialHasher::new(config.auth.password_hash_cost)?;
        let db = crate::db::connect(&config).await?;

        // Run pending migrations automatically on startup
        tracing::info!("Running pending database migrations...");
        Migrator::up(&db, None).await?;
        tracing::info!("Migrations complete.");

        let cache = CacheService::from_url(config.redis_url.as_deref()).await?;
        let store = Store::new(db.clone());
        let sessions = SessionStore::new(cache.clone(), config.auth.user_session_ttl);
        let auth = AuthService::new(
            &store,
            sessions,
            notifier,
            hasher,
            Arc::new(config.auth.clone()),
        );

        Ok(App {
            maintenance: Maintenance::from_store(&store),
            session_cookie: SessionCookie::from_config(&config.auth),
            config,
            db,
            cache,
            store,
            auth,
        })
    }

    fn init_notifier(config: &Config) -> Result<Arc<dyn Notifier>, BootstrapError> {
        match &config.smtp {
            #[cfg(feature = "smtp")]
            Some(smtp) => {
                tracing::info!(host = %smtp.host, "Sending email over SMTP");
                Ok(Arc::new(crate::notifier::SmtpNotifier::new(smtp, &config.auth)?))
            }
            #[cfg(not(feature = "smtp"))]
            Some(_) => Err(crate::notifier::NotifierError::Transport(
                "SMTP_HOST is set but the smtp feature is disabled".to_string(),
            )
            .into()),
            None => {
                tracing::info!("No SMTP_HOST configured, emails are only logged");
                Ok(Arc::new(
                    LogNotifier::new(&config.auth).reveal_links(config.is_dev()),
                ))
            }
        }
    }

    pub fn auth(&self) -> &AuthService {
        &self.auth
    }

    pub fn maintenance(&self) -> &Maintenance {
        &self.maintenance
    }

    pub fn session_cookie(&self) -> &SessionCookie {
        &self.session_cookie
    }
}
