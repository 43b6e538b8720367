//! Account lifecycle and session management for the Netowork marketplace:
//! sign-up with email verification, sign-in, cache-backed sessions with
//! sliding refresh, password reset and a periodic cleanup sweep.

pub mod app;
pub mod auth;
pub mod cache;
pub mod config;
pub mod context;
pub mod cookie;
pub mod db;
pub mod error;
pub mod logging;
pub mod maintenance;
pub mod migrations;
pub mod models;
pub mod notifier;
pub mod store;
pub mod testing;

pub use app::App;
pub use auth::{AuthService, Authenticated, SignUpRequest, SignedIn};
pub use cache::CacheService;
pub use config::Config;
pub use context::RequestContext;
pub use cookie::SessionCookie;
pub use error::{AuthError, BootstrapError, ErrorKind, StoreError};
pub use maintenance::{Maintenance, SweepReport};
pub use migrations::Migrator;
pub use notifier::Notifier;
