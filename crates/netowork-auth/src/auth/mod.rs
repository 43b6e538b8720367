pub mod password;
pub mod service;
pub mod session;
pub mod token;

pub use password::CredentialHasher;
pub use service::{AuthService, Authenticated, SignUpRequest, SignedIn};
pub use session::{SessionRecord, SessionStore};
pub use token::generate_token;
