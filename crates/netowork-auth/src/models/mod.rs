pub mod password_reset_token;
pub mod user;
pub mod verification_token;

pub use user::{Role, UserResponse};
