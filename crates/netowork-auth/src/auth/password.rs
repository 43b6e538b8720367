use argon2::{
    Algorithm, Argon2, Params, Version,
    password_hash::{
        self, PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng,
    },
};
use thiserror::Error;

/// Lowest accepted work factor. Below this argon2 refuses the memory size.
pub const MIN_COST: u32 = 3;

/// Highest accepted work factor (4 GiB of memory per hash).
pub const MAX_COST: u32 = 22;

/// Argon2 iterations over memory. At the default cost of 14 this puts a
/// single hash in the low hundreds of milliseconds.
pub const PASSES: u32 = 8;

#[derive(Debug, Error)]
pub enum HashError {
    #[error("Stored password hash is malformed: {0}")]
    Malformed(password_hash::Error),

    #[error("Failed to hash password: {0}")]
    Hash(password_hash::Error),

    #[error("Hashing task failed: {0}")]
    Task(#[from] tokio::task::JoinError),

    #[error("Invalid hash cost {0} (expected {MIN_COST}..={MAX_COST})")]
    InvalidCost(u32),
}

/// Salted, adaptive password hashing with a configurable work factor.
///
/// The cost is the base-2 logarithm of the argon2 memory size in KiB, so
/// every step doubles the work. The pass count is fixed at [`PASSES`].
/// Hashing runs on the blocking thread pool.
#[derive(Clone)]
pub struct CredentialHasher {
    params: Params,
}

impl CredentialHasher {
    pub fn new(cost: u32) -> Result<Self, HashError> {
        if !(MIN_COST..=MAX_COST).contains(&cost) {
            return Err(HashError::InvalidCost(cost));
        }
        let params = Params::new(1 << cost, PASSES, 1, None)
            .map_err(|_| HashError::InvalidCost(cost))?;
        Ok(CredentialHasher { params })
    }

    fn argon2(&self) -> Argon2<'static> {
        Argon2::new(Algorithm::Argon2id, Version::V0x13, self.params.clone())
    }

    /// Hash a plaintext password. Two calls with the same input differ.
    pub async fn hash(&self, password: &str) -> Result<String, HashError> {
        let argon2 = self.argon2();
        let password = password.to_owned();

        tokio::task::spawn_blocking(move || {
            let salt = SaltString::generate(&mut OsRng);
            argon2
                .hash_password(password.as_bytes(), &salt)
                .map(|hash| hash.to_string())
                .map_err(HashError::Hash)
        })
        .await?
    }

    /// Check a plaintext password against a stored hash.
    ///
    /// A mismatch is `Ok(false)`; only a hash that cannot be parsed is an error.
    /// The parameters embedded in the stored hash win over this hasher's cost.
    pub async fn verify(&self, hash: &str, password: &str) -> Result<bool, HashError> {
        let hash = hash.to_owned();
        let password = password.to_owned();

        tokio::task::spawn_blocking(move || {
            let parsed = PasswordHash::new(&hash).map_err(HashError::Malformed)?;
            match Argon2::default().verify_password(password.as_bytes(), &parsed) {
                Ok(()) => Ok(true),
                Err(password_hash::Error::Password) => Ok(false),
                Err(e) => Err(HashError::Malformed(e)),
            }
        })
        .await?
    }
}

impl std::fmt::Debug for CredentialHasher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CredentialHasher")
            .field("m_cost", &self.params.m_cost())
            .field("t_cost", &self.params.t_cost())
            .finish()
    }
}
