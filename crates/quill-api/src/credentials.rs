use std::sync::Arc;

use anyhow::anyhow;
use argon2::{
    Algorithm, Argon2, Params, PasswordHash, PasswordHasher, PasswordVerifier, Version,
    password_hash::SaltString,
};
use rand_core::OsRng;
use thiserror::Error;
use tracing::{debug, info};

use quill_db::Database;
use quill_db::models::NewUserRow;
use quill_types::forms::RegisterForm;
use quill_types::models::User;

/// One-way password hashing capability.
pub trait CredentialHasher: Send + Sync {
    fn hash(&self, plaintext: &str) -> anyhow::Result<String>;

    /// `false` for a mismatch and for a digest that cannot be parsed.
    fn verify(&self, plaintext: &str, digest: &str) -> bool;
}

/// Argon2id with a random salt per password, stored as a PHC string.
pub struct Argon2Hasher {
    params: Params,
}

impl Argon2Hasher {
    pub fn new() -> Self {
        Self {
            params: Params::default(),
        }
    }

    /// Custom cost parameters (memory in KiB, iterations, lanes).
    pub fn with_params(m_cost: u32, t_cost: u32, p_cost: u32) -> anyhow::Result<Self> {
        let params = Params::new(m_cost, t_cost, p_cost, None)
            .map_err(|e| anyhow!("Invalid Argon2 parameters: {}", e))?;
        Ok(Self { params })
    }

    fn argon2(&self) -> Argon2<'static> {
        Argon2::new(Algorithm::Argon2id, Version::V0x13, self.params.clone())
    }
}

impl Default for Argon2Hasher {
    fn default() -> Self {
        Self::new()
    }
}

impl CredentialHasher for Argon2Hasher {
    fn hash(&self, plaintext: &str) -> anyhow::Result<String> {
        let salt = SaltString::generate(&mut OsRng);
        let hash = self
            .argon2()
            .hash_password(plaintext.as_bytes(), &salt)
            .map_err(|e| anyhow!("Password hashing failed: {}", e))?;
        Ok(hash.to_string())
    }

    fn verify(&self, plaintext: &str, digest: &str) -> bool {
        // Cost parameters come from the PHC string, not from `self.params`.
        match PasswordHash::new(digest) {
            Ok(parsed) => self.argon2().verify_password(plaintext.as_bytes(), &parsed).is_ok(),
            Err(_) => false,
        }
    }
}

#[derive(Debug, Error)]
pub enum RegisterError {
    #[error("username {0} is already taken")]
    UsernameTaken(String),
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

/// User accounts and password checks. Blocking: hashing is CPU bound, so
/// async callers should run these on the blocking pool.
#[derive(Clone)]
pub struct CredentialStore {
    db: Arc<Database>,
    hasher: Arc<dyn CredentialHasher>,
}

impl CredentialStore {
    pub fn new(db: Arc<Database>, hasher: Arc<dyn CredentialHasher>) -> Self {
        Self { db, hasher }
    }

    pub fn register(&self, form: &RegisterForm) -> Result<User, RegisterError> {
        let password_hash = self.hasher.hash(&form.password)?;

        let inserted = self.db.insert_user(&NewUserRow {
            username: &form.username,
            password: &password_hash,
            email: &form.email,
            first_name: &form.first_name,
            last_name: &form.last_name,
        })?;
        if !inserted {
            return Err(RegisterError::UsernameTaken(form.username.clone()));
        }

        info!("Registered user {}", form.username);
        Ok(User {
            username: form.username.clone(),
            email: form.email.clone(),
            first_name: form.first_name.clone(),
            last_name: form.last_name.clone(),
        })
    }

    /// `Ok(None)` for both an unknown username and a wrong password.
    pub fn authenticate(&self, username: &str, password: &str) -> anyhow::Result<Option<User>> {
        let Some(row) = self.db.get_user(username)? else {
            debug!("Login attempt for unknown user {}", username);
            return Ok(None);
        };

        if !self.hasher.verify(password, &row.password) {
            debug!("Wrong password for user {}", username);
            return Ok(None);
        }

        Ok(Some(row.into()))
    }

    pub fn get(&self, username: &str) -> anyhow::Result<Option<User>> {
        Ok(self.db.get_user(username)?.map(User::from))
    }

    /// Removes the account and, through the schema, all of its feedback.
    pub fn delete(&self, username: &str) -> anyhow::Result<bool> {
        let deleted = self.db.delete_user(username)?;
        if deleted {
            info!("Deleted user {}", username);
        }
        Ok(deleted)
    }
}
