//! Local in-process identity provider.
//!
//! Stores users and live sessions in memory, hashes passwords with
//! argon2, and issues random 32-character hex session tokens.

use std::collections::HashMap;
use std::sync::Mutex;

use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::Argon2;
use async_trait::async_trait;
use chrono::Utc;
use rand::Rng;
use tokio::sync::broadcast;
use tracing::info;
use uuid::Uuid;

use crate::provider::{AuthError, AuthEvent, AuthSession, Identity, IdentityProvider};

const MIN_PASSWORD_CHARS: usize = 6;
const EVENT_CHANNEL_CAPACITY: usize = 16;

/// Generate a random 32-character hex token.
fn generate_token() -> String {
    let mut rng = rand::rng();
    let bytes: [u8; 16] = rng.random();
    hex::encode(bytes)
}

struct StoredUser {
    identity: Identity,
    password_hash: String,
}

/// In-memory identity provider.
///
/// Accounts do not survive a restart. Suitable for single-machine use
/// and for tests of anything that talks to the [`IdentityProvider`] port.
pub struct LocalIdentityProvider {
    users: Mutex<HashMap<String, StoredUser>>,
    sessions: Mutex<HashMap<String, Uuid>>,
    events: broadcast::Sender<AuthEvent>,
}

impl LocalIdentityProvider {
    pub fn new() -> Self {
        let (events, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        Self {
            users: Mutex::new(HashMap::new()),
            sessions: Mutex::new(HashMap::new()),
            events,
        }
    }

    fn normalize_email(email: &str) -> String {
        email.trim().to_lowercase()
    }

    fn hash_password(password: &str) -> Result<String, AuthError> {
        let salt = SaltString::generate(&mut OsRng);
        Argon2::default()
            .hash_password(password.as_bytes(), &salt)
            .map(|hash| hash.to_string())
            .map_err(|e| AuthError::Internal(e.to_string()))
    }

    fn verify_password(password: &str, stored_hash: &str) -> Result<bool, AuthError> {
        let parsed =
            PasswordHash::new(stored_hash).map_err(|e| AuthError::Internal(e.to_string()))?;
        Ok(Argon2::default()
            .verify_password(password.as_bytes(), &parsed)
            .is_ok())
    }

    fn open_session(&self, identity: Identity) -> Result<AuthSession, AuthError> {
        let token = generate_token();
        self.sessions
            .lock()
            .map_err(|e| AuthError::Internal(format!("session lock poisoned: {}", e)))?
            .insert(token.clone(), identity.id);
        let _ = self.events.send(AuthEvent::SignedIn(identity.clone()));
        Ok(AuthSession {
            token,
            user: identity,
        })
    }

    fn identity_by_id(&self, id: Uuid) -> Result<Option<Identity>, AuthError> {
        let users = self
            .users
            .lock()
            .map_err(|e| AuthError::Internal(format!("user lock poisoned: {}", e)))?;
        Ok(users
            .values()
            .find(|u| u.identity.id == id)
            .map(|u| u.identity.clone()))
    }
}

impl Default for LocalIdentityProvider {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl IdentityProvider for LocalIdentityProvider {
    async fn sign_up(&self, email: &str, password: &str) -> Result<AuthSession, AuthError> {
        if password.chars().count() < MIN_PASSWORD_CHARS {
            return Err(AuthError::WeakPassword(MIN_PASSWORD_CHARS));
        }
        let email = Self::normalize_email(email);
        if email.is_empty() || !email.contains('@') {
            return Err(AuthError::InvalidCredentials);
        }

        let password_hash = Self::hash_password(password)?;
        let identity = Identity {
            id: Uuid::new_v4(),
            email: email.clone(),
            created_at: Utc::now(),
        };

        {
            let mut users = self
                .users
                .lock()
                .map_err(|e| AuthError::Internal(format!("user lock poisoned: {}", e)))?;
            if users.contains_key(&email) {
                return Err(AuthError::EmailTaken);
            }
            users.insert(
                email.clone(),
                StoredUser {
                    identity: identity.clone(),
                    password_hash,
                },
            );
        }

        info!(user_id = %identity.id, "registered new user");
        self.open_session(identity)
    }

    async fn sign_in(&self, email: &str, password: &str) -> Result<AuthSession, AuthError> {
        let email = Self::normalize_email(email);

        let (identity, password_hash) = {
            let users = self
                .users
                .lock()
                .map_err(|e| AuthError::Internal(format!("user lock poisoned: {}", e)))?;
            match users.get(&email) {
                Some(user) => (user.identity.clone(), user.password_hash.clone()),
                None => return Err(AuthError::InvalidCredentials),
            }
        };

        if !Self::verify_password(password, &password_hash)? {
            return Err(AuthError::InvalidCredentials);
        }

        self.open_session(identity)
    }

    async fn sign_out(&self, token: &str) -> Result<(), AuthError> {
        let user_id = self
            .sessions
            .lock()
            .map_err(|e| AuthError::Internal(format!("session lock poisoned: {}", e)))?
            .remove(token)
            .ok_or(AuthError::NotAuthenticated)?;

        if let Some(identity) = self.identity_by_id(user_id)? {
            let _ = self.events.send(AuthEvent::SignedOut(identity));
        }
        Ok(())
    }

    async fn current_user(&self, token: &str) -> Result<Option<Identity>, AuthError> {
        let user_id = {
            let sessions = self
                .sessions
                .lock()
                .map_err(|e| AuthError::Internal(format!("session lock poisoned: {}", e)))?;
            sessions.get(token).copied()
        };
        match user_id {
            Some(id) => self.identity_by_id(id),
            None => Ok(None),
        }
    }

    fn subscribe(&self) -> broadcast::Receiver<AuthEvent> {
        self.events.subscribe()
    }
}
