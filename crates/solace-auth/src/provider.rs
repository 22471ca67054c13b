//! The identity provider port.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::sync::broadcast;
use uuid::Uuid;

/// A registered user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Identity {
    pub id: Uuid,
    pub email: String,
    pub created_at: DateTime<Utc>,
}

/// An authenticated session: a bearer token plus the user it belongs to.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuthSession {
    pub token: String,
    pub user: Identity,
}

/// Auth state change, broadcast to subscribers.
#[derive(Debug, Clone, PartialEq)]
pub enum AuthEvent {
    SignedIn(Identity),
    SignedOut(Identity),
}

#[derive(Debug, Error)]
#[non_exhaustive]
pub enum AuthError {
    #[error("email already registered")]
    EmailTaken,

    #[error("invalid email or password")]
    InvalidCredentials,

    #[error("password must be at least {0} characters")]
    WeakPassword(usize),

    #[error("not authenticated")]
    NotAuthenticated,

    #[error("auth internal error: {0}")]
    Internal(String),
}

impl From<AuthError> for solace_core::SolaceError {
    fn from(err: AuthError) -> Self {
        solace_core::SolaceError::Auth(err.to_string())
    }
}

/// Port for user registration and session management.
///
/// The chat layer only depends on this trait; swapping a hosted identity
/// service for the local provider is a wiring change.
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Register a new user and open a session for them.
    async fn sign_up(&self, email: &str, password: &str) -> Result<AuthSession, AuthError>;

    /// Authenticate an existing user and open a session.
    async fn sign_in(&self, email: &str, password: &str) -> Result<AuthSession, AuthError>;

    /// Invalidate a session token.
    async fn sign_out(&self, token: &str) -> Result<(), AuthError>;

    /// Resolve a session token to its user, if the session is live.
    async fn current_user(&self, token: &str) -> Result<Option<Identity>, AuthError>;

    /// Subscribe to auth state changes.
    fn subscribe(&self) -> broadcast::Receiver<AuthEvent>;
}
