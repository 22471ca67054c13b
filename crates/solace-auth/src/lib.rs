//! User identity and session tokens.
//!
//! Defines the [`IdentityProvider`] port used by the chat layer plus a
//! local, in-process implementation with argon2 password hashing and
//! bearer-style session tokens. Auth state changes are broadcast so UI
//! layers can react to sign-in/sign-out from anywhere.

pub mod local;
pub mod provider;

pub use local::LocalIdentityProvider;
pub use provider::{AuthError, AuthEvent, AuthSession, Identity, IdentityProvider};
