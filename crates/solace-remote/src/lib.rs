//! Remote response providers.
//!
//! Defines the [`ResponseProvider`] and [`TranscriptionProvider`] ports
//! plus the OpenRouter-backed implementation. Any error from a remote
//! provider is recoverable: the chat layer falls back to the local
//! template engine.

pub mod crisis;
pub mod openrouter;
pub mod provider;

pub use openrouter::OpenRouterProvider;
pub use provider::{
    RemoteError, ResponseProvider, TranscriptionProvider, UnavailableTranscriber,
};
