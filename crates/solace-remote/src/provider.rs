//! Remote provider ports and error taxonomy.

use async_trait::async_trait;
use thiserror::Error;

use solace_core::types::Exchange;

/// Failure modes of a remote provider.
///
/// Every variant is treated as recoverable by the chat layer, which
/// falls back to the local engine instead of surfacing these to users.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum RemoteError {
    #[error("no API key configured")]
    Unconfigured,

    #[error("authentication failed (invalid API key)")]
    Auth,

    #[error("payment required (out of credits)")]
    Payment,

    #[error("rate limited")]
    RateLimited,

    #[error("service unavailable")]
    Unavailable,

    #[error("provider returned an empty reply")]
    EmptyReply,

    #[error("unexpected status {0}")]
    Status(u16),

    #[error("http error: {0}")]
    Http(String),

    #[error("transcription not supported")]
    TranscriptionUnsupported,
}

impl From<RemoteError> for solace_core::SolaceError {
    fn from(err: RemoteError) -> Self {
        solace_core::SolaceError::Remote(err.to_string())
    }
}

impl From<reqwest::Error> for RemoteError {
    fn from(err: reqwest::Error) -> Self {
        RemoteError::Http(err.to_string())
    }
}

/// Port for remote chat completion.
#[async_trait]
pub trait ResponseProvider: Send + Sync {
    /// Produce an assistant reply to `message` given prior exchanges,
    /// oldest first.
    async fn respond(&self, message: &str, history: &[Exchange]) -> Result<String, RemoteError>;
}

/// Port for speech-to-text of recorded voice notes.
#[async_trait]
pub trait TranscriptionProvider: Send + Sync {
    async fn transcribe(&self, audio: &[u8], mime_type: &str) -> Result<String, RemoteError>;
}

/// Placeholder transcriber for builds without a speech backend.
///
/// Always fails with [`RemoteError::TranscriptionUnsupported`]; callers
/// surface that as a prompt to type the message instead.
#[derive(Debug, Default)]
pub struct UnavailableTranscriber;

#[async_trait]
impl TranscriptionProvider for UnavailableTranscriber {
    async fn transcribe(&self, _audio: &[u8], _mime_type: &str) -> Result<String, RemoteError> {
        Err(RemoteError::TranscriptionUnsupported)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_unavailable_transcriber_always_errors() {
        let transcriber = UnavailableTranscriber;
        let result = transcriber.transcribe(&[0u8; 4], "audio/webm").await;
        assert!(matches!(result, Err(RemoteError::TranscriptionUnsupported)));
    }

    #[test]
    fn test_remote_error_converts_to_solace_error() {
        let err: solace_core::SolaceError = RemoteError::RateLimited.into();
        assert!(err.to_string().contains("rate limited"));
    }
}
