//! Local therapeutic-response engine.
//!
//! Produces a complete therapeutic-sounding reply from a fixed template
//! bank without any network call. Used as the fallback when the remote
//! LLM provider fails or is unconfigured: it classifies the user message
//! into conversational contexts, scores templates by trigger keywords and
//! context overlap with an anti-repetition penalty, and assembles a
//! multi-part reply (validation + body + follow-up + closing) with
//! randomized connectors.

pub mod bank;
pub mod composer;
pub mod context;
pub mod engine;
pub mod rng;
pub mod selector;

pub use bank::{BankError, TemplateBank, TemplateResponse};
pub use composer::ResponseComposer;
pub use context::{detect_contexts, ContextTag};
pub use engine::LocalResponseEngine;
pub use rng::{RandomSource, SequenceSource, ThreadRngSource};
pub use selector::{MatchMode, TemplateSelector};
