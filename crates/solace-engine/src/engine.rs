//! Top-level local response engine.
//!
//! Ties the template bank, selector, and composer together behind a
//! single total API. Callers that do not care about determinism use
//! [`LocalResponseEngine::generate`]; tests inject a scripted
//! [`RandomSource`] through [`LocalResponseEngine::generate_with`].

use tracing::debug;

use crate::bank::TemplateBank;
use crate::composer::ResponseComposer;
use crate::rng::{RandomSource, ThreadRngSource};
use crate::selector::{MatchMode, TemplateSelector};

/// Offline rule-based response engine.
///
/// Total over all inputs: any user message produces a non-empty reply,
/// with no I/O and no failure path.
#[derive(Debug)]
pub struct LocalResponseEngine {
    bank: TemplateBank,
    composer: ResponseComposer,
}

impl LocalResponseEngine {
    /// Engine over the built-in therapeutic template bank.
    pub fn builtin() -> Self {
        Self::new(TemplateBank::builtin())
    }

    pub fn new(bank: TemplateBank) -> Self {
        Self {
            bank,
            composer: ResponseComposer::default(),
        }
    }

    /// Engine with an explicit trigger match mode.
    pub fn with_match_mode(bank: TemplateBank, match_mode: MatchMode) -> Self {
        Self {
            bank,
            composer: ResponseComposer::new(TemplateSelector { match_mode }),
        }
    }

    pub fn bank(&self) -> &TemplateBank {
        &self.bank
    }

    /// Generate a reply to a user message.
    ///
    /// `recent_ai_replies` are the assistant's latest replies in the
    /// session, most recent last; they feed the anti-repetition penalty.
    pub fn generate(&self, user_message: &str, recent_ai_replies: &[String]) -> String {
        self.generate_with(user_message, recent_ai_replies, &mut ThreadRngSource)
    }

    /// Like [`generate`](Self::generate) with an injected randomness source.
    pub fn generate_with(
        &self,
        user_message: &str,
        recent_ai_replies: &[String],
        rng: &mut dyn RandomSource,
    ) -> String {
        let reply = self
            .composer
            .compose(&self.bank, user_message, recent_ai_replies, rng);
        debug!(reply_chars = reply.len(), "composed local reply");
        reply
    }

    /// A session-opening greeting.
    pub fn greeting(&self) -> String {
        self.greeting_with(&mut ThreadRngSource)
    }

    pub fn greeting_with(&self, rng: &mut dyn RandomSource) -> String {
        let greetings = self.bank.greetings();
        greetings[rng.pick_index(greetings.len())].clone()
    }
}

impl Default for LocalResponseEngine {
    fn default() -> Self {
        Self::builtin()
    }
}
