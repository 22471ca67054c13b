//! Relevance scoring and template selection.
//!
//! Scores every template in the bank against the user message and recent
//! AI replies, then returns the best candidate or a random fallback from
//! the general/emotional-support pool when nothing scores above zero.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::bank::{TemplateBank, TemplateResponse};
use crate::context::detect_contexts;
use crate::rng::RandomSource;

/// Points per matching trigger keyword.
const TRIGGER_WEIGHT: i32 = 10;
/// Points per overlapping context tag.
const CONTEXT_WEIGHT: i32 = 5;
/// Deduction when the template body was emitted recently.
const REPEAT_PENALTY: i32 = 15;
/// How many trailing AI replies the anti-repetition check inspects.
const RECENT_WINDOW: usize = 3;
/// Length of the body prefix compared against recent replies.
const BODY_PREFIX_CHARS: usize = 20;

/// How trigger keywords are matched against user text.
///
/// `Substring` is the historical behavior and the default; it will match
/// "cat" inside "catastrophe". `WholeWord` requires non-alphanumeric
/// boundaries around the occurrence.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum MatchMode {
    #[default]
    Substring,
    WholeWord,
}

/// Scores templates and picks the most relevant one.
#[derive(Debug, Clone, Copy, Default)]
pub struct TemplateSelector {
    pub match_mode: MatchMode,
}

impl TemplateSelector {
    pub fn new(match_mode: MatchMode) -> Self {
        Self { match_mode }
    }

    /// Select the most relevant template for a user message.
    ///
    /// Ties break toward bank order. When the top score is zero or
    /// negative the ranking is discarded and a uniform random pick is
    /// made from the general/emotional-support pool, which the bank
    /// guarantees to be non-empty.
    pub fn select<'a>(
        &self,
        bank: &'a TemplateBank,
        message: &str,
        recent_ai_replies: &[String],
        rng: &mut dyn RandomSource,
    ) -> &'a TemplateResponse {
        let lower = message.to_lowercase();
        let detected = detect_contexts(message);

        let mut best: Option<(&TemplateResponse, i32)> = None;
        for template in bank.templates() {
            let score = self.score(template, &lower, &detected, recent_ai_replies);
            match best {
                // Strict comparison keeps the first-defined template on ties.
                Some((_, best_score)) if score <= best_score => {}
                _ => best = Some((template, score)),
            }
        }

        match best {
            Some((template, score)) if score > 0 => {
                debug!(template = %template.id, score, "selected template");
                template
            }
            _ => {
                let pool = bank.fallback_pool();
                let pick = pool[rng.pick_index(pool.len())];
                debug!(template = %pick.id, "fell back to general pool");
                pick
            }
        }
    }

    fn score(
        &self,
        template: &TemplateResponse,
        lower_message: &str,
        detected: &[crate::context::ContextTag],
        recent_ai_replies: &[String],
    ) -> i32 {
        let mut score = 0;

        for trigger in &template.triggers {
            if self.matches(lower_message, trigger) {
                score += TRIGGER_WEIGHT;
            }
        }

        for context in &template.contexts {
            if detected.contains(context) {
                score += CONTEXT_WEIGHT;
            }
        }

        let prefix: String = template.body.chars().take(BODY_PREFIX_CHARS).collect();
        let recently_used = recent_ai_replies
            .iter()
            .rev()
            .take(RECENT_WINDOW)
            .any(|reply| reply.contains(&prefix));
        if recently_used {
            score -= REPEAT_PENALTY;
        }

        score
    }

    fn matches(&self, haystack: &str, needle: &str) -> bool {
        match self.match_mode {
            MatchMode::Substring => haystack.contains(needle),
            MatchMode::WholeWord => contains_bounded(haystack, needle),
        }
    }
}

/// True when `needle` occurs in `haystack` with non-alphanumeric characters
/// (or string edges) on both sides.
fn contains_bounded(haystack: &str, needle: &str) -> bool {
    if needle.is_empty() {
        return false;
    }
    let mut search_from = 0;
    while let Some(offset) = haystack[search_from..].find(needle) {
        let start = search_from + offset;
        let end = start + needle.len();
        let before_ok = haystack[..start]
            .chars()
            .next_back()
            .map_or(true, |c| !c.is_alphanumeric());
        let after_ok = haystack[end..]
            .chars()
            .next()
            .map_or(true, |c| !c.is_alphanumeric());
        if before_ok && after_ok {
            return true;
        }
        search_from = start + needle.len();
    }
    false
}
