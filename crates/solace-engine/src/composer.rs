//! Multi-part reply composition.
//!
//! Assembles validation + core body + follow-up + closing fragments into
//! one natural-sounding reply, with fixed probability knobs deciding
//! which optional fragments appear.
//!
//! Random draws happen in a fixed order so tests can script them with
//! [`SequenceSource`](crate::rng::SequenceSource):
//! 1. fallback template pick (only when selection scored <= 0)
//! 2. validation-sentence pick (only for emotional messages)
//! 3. follow-up coin, then follow-up pick (only when the template has no
//!    follow-up of its own)
//! 4. closing coin, then closing pick (only when parts 1-3 exceed the
//!    length threshold)
//! 5. transition coin, then transition pick (only when there are at
//!    least two parts)

use crate::bank::TemplateBank;
use crate::rng::RandomSource;
use crate::selector::TemplateSelector;

/// Emotional keywords that earn a leading validation sentence.
const EMOTIONAL_KEYWORDS: &[&str] = &[
    "sad",
    "hurt",
    "angry",
    "depress",
    "anxious",
    "worry",
    "stress",
    "overwhelm",
    "lonely",
    "afraid",
    "scared",
    "upset",
];

/// Chance of appending a pooled follow-up question when the template has
/// none of its own.
const FOLLOW_UP_PROBABILITY: f64 = 0.5;
/// Chance of appending a closing statement to a long reply.
const CLOSING_PROBABILITY: f64 = 0.3;
/// Chance of joining the first two parts with a transition phrase.
const TRANSITION_PROBABILITY: f64 = 0.5;
/// Minimum joined length of parts 1-3 before a closing is considered.
const CLOSING_MIN_CHARS: usize = 100;

/// Assembles complete replies from bank fragments.
#[derive(Debug, Clone, Copy, Default)]
pub struct ResponseComposer {
    selector: TemplateSelector,
}

impl ResponseComposer {
    pub fn new(selector: TemplateSelector) -> Self {
        Self { selector }
    }

    /// Compose a full reply for a user message.
    ///
    /// The output always contains the selected template's body as a
    /// contiguous substring, at most lower-cased at its first character
    /// when a transition phrase precedes it.
    pub fn compose(
        &self,
        bank: &TemplateBank,
        message: &str,
        recent_ai_replies: &[String],
        rng: &mut dyn RandomSource,
    ) -> String {
        let template = self.selector.select(bank, message, recent_ai_replies, rng);
        let lower = message.to_lowercase();

        let mut parts: Vec<String> = Vec::new();

        if EMOTIONAL_KEYWORDS.iter().any(|k| lower.contains(k)) {
            let validations = bank.validations();
            parts.push(validations[rng.pick_index(validations.len())].clone());
        }

        parts.push(template.body.clone());

        if let Some(follow_up) = &template.follow_up {
            parts.push(follow_up.clone());
        } else if rng.next_f64() < FOLLOW_UP_PROBABILITY {
            let questions = bank.follow_up_questions();
            parts.push(questions[rng.pick_index(questions.len())].clone());
        }

        if parts.join(" ").len() > CLOSING_MIN_CHARS && rng.next_f64() < CLOSING_PROBABILITY {
            let closings = bank.closings();
            parts.push(closings[rng.pick_index(closings.len())].clone());
        }

        let mut response = String::new();
        for (i, part) in parts.iter().enumerate() {
            if i == 0 {
                response.push_str(part);
            } else if i == 1 && rng.next_f64() < TRANSITION_PROBABILITY {
                let transitions = bank.transitions();
                let transition = &transitions[rng.pick_index(transitions.len())];
                response.push(' ');
                response.push_str(transition);
                response.push_str(&lowercase_first(part));
            } else {
                response.push(' ');
                response.push_str(part);
            }
        }

        response
    }
}

/// Lower-case only the first character, preserving the rest.
fn lowercase_first(text: &str) -> String {
    let mut chars = text.chars();
    match chars.next() {
        Some(first) => first.to_lowercase().chain(chars).collect(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rng::SequenceSource;

    fn composer() -> ResponseComposer {
        ResponseComposer::default()
    }

    // Draw script shorthand: see the module docs for draw order.

    #[test]
    fn test_emotional_message_gets_validation_clause() {
        // Force the validation pick to slot 0, fail the closing and
        // transition coins.
        let bank = TemplateBank::builtin();
        let mut rng = SequenceSource::new(vec![0.0, 0.99, 0.99]);
        let out = composer().compose(
            &bank,
            "I feel so anxious and stressed about everything lately",
            &[],
            &mut rng,
        );
        assert!(out.starts_with(bank.validations()[0].as_str()));
        assert!(out.contains("It sounds like you're experiencing quite a bit of anxiety."));
    }

    #[test]
    fn test_non_emotional_message_has_no_validation_clause() {
        let bank = TemplateBank::builtin();
        // Message matches "pattern" cues but no emotional keyword.
        let mut rng = SequenceSource::new(vec![0.99]);
        let out = composer().compose(&bank, "why do i repeat this pattern", &[], &mut rng);
        for validation in bank.validations() {
            assert!(!out.starts_with(validation.as_str()));
        }
    }

    #[test]
    fn test_template_follow_up_appended_verbatim() {
        let bank = TemplateBank::builtin();
        // anxiety-1 carries its own follow-up; no follow-up coin is drawn.
        let mut rng = SequenceSource::new(vec![0.0, 0.99, 0.99]);
        let out = composer().compose(
            &bank,
            "I feel so anxious and stressed about everything lately",
            &[],
            &mut rng,
        );
        assert!(out.contains("How has this anxiety been affecting your daily life?"));
    }

    #[test]
    fn test_pooled_follow_up_when_coin_succeeds() {
        let bank = TemplateBank::builtin();
        // "why do i repeat this pattern" selects general-5 (no follow-up).
        // Script: follow-up coin 0.0 (hit), follow-up pick slot 0,
        // closing coin 0.99 (miss), transition coin 0.99 (miss).
        let mut rng = SequenceSource::new(vec![0.0, 0.0, 0.99, 0.99]);
        let out = composer().compose(&bank, "why do i repeat this pattern", &[], &mut rng);
        assert!(out.contains(bank.follow_up_questions()[0].as_str()));
    }

    #[test]
    fn test_no_pooled_follow_up_when_coin_fails() {
        let bank = TemplateBank::builtin();
        // Follow-up coin 0.99 (miss), closing coin 0.99, no transition draw
        // (single part).
        let mut rng = SequenceSource::new(vec![0.99, 0.99]);
        let out = composer().compose(&bank, "why do i repeat this pattern", &[], &mut rng);
        for question in bank.follow_up_questions() {
            assert!(!out.contains(question.as_str()));
        }
    }

    #[test]
    fn test_transition_lowercases_second_part() {
        let bank = TemplateBank::builtin();
        // Validation pick 0, closing coin miss, transition coin hit,
        // transition pick 0 ("As we talk about this, ").
        let mut rng = SequenceSource::new(vec![0.0, 0.99, 0.0, 0.0]);
        let out = composer().compose(
            &bank,
            "I feel so anxious and stressed about everything lately",
            &[],
            &mut rng,
        );
        assert!(out.contains("As we talk about this, it sounds like you're experiencing"));
    }

    #[test]
    fn test_closing_appended_on_long_reply() {
        let bank = TemplateBank::builtin();
        // Validation 0, closing coin hit (0.0), closing pick 0,
        // transition coin miss.
        let mut rng = SequenceSource::new(vec![0.0, 0.0, 0.0, 0.99]);
        let out = composer().compose(
            &bank,
            "I feel so anxious and stressed about everything lately",
            &[],
            &mut rng,
        );
        assert!(out.ends_with(bank.closings()[0].as_str()));
    }

    #[test]
    fn test_body_always_contained() {
        // Across a spread of scripted draws the body survives intact.
        let bank = TemplateBank::builtin();
        let messages = [
            "I feel so anxious and stressed about everything lately",
            "I hate myself and feel worthless",
            "my partner and I had a fight",
            "what is the point of anything",
            "just a plain note about nothing",
        ];
        let scripts = [
            vec![0.0],
            vec![0.99],
            vec![0.5, 0.5, 0.5, 0.5, 0.5],
            vec![0.2, 0.9, 0.1, 0.7],
        ];
        for message in &messages {
            for script in &scripts {
                let mut rng = SequenceSource::new(script.clone());
                let out = composer().compose(&bank, message, &[], &mut rng);
                let contained = bank.templates().iter().any(|t| {
                    out.contains(t.body.as_str()) || out.contains(&lowercase_first(&t.body))
                });
                assert!(contained, "no template body found in {:?}", out);
            }
        }
    }

    #[test]
    fn test_parts_joined_with_single_spaces() {
        let bank = TemplateBank::builtin();
        let mut rng = SequenceSource::new(vec![0.0, 0.99, 0.99]);
        let out = composer().compose(
            &bank,
            "I feel so anxious and stressed about everything lately",
            &[],
            &mut rng,
        );
        assert!(!out.contains("  "));
    }

    #[test]
    fn test_lowercase_first() {
        assert_eq!(lowercase_first("It sounds"), "it sounds");
        assert_eq!(lowercase_first("already lower"), "already lower");
        assert_eq!(lowercase_first(""), "");
        assert_eq!(lowercase_first("A"), "a");
    }

    #[test]
    fn test_output_never_empty() {
        let bank = TemplateBank::builtin();
        let mut rng = SequenceSource::new(vec![0.99]);
        let out = composer().compose(&bank, "x", &[], &mut rng);
        assert!(!out.is_empty());
    }
}
