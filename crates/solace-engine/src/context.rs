//! Conversational context detection.
//!
//! Classifies a raw user message into a non-empty ordered set of context
//! tags via fixed substring cues. Total over all inputs: a message that
//! matches no rule yields `[General]`.

use serde::{Deserialize, Serialize};

/// A label classifying the topic or intent of a user message.
///
/// The detector emits a subset of these; templates may additionally be
/// tagged with conversational-stage tags (e.g. `Deepening`) that the
/// detector never emits but that still participate in scoring.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ContextTag {
    InitialContact,
    EmotionalSupport,
    Depression,
    Anxiety,
    RelationshipIssues,
    Existential,
    MeaningMaking,
    SelfCriticism,
    SelfWorth,
    TraumaDisclosure,
    Safety,
    CopingStrategies,
    Skills,
    InsightSeeking,
    Patterns,
    General,
    InitialDisclosure,
    OngoingSupport,
    Deepening,
    ThoughtPatterns,
    ValuesExploration,
    ActionOriented,
    Loneliness,
    TraumaSymptoms,
    SeekingDirection,
    SeekingConnection,
    Crisis,
    GoalSetting,
}

impl ContextTag {
    pub fn as_str(&self) -> &'static str {
        match self {
            ContextTag::InitialContact => "initial-contact",
            ContextTag::EmotionalSupport => "emotional-support",
            ContextTag::Depression => "depression",
            ContextTag::Anxiety => "anxiety",
            ContextTag::RelationshipIssues => "relationship-issues",
            ContextTag::Existential => "existential",
            ContextTag::MeaningMaking => "meaning-making",
            ContextTag::SelfCriticism => "self-criticism",
            ContextTag::SelfWorth => "self-worth",
            ContextTag::TraumaDisclosure => "trauma-disclosure",
            ContextTag::Safety => "safety",
            ContextTag::CopingStrategies => "coping-strategies",
            ContextTag::Skills => "skills",
            ContextTag::InsightSeeking => "insight-seeking",
            ContextTag::Patterns => "patterns",
            ContextTag::General => "general",
            ContextTag::InitialDisclosure => "initial-disclosure",
            ContextTag::OngoingSupport => "ongoing-support",
            ContextTag::Deepening => "deepening",
            ContextTag::ThoughtPatterns => "thought-patterns",
            ContextTag::ValuesExploration => "values-exploration",
            ContextTag::ActionOriented => "action-oriented",
            ContextTag::Loneliness => "loneliness",
            ContextTag::TraumaSymptoms => "trauma-symptoms",
            ContextTag::SeekingDirection => "seeking-direction",
            ContextTag::SeekingConnection => "seeking-connection",
            ContextTag::Crisis => "crisis",
            ContextTag::GoalSetting => "goal-setting",
        }
    }
}

impl std::fmt::Display for ContextTag {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Detect conversational contexts in a user message.
///
/// Lowercases the message and tests each rule's substring cues in a fixed
/// order; every matching rule appends its tags. Emission order is the
/// insertion order of the first matching rule, without duplicates.
/// Never fails; empty or unmatched input yields `[General]`.
pub fn detect_contexts(message: &str) -> Vec<ContextTag> {
    let lower = message.to_lowercase();
    let mut contexts = Vec::new();

    let mut push = |tag: ContextTag| {
        if !contexts.contains(&tag) {
            contexts.push(tag);
        }
    };

    // Greetings, or a short ask for help.
    if lower.contains("hello")
        || lower.contains("hi ")
        || lower.contains("hey")
        || (lower.contains("help") && lower.len() < 30)
    {
        push(ContextTag::InitialContact);
    }

    if lower.contains("sad")
        || lower.contains("depress")
        || lower.contains("down")
        || lower.contains("hopeless")
    {
        push(ContextTag::EmotionalSupport);
        push(ContextTag::Depression);
    }

    if lower.contains("anx")
        || lower.contains("worr")
        || lower.contains("stress")
        || lower.contains("panic")
    {
        push(ContextTag::EmotionalSupport);
        push(ContextTag::Anxiety);
    }

    if lower.contains("relationship")
        || lower.contains("partner")
        || lower.contains("friend")
        || lower.contains("family")
        || lower.contains("parent")
    {
        push(ContextTag::RelationshipIssues);
    }

    if lower.contains("meaning")
        || lower.contains("purpose")
        || lower.contains("point")
        || lower.contains("why live")
    {
        push(ContextTag::Existential);
        push(ContextTag::MeaningMaking);
    }

    if lower.contains("hate myself")
        || lower.contains("worthless")
        || lower.contains("not good enough")
        || lower.contains("failure")
    {
        push(ContextTag::SelfCriticism);
        push(ContextTag::SelfWorth);
    }

    if lower.contains("trauma")
        || lower.contains("abuse")
        || lower.contains("assault")
        || lower.contains("accident")
    {
        push(ContextTag::TraumaDisclosure);
        push(ContextTag::Safety);
    }

    if lower.contains("cope")
        || lower.contains("deal with")
        || lower.contains("handle")
        || lower.contains("manage")
    {
        push(ContextTag::CopingStrategies);
        push(ContextTag::Skills);
    }

    if lower.contains("why do i")
        || lower.contains("understand myself")
        || lower.contains("pattern")
        || lower.contains("keep happening")
    {
        push(ContextTag::InsightSeeking);
        push(ContextTag::Patterns);
    }

    if contexts.is_empty() {
        contexts.push(ContextTag::General);
    }

    contexts
}

#[cfg(test)]
mod tests {
    use super::*;

    // ---- Fallback ----

    #[test]
    fn test_empty_message_yields_general() {
        assert_eq!(detect_contexts(""), vec![ContextTag::General]);
    }

    #[test]
    fn test_whitespace_message_yields_general() {
        assert_eq!(detect_contexts("   "), vec![ContextTag::General]);
    }

    #[test]
    fn test_unmatched_message_yields_general() {
        assert_eq!(
            detect_contexts("the weather report for tomorrow"),
            vec![ContextTag::General]
        );
    }

    // ---- Single rules ----

    #[test]
    fn test_greeting_detected() {
        let tags = detect_contexts("Hello there");
        assert_eq!(tags, vec![ContextTag::InitialContact]);
    }

    #[test]
    fn test_short_help_is_initial_contact() {
        let tags = detect_contexts("I need help");
        assert!(tags.contains(&ContextTag::InitialContact));
    }

    #[test]
    fn test_long_help_message_is_not_initial_contact() {
        let tags =
            detect_contexts("I could really use some help figuring out my career direction");
        assert!(!tags.contains(&ContextTag::InitialContact));
    }

    #[test]
    fn test_depression_cues() {
        let tags = detect_contexts("everything feels hopeless");
        assert_eq!(
            tags,
            vec![ContextTag::EmotionalSupport, ContextTag::Depression]
        );
    }

    #[test]
    fn test_hopeless_and_worthless_includes_depression() {
        let tags = detect_contexts("I feel hopeless and worthless");
        assert!(tags.contains(&ContextTag::Depression));
        assert!(tags.contains(&ContextTag::SelfCriticism));
    }

    #[test]
    fn test_anxiety_cues() {
        let tags = detect_contexts("I'm so worried about my exam");
        assert_eq!(tags, vec![ContextTag::EmotionalSupport, ContextTag::Anxiety]);
    }

    #[test]
    fn test_relationship_cues() {
        let tags = detect_contexts("my partner and I keep fighting");
        assert!(tags.contains(&ContextTag::RelationshipIssues));
    }

    #[test]
    fn test_existential_cues() {
        let tags = detect_contexts("what is the purpose of all this");
        assert_eq!(
            tags,
            vec![ContextTag::Existential, ContextTag::MeaningMaking]
        );
    }

    #[test]
    fn test_trauma_cues() {
        let tags = detect_contexts("I went through abuse as a child");
        assert!(tags.contains(&ContextTag::TraumaDisclosure));
        assert!(tags.contains(&ContextTag::Safety));
    }

    #[test]
    fn test_coping_cues() {
        let tags = detect_contexts("how do I manage this");
        assert!(tags.contains(&ContextTag::CopingStrategies));
        assert!(tags.contains(&ContextTag::Skills));
    }

    #[test]
    fn test_insight_cues() {
        let tags = detect_contexts("why do I always react like this");
        assert!(tags.contains(&ContextTag::InsightSeeking));
        assert!(tags.contains(&ContextTag::Patterns));
    }

    // ---- Combinations ----

    #[test]
    fn test_anxiety_and_relationship_co_occur() {
        let tags = detect_contexts("I'm anxious about my relationship");
        assert!(tags.contains(&ContextTag::EmotionalSupport));
        assert!(tags.contains(&ContextTag::Anxiety));
        assert!(tags.contains(&ContextTag::RelationshipIssues));
    }

    #[test]
    fn test_anxious_and_stressed_example() {
        let tags = detect_contexts("I feel so anxious and stressed about everything lately");
        assert_eq!(tags, vec![ContextTag::EmotionalSupport, ContextTag::Anxiety]);
    }

    #[test]
    fn test_no_duplicate_tags() {
        // Both the depression and anxiety rules emit EmotionalSupport.
        let tags = detect_contexts("I'm sad and anxious");
        let support_count = tags
            .iter()
            .filter(|t| **t == ContextTag::EmotionalSupport)
            .count();
        assert_eq!(support_count, 1);
    }

    #[test]
    fn test_case_insensitive() {
        let tags = detect_contexts("I AM SO STRESSED");
        assert!(tags.contains(&ContextTag::Anxiety));
    }

    #[test]
    fn test_substring_matching_is_coarse() {
        // "down" matches inside "download"; this granularity is intentional.
        let tags = detect_contexts("my download failed");
        assert!(tags.contains(&ContextTag::Depression));
    }

    // ---- Purity ----

    #[test]
    fn test_detection_is_idempotent() {
        let msg = "I'm anxious about my family and my purpose";
        assert_eq!(detect_contexts(msg), detect_contexts(msg));
    }

    #[test]
    fn test_display_matches_kebab_case() {
        assert_eq!(ContextTag::EmotionalSupport.to_string(), "emotional-support");
        assert_eq!(ContextTag::TraumaDisclosure.to_string(), "trauma-disclosure");
    }
}
