//! The template bank: the fixed knowledge base of therapeutic responses
//! and the phrase pools the composer draws from.
//!
//! The builtin bank covers CBT, DBT, person-centered, existential, and
//! trauma-informed approaches. A bank is constructed once, validated, and
//! immutable afterwards; tests may substitute a fixture bank.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::context::ContextTag;

/// A single canned therapeutic response.
///
/// `approach` and `tone` are descriptive metadata only; they play no part
/// in matching.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TemplateResponse {
    pub id: String,
    /// Lowercase keywords/phrases whose presence in user text boosts
    /// this template's relevance score.
    pub triggers: Vec<String>,
    /// Context tags this template is appropriate for.
    pub contexts: Vec<ContextTag>,
    /// The primary response text.
    pub body: String,
    /// Optional follow-up sentence appended verbatim when present.
    pub follow_up: Option<String>,
    pub approach: String,
    pub tone: String,
}

/// Invariant violations detected at bank construction.
#[derive(Debug, Error)]
pub enum BankError {
    #[error("template bank is empty")]
    EmptyBank,
    #[error("template bank has no general or emotional-support template")]
    NoFallbackTemplate,
    #[error("template {0} has neither triggers nor contexts")]
    UnmatchableTemplate(String),
}

impl From<BankError> for solace_core::SolaceError {
    fn from(err: BankError) -> Self {
        solace_core::SolaceError::Engine(err.to_string())
    }
}

/// The fixed, immutable collection of templates and phrase pools.
#[derive(Debug, Clone)]
pub struct TemplateBank {
    templates: Vec<TemplateResponse>,
    validations: Vec<String>,
    follow_up_questions: Vec<String>,
    transitions: Vec<String>,
    closings: Vec<String>,
    greetings: Vec<String>,
}

impl TemplateBank {
    /// The full builtin knowledge base.
    pub fn builtin() -> Self {
        Self::with_templates(builtin_templates()).expect("builtin template bank is valid")
    }

    /// Build a bank from the given templates and the builtin phrase pools.
    ///
    /// Validates the bank invariants: non-empty, every template matchable,
    /// and at least one template tagged `general` or `emotional-support`
    /// so fallback selection always has a candidate.
    pub fn with_templates(templates: Vec<TemplateResponse>) -> Result<Self, BankError> {
        if templates.is_empty() {
            return Err(BankError::EmptyBank);
        }
        for t in &templates {
            if t.triggers.is_empty() && t.contexts.is_empty() {
                return Err(BankError::UnmatchableTemplate(t.id.clone()));
            }
        }
        if !templates.iter().any(|t| {
            t.contexts.contains(&ContextTag::General)
                || t.contexts.contains(&ContextTag::EmotionalSupport)
        }) {
            return Err(BankError::NoFallbackTemplate);
        }

        Ok(Self {
            templates,
            validations: strings(VALIDATION_RESPONSES),
            follow_up_questions: strings(FOLLOW_UP_QUESTIONS),
            transitions: strings(TRANSITION_PHRASES),
            closings: strings(CLOSING_STATEMENTS),
            greetings: strings(GREETING_RESPONSES),
        })
    }

    pub fn templates(&self) -> &[TemplateResponse] {
        &self.templates
    }

    /// Templates eligible for fallback selection when scoring fails.
    pub fn fallback_pool(&self) -> Vec<&TemplateResponse> {
        self.templates
            .iter()
            .filter(|t| {
                t.contexts.contains(&ContextTag::General)
                    || t.contexts.contains(&ContextTag::EmotionalSupport)
            })
            .collect()
    }

    pub fn validations(&self) -> &[String] {
        &self.validations
    }

    pub fn follow_up_questions(&self) -> &[String] {
        &self.follow_up_questions
    }

    pub fn transitions(&self) -> &[String] {
        &self.transitions
    }

    pub fn closings(&self) -> &[String] {
        &self.closings
    }

    pub fn greetings(&self) -> &[String] {
        &self.greetings
    }
}

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

/// Validation sentences acknowledging emotional content.
const VALIDATION_RESPONSES: &[&str] = &[
    "That sounds really difficult.",
    "I can understand why you'd feel that way.",
    "It makes sense that you'd be feeling this way given what you've described.",
    "That's a lot to deal with.",
    "I appreciate you sharing something so personal.",
    "Those feelings are completely valid.",
    "It's understandable to have those reactions.",
    "That sounds like a challenging situation.",
    "I can hear how painful that is.",
    "Your feelings make a lot of sense in this context.",
];

/// General follow-up questions used when a template has none of its own.
const FOLLOW_UP_QUESTIONS: &[&str] = &[
    "Could you tell me more about that?",
    "How did that make you feel?",
    "What was that experience like for you?",
    "Have you noticed any patterns related to this?",
    "What do you think contributed to that?",
    "What meaning does this have for you?",
    "How have you been coping with this?",
    "What would be helpful for you right now?",
    "What would you like to be different?",
    "What's been most challenging about this situation?",
    "What thoughts come up for you when you experience this?",
    "What has helped you get through difficult times in the past?",
];

/// Connectors occasionally inserted between the first and second parts.
const TRANSITION_PHRASES: &[&str] = &[
    "As we talk about this, ",
    "Given what you've shared, ",
    "Considering this situation, ",
    "Based on what you're describing, ",
    "With this in mind, ",
    "Reflecting on what you've shared, ",
    "Taking a step back, ",
    "Looking at the bigger picture, ",
    "From what I understand, ",
    "If I'm hearing you correctly, ",
];

/// Closing statements appended to longer replies.
const CLOSING_STATEMENTS: &[&str] = &[
    "I'm here to support you through this.",
    "Please feel free to share more whenever you're ready.",
    "I'm listening and here to help.",
    "Thank you for trusting me with this.",
    "I appreciate your openness.",
    "I'm here to continue this conversation whenever you'd like.",
    "Your willingness to explore these feelings shows courage.",
    "I'm here to listen as you work through this.",
];

/// Opening lines for a brand-new session.
const GREETING_RESPONSES: &[&str] = &[
    "Hi there. I'm here to support you today. What's been on your mind?",
    "Hello. I'm here to listen and talk with you. How are you feeling today?",
    "Welcome. This is a space where you can share what's going on for you. What brings you here?",
    "I'm here to offer support and listen. What would you like to talk about today?",
    "Hi. I'm here to chat about whatever's important to you right now. How are you feeling?",
];

fn template(
    id: &str,
    triggers: &[&str],
    contexts: &[ContextTag],
    body: &str,
    follow_up: Option<&str>,
    approach: &str,
    tone: &str,
) -> TemplateResponse {
    TemplateResponse {
        id: id.to_string(),
        triggers: strings(triggers),
        contexts: contexts.to_vec(),
        body: body.to_string(),
        follow_up: follow_up.map(|s| s.to_string()),
        approach: approach.to_string(),
        tone: tone.to_string(),
    }
}

fn builtin_templates() -> Vec<TemplateResponse> {
    use ContextTag::*;

    vec![
        // Depression
        template(
            "depression-1",
            &["sad", "depressed", "depression", "hopeless", "no point", "pointless", "worthless"],
            &[EmotionalSupport, InitialDisclosure],
            "I hear that you're feeling down right now. Depression can make even small tasks feel \
             overwhelming and cloud our perspective. When did you first notice these feelings \
             beginning?",
            Some("Have you noticed any patterns to when you feel better versus worse?"),
            "CBT",
            "empathetic",
        ),
        template(
            "depression-2",
            &["sad", "depressed", "depression", "hopeless", "no motivation", "tired"],
            &[OngoingSupport, Deepening],
            "Depression often affects our energy and motivation. Small steps can be really \
             important when you're feeling this way. Is there anything small that has brought you \
             even a moment of relief recently?",
            Some("Even noticing those small moments can be a helpful way to begin shifting momentum."),
            "Behavioral Activation",
            "supportive",
        ),
        template(
            "depression-3",
            &["negative thoughts", "hate myself", "worthless", "failure", "never get better"],
            &[ThoughtPatterns, Deepening],
            "Those negative thoughts can be really painful. In therapy, we often find that \
             depression creates a filter that makes negative thoughts seem more true than they \
             actually are. Would it be helpful to explore some of those thoughts together?",
            None,
            "CBT",
            "validating",
        ),
        // Anxiety
        template(
            "anxiety-1",
            &["anxious", "anxiety", "worried", "panic", "stress", "stressed", "nervous"],
            &[EmotionalSupport, InitialDisclosure],
            "It sounds like you're experiencing quite a bit of anxiety. When we're anxious, our \
             body's alarm system is activated, which can be really uncomfortable. What physical \
             sensations are you noticing right now?",
            Some("How has this anxiety been affecting your daily life?"),
            "Somatic Experiencing",
            "calming",
        ),
        template(
            "anxiety-2",
            &["anxious", "anxiety", "worried", "panic", "stress", "stressed", "nervous"],
            &[CopingStrategies, Skills],
            "When anxiety feels overwhelming, grounding techniques can help bring you back to the \
             present moment. One approach is the 5-4-3-2-1 technique: notice 5 things you can see, \
             4 things you can touch, 3 things you can hear, 2 things you can smell, and 1 thing \
             you can taste. Would you like to try this together?",
            None,
            "DBT",
            "supportive",
        ),
        template(
            "anxiety-3",
            &["worry", "overthinking", "what if", "catastrophizing", "uncertain"],
            &[ThoughtPatterns, Deepening],
            "Worry often involves focusing on future uncertainties and assuming the worst \
             outcomes. This is a normal tendency, but can become exhausting. What specific worries \
             have been most present for you lately?",
            Some(
                "For each worry, we could explore how likely that outcome really is, and what \
                 resources you would have if it did happen.",
            ),
            "CBT",
            "analytical",
        ),
        // Meaning and purpose
        template(
            "meaning-1",
            &["purpose", "meaning", "meaningless", "point", "pointless", "fulfillment"],
            &[Existential, InitialDisclosure],
            "Questioning meaning and purpose in life is a deeply human experience. These questions \
             often arise during important transition points or when we're feeling disconnected \
             from what matters. What has prompted these questions for you at this time?",
            Some("When have you felt a sense of meaning or purpose in the past?"),
            "Existential Therapy",
            "philosophical",
        ),
        template(
            "meaning-2",
            &["purpose", "meaning", "meaningless", "values", "important"],
            &[ValuesExploration, Deepening],
            "Finding meaning often starts with connecting to our core values - what's most \
             important to us. If you were living fully aligned with your values, what might that \
             look like? What qualities would be present in your life?",
            None,
            "ACT",
            "curious",
        ),
        template(
            "meaning-3",
            &["contribute", "help others", "make a difference", "legacy", "impact"],
            &[MeaningMaking, ActionOriented],
            "Many people find meaning through the impact they have on others or contributing to \
             something larger than themselves. Have there been times when you felt your actions \
             made a positive difference, however small?",
            Some("Those moments can sometimes point us toward what feels meaningful."),
            "Logotherapy",
            "encouraging",
        ),
        // Relationships
        template(
            "relationships-1",
            &["relationship", "partner", "spouse", "boyfriend", "girlfriend", "marriage"],
            &[RelationshipIssues, InitialDisclosure],
            "Relationships can be both our greatest source of connection and also challenging at \
             times. What aspects of this relationship have been most difficult recently?",
            Some("And what parts of the relationship do you value or appreciate?"),
            "Emotionally Focused Therapy",
            "balanced",
        ),
        template(
            "relationships-2",
            &["argument", "fight", "conflict", "communication", "misunderstanding"],
            &[RelationshipIssues, Skills],
            "Conflict in relationships often happens when we feel our needs aren't being \
             understood or met. Have you been able to express your needs clearly in this \
             situation? Sometimes using 'I' statements rather than 'you' statements can help \
             reduce defensiveness.",
            None,
            "Communication Skills Training",
            "instructive",
        ),
        template(
            "relationships-3",
            &["lonely", "alone", "isolated", "disconnected", "no friends"],
            &[Loneliness, EmotionalSupport],
            "Feeling disconnected from others can be really painful. We're social beings who need \
             connection. Has this feeling of loneliness been present for a while, or is it more \
             recent?",
            Some("What types of connections would feel most meaningful to you right now?"),
            "Interpersonal Therapy",
            "compassionate",
        ),
        // Trauma
        template(
            "trauma-1",
            &["trauma", "traumatic", "abuse", "assault", "accident", "ptsd"],
            &[TraumaDisclosure, Safety],
            "Thank you for sharing something so difficult. First, I want to acknowledge your \
             courage in speaking about this. Trauma can affect us in many ways, and healing is \
             possible, though it takes time. How have you been coping with these experiences?",
            None,
            "Trauma-Informed Care",
            "gentle",
        ),
        template(
            "trauma-2",
            &["flashback", "nightmare", "triggered", "memory", "remind"],
            &[TraumaSymptoms, CopingStrategies],
            "Flashbacks and intrusive memories are common responses to trauma. When these occur, \
             grounding techniques can help remind your nervous system that you're here in the \
             present, where you're safe. Would it be helpful to discuss some grounding strategies?",
            None,
            "PTSD Treatment",
            "supportive",
        ),
        // Self-esteem
        template(
            "self-esteem-1",
            &["hate myself", "self-loathing", "ugly", "stupid", "worthless", "not good enough"],
            &[SelfCriticism, EmotionalSupport],
            "I'm hearing a lot of harsh self-criticism. These thoughts sound really painful. \
             Often, we speak to ourselves in ways we would never speak to someone else we care \
             about. What might you say to a friend who was feeling this way about themselves?",
            None,
            "Self-Compassion Training",
            "kind",
        ),
        template(
            "self-esteem-2",
            &["confidence", "insecure", "inadequate", "compare", "imposter"],
            &[SelfWorth, Deepening],
            "Many people struggle with feelings of inadequacy or comparing themselves to others. \
             These feelings are common, but can be painful. Where do you think these expectations \
             you have for yourself originated?",
            Some("Are these expectations realistic or fair to hold yourself to?"),
            "Schema Therapy",
            "curious",
        ),
        // General
        template(
            "general-1",
            &["help", "dont know what to do", "stuck", "confused", "lost"],
            &[SeekingDirection, InitialContact],
            "It can be really difficult when you're feeling stuck or unsure of the path forward. \
             To help me understand better, could you share a bit more about what's been going on \
             that's led you to feeling this way?",
            None,
            "Person-Centered",
            "curious",
        ),
        template(
            "general-2",
            &["want to talk", "need to talk", "just talk", "listen"],
            &[SeekingConnection, InitialContact],
            "I'm here to listen. Sometimes just putting our experiences into words can help us \
             process them. What would feel most helpful to talk about today?",
            None,
            "Person-Centered",
            "open",
        ),
        template(
            "general-3",
            &["overwhelmed", "too much", "cant handle", "breaking point"],
            &[Crisis, EmotionalSupport],
            "When we're feeling overwhelmed, it can be helpful to focus on just the next step \
             rather than everything at once. Right now, what's one small thing that might help you \
             feel even slightly more grounded?",
            None,
            "Crisis Intervention",
            "stabilizing",
        ),
        template(
            "general-4",
            &["change", "different", "better", "improve", "fix"],
            &[GoalSetting, ActionOriented],
            "It sounds like you're wanting to make some changes. If things were better, what would \
             be different? How would you know things were improving?",
            None,
            "Solution-Focused Therapy",
            "encouraging",
        ),
        template(
            "general-5",
            &["why do i feel", "understand myself", "pattern", "keep happening"],
            &[InsightSeeking, Patterns],
            "I appreciate your self-awareness and desire to understand these patterns. Our \
             reactions often have roots in earlier experiences. Have you noticed any similarities \
             between these situations and experiences you've had in the past?",
            None,
            "Psychodynamic",
            "reflective",
        ),
        template(
            "sad-1",
            &["sad", "feeling down", "upset", "unhappy"],
            &[EmotionalSupport, InitialDisclosure],
            "I'm sorry to hear you're feeling sad right now. These emotions can be really \
             difficult to sit with. Would you like to tell me more about what's contributing to \
             these feelings?",
            None,
            "Person-Centered",
            "empathetic",
        ),
    ]
}
