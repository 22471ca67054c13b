//! Crisis keyword detection.
//!
//! Replies to messages containing crisis language always carry hotline
//! information, regardless of which provider produced the reply.

const CRISIS_KEYWORDS: &[&str] = &[
    "suicide",
    "kill myself",
    "end it all",
    "hurt myself",
    "self-harm",
    "suicidal",
];

const CRISIS_FOOTER: &str = "**Important**: If you're having thoughts of self-harm or suicide, \
please reach out for immediate help:\n\
- National Suicide Prevention Lifeline: 988 (US)\n\
- Crisis Text Line: Text HOME to 741741\n\
- Emergency services: 911\n\n\
You are not alone, and help is available.";

/// Whether a user message contains crisis language.
pub fn contains_crisis_language(message: &str) -> bool {
    let lower = message.to_lowercase();
    CRISIS_KEYWORDS.iter().any(|k| lower.contains(k))
}

/// Append the hotline footer to a reply.
pub fn append_crisis_footer(reply: &str) -> String {
    format!("{}\n\n{}", reply, CRISIS_FOOTER)
}
