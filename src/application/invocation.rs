//! # Invocation Matching
//!
//! Recognizes the command prefix (`[]says` by default) or a mention of the bot
//! (its user ID, or its display name as a whole word), anywhere in a message and case-insensitively.
//! Whatever follows the trigger becomes the invocation argument.

use anyhow::Result;
use regex::Regex;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    pub argument: Option<String>,
}

pub struct InvocationMatcher {
    pattern: Regex,
}

impl InvocationMatcher {
    pub fn new(prefix: &str, user_id: &str, display_name: Option<&str>) -> Result<Self> {
        let mut triggers = vec![regex::escape(prefix), regex::escape(user_id)];
        if let Some(name) = display_name.map(str::trim).filter(|n| !n.is_empty()) {
            triggers.push(format!("{}:?", word(name)));
        }
        let pattern = Regex::new(&format!(r"(?i)(?:{})(?:\s+(.*))?", triggers.join("|")))?;
        Ok(Self { pattern })
    }

    pub fn find(&self, body: &str) -> Option<Invocation> {
        let caps = self.pattern.captures(body)?;
        let argument = caps
            .get(1)
            .map(|m| m.as_str().trim().to_string())
            .filter(|a| !a.is_empty());
        Some(Invocation { argument })
    }
}

/// Escapes `name` and pins it to word boundaries where it starts or ends with a word
/// character, so the name inside a longer word is not a mention.
fn word(name: &str) -> String {
    let is_word = |c: char| c.is_alphanumeric() || c == '_';
    let mut out = String::new();
    if name.starts_with(is_word) {
        out.push_str(r"\b");
    }
    out.push_str(&regex::escape(name));
    if name.ends_with(is_word) {
        out.push_str(r"\b");
    }
    out
}
