//! # Domain Types
//!
//! Common data structures and enums used across the application logic.

/// A single quote picked for a reply, with the month it was recorded in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedQuote {
    pub text: String,
    pub month: u32,
    pub year: i32,
}

/// What a lookup failed to find. Shown to the user, never logged as an error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NotFound {
    Year(i32),
    Month { year: i32, month: u32 },
    Query(String),
    /// Nothing cached and the remote database could not be fetched.
    NoQuotes,
}

/// Outcome of resolving an invocation argument against the quote document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    Found(ResolvedQuote),
    NotFound(NotFound),
    /// The argument looked like a date but named neither a month nor a year
    /// (e.g. "monday", "5pm"). Produces no reply.
    Unresolved,
}

/// Rich reply: quote body, accent colour and a footer line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Embed {
    pub description: String,
    pub color: u32,
    pub footer_icon_url: Option<String>,
    pub footer_text: String,
}

/// Platform-neutral view of an incoming chat message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InboundMessage {
    pub sender: String,
    pub body: String,
    /// Sent by this bot or by another automated account.
    pub automated: bool,
    /// One-to-one conversation rather than a group room.
    pub direct: bool,
}
