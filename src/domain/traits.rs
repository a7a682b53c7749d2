//! # Domain Traits
//!
//! Abstract interfaces for the external collaborators (chat platform, quote database).
//! Allows for pluggable implementations in the Infrastructure layer.

use anyhow::Result;
use async_trait::async_trait;

use crate::domain::document::QuoteDocument;
use crate::domain::types::Embed;

/// Abstract interface for a Chat Provider (e.g., Matrix, Console)
#[async_trait]
pub trait ChatProvider: Send + Sync {
    /// Send an unformatted message, returns the event ID
    async fn send_plain(&self, content: &str) -> Result<String>;

    /// Send a markdown formatted message, returns the event ID
    async fn send_markdown(&self, content: &str) -> Result<String>;

    /// Send a rich quote reply, returns the event ID
    async fn send_embed(&self, embed: &Embed) -> Result<String>;

    /// Get the current room ID
    fn room_id(&self) -> String;
}

/// Where the quote database comes from
#[async_trait]
pub trait QuoteSource: Send + Sync {
    /// Fetch and validate the whole document
    async fn fetch(&self) -> Result<QuoteDocument>;

    /// Human readable origin, for logs
    fn describe(&self) -> String;
}
