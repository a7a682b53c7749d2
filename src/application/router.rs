//! # Message Router
//!
//! Decides whether an incoming message is meant for the bot, resolves the invocation
//! against the quote cache and sends the reply.
//!
//! Group rooms only react to invocations. Direct conversations answer anything
//! that is not an invocation with the help text.

use anyhow::Result;
use std::sync::Arc;

use crate::application::cache::QuoteCache;
use crate::application::invocation::InvocationMatcher;
use crate::application::resolver::QuoteResolver;
use crate::domain::config::ReplyConfig;
use crate::domain::traits::ChatProvider;
use crate::domain::types::{Embed, InboundMessage, NotFound, Resolution, ResolvedQuote};
use crate::strings::{help, messages};

pub struct MessageHandler {
    cache: Arc<QuoteCache>,
    resolver: QuoteResolver,
    invocation: InvocationMatcher,
    reply: ReplyConfig,
}

impl MessageHandler {
    pub fn new(
        cache: Arc<QuoteCache>,
        resolver: QuoteResolver,
        invocation: InvocationMatcher,
        reply: ReplyConfig,
    ) -> Self {
        Self {
            cache,
            resolver,
            invocation,
            reply,
        }
    }

    pub async fn handle<C>(&self, chat: &C, message: &InboundMessage) -> Result<()>
    where
        C: ChatProvider + ?Sized,
    {
        if message.automated || message.body.trim().is_empty() {
            return Ok(());
        }

        match self.invocation.find(&message.body) {
            Some(invocation) => {
                tracing::info!(
                    "Invocation from {} in {} args={:?}",
                    message.sender,
                    chat.room_id(),
                    invocation.argument
                );
                self.answer(chat, invocation.argument.as_deref()).await
            }
            None if message.direct => {
                chat.send_markdown(&help::main(&self.reply.prefix)).await?;
                Ok(())
            }
            None => Ok(()),
        }
    }

    async fn answer<C>(&self, chat: &C, argument: Option<&str>) -> Result<()>
    where
        C: ChatProvider + ?Sized,
    {
        let resolution = match self.cache.get().await {
            Some(document) => {
                // ThreadRng is !Send, keep it out of scope at the awaits below
                let mut rng = rand::rng();
                let today = chrono::Utc::now().date_naive();
                self.resolver.resolve(&document, argument, today, &mut rng)
            }
            None => Resolution::NotFound(NotFound::NoQuotes),
        };

        match resolution {
            Resolution::Found(quote) => {
                chat.send_embed(&self.embed(&quote)).await?;
            }
            Resolution::NotFound(reason) => {
                chat.send_plain(&messages::not_found(&reason)).await?;
            }
            Resolution::Unresolved => {
                tracing::debug!("No reply for {:?}: date named no month or year", argument);
            }
        }
        Ok(())
    }

    fn embed(&self, quote: &ResolvedQuote) -> Embed {
        Embed {
            description: quote.text.clone(),
            color: self.reply.color,
            footer_icon_url: self.reply.footer_icon_url.clone(),
            footer_text: messages::quote_footer(&self.reply.footer_label, quote.month, quote.year),
        }
    }
}
