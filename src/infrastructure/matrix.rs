//! # Matrix Service Adapter
//!
//! Implements the `ChatProvider` trait for a Matrix room using the `matrix_sdk`.
//! Replies go out as `m.notice` so other bots do not answer them.
//! Matrix has no embeds, so quote replies are rendered to HTML: the quote in a
//! coloured blockquote and the footer underneath, with a plain-text fallback body.

use anyhow::Result;
use async_trait::async_trait;
use matrix_sdk::room::Room;
use matrix_sdk::ruma::events::room::message::RoomMessageEventContent;

use crate::domain::traits::ChatProvider;
use crate::domain::types::Embed;

#[derive(Clone)]
pub struct MatrixService {
    room: Room,
}

impl MatrixService {
    pub fn new(room: Room) -> Self {
        Self { room }
    }

    async fn send(&self, content: RoomMessageEventContent) -> Result<String> {
        let response = self.room.send(content).await?;
        Ok(response.event_id.to_string())
    }
}

#[async_trait]
impl ChatProvider for MatrixService {
    fn room_id(&self) -> String {
        self.room.room_id().as_str().to_string()
    }

    async fn send_plain(&self, content: &str) -> Result<String> {
        tracing::info!("Bot sending message to {}: {}", self.room_id(), content);
        self.send(RoomMessageEventContent::notice_plain(content)).await
    }

    async fn send_markdown(&self, content: &str) -> Result<String> {
        tracing::info!("Bot sending message to {}: {}", self.room_id(), content);
        self.send(RoomMessageEventContent::notice_markdown(content)).await
    }

    async fn send_embed(&self, embed: &Embed) -> Result<String> {
        tracing::info!("Bot sending quote to {}: {}", self.room_id(), embed.footer_text);
        let (plain, html) = render_embed(embed);
        self.send(RoomMessageEventContent::notice_html(plain, html)).await
    }
}

/// Plain-text and HTML bodies for an embed.
pub fn render_embed(embed: &Embed) -> (String, String) {
    let quoted: Vec<String> = embed
        .description
        .lines()
        .map(|line| format!("> {line}"))
        .collect();
    let plain = format!("{}\n\n- {}", quoted.join("\n"), embed.footer_text);

    let body = escape_html(&embed.description).replace('\n', "<br>");
    // Clients only load images from the homeserver's media repository
    let icon = embed
        .footer_icon_url
        .as_deref()
        .filter(|url| url.starts_with("mxc://"))
        .map(|url| format!("<img src=\"{}\" alt=\"\" width=\"16\" height=\"16\"> ", escape_html(url)))
        .unwrap_or_default();
    let html = format!(
        "<blockquote><font data-mx-color=\"#{:06X}\">{}</font></blockquote><sub>{}{}</sub>",
        embed.color & 0xFF_FFFF,
        body,
        icon,
        escape_html(&embed.footer_text)
    );
    (plain, html)
}

fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}
