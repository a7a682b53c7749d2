//! # Main Entry Point
//!
//! Initializes the bot:
//! - Domain: Configuration and Types
//! - Infrastructure: Matrix, HTTP quote source
//! - Application: Quote cache, Resolver, Router, Logging
//!

mod application;
mod domain;
mod infrastructure;
mod strings;

use anyhow::{Context, Result};
use clap::Parser;
use matrix_sdk::{
    Client, SessionMeta, SessionTokens,
    authentication::matrix::MatrixSession,
    config::SyncSettings,
    room::Room,
    ruma::{
        OwnedDeviceId, UserId,
        events::room::{
            member::{MembershipState, StrippedRoomMemberEvent},
            message::{MessageType, OriginalSyncRoomMessageEvent},
        },
    },
};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant, SystemTime, UNIX_EPOCH};

use crate::application::cache::QuoteCache;
use crate::application::fuzzy::FuzzyMatcher;
use crate::application::invocation::InvocationMatcher;
use crate::application::resolver::QuoteResolver;
use crate::application::router::MessageHandler;
use crate::domain::config::AppConfig;
use crate::domain::traits::ChatProvider;
use crate::domain::types::InboundMessage;
use crate::infrastructure::http::HttpQuoteSource;
use crate::infrastructure::matrix::MatrixService;
use crate::strings::logs;

const DEFAULT_CONFIG_PATH: &str = "data/config.yaml";

/// Matrix bot that answers `[]says [date|query]` with a quote.
#[derive(Debug, Parser)]
#[command(version, about)]
struct Cli {
    /// YAML config file; BOT_* environment variables override it
    #[arg(short, long, env = "BOT_CONFIG")]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    // 1. Load Configuration
    let cli = Cli::parse();
    let config_path = cli.config.or_else(|| {
        let default = PathBuf::from(DEFAULT_CONFIG_PATH);
        default.exists().then_some(default)
    });
    let config = AppConfig::load(config_path.as_deref())?;

    // 2. Logging Setup
    let _guard = application::logging::init(&config.logging)?;
    tracing::info!("{}", logs::STARTING);
    tracing::info!("{}", logs::log_level(config.logging.level_directive()));
    tracing::info!("{}", logs::config_loaded(&config.matrix.user_id, &config.quotes.url));

    // 3. Quote Database
    let source = Arc::new(HttpQuoteSource::new(&config.quotes)?);
    let cache = Arc::new(QuoteCache::new(source, config.quotes.refresh_interval()));
    cache.refresh().await;

    // 4. Matrix Login
    tracing::info!("{}", logs::AUTHENTICATING);
    let auth_started = Instant::now();
    let client = match login(&config).await {
        Ok(client) => {
            tracing::info!("{}", logs::auth_success(auth_started.elapsed().as_millis()));
            client
        }
        Err(e) => {
            tracing::error!(
                "{}",
                logs::auth_failed(auth_started.elapsed().as_millis(), &format!("{e:#}"))
            );
            return Err(e);
        }
    };

    let display_name = match client.account().get_display_name().await {
        Ok(name) => name,
        Err(e) => {
            tracing::warn!("Could not fetch display name, mentions by name disabled: {}", e);
            None
        }
    };
    let invocation = InvocationMatcher::new(
        &config.reply.prefix,
        &config.matrix.user_id,
        display_name.as_deref(),
    )?;
    let resolver = QuoteResolver::new(FuzzyMatcher::new(&config.search))?;
    let handler = Arc::new(MessageHandler::new(
        cache,
        resolver,
        invocation,
        config.reply.clone(),
    ));

    // 5. Event Handlers
    let start_time = SystemTime::now();
    client.add_event_handler(move |ev: OriginalSyncRoomMessageEvent, room: Room| {
        let handler = handler.clone();
        async move {
            // Ignore events older than start_time
            let event_time =
                UNIX_EPOCH + Duration::from_millis(ev.origin_server_ts.get().into());
            if event_time < start_time {
                return;
            }

            let (body, notice) = match &ev.content.msgtype {
                MessageType::Text(text) => (text.body.clone(), false),
                MessageType::Notice(notice) => (notice.body.clone(), true),
                _ => return,
            };

            let direct = match room.is_direct().await {
                Ok(direct) => direct || room.joined_members_count() <= 2,
                Err(e) => {
                    tracing::warn!("Could not check whether {} is direct: {}", room.room_id(), e);
                    room.joined_members_count() <= 2
                }
            };
            let message = InboundMessage {
                sender: ev.sender.to_string(),
                automated: notice || ev.sender == room.own_user_id(),
                body,
                direct,
            };

            let chat = MatrixService::new(room);
            if let Err(e) = handler.handle(&chat, &message).await {
                tracing::error!("{}", logs::handle_failed(&chat.room_id(), &format!("{e:#}")));
            }
        }
    });

    // Handle Invites
    client.add_event_handler(|ev: StrippedRoomMemberEvent, room: Room| async move {
        if ev.content.membership != MembershipState::Invite || ev.state_key != room.own_user_id() {
            return;
        }
        tracing::info!("{}", logs::invite_received(room.room_id().as_str()));
        if let Err(e) = room.join().await {
            tracing::error!("{}", logs::join_invite_fail(room.room_id().as_str(), &e.to_string()));
        }
    });

    // 6. Sync Loop
    tracing::info!("{}", logs::SYNC_LOOP_START);
    tokio::select! {
        res = client.sync(SyncSettings::default()) => {
            if let Err(e) = res {
                tracing::error!("{}", logs::sync_loop_fail(&e.to_string()));
                return Err(e.into());
            }
        }
        _ = tokio::signal::ctrl_c() => {
            tracing::info!("{}", logs::SHUTDOWN);
        }
    }

    Ok(())
}

/// Restores a session from the configured access token and checks it with the homeserver.
async fn login(config: &AppConfig) -> Result<Client> {
    let client = Client::builder()
        .homeserver_url(&config.matrix.homeserver)
        .build()
        .await
        .context("Failed to build Matrix client")?;

    let user_id = UserId::parse(config.matrix.user_id.as_str())
        .with_context(|| format!("Invalid Matrix user ID `{}`", config.matrix.user_id))?;
    let session = MatrixSession {
        meta: SessionMeta {
            user_id,
            device_id: OwnedDeviceId::from(config.matrix.device_id.as_str()),
        },
        tokens: SessionTokens {
            access_token: config.matrix.access_token.clone(),
            refresh_token: None,
        },
    };
    client
        .restore_session(session)
        .await
        .context("Failed to restore Matrix session")?;
    client
        .whoami()
        .await
        .context("Homeserver rejected the access token")?;

    Ok(client)
}
