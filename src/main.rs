//! # Main Entry Point
//!
//! Wires the layers together:
//! - Domain: Configuration, Types, collaborator Traits
//! - Infrastructure: Matrix, Gist, Clock/Timer
//! - Application: Router, Registry, Dispatch loop, Stores, Votes
//! - Interface: Command Features
//!
//! Every inbound message is parsed by the router and queued; a single dispatch task
//! executes queued commands one at a time.

mod application;
mod domain;
mod infrastructure;
mod interface;
mod strings;
#[cfg(test)]
mod testutil;

use anyhow::{Context, Result};
use clap::Parser;
use matrix_sdk::{
    Client,
    config::SyncSettings,
    room::Room,
    ruma::events::room::{
        member::{MembershipState, StrippedRoomMemberEvent},
        message::{MessageType, SyncRoomMessageEvent},
    },
};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing_appender::non_blocking::WorkerGuard;

use crate::application::dispatch::{Dispatcher, command_queue};
use crate::application::router::CommandRouter;
use crate::application::store::JsonFileStringMap;
use crate::application::vote::VoteBook;
use crate::domain::config::AppConfig;
use crate::domain::traits::{Gist, StringMap};
use crate::domain::types::{ChannelId, UserId};
use crate::infrastructure::gist::GithubGist;
use crate::infrastructure::matrix::MatrixService;
use crate::infrastructure::timer::{SystemClock, TokioTimer};
use crate::interface::commands::{FeatureDeps, build_registry};

#[derive(Debug, clap::Parser)]
#[command(version, about = "Command-driven Matrix bot with per-room votes")]
struct Cli {
    /// Path to the YAML configuration file.
    #[arg(long, default_value = "data/config.yaml")]
    config: PathBuf,

    /// Directory for the session log.
    #[arg(long, default_value = "data")]
    data_dir: PathBuf,
}

fn init_logging(data_dir: &Path) -> Result<WorkerGuard> {
    if !data_dir.exists() {
        std::fs::create_dir_all(data_dir).context("Failed to create data directory")?;
    }

    // Clear previous session log
    let log_path = data_dir.join("session.log");
    if log_path.exists() {
        let _ = std::fs::remove_file(&log_path);
    }

    let file_appender = tracing_appender::rolling::never(data_dir, "session.log");
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        tracing_subscriber::EnvFilter::new(
            "info,matrix_sdk=warn,matrix_sdk_base=warn,matrix_sdk_crypto=error,ruma=warn,hyper=warn",
        )
    });

    let file_layer = tracing_subscriber::fmt::layer()
        .with_writer(non_blocking)
        .with_ansi(false);
    let console_layer = tracing_subscriber::fmt::layer().with_writer(std::io::stdout);

    use tracing_subscriber::layer::SubscriberExt;
    use tracing_subscriber::util::SubscriberInitExt;

    tracing_subscriber::registry()
        .with(env_filter)
        .with(file_layer)
        .with(console_layer)
        .init();

    Ok(guard)
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // 1. Load Configuration
    let config = AppConfig::load(&cli.config)?;

    // 2. Logging Setup
    let _guard = init_logging(&cli.data_dir)?;
    tracing::info!("Starting gavel...");

    // 3. Collaborators
    let commands: Arc<dyn StringMap> =
        Arc::new(JsonFileStringMap::open(&config.storage.commands_path)?);
    let gist: Option<Arc<dyn Gist>> = match &config.gist {
        Some(gist_config) => Some(Arc::new(GithubGist::new(gist_config)?)),
        None => None,
    };
    let (queue, commands_rx) = command_queue(config.dispatch.queue_capacity);

    // 4. Features. Conflicts here are programming errors, so they stop startup.
    let registry = Arc::new(
        build_registry(FeatureDeps {
            commands: commands.clone(),
            votes: Arc::new(VoteBook::new(config.vote.quorum)),
            gist,
            clock: Arc::new(SystemClock),
            timer: Arc::new(TokioTimer::new(queue.clone())),
            vote_duration: config.vote.duration(),
            rick_list: config
                .moderation
                .rick_list
                .iter()
                .map(|u| UserId::new(u.as_str()))
                .collect(),
        })
        .context("Feature registration failed")?,
    );

    // 5. Matrix Setup
    let client = Client::builder()
        .homeserver_url(&config.services.matrix.homeserver)
        .build()
        .await?;

    client
        .matrix_auth()
        .login_username(
            &config.services.matrix.username,
            &config.services.matrix.password,
        )
        .send()
        .await?;

    tracing::info!("Logged in as {}", config.services.matrix.username);

    // 6. Dispatch Loop
    let chat = Arc::new(MatrixService::new(client.clone()));
    let dispatcher = Dispatcher::new(
        registry.clone(),
        chat,
        config.dispatch.executor_timeout(),
    );
    tokio::spawn(dispatcher.run(commands_rx));

    // 7. Event Handlers
    let router = Arc::new(CommandRouter::new(
        registry,
        commands,
        queue,
        config
            .moderation
            .ignored_senders
            .iter()
            .map(|u| UserId::new(u.as_str())),
    ));
    let start_time = std::time::SystemTime::now();

    client.add_event_handler(move |ev: SyncRoomMessageEvent, room: Room| {
        let router = router.clone();
        async move {
            let Some(original_msg) = ev.as_original() else {
                return;
            };

            // Ignore events older than start_time
            let ts = ev.origin_server_ts();
            let event_time =
                std::time::UNIX_EPOCH + std::time::Duration::from_millis(ts.get().into());
            if event_time < start_time {
                return;
            }

            let MessageType::Text(text_content) = &original_msg.content.msgtype else {
                return;
            };
            // Never reply to ourselves.
            if original_msg.sender == room.own_user_id() {
                return;
            }
            tracing::debug!(
                "Received message from {}: {}",
                original_msg.sender,
                text_content.body
            );

            let channel = ChannelId::new(room.room_id().as_str());
            let sender = UserId::new(original_msg.sender.as_str());
            if let Err(e) = router.route(&channel, &text_content.body, &sender).await {
                tracing::error!("Failed to route message: {:#}", e);
            }
        }
    });

    // Handle Invites
    client.add_event_handler(|ev: StrippedRoomMemberEvent, room: Room| async move {
        if ev.content.membership == MembershipState::Invite {
            if let Err(e) = room.join().await {
                tracing::warn!("Failed to join {}: {}", room.room_id(), e);
            }
        }
    });

    // 8. Sync until the process is stopped
    client
        .sync(SyncSettings::default())
        .await
        .context("Matrix sync stopped")?;

    Ok(())
}
