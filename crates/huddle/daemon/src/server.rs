//! Server setup and lifecycle management

use std::sync::Arc;

use huddle_allocator::Allocator;
use huddle_announcer::{Announcer, Watermark};
use huddle_platform::InMemoryPlatform;
use huddle_types::ChannelId;
use tokio::sync::watch;
use tokio::task::JoinHandle;

use crate::config::DaemonConfig;
use crate::console::{spawn_stdin_reader, Console};
use crate::error::DaemonResult;
use crate::handler::PlayHandler;
use crate::replies::Replies;

/// Huddle daemon wired to the in-memory platform
pub struct Server {
    config: DaemonConfig,
    platform: Arc<InMemoryPlatform>,
    handler: Arc<PlayHandler>,
    lobby: ChannelId,
}

impl Server {
    /// Validate the configuration and seed a development guild: the
    /// placement category plus the text channels requests and
    /// announcements use
    pub async fn new(config: DaemonConfig) -> DaemonResult<Self> {
        config.validate()?;

        let platform = Arc::new(InMemoryPlatform::new());
        platform.add_category(&config.placement.category).await;

        let lobby = match config.placement.origin_channel {
            Some(id) => {
                platform.ensure_text_channel(id).await;
                id
            }
            None => platform.add_text_channel().await,
        };
        if let Some(id) = config.announcement_channel() {
            platform.ensure_text_channel(id).await;
        }

        let allocator = Allocator::new(config.placement.clone())?;
        let handler = Arc::new(PlayHandler::new(
            allocator,
            platform.clone(),
            Replies::new(&config.replies),
        ));

        Ok(Self {
            config,
            platform,
            handler,
            lobby,
        })
    }

    pub fn platform(&self) -> &Arc<InMemoryPlatform> {
        &self.platform
    }

    pub fn handler(&self) -> &Arc<PlayHandler> {
        &self.handler
    }

    /// Channel console requests are posted in
    pub fn lobby(&self) -> ChannelId {
        self.lobby
    }

    /// Start the announcer if a channel is configured
    pub fn spawn_announcer(
        &self,
        shutdown: watch::Receiver<bool>,
    ) -> DaemonResult<Option<JoinHandle<Watermark>>> {
        let config = self.config.effective_announcement();
        if config.channel.is_none() {
            tracing::warn!("No announcement channel configured; announcer disabled");
            return Ok(None);
        }

        let announcer = Announcer::new(&config, self.platform.clone())?;
        Ok(Some(announcer.spawn(shutdown)))
    }

    /// Run until the console quits or a shutdown signal arrives
    pub async fn run(self) -> DaemonResult<()> {
        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let announcer = self.spawn_announcer(shutdown_rx)?;

        tracing::info!(
            category = %self.config.placement.category,
            capacity = self.config.placement.capacity,
            can_create = self.config.placement.can_create,
            lobby = %self.lobby,
            "Huddle daemon ready"
        );

        let console = Console::new(self.platform.clone(), self.handler.clone(), self.lobby);

        tokio::select! {
            result = console.run(spawn_stdin_reader()) => result?,
            _ = shutdown_signal() => {}
        }

        tracing::info!("Huddle daemon shutting down");
        if let Err(e) = shutdown_tx.send(true) {
            tracing::warn!("Failed to send shutdown signal: {}", e);
        }

        if let Some(handle) = announcer {
            match handle.await {
                Ok(watermark) => tracing::info!(
                    announcements = watermark.announcements(),
                    "Announcer finished"
                ),
                Err(e) => tracing::error!(error = %e, "Announcer task failed"),
            }
        }

        Ok(())
    }
}

/// Graceful shutdown signal handler
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install signal handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C, initiating graceful shutdown");
        }
        _ = terminate => {
            tracing::info!("Received terminate signal, initiating graceful shutdown");
        }
    }
}
