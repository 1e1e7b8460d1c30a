//! Periodic announcer.
//!
//! Sleeps for the configured interval, counts the messages posted to the
//! target channel since the last announcement, and posts the announcement
//! again once the count reaches the threshold. Failures are logged and the
//! next interval retries; nothing propagates out of the loop.

use std::sync::Arc;
use std::time::Duration;

use huddle_platform::ActivityFeed;
use huddle_types::{ChannelId, MessageId};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, instrument, warn};

use crate::config::AnnouncementConfig;
use crate::error::{AnnouncerError, AnnouncerResult};
use crate::watermark::Watermark;

/// Phase of the announcer loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnnouncerState {
    /// Waiting for the interval to elapse.
    Idle,
    /// Querying activity and possibly announcing.
    Checking,
}

/// Result of one activity check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CheckOutcome {
    /// Threshold reached; the announcement was posted as `message`.
    Announced { message: MessageId, activity: u64 },
    /// Not enough activity since the last announcement.
    BelowThreshold { activity: u64 },
    /// Shutdown was requested before the announcement went out; `activity`
    /// is `None` when the query itself was abandoned.
    Cancelled { activity: Option<u64> },
}

/// Background loop re-posting onboarding instructions.
pub struct Announcer {
    feed: Arc<dyn ActivityFeed>,
    channel: ChannelId,
    text: String,
    interval: Duration,
    threshold: u64,
    watermark: Watermark,
    state: AnnouncerState,
}

impl Announcer {
    /// Create an announcer from a validated config with a channel set.
    pub fn new(config: &AnnouncementConfig, feed: Arc<dyn ActivityFeed>) -> AnnouncerResult<Self> {
        config.validate()?;
        let channel = config.channel.ok_or(AnnouncerError::MissingChannel)?;

        Ok(Self {
            feed,
            channel,
            text: config.text.clone(),
            interval: config.interval(),
            threshold: config.effective_threshold(),
            watermark: Watermark::genesis(),
            state: AnnouncerState::Idle,
        })
    }

    pub fn channel(&self) -> ChannelId {
        self.channel
    }

    pub fn state(&self) -> AnnouncerState {
        self.state
    }

    pub fn watermark(&self) -> &Watermark {
        &self.watermark
    }

    /// Run a single check immediately.
    pub async fn check_once(&mut self) -> AnnouncerResult<CheckOutcome> {
        self.check(None).await
    }

    async fn check(
        &mut self,
        shutdown: Option<&mut watch::Receiver<bool>>,
    ) -> AnnouncerResult<CheckOutcome> {
        self.state = AnnouncerState::Checking;
        let outcome = self.check_inner(shutdown).await;
        self.state = AnnouncerState::Idle;
        outcome
    }

    /// Shutdown abandons a pending activity query and is checked again
    /// before posting; a post already under way is awaited.
    async fn check_inner(
        &mut self,
        mut shutdown: Option<&mut watch::Receiver<bool>>,
    ) -> AnnouncerResult<CheckOutcome> {
        let query = self
            .feed
            .query_recent_activity(&self.channel, self.watermark.last_message());

        let activity = match shutdown.as_deref_mut() {
            Some(rx) => tokio::select! {
                biased;
                _ = shutdown_requested(rx) => {
                    return Ok(CheckOutcome::Cancelled { activity: None });
                }
                activity = query => activity?,
            },
            None => query.await?,
        };

        if activity < self.threshold {
            debug!(
                channel = %self.channel,
                activity,
                threshold = self.threshold,
                "Activity below threshold"
            );
            return Ok(CheckOutcome::BelowThreshold { activity });
        }

        if shutdown.is_some_and(|rx| *rx.borrow()) {
            return Ok(CheckOutcome::Cancelled {
                activity: Some(activity),
            });
        }

        let message = self
            .feed
            .send_channel_message(&self.channel, &self.text)
            .await?;

        if !self.watermark.advance(message) {
            warn!(
                channel = %self.channel,
                message_id = %message,
                "Announcement id is not newer than the watermark"
            );
            return Err(AnnouncerError::StaleAnnouncement {
                message,
                watermark: self.watermark.last_message(),
            });
        }

        info!(
            channel = %self.channel,
            message_id = %message,
            activity,
            "Posted announcement"
        );
        Ok(CheckOutcome::Announced { message, activity })
    }

    /// Run until `shutdown` flips to `true` or its sender is dropped.
    ///
    /// The loop starts idle, so the first check happens one interval after
    /// start. Shutdown interrupts the sleep or a pending activity query and
    /// is honored before posting; an announcement already being sent is
    /// never cut short.
    #[instrument(skip_all, fields(channel = %self.channel))]
    pub async fn run(mut self, mut shutdown: watch::Receiver<bool>) -> Watermark {
        info!(
            interval_secs = self.interval.as_secs(),
            threshold = self.threshold,
            "Announcer started"
        );

        loop {
            tokio::select! {
                biased;
                _ = shutdown_requested(&mut shutdown) => break,
                _ = tokio::time::sleep(self.interval) => {}
            }

            match self.check(Some(&mut shutdown)).await {
                Ok(CheckOutcome::Cancelled { .. }) => break,
                Ok(_) => {}
                Err(e) => {
                    error!(error = %e, "Announcement check failed");
                }
            }
        }

        info!(
            announcements = self.watermark.announcements(),
            "Announcer stopped"
        );
        self.watermark
    }

    /// Spawn [`Announcer::run`] on the current runtime.
    pub fn spawn(self, shutdown: watch::Receiver<bool>) -> JoinHandle<Watermark> {
        tokio::spawn(self.run(shutdown))
    }
}

/// Resolves once shutdown is signalled or can no longer be signalled.
async fn shutdown_requested(shutdown: &mut watch::Receiver<bool>) {
    while !*shutdown.borrow_and_update() {
        if shutdown.changed().await.is_err() {
            return;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use async_trait::async_trait;
    use huddle_platform::{InMemoryPlatform, PlatformResult};

    async fn lobby_with_history(messages: usize) -> (Arc<InMemoryPlatform>, ChannelId) {
        let platform = Arc::new(InMemoryPlatform::new());
        let lobby = platform.add_text_channel().await;
        let alice = platform.register_member("alice").await;
        for i in 0..messages {
            platform
                .post(&lobby, Some(alice.id), &format!("msg {}", i))
                .await
                .unwrap();
        }
        (platform, lobby)
    }

    fn announcer(platform: &Arc<InMemoryPlatform>, lobby: ChannelId, threshold: u64) -> Announcer {
        let config = AnnouncementConfig::for_channel(lobby)
            .with_interval_secs(60)
            .with_threshold(threshold)
            .with_text("use $play");
        Announcer::new(&config, platform.clone()).unwrap()
    }

    #[test]
    fn test_new_requires_channel() {
        let platform: Arc<dyn ActivityFeed> = Arc::new(InMemoryPlatform::new());
        let result = Announcer::new(&AnnouncementConfig::default(), platform);
        assert!(matches!(result, Err(AnnouncerError::MissingChannel)));
    }

    #[tokio::test]
    async fn test_first_check_counts_whole_history() {
        let (platform, lobby) = lobby_with_history(3).await;
        let mut announcer = announcer(&platform, lobby, 3);

        let outcome = announcer.check_once().await.unwrap();
        assert!(matches!(outcome, CheckOutcome::Announced { activity: 3, .. }));
        assert_eq!(announcer.state(), AnnouncerState::Idle);

        let history = platform.channel_messages(&lobby).await.unwrap();
        assert_eq!(history.last().unwrap().text, "use $play");
    }

    #[tokio::test]
    async fn test_below_threshold_keeps_watermark() {
        let (platform, lobby) = lobby_with_history(2).await;
        let mut announcer = announcer(&platform, lobby, 3);

        let outcome = announcer.check_once().await.unwrap();
        assert_eq!(outcome, CheckOutcome::BelowThreshold { activity: 2 });
        assert_eq!(announcer.watermark(), &Watermark::genesis());
    }

    #[tokio::test]
    async fn test_own_announcement_is_not_activity() {
        let (platform, lobby) = lobby_with_history(1).await;
        let mut announcer = announcer(&platform, lobby, 1);

        assert!(matches!(
            announcer.check_once().await.unwrap(),
            CheckOutcome::Announced { .. }
        ));
        assert_eq!(
            announcer.check_once().await.unwrap(),
            CheckOutcome::BelowThreshold { activity: 0 }
        );
    }

    #[tokio::test]
    async fn test_failed_query_returns_to_idle() {
        let (platform, lobby) = lobby_with_history(5).await;
        let mut announcer = announcer(&platform, lobby, 1);

        platform.fail_activity(true);
        assert!(matches!(
            announcer.check_once().await,
            Err(AnnouncerError::Platform(_))
        ));
        assert_eq!(announcer.state(), AnnouncerState::Idle);
        assert_eq!(announcer.watermark().announcements(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_run_announces_after_interval() {
        let (platform, lobby) = lobby_with_history(3).await;
        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let handle = announcer(&platform, lobby, 3).spawn(shutdown_rx);

        tokio::time::sleep(Duration::from_secs(30)).await;
        assert_eq!(platform.channel_messages(&lobby).await.unwrap().len(), 3);

        tokio::time::sleep(Duration::from_secs(31)).await;
        assert_eq!(platform.channel_messages(&lobby).await.unwrap().len(), 4);

        shutdown_tx.send(true).unwrap();
        let watermark = handle.await.unwrap();
        assert_eq!(watermark.announcements(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_run_survives_failures() {
        let (platform, lobby) = lobby_with_history(3).await;
        let (shutdown_tx, shutdown_rx) = watch::channel(false);

        platform.fail_activity(true);
        let handle = announcer(&platform, lobby, 3).spawn(shutdown_rx);

        tokio::time::sleep(Duration::from_secs(125)).await;
        assert_eq!(platform.channel_messages(&lobby).await.unwrap().len(), 3);

        platform.fail_activity(false);
        tokio::time::sleep(Duration::from_secs(60)).await;
        assert_eq!(platform.channel_messages(&lobby).await.unwrap().len(), 4);

        shutdown_tx.send(true).unwrap();
        assert_eq!(handle.await.unwrap().announcements(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_shutdown_interrupts_sleep() {
        let (platform, lobby) = lobby_with_history(10).await;
        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let handle = announcer(&platform, lobby, 1).spawn(shutdown_rx);

        tokio::time::sleep(Duration::from_secs(10)).await;
        shutdown_tx.send(true).unwrap();

        let watermark = handle.await.unwrap();
        assert_eq!(watermark.announcements(), 0);
        assert_eq!(platform.channel_messages(&lobby).await.unwrap().len(), 10);
    }

    #[tokio::test(start_paused = true)]
    async fn test_dropped_sender_stops_loop() {
        let (platform, lobby) = lobby_with_history(0).await;
        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let handle = announcer(&platform, lobby, 1).spawn(shutdown_rx);

        drop(shutdown_tx);
        assert_eq!(handle.await.unwrap(), Watermark::genesis());
    }

    /// Feed with canned answers for the paths the in-memory platform
    /// cannot reach.
    struct ScriptedFeed {
        activity: u64,
        hang: bool,
        raise_shutdown: Option<watch::Sender<bool>>,
        reply: MessageId,
        posts: AtomicUsize,
    }

    impl ScriptedFeed {
        fn new(activity: u64) -> Self {
            Self {
                activity,
                hang: false,
                raise_shutdown: None,
                reply: MessageId::new(1),
                posts: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl ActivityFeed for ScriptedFeed {
        async fn query_recent_activity(
            &self,
            _channel: &ChannelId,
            _since: Option<MessageId>,
        ) -> PlatformResult<u64> {
            if self.hang {
                std::future::pending::<()>().await;
            }
            if let Some(tx) = &self.raise_shutdown {
                let _ = tx.send(true);
            }
            Ok(self.activity)
        }

        async fn send_channel_message(
            &self,
            _channel: &ChannelId,
            _text: &str,
        ) -> PlatformResult<MessageId> {
            self.posts.fetch_add(1, Ordering::SeqCst);
            Ok(self.reply)
        }
    }

    fn scripted(feed: &Arc<ScriptedFeed>) -> Announcer {
        let config = AnnouncementConfig::for_channel(ChannelId::new(1))
            .with_interval_secs(60)
            .with_threshold(1);
        Announcer::new(&config, feed.clone()).unwrap()
    }

    #[tokio::test]
    async fn test_cancelled_check_does_not_post() {
        let (platform, lobby) = lobby_with_history(4).await;
        let mut announcer = announcer(&platform, lobby, 1);
        let (_tx, mut rx) = watch::channel(true);

        let outcome = announcer.check(Some(&mut rx)).await.unwrap();
        assert_eq!(outcome, CheckOutcome::Cancelled { activity: None });
        assert_eq!(platform.channel_messages(&lobby).await.unwrap().len(), 4);
    }

    #[tokio::test]
    async fn test_shutdown_during_query_skips_post() {
        let (tx, mut rx) = watch::channel(false);
        let feed = Arc::new(ScriptedFeed {
            raise_shutdown: Some(tx),
            ..ScriptedFeed::new(5)
        });
        let mut announcer = scripted(&feed);

        let outcome = announcer.check(Some(&mut rx)).await.unwrap();
        assert_eq!(outcome, CheckOutcome::Cancelled { activity: Some(5) });
        assert_eq!(feed.posts.load(Ordering::SeqCst), 0);
        assert_eq!(announcer.state(), AnnouncerState::Idle);
    }

    #[tokio::test(start_paused = true)]
    async fn test_shutdown_abandons_stalled_query() {
        let feed = Arc::new(ScriptedFeed {
            hang: true,
            ..ScriptedFeed::new(5)
        });
        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let handle = scripted(&feed).spawn(shutdown_rx);

        tokio::time::sleep(Duration::from_secs(61)).await;
        shutdown_tx.send(true).unwrap();

        let watermark = tokio::time::timeout(Duration::from_secs(3600), handle)
            .await
            .expect("announcer did not stop")
            .unwrap();
        assert_eq!(watermark, Watermark::genesis());
        assert_eq!(feed.posts.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_stale_announcement_id_is_an_error() {
        let feed = Arc::new(ScriptedFeed::new(5));
        let mut announcer = scripted(&feed);

        assert!(matches!(
            announcer.check_once().await.unwrap(),
            CheckOutcome::Announced { .. }
        ));
        assert!(matches!(
            announcer.check_once().await,
            Err(AnnouncerError::StaleAnnouncement { .. })
        ));
        assert_eq!(announcer.watermark().announcements(), 1);
        assert_eq!(feed.posts.load(Ordering::SeqCst), 2);
    }
}
