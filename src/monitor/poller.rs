//! Periodic bot status polling.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, warn};

use crate::client::BotApi;
use crate::error::ApiError;
use crate::metrics;

use super::status::{BotStatus, StatusBoard};

/// Fetches bot status into a [`StatusBoard`].
///
/// The interval loop and manual refreshes share one request slot. A refresh
/// that arrives while a fetch is in flight joins it, unless a start/stop
/// action landed after that fetch was sent. In that case the refresh waits
/// for the slot and asks the bot again.
#[derive(Debug)]
pub struct StatusPoller<A> {
    api: Arc<A>,
    board: Arc<StatusBoard>,
    in_flight: Mutex<()>,
    /// Board epoch the in-flight fetch started at.
    in_flight_epoch: AtomicU64,
}

impl<A: BotApi> StatusPoller<A> {
    /// Create a poller publishing to `board`.
    pub fn new(api: Arc<A>, board: Arc<StatusBoard>) -> Self {
        Self {
            api,
            board,
            in_flight: Mutex::new(()),
            in_flight_epoch: AtomicU64::new(0),
        }
    }

    /// Board this poller publishes to.
    pub fn board(&self) -> &Arc<StatusBoard> {
        &self.board
    }

    /// Fetch status now and publish it.
    ///
    /// Errors are logged and counted, never returned: the board keeps its
    /// last value. Returns the status on display afterwards.
    pub async fn refresh(&self) -> BotStatus {
        let wanted = self.board.epoch();
        let _slot = match self.in_flight.try_lock() {
            Ok(slot) => slot,
            Err(_) if self.in_flight_epoch.load(Ordering::SeqCst) == wanted => {
                debug!("Status fetch already in flight, joining it");
                let slot = self.in_flight.lock().await;
                if self.board.epoch() == wanted {
                    return self.board.current();
                }
                // The joined fetch was discarded.
                slot
            }
            Err(_) => {
                debug!("In-flight status fetch predates the last action, waiting for it");
                self.in_flight.lock().await
            }
        };

        let started_at = self.board.epoch();
        self.in_flight_epoch.store(started_at, Ordering::SeqCst);
        if let Err(e) = self.fetch(started_at).await {
            metrics::inc_poll_failures();
            warn!(error = %e, "Failed to check bot status");
        }
        self.board.current()
    }

    async fn fetch(&self, started_at: u64) -> Result<(), ApiError> {
        let response = self.api.bot_status().await?;
        let status = BotStatus::from(response);
        if !self.board.apply_poll(started_at, status) {
            debug!(%status, "Discarding status poll superseded by an action");
        }
        Ok(())
    }

    /// Poll immediately and then every `interval` until the handle is dropped.
    pub fn spawn(self: &Arc<Self>, interval: Duration) -> PollerHandle {
        let poller = Arc::clone(self);
        let handle = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                // First tick completes immediately.
                ticker.tick().await;
                poller.refresh().await;
            }
        });
        PollerHandle {
            handle: Some(handle),
        }
    }

    /// Refresh once after `delay`, in the background.
    pub fn refresh_after(self: &Arc<Self>, delay: Duration) -> JoinHandle<()> {
        let poller = Arc::clone(self);
        tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            poller.refresh().await;
        })
    }
}

/// Running poll loop. Dropping the handle stops polling.
#[derive(Debug)]
pub struct PollerHandle {
    handle: Option<JoinHandle<()>>,
}

impl PollerHandle {
    /// Stop polling.
    pub fn stop(mut self) {
        self.abort();
    }

    /// Whether the poll loop is still running.
    pub fn is_running(&self) -> bool {
        self.handle.as_ref().map(|h| !h.is_finished()).unwrap_or(false)
    }

    fn abort(&mut self) {
        if let Some(handle) = self.handle.take() {
            handle.abort();
            debug!("Status polling stopped");
        }
    }
}

impl Drop for PollerHandle {
    fn drop(&mut self) {
        self.abort();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::{Endpoint, MockBotApi};

    fn poller(api: MockBotApi) -> Arc<StatusPoller<MockBotApi>> {
        Arc::new(StatusPoller::new(Arc::new(api), Arc::new(StatusBoard::new())))
    }

    #[tokio::test]
    async fn refresh_publishes_running_pid() {
        let api = MockBotApi::new().with_running(1234);
        let poller = poller(api);
        let status = poller.refresh().await;
        assert_eq!(status, BotStatus::Running { pid: Some(1234) });
        assert_eq!(status.to_string(), "Bot Running (PID: 1234)");
    }

    #[tokio::test]
    async fn poll_errors_keep_last_status() {
        let api = MockBotApi::new().with_running(5);
        let poller = poller(api.clone());
        poller.refresh().await;

        api.fail(Endpoint::BotStatus, 503);
        let status = poller.refresh().await;
        assert_eq!(status, BotStatus::Running { pid: Some(5) });
    }

    #[tokio::test]
    async fn concurrent_refreshes_share_one_request() {
        let api = MockBotApi::new().with_running(9);
        api.delay(Endpoint::BotStatus, Duration::from_millis(50));
        let poller = poller(api.clone());

        let (a, b, c) = tokio::join!(poller.refresh(), poller.refresh(), poller.refresh());
        assert_eq!(api.calls(Endpoint::BotStatus), 1);
        assert_eq!(a, b);
        assert_eq!(b, c);
    }

    #[tokio::test(start_paused = true)]
    async fn refresh_after_an_action_sends_its_own_request() {
        let api = MockBotApi::new();
        api.delay(Endpoint::BotStatus, Duration::from_millis(100));
        let poller = poller(api.clone());

        let (first, second) = tokio::join!(poller.refresh(), async {
            tokio::time::sleep(Duration::from_millis(10)).await;
            poller.board().apply_action(BotStatus::Running { pid: Some(3) });
            poller.refresh().await
        });
        assert_eq!(api.calls(Endpoint::BotStatus), 2);
        // The first fetch was superseded; the second reports the real state.
        assert_eq!(first, BotStatus::Running { pid: Some(3) });
        assert_eq!(second, BotStatus::Stopped);
    }

    #[tokio::test(start_paused = true)]
    async fn spawn_polls_immediately_then_on_interval() {
        let api = MockBotApi::new();
        let poller = poller(api.clone());

        let handle = poller.spawn(Duration::from_secs(5));
        tokio::time::sleep(Duration::from_millis(10)).await;
        assert_eq!(api.calls(Endpoint::BotStatus), 1);

        tokio::time::sleep(Duration::from_secs(5)).await;
        assert_eq!(api.calls(Endpoint::BotStatus), 2);

        handle.stop();
        tokio::time::sleep(Duration::from_secs(20)).await;
        assert_eq!(api.calls(Endpoint::BotStatus), 2);
    }
}
