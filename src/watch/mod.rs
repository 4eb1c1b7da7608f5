//! Polling watchers and their scheduler
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                         Scheduler                             │
//! │  ┌──────────────────────┐      ┌──────────────────────────┐  │
//! │  │ task: SessionWatch   │      │ task: RecentWatch        │  │
//! │  │ every 10s            │      │ every 30min              │  │
//! │  └──────────┬───────────┘      └────────────┬─────────────┘  │
//! │             │   &dyn MediaGateway            │                │
//! │             └──────────────┬─────────────────┘                │
//! │                            │   &dyn Notifier                  │
//! └────────────────────────────┴─────────────────────────────────┘
//! ```
//!
//! Each watcher is owned by exactly one task and ticks sequentially, so a
//! slow tick can never overlap the next one of the same watcher.

pub mod recent;
pub mod sessions;

pub use recent::{Baseline, RecentWatch};
pub use sessions::SessionWatch;

use crate::config::PollingConfig;
use crate::integrations::{MediaGateway, Notifier};
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

/// Why a tick did nothing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// Notification destination missing or unreachable
    ChannelUnavailable,
    /// Required gateway settings (e.g. user id) are missing
    NotConfigured,
    FetchFailed,
    /// Upstream returned nothing to diff against
    Empty,
}

/// Result of one tick, for logging and tests
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickReport {
    Skipped(SkipReason),
    /// First successful fetch recorded `seeded` ids without notifying
    Baselined { seeded: usize },
    Processed {
        /// Records considered this tick (active sessions / fetched items)
        seen: usize,
        notified: usize,
        failed: usize,
    },
}

impl std::fmt::Display for TickReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Skipped(reason) => write!(f, "skipped ({:?})", reason),
            Self::Baselined { seeded } => write!(f, "baseline recorded {} items", seeded),
            Self::Processed {
                seen,
                notified,
                failed,
            } => write!(f, "{} seen, {} notified, {} failed", seen, notified, failed),
        }
    }
}

/// A recurring job whose tick diffs upstream state against what it has
/// already announced
#[async_trait]
pub trait Watch: Send {
    fn name(&self) -> &'static str;

    async fn tick(&mut self, gateway: &dyn MediaGateway, notifier: &dyn Notifier) -> TickReport;
}

/// Owns both watchers and drives each on its own interval
pub struct Scheduler {
    gateway: Arc<dyn MediaGateway>,
    notifier: Arc<dyn Notifier>,
    sessions_interval: Duration,
    recent_interval: Duration,
    sessions: SessionWatch,
    recent: RecentWatch,
}

/// Running watcher tasks; dropping this does not stop them
pub struct WatchHandles {
    pub sessions: JoinHandle<()>,
    pub recent: JoinHandle<()>,
}

impl WatchHandles {
    pub fn abort(&self) {
        self.sessions.abort();
        self.recent.abort();
    }
}

impl Scheduler {
    pub fn new(
        gateway: Arc<dyn MediaGateway>,
        notifier: Arc<dyn Notifier>,
        polling: &PollingConfig,
        user_id: Option<String>,
    ) -> Self {
        Self {
            gateway,
            notifier,
            sessions_interval: Duration::from_secs(polling.sessions_interval_secs.max(1)),
            recent_interval: Duration::from_secs(polling.recently_added_interval_secs.max(1)),
            sessions: SessionWatch::new(),
            recent: RecentWatch::new(user_id),
        }
    }

    /// Run one tick of each watcher, sessions first
    pub async fn tick_once(&mut self) -> (TickReport, TickReport) {
        let sessions = self
            .sessions
            .tick(self.gateway.as_ref(), self.notifier.as_ref())
            .await;
        let recent = self
            .recent
            .tick(self.gateway.as_ref(), self.notifier.as_ref())
            .await;
        (sessions, recent)
    }

    /// Spawn both watchers onto the runtime. The first tick of each runs
    /// immediately.
    pub fn spawn(self) -> WatchHandles {
        tracing::info!(
            "Watching sessions every {:?}, recently added items every {:?}",
            self.sessions_interval,
            self.recent_interval
        );

        let sessions = tokio::spawn(run_periodic(
            self.sessions,
            self.sessions_interval,
            Arc::clone(&self.gateway),
            Arc::clone(&self.notifier),
        ));
        let recent = tokio::spawn(run_periodic(
            self.recent,
            self.recent_interval,
            self.gateway,
            self.notifier,
        ));

        WatchHandles { sessions, recent }
    }
}

/// Tick `watch` forever at `period`. When a tick overruns, the missed slots
/// are skipped instead of firing a burst of catch-up ticks.
pub async fn run_periodic<W: Watch + 'static>(
    mut watch: W,
    period: Duration,
    gateway: Arc<dyn MediaGateway>,
    notifier: Arc<dyn Notifier>,
) {
    let mut interval = tokio::time::interval(period);
    interval.set_missed_tick_behavior(MissedTickBehavior::Skip);

    loop {
        interval.tick().await;

        let report = watch.tick(gateway.as_ref(), notifier.as_ref()).await;
        match report {
            TickReport::Processed { notified: 0, failed: 0, .. } | TickReport::Skipped(_) => {
                tracing::debug!(watch = watch.name(), "tick: {}", report)
            }
            _ => tracing::info!(watch = watch.name(), "tick: {}", report),
        }
    }
}
