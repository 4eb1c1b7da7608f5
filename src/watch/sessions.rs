//! "Now playing" watcher
//!
//! Diffs the server's active sessions against the set of sessions already
//! announced. Ids that disappear from a successful poll are pruned, so a
//! session that comes back is announced again. Failed deliveries leave the id
//! untracked and are retried on the next tick.

use super::{SkipReason, TickReport, Watch};
use crate::data::active_sessions;
use crate::format;
use crate::integrations::{MediaGateway, Notifier};
use crate::util::WarnOnce;
use async_trait::async_trait;
use std::collections::HashSet;

#[derive(Debug, Default)]
pub struct SessionWatch {
    notified: HashSet<String>,
    channel_warning: WarnOnce,
}

impl SessionWatch {
    pub fn new() -> Self {
        Self::default()
    }

    /// Session ids announced and still present at the last successful poll
    pub fn notified(&self) -> &HashSet<String> {
        &self.notified
    }
}

#[async_trait]
impl Watch for SessionWatch {
    fn name(&self) -> &'static str {
        "sessions"
    }

    async fn tick(&mut self, gateway: &dyn MediaGateway, notifier: &dyn Notifier) -> TickReport {
        if let Err(e) = notifier.ready().await {
            self.channel_warning
                .warn(format_args!("Cannot send session notifications: {}", e));
            return TickReport::Skipped(SkipReason::ChannelUnavailable);
        }
        if self.channel_warning.is_active() {
            tracing::info!("Notification channel available again, resuming session checks");
            self.channel_warning.clear();
        }

        let sessions = match gateway.list_sessions().await {
            Ok(sessions) => sessions,
            Err(e) => {
                tracing::warn!("Failed to fetch Jellyfin sessions: {}", e);
                return TickReport::Skipped(SkipReason::FetchFailed);
            }
        };

        let active = active_sessions(sessions);
        let current_ids: HashSet<&str> = active.iter().map(|s| s.id.as_str()).collect();

        let mut notified = 0;
        let mut failed = 0;

        for session in &active {
            if self.notified.contains(&session.id) {
                continue;
            }

            let message = format::now_playing(session, |id, kind| gateway.image_url(id, kind));
            match notifier.send(&message).await {
                Ok(()) => {
                    tracing::info!(session = %session.id, "{}", message.headline);
                    self.notified.insert(session.id.clone());
                    notified += 1;
                }
                Err(e) => {
                    tracing::warn!("Error sending notification for session {}: {}", session.id, e);
                    failed += 1;
                }
            }
        }

        self.notified.retain(|id| current_ids.contains(id.as_str()));

        TickReport::Processed {
            seen: active.len(),
            notified,
            failed,
        }
    }
}
