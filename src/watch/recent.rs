//! "Recently added" watcher
//!
//! The first successful fetch only records what is already in the library so
//! that startup does not announce every existing item. After that, each new
//! item id gets exactly one delivery attempt: it is marked announced whether
//! or not the send succeeded.

use super::{SkipReason, TickReport, Watch};
use crate::format;
use crate::integrations::{MediaGateway, Notifier};
use crate::util::WarnOnce;
use async_trait::async_trait;
use std::collections::HashSet;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Baseline {
    /// No successful fetch yet; the next one seeds the announced set
    #[default]
    Uninitialized,
    Baselined,
}

#[derive(Debug, Default)]
pub struct RecentWatch {
    user_id: Option<String>,
    announced: HashSet<String>,
    baseline: Baseline,
    channel_warning: WarnOnce,
    config_warning: WarnOnce,
}

impl RecentWatch {
    /// `user_id` selects whose library view the latest items come from
    pub fn new(user_id: Option<String>) -> Self {
        Self {
            user_id,
            ..Self::default()
        }
    }

    pub fn announced(&self) -> &HashSet<String> {
        &self.announced
    }

    pub fn baseline(&self) -> Baseline {
        self.baseline
    }
}

#[async_trait]
impl Watch for RecentWatch {
    fn name(&self) -> &'static str {
        "recently-added"
    }

    async fn tick(&mut self, gateway: &dyn MediaGateway, notifier: &dyn Notifier) -> TickReport {
        if let Err(e) = notifier.ready().await {
            self.channel_warning
                .warn(format_args!("Cannot send recently added notifications: {}", e));
            return TickReport::Skipped(SkipReason::ChannelUnavailable);
        }
        if self.channel_warning.is_active() {
            tracing::info!("Notification channel available again, resuming recently added checks");
            self.channel_warning.clear();
        }

        let items = match gateway.list_latest_items(self.user_id.as_deref()).await {
            Ok(items) => items,
            Err(e) if e.is_configuration() => {
                self.config_warning.warn(format_args!("{}", e));
                return TickReport::Skipped(SkipReason::NotConfigured);
            }
            Err(e) => {
                tracing::warn!("Failed to fetch latest Jellyfin items: {}", e);
                return TickReport::Skipped(SkipReason::FetchFailed);
            }
        };
        self.config_warning.clear();

        if items.is_empty() {
            tracing::debug!("No recently added items returned");
            return TickReport::Skipped(SkipReason::Empty);
        }

        if self.baseline == Baseline::Uninitialized {
            self.announced = items.into_iter().map(|item| item.id).collect();
            self.baseline = Baseline::Baselined;
            tracing::info!(
                "Initial scan complete. Found {} recent items.",
                self.announced.len()
            );
            return TickReport::Baselined {
                seeded: self.announced.len(),
            };
        }

        let fetched = items.len();
        let mut notified = 0;
        let mut failed = 0;

        for item in &items {
            // insert() doubles as the membership test and the at-most-once mark
            if !self.announced.insert(item.id.clone()) {
                continue;
            }

            let message = format::recently_added(item, |id, kind| gateway.image_url(id, kind));
            match notifier.send(&message).await {
                Ok(()) => {
                    tracing::info!(item = %item.id, "{}", message.headline);
                    notified += 1;
                }
                Err(e) => {
                    tracing::warn!(
                        "Error sending 'recently added' notification for item {}: {}",
                        item.id,
                        e
                    );
                    failed += 1;
                }
            }
        }

        TickReport::Processed {
            seen: fetched,
            notified,
            failed,
        }
    }
}
