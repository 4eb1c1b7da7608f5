//! On-demand "current activity" query.
//!
//! A stateless snapshot of what is playing right now; it shares the
//! formatter with the watchers but none of their dedup state.

use crate::data::active_sessions;
use crate::format::{self, RichMessage};
use crate::integrations::MediaGateway;

pub const NOT_CONFIGURED: &str = "The Jellyfin client is not configured. Please check the logs.";
pub const FETCH_FAILED: &str = "Could not retrieve session data from Jellyfin.";
pub const NO_ACTIVE_SESSIONS: &str = "No active playback sessions on the server.";

/// Build the reply for the status command. `gateway` is `None` when the
/// media server is not configured.
pub async fn current_activity(gateway: Option<&dyn MediaGateway>) -> RichMessage {
    let Some(gateway) = gateway else {
        return RichMessage::notice(NOT_CONFIGURED);
    };

    let sessions = match gateway.list_sessions().await {
        Ok(sessions) => sessions,
        Err(e) => {
            tracing::warn!("Status query failed: {}", e);
            return RichMessage::notice(FETCH_FAILED);
        }
    };

    let active = active_sessions(sessions);
    if active.is_empty() {
        return RichMessage::notice(NO_ACTIVE_SESSIONS);
    }

    format::status_report(&active)
}
