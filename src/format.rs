//! Notification formatting
//!
//! Pure mapping from sessions and items to [`RichMessage`]s. Missing fields
//! fall back to placeholder text rather than failing.

use crate::data::{Item, Session};
use serde::Serialize;

const UNKNOWN_TITLE: &str = "Unknown Title";
const UNKNOWN_USER: &str = "Unknown User";
const UNKNOWN_SERIES: &str = "Unknown Series";
const GENERIC_TYPE: &str = "Item";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum MessageKind {
    NowPlaying,
    RecentlyAdded,
    Status,
    /// Plain informational or error reply
    Notice,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Field {
    pub name: String,
    pub value: String,
}

/// Channel-agnostic rich message; notifiers decide how to render it
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RichMessage {
    pub kind: MessageKind,
    pub headline: String,
    pub detail: Option<String>,
    pub fields: Vec<Field>,
    pub footer: Option<String>,
    pub thumbnail: Option<String>,
    pub image: Option<String>,
}

impl RichMessage {
    pub fn new(kind: MessageKind, headline: impl Into<String>) -> Self {
        Self {
            kind,
            headline: headline.into(),
            detail: None,
            fields: Vec::new(),
            footer: None,
            thumbnail: None,
            image: None,
        }
    }

    pub fn notice(text: impl Into<String>) -> Self {
        Self::new(MessageKind::Notice, text)
    }

    /// Plain-text rendering for terminals and logs
    pub fn to_plain_text(&self) -> String {
        let mut out = self.headline.clone();
        if let Some(detail) = &self.detail {
            out.push('\n');
            out.push_str(detail);
        }
        for field in &self.fields {
            out.push_str(&format!("\n{}\n  {}", field.name, field.value));
        }
        if let Some(footer) = &self.footer {
            out.push_str("\n\n");
            out.push_str(footer);
        }
        out
    }
}

/// "Now playing" message for a session with an active item.
///
/// `image_url` maps `(item_id, image_type)` to an artwork URL.
pub fn now_playing<F>(session: &Session, image_url: F) -> RichMessage
where
    F: Fn(&str, &str) -> String,
{
    let item = session.now_playing_item.clone().unwrap_or_default();
    let title = item.name.as_deref().unwrap_or(UNKNOWN_TITLE);
    let user = session.user_name.as_deref().unwrap_or(UNKNOWN_USER);

    let detail = item.episode_series().map(|series| {
        match item.season_name.as_deref().filter(|s| !s.is_empty()) {
            Some(season) => format!("From {} - {}", series, season),
            None => format!("From {}", series),
        }
    });

    RichMessage {
        detail,
        footer: Some(format!("{} started watching.", user)),
        thumbnail: Some(image_url(&item.id, "Primary")),
        ..RichMessage::new(MessageKind::NowPlaying, format!("Now Playing: {}", title))
    }
}

/// "Recently added" message for a new library item
pub fn recently_added<F>(item: &Item, image_url: F) -> RichMessage
where
    F: Fn(&str, &str) -> String,
{
    let title = item.name.as_deref().unwrap_or(UNKNOWN_TITLE);
    let kind = item.kind.as_deref().unwrap_or(GENERIC_TYPE);

    RichMessage {
        detail: item.episode_series().map(|series| format!("Series: {}", series)),
        footer: Some("Recently added to the library.".to_string()),
        image: Some(image_url(&item.id, "Primary")),
        ..RichMessage::new(
            MessageKind::RecentlyAdded,
            format!("New {} Added: {}", kind, title),
        )
    }
}

/// One line describing what a session is watching
pub fn watching_line(item: &Item) -> String {
    let title = item.name.as_deref().unwrap_or(UNKNOWN_TITLE);
    let kind = item.kind.as_deref().unwrap_or(GENERIC_TYPE);

    if item.is_episode() {
        let series = item.series_name.as_deref().unwrap_or(UNKNOWN_SERIES);
        format!("Watching: {} - {}", series, title)
    } else {
        format!("Watching: {} ({})", title, kind)
    }
}

/// Snapshot of server activity; `sessions` must already be filtered to
/// active ones and be non-empty
pub fn status_report(sessions: &[Session]) -> RichMessage {
    let fields = sessions
        .iter()
        .filter_map(|session| {
            let item = session.now_playing_item.as_ref()?;
            Some(Field {
                name: session
                    .user_name
                    .clone()
                    .unwrap_or_else(|| UNKNOWN_USER.to_string()),
                value: watching_line(item),
            })
        })
        .collect::<Vec<_>>();

    RichMessage {
        footer: Some(format!("Total Active Sessions: {}", fields.len())),
        fields,
        ..RichMessage::new(MessageKind::Status, "Jellyfin Server Activity")
    }
}
