use serde::{Deserialize, Serialize};

/// Jellyfin item type for episodes. Other types (`Movie`, `Audio`, ...) are
/// passed through verbatim.
pub const EPISODE: &str = "Episode";

/// An active (or recently active) playback instance on the media server
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Session {
    pub id: String,
    #[serde(default)]
    pub user_name: Option<String>,
    #[serde(default)]
    pub now_playing_item: Option<Item>,
}

impl Session {
    /// Sessions without a now-playing item carry no media and are ignored.
    /// Jellyfin sometimes reports `"NowPlayingItem": {}`; an item without an
    /// id counts as absent.
    pub fn is_playing(&self) -> bool {
        self.now_playing_item
            .as_ref()
            .is_some_and(|item| !item.id.is_empty())
    }
}

/// A unit of media content: a library entry or the item a session is playing
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Item {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default, rename = "Type")]
    pub kind: Option<String>,
    #[serde(default)]
    pub series_name: Option<String>,
    #[serde(default)]
    pub season_name: Option<String>,
}

impl Item {
    pub fn is_episode(&self) -> bool {
        self.kind.as_deref() == Some(EPISODE)
    }

    /// Series name, only meaningful for episodes
    pub fn episode_series(&self) -> Option<&str> {
        if self.is_episode() {
            self.series_name.as_deref()
        } else {
            None
        }
    }
}

/// Keep only sessions that are actually playing something
pub fn active_sessions(sessions: Vec<Session>) -> Vec<Session> {
    sessions.into_iter().filter(Session::is_playing).collect()
}
