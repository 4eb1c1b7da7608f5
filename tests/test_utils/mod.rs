//! Test utilities and fixtures for jellywatch tests
#![allow(dead_code)]

use async_trait::async_trait;
use jellywatch::data::{Item, Session};
use jellywatch::error::{DeliveryError, GatewayError};
use jellywatch::format::RichMessage;
use jellywatch::integrations::{MediaGateway, Notifier};
use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

/// One scripted upstream response
pub enum Poll<T> {
    Ok(T),
    Fail,
}

/// Media gateway that replays scripted responses, one per call.
///
/// When a script runs dry, calls return an empty list.
#[derive(Default)]
pub struct FakeGateway {
    sessions: Mutex<VecDeque<Poll<Vec<Session>>>>,
    items: Mutex<VecDeque<Poll<Vec<Item>>>>,
    latest_calls: Mutex<Vec<Option<String>>>,
}

impl FakeGateway {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_sessions(&self, sessions: Vec<Session>) -> &Self {
        self.sessions.lock().unwrap().push_back(Poll::Ok(sessions));
        self
    }

    pub fn push_sessions_failure(&self) -> &Self {
        self.sessions.lock().unwrap().push_back(Poll::Fail);
        self
    }

    pub fn push_items(&self, items: Vec<Item>) -> &Self {
        self.items.lock().unwrap().push_back(Poll::Ok(items));
        self
    }

    pub fn push_items_failure(&self) -> &Self {
        self.items.lock().unwrap().push_back(Poll::Fail);
        self
    }

    /// User ids passed to `list_latest_items`, in call order
    pub fn latest_calls(&self) -> Vec<Option<String>> {
        self.latest_calls.lock().unwrap().clone()
    }
}

fn upstream_failure(endpoint: &str) -> GatewayError {
    GatewayError::Status {
        endpoint: endpoint.to_string(),
        status: reqwest::StatusCode::BAD_GATEWAY,
    }
}

#[async_trait]
impl MediaGateway for FakeGateway {
    async fn list_sessions(&self) -> Result<Vec<Session>, GatewayError> {
        match self.sessions.lock().unwrap().pop_front() {
            Some(Poll::Ok(sessions)) => Ok(sessions),
            Some(Poll::Fail) => Err(upstream_failure("/Sessions")),
            None => Ok(vec![]),
        }
    }

    async fn list_latest_items(&self, user_id: Option<&str>) -> Result<Vec<Item>, GatewayError> {
        self.latest_calls
            .lock()
            .unwrap()
            .push(user_id.map(String::from));

        if user_id.is_none() {
            return Err(GatewayError::Configuration("no user id".to_string()));
        }

        match self.items.lock().unwrap().pop_front() {
            Some(Poll::Ok(items)) => Ok(items),
            Some(Poll::Fail) => Err(upstream_failure("/Users/u/Items/Latest")),
            None => Ok(vec![]),
        }
    }

    fn image_url(&self, item_id: &str, image_type: &str) -> String {
        format!("http://jellyfin.test/Items/{}/Images/{}", item_id, image_type)
    }
}

/// Notifier that records every message it is asked to send
pub struct RecordingNotifier {
    configured: AtomicBool,
    sent: Mutex<Vec<RichMessage>>,
    attempts: Mutex<usize>,
    /// Sends whose headline contains any of these fail
    failing: Mutex<Vec<String>>,
}

impl Default for RecordingNotifier {
    fn default() -> Self {
        Self {
            configured: AtomicBool::new(true),
            sent: Mutex::new(Vec::new()),
            attempts: Mutex::new(0),
            failing: Mutex::new(Vec::new()),
        }
    }
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// A notifier whose destination is missing
    pub fn unconfigured() -> Self {
        Self {
            configured: AtomicBool::new(false),
            ..Self::default()
        }
    }

    /// Make the destination appear or disappear
    pub fn set_configured(&self, configured: bool) {
        self.configured.store(configured, Ordering::SeqCst);
    }

    pub fn fail_when_headline_contains(&self, needle: &str) {
        self.failing.lock().unwrap().push(needle.to_string());
    }

    pub fn heal(&self) {
        self.failing.lock().unwrap().clear();
    }

    /// Successfully delivered messages
    pub fn sent(&self) -> Vec<RichMessage> {
        self.sent.lock().unwrap().clone()
    }

    pub fn headlines(&self) -> Vec<String> {
        self.sent().into_iter().map(|m| m.headline).collect()
    }

    /// Delivery attempts, successful or not
    pub fn attempts(&self) -> usize {
        *self.attempts.lock().unwrap()
    }
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn ready(&self) -> Result<(), DeliveryError> {
        if self.configured.load(Ordering::SeqCst) {
            Ok(())
        } else {
            Err(DeliveryError::NotConfigured("no channel".to_string()))
        }
    }

    async fn send(&self, message: &RichMessage) -> Result<(), DeliveryError> {
        *self.attempts.lock().unwrap() += 1;

        let fails = self
            .failing
            .lock()
            .unwrap()
            .iter()
            .any(|needle| message.headline.contains(needle.as_str()));
        if fails {
            return Err(DeliveryError::Other("channel rejected message".to_string()));
        }

        self.sent.lock().unwrap().push(message.clone());
        Ok(())
    }
}

/// Session that is playing a movie titled `title`
pub fn playing(id: &str, user: &str, title: &str) -> Session {
    Session {
        id: id.to_string(),
        user_name: Some(user.to_string()),
        now_playing_item: Some(movie(&format!("{}-item", id), title)),
    }
}

/// Session connected to the server but not playing anything
pub fn idle(id: &str) -> Session {
    Session {
        id: id.to_string(),
        user_name: Some("idle-user".to_string()),
        now_playing_item: None,
    }
}

/// Session reported as `"NowPlayingItem": {}`
pub fn empty_item_session(id: &str) -> Session {
    serde_json::from_value(serde_json::json!({
        "Id": id,
        "UserName": "alice",
        "NowPlayingItem": {}
    }))
    .unwrap()
}

pub fn movie(id: &str, name: &str) -> Item {
    Item {
        id: id.to_string(),
        name: Some(name.to_string()),
        kind: Some("Movie".to_string()),
        series_name: None,
        season_name: None,
    }
}

pub fn episode(id: &str, name: &str, series: &str, season: Option<&str>) -> Item {
    Item {
        id: id.to_string(),
        name: Some(name.to_string()),
        kind: Some("Episode".to_string()),
        series_name: Some(series.to_string()),
        season_name: season.map(String::from),
    }
}

/// Bare item with only an id, as in `[{Id: "A"}]`
pub fn bare_item(id: &str) -> Item {
    Item {
        id: id.to_string(),
        ..Item::default()
    }
}
