//! Tests for the Jellyfin HTTP client against a mock server

use jellywatch::config::JellyfinConfig;
use jellywatch::error::GatewayError;
use jellywatch::integrations::jellyfin::JellyfinClient;
use jellywatch::integrations::MediaGateway;
use mockito::{Matcher, Server};

fn client_for(url: &str) -> JellyfinClient {
    JellyfinClient::from_config(&JellyfinConfig {
        server_url: Some(url.to_string()),
        api_key: Some("secret".to_string()),
        user_id: None,
    })
    .unwrap()
}

const SESSIONS_JSON: &str = r#"[
    {
        "Id": "s1",
        "UserName": "alice",
        "NowPlayingItem": { "Id": "i1", "Name": "Heat", "Type": "Movie" }
    },
    { "Id": "s2", "UserName": "bob" }
]"#;

#[tokio::test]
async fn lists_sessions_with_auth_header() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("GET", "/Sessions")
        .match_header("authorization", "MediaBrowser Token=\"secret\"")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(SESSIONS_JSON)
        .create_async()
        .await;

    let sessions = client_for(&server.url()).list_sessions().await.unwrap();

    mock.assert_async().await;
    assert_eq!(sessions.len(), 2);
    assert_eq!(sessions[0].id, "s1");
    assert!(sessions[0].is_playing());
    assert!(!sessions[1].is_playing());
}

#[tokio::test]
async fn lists_latest_items_for_user() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("GET", "/Users/user-1/Items/Latest")
        .match_query(Matcher::Any)
        .with_status(200)
        .with_body(r#"[{"Id": "A", "Name": "Alpha", "Type": "Episode", "SeriesName": "Dark"}]"#)
        .create_async()
        .await;

    let items = client_for(&server.url())
        .list_latest_items(Some("user-1"))
        .await
        .unwrap();

    mock.assert_async().await;
    assert_eq!(items.len(), 1);
    assert_eq!(items[0].id, "A");
    assert_eq!(items[0].episode_series(), Some("Dark"));
}

#[tokio::test]
async fn latest_items_without_user_is_configuration_error() {
    let client = client_for("http://127.0.0.1:9");
    let err = client.list_latest_items(None).await.unwrap_err();
    assert!(err.is_configuration());
}

#[tokio::test]
async fn non_success_status_is_an_error() {
    let mut server = Server::new_async().await;
    server
        .mock("GET", "/Sessions")
        .with_status(401)
        .create_async()
        .await;

    let err = client_for(&server.url()).list_sessions().await.unwrap_err();

    match err {
        GatewayError::Status { status, endpoint } => {
            assert_eq!(status.as_u16(), 401);
            assert_eq!(endpoint, "/Sessions");
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[tokio::test]
async fn malformed_body_is_decode_error() {
    let mut server = Server::new_async().await;
    server
        .mock("GET", "/Sessions")
        .with_status(200)
        .with_body("<html>not json</html>")
        .create_async()
        .await;

    let err = client_for(&server.url()).list_sessions().await.unwrap_err();
    assert!(matches!(err, GatewayError::Decode { .. }));
}

#[tokio::test]
async fn unreachable_server_is_fetch_error() {
    // Port 9 (discard) is not expected to have an HTTP listener
    let err = client_for("http://127.0.0.1:9").list_sessions().await.unwrap_err();
    assert!(matches!(err, GatewayError::Fetch { .. }));
}

#[test]
fn image_url_needs_no_network() {
    let client = client_for("http://media.local:8096");
    assert_eq!(
        client.image_url("i1", "Backdrop"),
        "http://media.local:8096/Items/i1/Images/Backdrop"
    );
}
