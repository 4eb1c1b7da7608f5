use anyhow::Result;
use jellywatch::config;
use jellywatch::integrations::discord::DiscordNotifier;
use jellywatch::integrations::jellyfin::JellyfinClient;
use jellywatch::integrations::Notifier;

#[tokio::main]
async fn main() -> Result<()> {
    let path = std::env::args().nth(1).map(std::path::PathBuf::from);
    let config = config::load(path.as_deref())?;

    println!("\n=== Testing Jellyfin API ===");
    match JellyfinClient::from_config(&config.jellyfin) {
        Ok(client) => {
            dump(&client, "/Sessions").await;
            match &config.jellyfin.user_id {
                Some(user_id) => {
                    dump(&client, &format!("/Users/{}/Items/Latest", user_id)).await;
                }
                None => println!("No user id configured, skipping latest items"),
            }
        }
        Err(e) => println!("{}", e),
    }

    println!("\n=== Testing Discord channel ===");
    let notifier = DiscordNotifier::from_config(&config.discord);
    match notifier.ready().await {
        Ok(()) => println!("Channel resolved"),
        Err(e) => println!("Channel unavailable: {}", e),
    }

    Ok(())
}

async fn dump(client: &JellyfinClient, endpoint: &str) {
    println!("GET {}", endpoint);
    match client.get_raw(endpoint).await {
        Ok(body) => {
            let body = serde_json::to_string_pretty(&body).unwrap_or_default();
            let preview: String = body.chars().take(2000).collect();
            println!("Response: {}", preview);
        }
        Err(e) => println!("Error: {}", e),
    }
}
