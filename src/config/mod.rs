use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub jellyfin: JellyfinConfig,
    #[serde(default)]
    pub discord: DiscordConfig,
    #[serde(default)]
    pub polling: PollingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct JellyfinConfig {
    #[serde(default)]
    pub server_url: Option<String>,
    #[serde(default)]
    pub api_key: Option<String>,
    /// User whose library view bounds the recently-added query
    #[serde(default)]
    pub user_id: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct DiscordConfig {
    #[serde(default)]
    pub bot_token: Option<String>,
    #[serde(default)]
    pub channel_id: Option<String>,
    /// Give up on a message post after this long. Unset means wait for
    /// Discord to answer, so an accepted but slow post is never reported as
    /// failed and re-sent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub send_timeout_secs: Option<u64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PollingConfig {
    #[serde(default = "default_sessions_interval")]
    pub sessions_interval_secs: u64,
    #[serde(default = "default_recently_added_interval")]
    pub recently_added_interval_secs: u64,
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
}

fn default_sessions_interval() -> u64 {
    10
}

fn default_recently_added_interval() -> u64 {
    30 * 60
}

fn default_request_timeout() -> u64 {
    10
}

impl Default for PollingConfig {
    fn default() -> Self {
        Self {
            sessions_interval_secs: default_sessions_interval(),
            recently_added_interval_secs: default_recently_added_interval(),
            request_timeout_secs: default_request_timeout(),
        }
    }
}

impl Config {
    /// Overlay values from the process environment
    pub fn apply_env(self) -> Self {
        self.apply_env_with(|key| std::env::var(key).ok())
    }

    /// Overlay values from an arbitrary lookup, then normalize.
    ///
    /// Non-empty environment values win over the file. Empty strings count
    /// as unset everywhere.
    pub fn apply_env_with<F>(mut self, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let overlay = |slot: &mut Option<String>, key: &str| {
            if let Some(value) = lookup(key).filter(|v| !v.trim().is_empty()) {
                *slot = Some(value);
            }
        };

        overlay(&mut self.jellyfin.server_url, "JELLYFIN_SERVER_URL");
        overlay(&mut self.jellyfin.api_key, "JELLYFIN_API_KEY");
        overlay(&mut self.jellyfin.user_id, "JELLYFIN_USER_ID");
        overlay(&mut self.discord.bot_token, "DISCORD_BOT_TOKEN");
        overlay(&mut self.discord.channel_id, "DISCORD_CHANNEL_ID");

        self.normalize()
    }

    fn normalize(mut self) -> Self {
        for slot in [
            &mut self.jellyfin.server_url,
            &mut self.jellyfin.api_key,
            &mut self.jellyfin.user_id,
            &mut self.discord.bot_token,
            &mut self.discord.channel_id,
        ] {
            *slot = slot
                .take()
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty());
        }

        self.jellyfin.server_url = self
            .jellyfin
            .server_url
            .map(|url| url.trim_end_matches('/').to_string())
            .filter(|s| !s.is_empty());

        // Discord snowflakes are never zero; "0" is the conventional unset value
        self.discord.channel_id = self.discord.channel_id.filter(|id| id != "0");

        self
    }
}

pub fn config_dir() -> Result<PathBuf> {
    let dir = directories::ProjectDirs::from("", "", "jellywatch")
        .context("Could not determine config directory")?
        .config_dir()
        .to_path_buf();
    Ok(dir)
}

pub fn default_config_path() -> Result<PathBuf> {
    Ok(config_dir()?.join("config.toml"))
}

/// Load the config file (if any) and apply environment overrides.
///
/// A missing file is not an error: everything can come from the environment.
pub fn load(path: Option<&Path>) -> Result<Config> {
    let config = load_file(path)?;
    Ok(config.apply_env())
}

/// Load only the config file, without environment overrides
pub fn load_file(path: Option<&Path>) -> Result<Config> {
    let path = match path {
        Some(p) => p.to_path_buf(),
        None => default_config_path()?,
    };

    if !path.exists() {
        tracing::debug!("No config file at {}, using defaults", path.display());
        return Ok(Config::default());
    }

    let content = std::fs::read_to_string(&path)
        .with_context(|| format!("Failed to read config from {}", path.display()))?;

    let config: Config = toml::from_str(&content)
        .with_context(|| format!("Failed to parse config from {}", path.display()))?;

    Ok(config)
}

/// Write a config file, restricting permissions on Unix since it holds tokens
pub fn save(config: &Config, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create {}", parent.display()))?;
    }

    let content = toml::to_string_pretty(config)?;
    std::fs::write(path, content)
        .with_context(|| format!("Failed to write config to {}", path.display()))?;

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o600))?;
    }

    Ok(())
}

pub async fn init_wizard(path: Option<&Path>) -> Result<()> {
    use std::io::{self, Write};

    println!("jellywatch Configuration Wizard");
    println!("===============================\n");

    let config_path = match path {
        Some(p) => p.to_path_buf(),
        None => default_config_path()?,
    };
    if config_path.exists() {
        print!("Config already exists at {}. Overwrite? [y/N] ", config_path.display());
        io::stdout().flush()?;
        let mut input = String::new();
        io::stdin().read_line(&mut input)?;
        if !input.trim().eq_ignore_ascii_case("y") {
            println!("Aborted.");
            return Ok(());
        }
    }

    let prompt = |label: &str| -> Result<Option<String>> {
        print!("{}: ", label);
        io::stdout().flush()?;
        let mut value = String::new();
        io::stdin().read_line(&mut value)?;
        let value = value.trim();
        Ok(if value.is_empty() {
            None
        } else {
            Some(value.to_string())
        })
    };

    println!("Jellyfin server:\n");
    let server_url = prompt("Server URL (e.g. http://localhost:8096)")?;
    let api_key = prompt("API key (Dashboard > API Keys)")?;
    let user_id = prompt("User id for recently added items (optional)")?;

    println!("\nDiscord bot:\n");
    let bot_token = prompt("Bot token")?;
    let channel_id = prompt("Channel id for notifications")?;

    let config = Config {
        jellyfin: JellyfinConfig {
            server_url,
            api_key,
            user_id,
        },
        discord: DiscordConfig {
            bot_token,
            channel_id,
            send_timeout_secs: None,
        },
        polling: PollingConfig::default(),
    }
    .normalize();

    save(&config, &config_path)?;

    println!("\nConfig saved to {}", config_path.display());
    println!("Run `jellywatch` to start watching.");

    Ok(())
}
