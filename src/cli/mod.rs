pub mod auth;
pub mod generate;
pub mod sessions;
pub mod settings;

use anyhow::{bail, Result};

use deep_research::client::ApiClient;
use deep_research::config::ResearchConfig;
use deep_research::stores::{AuthStore, FileCookieJar, FileStorage, SettingStore};

fn auth_store(config: &ResearchConfig) -> AuthStore<FileCookieJar> {
    AuthStore::new(FileCookieJar::in_dir(config.resolved_state_dir()))
}

fn setting_store(config: &ResearchConfig) -> SettingStore<FileStorage> {
    SettingStore::load(FileStorage::new(config.resolved_state_dir()))
}

/// An API client carrying the stored credential.
fn authed_client(config: &ResearchConfig) -> Result<ApiClient> {
    let mut client = ApiClient::new(config.client.base_url.as_str(), "");
    let mut store = auth_store(config);
    if !store.check_auth(&mut client) {
        bail!("not logged in; run `deep-research login <key>` first");
    }
    Ok(client)
}

/// Show the first and last few characters only.
fn mask(secret: &str) -> String {
    let chars: Vec<char> = secret.chars().collect();
    if chars.len() <= 8 {
        return "*".repeat(chars.len());
    }
    let head: String = chars[..4].iter().collect();
    let tail: String = chars[chars.len() - 4..].iter().collect();
    format!("{head}…{tail}")
}
