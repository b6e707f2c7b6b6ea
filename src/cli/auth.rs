use anyhow::{bail, Result};

use deep_research::client::ApiClient;
use deep_research::config::ResearchConfig;

/// Store the worker credential for later commands.
pub fn login(config: &ResearchConfig, key: &str) -> Result<()> {
    if key.trim().is_empty() {
        bail!("credential must not be empty");
    }
    let mut client = ApiClient::new(config.client.base_url.as_str(), "");
    let mut store = super::auth_store(config);
    store.set_credential(key, &mut client)?;

    println!("Credential saved for {}", client.base_url());
    Ok(())
}

pub fn logout(config: &ResearchConfig) -> Result<()> {
    super::auth_store(config).logout()?;
    println!("Logged out.");
    Ok(())
}

pub fn whoami(config: &ResearchConfig) {
    let mut client = ApiClient::new(config.client.base_url.as_str(), "");
    let mut store = super::auth_store(config);
    let authenticated = store.check_auth(&mut client);

    println!("Worker:         {}", client.base_url());
    if authenticated {
        println!("Authenticated:  yes");
        println!("Credential:     {}", super::mask(store.worker_api_key()));
    } else {
        println!("Authenticated:  no");
    }
}
