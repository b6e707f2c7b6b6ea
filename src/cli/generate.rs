use std::io::Write;

use anyhow::Result;
use futures::StreamExt;

use deep_research::client::provider::response_text;
use deep_research::client::WorkerProvider;
use deep_research::config::ResearchConfig;
use deep_research::gateway::GenerateRequest;

fn worker_provider(config: &ResearchConfig) -> Result<WorkerProvider> {
    let client = super::authed_client(config)?;
    let settings = super::setting_store(config);
    Ok(WorkerProvider::from_settings(client, settings.settings()))
}

/// Send one prompt through the worker. Defaults to the task model from
/// settings and streams the answer as it arrives.
pub async fn generate(
    config: &ResearchConfig,
    prompt: &str,
    model: Option<String>,
    stream: bool,
) -> Result<()> {
    let provider = worker_provider(config)?;
    let model =
        model.unwrap_or_else(|| super::setting_store(config).settings().task_model.clone());
    let request = GenerateRequest::from_prompt(model, prompt);

    if !stream {
        let response = provider.generate(&request).await?;
        match response_text(&response) {
            Some(text) => println!("{text}"),
            None => println!("{}", serde_json::to_string_pretty(&response)?),
        }
        return Ok(());
    }

    let mut chunks = provider.generate_stream(&request).await?;
    let mut stdout = std::io::stdout();
    while let Some(chunk) = chunks.next().await {
        stdout.write_all(chunk?.text.as_bytes())?;
        stdout.flush()?;
    }
    println!();
    Ok(())
}

pub fn models(config: &ResearchConfig) {
    let settings = super::setting_store(config);
    let client = deep_research::client::ApiClient::new(config.client.base_url.as_str(), "");
    for name in WorkerProvider::from_settings(client, settings.settings()).list_models() {
        println!("{name}");
    }
}
