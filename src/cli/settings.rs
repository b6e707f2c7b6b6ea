use anyhow::Result;

use deep_research::config::ResearchConfig;
use deep_research::stores::{Settings, SettingsPatch};

/// Print the current settings and whether they pass validation.
pub fn show(config: &ResearchConfig) {
    let store = super::setting_store(config);
    print_settings(store.settings());
    println!();
    if store.validate_settings() {
        println!("Settings are valid.");
    } else {
        println!("Settings are INVALID: numeric values must be greater than zero.");
    }
}

pub fn set(config: &ResearchConfig, patch: SettingsPatch) -> Result<()> {
    let mut store = super::setting_store(config);
    store.update(patch)?;
    print_settings(store.settings());
    if !store.validate_settings() {
        eprintln!("warning: numeric settings must be greater than zero");
    }
    Ok(())
}

pub fn reset(config: &ResearchConfig) -> Result<()> {
    let mut store = super::setting_store(config);
    store.reset()?;
    println!("Settings restored to defaults.");
    Ok(())
}

fn print_settings(settings: &Settings) {
    println!("Research Settings");
    println!("{}", "=".repeat(40));
    println!("  Core model:       {}", settings.core_model);
    println!("  Task model:       {}", settings.task_model);
    println!("  Thinking budget:  {}", settings.thinking_budget);
    println!("  Depth:            {}", settings.depth);
    println!("  Wide:             {}", settings.wide);
    println!("  Parallel search:  {}", settings.parallel_search);
    println!("  Report tone:      {}", settings.report_tone);
    println!("  Min words:        {}", settings.min_words);
    println!("  Models:           {}", settings.model_list.join(", "));
}
