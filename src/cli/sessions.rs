use anyhow::Result;
use chrono::DateTime;

use deep_research::config::ResearchConfig;

pub async fn list(config: &ResearchConfig, json: bool) -> Result<()> {
    let client = super::authed_client(config)?;
    let sessions = client.list_sessions().await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&sessions)?);
        return Ok(());
    }

    if sessions.is_empty() {
        println!("No research sessions.");
        return Ok(());
    }

    for s in &sessions {
        println!(
            "{}  {:<12} {}  {}",
            s.id,
            s.status,
            format_epoch(s.created_at),
            truncate(&s.original_prompt, 60)
        );
    }
    Ok(())
}

pub async fn show(config: &ResearchConfig, id: &str, json: bool) -> Result<()> {
    let client = super::authed_client(config)?;
    let detail = client.get_session(id).await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&detail)?);
        return Ok(());
    }

    let s = &detail.session;
    println!("Session {}", s.id);
    println!("{}", "=".repeat(40));
    println!("  Status:   {}", s.status);
    println!("  Created:  {}", format_epoch(s.created_at));
    println!("  Updated:  {}", format_epoch(s.updated_at));
    println!("  Prompt:   {}", s.original_prompt);
    if let Some(ref report) = s.final_report {
        println!("  Report:   {} chars", report.chars().count());
    }
    println!();

    println!("Tasks ({}):", detail.tasks.len());
    for t in &detail.tasks {
        println!("  [tier {}] {}", t.tier, t.title);
    }
    println!();

    println!("Logs ({}):", detail.logs.len());
    for l in &detail.logs {
        println!(
            "  {} {:<5} {:<10} {}",
            format_epoch(l.timestamp),
            l.level,
            l.log_type,
            l.message
        );
    }
    Ok(())
}

fn format_epoch(secs: i64) -> String {
    DateTime::from_timestamp(secs, 0)
        .map(|t| t.format("%Y-%m-%d %H:%M:%S").to_string())
        .unwrap_or_else(|| secs.to_string())
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        return s.to_string();
    }
    let mut out: String = s.chars().take(max).collect();
    out.push('…');
    out
}
