use anyhow::{Context, Result};
use colored::Colorize;
use twins_application::SessionHistoryCache;
use twins_core::config::HistoryConfig;
use twins_core::service::{GenerationService, HistoryQuery};

use super::history_store;

pub async fn local(config: &HistoryConfig) -> Result<()> {
    let cache = SessionHistoryCache::new(history_store(), config);
    cache.load().await;

    let entries = cache.list().await;
    if entries.is_empty() {
        println!("No history yet.");
    }
    for entry in entries {
        println!(
            "{}  {}",
            entry.created_at.format("%Y-%m-%d %H:%M").to_string().dimmed(),
            entry.persona_display_names.join(", ").cyan()
        );
        println!("    {}", entry.prompt_text);
    }
    Ok(())
}

pub async fn remote(service: &dyn GenerationService, query: &HistoryQuery) -> Result<()> {
    let page = service
        .fetch_history(query)
        .await
        .context("Failed to fetch history from the generation service")?;

    println!(
        "{}",
        format!(
            "page {} ({} per page), {} result(s) in the last {} days",
            page.page, page.per_page, page.total, query.days
        )
        .dimmed()
    );
    for item in &page.items {
        println!("{}", serde_json::to_string(item)?);
    }
    Ok(())
}
