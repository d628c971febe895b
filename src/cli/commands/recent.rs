use crate::api::{OnFailure, settle};
use crate::config::Config;
use crate::state::SharedState;

pub async fn cmd_recent(config: &Config) -> anyhow::Result<()> {
    let shared = SharedState::new(config.clone()).await?;
    let result = shared.search_service.recent_searches().await;
    let records = settle("recent_searches", result, OnFailure::Empty)
        .data
        .unwrap_or_default();

    if records.is_empty() {
        println!("No recent searches.");
        return Ok(());
    }

    println!("Recent Searches (last {}):", records.len());
    println!("{:-<70}", "");

    for record in records {
        println!("• \"{}\" - {} results", record.search_term, record.results.len());
        println!("  {}", record.created_at);
        for result in record.results.iter().take(3) {
            println!("    {}", result.podcast.collection_name);
        }
    }

    Ok(())
}
