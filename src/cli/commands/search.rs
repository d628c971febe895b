use crate::api::{OnFailure, settle};
use crate::config::Config;
use crate::state::SharedState;

use super::print_podcast;

pub async fn cmd_search(config: &Config, term: &str) -> anyhow::Result<()> {
    println!("Searching for: {term}");

    let shared = SharedState::new(config.clone()).await?;
    let result = shared
        .search_service
        .search(term)
        .await
        .map(|record| record.results);

    let response = settle("search", result, OnFailure::Report);

    if let Some(error) = response.error {
        println!("Search failed: {error}");
        println!("Try again in a moment.");
        return Ok(());
    }

    let results = response.data.unwrap_or_default();
    if results.is_empty() {
        println!("No podcasts found matching '{term}'. Try different terms.");
        return Ok(());
    }

    println!();
    println!("Search Results ({}):", results.len());
    println!("{:-<60}", "");

    for result in &results {
        print_podcast(result);
        println!();
    }

    Ok(())
}
