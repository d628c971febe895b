use crate::config::Config;
use crate::state::SharedState;

use super::print_podcast;

pub async fn cmd_random(config: &Config, term: Option<&str>, limit: usize) -> anyhow::Result<()> {
    let shared = SharedState::new(config.clone()).await?;
    let podcasts = shared.search_service.random_podcasts(term, limit).await?;

    if podcasts.is_empty() {
        println!("No podcasts to suggest right now.");
        return Ok(());
    }

    println!("Suggested Podcasts:");
    println!("{:-<60}", "");

    for result in &podcasts {
        print_podcast(result);
        println!();
    }

    Ok(())
}
