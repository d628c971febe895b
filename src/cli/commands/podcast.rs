use crate::config::Config;
use crate::state::SharedState;

use super::print_podcast;

pub async fn cmd_podcast(config: &Config, collection_id: i64) -> anyhow::Result<()> {
    let shared = SharedState::new(config.clone()).await?;

    let Some(result) = shared.search_service.podcast_by_id(collection_id).await? else {
        println!("No podcast found with ID {collection_id}");
        return Ok(());
    };

    print_podcast(&result);

    let podcast = &result.podcast;
    if !podcast.collection_view_url.is_empty() {
        println!("  Link: {}", podcast.collection_view_url);
    }
    if !podcast.release_date.is_empty() {
        println!("  Latest release: {}", podcast.release_date);
    }
    if !podcast.genres.is_empty() {
        println!("  Genres: {}", podcast.genres.join(", "));
    }

    Ok(())
}
