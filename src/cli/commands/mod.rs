mod init;
mod podcast;
mod random;
mod recent;
mod search;

pub use init::cmd_init;
pub use podcast::cmd_podcast;
pub use random::cmd_random;
pub use recent::cmd_recent;
pub use search::cmd_search;

use crate::models::PodcastResult;

fn print_podcast(result: &PodcastResult) {
    let podcast = &result.podcast;
    println!("• {} ({})", podcast.collection_name, podcast.artist_name);

    let genre = if podcast.primary_genre_name.is_empty() {
        "Unknown"
    } else {
        podcast.primary_genre_name.as_str()
    };
    println!(
        "  ID: {} | Genre: {} | Episodes: {}",
        podcast.collection_id, genre, podcast.track_count
    );

    if !podcast.feed_url.is_empty() {
        println!("  Feed: {}", podcast.feed_url);
    }
    if !result.persisted {
        println!("  (not saved)");
    }
}
