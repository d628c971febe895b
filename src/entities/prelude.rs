pub use super::podcast_results::Entity as PodcastResults;
pub use super::search_records::Entity as SearchRecords;
