pub mod prelude;

pub mod podcast_results;
pub mod search_records;
