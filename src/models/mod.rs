pub mod podcast;
pub mod search;

pub use podcast::Podcast;
pub use search::{PodcastResult, SearchRecord};
