use serde::{Deserialize, Serialize};

use super::podcast::Podcast;

/// Prefix of identifiers handed out for results that never reached the database.
pub const TRANSIENT_ID_PREFIX: &str = "transient-";

/// A podcast row as exposed to clients, either stored or transient.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PodcastResult {
    pub id: String,
    pub search_record_id: Option<String>,
    pub search_term: String,
    pub persisted: bool,
    pub created_at: String,
    #[serde(flatten)]
    pub podcast: Podcast,
}

impl PodcastResult {
    /// Wraps a podcast that could not be stored, under a synthetic id.
    #[must_use]
    pub fn transient(podcast: Podcast, search_term: &str) -> Self {
        Self {
            id: format!("{TRANSIENT_ID_PREFIX}{}", uuid::Uuid::new_v4()),
            search_record_id: None,
            search_term: search_term.to_string(),
            persisted: false,
            created_at: now_timestamp(),
            podcast,
        }
    }

    #[must_use]
    pub fn is_transient(&self) -> bool {
        self.id.starts_with(TRANSIENT_ID_PREFIX)
    }
}

/// One logged search with the rows it produced.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchRecord {
    pub id: String,
    pub search_term: String,
    pub created_at: String,
    pub results: Vec<PodcastResult>,
}

/// UTC timestamp with fixed microsecond precision, so string order is time order.
#[must_use]
pub fn now_timestamp() -> String {
    chrono::Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Micros, true)
}
