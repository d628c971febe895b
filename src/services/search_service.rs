//! Domain service for podcast search and search history.
//!
//! Implementations report every failure as a [`SearchError`]. Deciding whether
//! a failure reaches the caller or degrades into an empty or transient result
//! is left to the API boundary, `api::podcasts::settle`.

use crate::clients::itunes::CatalogError;
use crate::models::{Podcast, PodcastResult, SearchRecord};
use thiserror::Error;

/// How many searches the history view returns.
pub const RECENT_SEARCH_LIMIT: u64 = 10;

/// Upper bound for `random_podcasts`, matching the catalog page size.
pub const MAX_RANDOM_LIMIT: usize = 50;

#[derive(Debug, Error)]
pub enum SearchError {
    #[error(transparent)]
    Catalog(#[from] CatalogError),

    /// The catalog answered but the results could not be stored.
    /// The normalized results travel with the error so they can still be shown.
    #[error("Failed to store search '{term}': {message}")]
    Persistence {
        term: String,
        podcasts: Vec<Podcast>,
        message: String,
    },

    #[error("Database error: {0}")]
    Database(String),

    #[error("Validation failed: {0}")]
    Validation(String),
}

impl From<sea_orm::DbErr> for SearchError {
    fn from(err: sea_orm::DbErr) -> Self {
        Self::Database(err.to_string())
    }
}

impl From<anyhow::Error> for SearchError {
    fn from(err: anyhow::Error) -> Self {
        Self::Database(err.to_string())
    }
}

/// Domain service trait for podcast search.
#[async_trait::async_trait]
pub trait SearchService: Send + Sync {
    /// Runs one catalog search and logs it with its results.
    ///
    /// Every call creates a new search record, even for a repeated term.
    ///
    /// # Errors
    ///
    /// - [`SearchError::Validation`] for a blank term
    /// - [`SearchError::Catalog`] when the catalog call fails after retries and fallback
    /// - [`SearchError::Persistence`] when storing fails; carries the results
    async fn search(&self, term: &str) -> Result<SearchRecord, SearchError>;

    /// Returns up to [`RECENT_SEARCH_LIMIT`] searches, newest first.
    ///
    /// # Errors
    ///
    /// Returns [`SearchError::Database`] when the store is unreachable.
    async fn recent_searches(&self) -> Result<Vec<SearchRecord>, SearchError>;

    /// Finds a podcast by catalog collection id, locally first, then in the catalog.
    ///
    /// # Errors
    ///
    /// Returns [`SearchError::Catalog`] if the catalog lookup fails.
    async fn podcast_by_id(&self, collection_id: i64)
    -> Result<Option<PodcastResult>, SearchError>;

    /// Returns up to `limit` podcasts in random order for `term`, or for a
    /// randomly picked generic term. Nothing is stored.
    ///
    /// # Errors
    ///
    /// - [`SearchError::Validation`] when `limit` is outside `1..=50`
    /// - [`SearchError::Catalog`] if the catalog call fails
    async fn random_podcasts(
        &self,
        term: Option<&str>,
        limit: usize,
    ) -> Result<Vec<PodcastResult>, SearchError>;
}
