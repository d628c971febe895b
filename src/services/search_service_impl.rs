//! `SeaORM` implementation of the `SearchService` trait.

use async_trait::async_trait;
use rand::seq::{IndexedRandom, SliceRandom};
use std::sync::Arc;
use tracing::{info, warn};

use crate::clients::itunes::ItunesClient;
use crate::db::Store;
use crate::models::{PodcastResult, SearchRecord};
use crate::services::search_service::{
    MAX_RANDOM_LIMIT, RECENT_SEARCH_LIMIT, SearchError, SearchService,
};

pub struct SeaOrmSearchService {
    store: Store,
    catalog: Arc<ItunesClient>,
}

impl SeaOrmSearchService {
    #[must_use]
    pub const fn new(store: Store, catalog: Arc<ItunesClient>) -> Self {
        Self { store, catalog }
    }

    fn pick_term(&self, term: Option<&str>) -> Result<String, SearchError> {
        if let Some(term) = term.map(str::trim).filter(|t| !t.is_empty()) {
            return Ok(term.to_string());
        }

        self.catalog
            .config()
            .fallback_terms
            .choose(&mut rand::rng())
            .cloned()
            .ok_or_else(|| SearchError::Validation("No generic search terms configured".into()))
    }
}

#[async_trait]
impl SearchService for SeaOrmSearchService {
    async fn search(&self, term: &str) -> Result<SearchRecord, SearchError> {
        let term = term.trim();
        if term.is_empty() {
            return Err(SearchError::Validation(
                "Search term cannot be empty".to_string(),
            ));
        }

        let podcasts = self.catalog.search(term).await?;

        match self.store.record_search(term, &podcasts).await {
            Ok(record) => {
                info!(
                    term,
                    record_id = %record.id,
                    results = record.results.len(),
                    "Search recorded"
                );
                Ok(record)
            }
            Err(e) => Err(SearchError::Persistence {
                term: term.to_string(),
                podcasts,
                message: e.to_string(),
            }),
        }
    }

    async fn recent_searches(&self) -> Result<Vec<SearchRecord>, SearchError> {
        Ok(self.store.recent_searches(RECENT_SEARCH_LIMIT).await?)
    }

    async fn podcast_by_id(
        &self,
        collection_id: i64,
    ) -> Result<Option<PodcastResult>, SearchError> {
        match self.store.latest_podcast(collection_id).await {
            Ok(Some(stored)) => return Ok(Some(stored)),
            Ok(None) => {}
            Err(e) => warn!(collection_id, error = %e, "Stored podcast lookup failed"),
        }

        let podcast = self.catalog.lookup(collection_id).await?;
        Ok(podcast.map(|p| PodcastResult::transient(p, "")))
    }

    async fn random_podcasts(
        &self,
        term: Option<&str>,
        limit: usize,
    ) -> Result<Vec<PodcastResult>, SearchError> {
        if !(1..=MAX_RANDOM_LIMIT).contains(&limit) {
            return Err(SearchError::Validation(format!(
                "Limit must be between 1 and {MAX_RANDOM_LIMIT}"
            )));
        }

        let term = self.pick_term(term)?;
        let mut podcasts = self.catalog.search(&term).await?;

        podcasts.shuffle(&mut rand::rng());
        podcasts.truncate(limit);

        Ok(podcasts
            .into_iter()
            .map(|p| PodcastResult::transient(p, &term))
            .collect())
    }
}
