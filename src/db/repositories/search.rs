use std::collections::HashMap;

use crate::entities::{podcast_results, prelude::*, search_records};
use crate::models::search::now_timestamp;
use crate::models::{Podcast, PodcastResult, SearchRecord};
use anyhow::Result;
use sea_orm::{
    ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder,
    QuerySelect, Set, TransactionTrait,
};
use uuid::Uuid;

pub struct SearchRepository {
    conn: DatabaseConnection,
}

impl SearchRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    /// Stores the search and all of its rows in one transaction.
    pub async fn record(&self, term: &str, podcasts: &[Podcast]) -> Result<SearchRecord> {
        let record_id = Uuid::new_v4().to_string();
        let created_at = now_timestamp();

        let record = search_records::ActiveModel {
            id: Set(record_id.clone()),
            search_term: Set(term.to_string()),
            created_at: Set(created_at.clone()),
        };

        let results: Vec<PodcastResult> = podcasts
            .iter()
            .map(|podcast| PodcastResult {
                id: Uuid::new_v4().to_string(),
                search_record_id: Some(record_id.clone()),
                search_term: term.to_string(),
                persisted: true,
                created_at: created_at.clone(),
                podcast: podcast.clone(),
            })
            .collect();

        let rows: Vec<podcast_results::ActiveModel> = results
            .iter()
            .enumerate()
            .map(|(position, result)| to_active_model(position, result))
            .collect::<Result<_>>()?;

        let txn = self.conn.begin().await?;

        let written = async {
            SearchRecords::insert(record).exec(&txn).await?;
            if !rows.is_empty() {
                PodcastResults::insert_many(rows).exec(&txn).await?;
            }
            Ok::<_, sea_orm::DbErr>(())
        }
        .await;

        if let Err(e) = written {
            txn.rollback().await?;
            return Err(e.into());
        }
        txn.commit().await?;

        Ok(SearchRecord {
            id: record_id,
            search_term: term.to_string(),
            created_at,
            results,
        })
    }

    /// Newest searches first, each with its rows in catalog order.
    pub async fn recent(&self, limit: u64) -> Result<Vec<SearchRecord>> {
        let records = SearchRecords::find()
            .order_by_desc(search_records::Column::CreatedAt)
            .limit(limit)
            .all(&self.conn)
            .await?;

        if records.is_empty() {
            return Ok(Vec::new());
        }

        let ids: Vec<String> = records.iter().map(|r| r.id.clone()).collect();

        let rows = PodcastResults::find()
            .filter(podcast_results::Column::SearchRecordId.is_in(ids))
            .order_by_asc(podcast_results::Column::Position)
            .all(&self.conn)
            .await?;

        let mut by_record: HashMap<String, Vec<PodcastResult>> = HashMap::new();
        for row in rows {
            by_record
                .entry(row.search_record_id.clone())
                .or_default()
                .push(to_result(row));
        }

        Ok(records
            .into_iter()
            .map(|r| SearchRecord {
                results: by_record.remove(&r.id).unwrap_or_default(),
                id: r.id,
                search_term: r.search_term,
                created_at: r.created_at,
            })
            .collect())
    }

    /// The most recently stored row for a catalog collection.
    pub async fn latest_by_collection_id(&self, collection_id: i64) -> Result<Option<PodcastResult>> {
        let row = PodcastResults::find()
            .filter(podcast_results::Column::CollectionId.eq(collection_id))
            .order_by_desc(podcast_results::Column::CreatedAt)
            .one(&self.conn)
            .await?;

        Ok(row.map(to_result))
    }

    pub async fn count_results(&self, search_record_id: &str) -> Result<u64> {
        let count = PodcastResults::find()
            .filter(podcast_results::Column::SearchRecordId.eq(search_record_id))
            .count(&self.conn)
            .await?;
        Ok(count)
    }

    pub async fn count_records(&self, term: &str) -> Result<u64> {
        let count = SearchRecords::find()
            .filter(search_records::Column::SearchTerm.eq(term))
            .count(&self.conn)
            .await?;
        Ok(count)
    }
}

fn to_active_model(position: usize, result: &PodcastResult) -> Result<podcast_results::ActiveModel> {
    let podcast = &result.podcast;
    Ok(podcast_results::ActiveModel {
        id: Set(result.id.clone()),
        search_record_id: Set(result.search_record_id.clone().unwrap_or_default()),
        search_term: Set(result.search_term.clone()),
        position: Set(i32::try_from(position)?),
        collection_id: Set(podcast.collection_id),
        track_id: Set(podcast.track_id),
        artist_name: Set(podcast.artist_name.clone()),
        collection_name: Set(podcast.collection_name.clone()),
        track_name: Set(podcast.track_name.clone()),
        collection_view_url: Set(podcast.collection_view_url.clone()),
        feed_url: Set(podcast.feed_url.clone()),
        artwork_url30: Set(podcast.artwork_url30.clone()),
        artwork_url60: Set(podcast.artwork_url60.clone()),
        artwork_url100: Set(podcast.artwork_url100.clone()),
        artwork_url600: Set(podcast.artwork_url600.clone()),
        collection_price: Set(podcast.collection_price),
        track_price: Set(podcast.track_price),
        release_date: Set(podcast.release_date.clone()),
        collection_explicitness: Set(podcast.collection_explicitness.clone()),
        track_explicitness: Set(podcast.track_explicitness.clone()),
        track_count: Set(podcast.track_count),
        track_time_millis: Set(podcast.track_time_millis),
        country: Set(podcast.country.clone()),
        currency: Set(podcast.currency.clone()),
        primary_genre_name: Set(podcast.primary_genre_name.clone()),
        content_advisory_rating: Set(podcast.content_advisory_rating.clone()),
        genre_ids: Set(serde_json::to_string(&podcast.genre_ids)?),
        genres: Set(serde_json::to_string(&podcast.genres)?),
        created_at: Set(result.created_at.clone()),
    })
}

fn to_result(m: podcast_results::Model) -> PodcastResult {
    PodcastResult {
        id: m.id,
        search_record_id: Some(m.search_record_id),
        search_term: m.search_term,
        persisted: true,
        created_at: m.created_at,
        podcast: Podcast {
            collection_id: m.collection_id,
            track_id: m.track_id,
            artist_name: m.artist_name,
            collection_name: m.collection_name,
            track_name: m.track_name,
            collection_view_url: m.collection_view_url,
            feed_url: m.feed_url,
            artwork_url30: m.artwork_url30,
            artwork_url60: m.artwork_url60,
            artwork_url100: m.artwork_url100,
            artwork_url600: m.artwork_url600,
            collection_price: m.collection_price,
            track_price: m.track_price,
            release_date: m.release_date,
            collection_explicitness: m.collection_explicitness,
            track_explicitness: m.track_explicitness,
            track_count: m.track_count,
            track_time_millis: m.track_time_millis,
            country: m.country,
            currency: m.currency,
            primary_genre_name: m.primary_genre_name,
            content_advisory_rating: m.content_advisory_rating,
            genre_ids: serde_json::from_str(&m.genre_ids).unwrap_or_default(),
            genres: serde_json::from_str(&m.genres).unwrap_or_default(),
        },
    }
}
