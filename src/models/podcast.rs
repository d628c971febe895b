//! Normalized catalog records and the tolerant mapping from raw catalog JSON.
//!
//! Parsing happens in two stages: [`parse_envelope`] only checks that the body
//! is an object carrying a `results` array, then [`normalize_record`] maps each
//! item on its own. A malformed item never fails the whole response.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;

/// A podcast as returned by the catalog, with every optional field defaulted.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Podcast {
    pub collection_id: i64,
    pub track_id: i64,
    pub artist_name: String,
    pub collection_name: String,
    pub track_name: String,
    pub collection_view_url: String,
    pub feed_url: String,
    pub artwork_url30: String,
    pub artwork_url60: String,
    pub artwork_url100: String,
    pub artwork_url600: String,
    pub collection_price: f64,
    pub track_price: f64,
    pub release_date: String,
    pub collection_explicitness: String,
    pub track_explicitness: String,
    pub track_count: i32,
    pub track_time_millis: i64,
    pub country: String,
    pub currency: String,
    pub primary_genre_name: String,
    pub content_advisory_rating: String,
    pub genre_ids: Vec<String>,
    pub genres: Vec<String>,
}

/// Structural problems with a catalog response body.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum PayloadError {
    #[error("response body is not a JSON object")]
    NotAnObject,

    #[error("response body has no `results` array")]
    MissingResults,
}

/// The outer shape of a search or lookup response.
#[derive(Debug)]
pub struct SearchEnvelope<'a> {
    pub result_count: u64,
    pub results: &'a [Value],
}

impl SearchEnvelope<'_> {
    /// Maps every item, dropping the ones without identity fields.
    #[must_use]
    pub fn normalize(&self) -> Vec<Podcast> {
        self.results.iter().filter_map(normalize_record).collect()
    }
}

/// First stage: accept any object with a `results` array.
///
/// `resultCount` is optional; when absent or mistyped it defaults to the
/// length of `results`.
pub fn parse_envelope(body: &Value) -> Result<SearchEnvelope<'_>, PayloadError> {
    let obj = body.as_object().ok_or(PayloadError::NotAnObject)?;

    let results = obj
        .get("results")
        .and_then(Value::as_array)
        .ok_or(PayloadError::MissingResults)?;

    let result_count = obj
        .get("resultCount")
        .and_then(Value::as_u64)
        .unwrap_or(results.len() as u64);

    Ok(SearchEnvelope {
        result_count,
        results: results.as_slice(),
    })
}

/// Second stage: map one raw item into a [`Podcast`].
///
/// Returns `None` when `collectionId`, `collectionName` or `artistName` is
/// missing or unusable. Everything else falls back to an empty value.
#[must_use]
pub fn normalize_record(item: &Value) -> Option<Podcast> {
    let obj = item.as_object()?;

    let collection_id = int_field(obj, "collectionId")?;
    let collection_name = non_empty_str(obj, "collectionName")?;
    let artist_name = non_empty_str(obj, "artistName")?;

    Some(Podcast {
        collection_id,
        track_id: int_field(obj, "trackId").unwrap_or(0),
        artist_name,
        collection_name,
        track_name: str_field(obj, "trackName"),
        collection_view_url: str_field(obj, "collectionViewUrl"),
        feed_url: str_field(obj, "feedUrl"),
        artwork_url30: str_field(obj, "artworkUrl30"),
        artwork_url60: str_field(obj, "artworkUrl60"),
        artwork_url100: str_field(obj, "artworkUrl100"),
        artwork_url600: str_field(obj, "artworkUrl600"),
        collection_price: float_field(obj, "collectionPrice"),
        track_price: float_field(obj, "trackPrice"),
        release_date: str_field(obj, "releaseDate"),
        collection_explicitness: str_field(obj, "collectionExplicitness"),
        track_explicitness: str_field(obj, "trackExplicitness"),
        track_count: int_field(obj, "trackCount")
            .and_then(|n| i32::try_from(n).ok())
            .unwrap_or(0),
        track_time_millis: int_field(obj, "trackTimeMillis").unwrap_or(0),
        country: str_field(obj, "country"),
        currency: str_field(obj, "currency"),
        primary_genre_name: str_field(obj, "primaryGenreName"),
        content_advisory_rating: str_field(obj, "contentAdvisoryRating"),
        genre_ids: string_list(obj, "genreIds"),
        genres: string_list(obj, "genres"),
    })
}

fn str_field(obj: &Map<String, Value>, key: &str) -> String {
    obj.get(key)
        .and_then(Value::as_str)
        .map(str::to_string)
        .unwrap_or_default()
}

fn non_empty_str(obj: &Map<String, Value>, key: &str) -> Option<String> {
    let value = obj.get(key)?.as_str()?.trim();
    if value.is_empty() {
        None
    } else {
        Some(value.to_string())
    }
}

fn int_field(obj: &Map<String, Value>, key: &str) -> Option<i64> {
    match obj.get(key)? {
        Value::Number(n) => n.as_i64().or_else(|| n.as_f64().map(|f| f as i64)),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn float_field(obj: &Map<String, Value>, key: &str) -> f64 {
    match obj.get(key) {
        Some(Value::Number(n)) => n.as_f64().unwrap_or(0.0),
        Some(Value::String(s)) => s.trim().parse().unwrap_or(0.0),
        _ => 0.0,
    }
}

// Genre ids arrive as strings, but numbers are kept too.
fn string_list(obj: &Map<String, Value>, key: &str) -> Vec<String> {
    obj.get(key)
        .and_then(Value::as_array)
        .map(|items| {
            items
                .iter()
                .filter_map(|v| match v {
                    Value::String(s) => Some(s.clone()),
                    Value::Number(n) => Some(n.to_string()),
                    _ => None,
                })
                .collect()
        })
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn full_item() -> Value {
        json!({
            "collectionId": 1_234_567,
            "trackId": 1_234_567,
            "artistName": "Thmanyah",
            "collectionName": "فنجان",
            "trackName": "فنجان",
            "collectionViewUrl": "https://podcasts.apple.com/podcast/id1234567",
            "feedUrl": "https://feeds.example.com/fnjan.xml",
            "artworkUrl30": "https://img.example.com/30.jpg",
            "artworkUrl60": "https://img.example.com/60.jpg",
            "artworkUrl100": "https://img.example.com/100.jpg",
            "artworkUrl600": "https://img.example.com/600.jpg",
            "collectionPrice": 0.0,
            "trackPrice": 0.0,
            "releaseDate": "2024-05-01T12:00:00Z",
            "collectionExplicitness": "notExplicit",
            "trackExplicitness": "cleaned",
            "trackCount": 300,
            "trackTimeMillis": 5_400_000,
            "country": "SAU",
            "currency": "SAR",
            "primaryGenreName": "Society & Culture",
            "contentAdvisoryRating": "Clean",
            "genreIds": ["1324", "26"],
            "genres": ["Society & Culture", "Podcasts"]
        })
    }

    #[test]
    fn full_record_is_mapped() {
        let podcast = normalize_record(&full_item()).unwrap();
        assert_eq!(podcast.collection_id, 1_234_567);
        assert_eq!(podcast.collection_name, "فنجان");
        assert_eq!(podcast.track_count, 300);
        assert_eq!(podcast.genre_ids, vec!["1324", "26"]);
        assert_eq!(podcast.country, "SAU");
    }

    #[test]
    fn optional_fields_default_when_absent() {
        let item = json!({
            "collectionId": 42,
            "collectionName": "Minimal",
            "artistName": "Someone"
        });

        let podcast = normalize_record(&item).unwrap();
        assert_eq!(podcast.track_id, 0);
        assert_eq!(podcast.feed_url, "");
        assert_eq!(podcast.artwork_url600, "");
        assert!((podcast.collection_price - 0.0).abs() < f64::EPSILON);
        assert_eq!(podcast.track_count, 0);
        assert!(podcast.genres.is_empty());
        assert!(podcast.genre_ids.is_empty());
    }

    #[test]
    fn mistyped_optional_fields_default() {
        let item = json!({
            "collectionId": 42,
            "collectionName": "Odd",
            "artistName": "Someone",
            "feedUrl": 17,
            "trackCount": "a lot",
            "genres": "Comedy",
            "collectionPrice": null
        });

        let podcast = normalize_record(&item).unwrap();
        assert_eq!(podcast.feed_url, "");
        assert_eq!(podcast.track_count, 0);
        assert!(podcast.genres.is_empty());
        assert!((podcast.collection_price - 0.0).abs() < f64::EPSILON);
    }

    #[test]
    fn numeric_strings_and_numeric_genre_ids_are_accepted() {
        let item = json!({
            "collectionId": "987",
            "collectionName": "Strings",
            "artistName": "Someone",
            "genreIds": [1310, "26"]
        });

        let podcast = normalize_record(&item).unwrap();
        assert_eq!(podcast.collection_id, 987);
        assert_eq!(podcast.genre_ids, vec!["1310", "26"]);
    }

    #[test]
    fn items_without_identity_fields_are_dropped() {
        assert!(normalize_record(&json!({"collectionName": "x", "artistName": "y"})).is_none());
        assert!(normalize_record(&json!({"collectionId": 1, "artistName": "y"})).is_none());
        assert!(normalize_record(&json!({"collectionId": 1, "collectionName": "x"})).is_none());
        assert!(
            normalize_record(&json!({"collectionId": 1, "collectionName": " ", "artistName": "y"}))
                .is_none()
        );
        assert!(normalize_record(&json!("not an object")).is_none());
    }

    #[test]
    fn envelope_requires_results_array() {
        assert_eq!(
            parse_envelope(&json!([])).unwrap_err(),
            PayloadError::NotAnObject
        );
        assert_eq!(
            parse_envelope(&json!({"resultCount": 0})).unwrap_err(),
            PayloadError::MissingResults
        );
        assert_eq!(
            parse_envelope(&json!({"results": {}})).unwrap_err(),
            PayloadError::MissingResults
        );
    }

    #[test]
    fn envelope_result_count_defaults_to_length() {
        let body = json!({"results": [full_item(), full_item()]});
        let envelope = parse_envelope(&body).unwrap();
        assert_eq!(envelope.result_count, 2);
        assert_eq!(envelope.normalize().len(), 2);
    }

    #[test]
    fn envelope_normalize_skips_bad_items() {
        let body = json!({
            "resultCount": 3,
            "results": [full_item(), {"trackName": "orphan"}, full_item()]
        });
        let envelope = parse_envelope(&body).unwrap();
        assert_eq!(envelope.result_count, 3);
        assert_eq!(envelope.normalize().len(), 2);
    }
}
