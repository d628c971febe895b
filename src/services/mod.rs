pub mod search_service;
pub mod search_service_impl;
pub use search_service::{MAX_RANDOM_LIMIT, RECENT_SEARCH_LIMIT, SearchError, SearchService};
pub use search_service_impl::SeaOrmSearchService;
