use super::ApiError;

pub fn validate_collection_id(id: i64) -> Result<i64, ApiError> {
    if id <= 0 {
        return Err(ApiError::validation(format!(
            "Invalid collection ID: {}. ID must be a positive integer",
            id
        )));
    }
    Ok(id)
}

pub fn validate_limit(limit: usize, max: usize) -> Result<usize, ApiError> {
    const MIN_LIMIT: usize = 1;

    if !(MIN_LIMIT..=max).contains(&limit) {
        return Err(ApiError::validation(format!(
            "Invalid limit: {}. Limit must be between {} and {}",
            limit, MIN_LIMIT, max
        )));
    }
    Ok(limit)
}

pub fn validate_search_query(query: &str) -> Result<&str, ApiError> {
    let trimmed = query.trim();
    if trimmed.is_empty() {
        return Err(ApiError::validation("Search query cannot be empty"));
    }

    Ok(trimmed)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_collection_id() {
        assert!(validate_collection_id(1).is_ok());
        assert!(validate_collection_id(1_535_809_341).is_ok());
        assert!(validate_collection_id(0).is_err());
        assert!(validate_collection_id(-1).is_err());
    }

    #[test]
    fn test_validate_limit() {
        assert!(validate_limit(1, 50).is_ok());
        assert!(validate_limit(8, 50).is_ok());
        assert!(validate_limit(50, 50).is_ok());
        assert!(validate_limit(0, 50).is_err());
        assert!(validate_limit(51, 50).is_err());
    }

    #[test]
    fn test_validate_search_query() {
        assert_eq!(validate_search_query("  فنجان  ").ok(), Some("فنجان"));
        assert!(validate_search_query("Hardcore History").is_ok());
        assert!(validate_search_query("").is_err());
        assert!(validate_search_query("   ").is_err());
        assert!(validate_search_query(&"a".repeat(500)).is_ok());
    }
}
