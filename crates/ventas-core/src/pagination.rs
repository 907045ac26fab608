//! # Pagination
//!
//! Turns `page`/`limit` query parameters into a store offset and wraps a
//! fetched slice into the list envelope every list endpoint returns.
//!
//! ```text
//! page=3, limit=20  ──►  skip = (3 − 1) × 20 = 40
//!
//! total=41, limit=20 ──► totalPages = ⌈41 / 20⌉ = 3
//! total=0            ──► totalPages = 0
//! ```

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;
use crate::{DEFAULT_LIMIT, DEFAULT_PAGE, MAX_LIMIT};

/// A validated page request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pagination {
    pub page: u32,
    pub limit: u32,
}

impl Default for Pagination {
    fn default() -> Self {
        Pagination {
            page: DEFAULT_PAGE,
            limit: DEFAULT_LIMIT,
        }
    }
}

impl Pagination {
    /// Builds a page request, rejecting `page < 1` and `limit` outside
    /// `1..=MAX_LIMIT`.
    ///
    /// ```rust
    /// use ventas_core::Pagination;
    ///
    /// assert!(Pagination::new(1, 20).is_ok());
    /// assert!(Pagination::new(0, 20).is_err());
    /// assert!(Pagination::new(1, 101).is_err());
    /// ```
    pub fn new(page: u32, limit: u32) -> Result<Self, ValidationError> {
        if page < 1 {
            return Err(ValidationError::OutOfRange {
                field: "page".to_string(),
                min: 1.0,
                max: f64::from(u32::MAX),
            });
        }
        if !(1..=MAX_LIMIT).contains(&limit) {
            return Err(ValidationError::OutOfRange {
                field: "limit".to_string(),
                min: 1.0,
                max: f64::from(MAX_LIMIT),
            });
        }
        Ok(Pagination { page, limit })
    }

    /// Builds a page request from optional query parameters.
    pub fn from_query(page: Option<u32>, limit: Option<u32>) -> Result<Self, ValidationError> {
        Pagination::new(page.unwrap_or(DEFAULT_PAGE), limit.unwrap_or(DEFAULT_LIMIT))
    }

    /// Number of documents to skip.
    pub fn skip(&self) -> u64 {
        u64::from(self.page.saturating_sub(1)) * u64::from(self.limit)
    }

    /// Number of pages needed for `total` documents.
    pub fn total_pages(&self, total: u64) -> u64 {
        total_pages(total, self.limit)
    }
}

/// Ceiling division of `total` by `limit`. A zero limit yields zero pages.
pub fn total_pages(total: u64, limit: u32) -> u64 {
    if limit == 0 {
        return 0;
    }
    total.div_ceil(u64::from(limit))
}

/// One page of results.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Page<T> {
    pub data: Vec<T>,
    pub total: u64,
    pub page: u32,
    pub limit: u32,
    #[serde(rename = "totalPages")]
    pub total_pages: u64,
}

impl<T> Page<T> {
    /// Wraps a fetched slice.
    pub fn new(data: Vec<T>, total: u64, pagination: Pagination) -> Self {
        Page {
            data,
            total,
            page: pagination.page,
            limit: pagination.limit,
            total_pages: pagination.total_pages(total),
        }
    }

    /// Attaches the filter that produced this page so it is echoed back.
    pub fn with_filter<F>(self, filter: F) -> Filtered<T, F> {
        Filtered { page: self, filter }
    }
}

/// A page plus the filter parameters that selected it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Filtered<T, F> {
    #[serde(flatten)]
    pub page: Page<T>,
    #[serde(flatten)]
    pub filter: F,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_skip() {
        assert_eq!(Pagination::new(1, 20).unwrap().skip(), 0);
        assert_eq!(Pagination::new(3, 20).unwrap().skip(), 40);
        assert_eq!(Pagination::new(2, 100).unwrap().skip(), 100);
    }

    #[test]
    fn test_total_pages_is_ceiling() {
        assert_eq!(total_pages(0, 20), 0);
        assert_eq!(total_pages(1, 20), 1);
        assert_eq!(total_pages(20, 20), 1);
        assert_eq!(total_pages(21, 20), 2);
        assert_eq!(total_pages(41, 20), 3);
    }

    #[test]
    fn test_total_pages_matches_ceil_for_all_small_inputs() {
        for limit in 1..=25u32 {
            for total in 0..=200u64 {
                let expected = (total as f64 / limit as f64).ceil() as u64;
                assert_eq!(total_pages(total, limit), expected, "{total}/{limit}");
            }
        }
    }

    #[test]
    fn test_bounds() {
        assert!(Pagination::new(0, 1).is_err());
        assert!(Pagination::new(1, 0).is_err());
        assert!(Pagination::new(1, 100).is_ok());
        assert!(Pagination::new(1, 101).is_err());
        assert_eq!(Pagination::from_query(None, None).unwrap(), Pagination::default());
    }

    #[test]
    fn test_filtered_page_shape() {
        let page = Page::new(vec![1, 2], 5, Pagination::new(1, 2).unwrap())
            .with_filter(json!({"categoria": "Bebidas"}));

        assert_eq!(
            serde_json::to_value(&page).unwrap(),
            json!({
                "data": [1, 2],
                "total": 5,
                "page": 1,
                "limit": 2,
                "totalPages": 3,
                "categoria": "Bebidas",
            })
        );
    }
}
