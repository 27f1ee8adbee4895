use serde::{Deserialize, Serialize};

use crate::search::repo::SearchHistorySummary;

/// Query string of `GET /api/search`. `filters` arrives JSON-encoded.
#[derive(Debug, Deserialize)]
pub struct SearchParams {
    pub q: Option<String>,
    pub filters: Option<String>,
}

/// Pagination input for the history listing. Absent or non-positive values
/// coerce to the defaults (page 1, 20 entries per page).
#[derive(Debug, Default, Deserialize)]
pub struct HistoryQuery {
    page: Option<i64>,
    limit: Option<i64>,
}

impl HistoryQuery {
    pub fn page(&self) -> i64 {
        match self.page {
            Some(p) if p > 0 => p,
            _ => 1,
        }
    }

    pub fn limit(&self) -> i64 {
        match self.limit {
            Some(l) if l > 0 => l,
            _ => 20,
        }
    }

    pub fn offset(&self) -> i64 {
        (self.page() - 1) * self.limit()
    }
}

#[derive(Debug, Serialize)]
pub struct HistoryPage {
    pub history: Vec<SearchHistorySummary>,
    pub pagination: PaginationMeta,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PaginationMeta {
    pub total: i64,
    pub page: i64,
    pub limit: i64,
    pub total_pages: i64,
}

impl PaginationMeta {
    pub fn new(total: i64, page: i64, limit: i64) -> Self {
        Self {
            total,
            page,
            limit,
            total_pages: (total + limit - 1) / limit,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn query(page: Option<i64>, limit: Option<i64>) -> HistoryQuery {
        HistoryQuery { page, limit }
    }

    #[test]
    fn defaults_apply_when_unspecified() {
        let q = query(None, None);
        assert_eq!(q.page(), 1);
        assert_eq!(q.limit(), 20);
        assert_eq!(q.offset(), 0);
    }

    #[test]
    fn non_positive_values_coerce_to_defaults() {
        let q = query(Some(0), Some(-5));
        assert_eq!(q.page(), 1);
        assert_eq!(q.limit(), 20);
    }

    #[test]
    fn offset_skips_earlier_pages() {
        // Page 2 with 2 per page lands on the 3rd newest entry.
        let q = query(Some(2), Some(2));
        assert_eq!(q.offset(), 2);
    }

    #[test]
    fn total_pages_rounds_up() {
        assert_eq!(PaginationMeta::new(5, 2, 2).total_pages, 3);
        assert_eq!(PaginationMeta::new(40, 1, 20).total_pages, 2);
        assert_eq!(PaginationMeta::new(41, 1, 20).total_pages, 3);
        assert_eq!(PaginationMeta::new(0, 1, 20).total_pages, 0);
    }

    #[test]
    fn pagination_meta_uses_camel_case() {
        let json = serde_json::to_string(&PaginationMeta::new(5, 2, 2)).unwrap();
        assert!(json.contains("totalPages"));
    }
}
