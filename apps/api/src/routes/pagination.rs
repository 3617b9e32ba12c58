use serde::{Deserialize, Serialize};

use crate::errors::AppError;

pub const MAX_PER_PAGE: u64 = 100;
const DEFAULT_PER_PAGE: u64 = 20;

#[derive(Debug, Default, Deserialize)]
pub struct PageParams {
    pub page: Option<u64>,
    pub per_page: Option<u64>,
}

/// Validated page settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Page {
    pub page: u64,
    pub per_page: u64,
}

impl PageParams {
    pub fn validate(&self) -> Result<Page, AppError> {
        let page = self.page.unwrap_or(1);
        let per_page = self.per_page.unwrap_or(DEFAULT_PER_PAGE);
        if page < 1 {
            return Err(AppError::Validation("page must be at least 1".to_string()));
        }
        if !(1..=MAX_PER_PAGE).contains(&per_page) {
            return Err(AppError::Validation(format!(
                "per_page must be between 1 and {MAX_PER_PAGE}"
            )));
        }
        // The row offset has to fit a Postgres BIGINT.
        let in_range = (page - 1)
            .checked_mul(per_page)
            .and_then(|offset| i64::try_from(offset).ok())
            .is_some();
        if !in_range {
            return Err(AppError::Validation("page is out of range".to_string()));
        }
        Ok(Page { page, per_page })
    }
}

impl Page {
    pub fn limit(&self) -> i64 {
        i64::try_from(self.per_page).unwrap_or(i64::MAX)
    }

    pub fn offset(&self) -> i64 {
        i64::try_from(self.skipped()).unwrap_or(i64::MAX)
    }

    /// Rows before this page, saturating for pages no query can reach.
    fn skipped(&self) -> u64 {
        self.page.saturating_sub(1).saturating_mul(self.per_page)
    }
}

/// Navigation info returned next to a page of results.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PaginationStats {
    pub total: u64,
    pub page: u64,
    pub per_page: u64,
    pub pages: u64,
    pub previous: Option<u64>,
    pub next: Option<u64>,
}

impl PaginationStats {
    pub fn new(page: Page, current_count: u64, total: i64) -> Self {
        let total = total.max(0) as u64;
        let seen = page.skipped().saturating_add(current_count);
        Self {
            total,
            page: page.page,
            per_page: page.per_page,
            pages: total.div_ceil(page.per_page.max(1)),
            previous: (page.page > 1 && total > 0).then_some(page.page - 1),
            next: (seen < total).then(|| page.page.saturating_add(1)),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct Paginated<T> {
    pub items: Vec<T>,
    #[serde(flatten)]
    pub pagination: PaginationStats,
}

impl<T> Paginated<T> {
    pub fn new(items: Vec<T>, page: Page, total: i64) -> Self {
        let pagination = PaginationStats::new(page, items.len() as u64, total);
        Self { items, pagination }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let page = PageParams::default().validate().unwrap();
        assert_eq!(page, Page { page: 1, per_page: 20 });
        assert_eq!(page.offset(), 0);
    }

    #[test]
    fn test_bounds() {
        let bad = |page, per_page| PageParams { page: Some(page), per_page: Some(per_page) }.validate();
        assert!(bad(0, 10).is_err());
        assert!(bad(1, 0).is_err());
        assert!(bad(1, 101).is_err());
        assert_eq!(bad(3, 100).unwrap().offset(), 200);
    }

    #[test]
    fn test_huge_page_is_a_validation_error() {
        let params = |page| PageParams { page: Some(page), per_page: Some(100) };
        assert_eq!(params(u64::MAX).validate().unwrap_err().code(), "VALIDATION_ERROR");
        let err = PageParams { page: Some(1 << 62), per_page: Some(4) }.validate().unwrap_err();
        assert_eq!(err.code(), "VALIDATION_ERROR");

        let last_ok = (i64::MAX as u64) / 100 + 1;
        assert!(params(last_ok).validate().unwrap().offset() >= 0);
        assert!(params(last_ok + 1).validate().is_err());
    }

    #[test]
    fn test_unvalidated_pages_saturate() {
        let page = Page { page: u64::MAX, per_page: 100 };
        assert_eq!(page.offset(), i64::MAX);
        let stats = PaginationStats::new(page, 0, 10);
        assert_eq!(stats.next, None);
        assert_eq!(stats.previous, Some(u64::MAX - 1));
    }

    #[test]
    fn test_stats() {
        let page = Page { page: 2, per_page: 10 };
        let stats = PaginationStats::new(page, 10, 25);
        assert_eq!(stats.pages, 3);
        assert_eq!(stats.previous, Some(1));
        assert_eq!(stats.next, Some(3));

        let last = PaginationStats::new(Page { page: 3, per_page: 10 }, 5, 25);
        assert_eq!(last.next, None);
    }
}
