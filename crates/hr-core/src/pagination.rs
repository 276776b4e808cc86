//! Pagination types for API responses

use serde::{Deserialize, Serialize};

pub const DEFAULT_PAGE_SIZE: i64 = 20;
pub const MAX_PAGE_SIZE: i64 = 500;

/// Pagination parameters (from query string)
#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct PaginationParams {
    #[serde(default = "default_page_size")]
    pub page_size: i64,
    #[serde(default)]
    pub offset: i64,
}

fn default_page_size() -> i64 {
    DEFAULT_PAGE_SIZE
}

impl Default for PaginationParams {
    fn default() -> Self {
        Self {
            page_size: DEFAULT_PAGE_SIZE,
            offset: 0,
        }
    }
}

impl PaginationParams {
    pub fn new(page_size: i64, offset: i64) -> Self {
        Self { page_size, offset }.normalized()
    }

    /// Clamp user supplied values into a usable range
    pub fn normalized(self) -> Self {
        Self {
            page_size: self.page_size.clamp(1, MAX_PAGE_SIZE),
            offset: self.offset.max(0),
        }
    }

    pub fn limit(&self) -> i64 {
        self.page_size
    }
}

/// Paginated collection response
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    pub total: i64,
    pub count: usize,
    pub page_size: i64,
    pub offset: i64,
    pub elements: Vec<T>,
}

impl<T> Page<T> {
    pub fn new(elements: Vec<T>, total: i64, params: PaginationParams) -> Self {
        Self {
            total,
            count: elements.len(),
            page_size: params.page_size,
            offset: params.offset,
            elements,
        }
    }

    /// Paginate an already materialized list
    pub fn slice(all: Vec<T>, params: PaginationParams) -> Self {
        let total = all.len() as i64;
        let elements = all
            .into_iter()
            .skip(params.offset as usize)
            .take(params.page_size as usize)
            .collect();
        Self::new(elements, total, params)
    }

    pub fn map<U, F: FnMut(T) -> U>(self, f: F) -> Page<U> {
        Page {
            total: self.total,
            count: self.count,
            page_size: self.page_size,
            offset: self.offset,
            elements: self.elements.into_iter().map(f).collect(),
        }
    }

    pub fn has_next(&self) -> bool {
        self.offset + (self.count as i64) < self.total
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_params_are_clamped() {
        let params = PaginationParams::new(10_000, -5);
        assert_eq!(params.page_size, MAX_PAGE_SIZE);
        assert_eq!(params.offset, 0);
        assert_eq!(PaginationParams::new(0, 3).page_size, 1);
    }

    #[test]
    fn test_slice() {
        let page = Page::slice((1..=7).collect::<Vec<_>>(), PaginationParams::new(3, 3));
        assert_eq!(page.elements, vec![4, 5, 6]);
        assert_eq!(page.total, 7);
        assert_eq!(page.count, 3);
        assert!(page.has_next());
    }

    #[test]
    fn test_slice_past_end() {
        let page = Page::slice(vec![1, 2], PaginationParams::new(5, 10));
        assert!(page.elements.is_empty());
        assert!(!page.has_next());
    }
}
