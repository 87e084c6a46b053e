pub const MAX_PAGE_SIZE: i64 = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    pub limit: i64,
    pub offset: Option<i64>,
}

impl Pagination {
    pub fn new(limit: i64, offset: Option<i64>) -> Self {
        Self { limit, offset }
    }

    /// Builds a pagination from 1-based `page` and `size`, falling back to the first page of `default_size`.
    ///
    /// `size` is capped at `MAX_PAGE_SIZE` and the offset saturates instead of overflowing.
    pub fn from_page(page: Option<i64>, size: Option<i64>, default_size: i64) -> Self {
        let size = size.filter(|s| *s > 0).unwrap_or(default_size).min(MAX_PAGE_SIZE);
        let page = page.filter(|p| *p > 0).unwrap_or(1);
        Self::new(size, Some((page - 1).saturating_mul(size)))
    }
}
