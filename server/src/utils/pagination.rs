use serde::Serialize;

use crate::utils::error::{AppError, AppResult};

pub const DEFAULT_PAGE_SIZE: usize = 10;
pub const MAX_PAGE_SIZE: usize = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageParams {
    pub page: usize,
    pub page_size: usize,
}

impl PageParams {
    /// Missing values fall back to the defaults; `page_size` is capped.
    pub fn new(page: Option<usize>, page_size: Option<usize>) -> Self {
        Self {
            page: page.unwrap_or(1).max(1),
            page_size: page_size
                .unwrap_or(DEFAULT_PAGE_SIZE)
                .clamp(1, MAX_PAGE_SIZE),
        }
    }

    /// `None` when the page lies beyond any addressable offset.
    fn offset(&self) -> Option<usize> {
        (self.page - 1).checked_mul(self.page_size)
    }
}

impl Default for PageParams {
    fn default() -> Self {
        Self::new(None, None)
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Page<T> {
    pub count: usize,
    pub page: usize,
    pub page_size: usize,
    pub results: Vec<T>,
}

impl<T> Page<T> {
    /// Slices an already ordered collection. The first page always exists,
    /// even when empty; any later page past the end is an error.
    pub fn paginate(items: Vec<T>, params: PageParams) -> AppResult<Self> {
        let count = items.len();
        let offset = match params.offset() {
            Some(offset) if params.page == 1 || offset < count => offset,
            _ => return Err(AppError::not_found("Invalid page.")),
        };

        let results = items
            .into_iter()
            .skip(offset)
            .take(params.page_size)
            .collect();

        Ok(Self {
            count,
            page: params.page,
            page_size: params.page_size,
            results,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_params_are_clamped() {
        let params = PageParams::new(Some(0), Some(10_000));
        assert_eq!(params.page, 1);
        assert_eq!(params.page_size, MAX_PAGE_SIZE);
    }

    #[test]
    fn test_second_page() {
        let page = Page::paginate((1..=25).collect(), PageParams::new(Some(2), None)).unwrap();
        assert_eq!(page.count, 25);
        assert_eq!(page.results, (11..=20).collect::<Vec<_>>());
    }

    #[test]
    fn test_empty_first_page_is_ok() {
        let page = Page::<u8>::paginate(Vec::new(), PageParams::default()).unwrap();
        assert_eq!(page.count, 0);
        assert!(page.results.is_empty());
    }

    #[test]
    fn test_page_past_end_is_not_found() {
        let result = Page::paginate(vec![1, 2, 3], PageParams::new(Some(2), Some(3)));
        assert!(matches!(result, Err(AppError::NotFound(_))));
    }

    #[test]
    fn test_huge_page_is_not_found() {
        let result = Page::paginate(vec![1, 2, 3], PageParams::new(Some(usize::MAX), Some(50)));
        assert!(matches!(result, Err(AppError::NotFound(_))));
    }
}
