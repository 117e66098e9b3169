//! Pagination bounds and page-to-range arithmetic.

use serde::Deserialize;

use crate::error::{ApiError, ApiResult};

/// Page used when the request omits `page`.
pub const DEFAULT_PAGE: usize = 1;

/// Page size used when the request omits `page_size`.
pub const DEFAULT_PAGE_SIZE: usize = 100;

/// Largest page a client may request.
pub const MAX_PAGE_SIZE: usize = 1000;

/// Raw pagination query parameters.
#[derive(Debug, Default, Deserialize)]
pub struct PageParams {
    pub page: Option<usize>,
    pub page_size: Option<usize>,
}

/// A validated page and the global index range it covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Page {
    pub page: usize,
    pub page_size: usize,
    /// Inclusive start of the covered global range.
    pub start: usize,
    /// Exclusive end of the covered global range.
    pub end: usize,
}

impl Page {
    /// Apply defaults and bounds: `page >= 1`, `1 <= page_size <= 1000`.
    pub fn from_params(page: Option<usize>, page_size: Option<usize>) -> ApiResult<Self> {
        let page = page.unwrap_or(DEFAULT_PAGE);
        let page_size = page_size.unwrap_or(DEFAULT_PAGE_SIZE);

        if page < 1 {
            return Err(ApiError::Validation("page must be >= 1".to_string()));
        }
        if page_size < 1 || page_size > MAX_PAGE_SIZE {
            return Err(ApiError::Validation(format!(
                "page_size must be between 1 and {}",
                MAX_PAGE_SIZE
            )));
        }

        let start = (page - 1)
            .checked_mul(page_size)
            .ok_or_else(|| ApiError::Validation("page is out of range".to_string()))?;
        let end = start
            .checked_add(page_size)
            .ok_or_else(|| ApiError::Validation("page is out of range".to_string()))?;

        Ok(Self {
            page,
            page_size,
            start,
            end,
        })
    }
}

impl TryFrom<PageParams> for Page {
    type Error = ApiError;

    fn try_from(params: PageParams) -> ApiResult<Self> {
        Self::from_params(params.page, params.page_size)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let page = Page::try_from(PageParams::default()).unwrap();
        assert_eq!(
            page,
            Page {
                page: 1,
                page_size: 100,
                start: 0,
                end: 100
            }
        );
    }

    #[test]
    fn test_page_maps_to_global_range() {
        let page = Page::from_params(Some(3), Some(25)).unwrap();
        assert_eq!((page.start, page.end), (50, 75));
    }

    #[test]
    fn test_bounds_rejected() {
        assert!(matches!(
            Page::from_params(Some(0), None),
            Err(ApiError::Validation(_))
        ));
        assert!(Page::from_params(None, Some(0)).is_err());
        assert!(Page::from_params(None, Some(1001)).is_err());
        assert!(Page::from_params(None, Some(1000)).is_ok());
        assert!(Page::from_params(Some(usize::MAX), Some(1000)).is_err());
    }
}
