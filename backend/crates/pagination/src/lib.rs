//! Page request primitives for offset-paginated listings.
//!
//! Listings in the employee backend are paged by a zero-based page number and
//! a page size. [`PageRequest`] validates both once so repositories and caches
//! can rely on the bounds without re-checking them.

use serde::{Deserialize, Serialize};

/// Page size applied when callers do not choose one.
pub const DEFAULT_PAGE_SIZE: u32 = 10;

/// Largest page size a caller may request.
pub const MAX_PAGE_SIZE: u32 = 100;

/// Largest zero-based page number accepted.
///
/// Keeps `page * size` comfortably inside `i64` for SQL `OFFSET` clauses.
pub const MAX_PAGE: u32 = 1_000_000;

/// Errors raised when page parameters are out of bounds.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PageRequestError {
    /// Page size was zero.
    #[error("page size must be at least 1")]
    EmptyPage,
    /// Page size exceeded [`MAX_PAGE_SIZE`].
    #[error("page size must be at most {max}")]
    PageTooLarge {
        /// Upper bound that was exceeded.
        max: u32,
    },
    /// Page number exceeded [`MAX_PAGE`].
    #[error("page number must be at most {max}")]
    PageOutOfRange {
        /// Upper bound that was exceeded.
        max: u32,
    },
}

/// Validated zero-based page request.
///
/// # Examples
/// ```
/// use pagination::PageRequest;
///
/// let request = PageRequest::new(2, 10).expect("valid page");
/// assert_eq!(request.offset(), 20);
/// assert_eq!(request.limit(), 10);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "RawPageRequest", into = "RawPageRequest")]
pub struct PageRequest {
    page: u32,
    size: u32,
}

impl PageRequest {
    /// Validate and build a page request.
    ///
    /// # Errors
    ///
    /// Returns [`PageRequestError`] when `size` is zero or above
    /// [`MAX_PAGE_SIZE`], or when `page` is above [`MAX_PAGE`].
    pub const fn new(page: u32, size: u32) -> Result<Self, PageRequestError> {
        if size == 0 {
            return Err(PageRequestError::EmptyPage);
        }
        if size > MAX_PAGE_SIZE {
            return Err(PageRequestError::PageTooLarge { max: MAX_PAGE_SIZE });
        }
        if page > MAX_PAGE {
            return Err(PageRequestError::PageOutOfRange { max: MAX_PAGE });
        }
        Ok(Self { page, size })
    }

    /// First page using [`DEFAULT_PAGE_SIZE`].
    #[must_use]
    pub const fn first() -> Self {
        Self {
            page: 0,
            size: DEFAULT_PAGE_SIZE,
        }
    }

    /// Zero-based page number.
    #[must_use]
    pub const fn page(&self) -> u32 {
        self.page
    }

    /// Number of items per page.
    #[must_use]
    pub const fn size(&self) -> u32 {
        self.size
    }

    /// Number of items to skip before this page starts.
    #[must_use]
    pub const fn offset(&self) -> u64 {
        (self.page as u64) * (self.size as u64)
    }

    /// Maximum number of items on this page.
    #[must_use]
    pub const fn limit(&self) -> u64 {
        self.size as u64
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self::first()
    }
}

#[derive(Serialize, Deserialize)]
struct RawPageRequest {
    page: u32,
    size: u32,
}

impl TryFrom<RawPageRequest> for PageRequest {
    type Error = PageRequestError;

    fn try_from(value: RawPageRequest) -> Result<Self, Self::Error> {
        Self::new(value.page, value.size)
    }
}

impl From<PageRequest> for RawPageRequest {
    fn from(value: PageRequest) -> Self {
        Self {
            page: value.page,
            size: value.size,
        }
    }
}

#[cfg(test)]
mod tests {
    //! Bounds and offset coverage for page requests.

    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(0, 10, 0)]
    #[case(1, 10, 10)]
    #[case(3, 25, 75)]
    fn offset_is_page_times_size(#[case] page: u32, #[case] size: u32, #[case] expected: u64) {
        let request = PageRequest::new(page, size).expect("valid request");
        assert_eq!(request.offset(), expected);
        assert_eq!(request.limit(), u64::from(size));
    }

    #[rstest]
    #[case(0, 0, PageRequestError::EmptyPage)]
    #[case(0, MAX_PAGE_SIZE + 1, PageRequestError::PageTooLarge { max: MAX_PAGE_SIZE })]
    #[case(MAX_PAGE + 1, 10, PageRequestError::PageOutOfRange { max: MAX_PAGE })]
    fn out_of_bounds_requests_are_rejected(
        #[case] page: u32,
        #[case] size: u32,
        #[case] expected: PageRequestError,
    ) {
        assert_eq!(PageRequest::new(page, size), Err(expected));
    }

    #[rstest]
    fn default_is_first_page_of_ten() {
        let request = PageRequest::default();
        assert_eq!(request.page(), 0);
        assert_eq!(request.size(), DEFAULT_PAGE_SIZE);
    }

    #[rstest]
    fn deserialisation_applies_validation() {
        let err = serde_json::from_str::<PageRequest>(r#"{"page":0,"size":0}"#)
            .expect_err("zero size rejected");
        assert!(err.to_string().contains("page size must be at least 1"));

        let ok: PageRequest =
            serde_json::from_str(r#"{"page":4,"size":10}"#).expect("valid payload");
        assert_eq!(ok.offset(), 40);
    }
}
