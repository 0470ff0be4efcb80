//! Page-number pagination (`?page=N&page_size=M`).
//!
//! Responses are wrapped as `{count, next, previous, results}`. The links keep
//! every other query parameter of the request and only swap `page`.

use axum::http::Uri;
use serde::{Deserialize, Serialize};

use crate::error::{AppError, AppResult};

const PAGE_PARAM: &str = "page";
const LAST_PAGE: &str = "last";

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PageParams {
    pub page: Option<String>,
    pub page_size: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageNumber {
    Number(u64),
    Last,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub number: PageNumber,
    pub size: u64,
}

impl PageRequest {
    /// A bad `page_size` falls back to the default; a bad `page` is an error.
    pub fn from_params(params: &PageParams, default_size: u32, max_size: u32) -> AppResult<Self> {
        let size = params
            .page_size
            .as_deref()
            .and_then(|s| s.trim().parse::<u64>().ok())
            .filter(|s| *s > 0)
            .map(|s| s.min(u64::from(max_size)))
            .unwrap_or(u64::from(default_size));

        let number = match params.page.as_deref().map(str::trim) {
            None | Some("") => PageNumber::Number(1),
            Some(LAST_PAGE) => PageNumber::Last,
            Some(raw) => match raw.parse::<u64>() {
                Ok(n) if n > 0 => PageNumber::Number(n),
                _ => return Err(AppError::InvalidPage),
            },
        };

        Ok(PageRequest { number, size })
    }

    /// Resolves the page number against the total row count.
    ///
    /// An empty result set still has one (empty) first page.
    pub fn resolve(&self, count: i64) -> AppResult<u64> {
        let count = u64::try_from(count).unwrap_or(0);
        let num_pages = count.div_ceil(self.size).max(1);
        match self.number {
            PageNumber::Last => Ok(num_pages),
            PageNumber::Number(n) if n <= num_pages => Ok(n),
            PageNumber::Number(_) => Err(AppError::InvalidPage),
        }
    }

    pub fn limit(&self) -> i64 {
        i64::try_from(self.size).unwrap_or(i64::MAX)
    }

    pub fn offset(&self, page: u64) -> i64 {
        i64::try_from((page - 1).saturating_mul(self.size)).unwrap_or(i64::MAX)
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Paginated<T: Serialize> {
    pub count: i64,
    pub next: Option<String>,
    pub previous: Option<String>,
    pub results: Vec<T>,
}

impl<T: Serialize> Paginated<T> {
    pub fn new(results: Vec<T>, count: i64, page: u64, size: u64, uri: &Uri) -> Self {
        let total = u64::try_from(count).unwrap_or(0);
        let has_next = page.saturating_mul(size) < total;
        Paginated {
            count,
            next: has_next.then(|| page_link(uri, page + 1)),
            previous: (page > 1).then(|| page_link(uri, page - 1)),
            results,
        }
    }
}

/// Request path with `page` replaced; the first page drops the parameter.
pub fn page_link(uri: &Uri, page: u64) -> String {
    let mut pairs: Vec<(String, String)> =
        serde_urlencoded::from_str(uri.query().unwrap_or_default()).unwrap_or_default();
    pairs.retain(|(k, _)| k != PAGE_PARAM);
    if page > 1 {
        pairs.push((PAGE_PARAM.to_string(), page.to_string()));
    }

    let query = serde_urlencoded::to_string(&pairs).unwrap_or_default();
    if query.is_empty() {
        uri.path().to_string()
    } else {
        format!("{}?{}", uri.path(), query)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params(page: Option<&str>, page_size: Option<&str>) -> PageParams {
        PageParams {
            page: page.map(String::from),
            page_size: page_size.map(String::from),
        }
    }

    #[test]
    fn defaults_to_first_page_of_default_size() {
        let req = PageRequest::from_params(&params(None, None), 2, 100).unwrap();
        assert_eq!(req.number, PageNumber::Number(1));
        assert_eq!(req.size, 2);
        assert_eq!(req.offset(1), 0);
        assert_eq!(req.limit(), 2);
    }

    #[test]
    fn page_size_is_capped_and_bad_values_fall_back() {
        assert_eq!(PageRequest::from_params(&params(None, Some("500")), 2, 100).unwrap().size, 100);
        assert_eq!(PageRequest::from_params(&params(None, Some("abc")), 2, 100).unwrap().size, 2);
        assert_eq!(PageRequest::from_params(&params(None, Some("0")), 2, 100).unwrap().size, 2);
    }

    #[test]
    fn bad_page_is_invalid() {
        for raw in ["0", "-1", "two"] {
            assert!(matches!(
                PageRequest::from_params(&params(Some(raw), None), 2, 100),
                Err(AppError::InvalidPage)
            ));
        }
    }

    #[test]
    fn resolve_checks_range() {
        let req = PageRequest::from_params(&params(Some("3"), None), 2, 100).unwrap();
        assert_eq!(req.resolve(5).unwrap(), 3);
        assert!(matches!(req.resolve(4), Err(AppError::InvalidPage)));

        let first = PageRequest::from_params(&params(None, None), 2, 100).unwrap();
        assert_eq!(first.resolve(0).unwrap(), 1);

        let last = PageRequest::from_params(&params(Some("last"), None), 2, 100).unwrap();
        assert_eq!(last.resolve(5).unwrap(), 3);
        assert_eq!(last.offset(3), 4);
    }

    #[test]
    fn links_swap_page_and_keep_other_params() {
        let uri: Uri = "/api/theatre/reservations?page=2&page_size=3".parse().unwrap();
        let page: Paginated<i32> = Paginated::new(vec![4, 5, 6], 9, 2, 3, &uri);

        assert_eq!(
            page.next.as_deref(),
            Some("/api/theatre/reservations?page_size=3&page=3")
        );
        assert_eq!(
            page.previous.as_deref(),
            Some("/api/theatre/reservations?page_size=3")
        );
    }

    #[test]
    fn last_page_has_no_next() {
        let uri: Uri = "/api/theatre/reservations".parse().unwrap();
        let page: Paginated<i32> = Paginated::new(vec![1], 3, 2, 2, &uri);
        assert!(page.next.is_none());
        assert_eq!(page.previous.as_deref(), Some("/api/theatre/reservations"));
    }
}
