// Page-number pagination: `?page=N` or `?page=last`, fixed size per collection

use axum::http::Uri;
use serde::Serialize;

use crate::error::{AppError, AppResult};

/// List envelope, `{count, next, previous, results}`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Page<T> {
    pub count: i64,
    pub next: Option<String>,
    pub previous: Option<String>,
    pub results: Vec<T>,
}

/// The slice of a collection a page request resolves to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageWindow {
    pub number: i64,
    pub num_pages: i64,
    pub limit: i64,
    pub offset: i64,
}

impl PageWindow {
    /// An empty collection still has one (empty) first page.
    pub fn resolve(page: Option<&str>, count: i64, page_size: u32) -> AppResult<Self> {
        let limit = i64::from(page_size.max(1));
        let num_pages = ((count + limit - 1) / limit).max(1);

        let number = match page {
            None => 1,
            Some("last") => num_pages,
            Some(raw) => raw.parse::<i64>().map_err(|_| invalid_page())?,
        };
        if number < 1 || number > num_pages {
            return Err(invalid_page());
        }

        Ok(Self { number, num_pages, limit, offset: (number - 1) * limit })
    }

    pub fn has_next(&self) -> bool {
        self.number < self.num_pages
    }

    pub fn has_previous(&self) -> bool {
        self.number > 1
    }
}

fn invalid_page() -> AppError {
    AppError::NotFound("Invalid page.".to_string())
}

/// `uri` with its `page` parameter rewritten; page 1 drops the parameter.
pub fn page_link(uri: &Uri, page: i64) -> String {
    let mut pairs: Vec<String> = uri
        .query()
        .unwrap_or_default()
        .split('&')
        .filter(|pair| !pair.is_empty())
        .filter(|pair| pair.split('=').next() != Some("page"))
        .map(str::to_string)
        .collect();
    if page != 1 {
        pairs.push(format!("page={}", page));
    }

    if pairs.is_empty() {
        uri.path().to_string()
    } else {
        format!("{}?{}", uri.path(), pairs.join("&"))
    }
}

impl<T> Page<T> {
    pub fn new(uri: &Uri, window: PageWindow, count: i64, results: Vec<T>) -> Self {
        Self {
            count,
            next: window.has_next().then(|| page_link(uri, window.number + 1)),
            previous: window.has_previous().then(|| page_link(uri, window.number - 1)),
            results,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_windows() {
        let window = PageWindow::resolve(None, 12, 5).unwrap();
        assert_eq!(window, PageWindow { number: 1, num_pages: 3, limit: 5, offset: 0 });

        let last = PageWindow::resolve(Some("last"), 12, 5).unwrap();
        assert_eq!((last.number, last.offset), (3, 10));
        assert!(!last.has_next());
        assert!(last.has_previous());

        let empty = PageWindow::resolve(Some("1"), 0, 5).unwrap();
        assert_eq!(empty.num_pages, 1);
    }

    #[test]
    fn test_invalid_pages() {
        for page in ["0", "4", "-1", "abc"] {
            match PageWindow::resolve(Some(page), 12, 5).unwrap_err() {
                AppError::NotFound(msg) => assert_eq!(msg, "Invalid page."),
                other => panic!("unexpected error {:?}", other),
            }
        }
    }

    #[test]
    fn test_links_preserve_other_parameters() {
        let uri: Uri = "/api/social_media/posts/?title=hi&page=2".parse().unwrap();
        let window = PageWindow::resolve(Some("2"), 12, 5).unwrap();
        let page = Page::new(&uri, window, 12, vec![1, 2, 3]);

        assert_eq!(page.next.as_deref(), Some("/api/social_media/posts/?title=hi&page=3"));
        assert_eq!(page.previous.as_deref(), Some("/api/social_media/posts/?title=hi"));
    }

    #[test]
    fn test_single_page_has_no_links() {
        let uri: Uri = "/api/social_media/hashtags/".parse().unwrap();
        let window = PageWindow::resolve(None, 3, 10).unwrap();
        let page = Page::new(&uri, window, 3, vec!["a", "b", "c"]);
        assert_eq!(page.next, None);
        assert_eq!(page.previous, None);
    }
}
