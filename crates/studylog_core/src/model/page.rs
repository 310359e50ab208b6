//! Pagination request and envelope types.
//!
//! # Invariants
//! - `PageRequest::size` is never zero once it reaches a store.
//! - `Page::total_pages == ceil(total_elements / size)`.

use serde::Serialize;

/// Zero-based page coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub page: u32,
    pub size: u32,
}

impl PageRequest {
    pub fn new(page: u32, size: u32) -> Self {
        Self { page, size }
    }

    /// Number of rows to skip. Computed in `u64` so `page * size` cannot
    /// overflow.
    pub fn offset(&self) -> u64 {
        u64::from(self.page) * u64::from(self.size)
    }
}

/// One slice of an ordered result plus totals for the whole result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    pub content: Vec<T>,
    pub page: u32,
    pub size: u32,
    pub total_elements: u64,
    pub total_pages: u64,
}

impl<T> Page<T> {
    pub fn new(content: Vec<T>, request: PageRequest, total_elements: u64) -> Self {
        let total_pages = if request.size == 0 {
            0
        } else {
            total_elements.div_ceil(u64::from(request.size))
        };
        Self {
            content,
            page: request.page,
            size: request.size,
            total_elements,
            total_pages,
        }
    }

    pub fn empty(request: PageRequest) -> Self {
        Self::new(Vec::new(), request, 0)
    }

    /// Converts content items while keeping the page metadata.
    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            content: self.content.into_iter().map(f).collect(),
            page: self.page,
            size: self.size,
            total_elements: self.total_elements,
            total_pages: self.total_pages,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.content.is_empty()
    }

    pub fn has_next(&self) -> bool {
        u64::from(self.page) + 1 < self.total_pages
    }

    pub fn has_previous(&self) -> bool {
        self.page > 0
    }
}

/// Slices an already ordered vector according to `request`.
///
/// Offsets past the end yield empty content; the total always reflects
/// the full input.
pub fn paginate<T>(items: Vec<T>, request: PageRequest) -> Page<T> {
    let total = items.len() as u64;
    let offset = request.offset();
    if offset >= total {
        return Page::new(Vec::new(), request, total);
    }

    // offset < total <= usize::MAX here, so the casts are lossless.
    let start = offset as usize;
    let content = items
        .into_iter()
        .skip(start)
        .take(request.size as usize)
        .collect();
    Page::new(content, request, total)
}

#[cfg(test)]
mod tests {
    use super::{paginate, Page, PageRequest};

    #[test]
    fn total_pages_rounds_up() {
        let page: Page<u8> = Page::new(Vec::new(), PageRequest::new(0, 10), 21);
        assert_eq!(page.total_pages, 3);
        let exact: Page<u8> = Page::new(Vec::new(), PageRequest::new(0, 7), 14);
        assert_eq!(exact.total_pages, 2);
        let none: Page<u8> = Page::empty(PageRequest::new(0, 5));
        assert_eq!(none.total_pages, 0);
    }

    #[test]
    fn paginate_slices_and_reports_total() {
        let page = paginate((1..=7).collect::<Vec<_>>(), PageRequest::new(1, 3));
        assert_eq!(page.content, vec![4, 5, 6]);
        assert_eq!(page.total_elements, 7);
        assert!(page.has_next());
        assert!(page.has_previous());

        let last = paginate((1..=7).collect::<Vec<_>>(), PageRequest::new(2, 3));
        assert_eq!(last.content, vec![7]);
        assert!(!last.has_next());
    }

    #[test]
    fn paginate_past_end_is_empty_not_error() {
        let page = paginate(vec!['a', 'b'], PageRequest::new(u32::MAX, u32::MAX));
        assert!(page.is_empty());
        assert_eq!(page.total_elements, 2);
    }

    #[test]
    fn map_keeps_metadata() {
        let page = paginate(vec![1, 2, 3], PageRequest::new(0, 2)).map(|v| v * 10);
        assert_eq!(page.content, vec![10, 20]);
        assert_eq!(page.total_elements, 3);
        assert_eq!(page.total_pages, 2);
    }

    #[test]
    fn serializes_with_camel_case_keys() {
        let page = paginate(vec![1], PageRequest::new(0, 1));
        let json = serde_json::to_value(&page).unwrap();
        assert_eq!(json["totalElements"], 1);
        assert_eq!(json["totalPages"], 1);
        assert_eq!(json["content"][0], 1);
    }
}
