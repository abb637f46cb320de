//! Page-number pagination for listing views.

use serde::Serialize;

/// One page of a listing, ready to hand to a template.
#[derive(Debug, Clone, Serialize)]
pub struct Page<T> {
    /// Items on this page.
    pub items: Vec<T>,
    /// 1-based page number.
    pub number: u64,
    /// Total number of pages (0 when the listing is empty).
    pub num_pages: u64,
    /// Whether a previous page exists.
    pub has_previous: bool,
    /// Whether a next page exists.
    pub has_next: bool,
}

impl<T> Page<T> {
    /// Build a page from fetched items and paginator counts.
    #[must_use]
    pub fn new(items: Vec<T>, number: u64, num_pages: u64) -> Self {
        Self {
            items,
            number,
            num_pages,
            has_previous: number > 1,
            has_next: number < num_pages,
        }
    }

    /// Map the items into another representation, keeping page numbers.
    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            items: self.items.into_iter().map(f).collect(),
            number: self.number,
            num_pages: self.num_pages,
            has_previous: self.has_previous,
            has_next: self.has_next,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_of_two_pages() {
        let page = Page::new(vec![1, 2, 3], 1, 2);
        assert!(!page.has_previous);
        assert!(page.has_next);
    }

    #[test]
    fn last_page() {
        let page = Page::new(vec![4], 2, 2);
        assert!(page.has_previous);
        assert!(!page.has_next);
    }

    #[test]
    fn empty_listing() {
        let page: Page<i32> = Page::new(vec![], 1, 0);
        assert!(!page.has_previous);
        assert!(!page.has_next);
    }
}
