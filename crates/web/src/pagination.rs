//! Fixed-size page splitting for list views.
//!
//! The remote API returns whole collections; list pages slice them locally.
//! Out-of-range requests are clamped instead of rejected, so a stale link
//! never produces an error page.

use serde::Deserialize;

/// Page size for the customer list.
pub const CUSTOMERS_PER_PAGE: usize = 100;

/// Page size for the rental list.
pub const RENTALS_PER_PAGE: usize = 50;

/// `?page=` query parameter.
///
/// Kept as a string so a malformed value falls back to the first page instead
/// of failing extraction.
#[derive(Debug, Default, Deserialize)]
pub struct PageQuery {
    pub page: Option<String>,
}

/// One page of an in-memory list.
#[derive(Debug, Clone)]
pub struct Page<T> {
    /// Items on this page.
    pub items: Vec<T>,
    /// 1-based page number actually served.
    pub number: usize,
    /// Total number of pages (at least 1).
    pub num_pages: usize,
    /// Total number of items across all pages.
    pub count: usize,
    per_page: usize,
}

impl<T> Page<T> {
    /// Slice `items` and return the requested page.
    ///
    /// - missing or non-numeric `requested` → first page
    /// - below 1 or past the end → last page
    /// - an empty list still has one (empty) page
    ///
    /// A `per_page` of zero is treated as one.
    #[must_use]
    pub fn new(items: Vec<T>, requested: Option<&str>, per_page: usize) -> Self {
        let per_page = per_page.max(1);
        let count = items.len();
        let num_pages = count.div_ceil(per_page).max(1);

        let number = match requested.map(str::trim).map(str::parse::<i64>) {
            None | Some(Err(_)) => 1,
            Some(Ok(n)) => usize::try_from(n)
                .ok()
                .filter(|&n| (1..=num_pages).contains(&n))
                .unwrap_or(num_pages),
        };

        let start = (number - 1) * per_page;
        let items = items.into_iter().skip(start).take(per_page).collect();

        Self {
            items,
            number,
            num_pages,
            count,
            per_page,
        }
    }

    #[must_use]
    pub const fn has_previous(&self) -> bool {
        self.number > 1
    }

    #[must_use]
    pub const fn has_next(&self) -> bool {
        self.number < self.num_pages
    }

    #[must_use]
    pub const fn has_other_pages(&self) -> bool {
        self.num_pages > 1
    }

    #[must_use]
    pub const fn previous_page_number(&self) -> usize {
        self.number.saturating_sub(1)
    }

    #[must_use]
    pub const fn next_page_number(&self) -> usize {
        self.number + 1
    }

    /// 1-based index of the first item on this page, 0 when empty.
    #[must_use]
    pub const fn start_index(&self) -> usize {
        if self.count == 0 {
            0
        } else {
            (self.number - 1) * self.per_page + 1
        }
    }

    /// 1-based index of the last item on this page, 0 when empty.
    #[must_use]
    pub fn end_index(&self) -> usize {
        if self.count == 0 {
            0
        } else {
            self.start_index() + self.items.len() - 1
        }
    }

    /// Convert the items while keeping the page position.
    #[must_use]
    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            items: self.items.into_iter().map(f).collect(),
            number: self.number,
            num_pages: self.num_pages,
            count: self.count,
            per_page: self.per_page,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn numbers(n: usize) -> Vec<usize> {
        (1..=n).collect()
    }

    #[test]
    fn test_250_customers_make_three_pages() {
        let page = Page::new(numbers(250), Some("2"), CUSTOMERS_PER_PAGE);

        assert_eq!(page.num_pages, 3);
        assert_eq!(page.number, 2);
        assert_eq!(page.items.len(), 100);
        assert_eq!(page.items.first(), Some(&101));
        assert_eq!(page.items.last(), Some(&200));
        assert_eq!(page.start_index(), 101);
        assert_eq!(page.end_index(), 200);
        assert!(page.has_previous());
        assert!(page.has_next());
    }

    #[test]
    fn test_last_page_is_partial() {
        let page = Page::new(numbers(250), Some("3"), CUSTOMERS_PER_PAGE);
        assert_eq!(page.items.len(), 50);
        assert_eq!(page.end_index(), 250);
        assert!(!page.has_next());
        assert_eq!(page.previous_page_number(), 2);
    }

    #[test]
    fn test_missing_or_garbage_page_is_first() {
        let page = Page::new(numbers(120), None, RENTALS_PER_PAGE);
        assert_eq!(page.number, 1);
        assert!(!page.has_previous());

        let page = Page::new(numbers(120), Some("abc"), RENTALS_PER_PAGE);
        assert_eq!(page.number, 1);
        assert_eq!(page.next_page_number(), 2);
    }

    #[test]
    fn test_out_of_range_page_is_last() {
        let page = Page::new(numbers(120), Some("99"), RENTALS_PER_PAGE);
        assert_eq!(page.number, 3);
        assert_eq!(page.items, (101..=120).collect::<Vec<_>>());

        let page = Page::new(numbers(120), Some("0"), RENTALS_PER_PAGE);
        assert_eq!(page.number, 3);

        let page = Page::new(numbers(120), Some("-4"), RENTALS_PER_PAGE);
        assert_eq!(page.number, 3);
    }

    #[test]
    fn test_empty_list_has_one_empty_page() {
        let page = Page::new(Vec::<usize>::new(), Some("5"), CUSTOMERS_PER_PAGE);
        assert_eq!(page.num_pages, 1);
        assert_eq!(page.number, 1);
        assert!(page.items.is_empty());
        assert_eq!(page.start_index(), 0);
        assert_eq!(page.end_index(), 0);
        assert!(!page.has_other_pages());
    }

    #[test]
    fn test_map_keeps_position() {
        let page = Page::new(numbers(250), Some("2"), CUSTOMERS_PER_PAGE).map(|n| n * 10);
        assert_eq!(page.number, 2);
        assert_eq!(page.items.first(), Some(&1010));
        assert_eq!(page.start_index(), 101);
    }
}
