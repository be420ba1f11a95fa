//! Page window helpers shared by list pages and JSON endpoints.

use serde::Serialize;

/// Number of rows shown per page across list views.
pub const DEFAULT_ITEMS_PER_PAGE: usize = 20;

fn get_pages(
    total_pages: usize,
    current_page: usize,
    left_edge: usize,
    left_current: usize,
    right_current: usize,
    right_edge: usize,
) -> Vec<Option<usize>> {
    let last_page = total_pages;

    if last_page == 0 {
        return vec![];
    }

    let current_page = current_page.min(last_page);
    let mut pages = Vec::new();

    let left_end = left_edge.saturating_add(1).min(last_page.saturating_add(1));
    pages.extend((1..left_end).map(Some));

    let mid_start = left_end.max(current_page.saturating_sub(left_current));
    let mid_end = current_page
        .saturating_add(right_current)
        .saturating_add(1)
        .min(last_page.saturating_add(1));

    if mid_start > left_end {
        pages.push(None);
    }
    pages.extend((mid_start..mid_end).map(Some));

    let right_start = mid_end.max(last_page.saturating_sub(right_edge).saturating_add(1));

    if right_start > mid_end {
        pages.push(None);
    }
    pages.extend((right_start..=last_page).map(Some));

    pages
}

#[derive(Debug, Serialize)]
pub struct Paginated<T> {
    pub items: Vec<T>,
    pub pages: Vec<Option<usize>>,
    pub page: usize,
}

impl<T> Paginated<T> {
    pub fn new(items: Vec<T>, current_page: usize, total_pages: usize) -> Self {
        let current_page = if current_page == 0 { 1 } else { current_page };

        let pages = get_pages(total_pages, current_page, 2, 2, 4, 2);

        Self {
            items,
            pages,
            page: current_page,
        }
    }

    /// Builds the page window from a total row count.
    pub fn from_total(items: Vec<T>, current_page: usize, total: usize, per_page: usize) -> Self {
        Self::new(items, current_page, total.div_ceil(per_page.max(1)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_result_has_no_pages() {
        let page: Paginated<i32> = Paginated::new(vec![], 1, 0);
        assert!(page.pages.is_empty());
        assert_eq!(page.page, 1);
    }

    #[test]
    fn short_lists_show_every_page() {
        let page: Paginated<i32> = Paginated::new(vec![], 2, 4);
        assert_eq!(page.pages, vec![Some(1), Some(2), Some(3), Some(4)]);
    }

    #[test]
    fn long_lists_collapse_with_gaps() {
        let page: Paginated<i32> = Paginated::new(vec![], 10, 30);
        assert_eq!(
            page.pages,
            vec![
                Some(1),
                Some(2),
                None,
                Some(8),
                Some(9),
                Some(10),
                Some(11),
                Some(12),
                Some(13),
                Some(14),
                None,
                Some(29),
                Some(30)
            ]
        );
    }

    #[test]
    fn page_zero_is_treated_as_first() {
        let page = Paginated::from_total(vec![1, 2], 0, 41, DEFAULT_ITEMS_PER_PAGE);
        assert_eq!(page.page, 1);
        assert_eq!(page.pages.last(), Some(&Some(3)));
    }

    #[test]
    fn pages_past_the_end_keep_the_window_bounded() {
        let page: Paginated<i32> = Paginated::from_total(vec![], usize::MAX, 41, 20);
        assert_eq!(page.page, usize::MAX);
        assert_eq!(page.pages, vec![Some(1), Some(2), Some(3)]);
    }
}
