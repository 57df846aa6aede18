use shared::protocol::Pagination;

/// Page numbers shown in a pagination bar, centred on the current page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageWindow {
    pub pages: Vec<u32>,
    pub current: u32,
    pub has_previous: bool,
    pub has_next: bool,
}

impl PageWindow {
    pub fn around(current: u32, total_pages: u32, width: u32) -> Self {
        let total_pages = total_pages.max(1);
        let current = current.clamp(1, total_pages);
        let width = width.clamp(1, total_pages);

        let mut start = current.saturating_sub(width / 2).max(1);
        let end = (start + width - 1).min(total_pages);
        start = (end + 1).saturating_sub(width).max(1);

        Self {
            pages: (start..=end).collect(),
            current,
            has_previous: current > 1,
            has_next: current < total_pages,
        }
    }
}

/// `(first, last, total)` for "Showing 13-24 of 40 courses". `(0, 0, 0)` when empty.
pub fn range_summary(pagination: &Pagination, page_size: u32) -> (u64, u64, u64) {
    let total = pagination.total_courses;
    if total == 0 || page_size == 0 {
        return (0, 0, 0);
    }
    let page = u64::from(pagination.current_page.max(1));
    let page_size = u64::from(page_size);
    let first = (page - 1) * page_size + 1;
    if first > total {
        return (0, 0, total);
    }
    let last = (page * page_size).min(total);
    (first, last, total)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn window_is_centred_and_clamped() {
        assert_eq!(PageWindow::around(5, 10, 5).pages, vec![3, 4, 5, 6, 7]);
        assert_eq!(PageWindow::around(1, 10, 5).pages, vec![1, 2, 3, 4, 5]);
        assert_eq!(PageWindow::around(10, 10, 5).pages, vec![6, 7, 8, 9, 10]);
        assert_eq!(PageWindow::around(2, 3, 5).pages, vec![1, 2, 3]);
    }

    #[test]
    fn window_flags_edges() {
        let first = PageWindow::around(1, 4, 3);
        assert!(!first.has_previous);
        assert!(first.has_next);

        let only = PageWindow::around(7, 0, 3);
        assert_eq!(only.pages, vec![1]);
        assert_eq!(only.current, 1);
        assert!(!only.has_next);
    }

    #[test]
    fn summary_covers_partial_last_page() {
        let pagination = Pagination {
            current_page: 4,
            total_pages: 4,
            total_courses: 40,
        };
        assert_eq!(range_summary(&pagination, 12), (37, 40, 40));

        let empty = Pagination::default();
        assert_eq!(range_summary(&empty, 12), (0, 0, 0));
    }
}
