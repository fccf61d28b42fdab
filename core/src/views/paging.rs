//! Page cursor over a list, used by the appointment manager.

/// Rows per page on the appointment manager.
pub const APPOINTMENT_PAGE_SIZE: usize = 5;

/// Page cursor over a list whose length may change between calls. The stored
/// page is clamped to `[1, total_pages]` every time it is read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pager {
    page: usize,
    page_size: usize,
}

impl Default for Pager {
    fn default() -> Self {
        Self::new(APPOINTMENT_PAGE_SIZE)
    }
}

impl Pager {
    pub fn new(page_size: usize) -> Self {
        Self {
            page: 1,
            page_size: page_size.max(1),
        }
    }

    pub fn page_size(&self) -> usize {
        self.page_size
    }

    pub fn total_pages(&self, count: usize) -> usize {
        count.div_ceil(self.page_size).max(1)
    }

    pub fn current_page(&self, count: usize) -> usize {
        self.page.clamp(1, self.total_pages(count))
    }

    pub fn window<'a, T>(&self, items: &'a [T]) -> &'a [T] {
        let start = (self.current_page(items.len()) - 1) * self.page_size;
        let end = (start + self.page_size).min(items.len());
        &items[start.min(end)..end]
    }

    pub fn next(&mut self, count: usize) {
        self.page = (self.current_page(count) + 1).min(self.total_pages(count));
    }

    pub fn previous(&mut self, count: usize) {
        self.page = self.current_page(count).saturating_sub(1).max(1);
    }

    pub fn reset(&mut self) {
        self.page = 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn twelve_items_span_three_pages() {
        let items: Vec<u32> = (1..=12).collect();
        let mut pager = Pager::default();
        assert_eq!(pager.total_pages(items.len()), 3);
        assert_eq!(pager.window(&items), &[1, 2, 3, 4, 5]);

        pager.next(items.len());
        pager.next(items.len());
        assert_eq!(pager.current_page(items.len()), 3);
        assert_eq!(pager.window(&items), &[11, 12]);

        pager.next(items.len());
        assert_eq!(pager.current_page(items.len()), 3);
        assert_eq!(pager.window(&items), &[11, 12]);
    }

    #[test]
    fn previous_stops_at_first_page() {
        let mut pager = Pager::default();
        pager.previous(12);
        assert_eq!(pager.current_page(12), 1);
    }

    #[test]
    fn empty_list_has_one_empty_page() {
        let items: Vec<u32> = Vec::new();
        let pager = Pager::default();
        assert_eq!(pager.total_pages(0), 1);
        assert!(pager.window(&items).is_empty());
    }

    #[test]
    fn page_is_clamped_when_list_shrinks() {
        let mut pager = Pager::default();
        pager.next(12);
        pager.next(12);
        let items: Vec<u32> = (1..=6).collect();
        assert_eq!(pager.current_page(items.len()), 2);
        assert_eq!(pager.window(&items), &[6]);
    }
}
