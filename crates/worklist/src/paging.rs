//! Paging state for a folder's item table

/// Current page of a folder and whether neighbouring pages exist.
///
/// `total` is the count delivered with the last items fetch, so next/previous
/// availability always describes the page actually shown. Count-only fetches
/// do not touch it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PagingState {
    page_number: usize,
    page_size: usize,
    total: usize,
}

impl PagingState {
    /// Create paging state at page 0. A zero page size is treated as 1.
    pub fn new(page_size: usize) -> Self {
        Self {
            page_number: 0,
            page_size: page_size.max(1),
            total: 0,
        }
    }

    pub fn page_number(&self) -> usize {
        self.page_number
    }

    pub fn page_size(&self) -> usize {
        self.page_size
    }

    /// Offset of the first item on the current page
    pub fn offset(&self) -> usize {
        self.page_number * self.page_size
    }

    pub fn has_next(&self) -> bool {
        self.offset() + self.page_size < self.total
    }

    pub fn has_previous(&self) -> bool {
        self.page_number > 0
    }

    /// Record the total delivered by an items fetch
    pub fn set_total(&mut self, total: usize) {
        self.total = total;
    }

    /// Advance one page. Returns false if there is no next page.
    pub fn move_next(&mut self) -> bool {
        if !self.has_next() {
            return false;
        }
        self.page_number += 1;
        true
    }

    /// Go back one page. Returns false if already on the first page.
    pub fn move_previous(&mut self) -> bool {
        if !self.has_previous() {
            return false;
        }
        self.page_number -= 1;
        true
    }

    pub fn reset(&mut self) {
        self.page_number = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_initial_state() {
        let paging = PagingState::new(10);
        assert_eq!(paging.page_number(), 0);
        assert_eq!(paging.offset(), 0);
        assert!(!paging.has_next());
        assert!(!paging.has_previous());
    }

    #[test]
    fn test_has_next_from_total() {
        let mut paging = PagingState::new(10);
        paging.set_total(37);
        assert!(paging.has_next());

        assert!(paging.move_next());
        assert!(paging.move_next());
        assert!(paging.move_next());
        assert_eq!(paging.offset(), 30);
        // Items 30..36 are the last page
        assert!(!paging.has_next());
        assert!(!paging.move_next());
        assert_eq!(paging.page_number(), 3);
    }

    #[test]
    fn test_exact_multiple_has_no_extra_page() {
        let mut paging = PagingState::new(10);
        paging.set_total(20);
        assert!(paging.move_next());
        assert!(!paging.has_next());
    }

    #[test]
    fn test_move_previous() {
        let mut paging = PagingState::new(10);
        assert!(!paging.move_previous());

        paging.set_total(37);
        paging.move_next();
        assert!(paging.has_previous());
        assert!(paging.move_previous());
        assert_eq!(paging.page_number(), 0);
    }

    #[test]
    fn test_reset() {
        let mut paging = PagingState::new(10);
        paging.set_total(100);
        paging.move_next();
        paging.move_next();
        paging.reset();
        assert_eq!(paging.page_number(), 0);
    }

    #[test]
    fn test_zero_page_size_clamped() {
        let paging = PagingState::new(0);
        assert_eq!(paging.page_size(), 1);
    }
}
