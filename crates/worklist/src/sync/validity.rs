//! Two-tier validity for a folder: count and item set

use super::FetchKind;

/// Whether a folder's count and item set can be trusted.
///
/// `items_valid` implies `count_valid`: the only way to validate items is an
/// items fetch, whose response always carries the count too.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Validity {
    items_valid: bool,
    count_valid: bool,
}

impl Validity {
    /// Create an invalid state (nothing fetched yet)
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_items_valid(&self) -> bool {
        self.items_valid
    }

    pub fn is_count_valid(&self) -> bool {
        self.count_valid
    }

    /// True when neither part needs a fetch
    pub fn is_valid(&self) -> bool {
        self.items_valid && self.count_valid
    }

    /// Mark count and items invalid
    pub fn invalidate(&mut self) {
        self.items_valid = false;
        self.count_valid = false;
    }

    /// Mark only the item set invalid; the count stays trusted
    pub fn invalidate_items(&mut self) {
        self.items_valid = false;
    }

    /// Record a completed items fetch
    pub fn mark_items_valid(&mut self) {
        self.items_valid = true;
        self.count_valid = true;
    }

    /// Record a completed count-only fetch
    pub fn mark_count_valid(&mut self) {
        self.count_valid = true;
    }

    /// Decide which fetch an update should run.
    ///
    /// Open folders need their items; closed folders only need a count.
    pub fn required_fetch(&self, is_open: bool) -> Option<FetchKind> {
        if is_open && !self.items_valid {
            Some(FetchKind::Items)
        } else if !self.count_valid {
            Some(FetchKind::Count)
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_implication(v: &Validity) {
        assert!(!v.is_items_valid() || v.is_count_valid());
    }

    #[test]
    fn test_starts_invalid() {
        let v = Validity::new();
        assert!(!v.is_items_valid());
        assert!(!v.is_count_valid());
        assert_eq!(v.required_fetch(false), Some(FetchKind::Count));
        assert_eq!(v.required_fetch(true), Some(FetchKind::Items));
    }

    #[test]
    fn test_count_only_leaves_items_invalid() {
        let mut v = Validity::new();
        v.mark_count_valid();
        assert_implication(&v);
        assert_eq!(v.required_fetch(false), None);
        // Opening upgrades to an items fetch
        assert_eq!(v.required_fetch(true), Some(FetchKind::Items));
    }

    #[test]
    fn test_items_validates_count() {
        let mut v = Validity::new();
        v.mark_items_valid();
        assert!(v.is_valid());
        assert_eq!(v.required_fetch(true), None);
        assert_eq!(v.required_fetch(false), None);
    }

    #[test]
    fn test_invalidate_items_keeps_count() {
        let mut v = Validity::new();
        v.mark_items_valid();
        v.invalidate_items();
        assert_implication(&v);
        assert!(v.is_count_valid());
        assert_eq!(v.required_fetch(true), Some(FetchKind::Items));
        assert_eq!(v.required_fetch(false), None);
    }

    #[test]
    fn test_invalidate_is_idempotent() {
        let mut once = Validity::new();
        once.mark_items_valid();
        let mut twice = once;

        once.invalidate();
        twice.invalidate();
        twice.invalidate();
        assert_eq!(once, twice);
    }

    #[test]
    fn test_implication_holds_through_transitions() {
        let mut v = Validity::new();
        assert_implication(&v);
        v.mark_count_valid();
        assert_implication(&v);
        v.mark_items_valid();
        assert_implication(&v);
        v.invalidate_items();
        assert_implication(&v);
        v.invalidate();
        assert_implication(&v);
    }
}
