//! Capture group bookkeeping for one translation
//!
//! Groups are numbered from 1 in the order their `(` appears. A group only
//! becomes a valid back-reference target once its `)` has been seen, which is
//! what lets `\12` fall back to `\1` followed by a literal `2`.

use std::collections::BTreeSet;

/// Capture groups opened and closed so far
#[derive(Debug, Clone, Default)]
pub struct CaptureSet {
    /// Number of groups opened so far; the last assigned index
    opened: u32,
    closed: BTreeSet<u32>,
}

impl CaptureSet {
    /// Create an empty set
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocate the index for a newly opened group
    pub fn open(&mut self) -> u32 {
        self.opened += 1;
        self.opened
    }

    /// Record that group `index` has been closed
    pub fn close(&mut self, index: u32) {
        debug_assert!(index >= 1 && index <= self.opened);
        self.closed.insert(index);
    }

    /// Whether group `index` has been closed and may be referenced
    pub fn is_closed(&self, index: u32) -> bool {
        self.closed.contains(&index)
    }

    /// Total number of groups opened so far
    pub fn group_count(&self) -> u32 {
        self.opened
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_indices_are_sequential() {
        let mut captures = CaptureSet::new();
        assert_eq!(captures.open(), 1);
        assert_eq!(captures.open(), 2);
        assert_eq!(captures.open(), 3);
        assert_eq!(captures.group_count(), 3);
    }

    #[test]
    fn test_open_group_is_not_referenceable() {
        let mut captures = CaptureSet::new();
        let outer = captures.open();
        let inner = captures.open();
        captures.close(inner);
        assert!(captures.is_closed(inner));
        assert!(!captures.is_closed(outer));
        captures.close(outer);
        assert!(captures.is_closed(outer));
    }

    #[test]
    fn test_unknown_index() {
        let captures = CaptureSet::new();
        assert!(!captures.is_closed(0));
        assert!(!captures.is_closed(1));
        assert_eq!(captures.group_count(), 0);
    }
}
