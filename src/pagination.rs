//! Pagination window
//!
//! Decides which page-number controls a pagination bar shows: at most
//! [`WINDOW_SIZE`] consecutive pages centred on the current page, plus
//! shortcuts to the first and last page when they fall outside the window.

use std::ops::RangeInclusive;

/// Maximum number of consecutive page buttons
pub const WINDOW_SIZE: u32 = 5;

/// The controls of one pagination bar
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageWindow {
    /// Current page, clamped into `1..=total_pages`
    pub current: u32,
    pub total_pages: u32,
    /// First page of the window
    pub start: u32,
    /// Last page of the window
    pub end: u32,
    /// A "1" shortcut precedes the window
    pub show_first: bool,
    /// An ellipsis sits between the "1" shortcut and the window
    pub leading_gap: bool,
    /// A "last page" shortcut follows the window
    pub show_last: bool,
    /// An ellipsis sits between the window and the last-page shortcut
    pub trailing_gap: bool,
    pub has_previous: bool,
    pub has_next: bool,
}

impl PageWindow {
    /// Page numbers inside the window, in order
    pub fn pages(&self) -> RangeInclusive<u32> {
        self.start..=self.end
    }

    /// Number of page buttons in the window
    pub fn size(&self) -> u32 {
        self.end - self.start + 1
    }

    pub fn contains(&self, page: u32) -> bool {
        self.pages().contains(&page)
    }

    pub fn previous(&self) -> Option<u32> {
        self.has_previous.then(|| self.current - 1)
    }

    pub fn next(&self) -> Option<u32> {
        self.has_next.then(|| self.current + 1)
    }
}

/// Compute the pagination window.
///
/// Returns `None` when there is nothing to paginate (`total_pages <= 1`).
pub fn page_window(current_page: u32, total_pages: u32) -> Option<PageWindow> {
    if total_pages <= 1 {
        return None;
    }

    let current = current_page.clamp(1, total_pages);

    let mut start = current.saturating_sub(WINDOW_SIZE / 2).max(1);
    let end = (start + WINDOW_SIZE - 1).min(total_pages);

    // Near the end the window would be short; slide it back
    if end - start + 1 < WINDOW_SIZE {
        start = end.saturating_sub(WINDOW_SIZE - 1).max(1);
    }

    Some(PageWindow {
        current,
        total_pages,
        start,
        end,
        show_first: start > 1,
        leading_gap: start > 2,
        show_last: end < total_pages,
        trailing_gap: end + 1 < total_pages,
        has_previous: current > 1,
        has_next: current < total_pages,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_nothing_to_paginate() {
        assert_eq!(page_window(1, 0), None);
        assert_eq!(page_window(1, 1), None);
        assert_eq!(page_window(7, 1), None);
    }

    #[test]
    fn test_small_total_shows_everything() {
        let window = page_window(2, 3).unwrap();
        assert_eq!(window.pages().collect::<Vec<_>>(), vec![1, 2, 3]);
        assert!(!window.show_first);
        assert!(!window.show_last);
        assert_eq!(window.previous(), Some(1));
        assert_eq!(window.next(), Some(3));
    }

    #[test]
    fn test_window_centred_in_the_middle() {
        let window = page_window(10, 20).unwrap();
        assert_eq!(window.pages().collect::<Vec<_>>(), vec![8, 9, 10, 11, 12]);
        assert!(window.show_first);
        assert!(window.leading_gap);
        assert!(window.show_last);
        assert!(window.trailing_gap);
    }

    #[test]
    fn test_window_clamped_at_start() {
        let window = page_window(1, 10).unwrap();
        assert_eq!(window.pages().collect::<Vec<_>>(), vec![1, 2, 3, 4, 5]);
        assert!(!window.show_first);
        assert!(window.show_last);
        assert_eq!(window.previous(), None);
    }

    #[test]
    fn test_window_clamped_at_end() {
        let window = page_window(10, 10).unwrap();
        assert_eq!(window.pages().collect::<Vec<_>>(), vec![6, 7, 8, 9, 10]);
        assert!(window.show_first);
        assert!(!window.show_last);
        assert_eq!(window.next(), None);
    }

    #[test]
    fn test_gap_flags_at_boundary() {
        // Window 2..=6 of 7: "1" shortcut without gap, "7" shortcut without gap
        let window = page_window(4, 7).unwrap();
        assert_eq!((window.start, window.end), (2, 6));
        assert!(window.show_first && !window.leading_gap);
        assert!(window.show_last && !window.trailing_gap);
    }

    #[test]
    fn test_out_of_range_current_is_clamped() {
        let window = page_window(99, 8).unwrap();
        assert_eq!(window.current, 8);
        assert_eq!((window.start, window.end), (4, 8));

        let window = page_window(0, 8).unwrap();
        assert_eq!(window.current, 1);
        assert_eq!(window.start, 1);
    }

    #[test]
    fn test_invariants_hold_everywhere() {
        for total in 2..=40 {
            for current in 1..=total {
                let window = page_window(current, total).unwrap();
                assert!(window.start >= 1);
                assert!(window.end <= total);
                assert!(window.size() <= WINDOW_SIZE);
                assert!(window.contains(current), "{} not in {:?}", current, window);

                if total > WINDOW_SIZE {
                    assert_eq!(window.size(), WINDOW_SIZE);
                } else {
                    assert_eq!(window.size(), total);
                }
            }
        }
    }
}
