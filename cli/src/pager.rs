//! Virtual viewport over the message log.
//!
//! DESIGN
//! ======
//! A terminal has no scrollable list, so the CLI keeps a window of
//! `page_lines` messages and reports its geometry to the engine in pixels,
//! one message per `LINE_HEIGHT_PX`. The engine decides whether that
//! geometry is at the live edge; the pager only tracks where the window is.

#[cfg(test)]
#[path = "pager_test.rs"]
mod tests;

use std::ops::Range;

use client::ScrollPosition;

/// Height of one rendered message. One line of slack stays within the
/// engine's live-edge threshold, two lines do not.
pub const LINE_HEIGHT_PX: f64 = 32.0;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pager {
    page_lines: usize,
    /// First visible line; `None` while pinned to the tail.
    top: Option<usize>,
}

impl Pager {
    #[must_use]
    pub fn new(page_lines: usize) -> Self {
        Self { page_lines: page_lines.max(1), top: None }
    }

    #[must_use]
    pub fn page_lines(&self) -> usize {
        self.page_lines
    }

    #[must_use]
    pub fn is_following(&self) -> bool {
        self.top.is_none()
    }

    /// Pin the window to the newest messages.
    pub fn follow(&mut self) {
        self.top = None;
    }

    pub fn up(&mut self, lines: usize, total: usize) -> ScrollPosition {
        self.top = Some(self.top_line(total).saturating_sub(lines));
        self.position(total)
    }

    pub fn down(&mut self, lines: usize, total: usize) -> ScrollPosition {
        let next = self.top_line(total).saturating_add(lines);
        self.top = (next < self.max_top(total)).then_some(next);
        self.position(total)
    }

    /// Geometry of the window for a log of `total` messages.
    #[must_use]
    pub fn position(&self, total: usize) -> ScrollPosition {
        ScrollPosition::new(
            px(total.max(self.page_lines)),
            px(self.top_line(total)),
            px(self.page_lines),
        )
    }

    /// Indexes of the messages inside the window.
    #[must_use]
    pub fn visible(&self, total: usize) -> Range<usize> {
        let top = self.top_line(total);
        top..top.saturating_add(self.page_lines).min(total)
    }

    fn top_line(&self, total: usize) -> usize {
        let max_top = self.max_top(total);
        self.top.map_or(max_top, |top| top.min(max_top))
    }

    fn max_top(&self, total: usize) -> usize {
        total.saturating_sub(self.page_lines)
    }
}

fn px(lines: usize) -> f64 {
    f64::from(u32::try_from(lines).unwrap_or(u32::MAX)) * LINE_HEIGHT_PX
}
