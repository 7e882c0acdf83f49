//! Live-edge tracking and unread counting for the message list.
//!
//! DESIGN
//! ======
//! The tracker is a pure reducer over [`ViewportState`]. The presentation
//! layer reports scroll geometry and performs the scroll when the reducer
//! returns [`ViewportEffect::ScrollToTail`]; nothing here touches a real
//! scrollable surface.

#[cfg(test)]
#[path = "viewport_test.rs"]
mod viewport_test;

use serde::{Deserialize, Serialize};

/// Max distance (px) between the visible end and the content end that still
/// counts as "at the live edge". Absorbs sub-pixel rounding and smooth-scroll
/// overshoot.
pub const LIVE_EDGE_THRESHOLD_PX: f64 = 48.0;

/// Scroll geometry of the message list, in pixels.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ScrollPosition {
    /// Total height of the scrolled content.
    pub scroll_height: f64,
    /// Offset of the visible window from the top of the content.
    pub scroll_top: f64,
    /// Height of the visible window.
    pub client_height: f64,
}

impl ScrollPosition {
    #[must_use]
    pub fn new(scroll_height: f64, scroll_top: f64, client_height: f64) -> Self {
        Self { scroll_height, scroll_top, client_height }
    }

    /// Distance from the visible end to the content end.
    #[must_use]
    pub fn distance_from_end(&self) -> f64 {
        self.scroll_height - self.scroll_top - self.client_height
    }

    #[must_use]
    pub fn is_at_live_edge(&self) -> bool {
        self.distance_from_end() <= LIVE_EDGE_THRESHOLD_PX
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ViewportState {
    pub at_live_edge: bool,
    pub unread_count: u32,
}

impl Default for ViewportState {
    fn default() -> Self {
        Self { at_live_edge: true, unread_count: 0 }
    }
}

/// Input to [`reduce`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum ViewportEvent {
    /// One message was appended to the log.
    MessageAppended,
    /// The reader moved the list.
    Scrolled(ScrollPosition),
    /// Explicit "jump to latest" command.
    JumpToLiveEdge,
}

/// Action the presentation layer must perform.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ViewportEffect {
    ScrollToTail,
}

/// Apply one event to the viewport state.
#[must_use]
pub fn reduce(state: ViewportState, event: ViewportEvent) -> (ViewportState, Option<ViewportEffect>) {
    match event {
        ViewportEvent::MessageAppended => {
            if state.at_live_edge {
                (state, Some(ViewportEffect::ScrollToTail))
            } else {
                let unread_count = state.unread_count.saturating_add(1);
                (ViewportState { unread_count, ..state }, None)
            }
        }
        ViewportEvent::Scrolled(position) => {
            let at_live_edge = position.is_at_live_edge();
            let unread_count = if at_live_edge { 0 } else { state.unread_count };
            (ViewportState { at_live_edge, unread_count }, None)
        }
        ViewportEvent::JumpToLiveEdge => {
            (ViewportState { at_live_edge: true, unread_count: 0 }, Some(ViewportEffect::ScrollToTail))
        }
    }
}
