use gpui::{Pixels, ScrollHandle, point, px};

/// Distance from the tail that still counts as "at the bottom".
const FOLLOW_THRESHOLD: Pixels = px(24.);

/// Keeps the transcript pinned to the newest bubble unless the reader has
/// scrolled up to look at older ones.
pub struct ScrollManager {
    scroll_handle: ScrollHandle,
    follow_bottom: bool,
    pending_scroll_to_bottom: bool,
}

impl ScrollManager {
    pub fn new() -> Self {
        Self {
            scroll_handle: ScrollHandle::new(),
            follow_bottom: true,
            pending_scroll_to_bottom: false,
        }
    }

    pub fn handle(&self) -> &ScrollHandle {
        &self.scroll_handle
    }

    /// Called when new content arrived.
    pub fn content_grew(&mut self) {
        if self.follow_bottom {
            self.pending_scroll_to_bottom = true;
        }
    }

    /// Jumps to the tail even if the reader had scrolled away from it.
    pub fn request_scroll_to_bottom(&mut self) {
        self.follow_bottom = true;
        self.pending_scroll_to_bottom = true;
    }

    /// Re-derives follow mode from where the reader left the list.
    pub fn update_follow_state(&mut self) {
        if self.pending_scroll_to_bottom {
            return;
        }
        self.follow_bottom = self.is_near_bottom();
    }

    pub fn apply_pending_scroll(&mut self) -> bool {
        if !self.pending_scroll_to_bottom {
            return false;
        }

        let max_offset = self.scroll_handle.max_offset().height;
        let current_x = self.scroll_handle.offset().x;
        // Scrolling down is a negative y offset in gpui.
        let target_y = if max_offset > Pixels::ZERO {
            -max_offset
        } else {
            Pixels::ZERO
        };
        self.scroll_handle.set_offset(point(current_x, target_y));
        self.pending_scroll_to_bottom = false;
        true
    }

    fn is_near_bottom(&self) -> bool {
        let max_offset = self.scroll_handle.max_offset().height;
        if max_offset <= Pixels::ZERO {
            return true;
        }

        let offset = self.scroll_handle.offset().y;
        (offset + max_offset).abs() <= FOLLOW_THRESHOLD
    }
}

impl Default for ScrollManager {
    fn default() -> Self {
        Self::new()
    }
}
