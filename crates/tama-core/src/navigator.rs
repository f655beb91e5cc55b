use crate::store::TurnStore;

/// Turn-to-turn movement and the scroll offset inside the displayed turn.
///
/// Moving between turns and scrolling within one are separate operations;
/// neither ever stands in for the other.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Navigator {
    offset: usize,
    viewport_height: usize,
    content_height: usize,
}

impl Navigator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn offset(&self) -> usize {
        self.offset
    }

    pub fn viewport_height(&self) -> usize {
        self.viewport_height
    }

    pub fn is_at_top(&self) -> bool {
        self.offset == 0
    }

    pub fn is_at_bottom(&self) -> bool {
        self.offset >= self.max_offset()
    }

    fn max_offset(&self) -> usize {
        self.content_height.saturating_sub(self.viewport_height)
    }

    pub fn next(&mut self, store: &mut TurnStore) -> bool {
        let Some(current) = store.current_index() else {
            return false;
        };
        if current + 1 >= store.len() {
            return false;
        }
        store.set_current(current + 1);
        self.scroll_to_top();
        true
    }

    pub fn previous(&mut self, store: &mut TurnStore) -> bool {
        let Some(current) = store.current_index() else {
            return false;
        };
        if current == 0 {
            return false;
        }
        store.set_current(current - 1);
        self.scroll_to_top();
        true
    }

    pub fn scroll_to_top(&mut self) {
        self.offset = 0;
    }

    pub fn scroll_to_bottom(&mut self) {
        self.offset = self.max_offset();
    }

    pub fn scroll_by(&mut self, lines: isize) {
        let target = if lines.is_negative() {
            self.offset.saturating_sub(lines.unsigned_abs())
        } else {
            self.offset.saturating_add(lines.unsigned_abs())
        };
        self.offset = target.min(self.max_offset());
    }

    pub fn page_lines(&self) -> isize {
        self.viewport_height.max(1) as isize
    }

    /// Called whenever the rendered height of the displayed turn changes.
    pub fn set_content_height(&mut self, height: usize) {
        self.content_height = height;
        self.offset = self.offset.min(self.max_offset());
    }

    /// A viewport that was pinned to the bottom stays pinned after a resize.
    pub fn resize(&mut self, viewport_height: usize) {
        let was_at_bottom = self.is_at_bottom();
        self.viewport_height = viewport_height;
        if was_at_bottom {
            self.scroll_to_bottom();
        } else {
            self.offset = self.offset.min(self.max_offset());
        }
    }

    /// Applies a freshly rendered frame. Only a change of viewport height
    /// counts as a resize for bottom pinning, and the first measured frame
    /// never pins.
    pub fn relayout(&mut self, viewport_height: usize, content_height: usize) {
        let pinned = self.viewport_height != 0
            && viewport_height != self.viewport_height
            && self.offset > 0
            && self.is_at_bottom();
        self.viewport_height = viewport_height;
        self.content_height = content_height;
        if pinned {
            self.scroll_to_bottom();
        } else {
            self.offset = self.offset.min(self.max_offset());
        }
    }

    pub(crate) fn reset(&mut self) {
        self.offset = 0;
        self.content_height = 0;
    }
}
