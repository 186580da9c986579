use crate::ledger::HeightLedger;
use crate::types::{ItemRange, sanitize_px};

/// Inputs of one range computation. All pixel fields are sanitized on the way
/// in (negative/NaN/infinite become 0).
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct WindowParams {
    pub scroll_top: f64,
    pub viewport_height: f64,
    pub overscan_px: f64,
    pub total_count: usize,
    pub top_item_count: usize,
    pub footer_height: f64,
}

/// One rendering instruction: the scroll-derived window, the pinned leading
/// items when they are disjoint from it, and the translation/total extents.
///
/// A caller renders the union of `pinned_range` and `item_range`, translating
/// the window by `list_offset` so its first element lands at the right
/// absolute pixel position without placeholders for skipped indices.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct WindowState {
    pub item_range: Option<ItemRange>,
    pub pinned_range: Option<ItemRange>,
    pub list_offset: f64,
    pub total_height: f64,
}

impl WindowState {
    pub(crate) fn empty() -> Self {
        Self {
            item_range: None,
            pinned_range: None,
            list_offset: 0.0,
            total_height: 0.0,
        }
    }
}

/// Converts scroll position + viewport size into an item window.
///
/// The visible interval is `[scroll_top - overscan, scroll_top + viewport +
/// overscan)`: an item is part of the window when its box intersects it, so
/// an item starting exactly at the bottom edge is excluded.
pub fn compute_window(params: &WindowParams, ledger: &mut HeightLedger) -> WindowState {
    let total = params.total_count;
    if total == 0 {
        return WindowState::empty();
    }

    let top = params.top_item_count.min(total);

    if ledger.is_unsized() {
        // Nothing measured and no default: render one item (plus any pinned
        // leaders) so the host can produce a first measurement.
        let end = top.saturating_sub(1);
        return WindowState {
            item_range: Some(ItemRange::new(0, end.min(total - 1))),
            pinned_range: None,
            list_offset: 0.0,
            total_height: sanitize_px(params.footer_height),
        };
    }

    let scroll_top = sanitize_px(params.scroll_top);
    let viewport = sanitize_px(params.viewport_height);
    let overscan = sanitize_px(params.overscan_px);

    let low = sanitize_px(scroll_top - overscan);
    let high = scroll_top + viewport + overscan;

    let mut start = ledger.index_at_offset(low);
    let end = ledger.last_index_before(high).max(start).min(total - 1);

    let mut pinned = None;
    if top > 0 {
        if start <= top {
            // The window touches the pinned leaders; merge into one
            // contiguous instruction.
            start = 0;
        } else {
            pinned = Some(ItemRange::new(0, top - 1));
        }
    }

    WindowState {
        item_range: Some(ItemRange::new(start, end.max(start))),
        pinned_range: pinned,
        list_offset: ledger.offset_of(start),
        total_height: ledger.total_height() + sanitize_px(params.footer_height),
    }
}
