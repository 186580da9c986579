use crate::ledger::HeightLedger;
use crate::types::{Align, ItemRange, ScrollRequest, sanitize_px};

/// Resolves a scroll request into a concrete `scroll_top`, using current
/// (possibly estimated) heights. Out-of-range indices clamp to the last
/// valid one; the result clamps to the scrollable extent.
pub(crate) fn resolve_scroll_target(
    request: ScrollRequest,
    ledger: &mut HeightLedger,
    viewport_height: f64,
) -> f64 {
    let count = ledger.count();
    if count == 0 {
        return 0.0;
    }
    let index = request.index.min(count - 1);
    let viewport = sanitize_px(viewport_height);
    let offset = ledger.offset_of(index);
    let height = ledger.height_of(index);

    let target = match request.align {
        Align::Start => offset,
        Align::Center => offset - (viewport - height) / 2.0,
        Align::End => offset - viewport + height,
    };

    let max_scroll = sanitize_px(ledger.total_height() - viewport);
    sanitize_px(target).min(max_scroll)
}

/// A scroll command issued against incomplete size knowledge.
///
/// Watches later measurements; once the re-resolved target drifts past the
/// tolerance, exactly one corrective command is emitted and the watch ends.
#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) struct PendingCorrection {
    pub request: ScrollRequest,
    pub issued: f64,
}

/// Debounce for the `is_scrolling` signal.
///
/// The engine is headless, so wall-clock time is injected: scroll events flip
/// the signal on synchronously, and `tick(now_ms)` turns it off once the
/// reset delay elapses with no further events.
#[derive(Clone, Copy, Debug)]
pub(crate) struct ScrollDebounce {
    active: bool,
    event_pending: bool,
    last_event_ms: Option<u64>,
    reset_delay_ms: u64,
}

impl ScrollDebounce {
    pub(crate) fn new(reset_delay_ms: u64) -> Self {
        Self {
            active: false,
            event_pending: false,
            last_event_ms: None,
            reset_delay_ms,
        }
    }

    pub(crate) fn is_scrolling(&self) -> bool {
        self.active
    }

    pub(crate) fn on_scroll(&mut self) {
        self.active = true;
        self.event_pending = true;
    }

    /// Advances the debounce clock. Returns `true` when the signal turned
    /// off on this tick.
    pub(crate) fn tick(&mut self, now_ms: u64) -> bool {
        if self.event_pending {
            self.event_pending = false;
            self.last_event_ms = Some(now_ms);
            return false;
        }
        if !self.active {
            return false;
        }
        let Some(last) = self.last_event_ms else {
            return false;
        };
        if now_ms.saturating_sub(last) >= self.reset_delay_ms {
            self.active = false;
            self.last_event_ms = None;
            return true;
        }
        false
    }
}

/// High-water-mark dedup for the `endReached` signal.
///
/// Fires once per new maximum of the window's end index reaching
/// `total_count - 1`; scrolling away and back to the tail never refires, but
/// a grown `total_count` re-arms at the new tail.
#[derive(Clone, Copy, Debug, Default)]
pub(crate) struct EndWatermark {
    high: Option<usize>,
}

impl EndWatermark {
    pub(crate) fn observe(&mut self, range: Option<ItemRange>, total_count: usize) -> Option<usize> {
        let end = range?.end;
        let is_new_high = self.high.is_none_or(|high| end > high);
        if !is_new_high {
            return None;
        }
        self.high = Some(end);
        (total_count > 0 && end == total_count - 1).then_some(end)
    }
}
