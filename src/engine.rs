use alloc::rc::Rc;
use alloc::vec::Vec;
use core::cell::RefCell;

use crate::grouped::GroupIndexMapper;
use crate::ledger::HeightLedger;
use crate::options::ListOptions;
use crate::scroll::{EndWatermark, PendingCorrection, ScrollDebounce, resolve_scroll_target};
use crate::stream::{Input, Output, Subscription};
use crate::types::{HeightEvent, ItemRange, ScrollRequest, fabs, sanitize_px};
use crate::window::{WindowParams, WindowState, compute_window};

#[derive(Clone)]
struct ListOutCells {
    item_range: Input<Option<ItemRange>>,
    pinned_range: Input<Option<ItemRange>>,
    list_offset: Input<f64>,
    total_height: Input<f64>,
    is_scrolling: Input<bool>,
    end_reached: Input<usize>,
    group_indices: Input<Vec<usize>>,
    scroll_to: Input<f64>,
}

struct ListInner {
    ledger: HeightLedger,
    mapper: Option<GroupIndexMapper>,
    params: WindowParams,
    /// `total_count` as last pushed by the host; authoritative only while
    /// ungrouped (group counts derive the render-total otherwise).
    explicit_total: usize,
    scrolling: ScrollDebounce,
    watermark: EndWatermark,
    pending: Option<PendingCorrection>,
    /// A corrective scroll target produced by the current event, consumed by
    /// the next refresh.
    correction: Option<f64>,
    /// Highest total height reported so far; `total_height` never shrinks
    /// while estimates remain, to avoid visible scrollbar jumps.
    reported_total: f64,
    correction_tolerance_px: f64,
}

struct ListEmit {
    window: WindowState,
    group_indices: Vec<usize>,
    is_scrolling: bool,
    end_reached: Option<usize>,
    scroll_to: Option<f64>,
}

impl ListEmit {
    fn publish(self, out: &ListOutCells) {
        out.item_range.next_if_changed(self.window.item_range);
        out.pinned_range.next_if_changed(self.window.pinned_range);
        out.list_offset.next_if_changed(self.window.list_offset);
        out.total_height.next_if_changed(self.window.total_height);
        out.group_indices.next_if_changed(self.group_indices);
        out.is_scrolling.next_if_changed(self.is_scrolling);
        if let Some(index) = self.end_reached {
            out.end_reached.next(index);
        }
        if let Some(target) = self.scroll_to {
            out.scroll_to.next(target);
        }
    }
}

impl ListInner {
    /// Recomputes every derived value after a state mutation. Runs to
    /// completion before any output is published, so no observer ever sees a
    /// half-updated graph.
    fn refresh(&mut self) -> ListEmit {
        let mut window = compute_window(&self.params, &mut self.ledger);

        if self.ledger.is_fully_measured() {
            self.reported_total = window.total_height;
        } else if window.total_height > self.reported_total {
            self.reported_total = window.total_height;
        } else {
            window.total_height = self.reported_total;
        }

        let group_indices = match (&self.mapper, window.item_range) {
            (Some(mapper), Some(range)) => mapper.groups_in_range(range),
            _ => Vec::new(),
        };

        let end_reached = self
            .watermark
            .observe(window.item_range, self.params.total_count);

        ListEmit {
            window,
            group_indices,
            is_scrolling: self.scrolling.is_scrolling(),
            end_reached,
            scroll_to: self.correction.take(),
        }
    }

    fn apply_total(&mut self) {
        let total = match &self.mapper {
            Some(mapper) => mapper.total_entries(),
            None => self.explicit_total,
        };
        self.params.total_count = total;
        self.ledger.set_count(total);
        // A count change may legitimately shrink the list.
        self.reported_total = 0.0;
    }

    fn on_measure(&mut self, event: HeightEvent) -> bool {
        let changed = self.ledger.record(event.index, event.height);
        if !changed {
            return false;
        }
        ldebug!(index = event.index, height = event.height, "measure");

        if let Some(pending) = self.pending {
            let target =
                resolve_scroll_target(pending.request, &mut self.ledger, self.params.viewport_height);
            if fabs(target - pending.issued) > self.correction_tolerance_px {
                // One bounded correction, then the request is settled for
                // good; no oscillation.
                self.correction = Some(target);
                self.pending = None;
            } else if !self.ledger.has_unmeasured_below(pending.request.index) {
                self.pending = None;
            }
        }
        true
    }

    fn on_scroll_request(&mut self, request: ScrollRequest) {
        let request = match &self.mapper {
            Some(mapper) => ScrollRequest::new(mapper.super_index_of_item(request.index), request.align),
            None => request,
        };
        let target = resolve_scroll_target(request, &mut self.ledger, self.params.viewport_height);
        ldebug!(index = request.index, target, "scroll_to_index");

        self.pending = if self.ledger.has_unmeasured_below(request.index.min(
            self.params.total_count.saturating_sub(1),
        )) {
            Some(PendingCorrection {
                request,
                issued: target,
            })
        } else {
            None
        };
        self.correction = Some(target);
    }

    fn on_scroll_top(&mut self, scroll_top: f64) -> bool {
        let scroll_top = sanitize_px(scroll_top);
        if scroll_top == self.params.scroll_top {
            return false;
        }
        ltrace!(scroll_top, "scroll");
        self.params.scroll_top = scroll_top;
        self.scrolling.on_scroll();
        // A user scroll away from an issued target abandons its correction.
        if let Some(pending) = self.pending {
            if fabs(scroll_top - pending.issued) > self.correction_tolerance_px {
                self.pending = None;
            }
        }
        true
    }
}

/// The list windowing engine: a reactive dataflow graph turning scroll
/// position, viewport geometry, and progressively arriving item measurements
/// into a bounded rendering window.
///
/// One instance is exclusively owned by one mounted list. Push into the
/// input cells; observe the output cells. All recomputation for one input
/// event completes synchronously before `next` returns to the caller.
/// Dropping the engine detaches every slot, subscription, and pending
/// correction.
///
/// The grouped variant is the same engine with a non-empty `group_counts`:
/// indices become the flat super-index space (headers + children) and
/// `group_indices` reports the groups intersecting the current window.
pub struct ListEngine {
    /// Number of items. Ignored while `group_counts` is non-empty (the
    /// grouped render-total is derived instead).
    pub total_count: Input<usize>,
    /// Children per group; empty disables grouping.
    pub group_counts: Input<Vec<usize>>,
    /// Extra margin, in pixels, rendered around the visible viewport.
    pub overscan: Input<f64>,
    /// Leading items always rendered (e.g. sticky headers).
    pub top_item_count: Input<usize>,
    /// Fixed pixel height; `Some` switches the ledger to O(1) fixed mode.
    pub item_height: Input<Option<f64>>,
    pub viewport_height: Input<f64>,
    /// Height of a footer rendered after the last item.
    pub footer_height: Input<f64>,
    /// Scroll position, pushed by the host's scroll listener.
    pub scroll_top: Input<f64>,
    /// Measured item sizes, pushed by the host's size observer.
    pub item_heights: Input<HeightEvent>,
    /// Imperative scroll requests. In the grouped variant the index is the
    /// flat item index (header slots ignored).
    pub scroll_to_index: Input<ScrollRequest>,

    pub item_range: Output<Option<ItemRange>>,
    /// Pinned leading items, reported separately when disjoint from
    /// `item_range`; a caller renders the union.
    pub pinned_range: Output<Option<ItemRange>>,
    pub list_offset: Output<f64>,
    pub total_height: Output<f64>,
    pub is_scrolling: Output<bool>,
    /// Fires once per new high-water mark of the window end reaching the
    /// last index. Hosts typically use the slot (`attach`) registration.
    pub end_reached: Output<usize>,
    /// Groups intersecting the current window (grouped variant only).
    pub group_indices: Output<Vec<usize>>,
    /// Scroll commands for the host's scroll-execution collaborator.
    pub scroll_to: Output<f64>,

    inner: Rc<RefCell<ListInner>>,
    out: ListOutCells,
    _subs: Vec<Subscription>,
}

impl ListEngine {
    pub fn new(options: ListOptions) -> Self {
        let inner = Rc::new(RefCell::new(ListInner {
            ledger: HeightLedger::new(0, None, options.default_item_height),
            mapper: None,
            params: WindowParams::default(),
            explicit_total: 0,
            scrolling: ScrollDebounce::new(options.is_scrolling_reset_delay_ms),
            watermark: EndWatermark::default(),
            pending: None,
            correction: None,
            reported_total: 0.0,
            correction_tolerance_px: options.correction_tolerance_px.max(0.0),
        }));

        let out = ListOutCells {
            item_range: Input::new(None),
            pinned_range: Input::new(None),
            list_offset: Input::new(0.0),
            total_height: Input::new(0.0),
            is_scrolling: Input::new(false),
            end_reached: Input::cold(),
            group_indices: Input::new(Vec::new()),
            scroll_to: Input::cold(),
        };

        let total_count = Input::new(0usize);
        let group_counts: Input<Vec<usize>> = Input::new(Vec::new());
        let overscan = Input::new(0.0f64);
        let top_item_count = Input::new(0usize);
        let item_height: Input<Option<f64>> = Input::new(None);
        let viewport_height = Input::new(0.0f64);
        let footer_height = Input::new(0.0f64);
        let scroll_top = Input::new(0.0f64);
        let item_heights: Input<HeightEvent> = Input::cold();
        let scroll_to_index: Input<ScrollRequest> = Input::cold();

        let mut subs = Vec::new();

        // Every handler follows the same shape: mutate under the borrow,
        // refresh the derived state, then publish after the borrow is
        // released so output listeners may freely call back into the engine.
        fn wire<T: Clone + 'static>(
            subs: &mut Vec<Subscription>,
            input: &Input<T>,
            inner: &Rc<RefCell<ListInner>>,
            out: &ListOutCells,
            mut apply: impl FnMut(&mut ListInner, T) -> bool + 'static,
        ) {
            let inner = Rc::clone(inner);
            let out = out.clone();
            subs.push(input.output().subscribe(move |value: T| {
                let emit = {
                    let mut st = inner.borrow_mut();
                    if apply(&mut st, value) {
                        Some(st.refresh())
                    } else {
                        None
                    }
                };
                if let Some(emit) = emit {
                    emit.publish(&out);
                }
            }));
        }

        wire(&mut subs, &total_count, &inner, &out, |st, count: usize| {
            st.explicit_total = count;
            if st.mapper.is_none() {
                st.apply_total();
            }
            st.mapper.is_none()
        });

        wire(
            &mut subs,
            &group_counts,
            &inner,
            &out,
            |st, counts: Vec<usize>| {
                st.mapper = if counts.is_empty() {
                    None
                } else {
                    Some(GroupIndexMapper::new(&counts))
                };
                st.apply_total();
                true
            },
        );

        wire(&mut subs, &overscan, &inner, &out, |st, px: f64| {
            st.params.overscan_px = sanitize_px(px);
            true
        });

        wire(&mut subs, &top_item_count, &inner, &out, |st, count: usize| {
            st.params.top_item_count = count;
            true
        });

        wire(
            &mut subs,
            &item_height,
            &inner,
            &out,
            |st, height: Option<f64>| {
                st.ledger.set_fixed(height);
                st.reported_total = 0.0;
                true
            },
        );

        wire(&mut subs, &viewport_height, &inner, &out, |st, px: f64| {
            st.params.viewport_height = sanitize_px(px);
            true
        });

        wire(&mut subs, &footer_height, &inner, &out, |st, px: f64| {
            st.params.footer_height = sanitize_px(px);
            true
        });

        wire(&mut subs, &scroll_top, &inner, &out, |st, px: f64| {
            st.on_scroll_top(px)
        });

        wire(
            &mut subs,
            &item_heights,
            &inner,
            &out,
            |st, event: HeightEvent| st.on_measure(event),
        );

        wire(
            &mut subs,
            &scroll_to_index,
            &inner,
            &out,
            |st, request: ScrollRequest| {
                st.on_scroll_request(request);
                true
            },
        );

        Self {
            total_count,
            group_counts,
            overscan,
            top_item_count,
            item_height,
            viewport_height,
            footer_height,
            scroll_top,
            item_heights,
            scroll_to_index,
            item_range: out.item_range.output(),
            pinned_range: out.pinned_range.output(),
            list_offset: out.list_offset.output(),
            total_height: out.total_height.output(),
            is_scrolling: out.is_scrolling.output(),
            end_reached: out.end_reached.output(),
            group_indices: out.group_indices.output(),
            scroll_to: out.scroll_to.output(),
            inner,
            out,
            _subs: subs,
        }
    }

    /// Advances the injected clock; turns `is_scrolling` off once the reset
    /// delay elapses with no further scroll events.
    pub fn tick(&self, now_ms: u64) {
        let turned_off = self.inner.borrow_mut().scrolling.tick(now_ms);
        if turned_off {
            self.out.is_scrolling.next_if_changed(false);
        }
    }

    /// Whether a scroll-to-index request is still waiting on measurements
    /// for a possible correction.
    pub fn has_pending_correction(&self) -> bool {
        self.inner.borrow().pending.is_some()
    }
}

impl Default for ListEngine {
    fn default() -> Self {
        Self::new(ListOptions::default())
    }
}

impl core::fmt::Debug for ListEngine {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str("ListEngine(..)")
    }
}
