use alloc::rc::Rc;
use alloc::vec::Vec;
use core::cell::RefCell;

use crate::options::GridOptions;
use crate::scroll::{EndWatermark, ScrollDebounce};
use crate::stream::{Input, Output, Subscription};
use crate::types::{
    Align, GridDimensions, ItemRange, ScrollRequest, ceil_nn, floor_nn, sanitize_px,
};

/// Uniform-cell row/column math for the grid variant.
///
/// All cells share one measured width/height sampled from a single rendered
/// cell, so no per-item ledger is needed.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct GridLayout {
    dims: GridDimensions,
}

/// One grid rendering instruction.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GridState {
    pub item_range: Option<ItemRange>,
    pub list_offset: f64,
    pub total_height: f64,
}

impl GridState {
    fn empty() -> Self {
        Self {
            item_range: None,
            list_offset: 0.0,
            total_height: 0.0,
        }
    }
}

impl GridLayout {
    pub fn new(dims: GridDimensions) -> Self {
        Self {
            dims: GridDimensions::new(
                dims.viewport_width,
                dims.viewport_height,
                dims.item_width,
                dims.item_height,
            ),
        }
    }

    pub fn dimensions(&self) -> GridDimensions {
        self.dims
    }

    /// Number of columns; at least 1, independent of `total_count`.
    pub fn columns(&self) -> usize {
        if self.dims.item_width <= 0.0 {
            return 1;
        }
        (floor_nn(self.dims.viewport_width / self.dims.item_width) as usize).max(1)
    }

    pub fn row_count(&self, total_count: usize) -> usize {
        total_count.div_ceil(self.columns())
    }

    pub fn total_height(&self, total_count: usize) -> f64 {
        self.row_count(total_count) as f64 * self.dims.item_height
    }

    /// Row window for a scroll position, before conversion to item indices.
    pub fn row_window(&self, scroll_top: f64, overscan_px: f64, total_count: usize) -> (usize, usize) {
        let height = self.dims.item_height;
        if height <= 0.0 || total_count == 0 {
            return (0, 0);
        }
        let scroll_top = sanitize_px(scroll_top);
        let overscan = sanitize_px(overscan_px);
        let viewport = self.dims.viewport_height;

        let last_row = self.row_count(total_count) - 1;
        let start_row = (floor_nn(sanitize_px(scroll_top - overscan) / height) as usize).min(last_row);
        let end_row = (ceil_nn((scroll_top + viewport + overscan) / height) as usize)
            .saturating_sub(1)
            .clamp(start_row, last_row);
        (start_row, end_row)
    }

    /// Converts a scroll position into a cell-index window.
    pub fn window(&self, scroll_top: f64, overscan_px: f64, total_count: usize) -> GridState {
        if total_count == 0 {
            return GridState::empty();
        }
        if self.dims.item_height <= 0.0 {
            // Cell size unknown: render the first row so the host can sample
            // a cell and report real dimensions.
            return GridState {
                item_range: Some(ItemRange::new(0, self.columns().min(total_count) - 1)),
                list_offset: 0.0,
                total_height: 0.0,
            };
        }

        let columns = self.columns();
        let (start_row, end_row) = self.row_window(scroll_top, overscan_px, total_count);
        let start = start_row * columns;
        let end = ((end_row + 1) * columns - 1).min(total_count - 1);

        GridState {
            item_range: Some(ItemRange::new(start.min(end), end)),
            list_offset: start_row as f64 * self.dims.item_height,
            total_height: self.total_height(total_count),
        }
    }

    /// Resolves a scroll request against the row containing the cell.
    pub fn scroll_target(&self, request: ScrollRequest, total_count: usize) -> f64 {
        if total_count == 0 || self.dims.item_height <= 0.0 {
            return 0.0;
        }
        let index = request.index.min(total_count - 1);
        let row = index / self.columns();
        let offset = row as f64 * self.dims.item_height;
        let viewport = self.dims.viewport_height;
        let height = self.dims.item_height;

        let target = match request.align {
            Align::Start => offset,
            Align::Center => offset - (viewport - height) / 2.0,
            Align::End => offset - viewport + height,
        };
        let max_scroll = sanitize_px(self.total_height(total_count) - viewport);
        sanitize_px(target).min(max_scroll)
    }
}

struct GridInner {
    layout: GridLayout,
    total_count: usize,
    overscan_px: f64,
    scroll_top: f64,
    scrolling: ScrollDebounce,
    watermark: EndWatermark,
    /// Last emitted row window; scroll events re-deriving the same rows do
    /// not recompute or re-emit layout outputs.
    last_rows: Option<(usize, usize)>,
}

#[derive(Clone)]
struct GridOutCells {
    item_range: Input<Option<ItemRange>>,
    list_offset: Input<f64>,
    total_height: Input<f64>,
    is_scrolling: Input<bool>,
    end_reached: Input<usize>,
    scroll_to: Input<f64>,
}

struct GridEmit {
    state: Option<GridState>,
    is_scrolling: bool,
    end_reached: Option<usize>,
}

impl GridEmit {
    fn publish(self, out: &GridOutCells) {
        if let Some(state) = self.state {
            out.item_range.next_if_changed(state.item_range);
            out.list_offset.next_if_changed(state.list_offset);
            out.total_height.next_if_changed(state.total_height);
        }
        out.is_scrolling.next_if_changed(self.is_scrolling);
        if let Some(index) = self.end_reached {
            out.end_reached.next(index);
        }
    }
}

impl GridInner {
    fn refresh(&mut self, force: bool) -> GridEmit {
        let rows = if self.total_count == 0 || self.layout.dimensions().item_height <= 0.0 {
            None
        } else {
            Some(
                self.layout
                    .row_window(self.scroll_top, self.overscan_px, self.total_count),
            )
        };

        let state = if force || rows != self.last_rows {
            self.last_rows = rows;
            Some(
                self.layout
                    .window(self.scroll_top, self.overscan_px, self.total_count),
            )
        } else {
            None
        };

        let end_reached = state
            .and_then(|s| self.watermark.observe(s.item_range, self.total_count));

        GridEmit {
            state,
            is_scrolling: self.scrolling.is_scrolling(),
            end_reached,
        }
    }
}

/// The uniform-grid windowing engine.
///
/// One instance is exclusively owned by one mounted grid; it is driven only
/// through its input cells and observed only through its output cells.
pub struct GridEngine {
    pub total_count: Input<usize>,
    pub overscan: Input<f64>,
    pub grid_dimensions: Input<GridDimensions>,
    pub scroll_top: Input<f64>,
    pub scroll_to_index: Input<ScrollRequest>,

    pub item_range: Output<Option<ItemRange>>,
    pub list_offset: Output<f64>,
    pub total_height: Output<f64>,
    pub is_scrolling: Output<bool>,
    pub end_reached: Output<usize>,
    pub scroll_to: Output<f64>,

    inner: Rc<RefCell<GridInner>>,
    out: GridOutCells,
    _subs: Vec<Subscription>,
}

impl GridEngine {
    pub fn new(options: GridOptions) -> Self {
        let inner = Rc::new(RefCell::new(GridInner {
            layout: GridLayout::default(),
            total_count: 0,
            overscan_px: 0.0,
            scroll_top: 0.0,
            scrolling: ScrollDebounce::new(options.is_scrolling_reset_delay_ms),
            watermark: EndWatermark::default(),
            last_rows: None,
        }));

        let out = GridOutCells {
            item_range: Input::new(None),
            list_offset: Input::new(0.0),
            total_height: Input::new(0.0),
            is_scrolling: Input::new(false),
            end_reached: Input::cold(),
            scroll_to: Input::cold(),
        };

        let total_count = Input::new(0usize);
        let overscan = Input::new(0.0f64);
        let grid_dimensions = Input::new(GridDimensions::default());
        let scroll_top = Input::new(0.0f64);
        let scroll_to_index: Input<ScrollRequest> = Input::cold();

        let mut subs = Vec::new();

        subs.push(total_count.output().subscribe({
            let inner = Rc::clone(&inner);
            let out = out.clone();
            move |count: usize| {
                let emit = {
                    let mut st = inner.borrow_mut();
                    st.total_count = count;
                    st.refresh(true)
                };
                emit.publish(&out);
            }
        }));

        subs.push(overscan.output().subscribe({
            let inner = Rc::clone(&inner);
            let out = out.clone();
            move |px: f64| {
                let emit = {
                    let mut st = inner.borrow_mut();
                    st.overscan_px = sanitize_px(px);
                    st.refresh(true)
                };
                emit.publish(&out);
            }
        }));

        subs.push(grid_dimensions.output().subscribe({
            let inner = Rc::clone(&inner);
            let out = out.clone();
            move |dims: GridDimensions| {
                let emit = {
                    let mut st = inner.borrow_mut();
                    st.layout = GridLayout::new(dims);
                    st.refresh(true)
                };
                emit.publish(&out);
            }
        }));

        subs.push(scroll_top.output().subscribe({
            let inner = Rc::clone(&inner);
            let out = out.clone();
            move |px: f64| {
                let emit = {
                    let mut st = inner.borrow_mut();
                    let px = sanitize_px(px);
                    if px == st.scroll_top {
                        None
                    } else {
                        st.scroll_top = px;
                        st.scrolling.on_scroll();
                        Some(st.refresh(false))
                    }
                };
                if let Some(emit) = emit {
                    emit.publish(&out);
                }
            }
        }));

        subs.push(scroll_to_index.output().subscribe({
            let inner = Rc::clone(&inner);
            let out = out.clone();
            move |request: ScrollRequest| {
                let target = {
                    let st = inner.borrow();
                    st.layout.scroll_target(request, st.total_count)
                };
                ldebug!(index = request.index, target, "grid scroll_to_index");
                out.scroll_to.next(target);
            }
        }));

        Self {
            total_count,
            overscan,
            grid_dimensions,
            scroll_top,
            scroll_to_index,
            item_range: out.item_range.output(),
            list_offset: out.list_offset.output(),
            total_height: out.total_height.output(),
            is_scrolling: out.is_scrolling.output(),
            end_reached: out.end_reached.output(),
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
}

impl Default for GridEngine {
    fn default() -> Self {
        Self::new(GridOptions::default())
    }
}

impl core::fmt::Debug for GridEngine {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str("GridEngine(..)")
    }
}
