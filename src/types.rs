/// Alignment of a scroll-to-index target within the viewport.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Align {
    Start,
    Center,
    End,
}

/// An inclusive index interval `[start, end]`.
///
/// Engine outputs use `Option<ItemRange>`; `None` means nothing to render
/// (an empty list).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ItemRange {
    pub start: usize,
    pub end: usize,
}

impl ItemRange {
    pub fn new(start: usize, end: usize) -> Self {
        debug_assert!(start <= end, "ItemRange start must not exceed end");
        Self { start, end }
    }

    pub fn len(&self) -> usize {
        self.end - self.start + 1
    }

    pub fn is_empty(&self) -> bool {
        false
    }

    pub fn contains(&self, index: usize) -> bool {
        index >= self.start && index <= self.end
    }
}

/// An imperative scroll request. Consumed once; may spawn a single follow-up
/// correction when sizes along the path are still estimated.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ScrollRequest {
    pub index: usize,
    pub align: Align,
}

impl ScrollRequest {
    pub fn new(index: usize, align: Align) -> Self {
        Self { index, align }
    }
}

/// A measured pixel height reported by the host's size observer.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct HeightEvent {
    pub index: usize,
    pub height: f64,
}

impl HeightEvent {
    pub fn new(index: usize, height: f64) -> Self {
        Self { index, height }
    }
}

/// Uniform cell geometry for the grid variant, sampled from the container and
/// a single rendered cell.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct GridDimensions {
    pub viewport_width: f64,
    pub viewport_height: f64,
    pub item_width: f64,
    pub item_height: f64,
}

impl GridDimensions {
    pub fn new(viewport_width: f64, viewport_height: f64, item_width: f64, item_height: f64) -> Self {
        Self {
            viewport_width: sanitize_px(viewport_width),
            viewport_height: sanitize_px(viewport_height),
            item_width: sanitize_px(item_width),
            item_height: sanitize_px(item_height),
        }
    }
}

/// What a flat super-index resolves to in a grouped list.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum GroupedEntry {
    /// The header slot of `group`.
    Group { group: usize },
    /// A child item; `index_in_group` is its transposed index (position
    /// within its own group, header slots removed).
    Item { group: usize, index_in_group: usize },
}

/// Clamps malformed pixel quantities (negative, NaN, infinite) to 0.
///
/// A rendering loop must never fail mid-scroll, so bad numeric input degrades
/// to a safe default instead of propagating.
pub(crate) fn sanitize_px(value: f64) -> f64 {
    if value.is_finite() && value > 0.0 { value } else { 0.0 }
}

pub(crate) fn fabs(value: f64) -> f64 {
    if value < 0.0 { -value } else { value }
}

/// Floor of a non-negative finite value, usable without `std`.
pub(crate) fn floor_nn(value: f64) -> f64 {
    (value as u64) as f64
}

/// Ceiling of a non-negative finite value, usable without `std`.
pub(crate) fn ceil_nn(value: f64) -> f64 {
    let truncated = (value as u64) as f64;
    if truncated < value { truncated + 1.0 } else { truncated }
}
