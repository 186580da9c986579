/// Configuration for [`crate::ListEngine`].
///
/// Builder-style; all fields have working defaults.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ListOptions {
    /// Height assumed for items that have not been measured yet.
    ///
    /// When `None`, the engine starts in a bootstrap window of a single item
    /// until the first measurement arrives, and from then on estimates
    /// unmeasured items with the mean of all measured heights.
    pub default_item_height: Option<f64>,

    /// Debounced fallback duration for resetting `is_scrolling` after the
    /// last scroll event, applied by [`crate::ListEngine::tick`].
    pub is_scrolling_reset_delay_ms: u64,

    /// How far (in pixels) a resolved scroll-to target may drift from the
    /// optimistically issued one before a single corrective scroll command is
    /// emitted.
    pub correction_tolerance_px: f64,
}

impl Default for ListOptions {
    fn default() -> Self {
        Self {
            default_item_height: None,
            is_scrolling_reset_delay_ms: 150,
            correction_tolerance_px: 1.0,
        }
    }
}

impl ListOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_default_item_height(mut self, height: f64) -> Self {
        self.default_item_height = Some(crate::types::sanitize_px(height));
        self
    }

    pub fn with_is_scrolling_reset_delay_ms(mut self, delay_ms: u64) -> Self {
        self.is_scrolling_reset_delay_ms = delay_ms;
        self
    }

    pub fn with_correction_tolerance_px(mut self, tolerance_px: f64) -> Self {
        self.correction_tolerance_px = crate::types::sanitize_px(tolerance_px);
        self
    }
}

/// Configuration for [`crate::GridEngine`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct GridOptions {
    /// Debounced fallback duration for resetting `is_scrolling` after the
    /// last scroll event, applied by [`crate::GridEngine::tick`].
    pub is_scrolling_reset_delay_ms: u64,
}

impl Default for GridOptions {
    fn default() -> Self {
        Self {
            is_scrolling_reset_delay_ms: 150,
        }
    }
}

impl GridOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_is_scrolling_reset_delay_ms(mut self, delay_ms: u64) -> Self {
        self.is_scrolling_reset_delay_ms = delay_ms;
        self
    }
}
