use alloc::vec::Vec;

use crate::types::{fabs, sanitize_px};

/// Per-index height bookkeeping with lazy cumulative-offset maintenance.
///
/// Two modes:
/// - **fixed**: one constant height, all lookups O(1), no table.
/// - **variable**: measured heights recorded per index; unmeasured indices
///   contribute the running estimate (mean of all measured heights, seeded by
///   an optional default). The prefix-sum table is invalidated lazily from
///   the lowest dirty index and rebuilt on demand, so a monotonic scan of
///   `offset_of` stays amortized O(1) per call.
#[derive(Clone, Debug)]
pub struct HeightLedger {
    count: usize,
    fixed: Option<f64>,
    default_height: Option<f64>,

    heights: Vec<f64>, // meaningful only where `measured` is set
    measured: Vec<bool>,
    measured_sum: f64,
    measured_count: usize,
    first_unmeasured: usize,

    prefix: Vec<f64>, // prefix[i] = offset of index i; valid for i <= valid_upto
    valid_upto: usize,
}

impl HeightLedger {
    pub fn new(count: usize, fixed: Option<f64>, default_height: Option<f64>) -> Self {
        let mut ledger = Self {
            count: 0,
            fixed: fixed.map(sanitize_px),
            default_height: default_height.map(sanitize_px),
            heights: Vec::new(),
            measured: Vec::new(),
            measured_sum: 0.0,
            measured_count: 0,
            first_unmeasured: 0,
            prefix: Vec::new(),
            valid_upto: 0,
        };
        ledger.set_count(count);
        ledger
    }

    pub fn count(&self) -> usize {
        self.count
    }

    pub fn is_fixed(&self) -> bool {
        self.fixed.is_some()
    }

    /// Switches between fixed and variable mode. Variable-mode records are
    /// kept, so flipping back resumes from the same measurements.
    pub fn set_fixed(&mut self, fixed: Option<f64>) {
        self.fixed = fixed.map(sanitize_px);
    }

    /// Resizes the index space, preserving existing records.
    pub fn set_count(&mut self, count: usize) {
        if count == self.count {
            return;
        }
        if count < self.count {
            self.heights.truncate(count);
            self.measured.truncate(count);
            // Dropped records leave the running mean; recount the survivors.
            self.measured_sum = 0.0;
            self.measured_count = 0;
            for i in 0..count {
                if self.measured[i] {
                    self.measured_sum += self.heights[i];
                    self.measured_count += 1;
                }
            }
            self.first_unmeasured = self.first_unmeasured.min(count);
            self.valid_upto = 0;
        } else {
            self.heights.resize(count, 0.0);
            self.measured.resize(count, false);
            self.first_unmeasured = self.first_unmeasured.min(self.count);
            self.valid_upto = self.valid_upto.min(self.count);
        }
        self.count = count;
        self.prefix.clear();
    }

    /// Mean of all measured heights, or the configured default before any
    /// measurement exists.
    pub fn estimate(&self) -> f64 {
        if self.measured_count > 0 {
            self.measured_sum / self.measured_count as f64
        } else {
            self.default_height.unwrap_or(0.0)
        }
    }

    /// True when no size information of any kind is available yet; callers
    /// render a single bootstrap item so a first measurement can happen.
    pub fn is_unsized(&self) -> bool {
        self.fixed.is_none() && self.measured_count == 0 && self.default_height.is_none()
    }

    pub fn is_measured(&self, index: usize) -> bool {
        self.fixed.is_some() || self.measured.get(index).copied().unwrap_or(false)
    }

    pub fn measured_count(&self) -> usize {
        self.measured_count
    }

    pub fn is_fully_measured(&self) -> bool {
        self.fixed.is_some() || self.measured_count == self.count
    }

    /// True when any index in `[0, index]` still carries an estimate.
    pub fn has_unmeasured_below(&self, index: usize) -> bool {
        if self.fixed.is_some() || self.count == 0 {
            return false;
        }
        self.first_unmeasured <= index.min(self.count - 1)
    }

    pub fn height_of(&self, index: usize) -> f64 {
        if let Some(height) = self.fixed {
            return height;
        }
        if self.measured.get(index).copied().unwrap_or(false) {
            self.heights[index]
        } else {
            self.estimate()
        }
    }

    /// Idempotent upsert of a measured record.
    ///
    /// Returns `true` when the record changed (and offsets were invalidated).
    /// Ignored in fixed mode and for out-of-range indices.
    pub fn record(&mut self, index: usize, height: f64) -> bool {
        if self.fixed.is_some() || index >= self.count {
            return false;
        }
        let height = sanitize_px(height);
        let estimate_before = self.estimate();

        if self.measured[index] {
            if self.heights[index] == height {
                return false;
            }
            self.measured_sum += height - self.heights[index];
        } else {
            self.measured[index] = true;
            self.measured_sum += height;
            self.measured_count += 1;
            while self.first_unmeasured < self.count && self.measured[self.first_unmeasured] {
                self.first_unmeasured += 1;
            }
        }
        self.heights[index] = height;

        // An estimate shift re-prices every unmeasured index, so the table is
        // dirty from the lowest of the two.
        let dirty_from = if fabs(self.estimate() - estimate_before) > f64::EPSILON {
            index.min(self.first_unmeasured)
        } else {
            index
        };
        self.valid_upto = self.valid_upto.min(dirty_from);
        true
    }

    /// Forgets all measured records (the estimate falls back to the default).
    pub fn reset_measurements(&mut self) {
        for flag in &mut self.measured {
            *flag = false;
        }
        self.measured_sum = 0.0;
        self.measured_count = 0;
        self.first_unmeasured = 0;
        self.valid_upto = 0;
    }

    /// Cumulative height of indices `[0, index)`.
    pub fn offset_of(&mut self, index: usize) -> f64 {
        let index = index.min(self.count);
        if let Some(height) = self.fixed {
            return index as f64 * height;
        }
        self.ensure_built(index);
        if self.prefix.is_empty() {
            0.0
        } else {
            self.prefix[index]
        }
    }

    /// Largest index whose offset is `<= offset`, clamped to `count - 1`.
    pub fn index_at_offset(&mut self, offset: f64) -> usize {
        self.search(offset, false)
    }

    /// Largest index whose offset is strictly `< offset` (0 when none). Used
    /// for the exclusive bottom edge of a viewport window.
    pub fn last_index_before(&mut self, offset: f64) -> usize {
        self.search(offset, true)
    }

    pub fn total_height(&mut self) -> f64 {
        self.offset_of(self.count)
    }

    fn search(&mut self, offset: f64, strict: bool) -> usize {
        if self.count == 0 {
            return 0;
        }
        let offset = if offset.is_finite() && offset > 0.0 {
            offset
        } else {
            return 0;
        };

        if let Some(height) = self.fixed {
            if height <= 0.0 {
                return 0;
            }
            let quotient = offset / height;
            let mut index = quotient as usize;
            if strict && index as f64 * height >= offset {
                index = index.saturating_sub(1);
            }
            return index.min(self.count - 1);
        }

        self.ensure_built(self.count);
        // prefix[0] == 0.0 <= offset always holds here, so the partition
        // point is at least 1.
        let partition = if strict {
            self.prefix.partition_point(|&p| p < offset)
        } else {
            self.prefix.partition_point(|&p| p <= offset)
        };
        partition.saturating_sub(1).min(self.count - 1)
    }

    fn ensure_built(&mut self, upto: usize) {
        if self.prefix.len() != self.count + 1 {
            self.prefix.clear();
            self.prefix.resize(self.count + 1, 0.0);
            self.valid_upto = 0;
        }
        if upto <= self.valid_upto {
            return;
        }
        let estimate = self.estimate();
        for i in self.valid_upto..upto {
            let height = if self.measured[i] {
                self.heights[i]
            } else {
                estimate
            };
            self.prefix[i + 1] = self.prefix[i] + height;
        }
        self.valid_upto = upto;
    }
}
