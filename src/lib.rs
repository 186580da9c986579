//! A headless windowing engine for virtualized lists, grouped lists, and
//! grids.
//!
//! The engine renders only a bounded window of items from an arbitrarily
//! large, possibly variable-height list, so a host UI never materializes more
//! elements than the viewport plus a safety margin needs. It is a reactive
//! dataflow graph: push scroll positions, viewport geometry, and item
//! measurements into its input cells, observe the rendering window, offsets,
//! and scroll commands on its output cells.
//!
//! It is UI-agnostic. A host layer is expected to provide:
//! - viewport size and scroll offset
//! - measured item sizes as they become known
//! - execution of emitted scroll commands
//!
//! Three variants share the same machinery:
//! - [`ListEngine`] — flat lists with fixed or dynamically measured heights,
//!   pinned leading items, and an optional footer.
//! - [`ListEngine`] with `group_counts` — grouped lists over a flat
//!   header+children super-index space.
//! - [`GridEngine`] — uniform-cell grids.
#![cfg_attr(not(feature = "std"), no_std)]
#![forbid(unsafe_code)]

extern crate alloc;

#[cfg(test)]
extern crate std;

#[macro_use]
mod macros;

mod engine;
mod grid;
mod grouped;
mod ledger;
mod options;
mod scroll;
mod stream;
mod types;
mod window;


pub use engine::ListEngine;
pub use grid::{GridEngine, GridLayout, GridState};
pub use grouped::GroupIndexMapper;
pub use ledger::HeightLedger;
pub use options::{GridOptions, ListOptions};
pub use stream::{Input, Output, Subscription};
pub use types::{Align, GridDimensions, GroupedEntry, HeightEvent, ItemRange, ScrollRequest};
pub use window::{WindowParams, WindowState, compute_window};
