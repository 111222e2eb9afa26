//! Sensornet Core -- placement state for a sensor monitoring panel.
//!
//! This crate owns the catalog of sensor entities, a fixed-size grid of
//! placement slots, and the set of non-directional links between occupied
//! slots, together with every invariant that ties them together:
//!
//! - a sensor occupies at most one slot at any time;
//! - a link is identified by the unordered pair of its endpoints' occupant
//!   ids, deduplicated order-independently, and never outlives the
//!   occupancy of either endpoint;
//! - relocating a placed sensor carries its links along.
//!
//! # Key Types
//!
//! - [`catalog::Catalog`] -- ordered sensor collection plus the kind
//!   registry.
//! - [`grid::SlotGrid`] -- slots and links with the invariant-preserving
//!   place/clear/connect/disconnect operations.
//! - [`panel::Panel`] -- the manager facade: sole mutator, placed-id
//!   bookkeeping, unplaced views, connect-mode selection workflow, change
//!   notification.
//! - [`event::PanelEvent`] -- typed change events delivered to
//!   [`event::PanelListener`]s after each mutation.
//! - [`store`] -- line-oriented catalog and measurement-log persistence.
//! - [`ingest`] -- the measurement simulator's line protocol.
//!
//! Everything is single-threaded and synchronous: a mutating call runs to
//! completion, restores every invariant, then notifies listeners.

pub mod catalog;
pub mod event;
pub mod grid;
pub mod id;
pub mod ingest;
pub mod panel;
pub mod store;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;
