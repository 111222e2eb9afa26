//! Typed change events emitted by the panel.
//!
//! Renderers and persistence layers subscribe with a [`PanelListener`] and
//! receive events synchronously, after the mutation that caused them has
//! completed. The core is single-threaded, so there is no buffering and no
//! delivery phase: by the time a listener runs, the panel already satisfies
//! its invariants again.

use crate::id::{SensorId, SensorKindId};

// ---------------------------------------------------------------------------
// Event types
// ---------------------------------------------------------------------------

/// A change to the catalog, the grid, or the link set.
#[derive(Debug, Clone, PartialEq)]
pub enum PanelEvent {
    // -- Catalog --
    SensorAdded {
        id: SensorId,
        kind: SensorKindId,
    },
    SensorRemoved {
        id: SensorId,
    },
    ValueUpdated {
        id: SensorId,
        value: Option<f64>,
    },

    // -- Grid --
    SlotFilled {
        slot: usize,
        id: SensorId,
    },
    SlotCleared {
        slot: usize,
        id: SensorId,
    },

    // -- Links --
    LinkAdded {
        a: SensorId,
        b: SensorId,
    },
    LinkRemoved {
        a: SensorId,
        b: SensorId,
    },
}

/// Discriminant tag for event types, used for filtering by listeners.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PanelEventKind {
    SensorAdded,
    SensorRemoved,
    ValueUpdated,
    SlotFilled,
    SlotCleared,
    LinkAdded,
    LinkRemoved,
}

impl PanelEvent {
    /// Get the discriminant kind for this event.
    pub fn kind(&self) -> PanelEventKind {
        match self {
            PanelEvent::SensorAdded { .. } => PanelEventKind::SensorAdded,
            PanelEvent::SensorRemoved { .. } => PanelEventKind::SensorRemoved,
            PanelEvent::ValueUpdated { .. } => PanelEventKind::ValueUpdated,
            PanelEvent::SlotFilled { .. } => PanelEventKind::SlotFilled,
            PanelEvent::SlotCleared { .. } => PanelEventKind::SlotCleared,
            PanelEvent::LinkAdded { .. } => PanelEventKind::LinkAdded,
            PanelEvent::LinkRemoved { .. } => PanelEventKind::LinkRemoved,
        }
    }
}

// ---------------------------------------------------------------------------
// Listener
// ---------------------------------------------------------------------------

/// Receives panel events. Listeners only read; the panel is the sole mutator.
pub trait PanelListener: std::fmt::Debug {
    fn on_event(&mut self, event: &PanelEvent);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kind_matches_variant() {
        let event = PanelEvent::SlotFilled {
            slot: 3,
            id: SensorId(1),
        };
        assert_eq!(event.kind(), PanelEventKind::SlotFilled);

        let event = PanelEvent::LinkRemoved {
            a: SensorId(1),
            b: SensorId(2),
        };
        assert_eq!(event.kind(), PanelEventKind::LinkRemoved);
    }
}
