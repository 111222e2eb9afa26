//! Reversible actions: the unit of undo/redo.
//!
//! Each variant pairs a forward effect with its exact inverse. Everything
//! the inverse needs is captured from live state by the handler *before*
//! the forward effect runs, so applying and inverting an action restores
//! the prior catalog/grid/link state exactly, cascades included. Because
//! undo is strictly LIFO, an inverse always runs against the state its
//! forward effect produced, which keeps the captured data valid across
//! redo cycles as well.

use crate::ConsoleError;
use sensornet_core::catalog::Sensor;
use sensornet_core::id::SensorId;
use sensornet_core::panel::Panel;

/// A forward effect, its inverse, and a description for the undo/redo
/// confirmations.
#[derive(Debug, Clone)]
pub enum ConsoleAction {
    /// `add entity` -- append a sensor to the catalog.
    AddEntity { sensor: Sensor },

    /// `delete entity` -- remove a sensor, vacating its slot and severing
    /// its links first.
    DeleteEntity {
        /// Catalog position the sensor held, for order-exact restore.
        index: usize,
        sensor: Sensor,
        slot: Option<usize>,
        severed: Vec<(SensorId, SensorId)>,
    },

    /// `place` -- put a sensor into a slot, relocating or displacing as
    /// needed.
    Place {
        id: SensorId,
        target: usize,
        /// Slot the sensor held before, if it was already on the grid.
        origin: Option<usize>,
        /// Occupant the placement pushes off the target, if any.
        displaced: Option<SensorId>,
        /// Links severed by displacing that occupant.
        severed: Vec<(SensorId, SensorId)>,
        /// The mover's own links; re-created if restoring the displaced
        /// occupant severs them again on the way back.
        carried: Vec<(SensorId, SensorId)>,
    },

    /// `clear-slot` -- empty a slot (a no-op when it already is empty,
    /// which still records as an action, matching the console transcript).
    ClearSlot {
        slot: usize,
        occupant: Option<SensorId>,
        severed: Vec<(SensorId, SensorId)>,
    },

    /// `connect` -- link two placed sensors.
    Connect { a: SensorId, b: SensorId },

    /// `disconnect` -- remove the link between two sensors.
    Disconnect { a: SensorId, b: SensorId },
}

impl ConsoleAction {
    /// Human-readable description, used in `Undone:`/`Redone:` lines.
    pub fn description(&self) -> String {
        match self {
            ConsoleAction::AddEntity { sensor } => format!("add entity {}", sensor.id.0),
            ConsoleAction::DeleteEntity { sensor, .. } => {
                format!("delete entity {}", sensor.id.0)
            }
            ConsoleAction::Place { id, target, .. } => {
                format!("place entity {} -> slot {target}", id.0)
            }
            ConsoleAction::ClearSlot { slot, .. } => format!("clear-slot {slot}"),
            ConsoleAction::Connect { a, b } => format!("connect {}-{}", a.0, b.0),
            ConsoleAction::Disconnect { a, b } => format!("disconnect {}-{}", a.0, b.0),
        }
    }

    /// Run the forward effect.
    pub fn apply(&self, panel: &mut Panel) -> Result<(), ConsoleError> {
        match self {
            ConsoleAction::AddEntity { sensor } => {
                panel.add_sensor(sensor.clone()).map_err(defect)?;
            }
            ConsoleAction::DeleteEntity { sensor, .. } => {
                panel.remove_sensor(sensor.id).map_err(defect)?;
            }
            ConsoleAction::Place { id, target, .. } => {
                panel.place(*target, *id).map_err(defect)?;
            }
            ConsoleAction::ClearSlot { slot, .. } => {
                panel.clear_slot(*slot).map_err(defect)?;
            }
            ConsoleAction::Connect { a, b } => {
                panel.connect_ids(*a, *b).map_err(defect)?;
            }
            ConsoleAction::Disconnect { a, b } => {
                if !panel.disconnect(*a, *b) {
                    return Err(defect("link to disconnect is gone"));
                }
            }
        }
        Ok(())
    }

    /// Run the exact inverse of the forward effect.
    pub fn invert(&self, panel: &mut Panel) -> Result<(), ConsoleError> {
        match self {
            ConsoleAction::AddEntity { sensor } => {
                panel.remove_sensor(sensor.id).map_err(defect)?;
            }

            ConsoleAction::DeleteEntity {
                index,
                sensor,
                slot,
                severed,
            } => {
                // Catalog entry, then placement, then links, in that order.
                panel
                    .insert_sensor_at(*index, sensor.clone())
                    .map_err(defect)?;
                if let Some(slot) = slot {
                    panel.place(*slot, sensor.id).map_err(defect)?;
                }
                reconnect(panel, severed)?;
            }

            ConsoleAction::Place {
                id,
                target,
                origin,
                displaced,
                severed,
                carried,
            } => {
                // The displaced occupant returns to the target slot first,
                // then the mover to its origin; double occupancy never
                // arises. Links are restored only after both are back on
                // the grid: a severed link can involve the mover, and
                // restoring the displaced occupant severs the mover's own
                // links on the way. The two sets can share a pair, so
                // `reconnect` deduplicates.
                if let Some(displaced) = displaced {
                    panel.place(*target, *displaced).map_err(defect)?;
                }
                match origin {
                    Some(origin) => {
                        panel.place(*origin, *id).map_err(defect)?;
                    }
                    None => {
                        if displaced.is_none() {
                            panel.clear_slot(*target).map_err(defect)?;
                        }
                    }
                }
                if displaced.is_some() {
                    reconnect(panel, severed)?;
                    reconnect(panel, carried)?;
                }
            }

            ConsoleAction::ClearSlot {
                slot,
                occupant,
                severed,
            } => {
                if let Some(occupant) = occupant {
                    panel.place(*slot, *occupant).map_err(defect)?;
                    reconnect(panel, severed)?;
                }
            }

            ConsoleAction::Connect { a, b } => {
                if !panel.disconnect(*a, *b) {
                    return Err(defect("link to undo is gone"));
                }
            }

            ConsoleAction::Disconnect { a, b } => {
                panel.connect_ids(*a, *b).map_err(defect)?;
            }
        }
        Ok(())
    }
}

/// Re-create links from captured unordered id pairs, skipping any that are
/// already back (the captured sets may overlap).
fn reconnect(panel: &mut Panel, pairs: &[(SensorId, SensorId)]) -> Result<(), ConsoleError> {
    for &(a, b) in pairs {
        if panel.link_exists(a, b) {
            continue;
        }
        panel.connect_ids(a, b).map_err(defect)?;
    }
    Ok(())
}

/// A replay failure is a defect, not a user error: handlers validated the
/// preconditions before the action was recorded.
fn defect(err: impl std::fmt::Display) -> ConsoleError {
    ConsoleError::Invariant(err.to_string())
}

// ===========================================================================
// Tests
// ===========================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use sensornet_core::test_utils::{PanelSnapshot, panel_with};

    fn s(id: u32) -> SensorId {
        SensorId(id)
    }

    /// Build the place action the way the console handler does: capture
    /// everything from live state before the forward effect.
    fn capture_place(panel: &Panel, id: SensorId, target: usize) -> ConsoleAction {
        let origin = panel.slot_of(id);
        let displaced = panel.occupant(target).filter(|&occ| occ != id);
        let severed = if displaced.is_some() {
            panel.grid().links_touching(target)
        } else {
            Vec::new()
        };
        ConsoleAction::Place {
            id,
            target,
            origin,
            displaced,
            severed,
            carried: panel.links_of(id),
        }
    }

    #[test]
    fn place_roundtrip_restores_fresh_placement() {
        let mut panel = panel_with(&[1]);
        let before = PanelSnapshot::capture(&panel);

        let action = capture_place(&panel, s(1), 0);
        action.apply(&mut panel).unwrap();
        assert_eq!(panel.occupant(0), Some(s(1)));

        action.invert(&mut panel).unwrap();
        assert_eq!(PanelSnapshot::capture(&panel), before);
    }

    #[test]
    fn place_roundtrip_restores_relocation_with_links() {
        let mut panel = panel_with(&[1, 2]);
        panel.place(0, s(1)).unwrap();
        panel.place(1, s(2)).unwrap();
        panel.connect_ids(s(1), s(2)).unwrap();
        let before = PanelSnapshot::capture(&panel);

        let action = capture_place(&panel, s(1), 5);
        action.apply(&mut panel).unwrap();
        assert_eq!(panel.occupant(5), Some(s(1)));
        assert_eq!(panel.link_count(), 1);

        action.invert(&mut panel).unwrap();
        assert_eq!(PanelSnapshot::capture(&panel), before);
    }

    #[test]
    fn place_roundtrip_restores_displacement_cascade() {
        let mut panel = panel_with(&[1, 2, 3]);
        panel.place(0, s(1)).unwrap();
        panel.place(1, s(2)).unwrap();
        panel.place(2, s(3)).unwrap();
        panel.connect_ids(s(1), s(2)).unwrap();
        panel.connect_ids(s(3), s(2)).unwrap();
        let before = PanelSnapshot::capture(&panel);

        // Sensor 1 relocates onto slot 2, displacing sensor 3.
        let action = capture_place(&panel, s(1), 2);
        action.apply(&mut panel).unwrap();
        assert!(panel.is_unplaced(s(3)));
        assert!(panel.link_exists(s(1), s(2)));
        assert!(!panel.link_exists(s(3), s(2)));

        action.invert(&mut panel).unwrap();
        assert_eq!(PanelSnapshot::capture(&panel), before);
    }

    #[test]
    fn place_roundtrip_when_mover_linked_to_displaced_occupant() {
        let mut panel = panel_with(&[1, 2]);
        panel.place(0, s(1)).unwrap();
        panel.place(2, s(2)).unwrap();
        panel.connect_ids(s(1), s(2)).unwrap();
        let before = PanelSnapshot::capture(&panel);

        // Sensor 1 moves onto the slot of its own link partner.
        let action = capture_place(&panel, s(1), 2);
        action.apply(&mut panel).unwrap();
        assert!(panel.is_unplaced(s(2)));
        assert_eq!(panel.link_count(), 0);

        action.invert(&mut panel).unwrap();
        assert_eq!(PanelSnapshot::capture(&panel), before);
    }

    #[test]
    fn delete_roundtrip_restores_catalog_order_slot_and_links() {
        let mut panel = panel_with(&[1, 2, 3]);
        panel.place(0, s(2)).unwrap();
        panel.place(1, s(3)).unwrap();
        panel.connect_ids(s(2), s(3)).unwrap();
        let before = PanelSnapshot::capture(&panel);

        let action = ConsoleAction::DeleteEntity {
            index: 1,
            sensor: panel.catalog().get(s(2)).unwrap().clone(),
            slot: panel.slot_of(s(2)),
            severed: panel.links_of(s(2)),
        };
        action.apply(&mut panel).unwrap();
        assert!(!panel.catalog().contains(s(2)));
        assert_eq!(panel.link_count(), 0);

        action.invert(&mut panel).unwrap();
        assert_eq!(PanelSnapshot::capture(&panel), before);
    }

    #[test]
    fn clear_slot_roundtrip_restores_links() {
        let mut panel = panel_with(&[1, 2]);
        panel.place(0, s(1)).unwrap();
        panel.place(1, s(2)).unwrap();
        panel.connect_ids(s(1), s(2)).unwrap();
        let before = PanelSnapshot::capture(&panel);

        let action = ConsoleAction::ClearSlot {
            slot: 0,
            occupant: panel.occupant(0),
            severed: panel.grid().links_touching(0),
        };
        action.apply(&mut panel).unwrap();
        assert_eq!(panel.link_count(), 0);

        action.invert(&mut panel).unwrap();
        assert_eq!(PanelSnapshot::capture(&panel), before);
    }

    #[test]
    fn descriptions_name_the_operation() {
        let action = ConsoleAction::Connect { a: s(1), b: s(2) };
        assert_eq!(action.description(), "connect 1-2");
        let action = ConsoleAction::ClearSlot {
            slot: 4,
            occupant: None,
            severed: Vec::new(),
        };
        assert_eq!(action.description(), "clear-slot 4");
    }
}
