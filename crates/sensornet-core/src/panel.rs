//! The panel: owns the catalog, the slot grid, and the link set, and is the
//! sole mutator of all three.
//!
//! Every mutating call re-derives the placed-id set (the filter behind the
//! unplaced views) and notifies registered listeners with typed
//! [`PanelEvent`]s once the mutation is complete. External collaborators
//! (rendering, persistence) only read.
//!
//! The panel also carries the connect-mode selection workflow: a single
//! pending slot selection that any input surface (mouse adapter, console,
//! test harness) drives through [`Panel::select_slot`].

use crate::catalog::{Catalog, CatalogError, Sensor};
use crate::event::{PanelEvent, PanelListener};
use crate::grid::{ClearOutcome, GridError, PlaceOutcome, SlotGrid};
use crate::id::{SensorId, SensorKindId};
use log::debug;
use std::collections::HashSet;

/// Slot count of the reference deployment.
pub const DEFAULT_SLOT_COUNT: usize = 12;

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

/// Errors surfaced by panel operations.
#[derive(Debug, thiserror::Error)]
pub enum PanelError {
    #[error(transparent)]
    Catalog(#[from] CatalogError),
    #[error(transparent)]
    Grid(#[from] GridError),
}

// ---------------------------------------------------------------------------
// Outcome types
// ---------------------------------------------------------------------------

/// Everything a sensor removal undid, captured for exact inversion.
#[derive(Debug, Clone)]
pub struct RemoveOutcome {
    /// Position the sensor held in the catalog ordering.
    pub index: usize,
    /// The removed sensor.
    pub sensor: Sensor,
    /// The slot it occupied, if it was placed.
    pub slot: Option<usize>,
    /// Id pairs of the links severed by vacating that slot.
    pub severed: Vec<(SensorId, SensorId)>,
}

/// What a connect-mode slot selection did.
#[derive(Debug, Clone, PartialEq)]
pub enum SelectOutcome {
    /// Connect mode is off, or the slot is empty. Nothing changed.
    Ignored,
    /// The slot became the pending selection.
    Pending(usize),
    /// The pending slot was selected again; the pending selection cleared.
    ClearedPending,
    /// A link was made between the pending slot's occupant and this one's.
    Connected(SensorId, SensorId),
    /// The link attempt was rejected; the pending selection cleared anyway.
    Rejected,
}

// ---------------------------------------------------------------------------
// Panel
// ---------------------------------------------------------------------------

/// Placement and connection manager over a catalog and a slot grid.
#[derive(Debug)]
pub struct Panel {
    catalog: Catalog,
    grid: SlotGrid,
    /// Derived from the grid after every mutation; filters the unplaced views.
    placed: HashSet<SensorId>,
    connect_mode: bool,
    pending: Option<usize>,
    listeners: Vec<Box<dyn PanelListener>>,
}

impl Default for Panel {
    fn default() -> Self {
        Self::new()
    }
}

impl Panel {
    /// Create a panel with the default kinds and the reference slot count.
    pub fn new() -> Self {
        Self::with_catalog(Catalog::with_default_kinds(), DEFAULT_SLOT_COUNT)
    }

    /// Create a panel over an existing catalog.
    pub fn with_catalog(catalog: Catalog, slot_count: usize) -> Self {
        let mut panel = Self {
            catalog,
            grid: SlotGrid::new(slot_count),
            placed: HashSet::new(),
            connect_mode: false,
            pending: None,
            listeners: Vec::new(),
        };
        panel.refresh_placed();
        panel
    }

    /// Register a change listener. Listeners run synchronously after each
    /// mutation completes.
    pub fn subscribe(&mut self, listener: Box<dyn PanelListener>) {
        self.listeners.push(listener);
    }

    // -- Read access --

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn grid(&self) -> &SlotGrid {
        &self.grid
    }

    pub fn slot_count(&self) -> usize {
        self.grid.slot_count()
    }

    pub fn occupant(&self, slot: usize) -> Option<SensorId> {
        self.grid.occupant(slot)
    }

    pub fn slot_of(&self, id: SensorId) -> Option<usize> {
        self.grid.slot_of(id)
    }

    /// True iff no slot currently references the sensor's id.
    pub fn is_unplaced(&self, id: SensorId) -> bool {
        !self.placed.contains(&id)
    }

    pub fn link_count(&self) -> usize {
        self.grid.link_count()
    }

    pub fn link_pairs(&self) -> Vec<(SensorId, SensorId)> {
        self.grid.link_pairs()
    }

    pub fn link_exists(&self, a: SensorId, b: SensorId) -> bool {
        self.grid.link_exists(a, b)
    }

    /// Normalized id pairs of the links touching the sensor's current slot.
    pub fn links_of(&self, id: SensorId) -> Vec<(SensorId, SensorId)> {
        match self.grid.slot_of(id) {
            Some(slot) => self.grid.links_touching(slot),
            None => Vec::new(),
        }
    }

    /// Unplaced sensors, lazily, in catalog insertion order.
    pub fn unplaced(&self) -> impl Iterator<Item = &Sensor> {
        self.catalog
            .sensors()
            .iter()
            .filter(|s| self.is_unplaced(s.id))
    }

    /// Unplaced sensors grouped by kind. Groups appear in order of first
    /// occurrence in the catalog; items keep catalog order within a group.
    pub fn unplaced_groups(&self) -> Vec<(SensorKindId, Vec<&Sensor>)> {
        let mut groups: Vec<(SensorKindId, Vec<&Sensor>)> = Vec::new();
        for sensor in self.unplaced() {
            match groups.iter_mut().find(|(kind, _)| *kind == sensor.kind) {
                Some((_, members)) => members.push(sensor),
                None => groups.push((sensor.kind, vec![sensor])),
            }
        }
        groups
    }

    // -- Catalog mutations --

    /// Append a sensor to the catalog.
    pub fn add_sensor(&mut self, sensor: Sensor) -> Result<(), PanelError> {
        let id = sensor.id;
        let kind = sensor.kind;
        self.catalog.add(sensor)?;
        debug!("added sensor id={}", id.0);
        self.finish([PanelEvent::SensorAdded { id, kind }]);
        Ok(())
    }

    /// Re-insert a sensor at a specific catalog position. Used to invert a
    /// removal exactly.
    pub fn insert_sensor_at(&mut self, index: usize, sensor: Sensor) -> Result<(), PanelError> {
        let id = sensor.id;
        let kind = sensor.kind;
        self.catalog.insert_at(index, sensor)?;
        self.finish([PanelEvent::SensorAdded { id, kind }]);
        Ok(())
    }

    /// Remove a sensor from the catalog, vacating its slot (and severing its
    /// links) first if it is placed. Returns everything needed to invert.
    pub fn remove_sensor(&mut self, id: SensorId) -> Result<RemoveOutcome, PanelError> {
        if !self.catalog.contains(id) {
            return Err(CatalogError::SensorNotFound(id).into());
        }

        let mut events = Vec::new();
        let slot = self.grid.slot_of(id);
        let mut severed = Vec::new();
        if let Some(slot) = slot {
            if let Some(cleared) = self.grid.clear(slot).map_err(PanelError::from)? {
                for &(a, b) in &cleared.severed {
                    events.push(PanelEvent::LinkRemoved { a, b });
                }
                severed = cleared.severed;
                events.push(PanelEvent::SlotCleared { slot, id });
            }
        }
        let (index, sensor) = self.catalog.remove(id)?;
        events.push(PanelEvent::SensorRemoved { id });
        debug!("removed sensor id={} (slot={:?})", id.0, slot);
        self.finish(events);
        Ok(RemoveOutcome {
            index,
            sensor,
            slot,
            severed,
        })
    }

    /// Overwrite a sensor's most recent measurement.
    pub fn set_last_value(&mut self, id: SensorId, value: Option<f64>) -> Result<(), PanelError> {
        self.catalog.set_last_value(id, value)?;
        self.finish([PanelEvent::ValueUpdated { id, value }]);
        Ok(())
    }

    // -- Grid mutations --

    /// Place a cataloged sensor into a slot. See [`SlotGrid::place`] for the
    /// relocation and displacement semantics.
    pub fn place(&mut self, slot: usize, id: SensorId) -> Result<PlaceOutcome, PanelError> {
        if !self.catalog.contains(id) {
            return Err(CatalogError::SensorNotFound(id).into());
        }
        let outcome = self.grid.place(slot, id)?;

        let mut events = Vec::new();
        for &(a, b) in &outcome.severed {
            events.push(PanelEvent::LinkRemoved { a, b });
        }
        if let Some(displaced) = outcome.displaced {
            events.push(PanelEvent::SlotCleared { slot, id: displaced });
        }
        if let Some(origin) = outcome.relocated_from {
            events.push(PanelEvent::SlotCleared { slot: origin, id });
        }
        events.push(PanelEvent::SlotFilled { slot, id });
        debug!("placed sensor id={} at slot={}", id.0, slot);
        self.finish(events);
        Ok(outcome)
    }

    /// Empty a slot, severing the links that touch it. No-op if empty.
    pub fn clear_slot(&mut self, slot: usize) -> Result<Option<ClearOutcome>, PanelError> {
        let Some(outcome) = self.grid.clear(slot)? else {
            return Ok(None);
        };
        let mut events = Vec::new();
        for &(a, b) in &outcome.severed {
            events.push(PanelEvent::LinkRemoved { a, b });
        }
        events.push(PanelEvent::SlotCleared {
            slot,
            id: outcome.occupant,
        });
        debug!("cleared slot={}", slot);
        self.finish(events);
        Ok(Some(outcome))
    }

    /// Link the occupants of two slots.
    pub fn connect_slots(&mut self, a: usize, b: usize) -> Result<(SensorId, SensorId), PanelError> {
        let ida = self.grid.occupant_required(a)?;
        let idb = self.grid.occupant_required(b)?;
        self.grid.connect(a, b)?;
        debug!("connected {} <-> {}", ida.0, idb.0);
        self.finish([PanelEvent::LinkAdded { a: ida, b: idb }]);
        Ok((ida, idb))
    }

    /// Link two sensors by id. Both must currently be placed.
    pub fn connect_ids(&mut self, a: SensorId, b: SensorId) -> Result<(), PanelError> {
        self.grid.connect_ids(a, b)?;
        debug!("connected {} <-> {}", a.0, b.0);
        self.finish([PanelEvent::LinkAdded { a, b }]);
        Ok(())
    }

    /// Remove the link for the unordered id pair. Returns whether one existed.
    pub fn disconnect(&mut self, a: SensorId, b: SensorId) -> bool {
        if self.grid.disconnect(a, b) {
            debug!("disconnected {} <-> {}", a.0, b.0);
            self.finish([PanelEvent::LinkRemoved { a, b }]);
            true
        } else {
            false
        }
    }

    // -- Connect-mode selection workflow --

    pub fn is_connect_mode(&self) -> bool {
        self.connect_mode
    }

    /// Toggle or set connect mode. Turning it off clears any pending
    /// selection.
    pub fn set_connect_mode(&mut self, on: bool) {
        self.connect_mode = on;
        if !on {
            self.pending = None;
        }
    }

    pub fn pending_selection(&self) -> Option<usize> {
        self.pending
    }

    /// Interpret a slot selection while in connect mode.
    ///
    /// Selecting an occupied slot with nothing pending makes it pending.
    /// Selecting the pending slot again clears the pending selection.
    /// Selecting a second occupied slot attempts a link and clears the
    /// pending selection whether or not the link was made. Selections
    /// outside connect mode, or of empty slots, are ignored.
    pub fn select_slot(&mut self, slot: usize) -> SelectOutcome {
        if !self.connect_mode {
            return SelectOutcome::Ignored;
        }
        if self.grid.occupant(slot).is_none() {
            return SelectOutcome::Ignored;
        }
        match self.pending {
            None => {
                self.pending = Some(slot);
                SelectOutcome::Pending(slot)
            }
            Some(pending) if pending == slot => {
                self.pending = None;
                SelectOutcome::ClearedPending
            }
            Some(pending) => {
                self.pending = None;
                match self.connect_slots(pending, slot) {
                    Ok((a, b)) => SelectOutcome::Connected(a, b),
                    Err(_) => SelectOutcome::Rejected,
                }
            }
        }
    }

    // -- Internal --

    /// Re-derive the placed-id set and deliver events. Runs at the end of
    /// every mutating call.
    fn finish(&mut self, events: impl IntoIterator<Item = PanelEvent>) {
        self.refresh_placed();
        for event in events {
            for listener in &mut self.listeners {
                listener.on_event(&event);
            }
        }
    }

    fn refresh_placed(&mut self) {
        self.placed = self.grid.occupied().map(|(_, id)| id).collect();
    }
}

// ===========================================================================
// Tests
// ===========================================================================
