//! The slot grid and its link set.
//!
//! A fixed number of addressable slots each hold at most one sensor; links
//! are non-directional connections between two occupied slots. Two
//! invariants are enforced here:
//!
//! 1. At most one slot references a given sensor id at any time.
//! 2. A link's identity is the unordered pair of its endpoints' occupant
//!    ids. No two links may resolve to the same pair, and a link is removed
//!    within the same operation that empties or replaces either endpoint.
//!
//! Placing a sensor that is already on the grid relocates it: the origin
//! slot is vacated and every link touching it is rewritten to the new slot,
//! so a pure relocation never loses a link. Placing onto an occupied slot
//! displaces the occupant: its links are severed and it leaves the grid.
//! The destination is displaced before the origin is relocated, so a
//! relocation onto an occupied slot keeps the mover's own links.

use crate::id::{LinkId, SensorId};
use serde::{Deserialize, Serialize};
use slotmap::SlotMap;

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

/// Errors that can occur during grid operations.
#[derive(Debug, thiserror::Error)]
pub enum GridError {
    #[error("slot out of range: {0}")]
    SlotOutOfRange(usize),
    #[error("slot {0} is empty")]
    EmptySlot(usize),
    #[error("cannot link a slot to itself")]
    SameSlot,
    #[error("link already exists")]
    DuplicateLink,
    #[error("sensor not placed: {0:?}")]
    NotPlaced(SensorId),
}

// ---------------------------------------------------------------------------
// Core data structures
// ---------------------------------------------------------------------------

/// A link between two occupied slots, stored by slot index. The logical
/// identity is the unordered pair of occupant ids, not the indices.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Link {
    pub a: usize,
    pub b: usize,
}

/// What a `place` call did beyond the placement itself.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PlaceOutcome {
    /// Slot the sensor was relocated from, if it was already on the grid.
    pub relocated_from: Option<usize>,
    /// Occupant pushed off the target slot, if any.
    pub displaced: Option<SensorId>,
    /// Id pairs of the links severed by displacing the target's occupant.
    pub severed: Vec<(SensorId, SensorId)>,
}

/// What a `clear` call removed.
#[derive(Debug, Clone, PartialEq)]
pub struct ClearOutcome {
    /// The occupant that was removed.
    pub occupant: SensorId,
    /// Id pairs of the links severed by the clear.
    pub severed: Vec<(SensorId, SensorId)>,
}

/// Normalize an id pair so (a, b) and (b, a) compare equal.
pub fn normalized(a: SensorId, b: SensorId) -> (SensorId, SensorId) {
    if a <= b { (a, b) } else { (b, a) }
}

// ---------------------------------------------------------------------------
// SlotGrid
// ---------------------------------------------------------------------------

/// Fixed-size slot grid plus the link set between occupied slots.
#[derive(Debug, Clone)]
pub struct SlotGrid {
    slots: Vec<Option<SensorId>>,
    links: SlotMap<LinkId, Link>,
}

impl SlotGrid {
    /// Create a grid with `slot_count` empty slots.
    pub fn new(slot_count: usize) -> Self {
        Self {
            slots: vec![None; slot_count],
            links: SlotMap::with_key(),
        }
    }

    /// Number of slots. Fixed at construction.
    pub fn slot_count(&self) -> usize {
        self.slots.len()
    }

    fn check_slot(&self, slot: usize) -> Result<(), GridError> {
        if slot < self.slots.len() {
            Ok(())
        } else {
            Err(GridError::SlotOutOfRange(slot))
        }
    }

    /// Occupant of a slot, or `None` if the slot is empty or out of range.
    pub fn occupant(&self, slot: usize) -> Option<SensorId> {
        self.slots.get(slot).copied().flatten()
    }

    /// Occupant of a slot, distinguishing an out-of-range index from an
    /// empty slot.
    pub fn occupant_required(&self, slot: usize) -> Result<SensorId, GridError> {
        self.check_slot(slot)?;
        self.slots[slot].ok_or(GridError::EmptySlot(slot))
    }

    /// The slot currently holding the given sensor, if any.
    pub fn slot_of(&self, id: SensorId) -> Option<usize> {
        self.slots.iter().position(|&occ| occ == Some(id))
    }

    /// True iff no slot references the sensor's id.
    pub fn is_unplaced(&self, id: SensorId) -> bool {
        self.slot_of(id).is_none()
    }

    /// Iterate `(slot, occupant)` over the occupied slots, ascending.
    pub fn occupied(&self) -> impl Iterator<Item = (usize, SensorId)> + '_ {
        self.slots
            .iter()
            .enumerate()
            .filter_map(|(i, occ)| occ.map(|id| (i, id)))
    }

    // -- Placement --

    /// Place a sensor into a slot, maintaining both invariants.
    ///
    /// Relocation: if the sensor already occupies a different slot, that
    /// slot is vacated and links touching it are rewritten to the target.
    /// Displacement: if the target holds a different sensor, its links are
    /// severed and it leaves the grid. Re-placing a sensor into its current
    /// slot is a no-op.
    pub fn place(&mut self, slot: usize, id: SensorId) -> Result<PlaceOutcome, GridError> {
        self.check_slot(slot)?;

        let mut outcome = PlaceOutcome::default();
        if self.slots[slot] == Some(id) {
            return Ok(outcome);
        }

        // Displace the destination first. Severed pairs are resolved while
        // both endpoints are still occupied.
        if let Some(existing) = self.slots[slot] {
            outcome.severed = self.remove_links_touching(slot);
            outcome.displaced = Some(existing);
            self.slots[slot] = None;
        }

        // Then relocate the origin, rewriting links to follow the sensor.
        if let Some(origin) = self.slot_of(id) {
            for link in self.links.values_mut() {
                if link.a == origin {
                    link.a = slot;
                }
                if link.b == origin {
                    link.b = slot;
                }
            }
            self.slots[origin] = None;
            outcome.relocated_from = Some(origin);
        }

        self.slots[slot] = Some(id);
        Ok(outcome)
    }

    /// Sever all links touching a slot, then empty it. Returns `None` if the
    /// slot was already empty.
    pub fn clear(&mut self, slot: usize) -> Result<Option<ClearOutcome>, GridError> {
        self.check_slot(slot)?;

        let Some(occupant) = self.slots[slot] else {
            return Ok(None);
        };
        let severed = self.remove_links_touching(slot);
        self.slots[slot] = None;
        Ok(Some(ClearOutcome { occupant, severed }))
    }

    // -- Links --

    /// Link two occupied slots. Rejected if either slot is empty, the slots
    /// are the same, or a link for the unordered occupant-id pair exists.
    pub fn connect(&mut self, a: usize, b: usize) -> Result<LinkId, GridError> {
        let ida = self.occupant_required(a)?;
        let idb = self.occupant_required(b)?;
        if a == b {
            return Err(GridError::SameSlot);
        }
        if self.link_exists(ida, idb) {
            return Err(GridError::DuplicateLink);
        }
        Ok(self.links.insert(Link { a, b }))
    }

    /// Link two sensors by id. Both must currently be placed.
    pub fn connect_ids(&mut self, a: SensorId, b: SensorId) -> Result<LinkId, GridError> {
        let sa = self.slot_of(a).ok_or(GridError::NotPlaced(a))?;
        let sb = self.slot_of(b).ok_or(GridError::NotPlaced(b))?;
        self.connect(sa, sb)
    }

    /// Remove the link whose endpoints resolve to the unordered id pair.
    /// Returns whether one was found.
    pub fn disconnect(&mut self, a: SensorId, b: SensorId) -> bool {
        let wanted = normalized(a, b);
        let found = self
            .links
            .iter()
            .find(|(_, link)| self.link_pair(link) == Some(wanted))
            .map(|(id, _)| id);
        match found {
            Some(id) => {
                self.links.remove(id);
                true
            }
            None => false,
        }
    }

    /// Whether a link for the unordered id pair exists.
    pub fn link_exists(&self, a: SensorId, b: SensorId) -> bool {
        let wanted = normalized(a, b);
        self.links
            .values()
            .any(|link| self.link_pair(link) == Some(wanted))
    }

    /// Number of links.
    pub fn link_count(&self) -> usize {
        self.links.len()
    }

    /// Resolve every link to its normalized occupant-id pair.
    pub fn link_pairs(&self) -> Vec<(SensorId, SensorId)> {
        self.links
            .values()
            .filter_map(|link| self.link_pair(link))
            .collect()
    }

    /// Normalized id pairs of the links touching a slot.
    pub fn links_touching(&self, slot: usize) -> Vec<(SensorId, SensorId)> {
        self.links
            .values()
            .filter(|link| link.a == slot || link.b == slot)
            .filter_map(|link| self.link_pair(link))
            .collect()
    }

    /// Iterate the raw links.
    pub fn links(&self) -> impl Iterator<Item = (LinkId, &Link)> {
        self.links.iter()
    }

    fn link_pair(&self, link: &Link) -> Option<(SensorId, SensorId)> {
        let a = self.occupant(link.a)?;
        let b = self.occupant(link.b)?;
        Some(normalized(a, b))
    }

    fn remove_links_touching(&mut self, slot: usize) -> Vec<(SensorId, SensorId)> {
        let doomed: Vec<LinkId> = self
            .links
            .iter()
            .filter(|(_, link)| link.a == slot || link.b == slot)
            .map(|(id, _)| id)
            .collect();
        let mut severed = Vec::with_capacity(doomed.len());
        for id in doomed {
            if let Some(link) = self.links.get(id).copied() {
                if let Some(pair) = self.link_pair(&link) {
                    severed.push(pair);
                }
                self.links.remove(id);
            }
        }
        severed
    }
}

// ===========================================================================
// Tests
// ===========================================================================
