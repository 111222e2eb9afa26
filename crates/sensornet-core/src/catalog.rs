//! The sensor catalog: an ordered collection of sensors plus the registry
//! of sensor kinds they reference.
//!
//! The catalog preserves insertion order. Sensor ids are unique within the
//! catalog; `add` rejects duplicates so callers can validate before mutating
//! anything else. Kinds are registered once and looked up by name
//! (case-insensitive, since they arrive from console input and text files).

use crate::id::{SensorId, SensorKindId};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

/// Errors that can occur during catalog operations.
#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("sensor already exists: {0:?}")]
    DuplicateId(SensorId),
    #[error("sensor not found: {0:?}")]
    SensorNotFound(SensorId),
}

// ---------------------------------------------------------------------------
// Core data structures
// ---------------------------------------------------------------------------

/// A registered sensor kind definition.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SensorKind {
    pub name: String,
}

/// A sensor entity. The placement core treats everything but `id` as opaque.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sensor {
    pub id: SensorId,
    pub name: String,
    pub kind: SensorKindId,
    /// Most recent measurement, if any sample has arrived.
    pub last_value: Option<f64>,
}

// ---------------------------------------------------------------------------
// Catalog
// ---------------------------------------------------------------------------

/// Ordered sensor collection plus the kind registry.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    sensors: Vec<Sensor>,
    kinds: Vec<SensorKind>,
    kind_by_name: HashMap<String, SensorKindId>,
}

impl Catalog {
    /// Create an empty catalog with no kinds registered.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a catalog with the reference deployment's default kinds
    /// (RTD and Thermocouple) already registered.
    pub fn with_default_kinds() -> Self {
        let mut catalog = Self::new();
        catalog.register_kind("RTD");
        catalog.register_kind("Thermocouple");
        catalog
    }

    // -- Kinds --

    /// Register a sensor kind. Returns the existing id if the name (compared
    /// case-insensitively) is already registered.
    pub fn register_kind(&mut self, name: &str) -> SensorKindId {
        let key = name.to_lowercase();
        if let Some(&id) = self.kind_by_name.get(&key) {
            return id;
        }
        let id = SensorKindId(self.kinds.len() as u32);
        self.kinds.push(SensorKind {
            name: name.to_string(),
        });
        self.kind_by_name.insert(key, id);
        id
    }

    /// Look up a kind id by name, case-insensitive.
    pub fn kind_id(&self, name: &str) -> Option<SensorKindId> {
        self.kind_by_name.get(&name.to_lowercase()).copied()
    }

    /// Get a kind definition by id.
    pub fn kind(&self, id: SensorKindId) -> Option<&SensorKind> {
        self.kinds.get(id.0 as usize)
    }

    /// The display name of a kind, or `"?"` for an unregistered id.
    pub fn kind_name(&self, id: SensorKindId) -> &str {
        self.kind(id).map_or("?", |k| k.name.as_str())
    }

    /// All registered kinds in registration order.
    pub fn kinds(&self) -> &[SensorKind] {
        &self.kinds
    }

    // -- Sensors --

    /// Append a sensor. Rejects a duplicate id without mutating anything.
    pub fn add(&mut self, sensor: Sensor) -> Result<(), CatalogError> {
        if self.contains(sensor.id) {
            return Err(CatalogError::DuplicateId(sensor.id));
        }
        self.sensors.push(sensor);
        Ok(())
    }

    /// Insert a sensor at a specific position in the ordering. Used to undo
    /// a removal exactly; rejects a duplicate id.
    pub fn insert_at(&mut self, index: usize, sensor: Sensor) -> Result<(), CatalogError> {
        if self.contains(sensor.id) {
            return Err(CatalogError::DuplicateId(sensor.id));
        }
        let index = index.min(self.sensors.len());
        self.sensors.insert(index, sensor);
        Ok(())
    }

    /// Remove a sensor by id. Returns the removed sensor and the position it
    /// held, so the removal can be inverted exactly.
    pub fn remove(&mut self, id: SensorId) -> Result<(usize, Sensor), CatalogError> {
        let index = self
            .sensors
            .iter()
            .position(|s| s.id == id)
            .ok_or(CatalogError::SensorNotFound(id))?;
        Ok((index, self.sensors.remove(index)))
    }

    /// Whether a sensor with the given id is present.
    pub fn contains(&self, id: SensorId) -> bool {
        self.sensors.iter().any(|s| s.id == id)
    }

    /// Get a sensor by id.
    pub fn get(&self, id: SensorId) -> Option<&Sensor> {
        self.sensors.iter().find(|s| s.id == id)
    }

    /// Get a sensor by its position in the catalog ordering.
    pub fn get_at(&self, index: usize) -> Option<&Sensor> {
        self.sensors.get(index)
    }

    /// Overwrite the most recent measurement of a sensor.
    pub fn set_last_value(&mut self, id: SensorId, value: Option<f64>) -> Result<(), CatalogError> {
        let sensor = self
            .sensors
            .iter_mut()
            .find(|s| s.id == id)
            .ok_or(CatalogError::SensorNotFound(id))?;
        sensor.last_value = value;
        Ok(())
    }

    /// All sensors in insertion order.
    pub fn sensors(&self) -> &[Sensor] {
        &self.sensors
    }

    /// Number of cataloged sensors.
    pub fn len(&self) -> usize {
        self.sensors.len()
    }

    /// Whether the catalog holds no sensors.
    pub fn is_empty(&self) -> bool {
        self.sensors.is_empty()
    }
}

// ===========================================================================
// Tests
// ===========================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn sensor(id: u32, name: &str, kind: SensorKindId) -> Sensor {
        Sensor {
            id: SensorId(id),
            name: name.to_string(),
            kind,
            last_value: None,
        }
    }

    #[test]
    fn default_kinds_registered() {
        let catalog = Catalog::with_default_kinds();
        assert!(catalog.kind_id("RTD").is_some());
        assert!(catalog.kind_id("Thermocouple").is_some());
        assert!(catalog.kind_id("Pressure").is_none());
    }

    #[test]
    fn kind_lookup_is_case_insensitive() {
        let catalog = Catalog::with_default_kinds();
        assert_eq!(catalog.kind_id("rtd"), catalog.kind_id("RTD"));
        assert_eq!(catalog.kind_id("THERMOCOUPLE"), catalog.kind_id("Thermocouple"));
    }

    #[test]
    fn register_kind_is_idempotent() {
        let mut catalog = Catalog::new();
        let a = catalog.register_kind("RTD");
        let b = catalog.register_kind("rtd");
        assert_eq!(a, b);
        assert_eq!(catalog.kinds().len(), 1);
    }

    #[test]
    fn add_preserves_insertion_order() {
        let mut catalog = Catalog::with_default_kinds();
        let rtd = catalog.kind_id("RTD").unwrap();
        catalog.add(sensor(5, "R-05", rtd)).unwrap();
        catalog.add(sensor(1, "R-01", rtd)).unwrap();
        catalog.add(sensor(3, "R-03", rtd)).unwrap();

        let ids: Vec<u32> = catalog.sensors().iter().map(|s| s.id.0).collect();
        assert_eq!(ids, vec![5, 1, 3]);
    }

    #[test]
    fn add_rejects_duplicate_id() {
        let mut catalog = Catalog::with_default_kinds();
        let rtd = catalog.kind_id("RTD").unwrap();
        catalog.add(sensor(1, "R-01", rtd)).unwrap();
        let err = catalog.add(sensor(1, "R-01-bis", rtd));
        assert!(matches!(err, Err(CatalogError::DuplicateId(SensorId(1)))));
        assert_eq!(catalog.len(), 1);
    }

    #[test]
    fn remove_reports_position() {
        let mut catalog = Catalog::with_default_kinds();
        let rtd = catalog.kind_id("RTD").unwrap();
        catalog.add(sensor(1, "R-01", rtd)).unwrap();
        catalog.add(sensor(2, "R-02", rtd)).unwrap();
        catalog.add(sensor(3, "R-03", rtd)).unwrap();

        let (index, removed) = catalog.remove(SensorId(2)).unwrap();
        assert_eq!(index, 1);
        assert_eq!(removed.id, SensorId(2));
        assert!(!catalog.contains(SensorId(2)));
    }

    #[test]
    fn insert_at_restores_order() {
        let mut catalog = Catalog::with_default_kinds();
        let rtd = catalog.kind_id("RTD").unwrap();
        catalog.add(sensor(1, "R-01", rtd)).unwrap();
        catalog.add(sensor(2, "R-02", rtd)).unwrap();
        catalog.add(sensor(3, "R-03", rtd)).unwrap();

        let (index, removed) = catalog.remove(SensorId(2)).unwrap();
        catalog.insert_at(index, removed).unwrap();

        let ids: Vec<u32> = catalog.sensors().iter().map(|s| s.id.0).collect();
        assert_eq!(ids, vec![1, 2, 3]);
    }

    #[test]
    fn set_last_value_roundtrips() {
        let mut catalog = Catalog::with_default_kinds();
        let rtd = catalog.kind_id("RTD").unwrap();
        catalog.add(sensor(1, "R-01", rtd)).unwrap();

        catalog.set_last_value(SensorId(1), Some(291.5)).unwrap();
        assert_eq!(catalog.get(SensorId(1)).unwrap().last_value, Some(291.5));

        let err = catalog.set_last_value(SensorId(9), Some(1.0));
        assert!(matches!(err, Err(CatalogError::SensorNotFound(_))));
    }
}
