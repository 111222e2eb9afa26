//! Shared test helpers for integration tests.
//!
//! Gated behind `#[cfg(any(test, feature = "test-utils"))]` so these helpers
//! are available in unit tests and, via the `test-utils` feature, in
//! dependent crates' test suites.

use crate::catalog::{Catalog, Sensor};
use crate::id::SensorId;
use crate::panel::{DEFAULT_SLOT_COUNT, Panel};

// ===========================================================================
// Fixture constructors
// ===========================================================================

/// A sensor named after its id, of the default RTD kind.
pub fn rtd_sensor(catalog: &mut Catalog, id: u32) -> Sensor {
    let kind = catalog.register_kind("RTD");
    Sensor {
        id: SensorId(id),
        name: format!("R-{id:02}"),
        kind,
        last_value: None,
    }
}

/// A catalog with the default kinds and one RTD sensor per given id.
pub fn catalog_with(ids: &[u32]) -> Catalog {
    let mut catalog = Catalog::with_default_kinds();
    for &id in ids {
        let sensor = rtd_sensor(&mut catalog, id);
        catalog.add(sensor).expect("fixture ids must be unique");
    }
    catalog
}

/// A 12-slot panel over [`catalog_with`].
pub fn panel_with(ids: &[u32]) -> Panel {
    Panel::with_catalog(catalog_with(ids), DEFAULT_SLOT_COUNT)
}

// ===========================================================================
// State snapshot
// ===========================================================================

/// Observable panel state, in comparison-friendly form: sensors in catalog
/// order, slot occupants ascending, links as a sorted set of normalized id
/// pairs. Link storage keys are internal and excluded on purpose.
#[derive(Debug, Clone, PartialEq)]
pub struct PanelSnapshot {
    pub sensors: Vec<Sensor>,
    pub slots: Vec<Option<SensorId>>,
    pub links: Vec<(SensorId, SensorId)>,
}

impl PanelSnapshot {
    pub fn capture(panel: &Panel) -> Self {
        let slots = (0..panel.slot_count()).map(|i| panel.occupant(i)).collect();
        let mut links = panel.link_pairs();
        links.sort();
        Self {
            sensors: panel.catalog().sensors().to_vec(),
            slots,
            links,
        }
    }
}
