use serde::{Deserialize, Serialize};
use slotmap::new_key_type;

new_key_type! {
    /// Identifies a link between two occupied slots.
    pub struct LinkId;
}

/// Identifies a sensor in the catalog. Stable while the sensor is present.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct SensorId(pub u32);

/// Identifies a registered sensor kind (RTD, Thermocouple, ...).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SensorKindId(pub u32);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sensor_id_equality() {
        let a = SensorId(0);
        let b = SensorId(0);
        let c = SensorId(7);
        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn sensor_id_orders_numerically() {
        assert!(SensorId(3) < SensorId(12));
    }

    #[test]
    fn ids_are_hashable() {
        use std::collections::HashMap;
        let mut map = HashMap::new();
        map.insert(SensorKindId(0), "RTD");
        map.insert(SensorKindId(1), "Thermocouple");
        assert_eq!(map[&SensorKindId(0)], "RTD");
    }
}
