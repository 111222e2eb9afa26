//! Property-based tests for the slot grid invariants.
//!
//! Generates random operation sequences against a small panel and verifies
//! the structural invariants hold after every step.

use proptest::prelude::*;
use proptest::test_runner::TestCaseError;
use sensornet_core::id::SensorId;
use sensornet_core::panel::Panel;
use sensornet_core::test_utils::*;

const IDS: [u32; 6] = [1, 2, 3, 4, 5, 6];

/// Operations over the fixture panel. Indices are into `IDS`; slots may be
/// out of range on purpose so rejection paths get exercised too.
#[derive(Debug, Clone)]
enum Op {
    Place { slot: usize, sensor: usize },
    Clear { slot: usize },
    Connect { a: usize, b: usize },
    Disconnect { a: usize, b: usize },
}

fn arb_op() -> impl Strategy<Value = Op> {
    prop_oneof![
        (0..14usize, 0..IDS.len()).prop_map(|(slot, sensor)| Op::Place { slot, sensor }),
        (0..14usize).prop_map(|slot| Op::Clear { slot }),
        (0..IDS.len(), 0..IDS.len()).prop_map(|(a, b)| Op::Connect { a, b }),
        (0..IDS.len(), 0..IDS.len()).prop_map(|(a, b)| Op::Disconnect { a, b }),
    ]
}

fn check_invariants(panel: &Panel) -> Result<(), TestCaseError> {
    let mut seen = std::collections::HashSet::new();
    for slot in 0..panel.slot_count() {
        if let Some(id) = panel.occupant(slot) {
            prop_assert!(seen.insert(id), "sensor {:?} in more than one slot", id);
        }
    }
    let mut pairs = std::collections::HashSet::new();
    for (_, link) in panel.grid().links() {
        let a = panel.occupant(link.a);
        let b = panel.occupant(link.b);
        prop_assert!(a.is_some() && b.is_some(), "dangling link endpoint");
        let (a, b) = (a.unwrap(), b.unwrap());
        let pair = if a <= b { (a, b) } else { (b, a) };
        prop_assert!(pairs.insert(pair), "duplicate link for {:?}", pair);
    }
    // The placed-id view agrees with the grid.
    for &id in &IDS {
        let id = SensorId(id);
        prop_assert_eq!(panel.is_unplaced(id), panel.slot_of(id).is_none());
    }
    Ok(())
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    #[test]
    fn invariants_hold_under_random_ops(ops in proptest::collection::vec(arb_op(), 1..60)) {
        let mut panel = panel_with(&IDS);

        for op in ops {
            match op {
                Op::Place { slot, sensor } => {
                    let _ = panel.place(slot, SensorId(IDS[sensor]));
                }
                Op::Clear { slot } => {
                    let _ = panel.clear_slot(slot);
                }
                Op::Connect { a, b } => {
                    let _ = panel.connect_ids(SensorId(IDS[a]), SensorId(IDS[b]));
                }
                Op::Disconnect { a, b } => {
                    let _ = panel.disconnect(SensorId(IDS[a]), SensorId(IDS[b]));
                }
            }
            check_invariants(&panel)?;
        }
    }

    #[test]
    fn relocation_never_changes_link_count(
        origin in 0..12usize,
        target in 0..12usize,
    ) {
        let mut panel = panel_with(&[1, 2]);
        // Keep the partner clear of both slots under test.
        let partner = (0..12).find(|s| *s != origin && *s != target).unwrap();

        panel.place(origin, SensorId(1)).unwrap();
        panel.place(partner, SensorId(2)).unwrap();
        panel.connect_ids(SensorId(1), SensorId(2)).unwrap();

        if target != partner {
            panel.place(target, SensorId(1)).unwrap();
            prop_assert_eq!(panel.link_count(), 1);
            prop_assert!(panel.link_exists(SensorId(1), SensorId(2)));
        }
    }
}
