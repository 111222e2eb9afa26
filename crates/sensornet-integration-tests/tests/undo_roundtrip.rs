//! Property-based round-trip law: any script of mutating commands can be
//! fully unwound with `undo` back to the starting state, and replayed with
//! `redo` back to the final state.

use proptest::prelude::*;
use sensornet_console::session::Console;
use sensornet_core::panel::Panel;
use sensornet_core::test_utils::{PanelSnapshot, panel_with};

/// Generated console lines. Ids and slots stay small so scripts collide
/// often: duplicates, displacements, and rejections all get exercised.
#[derive(Debug, Clone)]
enum Line {
    Add(u32),
    Delete(u32),
    Place(u32, usize),
    ClearSlot(usize),
    Connect(u32, u32),
    Disconnect(u32, u32),
}

impl Line {
    fn render(&self) -> String {
        match self {
            Line::Add(id) => format!("add entity id={id} name=\"R-{id:02}\" type=RTD"),
            Line::Delete(id) => format!("delete entity id={id}"),
            Line::Place(id, slot) => format!("place id={id} slot={slot}"),
            Line::ClearSlot(slot) => format!("clear-slot slot={slot}"),
            Line::Connect(a, b) => format!("connect a={a} b={b}"),
            Line::Disconnect(a, b) => format!("disconnect a={a} b={b}"),
        }
    }
}

fn arb_line() -> impl Strategy<Value = Line> {
    let id = 1..5u32;
    let slot = 0..6usize;
    prop_oneof![
        id.clone().prop_map(Line::Add),
        id.clone().prop_map(Line::Delete),
        (id.clone(), slot.clone()).prop_map(|(i, s)| Line::Place(i, s)),
        slot.prop_map(Line::ClearSlot),
        (id.clone(), id.clone()).prop_map(|(a, b)| Line::Connect(a, b)),
        (id.clone(), id).prop_map(|(a, b)| Line::Disconnect(a, b)),
    ]
}

fn fresh() -> (Panel, Console) {
    (panel_with(&[]), Console::new())
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(150))]

    #[test]
    fn undo_all_restores_the_initial_state(script in proptest::collection::vec(arb_line(), 1..40)) {
        let (mut panel, mut console) = fresh();
        let initial = PanelSnapshot::capture(&panel);

        for line in &script {
            console.submit(&mut panel, &line.render());
        }
        let final_state = PanelSnapshot::capture(&panel);
        let depth = console.undo_depth();

        for _ in 0..depth {
            console.submit(&mut panel, "undo");
        }
        prop_assert_eq!(console.undo_depth(), 0);
        prop_assert_eq!(PanelSnapshot::capture(&panel), initial);

        for _ in 0..depth {
            console.submit(&mut panel, "redo");
        }
        prop_assert_eq!(PanelSnapshot::capture(&panel), final_state);

        // No replay may ever fail; a failure would have printed an ERR line.
        prop_assert!(!console.output().iter().any(|l| l.starts_with("ERR:")),
            "invariant violation in transcript: {:?}", console.output());
    }

    #[test]
    fn interleaved_undo_keeps_state_consistent(
        script in proptest::collection::vec(arb_line(), 1..25),
        undo_every in 2..5usize,
    ) {
        let (mut panel, mut console) = fresh();

        for (i, line) in script.iter().enumerate() {
            console.submit(&mut panel, &line.render());
            if i % undo_every == undo_every - 1 {
                console.submit(&mut panel, "undo");
            }

            // Structural invariants hold at every step.
            let mut seen = std::collections::HashSet::new();
            for slot in 0..panel.slot_count() {
                if let Some(id) = panel.occupant(slot) {
                    prop_assert!(seen.insert(id));
                    prop_assert!(panel.catalog().contains(id),
                        "slot {} holds uncataloged sensor {:?}", slot, id);
                }
            }
            for (_, link) in panel.grid().links() {
                prop_assert!(panel.occupant(link.a).is_some());
                prop_assert!(panel.occupant(link.b).is_some());
            }
            prop_assert!(!console.output().iter().any(|l| l.starts_with("ERR:")));
        }
    }
}
