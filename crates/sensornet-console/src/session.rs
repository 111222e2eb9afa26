//! The console session: dispatch, output log, input history, undo/redo.
//!
//! One [`Console::submit`] call processes one line to completion: echo,
//! tokenize, parse, validate, mutate, report. Mutating verbs validate every
//! precondition against live panel state, capture the data their inverse
//! needs, and only then apply, so a rejected command leaves all state
//! (including the undo stack) untouched. Applying a new action discards any
//! pending redo entries.

use crate::action::ConsoleAction;
use crate::command::{self, Command};
use crate::{ConsoleError, NullShell, ShellHooks};
use log::debug;
use sensornet_core::catalog::Sensor;
use sensornet_core::id::SensorId;
use sensornet_core::panel::Panel;

const HELP_LINES: &[&str] = &[
    "Commands:",
    "  help",
    "  nav entities|display|graph",
    "  list entities | list slots",
    "  add entity id=<int> name=\"<text>\" type=RTD|Thermocouple",
    "  delete entity id=<int>",
    "  place id=<int> slot=<0-11>",
    "  clear-slot slot=<0-11>",
    "  connect a=<id> b=<id>",
    "  disconnect a=<id> b=<id>",
    "  undo | redo",
    "  clear",
    "  exit",
];

// ---------------------------------------------------------------------------
// Console
// ---------------------------------------------------------------------------

/// A console session over one panel.
#[derive(Debug)]
pub struct Console {
    output: Vec<String>,
    history: Vec<String>,
    /// History recall position; `None` when not recalling.
    cursor: Option<usize>,
    undo: Vec<ConsoleAction>,
    redo: Vec<ConsoleAction>,
    hooks: Box<dyn ShellHooks>,
}

impl Default for Console {
    fn default() -> Self {
        Self::new()
    }
}

impl Console {
    /// A headless console with no shell attached.
    pub fn new() -> Self {
        Self::with_hooks(Box::new(NullShell))
    }

    /// A console wired to a hosting shell.
    pub fn with_hooks(hooks: Box<dyn ShellHooks>) -> Self {
        let mut console = Self {
            output: Vec::new(),
            history: Vec::new(),
            cursor: None,
            undo: Vec::new(),
            redo: Vec::new(),
            hooks,
        };
        console
            .output
            .push("sensornet terminal. Type 'help' for commands.".to_string());
        console
    }

    // -- Read access --

    /// Everything printed so far, oldest first.
    pub fn output(&self) -> &[String] {
        &self.output
    }

    /// Submitted lines, oldest first.
    pub fn history(&self) -> &[String] {
        &self.history
    }

    pub fn undo_depth(&self) -> usize {
        self.undo.len()
    }

    pub fn redo_depth(&self) -> usize {
        self.redo.len()
    }

    // -- History recall --

    /// Step backwards through the input history (the up-arrow gesture).
    /// Sticks at the oldest entry.
    pub fn recall_previous(&mut self) -> Option<&str> {
        if self.history.is_empty() {
            return None;
        }
        let index = match self.cursor {
            None => self.history.len() - 1,
            Some(0) => 0,
            Some(i) => i - 1,
        };
        self.cursor = Some(index);
        Some(&self.history[index])
    }

    /// Step forwards again (the down-arrow gesture). Walking past the
    /// newest entry leaves recall mode.
    pub fn recall_next(&mut self) -> Option<&str> {
        let index = self.cursor?;
        if index + 1 >= self.history.len() {
            self.cursor = None;
            None
        } else {
            self.cursor = Some(index + 1);
            Some(&self.history[index + 1])
        }
    }

    // -- Submission --

    /// Process one input line to completion. Blank input is ignored.
    pub fn submit(&mut self, panel: &mut Panel, line: &str) {
        let line = line.trim();
        if line.is_empty() {
            return;
        }
        self.output.push(format!("$ {line}"));
        self.history.push(line.to_string());
        self.cursor = None;

        let result = command::parse(line).and_then(|cmd| self.execute(panel, cmd));
        if let Err(err) = result {
            self.output.push(err.to_string());
        }
    }

    fn execute(&mut self, panel: &mut Panel, cmd: Command) -> Result<(), ConsoleError> {
        match cmd {
            Command::Help => {
                for line in HELP_LINES {
                    self.output.push((*line).to_string());
                }
            }

            Command::ClearOutput => self.output.clear(),

            Command::Exit => self.hooks.close_console(),

            Command::Nav { view } => {
                self.hooks.navigate(view);
                self.output
                    .push(format!("OK: navigated to {}.", view.title()));
            }

            Command::ListEntities => self.list_entities(panel),

            Command::ListSlots => self.list_slots(panel),

            Command::Add { id, name, kind } => {
                let id = SensorId(id);
                if panel.catalog().contains(id) {
                    return Err(ConsoleError::Conflict(format!(
                        "Entity with id={} already exists.",
                        id.0
                    )));
                }
                let Some(kind) = panel.catalog().kind_id(&kind) else {
                    return Err(ConsoleError::NotFound(
                        "Unknown type. Use RTD or Thermocouple.".to_string(),
                    ));
                };
                let sensor = Sensor {
                    id,
                    name,
                    kind,
                    last_value: None,
                };
                self.apply_new(panel, ConsoleAction::AddEntity { sensor })?;
                self.output.push(format!("OK: entity id={} added.", id.0));
            }

            Command::Delete { id } => {
                let id = SensorId(id);
                let Some(index) = panel.catalog().sensors().iter().position(|s| s.id == id)
                else {
                    return Err(not_found_entity(id));
                };
                let action = ConsoleAction::DeleteEntity {
                    index,
                    sensor: panel.catalog().sensors()[index].clone(),
                    slot: panel.slot_of(id),
                    severed: panel.links_of(id),
                };
                self.apply_new(panel, action)?;
                self.output.push(format!("OK: entity id={} deleted.", id.0));
            }

            Command::Place { id, slot } => {
                let id = SensorId(id);
                if slot >= panel.slot_count() {
                    return Err(ConsoleError::NotFound("Slot out of range.".to_string()));
                }
                if !panel.catalog().contains(id) {
                    return Err(not_found_entity(id));
                }
                let displaced = panel.occupant(slot).filter(|&occ| occ != id);
                let action = ConsoleAction::Place {
                    id,
                    target: slot,
                    origin: panel.slot_of(id),
                    displaced,
                    severed: if displaced.is_some() {
                        panel.grid().links_touching(slot)
                    } else {
                        Vec::new()
                    },
                    carried: panel.links_of(id),
                };
                self.apply_new(panel, action)?;
                self.output
                    .push(format!("OK: placed id={} at slot={slot}.", id.0));
            }

            Command::ClearSlot { slot } => {
                if slot >= panel.slot_count() {
                    return Err(ConsoleError::NotFound("Slot out of range.".to_string()));
                }
                let action = ConsoleAction::ClearSlot {
                    slot,
                    occupant: panel.occupant(slot),
                    severed: panel.grid().links_touching(slot),
                };
                self.apply_new(panel, action)?;
                self.output.push(format!("OK: cleared slot={slot}."));
            }

            Command::Connect { a, b } => {
                let (a, b) = (SensorId(a), SensorId(b));
                if a == b {
                    return Err(ConsoleError::Conflict(
                        "Cannot connect an entity to itself.".to_string(),
                    ));
                }
                if panel.slot_of(a).is_none() || panel.slot_of(b).is_none() {
                    return Err(ConsoleError::Conflict(
                        "Both entities must be placed on the grid.".to_string(),
                    ));
                }
                if panel.link_exists(a, b) {
                    return Err(ConsoleError::Conflict(
                        "Connection already exists.".to_string(),
                    ));
                }
                self.apply_new(panel, ConsoleAction::Connect { a, b })?;
                self.output
                    .push(format!("OK: connected {} <-> {}.", a.0, b.0));
            }

            Command::Disconnect { a, b } => {
                let (a, b) = (SensorId(a), SensorId(b));
                if !panel.link_exists(a, b) {
                    return Err(ConsoleError::NotFound("Connection not found.".to_string()));
                }
                self.apply_new(panel, ConsoleAction::Disconnect { a, b })?;
                self.output
                    .push(format!("OK: disconnected {} <-> {}.", a.0, b.0));
            }

            Command::Undo => match self.undo.pop() {
                None => self.output.push("Nothing to undo.".to_string()),
                Some(action) => match action.invert(panel) {
                    Ok(()) => {
                        self.output.push(format!("Undone: {}", action.description()));
                        self.redo.push(action);
                    }
                    Err(err) => {
                        // Keep the stack intact; the failure is a defect.
                        self.undo.push(action);
                        return Err(err);
                    }
                },
            },

            Command::Redo => match self.redo.pop() {
                None => self.output.push("Nothing to redo.".to_string()),
                Some(action) => match action.apply(panel) {
                    Ok(()) => {
                        self.output.push(format!("Redone: {}", action.description()));
                        self.undo.push(action);
                    }
                    Err(err) => {
                        self.redo.push(action);
                        return Err(err);
                    }
                },
            },
        }
        Ok(())
    }

    /// Apply a freshly validated action: forward effect, undo push, redo
    /// truncation.
    fn apply_new(&mut self, panel: &mut Panel, action: ConsoleAction) -> Result<(), ConsoleError> {
        action.apply(panel)?;
        debug!("applied: {}", action.description());
        self.undo.push(action);
        self.redo.clear();
        Ok(())
    }

    fn list_entities(&mut self, panel: &Panel) {
        let mut sensors: Vec<&Sensor> = panel.catalog().sensors().iter().collect();
        sensors.sort_by_key(|s| s.id);
        for sensor in &sensors {
            let last = sensor
                .last_value
                .map(|v| format!("{v:.2}"))
                .unwrap_or_else(|| "-".to_string());
            self.output.push(format!(
                "  id={}  name={}  type={}  last={}",
                sensor.id.0,
                sensor.name,
                panel.catalog().kind_name(sensor.kind),
                last
            ));
        }
        if sensors.is_empty() {
            self.output.push("  (no entities)".to_string());
        }
    }

    fn list_slots(&mut self, panel: &Panel) {
        for slot in 0..panel.slot_count() {
            match panel.occupant(slot) {
                Some(id) => {
                    let name = panel
                        .catalog()
                        .get(id)
                        .map_or("?", |s| s.name.as_str());
                    self.output
                        .push(format!("  slot={slot}  id={} ({name})", id.0));
                }
                None => self.output.push(format!("  slot={slot}  empty")),
            }
        }
    }
}

fn not_found_entity(id: SensorId) -> ConsoleError {
    ConsoleError::NotFound(format!("Entity id={} not found.", id.0))
}

// ===========================================================================
// Tests
// ===========================================================================
