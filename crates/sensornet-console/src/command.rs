//! Parsed console commands.
//!
//! Each verb gets its own argument struct, validated here before any
//! handler runs, so precondition checks stay out of the mutation code. The
//! parse only covers syntax: ids that do not exist, duplicate links, and
//! the like are the handlers' responsibility, checked against live state.

use crate::token::Tokens;
use crate::{ConsoleError, View};

/// A parsed console command.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Help,
    /// Empty the output log.
    ClearOutput,
    Exit,
    Nav {
        view: View,
    },
    ListEntities,
    ListSlots,
    Add {
        id: u32,
        name: String,
        kind: String,
    },
    Delete {
        id: u32,
    },
    Place {
        id: u32,
        slot: usize,
    },
    ClearSlot {
        slot: usize,
    },
    Connect {
        a: u32,
        b: u32,
    },
    Disconnect {
        a: u32,
        b: u32,
    },
    Undo,
    Redo,
}

/// Parse one non-blank input line into a command.
pub fn parse(line: &str) -> Result<Command, ConsoleError> {
    let Some(tokens) = Tokens::parse(line) else {
        return Err(usage("Unknown command. Type 'help'."));
    };

    match tokens.verb().as_str() {
        "help" => Ok(Command::Help),
        "clear" => Ok(Command::ClearOutput),
        "exit" => Ok(Command::Exit),
        "nav" => parse_nav(&tokens),
        "list" => parse_list(&tokens),
        "add" => parse_add(&tokens),
        "delete" => parse_delete(&tokens),
        "place" => parse_place(&tokens),
        "clear-slot" => parse_clear_slot(&tokens),
        "connect" => {
            let (a, b) = parse_pair(&tokens, "connect")?;
            Ok(Command::Connect { a, b })
        }
        "disconnect" => {
            let (a, b) = parse_pair(&tokens, "disconnect")?;
            Ok(Command::Disconnect { a, b })
        }
        "undo" => Ok(Command::Undo),
        "redo" => Ok(Command::Redo),
        _ => Err(usage("Unknown command. Type 'help'.")),
    }
}

fn usage(text: &str) -> ConsoleError {
    ConsoleError::Usage(text.to_string())
}

fn parse_nav(tokens: &Tokens) -> Result<Command, ConsoleError> {
    let view = match tokens.positional(0).map(str::to_lowercase).as_deref() {
        Some("entities") => View::Entities,
        Some("display") => View::Display,
        Some("graph") => View::Graph,
        _ => return Err(usage("Usage: nav entities|display|graph")),
    };
    Ok(Command::Nav { view })
}

fn parse_list(tokens: &Tokens) -> Result<Command, ConsoleError> {
    match tokens.positional(0).map(str::to_lowercase).as_deref() {
        Some("entities") => Ok(Command::ListEntities),
        Some("slots") => Ok(Command::ListSlots),
        _ => Err(usage("Usage: list entities | list slots")),
    }
}

fn parse_add(tokens: &Tokens) -> Result<Command, ConsoleError> {
    if !positional_is(tokens, 0, "entity") {
        return Err(usage(
            "Usage: add entity id=<int> name=\"<text>\" type=RTD|Thermocouple",
        ));
    }
    let id = tokens
        .get_u32("id")
        .ok_or_else(|| usage("Missing: id=<int>"))?;
    let name = match tokens.get("name") {
        Some(name) if !name.trim().is_empty() => name.to_string(),
        _ => return Err(usage("Missing: name=\"<text>\"")),
    };
    let kind = tokens
        .get("type")
        .ok_or_else(|| usage("Missing: type=RTD|Thermocouple"))?
        .to_string();
    Ok(Command::Add { id, name, kind })
}

fn parse_delete(tokens: &Tokens) -> Result<Command, ConsoleError> {
    if !positional_is(tokens, 0, "entity") {
        return Err(usage("Usage: delete entity id=<int>"));
    }
    let id = tokens
        .get_u32("id")
        .ok_or_else(|| usage("Missing: id=<int>"))?;
    Ok(Command::Delete { id })
}

fn parse_place(tokens: &Tokens) -> Result<Command, ConsoleError> {
    let id = tokens
        .get_u32("id")
        .ok_or_else(|| usage("Missing: id=<int>"))?;
    let slot = tokens
        .get_u32("slot")
        .ok_or_else(|| usage("Missing: slot=<0-11>"))?;
    Ok(Command::Place {
        id,
        slot: slot as usize,
    })
}

fn parse_clear_slot(tokens: &Tokens) -> Result<Command, ConsoleError> {
    let slot = tokens
        .get_u32("slot")
        .ok_or_else(|| usage("Missing: slot=<0-11>"))?;
    Ok(Command::ClearSlot {
        slot: slot as usize,
    })
}

fn parse_pair(tokens: &Tokens, verb: &str) -> Result<(u32, u32), ConsoleError> {
    match (tokens.get_u32("a"), tokens.get_u32("b")) {
        (Some(a), Some(b)) => Ok((a, b)),
        _ => Err(usage(&format!("Usage: {verb} a=<id> b=<id>"))),
    }
}

fn positional_is(tokens: &Tokens, index: usize, expected: &str) -> bool {
    tokens
        .positional(index)
        .is_some_and(|p| p.eq_ignore_ascii_case(expected))
}

// ===========================================================================
// Tests
// ===========================================================================
