//! Command console for the sensornet panel.
//!
//! Accepts one line of text at a time, tokenizes it into a verb with
//! key/value and positional arguments, dispatches to a handler, and wraps
//! every state-mutating command in a reversible action feeding a linear
//! undo/redo pair of stacks. Execution is synchronous: a submitted line
//! runs to completion before the next one is accepted.
//!
//! # Key Types
//!
//! - [`session::Console`] -- the session: output log, input history,
//!   undo/redo stacks, dispatch.
//! - [`command::Command`] -- the parsed, verb-specific argument structs.
//! - [`action::ConsoleAction`] -- a forward effect paired with its exact
//!   inverse, plus a human-readable description.
//! - [`ShellHooks`] -- capability trait through which `nav` and `exit`
//!   reach the hosting shell.

pub mod action;
pub mod command;
pub mod session;
pub mod token;

// ---------------------------------------------------------------------------
// Error taxonomy
// ---------------------------------------------------------------------------

/// A failed console command. All variants are recovered at the console
/// boundary and rendered as a single output line; none terminate the
/// session.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ConsoleError {
    /// Malformed or missing arguments; the message echoes correct usage.
    #[error("{0}")]
    Usage(String),
    /// A referenced id or slot does not exist.
    #[error("{0}")]
    NotFound(String),
    /// Duplicate id, duplicate link, or a slot not occupied as required.
    #[error("{0}")]
    Conflict(String),
    /// A defect, not a user error: an undo/redo replay that cannot apply
    /// cleanly. Rendered with an `ERR:` prefix.
    #[error("ERR: {0}")]
    Invariant(String),
}

// ---------------------------------------------------------------------------
// Shell capability
// ---------------------------------------------------------------------------

/// The views the hosting shell can switch between.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum View {
    Entities,
    Display,
    Graph,
}

impl View {
    /// Display name used in console confirmations.
    pub fn title(self) -> &'static str {
        match self {
            View::Entities => "Entities",
            View::Display => "Display",
            View::Graph => "Graph",
        }
    }
}

/// Callbacks into the hosting shell. Both default to no-ops so a headless
/// console (tests, scripting) needs no shell at all.
pub trait ShellHooks: std::fmt::Debug {
    /// Switch the active view.
    fn navigate(&mut self, view: View) {
        let _ = view;
    }

    /// The user asked the console window to close.
    fn close_console(&mut self) {}
}

/// The do-nothing shell used by [`session::Console::new`].
#[derive(Debug, Default)]
pub struct NullShell;

impl ShellHooks for NullShell {}
