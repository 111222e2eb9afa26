//! Line protocol spoken by the measurement simulator.
//!
//! The transport (a TCP accept loop in the hosting application) stays
//! outside the core; this module is the codec and the state update. Two
//! request forms exist:
//!
//! ```text
//! count                   -> reply with the number of cataloged sensors
//! sensor_<index>:<value>  -> sample for the sensor at catalog position <index>
//! ```
//!
//! Samples address sensors by catalog position, not id: the simulator only
//! knows how many sensors exist. Applying a sample updates the sensor's
//! `last_value` through the panel, so listeners observe it like any other
//! mutation.

use crate::id::SensorId;
use crate::panel::Panel;
use log::debug;

const SAMPLE_PREFIX: &str = "sensor_";
const COUNT_KEYWORD: &str = "count";

// ---------------------------------------------------------------------------
// Requests
// ---------------------------------------------------------------------------

/// A parsed simulator request.
#[derive(Debug, Clone, PartialEq)]
pub enum IngestRequest {
    /// The simulator asks how many sensors exist.
    CountQuery,
    /// A measurement for the sensor at a catalog position.
    Sample { index: usize, value: f64 },
}

/// What handling a request produced.
#[derive(Debug, Clone, PartialEq)]
pub enum IngestReply {
    /// Send this count back to the simulator.
    Count(usize),
    /// The sample was applied to this sensor.
    Applied { id: SensorId, value: f64 },
}

/// Parse one request line. Returns `None` for anything unrecognized.
pub fn parse_request(line: &str) -> Option<IngestRequest> {
    let line = line.trim();
    if line.eq_ignore_ascii_case(COUNT_KEYWORD) {
        return Some(IngestRequest::CountQuery);
    }

    let (left, right) = line.split_once(':')?;
    let left = left.trim();
    let index = left.strip_prefix(SAMPLE_PREFIX)?.parse::<usize>().ok()?;
    let value = right.trim().parse::<f64>().ok()?;
    Some(IngestRequest::Sample { index, value })
}

/// Apply a sample to the sensor at a catalog position. Returns the affected
/// sensor id, or `None` if the position is out of range.
pub fn apply_sample(panel: &mut Panel, index: usize, value: f64) -> Option<SensorId> {
    let id = panel.catalog().get_at(index)?.id;
    // The id was just read out of the catalog, so this cannot fail.
    panel.set_last_value(id, Some(value)).ok()?;
    debug!("sample for sensor id={}: {value}", id.0);
    Some(id)
}

/// Parse and handle one request line against the panel.
pub fn handle_line(panel: &mut Panel, line: &str) -> Option<IngestReply> {
    match parse_request(line)? {
        IngestRequest::CountQuery => Some(IngestReply::Count(panel.catalog().len())),
        IngestRequest::Sample { index, value } => {
            let id = apply_sample(panel, index, value)?;
            Some(IngestReply::Applied { id, value })
        }
    }
}

// ===========================================================================
// Tests
// ===========================================================================
