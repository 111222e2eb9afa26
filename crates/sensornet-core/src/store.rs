//! Text-file persistence for the catalog and the measurement log.
//!
//! Both formats are line-oriented and forgiving on read: blank and
//! malformed lines are skipped with a warning instead of failing the whole
//! load, so a partially corrupted file still yields every usable record.
//!
//! Catalog format, one sensor per line:
//!
//! ```text
//! id;name;kind;last
//! ```
//!
//! where `last` is empty or a two-decimal float. Kind names not yet in the
//! registry are registered on the fly during load.
//!
//! Measurement log, one sample per line, append-only:
//!
//! ```text
//! <rfc3339>;EntityId=<id>;Value=<v>;Valid=<bool>
//! ```
//!
//! `Valid` records whether the value fell inside [`VALID_RANGE`] at the time
//! it was logged. Loading keeps only the newest sample per id.

use crate::catalog::{Catalog, Sensor};
use crate::id::SensorId;
use log::warn;
use std::collections::HashMap;
use std::fs;
use std::io::Write;
use std::ops::RangeInclusive;
use std::path::Path;
use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;

/// Plausible measurement band; values outside it are logged as invalid.
pub const VALID_RANGE: RangeInclusive<f64> = 250.0..=350.0;

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

/// Errors that can occur while reading or writing store files.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("store io: {0}")]
    Io(#[from] std::io::Error),
    #[error("timestamp format: {0}")]
    Timestamp(#[from] time::error::Format),
}

// ---------------------------------------------------------------------------
// Catalog text format
// ---------------------------------------------------------------------------

/// Render the catalog to its text form.
pub fn render_catalog(catalog: &Catalog) -> String {
    let mut out = String::new();
    for sensor in catalog.sensors() {
        let last = sensor
            .last_value
            .map(|v| format!("{v:.2}"))
            .unwrap_or_default();
        out.push_str(&format!(
            "{};{};{};{}\n",
            sensor.id.0,
            sensor.name,
            catalog.kind_name(sensor.kind),
            last
        ));
    }
    out
}

/// Parse catalog text into an existing catalog, registering unknown kinds as
/// they appear. Returns the number of sensors loaded; skips bad lines.
pub fn parse_catalog(text: &str, catalog: &mut Catalog) -> usize {
    let mut loaded = 0;
    for line in text.lines() {
        if line.trim().is_empty() {
            continue;
        }
        let cols: Vec<&str> = line.split(';').collect();
        if cols.len() < 4 {
            warn!("catalog line has {} columns, skipping: {line}", cols.len());
            continue;
        }
        let Ok(id) = cols[0].trim().parse::<u32>() else {
            warn!("catalog line has a bad id, skipping: {line}");
            continue;
        };
        let name = cols[1].trim().to_string();
        let kind = catalog.register_kind(cols[2].trim());
        let last_value = match cols[3].trim() {
            "" => None,
            raw => match raw.parse::<f64>() {
                Ok(v) => Some(v),
                Err(_) => {
                    warn!("catalog line has a bad last value, skipping: {line}");
                    continue;
                }
            },
        };
        let sensor = Sensor {
            id: SensorId(id),
            name,
            kind,
            last_value,
        };
        match catalog.add(sensor) {
            Ok(()) => loaded += 1,
            Err(err) => warn!("catalog line rejected ({err}), skipping: {line}"),
        }
    }
    loaded
}

/// Write the catalog file, creating parent directories as needed.
pub fn save_catalog(path: &Path, catalog: &Catalog) -> Result<(), StoreError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, render_catalog(catalog))?;
    Ok(())
}

/// Load the catalog file into an existing catalog. A missing file loads
/// nothing, matching a first run.
pub fn load_catalog(path: &Path, catalog: &mut Catalog) -> Result<usize, StoreError> {
    if !path.exists() {
        return Ok(0);
    }
    let text = fs::read_to_string(path)?;
    Ok(parse_catalog(&text, catalog))
}

// ---------------------------------------------------------------------------
// Measurement log
// ---------------------------------------------------------------------------

/// Render one measurement log line.
pub fn render_sample(
    id: SensorId,
    value: f64,
    at: OffsetDateTime,
) -> Result<String, StoreError> {
    let valid = VALID_RANGE.contains(&value);
    Ok(format!(
        "{};EntityId={};Value={value:.2};Valid={valid}",
        at.format(&Rfc3339)?,
        id.0
    ))
}

/// Append one sample to the measurement log, creating it (and parent
/// directories) as needed.
pub fn append_sample(
    path: &Path,
    id: SensorId,
    value: f64,
    at: OffsetDateTime,
) -> Result<(), StoreError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let line = render_sample(id, value, at)?;
    let mut file = fs::OpenOptions::new().create(true).append(true).open(path)?;
    writeln!(file, "{line}")?;
    Ok(())
}

/// Scan measurement log text and back-fill `last_value` on matching catalog
/// sensors with the newest sample per id. Returns the number of sensors
/// updated; skips bad lines.
pub fn apply_last_values(text: &str, catalog: &mut Catalog) -> usize {
    let mut latest: HashMap<u32, (OffsetDateTime, f64)> = HashMap::new();

    for line in text.lines() {
        if line.trim().is_empty() {
            continue;
        }
        let cols: Vec<&str> = line.split(';').collect();
        if cols.len() < 4 {
            warn!("log line has {} columns, skipping: {line}", cols.len());
            continue;
        }
        let Ok(ts) = OffsetDateTime::parse(cols[0].trim(), &Rfc3339) else {
            warn!("log line has a bad timestamp, skipping: {line}");
            continue;
        };
        let (Some(id), Some(value)) = (field_value(cols[1]), field_value(cols[2])) else {
            warn!("log line has bad fields, skipping: {line}");
            continue;
        };
        let (Ok(id), Ok(value)) = (id.parse::<u32>(), value.parse::<f64>()) else {
            warn!("log line does not parse, skipping: {line}");
            continue;
        };
        match latest.get(&id) {
            Some((newest, _)) if *newest >= ts => {}
            _ => {
                latest.insert(id, (ts, value));
            }
        }
    }

    let mut updated = 0;
    let ids: Vec<SensorId> = catalog.sensors().iter().map(|s| s.id).collect();
    for id in ids {
        if let Some(&(_, value)) = latest.get(&id.0) {
            if catalog.set_last_value(id, Some(value)).is_ok() {
                updated += 1;
            }
        }
    }
    updated
}

/// Load the measurement log and back-fill catalog `last_value`s. A missing
/// log loads nothing.
pub fn load_last_values(path: &Path, catalog: &mut Catalog) -> Result<usize, StoreError> {
    if !path.exists() {
        return Ok(0);
    }
    let text = fs::read_to_string(path)?;
    Ok(apply_last_values(&text, catalog))
}

/// The `value` part of a `key=value` field, if present.
fn field_value(field: &str) -> Option<&str> {
    let eq = field.find('=')?;
    Some(field[eq + 1..].trim())
}

// ===========================================================================
// Tests
// ===========================================================================
