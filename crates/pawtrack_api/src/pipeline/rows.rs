//! Field resolution over columnar rows.
//!
//! Device firmware revisions disagree on column names (`step`, `STEP`,
//! `步数`, ...), so fields resolve through alias tables: exact match on the
//! canonical name first, then case-insensitive substring match over every
//! alias, scanning columns in order. The alias lists are data; extending
//! them for a new firmware never touches the lookup logic.

use chrono::{DateTime, Utc};
use serde_json::Value;

/// Canonical column name plus every spelling firmware has been seen using.
/// Aliases are stored lowercase; matching lowercases the column side.
pub struct FieldAliases {
    pub canonical: &'static str,
    pub aliases: &'static [&'static str],
}

pub const STEP: FieldAliases = FieldAliases {
    canonical: "step",
    aliases: &["step", "计步", "步数"],
};
pub const TEMP: FieldAliases = FieldAliases {
    canonical: "temp",
    aliases: &["temp", "体温", "温度"],
};
pub const PRESSURE: FieldAliases = FieldAliases {
    canonical: "press",
    aliases: &["press", "气压"],
};
pub const HEIGHT: FieldAliases = FieldAliases {
    canonical: "height",
    aliases: &["height", "高度", "海拔"],
};
pub const LATITUDE: FieldAliases = FieldAliases {
    canonical: "lat",
    aliases: &["latitude", "lat", "纬度"],
};
pub const LONGITUDE: FieldAliases = FieldAliases {
    canonical: "lng",
    aliases: &["longitude", "lng", "lon", "经度"],
};
pub const BATTERY: FieldAliases = FieldAliases {
    canonical: "batvol",
    aliases: &["batvol", "battvol", "battery", "电量", "电压"],
};
pub const RSRP: FieldAliases = FieldAliases {
    canonical: "rsrp",
    aliases: &["rsrp", "信号"],
};
pub const SPECIES: FieldAliases = FieldAliases {
    canonical: "species_id",
    aliases: &["species", "物种", "品种"],
};
pub const TIME: FieldAliases = FieldAliases {
    canonical: "time",
    aliases: &["time", "时间", "日期"],
};

/// Resolve a field against a row. Absence is the only failure mode: rows
/// shorter than the column list, missing columns and JSON nulls all read as
/// `None`, silently.
pub fn field<'a>(columns: &[String], row: &'a [Value], spec: &FieldAliases) -> Option<&'a Value> {
    if let Some(idx) = columns.iter().position(|c| c == spec.canonical) {
        return row.get(idx).filter(|v| !v.is_null());
    }
    columns
        .iter()
        .position(|column| {
            let lowered = column.to_lowercase();
            spec.aliases.iter().any(|alias| lowered.contains(alias))
        })
        .and_then(|idx| row.get(idx))
        .filter(|v| !v.is_null())
}

/// Numeric view of a field: JSON numbers directly, numeric strings parsed.
/// Non-finite values read as absent.
pub fn numeric_field(columns: &[String], row: &[Value], spec: &FieldAliases) -> Option<f64> {
    let number = match field(columns, row, spec)? {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }?;
    number.is_finite().then_some(number)
}

pub fn string_field(columns: &[String], row: &[Value], spec: &FieldAliases) -> Option<String> {
    match field(columns, row, spec)? {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// The row timestamp, when present and RFC3339-shaped.
pub fn time_field(columns: &[String], row: &[Value]) -> Option<DateTime<Utc>> {
    let raw = string_field(columns, row, &TIME)?;
    DateTime::parse_from_rfc3339(&raw)
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}
