//! Coordinate-stream sanitation.

use pawtrack_telemetry::Series;

use crate::pipeline::rows;
use crate::types::{Coordinate, FALLBACK_COORDINATE};

/// Keep valid fixes in input order. An all-invalid (or empty) stream becomes
/// the single fixed fallback point, so the map always has something to draw.
pub fn sanitize(points: impl IntoIterator<Item = Coordinate>) -> Vec<Coordinate> {
    let kept: Vec<Coordinate> = points.into_iter().filter(Coordinate::is_valid).collect();
    if kept.is_empty() {
        vec![FALLBACK_COORDINATE]
    } else {
        kept
    }
}

/// Extract the coordinate stream from a window. Rows missing either
/// component contribute a non-finite point that `sanitize` drops.
pub fn from_series(series: &Series) -> Vec<Coordinate> {
    let columns = &series.columns;
    sanitize(series.values.iter().map(|row| {
        Coordinate(
            rows::numeric_field(columns, row, &rows::LATITUDE).unwrap_or(f64::NAN),
            rows::numeric_field(columns, row, &rows::LONGITUDE).unwrap_or(f64::NAN),
        )
    }))
}
