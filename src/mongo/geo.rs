// Copyright (c) 2025-2026 Adrian Robinson. Licensed under the AGPL-3.0.
// See LICENSE file in the project root for full license text.

//! Great-circle distance for `$nearSphere`.

use serde_json::Value;

/// Mean Earth radius in metres
pub const EARTH_RADIUS_METERS: f64 = 6_371_000.0;

/// Haversine distance in metres between two (longitude, latitude) points
/// given in degrees.
pub fn haversine_distance(lon1: f64, lat1: f64, lon2: f64, lat2: f64) -> f64 {
    let d_lat = (lat2 - lat1).to_radians();
    let d_lon = (lon2 - lon1).to_radians();
    let a = ((d_lat / 2.0).sin().powi(2)
        + lat1.to_radians().cos() * lat2.to_radians().cos() * (d_lon / 2.0).sin().powi(2))
    .clamp(0.0, 1.0);
    let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());
    EARTH_RADIUS_METERS * c
}

/// Extract `(longitude, latitude)` from a stored location.
///
/// Accepts a GeoJSON point (`{type: "Point", coordinates: [lng, lat]}`) or
/// a legacy coordinate pair (`[lng, lat]`).
pub fn point_coordinates(value: &Value) -> Option<(f64, f64)> {
    match value {
        Value::Object(map) => {
            if map.get("type").and_then(Value::as_str) != Some("Point") {
                return None;
            }
            map.get("coordinates").and_then(coordinate_pair)
        }
        Value::Array(_) => coordinate_pair(value),
        _ => None,
    }
}

fn coordinate_pair(value: &Value) -> Option<(f64, f64)> {
    match value.as_array()?.as_slice() {
        [lng, lat] => Some((lng.as_f64()?, lat.as_f64()?)),
        _ => None,
    }
}
