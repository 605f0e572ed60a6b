//! Bounds aggregation over the extracted waypoints.

use crate::waypoint::{Bounds, Waypoint};

/// Compute the minimal rectangle enclosing every waypoint.
///
/// Returns `None` for an empty slice: there is no rectangle around nothing,
/// and callers skip the metadata block in that case.
pub fn compute_bounds(waypoints: &[Waypoint]) -> Option<Bounds> {
    let (first, rest) = waypoints.split_first()?;
    let init = Bounds {
        min_lat: first.latitude,
        max_lat: first.latitude,
        min_lon: first.longitude,
        max_lon: first.longitude,
    };
    Some(rest.iter().fold(init, |b, w| Bounds {
        min_lat: b.min_lat.min(w.latitude),
        max_lat: b.max_lat.max(w.latitude),
        min_lon: b.min_lon.min(w.longitude),
        max_lon: b.max_lon.max(w.longitude),
    }))
}
