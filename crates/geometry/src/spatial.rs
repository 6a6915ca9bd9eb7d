//! Nearest-centroid search.

/// Index of the point with strictly minimal squared Euclidean distance to
/// `(x, y)`; ties resolve to the lowest index.
///
/// Deterministic: repeated calls with the same inputs return the same
/// index. NaN distances never win because `<` is false for NaN.
///
/// # Panics
///
/// Debug-asserts that `points` is non-empty.
pub(crate) fn closest_point_index(points: &[(f64, f64)], x: f64, y: f64) -> usize {
    debug_assert!(!points.is_empty());

    let mut best = 0;
    let mut best_d2 = f64::INFINITY;
    for (i, &(px, py)) in points.iter().enumerate() {
        let dx = px - x;
        let dy = py - y;
        let d2 = dx * dx + dy * dy;
        if d2 < best_d2 {
            best = i;
            best_d2 = d2;
        }
    }
    best
}
