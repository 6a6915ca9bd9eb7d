//! Polygon area over element node rings.

/// Mean Earth radius in metres, used by the local equal-area reprojection.
const EARTH_RADIUS_M: f64 = 6_371_000.0;

/// Signed-area (shoelace) formula over a horizontal node ring, sign
/// normalised to positive.
///
/// Coordinates are taken as planar; callers with geographic rings must
/// reproject first (see [`ring_area_geographic`]).
pub(crate) fn ring_area_projected(xs: &[f64], ys: &[f64]) -> f64 {
    debug_assert_eq!(xs.len(), ys.len());
    let n = xs.len();
    let mut twice_area = 0.0;
    for i in 0..n {
        let j = (i + 1) % n;
        twice_area += xs[i] * ys[j] - xs[j] * ys[i];
    }
    (twice_area / 2.0).abs()
}

/// Area of a lon/lat node ring in square metres.
///
/// Degree coordinates are reprojected into a local cylindrical equal-area
/// frame about the ring's mean latitude before applying the shoelace
/// formula; running the shoelace on raw degrees would return square
/// degrees, which is never a valid result.
pub(crate) fn ring_area_geographic(lons: &[f64], lats: &[f64]) -> f64 {
    debug_assert_eq!(lons.len(), lats.len());
    let n = lons.len() as f64;
    let mean_lon: f64 = lons.iter().sum::<f64>() / n;
    let mean_lat: f64 = lats.iter().sum::<f64>() / n;
    let cos_lat = mean_lat.to_radians().cos();

    let xs: Vec<f64> = lons
        .iter()
        .map(|&lon| EARTH_RADIUS_M * (lon - mean_lon).to_radians() * cos_lat)
        .collect();
    let ys: Vec<f64> = lats
        .iter()
        .map(|&lat| EARTH_RADIUS_M * lat.to_radians())
        .collect();

    ring_area_projected(&xs, &ys)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use approx::assert_relative_eq;

    #[test]
    fn unit_square() {
        let xs = [0.0, 1.0, 1.0, 0.0];
        let ys = [0.0, 0.0, 1.0, 1.0];
        assert_abs_diff_eq!(ring_area_projected(&xs, &ys), 1.0, epsilon = 1e-12);
    }

    #[test]
    fn right_triangle() {
        let xs = [0.0, 4.0, 0.0];
        let ys = [0.0, 0.0, 3.0];
        assert_abs_diff_eq!(ring_area_projected(&xs, &ys), 6.0, epsilon = 1e-12);
    }

    #[test]
    fn winding_sign_normalised() {
        // Clockwise ring gives the same positive area.
        let xs = [0.0, 0.0, 1.0, 1.0];
        let ys = [0.0, 1.0, 1.0, 0.0];
        assert_abs_diff_eq!(ring_area_projected(&xs, &ys), 1.0, epsilon = 1e-12);
    }

    #[test]
    fn translation_invariant() {
        let xs = [100.0, 104.0, 100.0];
        let ys = [200.0, 200.0, 203.0];
        assert_abs_diff_eq!(ring_area_projected(&xs, &ys), 6.0, epsilon = 1e-9);
    }

    #[test]
    fn geographic_square_at_equator() {
        // A 0.01° x 0.01° square at the equator: one degree of arc is
        // R * pi/180 ≈ 111.195 km, so the square is about 1.2364e6 m².
        let d = 0.01;
        let lons = [0.0, d, d, 0.0];
        let lats = [0.0, 0.0, d, d];
        let one_deg_m = EARTH_RADIUS_M * std::f64::consts::PI / 180.0;
        let expected = (one_deg_m * d) * (one_deg_m * d);
        assert_relative_eq!(
            ring_area_geographic(&lons, &lats),
            expected,
            max_relative = 1e-6
        );
    }

    #[test]
    fn geographic_area_shrinks_with_latitude() {
        let d = 0.01;
        let at = |lat0: f64| {
            let lons = [0.0, d, d, 0.0];
            let lats = [lat0, lat0, lat0 + d, lat0 + d];
            ring_area_geographic(&lons, &lats)
        };
        let equator = at(0.0);
        let mid = at(55.0);
        assert!(mid < equator);
        // cos(55°) ≈ 0.5736
        assert_relative_eq!(mid / equator, 55.0_f64.to_radians().cos(), epsilon = 1e-3);
    }

    #[test]
    fn geographic_result_is_metric_not_degrees() {
        // The raw shoelace over degrees would give 1e-4; the metric result
        // is ten orders of magnitude larger.
        let d = 0.01;
        let lons = [0.0, d, d, 0.0];
        let lats = [0.0, 0.0, d, d];
        assert!(ring_area_geographic(&lons, &lats) > 1e6);
    }
}
