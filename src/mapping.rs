//! Shared projection math.
//!
//! Everything here is `f32`: the gpu kernel runs in 32-bit floats, and the
//! cross-backend parity guarantee requires the cpu path to evaluate the
//! exact same formula set, not a higher-precision variant of it.

use std::f32::consts::{FRAC_PI_2, PI, TAU};

/// Normalized face coordinate `(u, v)` in `[-1, 1]²` for the center of
/// destination pixel `(i, j)` on an `n`×`n` face.
pub fn face_uv(i: u32, j: u32, n: u32) -> (f32, f32) {
    let n = n as f32;
    let u = 2.0 * (i as f32 + 0.5) / n - 1.0;
    let v = 2.0 * (j as f32 + 0.5) / n - 1.0;
    (u, v)
}

/// Euclidean normalization. The projector only ever passes vectors with one
/// ±1 axis component, so the norm is always positive.
pub fn normalize(d: [f32; 3]) -> [f32; 3] {
    let norm = (d[0] * d[0] + d[1] * d[1] + d[2] * d[2]).sqrt();
    [d[0] / norm, d[1] / norm, d[2] / norm]
}

/// Longitude/latitude of a unit direction.
///
/// `lon` is in `(-π, π]`, `lat` in `[-π/2, π/2]`. The `asin` argument is
/// clamped: float drift in `normalize` can push `y` a few ulps past ±1 near
/// the poles, which would turn `asin` into NaN.
pub fn spherical(d: [f32; 3]) -> (f32, f32) {
    let lon = d[0].atan2(d[2]);
    let lat = d[1].clamp(-1.0, 1.0).asin();
    (lon, lat)
}

/// Nearest-neighbor source texel for a longitude/latitude pair, clamped to
/// `[0, w-1] × [0, h-1]`.
///
/// The fractional coordinate is truncated, not rounded, and the ±π meridian
/// clamps to the first/last column rather than wrapping; both rules must be
/// mirrored exactly by the gpu kernel.
pub fn source_texel(lon: f32, lat: f32, w: u32, h: u32) -> (u32, u32) {
    let sx = (lon + PI) / TAU * w as f32;
    let sy = (FRAC_PI_2 - lat) / PI * h as f32;
    let x = (sx as i64).clamp(0, i64::from(w) - 1) as u32;
    let y = (sy as i64).clamp(0, i64::from(h) - 1) as u32;
    (x, y)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::face::Face;

    #[test]
    fn face_uv_spans_the_open_square() {
        let (u, v) = face_uv(0, 0, 4);
        assert_eq!((u, v), (-0.75, -0.75));
        let (u, v) = face_uv(3, 3, 4);
        assert_eq!((u, v), (0.75, 0.75));
        // Single-pixel face lands exactly on the center.
        assert_eq!(face_uv(0, 0, 1), (0.0, 0.0));
    }

    #[test]
    fn normalized_directions_are_unit_length() {
        let n = 16;
        for face in Face::ALL {
            for j in 0..n {
                for i in 0..n {
                    let (u, v) = face_uv(i, j, n);
                    let d = normalize(face.raw_direction(u, v));
                    let norm = (d[0] * d[0] + d[1] * d[1] + d[2] * d[2]).sqrt();
                    assert!((norm - 1.0).abs() < 1e-5, "{face} ({u},{v}): |d| = {norm}");
                }
            }
        }
    }

    #[test]
    fn cardinal_directions_map_to_expected_longitudes() {
        // lon 0 is +z, lon π/2 is +x.
        let (lon, lat) = spherical([0.0, 0.0, 1.0]);
        assert!(lon.abs() < 1e-6 && lat.abs() < 1e-6);
        let (lon, _) = spherical([1.0, 0.0, 0.0]);
        assert!((lon - FRAC_PI_2).abs() < 1e-6);
        let (lon, _) = spherical([-1.0, 0.0, 0.0]);
        assert!((lon + FRAC_PI_2).abs() < 1e-6);
    }

    #[test]
    fn poles_clamp_instead_of_nan() {
        // 1 + 1 ulp would make a bare asin return NaN.
        let (_, lat) = spherical([0.0, 1.000_000_1, 0.0]);
        assert!((lat - FRAC_PI_2).abs() < 1e-6);
        let (_, lat) = spherical([0.0, -1.000_000_1, 0.0]);
        assert!((lat + FRAC_PI_2).abs() < 1e-6);
    }

    #[test]
    fn meridian_clamps_to_last_column_not_wraps() {
        // lon = π maps the fractional coordinate to exactly w, which must
        // clamp to w-1.
        let (x, y) = source_texel(PI, 0.0, 64, 32);
        assert_eq!(x, 63);
        assert_eq!(y, 16);
        let (x, _) = source_texel(-PI, 0.0, 64, 32);
        assert_eq!(x, 0);
    }

    #[test]
    fn texels_stay_in_bounds_over_a_dense_grid() {
        let (w, h) = (17, 9);
        let n = 32;
        for face in Face::ALL {
            for j in 0..n {
                for i in 0..n {
                    let (u, v) = face_uv(i, j, n);
                    let d = normalize(face.raw_direction(u, v));
                    let (lon, lat) = spherical(d);
                    let (x, y) = source_texel(lon, lat, w, h);
                    assert!(x < w && y < h, "{face} ({i},{j}) -> ({x},{y})");
                }
            }
        }
    }

    #[test]
    fn equator_center_maps_to_image_center() {
        let (x, y) = source_texel(0.0, 0.0, 64, 32);
        assert_eq!((x, y), (32, 16));
    }
}
