use std::f64::consts::TAU;

use glam::DVec3;

const LABEL_LIMIT: usize = 100;

pub fn truncate_chars(value: &str, limit: usize) -> &str {
    match value.char_indices().nth(limit) {
        Some((byte_index, _)) => &value[..byte_index],
        None => value,
    }
}

pub fn truncate_label(value: &str) -> &str {
    truncate_chars(value, LABEL_LIMIT)
}

/// Deterministic unit vector for a pair of indices, spread with golden-angle offsets.
/// Used whenever two points coincide and the separating direction is undefined.
pub fn fallback_direction(first: usize, second: usize) -> DVec3 {
    let azimuth = ((first as f64) * 0.618_034 + (second as f64) * 0.414_214) * TAU;
    let z = (((first as f64) * 0.732_051 + (second as f64) * 0.236_068).fract() * 2.0) - 1.0;
    let ring = (1.0 - z * z).max(0.0).sqrt();
    DVec3::new(ring * azimuth.cos(), ring * azimuth.sin(), z)
}
