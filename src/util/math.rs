//! Numeric helpers for kernel geometry and map statistics.

/// Computes sine and cosine for an angle in degrees.
///
/// Exact quarter turns are snapped so that axis-aligned rotations resample
/// kernels without interpolation noise.
pub(crate) fn sin_cos_deg(angle_deg: f64) -> (f64, f64) {
    let turns = angle_deg / 90.0;
    if turns == turns.round() {
        return match (turns as i64).rem_euclid(4) {
            0 => (0.0, 1.0),
            1 => (1.0, 0.0),
            2 => (0.0, -1.0),
            _ => (-1.0, 0.0),
        };
    }
    angle_deg.to_radians().sin_cos()
}

/// Mean and population standard deviation of a map, accumulated in `f64`.
///
/// Returns `(0.0, 0.0)` for an empty slice.
pub(crate) fn mean_std(values: &[f32]) -> (f64, f64) {
    if values.is_empty() {
        return (0.0, 0.0);
    }
    let n = values.len() as f64;
    let mean = values.iter().map(|&v| f64::from(v)).sum::<f64>() / n;
    let var = values
        .iter()
        .map(|&v| {
            let d = f64::from(v) - mean;
            d * d
        })
        .sum::<f64>()
        / n;
    (mean, var.max(0.0).sqrt())
}

#[cfg(test)]
mod tests {
    use super::{mean_std, sin_cos_deg};

    #[test]
    fn sin_cos_deg_snaps_quarter_turns() {
        assert_eq!(sin_cos_deg(0.0), (0.0, 1.0));
        assert_eq!(sin_cos_deg(90.0), (1.0, 0.0));
        assert_eq!(sin_cos_deg(180.0), (0.0, -1.0));
        assert_eq!(sin_cos_deg(-90.0), (-1.0, 0.0));
    }

    #[test]
    fn sin_cos_deg_matches_diagonal() {
        let (sin, cos) = sin_cos_deg(45.0);
        assert!((sin - cos).abs() < 1e-12);
        assert!((sin - std::f64::consts::FRAC_1_SQRT_2).abs() < 1e-12);
    }

    #[test]
    fn mean_std_uses_population_variance() {
        let (mean, std) = mean_std(&[1.0, 2.0, 3.0, 4.0]);
        assert!((mean - 2.5).abs() < 1e-12);
        assert!((std - 1.25f64.sqrt()).abs() < 1e-12);
        assert_eq!(mean_std(&[]), (0.0, 0.0));
    }
}
