/// Computes the arithmetic mean of a slice of values. Returns 0.0 for empty input.
pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Rounds half away from zero to `decimals` places.
pub fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}

/// Rounds a score to an integer and clamps it into 0..=100.
pub fn clamp_score(value: f64) -> u8 {
    value.round().clamp(0.0, 100.0) as u8
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mean_empty_is_zero() {
        assert_eq!(mean(&[]), 0.0);
    }

    #[test]
    fn test_mean_of_two_distances() {
        assert_eq!(mean(&[100.0, 300.0]), 200.0);
    }

    #[test]
    fn test_round_to_one_decimal() {
        assert_eq!(round_to(123.456, 1), 123.5);
        assert_eq!(round_to(0.04, 1), 0.0);
    }

    #[test]
    fn test_clamp_score_bounds() {
        assert_eq!(clamp_score(-12.0), 0);
        assert_eq!(clamp_score(57.5), 58);
        assert_eq!(clamp_score(140.2), 100);
    }
}
