//! Growth rates over per-fiscal-year series (most recent value first).

/// Sign of a value: -1, 0 or 1, NaN for NaN.
pub fn sign(x: f64) -> f64 {
    if x.is_nan() {
        f64::NAN
    } else if x > 0.0 {
        1.0
    } else if x < 0.0 {
        -1.0
    } else {
        0.0
    }
}

/// Annualized growth over `years`, in percent.
///
/// Entry `i` compares `values[i]` with `values[i + years]`. The rate keeps the
/// sign of the ratio, so a change of sign between the two values yields a
/// negative, not a complex, growth.
pub fn growth(values: &[f64], years: usize) -> Vec<f64> {
    if years == 0 {
        return Vec::new();
    }
    let exponent = 1.0 / years as f64;
    values
        .iter()
        .zip(values.iter().skip(years))
        .map(|(recent, past)| {
            let rate = recent / past;
            (sign(rate) * rate.abs().powf(exponent) - 1.0) * 100.0
        })
        .collect()
}

/// Year-over-year growth in percent.
pub fn growth_y2y(values: &[f64]) -> Vec<f64> {
    values
        .windows(2)
        .map(|w| (w[0] - w[1]) / w[1] * 100.0)
        .collect()
}

/// Average yearly growth of every value relative to the oldest one, in percent.
pub fn growth_total(values: &[f64]) -> Vec<f64> {
    let Some(&oldest) = values.last() else {
        return Vec::new();
    };
    let n = values.len();
    values[..n - 1]
        .iter()
        .enumerate()
        .map(|(i, v)| (v - oldest) / oldest / (n - i - 1) as f64 * 100.0)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_growth_one_year() {
        let g = growth(&[110.0, 100.0, 80.0], 1);
        assert_eq!(g.len(), 2);
        assert_relative_eq!(g[0], 10.0, epsilon = 1e-9);
        assert_relative_eq!(g[1], 25.0, epsilon = 1e-9);
    }

    #[test]
    fn test_growth_annualizes() {
        let g = growth(&[121.0, 110.0, 100.0], 2);
        assert_eq!(g.len(), 1);
        assert_relative_eq!(g[0], 10.0, epsilon = 1e-9);
    }

    #[test]
    fn test_growth_sign_flip_is_negative() {
        let g = growth(&[50.0, -100.0], 1);
        assert_relative_eq!(g[0], -150.0, epsilon = 1e-9);
    }

    #[test]
    fn test_growth_from_zero_value() {
        assert_relative_eq!(growth(&[0.0, 100.0], 1)[0], -100.0);
    }

    #[test]
    fn test_growth_short_series() {
        assert!(growth(&[1.0], 1).is_empty());
        assert!(growth(&[1.0, 2.0], 0).is_empty());
        assert!(growth(&[1.0, 2.0], 5).is_empty());
    }

    #[test]
    fn test_growth_y2y() {
        let g = growth_y2y(&[120.0, 100.0, 80.0]);
        assert_relative_eq!(g[0], 20.0);
        assert_relative_eq!(g[1], 25.0);
    }

    #[test]
    fn test_growth_total() {
        let g = growth_total(&[140.0, 120.0, 100.0]);
        assert_relative_eq!(g[0], 20.0);
        assert_relative_eq!(g[1], 20.0);
        assert!(growth_total(&[]).is_empty());
        assert!(growth_total(&[5.0]).is_empty());
    }

    #[test]
    fn test_sign() {
        assert_eq!(sign(-3.0), -1.0);
        assert_eq!(sign(0.0), 0.0);
        assert_eq!(sign(2.0), 1.0);
        assert!(sign(f64::NAN).is_nan());
    }
}
