use crate::error::{check_aligned, ProfitError, Result};

//three-valued sign, sign(0) == 0 unlike f64::signum
pub fn sign(x: f64) -> f64 {
    if x > 0.0 {
        1.0
    } else if x < 0.0 {
        -1.0
    } else if x == 0.0 {
        0.0
    } else {
        f64::NAN
    }
}

//keeps rows where |signal| >= threshold
//evaluation only, the training loss never thresholds
pub fn apply_threshold<T: Clone>(
    signal: &[f64],
    other: &[T],
    threshold: f64,
) -> Result<(Vec<f64>, Vec<T>)> {
    check_aligned(signal.len(), other.len())?;

    let (kept_signal, kept_other): (Vec<f64>, Vec<T>) = signal
        .iter()
        .zip(other.iter())
        .filter(|(&s, _)| s.abs() >= threshold)
        .map(|(&s, o)| (s, o.clone()))
        .unzip();

    Ok((kept_signal, kept_other))
}

//fraction of rows where the signal and the return point the same way
pub fn direction_agreement(signal: &[f64], returns: &[f64]) -> Result<f64> {
    check_aligned(signal.len(), returns.len())?;

    if returns.is_empty() {
        return Err(ProfitError::EmptySelection);
    }

    let agreeing = signal
        .iter()
        .zip(returns.iter())
        .filter(|(&s, &r)| sign(s) == sign(r))
        .count();

    Ok(agreeing as f64 / returns.len() as f64)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sign_of_zero_is_zero() {
        assert_eq!(sign(0.0), 0.0);
        assert_eq!(sign(-0.0), 0.0);
        assert_eq!(sign(3.2), 1.0);
        assert_eq!(sign(-1e-12), -1.0);
        assert!(sign(f64::NAN).is_nan());
    }

    #[test]
    fn threshold_drops_small_signals() {
        let (signal, other) = apply_threshold(&[0.0001, 0.5], &[1.0, 2.0], 0.001).unwrap();
        assert_eq!(signal, vec![0.5]);
        assert_eq!(other, vec![2.0]);
    }

    #[test]
    fn zero_threshold_keeps_everything() {
        let input = [0.0, -0.3, 2.0];
        let (signal, other) = apply_threshold(&input, &input, 0.0).unwrap();
        assert_eq!(signal, input.to_vec());
        assert_eq!(other, input.to_vec());
    }

    #[test]
    fn direction_agreement_counts_matching_signs() {
        let agreement =
            direction_agreement(&[1.0, -1.0, 0.5, 0.0], &[0.02, 0.01, 0.03, 0.0]).unwrap();
        assert!((agreement - 0.75).abs() < 1e-12);
    }

    #[test]
    fn direction_agreement_on_empty_input_fails() {
        assert_eq!(
            direction_agreement(&[], &[]),
            Err(ProfitError::EmptySelection)
        );
    }
}
