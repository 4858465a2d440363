use crate::error::Result;
use crate::strategy::{map_rows, Strategy, StrategyKind};

//lower bound of a sign-consistent position multiplier on a log return
//
//fully shorting a log return l grows capital by 2 - e^l, so the constant
//multiplier m with l*m == ln(2 - e^l) is ln(2 - e^l) / l.
//the indeterminate 0/0 at l == 0 (and any other nan) resolves to -1.
//ln(2 - e^l) is evaluated as ln_1p(-expm1(l)) so tiny returns keep precision
pub fn min_bound(log_return: f64) -> f64 {
    let bound = (-log_return.exp_m1()).ln_1p() / log_return;
    if bound.is_nan() {
        -1.0
    } else {
        bound
    }
}

//partial position tanh(signal) on linear returns
#[derive(Debug, Clone, Copy, Default)]
pub struct TanhPartial;

//partial position tanh(signal) on log returns
//
//approximation: the true short side bound is min_bound(l), not -1,
//but the two are close for small returns
#[derive(Debug, Clone, Copy, Default)]
pub struct TanhPartialV1;

//tanh(signal) with only the negative half stretched to [min_bound(l), 0)
#[derive(Debug, Clone, Copy, Default)]
pub struct TanhPartialV2;

//tanh(signal) affinely remapped from (-1, 1) to (min_bound(l), 1)
//
//the remap moves the zero crossing, so a positive signal near zero can
//still be a short position
#[derive(Debug, Clone, Copy, Default)]
pub struct TanhPartialV3;

fn tanh_derivative(signal: f64) -> f64 {
    let t = signal.tanh();
    1.0 - t * t
}

//mult_min is forced to -1 on the non-negative half so that half is unscaled
fn v2_mult_min(tanh: f64, log_return: f64) -> f64 {
    if tanh >= 0.0 {
        -1.0
    } else {
        min_bound(log_return)
    }
}

impl Strategy for TanhPartial {
    fn name(&self) -> &'static str {
        "Tanh Partial"
    }

    fn kind(&self) -> StrategyKind {
        StrategyKind::TanhPartial
    }

    fn multiplier(&self, signal: &[f64], returns: &[f64]) -> Result<Vec<f64>> {
        map_rows(signal, returns, |s, _| s.tanh())
    }

    fn multiplier_derivative(&self, signal: &[f64], returns: &[f64]) -> Result<Vec<f64>> {
        map_rows(signal, returns, |s, _| tanh_derivative(s))
    }
}

impl Strategy for TanhPartialV1 {
    fn name(&self) -> &'static str {
        "Tanh Partial V1"
    }

    fn kind(&self) -> StrategyKind {
        StrategyKind::TanhPartialV1
    }

    fn multiplier(&self, signal: &[f64], returns: &[f64]) -> Result<Vec<f64>> {
        map_rows(signal, returns, |s, _| s.tanh())
    }

    fn multiplier_derivative(&self, signal: &[f64], returns: &[f64]) -> Result<Vec<f64>> {
        map_rows(signal, returns, |s, _| tanh_derivative(s))
    }
}

impl Strategy for TanhPartialV2 {
    fn name(&self) -> &'static str {
        "Tanh Partial V2"
    }

    fn kind(&self) -> StrategyKind {
        StrategyKind::TanhPartialV2
    }

    fn multiplier(&self, signal: &[f64], returns: &[f64]) -> Result<Vec<f64>> {
        map_rows(signal, returns, |s, l| {
            let t = s.tanh();
            t * -v2_mult_min(t, l)
        })
    }

    fn multiplier_derivative(&self, signal: &[f64], returns: &[f64]) -> Result<Vec<f64>> {
        map_rows(signal, returns, |s, l| {
            tanh_derivative(s) * -v2_mult_min(s.tanh(), l)
        })
    }
}

impl Strategy for TanhPartialV3 {
    fn name(&self) -> &'static str {
        "Tanh Partial V3"
    }

    fn kind(&self) -> StrategyKind {
        StrategyKind::TanhPartialV3
    }

    fn multiplier(&self, signal: &[f64], returns: &[f64]) -> Result<Vec<f64>> {
        map_rows(signal, returns, |s, l| {
            let mult_min = min_bound(l);
            let at_sigmoid_bounds = (s.tanh() + 1.0) / 2.0;
            at_sigmoid_bounds * (1.0 - mult_min) + mult_min
        })
    }

    fn multiplier_derivative(&self, signal: &[f64], returns: &[f64]) -> Result<Vec<f64>> {
        map_rows(signal, returns, |s, l| {
            tanh_derivative(s) / 2.0 * (1.0 - min_bound(l))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::ShortFilter;
    use crate::strategy::direction::{Direction, DirectionLog};

    fn assert_close(a: f64, b: f64, tol: f64) {
        assert!((a - b).abs() < tol, "{} != {} (tol {})", a, b, tol);
    }

    #[test]
    fn min_bound_at_zero_is_minus_one() {
        assert_eq!(min_bound(0.0), -1.0);
        assert_eq!(min_bound(-0.0), -1.0);
    }

    #[test]
    fn min_bound_matches_closed_form() {
        let l = 0.01_f64;
        let expected = (2.0 - l.exp()).ln() / l;
        assert_close(min_bound(l), expected, 1e-12);
        assert!(min_bound(l) < -1.0);
        //for a falling price the short side is worth less than -1
        assert!(min_bound(-0.01) > -1.0);
    }

    #[test]
    fn min_bound_tends_to_minus_one_for_tiny_returns() {
        assert_close(min_bound(1e-18), -1.0, 1e-12);
        assert_close(min_bound(-1e-18), -1.0, 1e-12);
    }

    #[test]
    fn v2_leaves_positive_half_unscaled() {
        let signal = [2.0];
        let returns = [0.01];

        let multiplier = TanhPartialV2.multiplier(&signal, &returns).unwrap();
        assert_close(multiplier[0], 2.0_f64.tanh(), 1e-15);

        let metric = TanhPartialV2
            .metric(&signal, &returns, ShortFilter::None)
            .unwrap();
        assert_close(metric, (0.01 * 2.0_f64.tanh()).exp(), 1e-15);
        assert_close(metric, 1.00969, 1e-5);
    }

    #[test]
    fn v2_scales_negative_half_by_bound() {
        let signal = [-1.0];
        let returns = [0.02];

        let multiplier = TanhPartialV2.multiplier(&signal, &returns).unwrap();
        assert_close(multiplier[0], (-1.0_f64).tanh() * -min_bound(0.02), 1e-15);
        assert!(multiplier[0] < (-1.0_f64).tanh());
    }

    #[test]
    fn v2_zero_return_does_not_produce_nan() {
        let loss = TanhPartialV2
            .loss(&[-3.0, 1.0], &[0.0, 0.0], ShortFilter::None)
            .unwrap();
        assert!(loss.iter().all(|v| !v.is_nan()));
    }

    #[test]
    fn v3_remaps_to_bound_interval() {
        let l = 0.01;
        let low = TanhPartialV3.multiplier(&[-40.0], &[l]).unwrap()[0];
        let high = TanhPartialV3.multiplier(&[40.0], &[l]).unwrap()[0];
        let mid = TanhPartialV3.multiplier(&[0.0], &[l]).unwrap()[0];

        assert_close(low, min_bound(l), 1e-12);
        assert_close(high, 1.0, 1e-12);
        //zero signal is not flat after the remap
        assert_close(mid, (1.0 + min_bound(l)) / 2.0, 1e-12);
        assert!(mid != 0.0);
    }

    #[test]
    fn v3_zero_return_uses_unit_bound() {
        let multiplier = TanhPartialV3.multiplier(&[0.5], &[0.0]).unwrap()[0];
        assert_close(multiplier, 0.5_f64.tanh(), 1e-15);
    }

    #[test]
    fn saturated_tanh_matches_direction() {
        let signal = [50.0, -50.0, 80.0];
        let linear = [0.02, -0.01, 0.03];
        let log = [0.02, -0.01, 0.03];

        let tanh = TanhPartial
            .metric(&signal, &linear, ShortFilter::None)
            .unwrap();
        let dir = Direction
            .metric(&signal, &linear, ShortFilter::None)
            .unwrap();
        assert_close(tanh, dir, 1e-12);

        let v1 = TanhPartialV1
            .metric(&signal, &log, ShortFilter::None)
            .unwrap();
        let dir_log = DirectionLog
            .metric(&signal, &log, ShortFilter::None)
            .unwrap();
        assert_close(v1, dir_log, 1e-12);
    }

    #[test]
    fn gradients_match_finite_differences() {
        let signal = [0.3, -0.7, 1.2, -0.05];
        let returns = [0.015, -0.02, 0.004, 0.03];
        let h = 1e-6;

        let variants: [&dyn Strategy; 4] =
            [&TanhPartial, &TanhPartialV1, &TanhPartialV2, &TanhPartialV3];

        for strategy in variants {
            let grad = strategy
                .loss_gradient(&signal, &returns, ShortFilter::None)
                .unwrap();

            for i in 0..signal.len() {
                let mut up = signal;
                let mut down = signal;
                up[i] += h;
                down[i] -= h;

                let loss_up = strategy.loss(&up, &returns, ShortFilter::None).unwrap();
                let loss_down = strategy.loss(&down, &returns, ShortFilter::None).unwrap();
                let numeric = (loss_up[i] - loss_down[i]) / (2.0 * h);

                assert_close(grad[i], numeric, 1e-6);
            }
        }
    }
}
