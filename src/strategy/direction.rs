use crate::error::Result;
use crate::filter::sign;
use crate::strategy::{map_rows, Strategy, StrategyKind};

//all-in strategy on linear returns
//long (+1) on a positive signal, short (-1) on a negative one, flat on zero
#[derive(Debug, Clone, Copy, Default)]
pub struct Direction;

//all-in strategy on log returns
#[derive(Debug, Clone, Copy, Default)]
pub struct DirectionLog;

fn direction_multiplier(signal: &[f64], returns: &[f64]) -> Result<Vec<f64>> {
    map_rows(signal, returns, |s, _| sign(s))
}

//sign is flat almost everywhere
fn direction_derivative(signal: &[f64], returns: &[f64]) -> Result<Vec<f64>> {
    map_rows(signal, returns, |_, _| 0.0)
}

impl Strategy for Direction {
    fn name(&self) -> &'static str {
        "Direction"
    }

    fn kind(&self) -> StrategyKind {
        StrategyKind::Direction
    }

    fn multiplier(&self, signal: &[f64], returns: &[f64]) -> Result<Vec<f64>> {
        direction_multiplier(signal, returns)
    }

    fn multiplier_derivative(&self, signal: &[f64], returns: &[f64]) -> Result<Vec<f64>> {
        direction_derivative(signal, returns)
    }
}

impl Strategy for DirectionLog {
    fn name(&self) -> &'static str {
        "Direction (log)"
    }

    fn kind(&self) -> StrategyKind {
        StrategyKind::DirectionLog
    }

    fn multiplier(&self, signal: &[f64], returns: &[f64]) -> Result<Vec<f64>> {
        direction_multiplier(signal, returns)
    }

    fn multiplier_derivative(&self, signal: &[f64], returns: &[f64]) -> Result<Vec<f64>> {
        direction_derivative(signal, returns)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ProfitError;
    use crate::filter::ShortFilter;

    #[test]
    fn linear_metric_is_product_of_growth_factors() {
        let signal = [1.0, -1.0, 0.5];
        let returns = [0.02, -0.01, 0.03];

        let metric = Direction
            .metric(&signal, &returns, ShortFilter::None)
            .unwrap();

        assert!((metric - 1.02 * 1.01 * 1.03).abs() < 1e-12);
        assert!((metric - 1.0612).abs() < 1e-4);
    }

    #[test]
    fn log_metric_is_exp_of_signed_sum() {
        let signal = [0.3, -2.0, 0.0, 4.0];
        let returns = [0.01, -0.02, 0.5, -0.005];

        let metric = DirectionLog
            .metric(&signal, &returns, ShortFilter::None)
            .unwrap();

        let expected = (0.01_f64 + 0.02 + 0.0 - 0.005).exp();
        assert!((metric - expected).abs() < 1e-12);
    }

    #[test]
    fn zero_signal_is_flat() {
        let loss = Direction.loss(&[0.0], &[0.05], ShortFilter::None).unwrap();
        assert_eq!(loss, vec![1.0]);
    }

    #[test]
    fn short_filters_split_the_profit() {
        let signal = [1.0, -1.0, 0.5, -0.2];
        let returns = [0.02, -0.01, 0.03, 0.04];

        let longs = Direction
            .metric(&signal, &returns, ShortFilter::ExcludeShorts)
            .unwrap();
        let shorts = Direction
            .metric(&signal, &returns, ShortFilter::OnlyShorts)
            .unwrap();
        let all = Direction
            .metric(&signal, &returns, ShortFilter::None)
            .unwrap();

        assert!((longs - 1.02 * 1.03).abs() < 1e-12);
        assert!((shorts - 1.01 * 0.96).abs() < 1e-12);
        assert!((all - longs * shorts).abs() < 1e-12);
    }

    #[test]
    fn empty_selection_is_reported() {
        let err = DirectionLog
            .metric(&[1.0, 2.0], &[0.01, 0.02], ShortFilter::OnlyShorts)
            .unwrap_err();
        assert_eq!(err, ProfitError::EmptySelection);
    }

    #[test]
    fn accumulate_ends_at_metric() {
        let signal = [0.7, -0.1, 0.0, 1.5, -3.0];
        let returns = [0.01, 0.02, -0.01, -0.03, -0.02];

        let curve = DirectionLog
            .accumulate(&signal, &returns, ShortFilter::None)
            .unwrap();
        let metric = DirectionLog
            .metric(&signal, &returns, ShortFilter::None)
            .unwrap();

        assert_eq!(curve.len(), signal.len());
        assert!((curve[curve.len() - 1] - metric).abs() < 1e-12);
    }

    #[test]
    fn gradient_is_zero() {
        let grad = Direction
            .loss_gradient(&[1.0, -2.0], &[0.1, 0.2], ShortFilter::None)
            .unwrap();
        assert_eq!(grad, vec![0.0, 0.0]);
    }
}
