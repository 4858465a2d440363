use crate::error::{check_aligned, Result};
use crate::filter::{apply_short_filter, apply_threshold, ShortFilter};
use crate::strategy::Strategy;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use statrs::statistics::Statistics;

//a point in the equity curve, equity is a growth factor starting from 1
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EquityPoint {
    pub timestamp: DateTime<Utc>,
    pub equity: f64,
    pub drawdown: f64,
    pub returns: f64,
}

impl EquityPoint {
    pub fn new(timestamp: DateTime<Utc>, equity: f64, drawdown: f64, returns: f64) -> Self {
        EquityPoint {
            timestamp,
            equity,
            drawdown,
            returns,
        }
    }
}

//calculates the equity curve with drawdowns
pub fn calculate_equity_curve(
    timestamps: &[DateTime<Utc>],
    equity_values: &[f64],
) -> Result<Vec<EquityPoint>> {
    check_aligned(timestamps.len(), equity_values.len())?;

    let mut curve = Vec::with_capacity(timestamps.len());
    let mut peak = 1.0_f64;
    let mut prev_equity = 1.0_f64;

    for (&timestamp, &equity) in timestamps.iter().zip(equity_values.iter()) {
        //update peak
        if equity > peak {
            peak = equity;
        }

        //calculate drawdown
        let drawdown = if peak > 0.0 {
            (peak - equity) / peak
        } else {
            0.0
        };

        //a wiped out curve stays at zero, it has no further period return
        let returns = if prev_equity != 0.0 {
            (equity - prev_equity) / prev_equity
        } else {
            0.0
        };

        curve.push(EquityPoint::new(timestamp, equity, drawdown, returns));
        prev_equity = equity;
    }

    Ok(curve)
}

//equity curve of a strategy over evaluation rows
//
//rows are thresholded and short filtered the same way the metrics are,
//timestamps follow the rows that survive
pub fn strategy_equity_curve(
    strategy: &dyn Strategy,
    filter: ShortFilter,
    timestamps: &[DateTime<Utc>],
    signal: &[f64],
    returns: &[f64],
    threshold: f64,
) -> Result<Vec<EquityPoint>> {
    check_aligned(signal.len(), returns.len())?;
    check_aligned(signal.len(), timestamps.len())?;

    let rows: Vec<(f64, DateTime<Utc>)> = returns
        .iter()
        .copied()
        .zip(timestamps.iter().copied())
        .collect();
    let (signal_f, rows_f) = apply_threshold(signal, &rows, threshold)?;
    let (returns_f, timestamps_f): (Vec<f64>, Vec<DateTime<Utc>>) = rows_f.into_iter().unzip();

    let equity = strategy.accumulate(&signal_f, &returns_f, filter)?;
    let kept_timestamps = apply_short_filter(&signal_f, &timestamps_f, filter)?;

    calculate_equity_curve(&kept_timestamps, &equity)
}

//calculates maximum drawdown from equity curve
pub fn max_drawdown(equity_curve: &[EquityPoint]) -> f64 {
    equity_curve
        .iter()
        .map(|point| point.drawdown)
        .fold(0.0, f64::max)
}

//summary statistics of an equity curve
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CurveSummary {
    pub periods: usize,
    pub final_equity: f64,
    pub max_drawdown: f64,
    pub mean_return: f64,
    pub return_std_dev: f64,
}

impl CurveSummary {
    pub fn from_curve(curve: &[EquityPoint]) -> Self {
        let returns: Vec<f64> = curve.iter().map(|p| p.returns).collect();

        let mean_return = if returns.is_empty() {
            0.0
        } else {
            returns.iter().mean()
        };

        //sample deviation needs two points
        let return_std_dev = if returns.len() < 2 {
            0.0
        } else {
            returns.iter().std_dev()
        };

        CurveSummary {
            periods: curve.len(),
            final_equity: curve.last().map(|p| p.equity).unwrap_or(1.0),
            max_drawdown: max_drawdown(curve),
            mean_return,
            return_std_dev,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::strategy::direction::Direction;
    use chrono::TimeZone;

    fn ts(day: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, day, 0, 0, 0).unwrap()
    }

    #[test]
    fn drawdown_tracks_peak() {
        let curve = calculate_equity_curve(&[ts(1), ts(2), ts(3)], &[1.1, 0.99, 1.2]).unwrap();

        assert!((curve[0].returns - 0.1).abs() < 1e-12);
        assert_eq!(curve[0].drawdown, 0.0);
        assert!((curve[1].drawdown - 0.1).abs() < 1e-12);
        assert_eq!(curve[2].drawdown, 0.0);
        assert!((max_drawdown(&curve) - 0.1).abs() < 1e-12);
    }

    #[test]
    fn strategy_curve_follows_filtered_rows() {
        let timestamps = [ts(1), ts(2), ts(3), ts(4)];
        let signal = [1.0, -1.0, 0.0001, 0.5];
        let returns = [0.02, -0.01, 0.5, 0.03];

        let curve = strategy_equity_curve(
            &Direction,
            ShortFilter::ExcludeShorts,
            &timestamps,
            &signal,
            &returns,
            0.001,
        )
        .unwrap();

        let stamps: Vec<_> = curve.iter().map(|p| p.timestamp).collect();
        assert_eq!(stamps, vec![ts(1), ts(4)]);
        assert!((curve[1].equity - 1.02 * 1.03).abs() < 1e-12);
    }

    #[test]
    fn summary_of_known_curve() {
        let curve = calculate_equity_curve(&[ts(1), ts(2)], &[1.1, 1.21]).unwrap();
        let summary = CurveSummary::from_curve(&curve);

        assert_eq!(summary.periods, 2);
        assert!((summary.final_equity - 1.21).abs() < 1e-12);
        assert!((summary.mean_return - 0.1).abs() < 1e-12);
        assert!(summary.return_std_dev.abs() < 1e-12);
        assert_eq!(summary.max_drawdown, 0.0);
    }

    #[test]
    fn wiped_out_curve_stays_finite() {
        //a full long position into a -100% return ruins the curve
        let curve = strategy_equity_curve(
            &Direction,
            ShortFilter::None,
            &[ts(1), ts(2), ts(3)],
            &[1.0, 1.0, -1.0],
            &[-1.0, 0.05, 0.02],
            0.0,
        )
        .unwrap();

        let returns: Vec<f64> = curve.iter().map(|p| p.returns).collect();
        assert_eq!(returns, vec![-1.0, 0.0, 0.0]);
        assert_eq!(curve[2].equity, 0.0);
        assert_eq!(curve[2].drawdown, 1.0);

        let summary = CurveSummary::from_curve(&curve);
        assert!(summary.mean_return.is_finite());
        assert!(summary.return_std_dev.is_finite());
        assert!((summary.mean_return + 1.0 / 3.0).abs() < 1e-12);
    }

    #[test]
    fn empty_curve_summary_is_neutral() {
        let summary = CurveSummary::from_curve(&[]);
        assert_eq!(summary.periods, 0);
        assert_eq!(summary.final_equity, 1.0);
        assert_eq!(summary.mean_return, 0.0);
    }
}
