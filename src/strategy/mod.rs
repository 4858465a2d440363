pub mod direction;
pub mod resolver;
pub mod tanh;

use crate::error::{check_aligned, ProfitError, Result};
use crate::filter::{apply_short_filter, ShortFilter};
use serde::{Deserialize, Serialize};
use std::fmt;

//kind of return series a strategy is bound to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReturnKind {
    //fractional price change, 0.01 == +1%
    Linear,
    //ln(1 + linear return)
    Log,
}

impl ReturnKind {
    //parse return kind from string
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "linear" | "pctchange" => Some(ReturnKind::Linear),
            "log" | "logpctchange" => Some(ReturnKind::Log),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ReturnKind::Linear => "linear",
            ReturnKind::Log => "log",
        }
    }

    //per-step contribution: a growth factor (linear) or a log-growth increment (log)
    pub fn contribution(&self, ret: f64, multiplier: f64) -> f64 {
        match self {
            ReturnKind::Linear => ret * multiplier + 1.0,
            ReturnKind::Log => ret * multiplier,
        }
    }

    //neutral element of the reduction
    pub fn identity(&self) -> f64 {
        match self {
            ReturnKind::Linear => 1.0,
            ReturnKind::Log => 0.0,
        }
    }

    pub fn fold(&self, acc: f64, contribution: f64) -> f64 {
        match self {
            ReturnKind::Linear => acc * contribution,
            ReturnKind::Log => acc + contribution,
        }
    }

    //product of growth factors or sum of log increments
    pub fn reduce(&self, contributions: &[f64]) -> f64 {
        contributions
            .iter()
            .fold(self.identity(), |acc, &c| self.fold(acc, c))
    }

    //converts a reduced value into a growth factor
    pub fn growth(&self, reduced: f64) -> f64 {
        match self {
            ReturnKind::Linear => reduced,
            ReturnKind::Log => reduced.exp(),
        }
    }
}

impl fmt::Display for ReturnKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

//the six strategy variants
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StrategyKind {
    Direction,
    DirectionLog,
    TanhPartial,
    TanhPartialV1,
    TanhPartialV2,
    TanhPartialV3,
}

impl StrategyKind {
    pub fn return_kind(&self) -> ReturnKind {
        match self {
            StrategyKind::Direction | StrategyKind::TanhPartial => ReturnKind::Linear,
            _ => ReturnKind::Log,
        }
    }
}

//interface implemented by all strategy variants
//
//a variant only maps the signal to a position multiplier (and its derivative);
//combining with the return, filtering and aggregating is shared and
//driven by the return kind the variant is bound to
pub trait Strategy: Send + Sync + fmt::Debug {
    //returns the strategy name
    fn name(&self) -> &'static str;

    fn kind(&self) -> StrategyKind;

    fn return_kind(&self) -> ReturnKind {
        self.kind().return_kind()
    }

    //position multiplier per step, computed over all rows
    fn multiplier(&self, signal: &[f64], returns: &[f64]) -> Result<Vec<f64>>;

    //d multiplier / d signal per step
    fn multiplier_derivative(&self, signal: &[f64], returns: &[f64]) -> Result<Vec<f64>>;

    //per-step contributions for the rows kept by the filter
    fn loss(&self, signal: &[f64], returns: &[f64], filter: ShortFilter) -> Result<Vec<f64>> {
        let kind = self.return_kind();
        let raw: Vec<f64> = self
            .multiplier(signal, returns)?
            .iter()
            .zip(returns.iter())
            .map(|(&m, &r)| kind.contribution(r, m))
            .collect();

        apply_short_filter(signal, &raw, filter)
    }

    //d loss_i / d signal_i for the same rows loss returns
    fn loss_gradient(
        &self,
        signal: &[f64],
        returns: &[f64],
        filter: ShortFilter,
    ) -> Result<Vec<f64>> {
        //both contribution forms are linear in the multiplier with slope r
        let raw: Vec<f64> = self
            .multiplier_derivative(signal, returns)?
            .iter()
            .zip(returns.iter())
            .map(|(&dm, &r)| r * dm)
            .collect();

        apply_short_filter(signal, &raw, filter)
    }

    //aggregate growth factor over the filtered rows
    fn metric(&self, signal: &[f64], returns: &[f64], filter: ShortFilter) -> Result<f64> {
        let contributions = self.loss(signal, returns, filter)?;
        if contributions.is_empty() {
            return Err(ProfitError::EmptySelection);
        }

        let kind = self.return_kind();
        Ok(kind.growth(kind.reduce(&contributions)))
    }

    //equity curve: cumulative growth factor, one value per filtered row
    fn accumulate(&self, signal: &[f64], returns: &[f64], filter: ShortFilter) -> Result<Vec<f64>> {
        let kind = self.return_kind();
        let mut acc = kind.identity();

        Ok(self
            .loss(signal, returns, filter)?
            .into_iter()
            .map(|c| {
                acc = kind.fold(acc, c);
                kind.growth(acc)
            })
            .collect())
    }
}

//shared helper for variants whose multiplier is a per-row function of (signal, return)
pub(crate) fn map_rows<F>(signal: &[f64], returns: &[f64], f: F) -> Result<Vec<f64>>
where
    F: Fn(f64, f64) -> f64,
{
    check_aligned(signal.len(), returns.len())?;
    Ok(signal
        .iter()
        .zip(returns.iter())
        .map(|(&s, &r)| f(s, r))
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_target_type_aliases() {
        assert_eq!(ReturnKind::parse("pctchange"), Some(ReturnKind::Linear));
        assert_eq!(ReturnKind::parse("LogPctChange"), Some(ReturnKind::Log));
        assert_eq!(ReturnKind::parse("diff"), None);
    }

    #[test]
    fn reductions_match_kind() {
        assert!((ReturnKind::Linear.reduce(&[1.1, 0.5]) - 0.55).abs() < 1e-12);
        assert!((ReturnKind::Log.reduce(&[0.1, -0.3]) + 0.2).abs() < 1e-12);
        assert_eq!(ReturnKind::Linear.reduce(&[]), 1.0);
        assert_eq!(ReturnKind::Log.reduce(&[]), 0.0);
    }
}
