use crate::error::{check_aligned, ProfitError, Result};
use crate::filter::{apply_threshold, direction_agreement, ShortFilter};
use crate::strategy::direction::{Direction, DirectionLog};
use crate::strategy::tanh::{TanhPartialV1, TanhPartialV2};
use crate::strategy::{ReturnKind, Strategy};
use indexmap::IndexMap;
use prettytable::{Cell, Row, Table};
use serde::{Deserialize, Serialize};
use tracing::debug;

//profit factor of one strategy under each short filter
//none means the filter left no rows
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ProfitByFilter {
    pub all: Option<f64>,
    pub exclude_shorts: Option<f64>,
    pub only_shorts: Option<f64>,
}

impl ProfitByFilter {
    fn compute(strategy: &dyn Strategy, signal: &[f64], returns: &[f64]) -> Result<Self> {
        Ok(ProfitByFilter {
            all: optional(strategy.metric(signal, returns, ShortFilter::None))?,
            exclude_shorts: optional(strategy.metric(signal, returns, ShortFilter::ExcludeShorts))?,
            only_shorts: optional(strategy.metric(signal, returns, ShortFilter::OnlyShorts))?,
        })
    }

    pub fn get(&self, filter: ShortFilter) -> Option<f64> {
        match filter {
            ShortFilter::None => self.all,
            ShortFilter::ExcludeShorts => self.exclude_shorts,
            ShortFilter::OnlyShorts => self.only_shorts,
        }
    }
}

//fraction of all rows that did not count under each short filter
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ExclusionByFilter {
    pub all: f64,
    pub exclude_shorts: f64,
    pub only_shorts: f64,
}

//evaluation metrics for one (prediction, true) pair
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricsReport {
    pub return_kind: ReturnKind,
    pub threshold: f64,
    pub rows: usize,
    pub rows_kept: usize,
    pub direction: ProfitByFilter,
    pub tanh_v1: ProfitByFilter,
    pub tanh_v2: ProfitByFilter,
    pub pct_excluded: ExclusionByFilter,
    pub pct_direction_correct: Option<f64>,
    //direction profit with perfect foreknowledge of the return
    pub optimal_profit: Option<f64>,
}

//an empty selection becomes none, any other error propagates
fn optional(result: Result<f64>) -> Result<Option<f64>> {
    match result {
        Ok(value) => Ok(Some(value)),
        Err(ProfitError::EmptySelection) => Ok(None),
        Err(err) => Err(err),
    }
}

//pct_profit_dir, pct_profit_dir_nshort, pct_profit_dir_oshort
fn metric_key(prefix: &str, filter: ShortFilter) -> String {
    match filter {
        ShortFilter::None => prefix.to_string(),
        ShortFilter::ExcludeShorts => format!("{}_nshort", prefix),
        ShortFilter::OnlyShorts => format!("{}_oshort", prefix),
    }
}

fn fmt_optional(value: Option<f64>) -> String {
    value
        .map(|v| format!("{:.5}", v))
        .unwrap_or_else(|| "n/a".to_string())
}

impl MetricsReport {
    //computes all metrics after dropping rows with |signal| < threshold
    //
    //direction uses the variant matching the return kind; the tanh partial
    //variants are log strategies, so linear returns are converted with ln(1 + r)
    pub fn compute(
        return_kind: ReturnKind,
        signal: &[f64],
        returns: &[f64],
        threshold: f64,
    ) -> Result<Self> {
        check_aligned(signal.len(), returns.len())?;
        if signal.is_empty() {
            return Err(ProfitError::EmptySelection);
        }

        let (signal_f, returns_f) = apply_threshold(signal, returns, threshold)?;

        let rows = signal.len();
        let rows_kept = signal_f.len();
        let longs = signal_f.iter().filter(|&&s| s > 0.0).count();
        let shorts = signal_f.iter().filter(|&&s| s < 0.0).count();

        debug!(
            rows,
            rows_kept,
            longs,
            shorts,
            threshold,
            "computing metrics"
        );

        let direction: &dyn Strategy = match return_kind {
            ReturnKind::Linear => &Direction,
            ReturnKind::Log => &DirectionLog,
        };

        let log_returns: Vec<f64> = match return_kind {
            ReturnKind::Linear => returns_f.iter().map(|r| r.ln_1p()).collect(),
            ReturnKind::Log => returns_f.clone(),
        };

        let pct_excluded = ExclusionByFilter {
            all: (rows - rows_kept) as f64 / rows as f64,
            exclude_shorts: (rows - longs) as f64 / rows as f64,
            only_shorts: (rows - shorts) as f64 / rows as f64,
        };

        Ok(MetricsReport {
            return_kind,
            threshold,
            rows,
            rows_kept,
            direction: ProfitByFilter::compute(direction, &signal_f, &returns_f)?,
            tanh_v1: ProfitByFilter::compute(&TanhPartialV1, &signal_f, &log_returns)?,
            tanh_v2: ProfitByFilter::compute(&TanhPartialV2, &signal_f, &log_returns)?,
            pct_excluded,
            pct_direction_correct: optional(direction_agreement(&signal_f, &returns_f))?,
            optimal_profit: optional(direction.metric(&returns_f, &returns_f, ShortFilter::None))?,
        })
    }

    //flat mapping with stable metric names
    pub fn to_map(&self) -> IndexMap<String, Option<f64>> {
        let mut map = IndexMap::new();

        for (prefix, profit) in [
            ("pct_profit_dir", &self.direction),
            ("pct_profit_tanhv1", &self.tanh_v1),
            ("pct_profit_tanhv2", &self.tanh_v2),
        ] {
            for filter in ShortFilter::ALL {
                map.insert(metric_key(prefix, filter), profit.get(filter));
            }
        }

        map.insert("pct_excluded".to_string(), Some(self.pct_excluded.all));
        map.insert(
            "pct_excluded_nshort".to_string(),
            Some(self.pct_excluded.exclude_shorts),
        );
        map.insert(
            "pct_excluded_oshort".to_string(),
            Some(self.pct_excluded.only_shorts),
        );
        map.insert("pct_dir_correct".to_string(), self.pct_direction_correct);
        map.insert("pct_profit_dir_opt".to_string(), self.optimal_profit);

        map
    }

    //prints metrics in a formatted table
    pub fn pretty_print_table(&self) {
        let mut table = Table::new();

        table.add_row(Row::new(vec![
            Cell::new("Strategy"),
            Cell::new("All"),
            Cell::new("No Shorts"),
            Cell::new("Only Shorts"),
        ]));

        for (name, profit) in [
            ("Direction", &self.direction),
            ("Tanh V1", &self.tanh_v1),
            ("Tanh V2", &self.tanh_v2),
        ] {
            let mut cells = vec![Cell::new(name)];
            for filter in ShortFilter::ALL {
                cells.push(Cell::new(&fmt_optional(profit.get(filter))));
            }
            table.add_row(Row::new(cells));
        }

        table.add_row(Row::new(vec![
            Cell::new("Excluded"),
            Cell::new(&format!("{:.2}%", self.pct_excluded.all * 100.0)),
            Cell::new(&format!("{:.2}%", self.pct_excluded.exclude_shorts * 100.0)),
            Cell::new(&format!("{:.2}%", self.pct_excluded.only_shorts * 100.0)),
        ]));

        table.printstd();

        let mut summary = Table::new();
        summary.add_row(Row::new(vec![Cell::new("Metric"), Cell::new("Value")]));

        summary.add_row(Row::new(vec![
            Cell::new("Rows"),
            Cell::new(&format!("{} ({} kept)", self.rows, self.rows_kept)),
        ]));

        summary.add_row(Row::new(vec![
            Cell::new("Threshold"),
            Cell::new(&format!("{}", self.threshold)),
        ]));

        summary.add_row(Row::new(vec![
            Cell::new("Direction Correct"),
            Cell::new(
                &self
                    .pct_direction_correct
                    .map(|v| format!("{:.2}%", v * 100.0))
                    .unwrap_or_else(|| "n/a".to_string()),
            ),
        ]));

        summary.add_row(Row::new(vec![
            Cell::new("Optimal Profit"),
            Cell::new(&fmt_optional(self.optimal_profit)),
        ]));

        summary.printstd();
    }
}
