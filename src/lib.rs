//trading-strategy profit losses, metrics and equity curves for model signals

pub mod config;
pub mod data;
pub mod engine;
pub mod error;
pub mod filter;
pub mod metrics;
pub mod strategy;

//prelude module for convenient imports
pub mod prelude {
    pub use crate::config::{EvaluationConfiguration, ReferenceConfig, TrainingConfig};
    pub use crate::data::{load_all_splits, load_results, ReferenceTable, ResultSeries, Split};
    pub use crate::engine::{AccumulatorState, StreamingAccumulator};
    pub use crate::error::ProfitError;
    pub use crate::filter::{
        apply_short_filter, apply_threshold, direction_agreement, ShortFilter,
    };
    pub use crate::metrics::{
        calculate_equity_curve, strategy_equity_curve, CurveSummary, EquityPoint, MetricsReport,
    };
    pub use crate::strategy::resolver::{resolve, resolve_str, ConfigError, ResolvedStrategy};
    pub use crate::strategy::tanh::min_bound;
    pub use crate::strategy::{ReturnKind, Strategy, StrategyKind};
}
