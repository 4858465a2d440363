pub mod report;
pub mod timeseries;

pub use report::{ExclusionByFilter, MetricsReport, ProfitByFilter};
pub use timeseries::{calculate_equity_curve, strategy_equity_curve, CurveSummary, EquityPoint};
