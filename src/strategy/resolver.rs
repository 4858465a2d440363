use crate::filter::ShortFilter;
use crate::strategy::direction::{Direction, DirectionLog};
use crate::strategy::tanh::{TanhPartial, TanhPartialV1, TanhPartialV2, TanhPartialV3};
use crate::strategy::{ReturnKind, Strategy, StrategyKind};
use thiserror::Error;
use tracing::debug;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    #[error("Invalid return kind: {0}")]
    UnknownReturnKind(String),
    #[error("Invalid strategy algorithm: {0}")]
    UnknownAlgorithm(String),
    #[error("Invalid short filter suffix: {0} (expected ns or os)")]
    UnknownShortSuffix(String),
    #[error("Malformed strategy mode: {0}")]
    MalformedMode(String),
    #[error("Algorithm {algorithm} requires {required} returns, got {found}")]
    ReturnKindMismatch {
        algorithm: String,
        required: ReturnKind,
        found: ReturnKind,
    },
}

//a strategy variant together with the short filter its mode asked for
#[derive(Debug)]
pub struct ResolvedStrategy {
    pub strategy: Box<dyn Strategy>,
    pub short_filter: ShortFilter,
}

//creates the strategy instance for a variant
pub fn create_strategy(kind: StrategyKind) -> Box<dyn Strategy> {
    match kind {
        StrategyKind::Direction => Box::new(Direction),
        StrategyKind::DirectionLog => Box::new(DirectionLog),
        StrategyKind::TanhPartial => Box::new(TanhPartial),
        StrategyKind::TanhPartialV1 => Box::new(TanhPartialV1),
        StrategyKind::TanhPartialV2 => Box::new(TanhPartialV2),
        StrategyKind::TanhPartialV3 => Box::new(TanhPartialV3),
    }
}

//maps an algorithm token to a variant, checking the return kind it needs
pub fn resolve_kind(return_kind: ReturnKind, algorithm: &str) -> Result<StrategyKind, ConfigError> {
    let kind = match algorithm {
        "dir" => match return_kind {
            ReturnKind::Linear => StrategyKind::Direction,
            ReturnKind::Log => StrategyKind::DirectionLog,
        },
        "tanh" => StrategyKind::TanhPartial,
        "tanhv1" => StrategyKind::TanhPartialV1,
        "tanhv2" => StrategyKind::TanhPartialV2,
        "tanhv3" => StrategyKind::TanhPartialV3,
        other => return Err(ConfigError::UnknownAlgorithm(other.to_string())),
    };

    if kind.return_kind() != return_kind {
        return Err(ConfigError::ReturnKindMismatch {
            algorithm: algorithm.to_string(),
            required: kind.return_kind(),
            found: return_kind,
        });
    }

    Ok(kind)
}

//parses the short filter from a mode string (`<algorithm>[-<ns|os>]`)
pub fn short_filter_for(mode: &str) -> Result<ShortFilter, ConfigError> {
    let parts: Vec<&str> = mode.split('-').collect();
    match parts.as_slice() {
        [_] => Ok(ShortFilter::None),
        [_, suffix] => ShortFilter::parse(suffix)
            .ok_or_else(|| ConfigError::UnknownShortSuffix(suffix.to_string())),
        _ => Err(ConfigError::MalformedMode(mode.to_string())),
    }
}

//resolves a strategy mode such as `tanhv2-ns` for the given return kind
pub fn resolve(return_kind: ReturnKind, mode: &str) -> Result<ResolvedStrategy, ConfigError> {
    let mode = mode.trim().to_lowercase();
    let short_filter = short_filter_for(&mode)?;
    let algorithm = mode.split('-').next().unwrap_or_default();
    let kind = resolve_kind(return_kind, algorithm)?;

    debug!(
        mode = %mode,
        return_kind = %return_kind,
        strategy = ?kind,
        short_filter = ?short_filter,
        "resolved strategy"
    );

    Ok(ResolvedStrategy {
        strategy: create_strategy(kind),
        short_filter,
    })
}

//same as resolve, with the return kind given as a string
pub fn resolve_str(return_kind: &str, mode: &str) -> Result<ResolvedStrategy, ConfigError> {
    let return_kind = ReturnKind::parse(return_kind)
        .ok_or_else(|| ConfigError::UnknownReturnKind(return_kind.to_string()))?;
    resolve(return_kind, mode)
}
