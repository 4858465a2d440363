use crate::error::{check_aligned, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

//row selection by the sign of the signal
//rows where the signal is exactly zero are only kept by None
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum ShortFilter {
    #[default]
    None,
    ExcludeShorts,
    OnlyShorts,
}

impl ShortFilter {
    pub const ALL: [ShortFilter; 3] = [
        ShortFilter::None,
        ShortFilter::ExcludeShorts,
        ShortFilter::OnlyShorts,
    ];

    //parse the mode suffix (ns, os)
    pub fn parse(suffix: &str) -> Option<Self> {
        match suffix.to_lowercase().as_str() {
            "ns" => Some(ShortFilter::ExcludeShorts),
            "os" => Some(ShortFilter::OnlyShorts),
            _ => None,
        }
    }

    //suffix used in mode strings, none for the unfiltered case
    pub fn suffix(&self) -> Option<&'static str> {
        match self {
            ShortFilter::None => None,
            ShortFilter::ExcludeShorts => Some("ns"),
            ShortFilter::OnlyShorts => Some("os"),
        }
    }

    //whether a row with this signal value is selected
    pub fn keeps(&self, signal: f64) -> bool {
        match self {
            ShortFilter::None => true,
            ShortFilter::ExcludeShorts => signal > 0.0,
            ShortFilter::OnlyShorts => signal < 0.0,
        }
    }
}

impl fmt::Display for ShortFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ShortFilter::None => write!(f, "all"),
            ShortFilter::ExcludeShorts => write!(f, "no shorts"),
            ShortFilter::OnlyShorts => write!(f, "only shorts"),
        }
    }
}

//restricts values to the rows selected by the filter
//selection is by index so excluded rows never reach a reduction
pub fn apply_short_filter<T: Clone>(
    signal: &[f64],
    values: &[T],
    filter: ShortFilter,
) -> Result<Vec<T>> {
    check_aligned(signal.len(), values.len())?;

    if filter == ShortFilter::None {
        return Ok(values.to_vec());
    }

    Ok(signal
        .iter()
        .zip(values.iter())
        .filter(|(&s, _)| filter.keeps(s))
        .map(|(_, v)| v.clone())
        .collect())
}
