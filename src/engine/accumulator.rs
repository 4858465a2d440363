use crate::error::{check_aligned, ProfitError, Result};
use crate::filter::ShortFilter;
use crate::strategy::resolver::{resolve, ConfigError, ResolvedStrategy};
use crate::strategy::{ReturnKind, Strategy};
use tracing::{debug, trace};

//running scalar of a streaming accumulator
//
//combining workers: Product states merge by arithmetic mean, Sum states
//merge by sum. Use reduce for more than two workers, pairwise merging of
//means is not associative
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum AccumulatorState {
    //product of linear growth factors, seeded at 1
    Product(f64),
    //sum of log-growth increments, seeded at 0
    Sum(f64),
}

impl AccumulatorState {
    pub fn initial(kind: ReturnKind) -> Self {
        match kind {
            ReturnKind::Linear => AccumulatorState::Product(1.0),
            ReturnKind::Log => AccumulatorState::Sum(0.0),
        }
    }

    pub fn value(&self) -> f64 {
        match self {
            AccumulatorState::Product(v) | AccumulatorState::Sum(v) => *v,
        }
    }

    pub fn return_kind(&self) -> ReturnKind {
        match self {
            AccumulatorState::Product(_) => ReturnKind::Linear,
            AccumulatorState::Sum(_) => ReturnKind::Log,
        }
    }

    fn label(&self) -> &'static str {
        match self {
            AccumulatorState::Product(_) => "product",
            AccumulatorState::Sum(_) => "sum",
        }
    }

    //folds one reduced batch into the state
    fn fold(self, batch: f64) -> Self {
        match self {
            AccumulatorState::Product(v) => AccumulatorState::Product(v * batch),
            AccumulatorState::Sum(v) => AccumulatorState::Sum(v + batch),
        }
    }

    //combines two worker states
    pub fn merge(self, other: AccumulatorState) -> Result<Self> {
        Self::reduce(&[self, other])
    }

    //combines any number of worker states: mean for Product, sum for Sum
    pub fn reduce(states: &[AccumulatorState]) -> Result<Self> {
        let first = states.first().ok_or(ProfitError::EmptySelection)?;

        if let Some(other) = states
            .iter()
            .find(|s| s.return_kind() != first.return_kind())
        {
            return Err(ProfitError::StateKindMismatch {
                left: first.label(),
                right: other.label(),
            });
        }

        let total: f64 = states.iter().map(|s| s.value()).sum();
        Ok(match first {
            AccumulatorState::Product(_) => AccumulatorState::Product(total / states.len() as f64),
            AccumulatorState::Sum(_) => AccumulatorState::Sum(total),
        })
    }
}

//folds per-batch strategy loss into one running scalar across a training run
//
//owned by a single training loop; workers each own an instance and are
//combined through AccumulatorState::reduce
#[derive(Debug)]
pub struct StreamingAccumulator {
    strategy: Box<dyn Strategy>,
    short_filter: ShortFilter,
    state: AccumulatorState,
    updates: usize,
}

impl StreamingAccumulator {
    //creates an accumulator for a strategy mode such as `tanhv2-ns`
    pub fn new(return_kind: ReturnKind, mode: &str) -> std::result::Result<Self, ConfigError> {
        Ok(Self::from_resolved(resolve(return_kind, mode)?))
    }

    pub fn from_resolved(resolved: ResolvedStrategy) -> Self {
        let state = AccumulatorState::initial(resolved.strategy.return_kind());
        StreamingAccumulator {
            strategy: resolved.strategy,
            short_filter: resolved.short_filter,
            state,
            updates: 0,
        }
    }

    //folds one batch of predictions and targets into the running state
    //
    //a batch whose rows are all removed by the short filter is rejected
    //with EmptySelection and leaves the state untouched
    pub fn update(&mut self, predictions: &[f64], targets: &[f64]) -> Result<()> {
        check_aligned(predictions.len(), targets.len())?;

        let contributions = self
            .strategy
            .loss(predictions, targets, self.short_filter)?;
        if contributions.is_empty() {
            debug!(
                rows = predictions.len(),
                short_filter = ?self.short_filter,
                "batch left no rows after short filter"
            );
            return Err(ProfitError::EmptySelection);
        }

        let batch = self.strategy.return_kind().reduce(&contributions);
        self.state = self.state.fold(batch);
        self.updates += 1;

        trace!(
            batch,
            state = self.state.value(),
            updates = self.updates,
            "accumulator updated"
        );

        Ok(())
    }

    //quantity to minimise: the negated running state
    pub fn compute(&self) -> f64 {
        -self.state.value()
    }

    pub fn state(&self) -> AccumulatorState {
        self.state
    }

    //number of batches folded since creation or the last reset
    pub fn updates(&self) -> usize {
        self.updates
    }

    pub fn strategy(&self) -> &dyn Strategy {
        self.strategy.as_ref()
    }

    pub fn short_filter(&self) -> ShortFilter {
        self.short_filter
    }

    pub fn reset(&mut self) {
        self.state = AccumulatorState::initial(self.strategy.return_kind());
        self.updates = 0;
    }

    //strategy name and short filter, e.g. "Tanh Partial V1 (all)"
    fn describe(&self) -> String {
        format!("{} ({})", self.strategy().name(), self.short_filter())
    }

    //merges another worker's state into this one, both workers must run the
    //same strategy under the same short filter
    pub fn merge_from(&mut self, other: &StreamingAccumulator) -> Result<()> {
        if self.strategy().kind() != other.strategy().kind()
            || self.short_filter() != other.short_filter()
        {
            return Err(ProfitError::StrategyMismatch {
                left: self.describe(),
                right: other.describe(),
            });
        }
        self.state = self.state.merge(other.state)?;
        self.updates += other.updates;
        Ok(())
    }
}
