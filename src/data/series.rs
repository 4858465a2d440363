use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

//dataset split a result shard belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Split {
    Train,
    Val,
    Test,
}

impl Split {
    pub const ALL: [Split; 3] = [Split::Train, Split::Val, Split::Test];

    pub fn as_str(&self) -> &'static str {
        match self {
            Split::Train => "train",
            Split::Val => "val",
            Split::Test => "test",
        }
    }

    //parse split from string
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "train" => Some(Split::Train),
            "val" | "validation" => Some(Split::Val),
            "test" => Some(Split::Test),
            _ => None,
        }
    }
}

impl fmt::Display for Split {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

//model predictions and observed returns for one split, aligned by index
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResultSeries {
    pub timestamps: Vec<DateTime<Utc>>,
    pub predictions: Vec<f64>,
    pub trues: Vec<f64>,
}

impl ResultSeries {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.timestamps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.timestamps.is_empty()
    }

    pub fn push(&mut self, timestamp: DateTime<Utc>, prediction: f64, truth: f64) {
        self.timestamps.push(timestamp);
        self.predictions.push(prediction);
        self.trues.push(truth);
    }

    //appends another shard
    pub fn extend(&mut self, other: ResultSeries) {
        self.timestamps.extend(other.timestamps);
        self.predictions.extend(other.predictions);
        self.trues.extend(other.trues);
    }

    //reorders all three columns by timestamp
    pub fn sort_by_timestamp(&mut self) {
        let mut order: Vec<usize> = (0..self.len()).collect();
        order.sort_by_key(|&i| self.timestamps[i]);

        self.timestamps = order.iter().map(|&i| self.timestamps[i]).collect();
        self.predictions = order.iter().map(|&i| self.predictions[i]).collect();
        self.trues = order.iter().map(|&i| self.trues[i]).collect();
    }
}
