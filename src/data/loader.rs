use crate::data::series::{ResultSeries, Split};
use chrono::{DateTime, Utc};
use csv::ReaderBuilder;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info};

#[derive(Error, Debug)]
pub enum LoaderError {
    #[error("Failed to read CSV file {path:?}: {source}")]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },
    #[error("Failed to parse timestamp '{value}' at {path:?} line {line}: {source}")]
    Timestamp {
        path: PathBuf,
        line: usize,
        value: String,
        #[source]
        source: chrono::ParseError,
    },
    #[error("Failed to parse value '{value}' at {path:?} line {line}")]
    Value {
        path: PathBuf,
        line: usize,
        value: String,
    },
    #[error("Column '{column}' not found in {path:?}")]
    MissingColumn { path: PathBuf, column: String },
    #[error("No reference value for timestamp {0}")]
    MissingReference(DateTime<Utc>),
}

#[derive(Debug, Deserialize)]
struct ShardRecord {
    timestamp: String,
    pred: f64,
    #[serde(rename = "true")]
    truth: f64,
}

//path of one result shard: `<log_dir>/results/<split>_<index>.csv`
pub fn shard_path(log_dir: &Path, split: Split, index: usize) -> PathBuf {
    log_dir
        .join("results")
        .join(format!("{}_{}.csv", split.as_str(), index))
}

//loads a single shard
fn load_shard(path: &Path) -> Result<ResultSeries, LoaderError> {
    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .from_path(path)
        .map_err(|source| LoaderError::Csv {
            path: path.to_path_buf(),
            source,
        })?;

    let mut series = ResultSeries::new();

    for (index, result) in reader.deserialize().enumerate() {
        let record: ShardRecord = result.map_err(|source| LoaderError::Csv {
            path: path.to_path_buf(),
            source,
        })?;

        //parse timestamp
        let timestamp = DateTime::parse_from_rfc3339(&record.timestamp)
            .map_err(|source| LoaderError::Timestamp {
                path: path.to_path_buf(),
                line: index + 2,
                value: record.timestamp.clone(),
                source,
            })?
            .with_timezone(&Utc);

        series.push(timestamp, record.pred, record.truth);
    }

    Ok(series)
}

//loads every shard of a split
//
//shards are numbered from 0 with no known count; scanning stops at the
//first missing index. the concatenation is sorted by timestamp
pub fn load_results(log_dir: &Path, split: Split) -> Result<ResultSeries, LoaderError> {
    let mut series = ResultSeries::new();
    let mut index = 0;

    loop {
        let path = shard_path(log_dir, split, index);
        if !path.exists() {
            break;
        }

        let shard = load_shard(&path)?;
        debug!(path = %path.display(), rows = shard.len(), "loaded result shard");
        series.extend(shard);
        index += 1;
    }

    series.sort_by_timestamp();

    info!(
        split = %split,
        shards = index,
        rows = series.len(),
        "loaded results"
    );

    Ok(series)
}

//loads train, val and test, skipping splits without shards
pub fn load_all_splits(log_dir: &Path) -> Result<Vec<(Split, ResultSeries)>, LoaderError> {
    let mut splits = Vec::new();
    for split in Split::ALL {
        let series = load_results(log_dir, split)?;
        if !series.is_empty() {
            splits.push((split, series));
        }
    }
    Ok(splits)
}
