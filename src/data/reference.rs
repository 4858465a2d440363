use crate::data::loader::LoaderError;
use crate::data::series::ResultSeries;
use chrono::{DateTime, Utc};
use csv::ReaderBuilder;
use std::collections::HashMap;
use std::path::Path;
use tracing::info;

//higher precision target values keyed by timestamp
//
//result shards are written at reduced precision; this table restores the
//original target column before metrics are computed
#[derive(Debug, Clone, Default)]
pub struct ReferenceTable {
    pub column: String,
    values: HashMap<DateTime<Utc>, f64>,
}

impl ReferenceTable {
    pub fn from_pairs(
        column: impl Into<String>,
        pairs: impl IntoIterator<Item = (DateTime<Utc>, f64)>,
    ) -> Self {
        ReferenceTable {
            column: column.into(),
            values: pairs.into_iter().collect(),
        }
    }

    //loads `column` from a csv file with a `timestamp` column
    pub fn load<P: AsRef<Path>>(path: P, column: &str) -> Result<Self, LoaderError> {
        let path = path.as_ref();
        let mut reader = ReaderBuilder::new()
            .has_headers(true)
            .from_path(path)
            .map_err(|source| LoaderError::Csv {
                path: path.to_path_buf(),
                source,
            })?;

        let headers = reader
            .headers()
            .map_err(|source| LoaderError::Csv {
                path: path.to_path_buf(),
                source,
            })?
            .clone();

        let find = |name: &str| {
            headers
                .iter()
                .position(|h| h == name)
                .ok_or_else(|| LoaderError::MissingColumn {
                    path: path.to_path_buf(),
                    column: name.to_string(),
                })
        };
        let ts_idx = find("timestamp")?;
        let value_idx = find(column)?;

        let mut values = HashMap::new();
        for (index, record) in reader.records().enumerate() {
            let record = record.map_err(|source| LoaderError::Csv {
                path: path.to_path_buf(),
                source,
            })?;
            let line = index + 2;

            let raw_ts = record.get(ts_idx).unwrap_or_default();
            let timestamp = DateTime::parse_from_rfc3339(raw_ts)
                .map_err(|source| LoaderError::Timestamp {
                    path: path.to_path_buf(),
                    line,
                    value: raw_ts.to_string(),
                    source,
                })?
                .with_timezone(&Utc);

            let raw_value = record.get(value_idx).unwrap_or_default();
            let value: f64 = raw_value.trim().parse().map_err(|_| LoaderError::Value {
                path: path.to_path_buf(),
                line,
                value: raw_value.to_string(),
            })?;

            values.insert(timestamp, value);
        }

        info!(
            path = %path.display(),
            column,
            rows = values.len(),
            "loaded reference table"
        );

        Ok(ReferenceTable {
            column: column.to_string(),
            values,
        })
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn get(&self, timestamp: &DateTime<Utc>) -> Option<f64> {
        self.values.get(timestamp).copied()
    }

    //replaces the loaded trues with the reference values for the same timestamps
    pub fn override_trues(&self, series: &mut ResultSeries) -> Result<(), LoaderError> {
        let trues = series
            .timestamps
            .iter()
            .map(|ts| self.get(ts).ok_or(LoaderError::MissingReference(*ts)))
            .collect::<Result<Vec<f64>, LoaderError>>()?;

        series.trues = trues;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use std::io::Write;

    fn ts(day: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, day, 0, 0, 0).unwrap()
    }

    #[test]
    fn override_replaces_trues_by_timestamp() {
        let table = ReferenceTable::from_pairs("close", vec![(ts(1), 0.0123456789), (ts(2), -0.5)]);

        let mut series = ResultSeries::new();
        series.push(ts(2), 1.0, -0.49);
        series.push(ts(1), -1.0, 0.0123);

        table.override_trues(&mut series).unwrap();
        assert_eq!(series.trues, vec![-0.5, 0.0123456789]);
        assert_eq!(series.predictions, vec![1.0, -1.0]);
    }

    #[test]
    fn missing_timestamp_is_an_error() {
        let table = ReferenceTable::from_pairs("close", vec![(ts(1), 0.1)]);
        let mut series = ResultSeries::new();
        series.push(ts(5), 1.0, 0.2);

        assert!(matches!(
            table.override_trues(&mut series),
            Err(LoaderError::MissingReference(t)) if t == ts(5)
        ));
        assert_eq!(series.trues, vec![0.2]);
    }

    #[test]
    fn loads_named_column() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "timestamp,open,close_logpctchange").unwrap();
        writeln!(file, "2024-03-01T00:00:00Z,100.0,0.001234567").unwrap();
        writeln!(file, "2024-03-02T00:00:00Z,101.0,-0.000987654").unwrap();
        file.flush().unwrap();

        let table = ReferenceTable::load(file.path(), "close_logpctchange").unwrap();
        assert_eq!(table.len(), 2);
        assert_eq!(table.get(&ts(2)), Some(-0.000987654));

        assert!(matches!(
            ReferenceTable::load(file.path(), "volume"),
            Err(LoaderError::MissingColumn { .. })
        ));
    }
}
