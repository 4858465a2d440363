pub mod loader;
pub mod reference;
pub mod series;

pub use loader::{load_all_splits, load_results, shard_path, LoaderError};
pub use reference::ReferenceTable;
pub use series::{ResultSeries, Split};
