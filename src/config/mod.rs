pub mod evaluation_config;

pub use evaluation_config::{EvaluationConfiguration, ReferenceConfig, TrainingConfig};
