use crate::strategy::resolver::{resolve, ConfigError, ResolvedStrategy};
use crate::strategy::ReturnKind;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

//settings of the training run that produced the results
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrainingConfig {
    //loss name used during training (eg mse, stock)
    pub loss: String,

    //whether outputs were inverse-transformed before being written
    pub inverse_output: bool,
}

impl Default for TrainingConfig {
    fn default() -> Self {
        TrainingConfig {
            loss: "mse".to_string(),
            inverse_output: false,
        }
    }
}

impl TrainingConfig {
    //trues written by an mse run without inverse output already carry full
    //precision, every other run needs them restored from the reference table
    pub fn needs_precision_override(&self) -> bool {
        !(self.loss.to_lowercase().contains("mse") && !self.inverse_output)
    }
}

//reference table holding the full precision target column
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReferenceConfig {
    pub path: PathBuf,
    pub column: String,
}

//complete evaluation configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvaluationConfiguration {
    //experiment directory containing results/<split>_<index>.csv
    pub log_dir: PathBuf,

    //return kind of the true column
    pub return_kind: ReturnKind,

    //strategy mode used for equity curves (eg dir, tanhv2-ns)
    pub mode: String,

    //minimum |signal| for a row to count in evaluation
    pub threshold: f64,

    #[serde(default)]
    pub training: TrainingConfig,

    #[serde(default)]
    pub reference: Option<ReferenceConfig>,

    //optional output paths
    #[serde(default)]
    pub output_equity_csv: Option<PathBuf>,
    #[serde(default)]
    pub output_report_json: Option<PathBuf>,
}

impl Default for EvaluationConfiguration {
    fn default() -> Self {
        EvaluationConfiguration {
            log_dir: PathBuf::from("."),
            return_kind: ReturnKind::Log,
            mode: "dir".to_string(),
            threshold: 0.0,
            training: TrainingConfig::default(),
            reference: None,
            output_equity_csv: None,
            output_report_json: None,
        }
    }
}

impl EvaluationConfiguration {
    //load configuration from a JSON file
    pub fn from_json_file(path: &PathBuf) -> anyhow::Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        let config: EvaluationConfiguration = serde_json::from_str(&contents)?;
        Ok(config)
    }

    //save configuration to a JSON file
    pub fn to_json_file(&self, path: &PathBuf) -> anyhow::Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        Ok(())
    }

    //resolves the configured strategy mode
    pub fn strategy(&self) -> Result<ResolvedStrategy, ConfigError> {
        resolve(self.return_kind, &self.mode)
    }

    //the reference table to apply, if any
    pub fn precision_override(&self) -> Option<&ReferenceConfig> {
        if self.training.needs_precision_override() {
            self.reference.as_ref()
        } else {
            None
        }
    }
}
