//! `equitas.toml` analysis configuration.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use equitas_metrics::{AnalysisRequest, DEFAULT_THRESHOLD};
use equitas_table::Value;
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const DEFAULT_CONFIG_FILE: &str = "equitas.toml";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read '{}': {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("invalid configuration: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("missing required setting '{0}'")]
    Missing(&'static str),
    #[error("'{key}' cannot be of type {found}")]
    UnsupportedValue { key: &'static str, found: String },
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    #[serde(default)]
    pub dataset: DatasetSection,
    #[serde(default)]
    pub analysis: AnalysisSection,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct DatasetSection {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<PathBuf>,
}

/// Analysis settings. Every field is optional so that a file and the
/// command line can each supply part of them.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct AnalysisSection {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub sensitive: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_value: Option<toml::Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub threshold: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub control: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prediction: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub normalize_target: Option<bool>,
}

impl AnalysisSection {
    /// Overwrite every setting that `other` provides.
    pub fn overlay(&mut self, other: AnalysisSection) {
        if !other.sensitive.is_empty() {
            self.sensitive = other.sensitive;
        }
        self.target = other.target.or(self.target.take());
        self.target_value = other.target_value.or(self.target_value.take());
        self.threshold = other.threshold.or(self.threshold);
        self.control = other.control.or(self.control.take());
        self.prediction = other.prediction.or(self.prediction.take());
        self.normalize_target = other.normalize_target.or(self.normalize_target);
    }

    pub fn into_request(self) -> Result<AnalysisRequest, ConfigError> {
        if self.sensitive.is_empty() {
            return Err(ConfigError::Missing("sensitive"));
        }
        let target = self.target.ok_or(ConfigError::Missing("target"))?;
        let target_value = self
            .target_value
            .ok_or(ConfigError::Missing("target_value"))
            .and_then(toml_to_value)?;

        let mut request = AnalysisRequest::new(self.sensitive, target, target_value)
            .with_threshold(self.threshold.unwrap_or(DEFAULT_THRESHOLD));
        request.control_column = self.control;
        request.prediction_column = self.prediction;
        request.normalize_target = self.normalize_target.unwrap_or(true);
        Ok(request)
    }
}

fn toml_to_value(value: toml::Value) -> Result<Value, ConfigError> {
    match value {
        toml::Value::Integer(n) => Ok(Value::Int(n)),
        toml::Value::Float(x) => Ok(Value::Float(x)),
        toml::Value::Boolean(b) => Ok(Value::Bool(b)),
        toml::Value::String(s) => Ok(Value::Str(s)),
        other => Err(ConfigError::UnsupportedValue {
            key: "target_value",
            found: other.type_str().to_string(),
        }),
    }
}

pub fn parse_config(text: &str) -> Result<Config, ConfigError> {
    Ok(toml::from_str::<Config>(text)?)
}

/// Load a config file. A relative dataset path is resolved against the
/// directory holding the file.
pub fn load_config(path: &Path) -> Result<Config, ConfigError> {
    let text = fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let mut config = parse_config(&text)?;
    if let (Some(data), Some(dir)) = (config.dataset.path.as_mut(), path.parent()) {
        if data.is_relative() {
            *data = dir.join(&*data);
        }
    }
    log::debug!("loaded configuration from '{}'", path.display());
    Ok(config)
}

/// Commented starting point written by `equitas init`.
pub fn config_template() -> String {
    let mut out = String::new();
    out.push_str("# equitas analysis configuration\n");
    out.push_str("\n[dataset]\n");
    out.push_str("# JSON array (.json) or one record per line (.ndjson / .jsonl)\n");
    out.push_str("path = \"data.ndjson\"\n");
    out.push_str("\n[analysis]\n");
    out.push_str("# Columns whose groups are compared\n");
    out.push_str("sensitive = [\"gender\"]\n");
    out.push_str("target = \"label\"\n");
    out.push_str("# Outcome counted as positive; compared without type conversion\n");
    out.push_str("target_value = 1\n");
    out.push_str(&format!("threshold = {DEFAULT_THRESHOLD}\n"));
    out.push_str("normalize_target = true\n");
    out.push_str("\n# Stratify the primary sensitive column by a control column\n");
    out.push_str("# control = \"region\"\n");
    out.push_str("\n# Compare TPR / FPR of a 0/1 prediction column\n");
    out.push_str("# prediction = \"predicted\"\n");
    out
}
