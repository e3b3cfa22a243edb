//! Library half of the `equitas` command: dataset loading, TOML
//! configuration and dataset summaries. The metric engine itself lives in
//! `equitas_metrics`.

pub mod config;
pub mod explore;
pub mod load;

pub use config::{
    config_template, load_config, parse_config, AnalysisSection, Config, ConfigError,
    DatasetSection, DEFAULT_CONFIG_FILE,
};
pub use explore::{summarize, ColumnSummary, DatasetSummary, ValueCount};
pub use load::{
    load_table, parse_csv, parse_json_array, parse_ndjson, parse_table, DataFormat, LoadError,
};
