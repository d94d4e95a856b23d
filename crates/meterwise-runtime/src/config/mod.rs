//! Metrics config loader (strict parsing).

pub mod schema;

use std::fs;

use meterwise_core::error::{MeterError, Result};

pub use schema::{MetricsConfig, MetricsOptions};

pub fn load_from_file(path: &str) -> Result<MetricsConfig> {
    let s = fs::read_to_string(path)
        .map_err(|e| MeterError::Internal(format!("read config {path} failed: {e}")))?;
    load_from_str(&s)
}

pub fn load_from_str(s: &str) -> Result<MetricsConfig> {
    let cfg: MetricsConfig =
        serde_yaml::from_str(s).map_err(|e| MeterError::BadConfig(format!("invalid yaml: {e}")))?;
    cfg.validate()?;
    Ok(cfg)
}
