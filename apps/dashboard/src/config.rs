use std::{fs, path::Path, time::Duration};

use anyhow::Context;
use client_core::submission::normalize_success_rate;
use serde::Deserialize;
use tracing::warn;

pub const DEFAULT_CONFIG_PATH: &str = "dashboard.toml";

#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub fetch_latency_ms: u64,
    pub submit_latency_ms: u64,
    pub submit_success_rate: f64,
    pub log_filter: String,
    pub rng_seed: Option<u64>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            fetch_latency_ms: 1000,
            submit_latency_ms: 1500,
            submit_success_rate: 0.8,
            log_filter: "info".into(),
            rng_seed: None,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
struct FileSettings {
    fetch_latency_ms: Option<u64>,
    submit_latency_ms: Option<u64>,
    submit_success_rate: Option<f64>,
    log_filter: Option<String>,
    rng_seed: Option<u64>,
}

impl Settings {
    pub fn fetch_latency(&self) -> Duration {
        Duration::from_millis(self.fetch_latency_ms)
    }

    pub fn submit_latency(&self) -> Duration {
        Duration::from_millis(self.submit_latency_ms)
    }

    fn apply_file(&mut self, raw: &str) -> anyhow::Result<()> {
        let file_cfg: FileSettings = toml::from_str(raw).context("invalid dashboard config")?;
        if let Some(v) = file_cfg.fetch_latency_ms {
            self.fetch_latency_ms = v;
        }
        if let Some(v) = file_cfg.submit_latency_ms {
            self.submit_latency_ms = v;
        }
        if let Some(v) = file_cfg.submit_success_rate {
            self.submit_success_rate = normalize_success_rate(v);
        }
        if let Some(v) = file_cfg.log_filter {
            self.log_filter = v;
        }
        if let Some(v) = file_cfg.rng_seed {
            self.rng_seed = Some(v);
        }
        Ok(())
    }

    /// Returns one message per variable that was set but could not be parsed.
    fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) -> Vec<String> {
        let mut issues = Vec::new();
        if let Some(v) = parse_env(&lookup, "APP__FETCH_LATENCY_MS", &mut issues) {
            self.fetch_latency_ms = v;
        }
        if let Some(v) = parse_env(&lookup, "APP__SUBMIT_LATENCY_MS", &mut issues) {
            self.submit_latency_ms = v;
        }
        if let Some(v) = parse_env::<f64>(&lookup, "APP__SUBMIT_SUCCESS_RATE", &mut issues) {
            self.submit_success_rate = normalize_success_rate(v);
        }
        if let Some(v) = lookup("APP__LOG_FILTER") {
            self.log_filter = v;
        } else if let Some(v) = lookup("RUST_LOG") {
            self.log_filter = v;
        }
        if let Some(v) = parse_env(&lookup, "APP__RNG_SEED", &mut issues) {
            self.rng_seed = Some(v);
        }
        issues
    }
}

fn parse_env<T: std::str::FromStr>(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &str,
    issues: &mut Vec<String>,
) -> Option<T> {
    let raw = lookup(key)?;
    match raw.trim().parse::<T>() {
        Ok(parsed) => Some(parsed),
        Err(_) => {
            issues.push(format!("ignoring unparsable {key}={raw:?}"));
            None
        }
    }
}

#[derive(Debug)]
pub struct LoadedSettings {
    pub settings: Settings,
    /// Problems found while loading; logged once tracing is up.
    pub issues: Vec<String>,
}

impl LoadedSettings {
    pub fn log_issues(&self) {
        for issue in &self.issues {
            warn!("{issue}");
        }
    }
}

/// Defaults, then the config file (if present), then `APP__*` environment variables.
pub fn load_settings(path: Option<&Path>) -> LoadedSettings {
    let mut settings = Settings::default();
    let mut issues = Vec::new();
    let path = path.unwrap_or(Path::new(DEFAULT_CONFIG_PATH));

    if let Ok(raw) = fs::read_to_string(path) {
        if let Err(err) = settings.apply_file(&raw) {
            issues.push(format!("ignoring config file {}: {err:#}", path.display()));
        }
    }

    issues.extend(settings.apply_env(|key| std::env::var(key).ok()));
    LoadedSettings { settings, issues }
}

#[cfg(test)]
#[path = "tests/config_tests.rs"]
mod tests;
