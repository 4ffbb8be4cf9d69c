use std::str::FromStr;

use tracing::warn;

use crate::config::{Config, read_config_file};

const STATS_URL: &str = "STATS_URL";

const CHECK_INTERVAL_MS: &str = "CHECK_INTERVAL_MS";

const FETCH_TIMEOUT_MS: &str = "FETCH_TIMEOUT_MS";

const MAX_FAILURES: &str = "MAX_FAILURES";

/// Values given on the command line. They win over everything else.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub url: Option<String>,
    pub interval_ms: Option<u64>,
}

/// Resolve the effective config: defaults, then the file, then the
/// environment, then `overrides`.
pub fn load_config(file: Option<&str>, overrides: &Overrides) -> anyhow::Result<Config> {
    resolve_config(file, overrides, |key| std::env::var(key).ok())
}

fn resolve_config(
    file: Option<&str>,
    overrides: &Overrides,
    lookup: impl Fn(&str) -> Option<String>,
) -> anyhow::Result<Config> {
    let config = match file {
        Some(file) => read_config_file(file)?,
        None => Config::default(),
    };

    let mut config = apply_overrides(config, lookup);
    if let Some(url) = &overrides.url {
        config.source.url = url.clone();
    }
    if let Some(interval_ms) = overrides.interval_ms {
        config.source.interval_ms = interval_ms;
    }
    Ok(config)
}

/// Apply overrides found through `lookup`. Values that don't parse are
/// ignored and the existing setting is kept.
fn apply_overrides(mut config: Config, lookup: impl Fn(&str) -> Option<String>) -> Config {
    if let Some(url) = lookup(STATS_URL).filter(|url| !url.is_empty()) {
        config.source.url = url;
    }
    if let Some(interval_ms) = parse_var(&lookup, CHECK_INTERVAL_MS) {
        config.source.interval_ms = interval_ms;
    }
    if let Some(timeout_ms) = parse_var(&lookup, FETCH_TIMEOUT_MS) {
        config.source.timeout_ms = timeout_ms;
    }
    if let Some(max_failures) = parse_var(&lookup, MAX_FAILURES) {
        config.max_failures = max_failures;
    }
    config
}

fn parse_var<T: FromStr>(lookup: &impl Fn(&str) -> Option<String>, key: &str) -> Option<T> {
    let value = lookup(key)?;
    match value.trim().parse() {
        Ok(parsed) => Some(parsed),
        Err(_) => {
            warn!("ignoring {key}={value:?}, not a valid value");
            None
        }
    }
}
