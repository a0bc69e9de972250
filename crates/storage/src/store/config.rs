#![forbid(unsafe_code)]

use std::path::PathBuf;
use std::time::Duration;

const STORAGE_DIR_ENV: &str = "PROJFOREST_STORAGE_DIR";
const BUSY_TIMEOUT_ENV: &str = "PROJFOREST_BUSY_TIMEOUT_MS";
const MAX_RETRIES_ENV: &str = "PROJFOREST_MAX_RETRIES";
const JOURNAL_ENV: &str = "PROJFOREST_JOURNAL";

const DEFAULT_STORAGE_DIR: &str = ".projforest";
const DEFAULT_BUSY_TIMEOUT_MS: u64 = 5_000;
const DEFAULT_MAX_RETRIES: u32 = 3;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StoreConfig {
    pub storage_dir: PathBuf,
    pub busy_timeout: Duration,
    /// Extra attempts `with_retry` makes after a `TransactionAborted`.
    pub max_retries: u32,
    /// Append a `project_events` row for every committed mutation.
    pub journal: bool,
}

impl StoreConfig {
    pub fn new(storage_dir: impl Into<PathBuf>) -> Self {
        Self {
            storage_dir: storage_dir.into(),
            busy_timeout: Duration::from_millis(DEFAULT_BUSY_TIMEOUT_MS),
            max_retries: DEFAULT_MAX_RETRIES,
            journal: true,
        }
    }

    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Well-formed values from `lookup` override the built-in defaults; anything else is ignored.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let storage_dir = lookup(STORAGE_DIR_ENV)
            .map(|raw| raw.trim().to_string())
            .filter(|raw| !raw.is_empty())
            .unwrap_or_else(|| DEFAULT_STORAGE_DIR.to_string());

        let mut config = Self::new(storage_dir);
        if let Some(ms) = parse_u64(lookup(BUSY_TIMEOUT_ENV)) {
            config.busy_timeout = Duration::from_millis(ms);
        }
        if let Some(retries) = parse_u64(lookup(MAX_RETRIES_ENV)) {
            config.max_retries = u32::try_from(retries).unwrap_or(u32::MAX);
        }
        if let Some(journal) = parse_bool(lookup(JOURNAL_ENV)) {
            config.journal = journal;
        }
        config
    }
}

fn parse_u64(raw: Option<String>) -> Option<u64> {
    raw?.trim().parse::<u64>().ok()
}

fn parse_bool(raw: Option<String>) -> Option<bool> {
    let raw = raw?;
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
