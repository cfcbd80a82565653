use std::{env, fs::OpenOptions, io, path::PathBuf};

use env_logger::{Builder, Target};

pub const DEFAULT_DATABASE: &str = "sample.db";

/// Settings read from the environment (and an optional `.env`).
#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
    /// Log destination; logging stays off when unset since stdout holds the UI.
    pub log_file: Option<PathBuf>,
    pub log_filter: String,
    /// Pre-filled value of the form's database field.
    pub default_database: String,
}

impl AppConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        Self {
            log_file: non_empty("DBPEEK_LOG_FILE").map(PathBuf::from),
            log_filter: non_empty("RUST_LOG").unwrap_or_else(|| "info".to_string()),
            default_database: non_empty("DBPEEK_DEFAULT_DATABASE")
                .unwrap_or_else(|| DEFAULT_DATABASE.to_string()),
        }
    }
}

pub fn init_logging(config: &AppConfig) -> io::Result<()> {
    let Some(path) = &config.log_file else {
        return Ok(());
    };

    let file = OpenOptions::new().create(true).append(true).open(path)?;
    Builder::new()
        .parse_filters(&config.log_filter)
        .target(Target::Pipe(Box::new(file)))
        .try_init()
        .map_err(|e| io::Error::other(e))
}
