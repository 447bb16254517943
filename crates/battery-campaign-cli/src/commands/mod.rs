pub mod config;
pub mod registry;
pub mod run;
pub mod stale;
pub mod summarize;

use battery_campaign_core::campaign::parse_check_timestamp;
use battery_campaign_core::{
    Config, DataSource, FixtureSource, LiveSource, SourceMode, StaleLockFilter,
};
use chrono::{DateTime, Utc};
use clap::Args;
use std::path::PathBuf;
use tracing::debug;

/// Flags shared by commands that read the lock registry.
#[derive(Args, Debug, Clone)]
pub struct SourceArgs {
    /// Data source: fixture or live [default: config `source.mode`]
    #[arg(long)]
    pub source: Option<SourceMode>,
    /// Path to the SQLite registry [default: config `source.registry_path`]
    #[arg(long)]
    pub registry: Option<PathBuf>,
    /// Days without a battery check before a lock is stale
    /// [default: config `filter.threshold_days`]
    #[arg(long)]
    pub threshold_days: Option<u32>,
    /// Evaluate as of this time (RFC 3339 or YYYY-MM-DD) instead of now
    #[arg(long, value_parser = parse_check_timestamp)]
    pub now: Option<DateTime<Utc>>,
}

impl SourceArgs {
    pub fn mode(&self, config: &Config) -> SourceMode {
        self.source.unwrap_or(config.source.mode)
    }

    /// Build the data source once, from flags then config.
    pub fn open_source(
        &self,
        config: &Config,
    ) -> Result<Box<dyn DataSource>, Box<dyn std::error::Error>> {
        match self.mode(config) {
            SourceMode::Fixture => {
                debug!("using fixture registry");
                Ok(Box::new(FixtureSource::sample()))
            }
            SourceMode::Live => {
                let path = registry_path(self.registry.as_ref(), config)?;
                debug!(path = %path.display(), "opening live registry");
                Ok(Box::new(LiveSource::open(path)?))
            }
        }
    }

    pub fn filter(&self, config: &Config) -> StaleLockFilter {
        self.threshold_days
            .map(StaleLockFilter::with_threshold_days)
            .unwrap_or_else(|| config.filter())
    }

    pub fn now(&self) -> DateTime<Utc> {
        self.now.unwrap_or_else(Utc::now)
    }
}

pub fn registry_path(
    flag: Option<&PathBuf>,
    config: &Config,
) -> Result<PathBuf, Box<dyn std::error::Error>> {
    match flag {
        Some(path) => Ok(path.clone()),
        None => Ok(config.registry_path()?),
    }
}
