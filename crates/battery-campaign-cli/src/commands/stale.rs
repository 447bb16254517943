use battery_campaign_core::{Config, DataSource};
use clap::Args;

use super::SourceArgs;

#[derive(Args, Debug)]
pub struct StaleArgs {
    #[command(flatten)]
    pub source: SourceArgs,
    /// Print as JSON
    #[arg(long)]
    pub json: bool,
}

pub fn run(args: StaleArgs) -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::load()?;
    let source = args.source.open_source(&config)?;
    let locks = source.locks()?;
    let report = args.source.filter(&config).filter_stale(&locks, args.source.now());

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    println!("{} of {} locks are stale", report.stale.len(), locks.len());
    for lock in &report.stale {
        println!("  {}  last checked {}", lock.lock_id, lock.last_battery_check);
    }
    if !report.malformed.is_empty() {
        println!("{} locks have a malformed timestamp", report.malformed.len());
        for record in &report.malformed {
            println!("  {}  {:?}: {}", record.lock_id, record.raw_timestamp, record.reason);
        }
    }
    Ok(())
}
