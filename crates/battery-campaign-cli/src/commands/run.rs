use battery_campaign_core::{campaign_tag, Campaign, CampaignReport, Config, DryRunNotifier};
use clap::Args;

use super::SourceArgs;

#[derive(Args, Debug)]
pub struct RunArgs {
    #[command(flatten)]
    pub source: SourceArgs,
    /// Print the full report as JSON
    #[arg(long)]
    pub json: bool,
}

pub fn run(args: RunArgs) -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::load()?;
    let now = args.source.now();
    let source = args.source.open_source(&config)?;

    if !args.json {
        println!("=======================================");
        println!(" BATTERY CHECK CAMPAIGN");
        println!(" Source:   {}", args.source.mode(&config));
        println!(" Campaign: {}", campaign_tag(now));
        println!("=======================================");
    }

    let report = Campaign::new(source, DryRunNotifier)
        .with_filter(args.source.filter(&config))
        .with_calculator(config.calculator()?)
        .run(now)?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_report(&report);
    }
    Ok(())
}

fn print_report(report: &CampaignReport) {
    println!();
    println!("Stale locks: {}", report.stale_locks.len());
    for lock in &report.stale_locks {
        println!("  {}  last checked {}", lock.lock_id, lock.last_battery_check);
    }

    if !report.malformed.is_empty() {
        println!("Skipped (malformed timestamp): {}", report.malformed.len());
        for record in &report.malformed {
            println!("  {}  {:?}: {}", record.lock_id, record.raw_timestamp, record.reason);
        }
    }
    if !report.skipped_locks.is_empty() {
        println!("Skipped (user lookup failed): {}", report.skipped_locks.len());
        for skipped in &report.skipped_locks {
            println!("  {}: {}", skipped.lock_id, skipped.reason);
        }
    }
    if !report.failed_deliveries.is_empty() {
        println!("Failed deliveries: {}", report.failed_deliveries.len());
        for failed in &report.failed_deliveries {
            println!("  {} / {}: {}", failed.user_id, failed.lock_id, failed.reason);
        }
    }

    let summary = &report.summary;
    println!();
    println!("==============================");
    println!(" CAMPAIGN EFFECTIVENESS");
    println!("==============================");
    println!("Campaign:       {}", summary.campaign_tag);
    println!("Sent:           {}", summary.sent_count);
    println!("Opened:         {}", summary.opened_count);
    println!("Open rate:      {}", summary.open_rate_display());
    println!("Interpretation: {}", summary.interpretation);
}
