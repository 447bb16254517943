use battery_campaign_core::{Config, EngagementCalculator};
use clap::Args;

#[derive(Args, Debug)]
pub struct SummarizeArgs {
    /// Campaign tag, e.g. battery_check_2024-03-01
    pub tag: String,
    /// Notifications sent
    pub sent: u64,
    /// Notifications opened
    pub opened: u64,
    /// Open rate (percent) under which the campaign is low engagement [default: config]
    #[arg(long)]
    pub min_engaged_rate: Option<f64>,
    /// Print as JSON
    #[arg(long)]
    pub json: bool,
}

pub fn run(args: SummarizeArgs) -> Result<(), Box<dyn std::error::Error>> {
    let calculator = match args.min_engaged_rate {
        Some(rate) => EngagementCalculator::with_min_engaged_rate(rate)?,
        None => Config::load()?.calculator()?,
    };
    let summary = calculator.summarize(&args.tag, args.sent, args.opened)?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
    } else {
        println!("Campaign:       {}", summary.campaign_tag);
        println!("Sent:           {}", summary.sent_count);
        println!("Opened:         {}", summary.opened_count);
        println!("Open rate:      {}", summary.open_rate_display());
        println!("Interpretation: {}", summary.interpretation);
    }
    Ok(())
}
