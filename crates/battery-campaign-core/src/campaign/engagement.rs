//! Campaign engagement summary
//!
//! Turns sent/opened counts into an open rate and a coarse interpretation.
//! The open rate is a percentage in `0.0..=100.0`, rounded to two decimal
//! places, and is `0.0` when nothing was sent.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::ValidationError;

/// Qualitative reading of a campaign's open rate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Interpretation {
    #[serde(rename = "low engagement")]
    LowEngagement,
    #[serde(rename = "engaged")]
    Engaged,
}

impl Interpretation {
    pub fn as_str(&self) -> &'static str {
        match self {
            Interpretation::LowEngagement => "low engagement",
            Interpretation::Engaged => "engaged",
        }
    }
}

impl fmt::Display for Interpretation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Engagement summary for one campaign run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CampaignSummary {
    pub campaign_tag: String,
    pub sent_count: u64,
    pub opened_count: u64,
    /// Percentage of sent notifications that were opened (0.0 to 100.0)
    pub open_rate: f64,
    pub interpretation: Interpretation,
}

impl CampaignSummary {
    /// Open rate formatted with two decimals and a percent sign, e.g. `50.00%`
    pub fn open_rate_display(&self) -> String {
        format!("{:.2}%", self.open_rate)
    }
}

/// Calculator for campaign engagement
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EngagementCalculator {
    /// Open rate (percent) below which a campaign counts as low engagement.
    /// A campaign with zero opens is always low engagement.
    pub min_engaged_rate: f64,
}

impl Default for EngagementCalculator {
    fn default() -> Self {
        Self {
            min_engaged_rate: 0.0,
        }
    }
}

impl EngagementCalculator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a calculator that also flags campaigns under `min_engaged_rate` percent.
    ///
    /// # Errors
    /// Returns [`ValidationError::InvalidValue`] unless the rate is within `0.0..=100.0`.
    pub fn with_min_engaged_rate(min_engaged_rate: f64) -> Result<Self, ValidationError> {
        if !(0.0..=100.0).contains(&min_engaged_rate) {
            return Err(ValidationError::InvalidValue {
                field: "min_engaged_rate".to_string(),
                message: format!("must be between 0 and 100, got {min_engaged_rate}"),
            });
        }
        Ok(Self { min_engaged_rate })
    }

    /// Summarize a campaign from its event counts.
    ///
    /// # Errors
    /// Returns [`ValidationError::InvalidInput`] if `opened_count > sent_count`.
    pub fn summarize(
        &self,
        campaign_tag: &str,
        sent_count: u64,
        opened_count: u64,
    ) -> Result<CampaignSummary, ValidationError> {
        if opened_count > sent_count {
            return Err(ValidationError::InvalidInput(format!(
                "opened count ({opened_count}) exceeds sent count ({sent_count})"
            )));
        }

        let open_rate = open_rate(sent_count, opened_count);
        let interpretation = if opened_count == 0 || open_rate < self.min_engaged_rate {
            Interpretation::LowEngagement
        } else {
            Interpretation::Engaged
        };

        Ok(CampaignSummary {
            campaign_tag: campaign_tag.to_string(),
            sent_count,
            opened_count,
            open_rate,
            interpretation,
        })
    }
}

fn open_rate(sent_count: u64, opened_count: u64) -> f64 {
    if sent_count == 0 {
        return 0.0;
    }
    let percent = opened_count as f64 / sent_count as f64 * 100.0;
    (percent * 100.0).round() / 100.0
}
