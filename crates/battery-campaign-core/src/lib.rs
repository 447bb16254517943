//! # Battery Campaign Core Library
//!
//! Business logic for the battery check campaign: find locks whose battery
//! hasn't been checked in a while, remind their users, and measure how many
//! of them opened the reminder. The `battery-campaign` CLI is a thin layer
//! over this crate.
//!
//! ## Architecture
//!
//! - **Campaign**: pure stale lock filter and engagement calculator, an
//!   explicit per-run event ledger, and the orchestrator tying them together
//! - **Source**: lock registry / user directory behind the [`DataSource`]
//!   trait, with fixture and SQLite-backed implementations
//! - **Notify**: delivery backends behind the [`Notifier`] trait
//! - **Storage**: TOML-based configuration
//!
//! ## Key Components
//!
//! - [`StaleLockFilter`]: selects locks checked longer ago than a threshold
//! - [`EngagementCalculator`]: open rate and interpretation for a campaign
//! - [`Campaign`]: runs one campaign end to end
//! - [`Config`]: application configuration management

pub mod campaign;
pub mod error;
pub mod lock;
pub mod notify;
pub mod source;
pub mod storage;

pub use campaign::{
    campaign_tag, Campaign, CampaignLedger, CampaignReport, CampaignSummary, EngagementCalculator,
    Interpretation, MalformedRecord, NotificationEvent, NotificationKind, StaleLockFilter,
    StaleLockReport,
};
pub use error::{ConfigError, CoreError, DeliveryError, SourceError, ValidationError};
pub use lock::{LockRecord, LockUser};
pub use notify::{DeliveryReceipt, DryRunNotifier, NotificationPayload, Notifier};
pub use source::{DataSource, FixtureSource, LiveSource, SourceMode};
pub use storage::Config;
