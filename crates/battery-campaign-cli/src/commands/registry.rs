use battery_campaign_core::{Config, LiveSource, LockRecord, LockUser};
use clap::Subcommand;
use std::path::PathBuf;

use super::registry_path;

#[derive(Subcommand)]
pub enum RegistryAction {
    /// Create the registry file and tables
    Init {
        #[arg(long)]
        registry: Option<PathBuf>,
    },
    /// Add or update a lock
    AddLock {
        lock_id: String,
        /// Last battery check (RFC 3339 or YYYY-MM-DD)
        last_battery_check: String,
        #[arg(long)]
        registry: Option<PathBuf>,
    },
    /// Attach a user to a lock
    AddUser {
        lock_id: String,
        user_id: String,
        push_token: String,
        #[arg(long)]
        registry: Option<PathBuf>,
    },
    /// Record that a user opened a campaign notification
    RecordOpen {
        campaign_tag: String,
        user_id: String,
        lock_id: String,
        #[arg(long)]
        registry: Option<PathBuf>,
    },
}

pub fn run(action: RegistryAction) -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::load()?;

    match action {
        RegistryAction::Init { registry } => {
            let path = registry_path(registry.as_ref(), &config)?;
            LiveSource::open_or_create(&path)?;
            println!("registry ready at {}", path.display());
        }
        RegistryAction::AddLock {
            lock_id,
            last_battery_check,
            registry,
        } => {
            let source = LiveSource::open(registry_path(registry.as_ref(), &config)?)?;
            source.upsert_lock(&LockRecord::new(lock_id, last_battery_check))?;
            println!("ok");
        }
        RegistryAction::AddUser {
            lock_id,
            user_id,
            push_token,
            registry,
        } => {
            let source = LiveSource::open(registry_path(registry.as_ref(), &config)?)?;
            source.assign_user(&lock_id, &LockUser::new(user_id, push_token))?;
            println!("ok");
        }
        RegistryAction::RecordOpen {
            campaign_tag,
            user_id,
            lock_id,
            registry,
        } => {
            let source = LiveSource::open(registry_path(registry.as_ref(), &config)?)?;
            source.record_open(&campaign_tag, &user_id, &lock_id)?;
            println!("ok");
        }
    }
    Ok(())
}
