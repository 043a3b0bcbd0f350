//! Filter command implementation

use crate::apps::{FilterStore, TomlFilterStore};
use crate::cli::{FilterAction, FilterArgs};
use crate::config::Config;
use crate::error::{Result, UsageError};
use crate::filter::AppFilter;

pub fn run(args: FilterArgs, config: &Config) -> Result<()> {
    let store = TomlFilterStore::in_config_dir().ok_or_else(|| {
        UsageError::Other("No configuration directory for the saved filter".to_string())
    })?;

    match args.action {
        FilterAction::Show => {
            let (filter, origin) = match store.load()? {
                Some(filter) => (filter, "saved"),
                None => (config.filter, "default"),
            };
            println!("# {} filter", origin);
            print!("{}", describe(&filter));
        }
        FilterAction::Set(flags) => {
            let base = store.load()?.unwrap_or(config.filter);
            let filter = flags.to_filter(base);
            store.save(&filter)?;
            tracing::info!(path = %store.path().display(), "Filter saved");
            print!("{}", describe(&filter));
        }
        FilterAction::Reset => {
            store.clear()?;
            println!("Saved filter removed");
        }
    }

    Ok(())
}

/// Filter as `key = value` lines
pub fn describe(filter: &AppFilter) -> String {
    toml::to_string(filter).unwrap_or_else(|_| format!("{:?}\n", filter))
}
