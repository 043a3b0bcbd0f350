//! Scan command implementation

use crate::apps::{AppUsage, FilterStore, ManifestSource, TomlFilterStore};
use crate::cli::ScanArgs;
use crate::config::Config;
use crate::error::{Result, UsageError};
use crate::filter::AppFilter;
use crate::report::{format_json, format_size, format_tree, FormatOptions};
use crate::space::StatvfsProvider;
use crate::tree::{locate_applications, EntryTree, TreeBuilder};

/// Filter for this run: explicit flags over the saved filter over the
/// configured default.
pub fn effective_filter(args: &ScanArgs, config: &Config, saved: Option<AppFilter>) -> AppFilter {
    let base = saved.unwrap_or(config.filter);
    if args.filter.is_set() {
        args.filter.to_filter(base)
    } else {
        base
    }
}

/// Run the scan command
pub fn run(args: ScanArgs, config: &Config) -> Result<()> {
    let store = TomlFilterStore::in_config_dir();
    let saved = match &store {
        Some(store) => store.load()?,
        None => None,
    };
    let filter = effective_filter(&args, config, saved);

    let manifest = args
        .manifest
        .clone()
        .or_else(|| config.storage.manifest.clone())
        .ok_or_else(|| {
            UsageError::Other(
                "No package manifest given (use --manifest or storage.manifest)".to_string(),
            )
        })?;

    let provider =
        StatvfsProvider::new().with_require_mount_point(config.storage.require_mount_point);
    let builder = TreeBuilder::new(provider)
        .with_data_mount(&config.storage.data_mount)
        .with_cache_mount(&config.storage.cache_mount);

    tracing::info!(manifest = %manifest.display(), ?filter, "Scanning packages");

    let mut usage = AppUsage::new(builder, ManifestSource::new(manifest), filter)
        .with_block_size(args.block_size.unwrap_or(config.storage.block_size));
    let tree = usage.scan()?;

    if args.json {
        println!("{}", format_json(&tree, true)?);
    } else {
        let options = FormatOptions::new()
            .with_max_depth(args.max_depth.unwrap_or(config.report.max_depth))
            .with_top_n(args.top.unwrap_or(config.report.top))
            .with_percent(args.percent);

        println!("{}", format_tree(&tree, &options));
        println!("{}", summary(&tree)?);
    }

    if args.save {
        let store = store.ok_or_else(|| {
            UsageError::Other("No configuration directory to save the filter in".to_string())
        })?;
        store.save(&filter)?;
    }

    Ok(())
}

/// One-line totals for a built tree
pub fn summary(tree: &EntryTree) -> Result<String> {
    let apps = locate_applications(tree)?;
    Ok(format!(
        "Total: {} ({} in {} applications)",
        format_size(tree.size_bytes(tree.root())),
        format_size(tree.size_bytes(apps)),
        tree.children(apps).count()
    ))
}
