use clap::{Args, Parser, Subcommand};
use clap_complete::Shell;
use std::path::PathBuf;

use crate::filter::AppFilter;

/// app-usage - Storage usage breakdown of installed applications
#[derive(Parser, Debug)]
#[command(name = "app-usage")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Suppress non-essential output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Show the storage usage tree
    Scan(ScanArgs),

    /// Show or change the saved filter
    Filter(FilterArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

#[derive(Args, Debug)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    #[arg(value_enum)]
    pub shell: Shell,
}

/// Component selection shared by `scan` and `filter set`
#[derive(Args, Debug, Clone, Default)]
pub struct FilterFlags {
    /// Count package archives
    #[arg(long)]
    pub apk: bool,

    /// Count application data
    #[arg(long)]
    pub data: bool,

    /// Count application caches
    #[arg(long)]
    pub cache: bool,

    /// Account against removable storage
    #[arg(long)]
    pub sd: bool,

    /// Show package components as child entries
    #[arg(long)]
    pub drill_down: bool,
}

impl FilterFlags {
    /// True when any component or scope flag was given
    pub fn is_set(&self) -> bool {
        self.apk || self.data || self.cache || self.sd || self.drill_down
    }

    /// Filter from the flags. Component flags replace the components of
    /// `base`; `--sd` and `--drill-down` only switch their setting on, so the
    /// scope and drill-down of `base` are kept otherwise.
    pub fn to_filter(&self, base: AppFilter) -> AppFilter {
        let filter = if self.apk || self.data || self.cache {
            base.with_apk(self.apk)
                .with_data(self.data)
                .with_cache(self.cache)
        } else {
            base
        };
        filter
            .with_sd(base.use_sd || self.sd)
            .with_drill_down(base.drill_down || self.drill_down)
    }
}

#[derive(Args, Debug)]
pub struct ScanArgs {
    /// JSON package manifest
    #[arg(short, long, value_name = "PATH")]
    pub manifest: Option<PathBuf>,

    #[command(flatten)]
    pub filter: FilterFlags,

    /// Maximum depth to display
    #[arg(short = 'd', long, value_name = "N")]
    pub max_depth: Option<usize>,

    /// Show top N entries per container
    #[arg(short = 'n', long, value_name = "N")]
    pub top: Option<usize>,

    /// Show each entry's share of its parent
    #[arg(short, long)]
    pub percent: bool,

    /// Display block size in bytes
    #[arg(short, long, value_name = "BYTES")]
    pub block_size: Option<u64>,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,

    /// Save the filter used for this scan
    #[arg(long)]
    pub save: bool,
}

#[derive(Args, Debug)]
pub struct FilterArgs {
    #[command(subcommand)]
    pub action: FilterAction,
}

#[derive(Subcommand, Debug)]
pub enum FilterAction {
    /// Print the saved filter
    Show,

    /// Save a new filter
    Set(FilterFlags),

    /// Forget the saved filter
    Reset,
}
