use std::sync::Arc;

use super::package::{applications_from_records, PackageSource};
use crate::error::Result;
use crate::filter::AppFilter;
use crate::space::VolumeStatsProvider;
use crate::tree::{applied_filter, apply_filter, EntryTree, TreeBuilder};

/// Block size assumed when the data volume cannot report one
pub const FALLBACK_BLOCK_SIZE: u64 = 4096;

/// Outcome of [`AppUsage::update_filter`].
#[derive(Debug, Clone)]
pub enum FilterUpdate {
    /// No tree yet; the filter will be used by the next scan
    Pending,
    /// The filter was already applied; the live tree is unchanged
    Unchanged,
    /// The live tree was rebuilt under the new filter
    Rebuilt(Arc<EntryTree>),
}

/// Application storage usage session.
///
/// Holds the live tree and the filter waiting for the next scan. Rebuilds
/// replace the live `Arc`; snapshots handed out earlier stay valid.
pub struct AppUsage<P, S> {
    builder: TreeBuilder<P>,
    source: S,
    block_size: Option<u64>,
    pending_filter: Option<AppFilter>,
    root: Option<Arc<EntryTree>>,
}

impl<P: VolumeStatsProvider, S: PackageSource> AppUsage<P, S> {
    /// Create a session; `initial_filter` is applied by the first scan.
    pub fn new(builder: TreeBuilder<P>, source: S, initial_filter: AppFilter) -> Self {
        Self {
            builder,
            source,
            block_size: None,
            pending_filter: Some(initial_filter),
            root: None,
        }
    }

    /// Use a fixed display block size instead of the data volume's.
    pub fn with_block_size(mut self, block_size: u64) -> Self {
        if block_size > 0 {
            self.block_size = Some(block_size);
        }
        self
    }

    /// Display block size, read from the data volume on first use.
    pub fn block_size(&mut self) -> u64 {
        if let Some(block_size) = self.block_size {
            return block_size;
        }

        let block_size = match self.builder.data_block_size() {
            Ok(size) if size > 0 => size,
            Ok(_) => FALLBACK_BLOCK_SIZE,
            Err(e) => {
                tracing::warn!("Using {} byte blocks: {}", FALLBACK_BLOCK_SIZE, e);
                FALLBACK_BLOCK_SIZE
            }
        };
        self.block_size = Some(block_size);
        block_size
    }

    /// Current live tree, if a scan has completed.
    pub fn root(&self) -> Option<&Arc<EntryTree>> {
        self.root.as_ref()
    }

    pub fn pending_filter(&self) -> Option<&AppFilter> {
        self.pending_filter.as_ref()
    }

    /// Filter applied to the live tree, `None` before the first scan.
    pub fn current_filter(&self) -> Result<Option<AppFilter>> {
        self.root.as_deref().map(applied_filter).transpose()
    }

    /// Reload packages and rebuild the whole tree.
    ///
    /// Uses the pending filter if one is queued, else the filter already
    /// applied. A failing package source yields an empty applications entry.
    /// The pending filter stays queued until a build succeeds.
    pub fn scan(&mut self) -> Result<Arc<EntryTree>> {
        let filter = match self.pending_filter {
            Some(filter) => filter,
            None => self.current_filter()?.unwrap_or_default(),
        };
        let block_size = self.block_size();

        let records = match self.source.packages() {
            Ok(records) => records,
            Err(e) => {
                tracing::warn!("Package source unavailable, showing no applications: {}", e);
                Vec::new()
            }
        };

        let apps = applications_from_records(&records, &filter, block_size)?;
        let tree = Arc::new(self.builder.build(apps, &filter, block_size)?);

        tracing::info!(
            packages = records.len(),
            total_blocks = tree.total_blocks(),
            block_size,
            "Scan finished"
        );

        self.pending_filter = None;
        self.root = Some(Arc::clone(&tree));
        Ok(tree)
    }

    /// Switch to `filter` without rescanning packages.
    pub fn update_filter(&mut self, filter: AppFilter) -> Result<FilterUpdate> {
        let Some(current) = &self.root else {
            tracing::debug!(?filter, "No tree yet, deferring filter to next scan");
            self.pending_filter = Some(filter);
            return Ok(FilterUpdate::Pending);
        };

        let rebuilt = apply_filter(current, &filter, &self.builder)?;
        if Arc::ptr_eq(&rebuilt, current) {
            return Ok(FilterUpdate::Unchanged);
        }

        self.root = Some(Arc::clone(&rebuilt));
        Ok(FilterUpdate::Rebuilt(rebuilt))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::apps::package::PackageRecord;
    use crate::error::UsageError;
    use crate::space::{StaticVolumes, VolumeStats};
    use crate::tree::{locate_applications, Entry, EntryKind};

    struct FailingSource;

    impl PackageSource for FailingSource {
        fn packages(&self) -> Result<Vec<PackageRecord>> {
            Err(UsageError::PackageSource("package manager not running".into()))
        }
    }

    fn builder() -> TreeBuilder<StaticVolumes> {
        TreeBuilder::new(
            StaticVolumes::new().with_volume("/data", VolumeStats::new(512, 100_000, 40_000)),
        )
    }

    fn records() -> Vec<PackageRecord> {
        vec![
            PackageRecord::new("com.a", 4096, 8192, 0),
            PackageRecord::new("com.b", 4096, 0, 4096),
        ]
    }

    #[test]
    fn test_update_before_scan_is_pending() {
        let mut usage = AppUsage::new(builder(), records(), AppFilter::default());
        let apk_only = AppFilter::none().with_apk(true);

        let outcome = usage.update_filter(apk_only).unwrap();

        assert!(matches!(outcome, FilterUpdate::Pending));
        assert_eq!(usage.pending_filter(), Some(&apk_only));
        assert!(usage.root().is_none());

        let tree = usage.scan().unwrap();
        assert_eq!(applied_filter(&tree).unwrap(), apk_only);
        assert!(usage.pending_filter().is_none());
    }

    #[test]
    fn test_block_size_from_data_volume() {
        let mut usage = AppUsage::new(builder(), records(), AppFilter::default());
        assert_eq!(usage.block_size(), 512);
    }

    #[test]
    fn test_block_size_fallback() {
        let mut usage = AppUsage::new(
            TreeBuilder::new(StaticVolumes::new()),
            records(),
            AppFilter::default(),
        );
        assert_eq!(usage.block_size(), FALLBACK_BLOCK_SIZE);
    }

    #[test]
    fn test_update_with_same_filter_is_unchanged() {
        let mut usage =
            AppUsage::new(builder(), records(), AppFilter::default()).with_block_size(4096);
        let tree = usage.scan().unwrap();

        let outcome = usage.update_filter(AppFilter::default()).unwrap();

        assert!(matches!(outcome, FilterUpdate::Unchanged));
        assert!(Arc::ptr_eq(usage.root().unwrap(), &tree));
    }

    #[test]
    fn test_update_rebuilds_live_tree() {
        let mut usage =
            AppUsage::new(builder(), records(), AppFilter::default()).with_block_size(4096);
        let before = usage.scan().unwrap();
        let cache_only = AppFilter::none().with_cache(true);

        let outcome = usage.update_filter(cache_only).unwrap();

        let FilterUpdate::Rebuilt(after) = outcome else {
            panic!("expected a rebuilt tree");
        };
        assert!(Arc::ptr_eq(usage.root().unwrap(), &after));
        assert!(!Arc::ptr_eq(&before, &after));
        assert_eq!(usage.current_filter().unwrap(), Some(cache_only));

        let apps = locate_applications(&after).unwrap();
        assert_eq!(after.entry(apps).size_in_blocks, 1);
    }

    #[test]
    fn test_rescan_keeps_applied_filter() {
        let mut usage =
            AppUsage::new(builder(), records(), AppFilter::default()).with_block_size(4096);
        usage.scan().unwrap();
        let data_only = AppFilter::none().with_data(true);
        usage.update_filter(data_only).unwrap();

        let rescanned = usage.scan().unwrap();

        assert_eq!(applied_filter(&rescanned).unwrap(), data_only);
    }

    #[test]
    fn test_failing_source_degrades_to_empty() {
        let mut usage =
            AppUsage::new(builder(), FailingSource, AppFilter::default()).with_block_size(512);

        let tree = usage.scan().unwrap();

        let apps = locate_applications(&tree).unwrap();
        assert!(tree.is_leaf(apps));
        assert_eq!(tree.entry(apps).size_in_blocks, 0);
        tree.validate().unwrap();
    }

    #[test]
    fn test_rescan_of_malformed_tree_is_an_error() {
        let mut usage =
            AppUsage::new(builder(), records(), AppFilter::default()).with_block_size(4096);
        usage.scan().unwrap();
        let mut stray = EntryTree::new(Entry::new(None, EntryKind::Wrapper, 0), 4096);
        let free = stray.leaf(Some("Free space".to_string()), EntryKind::FreeSpace, 3);
        stray.attach(stray.root(), free).unwrap();
        usage.root = Some(Arc::new(stray));

        assert!(matches!(
            usage.current_filter(),
            Err(UsageError::UnexpectedEntry { .. })
        ));
        assert!(matches!(
            usage.scan(),
            Err(UsageError::UnexpectedEntry { .. })
        ));
    }
}
