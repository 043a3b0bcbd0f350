//! Selection of which package components count toward displayed sizes.

use serde::{Deserialize, Serialize};
use std::fmt;

/// One accountable component of an installed package.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Component {
    Apk,
    Data,
    Cache,
}

impl Component {
    pub const ALL: [Component; 3] = [Component::Apk, Component::Data, Component::Cache];

    pub fn label(&self) -> &'static str {
        match self {
            Component::Apk => "apk",
            Component::Data => "data",
            Component::Cache => "cache",
        }
    }
}

impl fmt::Display for Component {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Immutable filter value. Two filters are equal iff every flag matches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(default)]
pub struct AppFilter {
    /// Count installed package archives
    pub use_apk: bool,
    /// Count private application data
    pub use_data: bool,
    /// Count application caches
    pub use_cache: bool,
    /// Account against removable storage instead of internal storage
    pub use_sd: bool,
    /// Show each package's components as child entries
    pub drill_down: bool,
}

impl Default for AppFilter {
    fn default() -> Self {
        Self {
            use_apk: true,
            use_data: true,
            use_cache: true,
            use_sd: false,
            drill_down: false,
        }
    }
}

impl AppFilter {
    /// Filter that selects nothing; combine with the `with_*` builders.
    pub fn none() -> Self {
        Self {
            use_apk: false,
            use_data: false,
            use_cache: false,
            use_sd: false,
            drill_down: false,
        }
    }

    pub fn with_apk(mut self, enabled: bool) -> Self {
        self.use_apk = enabled;
        self
    }

    pub fn with_data(mut self, enabled: bool) -> Self {
        self.use_data = enabled;
        self
    }

    pub fn with_cache(mut self, enabled: bool) -> Self {
        self.use_cache = enabled;
        self
    }

    pub fn with_sd(mut self, enabled: bool) -> Self {
        self.use_sd = enabled;
        self
    }

    pub fn with_drill_down(mut self, enabled: bool) -> Self {
        self.drill_down = enabled;
        self
    }

    pub fn selects(&self, component: Component) -> bool {
        match component {
            Component::Apk => self.use_apk,
            Component::Data => self.use_data,
            Component::Cache => self.use_cache,
        }
    }

    /// Selected components in display order
    pub fn components(&self) -> impl Iterator<Item = Component> + '_ {
        Component::ALL.into_iter().filter(|c| self.selects(*c))
    }

    /// Whether the internal data partition contributes to space accounting
    pub fn counts_internal_data(&self) -> bool {
        (self.use_apk || self.use_data) && !self.use_sd
    }

    /// Whether the cache partition contributes to space accounting
    pub fn counts_cache_partition(&self) -> bool {
        self.use_cache && !self.use_sd
    }

    /// Name of the container holding applications and synthetic space entries
    pub fn container_name(&self) -> &'static str {
        if self.use_cache {
            if self.use_apk || self.use_data {
                "Data and Cache"
            } else {
                "Cache"
            }
        } else {
            "Data"
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_filter_counts_everything_internal() {
        let filter = AppFilter::default();
        assert!(filter.use_apk && filter.use_data && filter.use_cache);
        assert!(!filter.use_sd);
        assert!(!filter.drill_down);
    }

    #[test]
    fn test_equality_covers_every_flag() {
        let base = AppFilter::none().with_apk(true);
        assert_eq!(base, AppFilter::none().with_apk(true));
        assert_ne!(base, base.with_sd(true));
        assert_ne!(base, base.with_drill_down(true));
    }

    #[test]
    fn test_container_name() {
        let data = AppFilter::none().with_apk(true);
        let cache = AppFilter::none().with_cache(true);
        let both = AppFilter::none().with_data(true).with_cache(true);

        assert_eq!(data.container_name(), "Data");
        assert_eq!(cache.container_name(), "Cache");
        assert_eq!(both.container_name(), "Data and Cache");
    }

    #[test]
    fn test_partition_selection() {
        let filter = AppFilter::none().with_data(true).with_cache(true);
        assert!(filter.counts_internal_data());
        assert!(filter.counts_cache_partition());

        let sd = filter.with_sd(true);
        assert!(!sd.counts_internal_data());
        assert!(!sd.counts_cache_partition());
    }

    #[test]
    fn test_components_in_order() {
        let filter = AppFilter::none().with_cache(true).with_apk(true);
        let selected: Vec<_> = filter.components().collect();
        assert_eq!(selected, vec![Component::Apk, Component::Cache]);
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let filter: AppFilter = toml::from_str("use_cache = false").unwrap();
        assert!(filter.use_apk);
        assert!(!filter.use_cache);
    }
}
