//! Bundle loading configuration.

/// Configuration for [`Bundle::with_config`](crate::Bundle::with_config).
#[derive(Debug, Clone)]
pub struct BundleConfig {
    /// Verify every item's signature when the bundle is loaded.
    pub verify_on_load: bool,
    /// Upper bound on the item count a bundle may declare.
    pub max_items: u64,
}

impl Default for BundleConfig {
    fn default() -> Self {
        Self {
            verify_on_load: false,
            max_items: 1_000_000,
        }
    }
}

impl BundleConfig {
    /// Defaults with verification on load enabled.
    pub fn verified() -> Self {
        Self {
            verify_on_load: true,
            ..Self::default()
        }
    }
}
