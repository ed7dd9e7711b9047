//! Run configuration.

use std::path::PathBuf;

use leakcheck_smt::Mode;

/// Parameters shared by every labeling verified in one run.
#[derive(Clone, Debug)]
pub struct DriverConfig {
    /// Maximum number of simultaneously activated probes.
    pub order: u32,
    /// Stable or transient gate semantics.
    pub mode: Mode,
    /// Worker pool size for "optimized" mode.
    pub pool_size: usize,
    /// Verify the optimized per-secret labeling family instead of the
    /// single canonical labeling.
    pub optimized: bool,
    /// Optional directory to dump each SAT labeling's satisfying model as
    /// JSON.
    pub dump_model: Option<PathBuf>,
}

impl Default for DriverConfig {
    fn default() -> Self {
        Self { order: 1, mode: Mode::Stable, pool_size: 10, optimized: false, dump_model: None }
    }
}

impl DriverConfig {
    /// Sets the probing order.
    #[must_use]
    pub const fn with_order(mut self, order: u32) -> Self {
        self.order = order;
        self
    }

    /// Sets stable/transient mode.
    #[must_use]
    pub const fn with_mode(mut self, mode: Mode) -> Self {
        self.mode = mode;
        self
    }

    /// Sets the worker pool size.
    #[must_use]
    pub const fn with_pool_size(mut self, pool_size: usize) -> Self {
        self.pool_size = pool_size;
        self
    }

    /// Enables or disables the optimized per-secret labeling family.
    #[must_use]
    pub const fn with_optimized(mut self, optimized: bool) -> Self {
        self.optimized = optimized;
        self
    }

    /// Sets the model-dump directory.
    #[must_use]
    pub fn with_dump_model(mut self, dir: PathBuf) -> Self {
        self.dump_model = Some(dir);
        self
    }
}
