use crate::enums::{DegenerateFit, OutputFormat, ValueOrdering};

/// Knobs for one regression run.
///
/// `Default` gives the documented behaviour: independent values must already
/// be ascending, degenerate fits are written as zero, the global rayon pool
/// is used and maps are written gzip compressed.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RegressionConfig {
    pub ordering: ValueOrdering,
    pub degenerate: DegenerateFit,
    /// Worker threads for the voxel pass; `None` uses the global pool
    pub threads: Option<usize>,
    pub format: OutputFormat,
}

impl RegressionConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_ordering(mut self, ordering: ValueOrdering) -> Self {
        self.ordering = ordering;
        self
    }

    pub fn with_degenerate(mut self, degenerate: DegenerateFit) -> Self {
        self.degenerate = degenerate;
        self
    }

    /// Zero threads is treated as "use the global pool"
    pub fn with_threads(mut self, threads: Option<usize>) -> Self {
        self.threads = threads.filter(|&n| n > 0);
        self
    }

    pub fn with_format(mut self, format: OutputFormat) -> Self {
        self.format = format;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = RegressionConfig::new();
        assert_eq!(config.ordering, ValueOrdering::Validate);
        assert_eq!(config.degenerate, DegenerateFit::Zero);
        assert_eq!(config.threads, None);
        assert_eq!(config.format, OutputFormat::NiiGz);
    }

    #[test]
    fn test_zero_threads_means_global_pool() {
        assert_eq!(RegressionConfig::new().with_threads(Some(0)).threads, None);
        assert_eq!(RegressionConfig::new().with_threads(Some(4)).threads, Some(4));
    }
}
