//! Builder for configuring [`Pipeline`] runs.
//!
//! Validation happens once in [`PipelineBuilder::build`], so a constructed
//! [`Pipeline`] always carries a usable configuration.

use std::num::NonZeroUsize;

use crate::{Result, aggregation::Heuristic, error::AgglomError, pipeline::Pipeline};

/// Configures and constructs [`Pipeline`] instances.
///
/// # Examples
/// ```
/// use agglom_core::{Heuristic, PipelineBuilder};
///
/// let pipeline = PipelineBuilder::new()
///     .with_heuristic(Heuristic::RetainTriangulation)
///     .with_levels(3)
///     .with_seed(42)
///     .build()
///     .expect("builder configuration is valid");
/// assert_eq!(pipeline.levels().get(), 3);
/// assert_eq!(pipeline.seed(), Some(42));
/// ```
#[derive(Debug, Clone)]
pub struct PipelineBuilder {
    heuristic: Heuristic,
    levels: usize,
    seed: Option<u64>,
    resolve_overlaps: bool,
}

impl Default for PipelineBuilder {
    fn default() -> Self {
        Self {
            heuristic: Heuristic::Uniform,
            levels: 1,
            seed: None,
            resolve_overlaps: true,
        }
    }
}

impl PipelineBuilder {
    /// Creates a builder populated with default parameters.
    ///
    /// # Examples
    /// ```
    /// use agglom_core::{Heuristic, PipelineBuilder};
    ///
    /// let builder = PipelineBuilder::new();
    /// assert_eq!(builder.heuristic(), Heuristic::Uniform);
    /// assert_eq!(builder.levels(), 1);
    /// assert_eq!(builder.seed(), None);
    /// ```
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Selects the merge heuristic.
    #[must_use]
    pub fn with_heuristic(mut self, heuristic: Heuristic) -> Self {
        self.heuristic = heuristic;
        self
    }

    /// Returns the configured heuristic.
    #[must_use]
    pub fn heuristic(&self) -> Heuristic {
        self.heuristic
    }

    /// Sets how many coarsening levels to cluster.
    ///
    /// # Examples
    /// ```
    /// use agglom_core::PipelineBuilder;
    ///
    /// let builder = PipelineBuilder::new().with_levels(4);
    /// assert_eq!(builder.levels(), 4);
    /// ```
    #[must_use]
    pub fn with_levels(mut self, levels: usize) -> Self {
        self.levels = levels;
        self
    }

    /// Returns the configured level count.
    #[must_use]
    pub fn levels(&self) -> usize {
        self.levels
    }

    /// Fixes the random seed so runs are reproducible.
    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Returns the configured seed, if any.
    #[must_use]
    pub fn seed(&self) -> Option<u64> {
        self.seed
    }

    /// Chooses whether overlapping ground-truth communities are reduced to
    /// disjoint ones before scoring. Enabled by default.
    #[must_use]
    pub fn with_resolve_overlaps(mut self, resolve: bool) -> Self {
        self.resolve_overlaps = resolve;
        self
    }

    /// Returns whether overlapping communities are resolved.
    #[must_use]
    pub fn resolve_overlaps(&self) -> bool {
        self.resolve_overlaps
    }

    /// Validates the configuration and constructs a [`Pipeline`].
    ///
    /// # Errors
    /// Returns [`AgglomError::InvalidLevels`] when the level count is zero.
    ///
    /// # Examples
    /// ```
    /// use agglom_core::{AgglomError, PipelineBuilder};
    ///
    /// let err = PipelineBuilder::new().with_levels(0).build().unwrap_err();
    /// assert!(matches!(err, AgglomError::InvalidLevels { got: 0 }));
    /// ```
    pub fn build(self) -> Result<Pipeline> {
        let levels =
            NonZeroUsize::new(self.levels).ok_or(AgglomError::InvalidLevels { got: self.levels })?;
        Ok(Pipeline::new(
            self.heuristic,
            levels,
            self.seed,
            self.resolve_overlaps,
        ))
    }
}
