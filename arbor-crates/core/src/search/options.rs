use crate::parallel::ShareStrategy;

/// The default number of commits between two stored copies of the space.
pub const DEFAULT_COMMIT_DISTANCE: u32 = 8;
/// The default recomputation distance from which an extra copy is stored halfway.
pub const DEFAULT_ADAPTIVE_DISTANCE: u32 = 2;
/// The default maximum number of discrepancies explored by limited discrepancy search.
pub const DEFAULT_DISCREPANCY_LIMIT: u32 = 3;

/// Options shared by the search engines.
///
/// ```
/// # use arbor_core::SearchOptions;
/// let options = SearchOptions::default()
///     .with_commit_distance(16)
///     .with_threads(4);
///
/// assert_eq!(options.commit_distance, 16);
/// assert_eq!(options.adaptive_distance, 2);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SearchOptions {
    /// A copy of the space is stored at most every `commit_distance` choice points (`c_d`). A
    /// value of 1 stores a copy at every choice point.
    pub commit_distance: u32,
    /// When a space has to be recomputed over at least this many commits (`a_d`), an extra copy
    /// is stored halfway along the path.
    pub adaptive_distance: u32,
    /// The largest number of discrepancies explored by [`crate::search::Lds`].
    pub discrepancy_limit: u32,
    /// The number of workers used by a [`crate::parallel::Controller`].
    pub threads: usize,
    /// How parallel workers share work.
    pub share: ShareStrategy,
}

impl Default for SearchOptions {
    fn default() -> Self {
        SearchOptions {
            commit_distance: DEFAULT_COMMIT_DISTANCE,
            adaptive_distance: DEFAULT_ADAPTIVE_DISTANCE,
            discrepancy_limit: DEFAULT_DISCREPANCY_LIMIT,
            threads: 1,
            share: ShareStrategy::default(),
        }
    }
}

impl SearchOptions {
    pub fn with_commit_distance(mut self, commit_distance: u32) -> Self {
        self.commit_distance = commit_distance.max(1);
        self
    }

    pub fn with_adaptive_distance(mut self, adaptive_distance: u32) -> Self {
        self.adaptive_distance = adaptive_distance;
        self
    }

    pub fn with_discrepancy_limit(mut self, discrepancy_limit: u32) -> Self {
        self.discrepancy_limit = discrepancy_limit;
        self
    }

    pub fn with_threads(mut self, threads: usize) -> Self {
        self.threads = threads.max(1);
        self
    }

    pub fn with_share_strategy(mut self, share: ShareStrategy) -> Self {
        self.share = share;
        self
    }
}
