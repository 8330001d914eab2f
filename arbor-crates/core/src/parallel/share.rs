/// Which open node of a worker's stack is given away when another worker asks for work.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "clap", derive(clap::ValueEnum))]
pub enum SharePolicy {
    /// The shallowest open node; gives away the largest subtree.
    #[default]
    Bottom,
    /// The deepest open node; gives away the smallest subtree.
    Top,
    /// The open node closest to a stored copy; the shared space is the cheapest to rebuild.
    Recomputation,
}

/// How parallel workers share work.
///
/// ```
/// # use arbor_core::parallel::SharePolicy;
/// # use arbor_core::parallel::ShareStrategy;
/// let strategy = ShareStrategy::default()
///     .with_policy(SharePolicy::Top)
///     .with_stack_size_threshold(0);
///
/// assert_eq!(strategy.policy, SharePolicy::Top);
/// assert_eq!(strategy.lds_increment, 1);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ShareStrategy {
    pub policy: SharePolicy,
    /// A worker only gives work away while its stack holds more nodes than this.
    pub stack_size_threshold: usize,
    /// The number of discrepancy levels handed to an idle worker at once in parallel limited
    /// discrepancy search.
    pub lds_increment: u32,
}

impl Default for ShareStrategy {
    fn default() -> Self {
        ShareStrategy {
            policy: SharePolicy::default(),
            stack_size_threshold: 3,
            lds_increment: 1,
        }
    }
}

impl ShareStrategy {
    pub fn with_policy(mut self, policy: SharePolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn with_stack_size_threshold(mut self, stack_size_threshold: usize) -> Self {
        self.stack_size_threshold = stack_size_threshold;
        self
    }

    pub fn with_lds_increment(mut self, lds_increment: u32) -> Self {
        self.lds_increment = lds_increment.max(1);
        self
    }
}
