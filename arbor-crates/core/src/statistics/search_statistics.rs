use std::iter::Sum;
use std::ops::AddAssign;

use super::StatisticLogger;

/// The counters kept by every search engine.
///
/// `propagate`, `fail`, `clone` and `commit` count events; `memory` and `depth` are peaks. Adding
/// statistics sums the counters and keeps the larger peaks, which is how the statistics of
/// parallel workers are merged.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Statistics {
    /// The number of propagator executions.
    pub propagate: u64,
    /// The number of failed nodes.
    pub fail: u64,
    /// The number of spaces cloned.
    pub clone: u64,
    /// The number of commits to an alternative, including those made while recomputing.
    pub commit: u64,
    /// The peak memory held by the stack and the current space, in bytes.
    pub memory: usize,
    /// The peak depth of the stack.
    pub depth: usize,
    /// The number of times the search restarted from the root.
    pub restart: u64,
}

impl Statistics {
    pub(crate) fn record_memory(&mut self, memory: usize) {
        self.memory = self.memory.max(memory);
    }

    pub(crate) fn record_depth(&mut self, depth: usize) {
        self.depth = self.depth.max(depth);
    }

    pub fn log(&self, statistic_logger: &StatisticLogger) {
        statistic_logger.log_statistic("propagations", self.propagate);
        statistic_logger.log_statistic("failures", self.fail);
        statistic_logger.log_statistic("clones", self.clone);
        statistic_logger.log_statistic("commits", self.commit);
        statistic_logger.log_statistic("peak_memory", self.memory);
        statistic_logger.log_statistic("peak_depth", self.depth);
        statistic_logger.log_statistic("restarts", self.restart);
    }
}

impl AddAssign for Statistics {
    fn add_assign(&mut self, other: Self) {
        self.propagate += other.propagate;
        self.fail += other.fail;
        self.clone += other.clone;
        self.commit += other.commit;
        self.memory = self.memory.max(other.memory);
        self.depth = self.depth.max(other.depth);
        self.restart += other.restart;
    }
}

impl Sum for Statistics {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Statistics::default(), |mut total, statistics| {
            total += statistics;
            total
        })
    }
}

/// The statistics of one worker of a [`crate::parallel::Controller`].
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ParallelStatistics {
    pub search: Statistics,
    /// The number of subtrees this worker gave away.
    pub shares: u64,
    /// The number of pieces of work this worker started on: its root, received subtrees and
    /// probed discrepancy levels.
    pub searches: u64,
}

impl ParallelStatistics {
    pub fn log(&self, statistic_logger: &StatisticLogger) {
        self.search.log(statistic_logger);
        statistic_logger.log_statistic("shares", self.shares);
        statistic_logger.log_statistic("searches", self.searches);
    }
}

impl AddAssign for ParallelStatistics {
    fn add_assign(&mut self, other: Self) {
        self.search += other.search;
        self.shares += other.shares;
        self.searches += other.searches;
    }
}

impl Sum for ParallelStatistics {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(ParallelStatistics::default(), |mut total, statistics| {
            total += statistics;
            total
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn merging_sums_counters_and_keeps_peaks() {
        let first = Statistics {
            propagate: 10,
            fail: 1,
            clone: 2,
            commit: 3,
            memory: 400,
            depth: 7,
            restart: 0,
        };
        let second = Statistics {
            propagate: 5,
            fail: 0,
            clone: 1,
            commit: 9,
            memory: 900,
            depth: 3,
            restart: 2,
        };

        let total: Statistics = [first, second].into_iter().sum();

        assert_eq!(
            total,
            Statistics {
                propagate: 15,
                fail: 1,
                clone: 3,
                commit: 12,
                memory: 900,
                depth: 7,
                restart: 2,
            }
        );
    }
}
