//! # Arbor
//! The search core of the Arbor constraint programming engine.
//!
//! A [`Space`] owns a model together with the propagators and branchings posted on it. It
//! propagates to a fixpoint, reports whether it is failed, solved or at a choice point, and can
//! be cloned and committed to one of the alternatives of a choice. The engines in [`search`]
//! explore the resulting search tree sequentially, trading memory for time through
//! recomputation; the [`parallel::Controller`] spreads the same exploration over several worker
//! threads.
//!
//! # Example
//! ```ignore
//! let mut root = Space::new(model);
//! root.post_propagator(propagator);
//! root.post_branching(branching);
//!
//! let mut engine = Dfs::new(root, &SearchOptions::default());
//! while let Some(solution) = engine.next() {
//!     println!("{:?}", solution.model());
//! }
//! ```
pub mod asserts;
pub mod containers;
pub mod kernel;
pub mod parallel;
pub mod search;
pub mod statistics;

#[cfg(test)]
pub(crate) mod testing;

pub use convert_case;

pub use crate::kernel::BranchingDesc;
pub use crate::kernel::Constrain;
pub use crate::kernel::Model;
pub use crate::kernel::Space;
pub use crate::kernel::SpaceStatus;
pub use crate::parallel::Controller;
pub use crate::search::SearchEngine;
pub use crate::search::SearchOptions;
pub use crate::statistics::Statistics;
