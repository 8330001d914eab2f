//! # Arbor models
//! Integer variables with finite domains, propagators and branchings over them, and a few
//! problems for exercising the search engines of [`arbor_core`].
//!
//! A model implements [`IntModel`] by exposing its [`IntDomains`]; every propagator in
//! [`propagators`] and every branching in [`branching`] then works on it.
//!
//! # Example
//! ```
//! use arbor_core::search::Dfs;
//! use arbor_core::SearchEngine;
//! use arbor_core::SearchOptions;
//! use arbor_models::branching::BranchingOptions;
//! use arbor_models::problems::Queens;
//! use arbor_models::problems::QueensPropagation;
//!
//! let root = Queens::space(6, QueensPropagation::AllDifferent, &BranchingOptions::default());
//! let mut engine = Dfs::new(root, &SearchOptions::default());
//!
//! let mut solutions = 0;
//! while let Some(solution) = engine.next() {
//!     assert!(Queens::is_valid_placement(&solution.model().placement().unwrap()));
//!     solutions += 1;
//! }
//! assert_eq!(solutions, 4);
//! ```
pub mod branching;
mod domains;
mod error;
pub mod problems;
pub mod propagators;

#[cfg(test)]
pub(crate) mod test_model;

pub use domains::*;
pub use error::ModelError;
