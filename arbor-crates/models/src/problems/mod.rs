//! Demonstration problems, each building a root [`arbor_core::Space`] ready for search.
mod assignment;
mod queens;

pub use assignment::Assignment;
pub use assignment::CostMatrix;
pub use queens::Queens;
pub use queens::QueensPropagation;
