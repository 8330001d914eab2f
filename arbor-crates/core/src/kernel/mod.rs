//! The computation space: propagation to a fixpoint, choice points, commit and clone.
mod branching;
mod error;
mod ids;
mod model;
mod propagator;
mod propagator_queue;
mod space;

pub use branching::*;
pub use error::*;
pub use ids::*;
pub use model::*;
pub use propagator::*;
pub use space::*;
