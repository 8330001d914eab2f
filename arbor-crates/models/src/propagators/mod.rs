//! Propagators over the integer variables of an [`crate::IntModel`].
//!
//! All propagators run to their own fixpoint before returning
//! [`arbor_core::kernel::ExecStatus::Fix`], since the kernel does not wake a propagator for its
//! own modifications.
mod all_different;
mod element;
mod linear_less_or_equal;
mod not_equal;

pub use all_different::AllDifferentPropagator;
pub use element::ElementPropagator;
pub use linear_less_or_equal::LinearLessOrEqualPropagator;
pub use not_equal::NotEqualPropagator;
