use std::fmt::Debug;

use super::Space;

/// The variable implementations of a problem, owned by a [`Space`].
///
/// The kernel never looks inside a model. It copies it when the space is cloned and lets
/// propagators and branchings modify it through a [`super::PropagationContext`].
pub trait Model: Clone + Debug + Send + Sync + 'static {
    /// Copy the model for a cloned space.
    ///
    /// When `share` is true, immutable data may be shared with the original (for example through
    /// an `Arc`) instead of deep-copied. The default clones.
    fn copy(&self, share: bool) -> Self {
        let _ = share;
        self.clone()
    }

    /// An estimate of the heap memory held by the model, in bytes.
    fn memory(&self) -> usize {
        std::mem::size_of::<Self>()
    }
}

/// A model which can be restricted to solutions strictly better than an incumbent.
///
/// Required by branch-and-bound search. `constrain` usually posts a propagator on `home`
/// bounding the objective by the objective value of `incumbent`.
pub trait Constrain: Model {
    fn constrain(home: &mut Space<Self>, incumbent: &Self);
}
