use std::fmt::Debug;

use arbor_core::kernel::VariableId;

use crate::domains::IntDomains;

/// Decides which variable is branched on next.
pub trait VariableSelector: Debug + Clone + Send + 'static {
    /// The variable to branch on, or [`None`] once all variables of the selector are fixed.
    fn select_variable(&self, domains: &IntDomains) -> Option<VariableId>;
}
