use std::fmt::Debug;

use arbor_core::kernel::VariableId;

use crate::domains::IntDomains;

/// Decides which value the selected variable is assigned in the first alternative.
pub trait ValueSelector: Debug + Clone + Send + 'static {
    /// A value in the domain of `variable`, which is not fixed.
    fn select_value(&self, domains: &IntDomains, variable: VariableId) -> i32;
}
