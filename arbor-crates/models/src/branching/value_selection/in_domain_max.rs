use arbor_core::kernel::VariableId;

use super::ValueSelector;
use crate::domains::IntDomains;

/// A [`ValueSelector`] which selects the upper bound.
#[derive(Debug, Clone, Copy, Default)]
pub struct InDomainMax;

impl ValueSelector for InDomainMax {
    fn select_value(&self, domains: &IntDomains, variable: VariableId) -> i32 {
        domains.upper_bound(variable)
    }
}
