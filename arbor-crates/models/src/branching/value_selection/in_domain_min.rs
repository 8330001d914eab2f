use arbor_core::kernel::VariableId;

use super::ValueSelector;
use crate::domains::IntDomains;

/// A [`ValueSelector`] which selects the lower bound.
#[derive(Debug, Clone, Copy, Default)]
pub struct InDomainMin;

impl ValueSelector for InDomainMin {
    fn select_value(&self, domains: &IntDomains, variable: VariableId) -> i32 {
        domains.lower_bound(variable)
    }
}
