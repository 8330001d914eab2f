use arbor_core::kernel::VariableId;
use log::warn;

use super::VariableSelector;
use crate::domains::IntDomains;

/// A [`VariableSelector`] which selects the unfixed variable with the fewest values. Ties are
/// broken by input order.
#[derive(Debug, Clone)]
pub struct FirstFail {
    variables: Box<[VariableId]>,
}

impl FirstFail {
    pub fn new(variables: &[VariableId]) -> Self {
        if variables.is_empty() {
            warn!("The FirstFail variable selector was not provided with any variables");
        }

        FirstFail {
            variables: variables.into(),
        }
    }
}

impl VariableSelector for FirstFail {
    fn select_variable(&self, domains: &IntDomains) -> Option<VariableId> {
        self.variables
            .iter()
            .copied()
            .filter(|&variable| !domains.is_fixed(variable))
            .min_by_key(|&variable| domains[variable].size())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn the_smallest_domain_is_selected() {
        let mut domains = IntDomains::default();
        let x = domains.new_variable(0, 10);
        let y = domains.new_variable(0, 3);
        let z = domains.new_variable(5, 6);
        let fixed = domains.new_variable(1, 1);

        let selector = FirstFail::new(&[x, y, fixed, z]);
        assert_eq!(selector.select_variable(&domains), Some(z));
    }

    #[test]
    fn ties_are_broken_by_input_order() {
        let mut domains = IntDomains::default();
        let x = domains.new_variable(0, 4);
        let y = domains.new_variable(0, 3);
        let z = domains.new_variable(10, 13);
        let _ = domains.remove(x, 2);

        let selector = FirstFail::new(&[z, x, y]);
        assert_eq!(selector.select_variable(&domains), Some(z));
    }
}
