use arbor_core::kernel::VariableId;
use log::warn;

use super::VariableSelector;
use crate::domains::IntDomains;

/// A [`VariableSelector`] which selects the first unfixed variable in the order in which the
/// variables were provided.
#[derive(Debug, Clone)]
pub struct InputOrder {
    variables: Box<[VariableId]>,
}

impl InputOrder {
    pub fn new(variables: &[VariableId]) -> Self {
        if variables.is_empty() {
            warn!("The InputOrder variable selector was not provided with any variables");
        }

        InputOrder {
            variables: variables.into(),
        }
    }
}

impl VariableSelector for InputOrder {
    fn select_variable(&self, domains: &IntDomains) -> Option<VariableId> {
        self.variables
            .iter()
            .copied()
            .find(|&variable| !domains.is_fixed(variable))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fixed_variables_are_skipped() {
        let mut domains = IntDomains::default();
        let x = domains.new_variable(0, 0);
        let y = domains.new_variable(0, 5);
        let z = domains.new_variable(0, 1);

        let selector = InputOrder::new(&[x, y, z]);
        assert_eq!(selector.select_variable(&domains), Some(y));

        let _ = domains.assign(y, 3);
        assert_eq!(selector.select_variable(&domains), Some(z));

        let _ = domains.assign(z, 1);
        assert_eq!(selector.select_variable(&domains), None);
    }
}
