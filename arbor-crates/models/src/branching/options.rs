use arbor_core::kernel::VariableId;
use arbor_core::Space;

use super::FirstFail;
use super::InDomainMax;
use super::InDomainMiddle;
use super::InDomainMin;
use super::InDomainRandom;
use super::IndependentVariableValueBranching;
use super::InputOrder;
use super::ValueSelector;
use super::VariableSelector;
use crate::domains::IntModel;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "clap", derive(clap::ValueEnum))]
pub enum VariableOrder {
    InputOrder,
    #[default]
    FirstFail,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "clap", derive(clap::ValueEnum))]
pub enum ValueOrder {
    #[default]
    Min,
    Max,
    Middle,
    Random,
}

/// Selects the [`IndependentVariableValueBranching`] posted by a model.
///
/// ```
/// # use arbor_models::branching::BranchingOptions;
/// # use arbor_models::branching::ValueOrder;
/// let options = BranchingOptions::default()
///     .with_value_order(ValueOrder::Random)
///     .with_seed(7);
///
/// assert_eq!(options.seed, 7);
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BranchingOptions {
    pub variable_order: VariableOrder,
    pub value_order: ValueOrder,
    /// The seed of [`ValueOrder::Random`].
    pub seed: u64,
}

impl BranchingOptions {
    pub fn with_variable_order(mut self, variable_order: VariableOrder) -> Self {
        self.variable_order = variable_order;
        self
    }

    pub fn with_value_order(mut self, value_order: ValueOrder) -> Self {
        self.value_order = value_order;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Post the selected branching over `variables` on `space`.
    pub fn post<M: IntModel>(&self, space: &mut Space<M>, variables: &[VariableId]) {
        match self.variable_order {
            VariableOrder::InputOrder => self.post_with(space, InputOrder::new(variables)),
            VariableOrder::FirstFail => self.post_with(space, FirstFail::new(variables)),
        }
    }

    fn post_with<M: IntModel>(&self, space: &mut Space<M>, variables: impl VariableSelector) {
        match self.value_order {
            ValueOrder::Min => post(space, variables, InDomainMin),
            ValueOrder::Max => post(space, variables, InDomainMax),
            ValueOrder::Middle => post(space, variables, InDomainMiddle),
            ValueOrder::Random => post(space, variables, InDomainRandom::new(self.seed)),
        }
    }
}

fn post<M: IntModel>(
    space: &mut Space<M>,
    variables: impl VariableSelector,
    values: impl ValueSelector,
) {
    let _ = space.post_branching(IndependentVariableValueBranching::new(variables, values));
}
