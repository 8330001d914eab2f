//! Branchings over integer variables.
//!
//! An [`IndependentVariableValueBranching`] combines a [`VariableSelector`], which picks the
//! next unfixed variable, with a [`ValueSelector`], which picks a value for it. Every choice point
//! has two alternatives: the variable is assigned the value, or the value is removed.
//!
//! Both selectors only look at the domains, so a description can be reproduced on any copy of
//! the model.
mod independent_variable_value_branching;
mod options;
mod value_selection;
mod variable_selection;

pub use independent_variable_value_branching::IndependentVariableValueBranching;
pub use options::BranchingOptions;
pub use options::ValueOrder;
pub use options::VariableOrder;
pub use value_selection::*;
pub use variable_selection::*;
