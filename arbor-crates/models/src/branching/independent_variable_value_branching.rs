use std::marker::PhantomData;

use arbor_core::kernel::Branching;
use arbor_core::kernel::BranchingDesc;
use arbor_core::kernel::BranchingId;
use arbor_core::kernel::Inconsistency;
use arbor_core::kernel::PropagationContext;
use arbor_core::kernel::VariableId;

use super::ValueSelector;
use super::VariableSelector;
use crate::domains::IntModel;

/// A binary branching which selects a variable and a value independently.
///
/// The description records the variable and the value. Alternative 0 assigns the value,
/// alternative 1 removes it.
#[derive(Debug)]
pub struct IndependentVariableValueBranching<M, VariableSelection, ValueSelection> {
    variable_selector: VariableSelection,
    value_selector: ValueSelection,
    model: PhantomData<fn(&M)>,
}

impl<M, VariableSelection: Clone, ValueSelection: Clone> Clone
    for IndependentVariableValueBranching<M, VariableSelection, ValueSelection>
{
    fn clone(&self) -> Self {
        IndependentVariableValueBranching {
            variable_selector: self.variable_selector.clone(),
            value_selector: self.value_selector.clone(),
            model: PhantomData,
        }
    }
}

impl<M, VariableSelection, ValueSelection>
    IndependentVariableValueBranching<M, VariableSelection, ValueSelection>
{
    pub fn new(variable_selector: VariableSelection, value_selector: ValueSelection) -> Self {
        IndependentVariableValueBranching {
            variable_selector,
            value_selector,
            model: PhantomData,
        }
    }
}

impl<M, VariableSelection, ValueSelection> Branching<M>
    for IndependentVariableValueBranching<M, VariableSelection, ValueSelection>
where
    M: IntModel,
    VariableSelection: VariableSelector,
    ValueSelection: ValueSelector,
{
    fn name(&self) -> &str {
        "IndependentVariableValue"
    }

    fn status(&self, model: &M) -> bool {
        self.variable_selector
            .select_variable(model.domains())
            .is_some()
    }

    fn description(&self, id: BranchingId, model: &M) -> BranchingDesc {
        let domains = model.domains();
        let variable = self
            .variable_selector
            .select_variable(domains)
            .expect("a description is only requested while a variable is unfixed");
        let value = self.value_selector.select_value(domains, variable);

        BranchingDesc::new(id, 2, [variable.0 as i64, value as i64])
    }

    fn commit(
        &self,
        context: &mut PropagationContext<'_, M>,
        desc: &BranchingDesc,
        alternative: u32,
    ) -> Result<(), Inconsistency> {
        let variable = VariableId(desc.value(0) as u32);
        let value = desc.value(1) as i32;

        let _ = if alternative == 0 {
            context.modify(variable, |model| model.domains_mut().assign(variable, value))?
        } else {
            context.modify(variable, |model| model.domains_mut().remove(variable, value))?
        };

        Ok(())
    }
}
