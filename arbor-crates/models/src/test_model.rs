//! A bare integer model for testing propagators and branchings in isolation.
use arbor_core::kernel::PropagationOutcome;
use arbor_core::kernel::Propagator;
use arbor_core::kernel::VariableId;
use arbor_core::Model;
use arbor_core::Space;
use arbor_core::Statistics;

use crate::domains::IntDomains;
use crate::domains::IntModel;

#[derive(Debug, Clone, Default)]
pub(crate) struct TestModel {
    domains: IntDomains,
}

impl Model for TestModel {}

impl IntModel for TestModel {
    fn domains(&self) -> &IntDomains {
        &self.domains
    }

    fn domains_mut(&mut self) -> &mut IntDomains {
        &mut self.domains
    }
}

/// Collects variables until a propagator is posted, then owns the space.
#[derive(Debug, Default)]
pub(crate) struct TestSolver {
    model: TestModel,
}

impl TestSolver {
    pub(crate) fn new_variable(&mut self, lower_bound: i32, upper_bound: i32) -> VariableId {
        self.model.domains.new_variable(lower_bound, upper_bound)
    }

    pub(crate) fn remove(&mut self, variable: VariableId, value: i32) {
        let _ = self
            .model
            .domains
            .remove(variable, value)
            .expect("removing a value leaves the domain non-empty");
    }

    pub(crate) fn into_space(self) -> Space<TestModel> {
        Space::new(self.model)
    }

    /// Post `propagator` on a space over the variables created so far and propagate it.
    pub(crate) fn propagate(
        &self,
        propagator: impl Propagator<TestModel> + 'static,
    ) -> Result<Space<TestModel>, PropagationOutcome> {
        let mut space = Space::new(self.model.clone());
        let _ = space.post_propagator(propagator);

        match space.propagate(&mut Statistics::default()) {
            PropagationOutcome::Stable => Ok(space),
            PropagationOutcome::Failed => Err(PropagationOutcome::Failed),
        }
    }
}

pub(crate) fn bounds(space: &Space<TestModel>, variable: VariableId) -> (i32, i32) {
    let domains = space.model().domains();
    (domains.lower_bound(variable), domains.upper_bound(variable))
}

pub(crate) fn values(space: &Space<TestModel>, variable: VariableId) -> Vec<i32> {
    space.model().domains()[variable].values().collect()
}
