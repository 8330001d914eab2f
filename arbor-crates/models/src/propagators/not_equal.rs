use arbor_core::kernel::ExecStatus;
use arbor_core::kernel::Priority;
use arbor_core::kernel::PropagationContext;
use arbor_core::kernel::PropagationStatus;
use arbor_core::kernel::Propagator;
use arbor_core::kernel::VariableId;

use crate::domains::IntModel;

/// Propagator for the constraint `a != b + offset`.
///
/// Prunes only once one of the two sides is fixed, after which the constraint is entailed.
#[derive(Debug, Clone, Copy)]
pub struct NotEqualPropagator {
    a: VariableId,
    b: VariableId,
    offset: i32,
}

impl NotEqualPropagator {
    pub fn new(a: VariableId, b: VariableId, offset: i32) -> Self {
        NotEqualPropagator { a, b, offset }
    }
}

impl<M: IntModel> Propagator<M> for NotEqualPropagator {
    fn name(&self) -> &str {
        "NotEqual"
    }

    fn variables(&self) -> Vec<VariableId> {
        vec![self.a, self.b]
    }

    fn priority(&self) -> Priority {
        Priority::High
    }

    fn propagate(&mut self, context: &mut PropagationContext<'_, M>) -> PropagationStatus {
        let NotEqualPropagator { a, b, offset } = *self;
        let domains = context.model().domains();
        let (value_a, value_b) = (domains.value(a), domains.value(b));

        if let Some(value) = value_b {
            let _ = context.modify(a, |model| model.domains_mut().remove(a, value + offset))?;
            return Ok(ExecStatus::Subsumed);
        }

        if let Some(value) = value_a {
            let _ = context.modify(b, |model| model.domains_mut().remove(b, value - offset))?;
            return Ok(ExecStatus::Subsumed);
        }

        Ok(ExecStatus::Fix)
    }
}
