use std::sync::Arc;

use arbor_core::kernel::ExecStatus;
use arbor_core::kernel::PropagationContext;
use arbor_core::kernel::PropagationStatus;
use arbor_core::kernel::Propagator;
use arbor_core::kernel::VariableId;
use fnv::FnvHashSet;

use crate::domains::IntModel;

/// Propagator for the constraint `values[index] = result`.
///
/// Domain consistent: indices whose value is not in the domain of `result` are removed, and
/// values of `result` not supported by any remaining index are removed.
#[derive(Debug, Clone)]
pub struct ElementPropagator {
    index: VariableId,
    values: Arc<[i32]>,
    result: VariableId,
}

impl ElementPropagator {
    pub fn new(index: VariableId, values: Arc<[i32]>, result: VariableId) -> Self {
        ElementPropagator {
            index,
            values,
            result,
        }
    }
}

impl<M: IntModel> Propagator<M> for ElementPropagator {
    fn name(&self) -> &str {
        "Element"
    }

    fn variables(&self) -> Vec<VariableId> {
        vec![self.index, self.result]
    }

    fn propagate(&mut self, context: &mut PropagationContext<'_, M>) -> PropagationStatus {
        let (index, result) = (self.index, self.result);

        let _ = context.modify(index, |model| {
            let domains = model.domains_mut();
            let lower = domains.set_lower_bound(index, 0)?;
            let upper = domains.set_upper_bound(index, self.values.len() as i32 - 1)?;
            Ok(lower || upper)
        })?;

        loop {
            let domains = context.model().domains();
            let unsupported_indices = domains[index]
                .values()
                .filter(|&i| !domains[result].contains(self.values[i as usize]))
                .collect::<Vec<_>>();
            let supported = domains[index]
                .values()
                .map(|i| self.values[i as usize])
                .collect::<FnvHashSet<_>>();
            let unsupported_results = domains[result]
                .values()
                .filter(|value| !supported.contains(value))
                .collect::<Vec<_>>();

            if unsupported_indices.is_empty() && unsupported_results.is_empty() {
                break;
            }

            for i in unsupported_indices {
                let _ = context.modify(index, |model| model.domains_mut().remove(index, i))?;
            }
            for value in unsupported_results {
                let _ = context.modify(result, |model| model.domains_mut().remove(result, value))?;
            }
        }

        if context.model().domains().is_fixed(index) {
            Ok(ExecStatus::Subsumed)
        } else {
            Ok(ExecStatus::Fix)
        }
    }
}
