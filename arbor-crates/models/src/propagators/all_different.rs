use arbor_core::kernel::ExecStatus;
use arbor_core::kernel::PropagationContext;
use arbor_core::kernel::PropagationStatus;
use arbor_core::kernel::Propagator;
use arbor_core::kernel::VariableId;

use crate::domains::IntModel;

/// Propagator for the constraint that all `x_i + offset_i` take different values.
///
/// Value propagation: the shifted value of every fixed variable is removed from all others, until
/// no more variables become fixed.
#[derive(Debug, Clone)]
pub struct AllDifferentPropagator {
    variables: Box<[VariableId]>,
    offsets: Box<[i32]>,
}

impl AllDifferentPropagator {
    pub fn new(variables: impl Into<Box<[VariableId]>>) -> Self {
        let variables = variables.into();
        let offsets = vec![0; variables.len()].into();

        AllDifferentPropagator { variables, offsets }
    }

    /// All different over `variables[i] + offsets[i]`.
    pub fn with_offsets(
        variables: impl Into<Box<[VariableId]>>,
        offsets: impl Into<Box<[i32]>>,
    ) -> Self {
        let variables = variables.into();
        let offsets = offsets.into();
        assert_eq!(
            variables.len(),
            offsets.len(),
            "every variable needs an offset"
        );

        AllDifferentPropagator { variables, offsets }
    }
}

impl<M: IntModel> Propagator<M> for AllDifferentPropagator {
    fn name(&self) -> &str {
        "AllDifferent"
    }

    fn variables(&self) -> Vec<VariableId> {
        self.variables.to_vec()
    }

    fn propagate(&mut self, context: &mut PropagationContext<'_, M>) -> PropagationStatus {
        let mut done = vec![false; self.variables.len()];

        loop {
            let fixed = self
                .variables
                .iter()
                .enumerate()
                .filter(|&(index, _)| !done[index])
                .filter_map(|(index, &variable)| {
                    let value = context.model().domains().value(variable)?;
                    Some((index, value + self.offsets[index]))
                })
                .collect::<Vec<_>>();

            if fixed.is_empty() {
                break;
            }

            for (index, shifted) in fixed {
                done[index] = true;

                for (other, &variable) in self.variables.iter().enumerate() {
                    if other == index {
                        continue;
                    }
                    let value = shifted - self.offsets[other];
                    let _ = context.modify(variable, |model| {
                        model.domains_mut().remove(variable, value)
                    })?;
                }
            }
        }

        if done.iter().all(|&done| done) {
            Ok(ExecStatus::Subsumed)
        } else {
            Ok(ExecStatus::Fix)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_model::values;
    use crate::test_model::TestSolver;

    #[test]
    fn fixed_values_are_removed_transitively() {
        let mut solver = TestSolver::default();
        let x = solver.new_variable(1, 1);
        let y = solver.new_variable(1, 2);
        let z = solver.new_variable(1, 3);

        let space = solver
            .propagate(AllDifferentPropagator::new([x, y, z]))
            .expect("non-empty domains");

        assert_eq!(values(&space, y), vec![2]);
        assert_eq!(values(&space, z), vec![3]);
        assert_eq!(space.num_propagators(), 0);
    }

    #[test]
    fn offsets_shift_the_removed_values() {
        let mut solver = TestSolver::default();
        let x = solver.new_variable(0, 0);
        let y = solver.new_variable(0, 3);

        // x + 0 != y + 1
        let space = solver
            .propagate(AllDifferentPropagator::with_offsets([x, y], [0, 1]))
            .expect("non-empty domain");

        assert_eq!(values(&space, y), vec![0, 1, 2, 3]);

        let mut solver = TestSolver::default();
        let x = solver.new_variable(2, 2);
        let y = solver.new_variable(0, 3);
        let space = solver
            .propagate(AllDifferentPropagator::with_offsets([x, y], [0, 1]))
            .expect("non-empty domain");

        assert_eq!(values(&space, y), vec![0, 2, 3]);
    }

    #[test]
    fn two_equal_fixed_values_fail() {
        let mut solver = TestSolver::default();
        let x = solver.new_variable(0, 1);
        let y = solver.new_variable(0, 1);
        let z = solver.new_variable(0, 1);

        assert!(solver
            .propagate(AllDifferentPropagator::new([x, y, z]))
            .is_ok());

        solver.remove(x, 1);
        solver.remove(y, 1);
        assert!(solver
            .propagate(AllDifferentPropagator::new([x, y, z]))
            .is_err());
    }
}
