use arbor_core::kernel::ExecStatus;
use arbor_core::kernel::Inconsistency;
use arbor_core::kernel::Priority;
use arbor_core::kernel::PropagationContext;
use arbor_core::kernel::PropagationStatus;
use arbor_core::kernel::Propagator;
use arbor_core::kernel::VariableId;

use crate::domains::IntDomains;
use crate::domains::IntModel;

/// Propagator for the constraint `\sum w_i * x_i <= c`, by bounds reasoning.
#[derive(Debug, Clone)]
pub struct LinearLessOrEqualPropagator {
    terms: Box<[(i32, VariableId)]>,
    c: i64,
}

impl LinearLessOrEqualPropagator {
    /// Terms with a zero weight are dropped.
    pub fn new(terms: impl IntoIterator<Item = (i32, VariableId)>, c: i64) -> Self {
        let terms = terms
            .into_iter()
            .filter(|&(weight, _)| weight != 0)
            .collect();

        LinearLessOrEqualPropagator { terms, c }
    }

    fn min_term(domains: &IntDomains, (weight, variable): (i32, VariableId)) -> i64 {
        if weight > 0 {
            weight as i64 * domains.lower_bound(variable) as i64
        } else {
            weight as i64 * domains.upper_bound(variable) as i64
        }
    }

    fn max_term(domains: &IntDomains, (weight, variable): (i32, VariableId)) -> i64 {
        if weight > 0 {
            weight as i64 * domains.upper_bound(variable) as i64
        } else {
            weight as i64 * domains.lower_bound(variable) as i64
        }
    }
}

impl<M: IntModel> Propagator<M> for LinearLessOrEqualPropagator {
    fn name(&self) -> &str {
        "LinearLeq"
    }

    fn variables(&self) -> Vec<VariableId> {
        self.terms.iter().map(|&(_, variable)| variable).collect()
    }

    fn priority(&self) -> Priority {
        Priority::Low
    }

    fn propagate(&mut self, context: &mut PropagationContext<'_, M>) -> PropagationStatus {
        let domains = context.model().domains();
        let lower_bound_left_hand_side = self
            .terms
            .iter()
            .map(|&term| Self::min_term(domains, term))
            .sum::<i64>();

        if lower_bound_left_hand_side > self.c {
            return Err(Inconsistency);
        }

        let upper_bound_left_hand_side = self
            .terms
            .iter()
            .map(|&term| Self::max_term(domains, term))
            .sum::<i64>();
        if upper_bound_left_hand_side <= self.c {
            return Ok(ExecStatus::Subsumed);
        }

        // Tightening one term only moves the bound opposite to its minimal contribution, so a
        // single pass is a fixpoint.
        let bounds = self
            .terms
            .iter()
            .map(|&term| {
                let slack = self.c - (lower_bound_left_hand_side - Self::min_term(domains, term));
                (term, slack)
            })
            .collect::<Vec<_>>();

        for ((weight, variable), slack) in bounds {
            let weight = weight as i64;
            if weight > 0 {
                let bound = slack.div_euclid(weight);
                let bound = bound.clamp(i32::MIN as i64, i32::MAX as i64);
                let _ = context.modify(variable, |model| {
                    model.domains_mut().set_upper_bound(variable, bound as i32)
                })?;
            } else {
                let bound = -slack.div_euclid(-weight);
                let bound = bound.clamp(i32::MIN as i64, i32::MAX as i64);
                let _ = context.modify(variable, |model| {
                    model.domains_mut().set_lower_bound(variable, bound as i32)
                })?;
            }
        }

        Ok(ExecStatus::Fix)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_model::bounds;
    use crate::test_model::TestSolver;

    #[test]
    fn upper_bounds_are_propagated() {
        let mut solver = TestSolver::default();
        let x = solver.new_variable(1, 5);
        let y = solver.new_variable(0, 10);

        let space = solver
            .propagate(LinearLessOrEqualPropagator::new([(1, x), (1, y)], 7))
            .expect("non-empty domain");

        assert_eq!(bounds(&space, x), (1, 5));
        assert_eq!(bounds(&space, y), (0, 6));
    }

    #[test]
    fn negative_weights_raise_lower_bounds() {
        let mut solver = TestSolver::default();
        let x = solver.new_variable(0, 10);
        let y = solver.new_variable(0, 3);

        // 2x - 3y <= 1, so x <= 5 and y >= ceil((2 * 0 - 1) / 3) = 0
        let space = solver
            .propagate(LinearLessOrEqualPropagator::new([(2, x), (-3, y)], 1))
            .expect("non-empty domain");
        assert_eq!(bounds(&space, x), (0, 5));
        assert_eq!(bounds(&space, y), (0, 3));

        // -2y <= -5, so y >= 3
        let space = solver
            .propagate(LinearLessOrEqualPropagator::new([(-2, y)], -5))
            .expect("non-empty domain");
        assert_eq!(bounds(&space, y), (3, 3));
    }

    #[test]
    fn an_unreachable_bound_fails() {
        let mut solver = TestSolver::default();
        let x = solver.new_variable(3, 5);
        let y = solver.new_variable(4, 10);

        assert!(solver
            .propagate(LinearLessOrEqualPropagator::new([(1, x), (1, y)], 6))
            .is_err());
    }

    #[test]
    fn an_entailed_constraint_is_subsumed() {
        let mut solver = TestSolver::default();
        let x = solver.new_variable(0, 2);
        let y = solver.new_variable(0, 2);

        let space = solver
            .propagate(LinearLessOrEqualPropagator::new([(1, x), (1, y)], 4))
            .expect("non-empty domain");

        assert_eq!(space.num_propagators(), 0);
    }
}
