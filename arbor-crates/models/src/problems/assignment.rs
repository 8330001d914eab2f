use std::fmt::Display;
use std::fmt::Formatter;
use std::sync::Arc;

use arbor_core::kernel::VariableId;
use arbor_core::Constrain;
use arbor_core::Model;
use arbor_core::Space;
use log::debug;
use rand::rngs::SmallRng;
use rand::Rng;
use rand::SeedableRng;

use crate::branching::BranchingOptions;
use crate::domains::IntDomains;
use crate::domains::IntModel;
use crate::error::ModelError;
use crate::propagators::AllDifferentPropagator;
use crate::propagators::ElementPropagator;
use crate::propagators::LinearLessOrEqualPropagator;

/// The largest cost drawn by [`Assignment::random`].
const MAX_RANDOM_COST: i32 = 100;

/// A square matrix of non-negative costs; entry `(task, agent)` is the cost of assigning `task`
/// to `agent`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CostMatrix {
    rows: Box<[Arc<[i32]>]>,
}

impl CostMatrix {
    pub fn new(rows: Vec<Vec<i32>>) -> Result<Self, ModelError> {
        let size = rows.len();
        for (row, entries) in rows.iter().enumerate() {
            if entries.len() != size {
                return Err(ModelError::NotSquare {
                    rows: size,
                    row,
                    length: entries.len(),
                });
            }
            if let Some(&cost) = entries.iter().find(|&&cost| cost < 0) {
                return Err(ModelError::NegativeCost { row, cost });
            }
        }

        Ok(CostMatrix {
            rows: rows.into_iter().map(Arc::from).collect(),
        })
    }

    /// A matrix of `size` x `size` costs drawn uniformly from `1..=100`.
    pub fn random(size: usize, seed: u64) -> Self {
        let mut rng = SmallRng::seed_from_u64(seed);
        let rows = (0..size)
            .map(|_| {
                (0..size)
                    .map(|_| rng.gen_range(1..=MAX_RANDOM_COST))
                    .collect::<Arc<[_]>>()
            })
            .collect();

        CostMatrix { rows }
    }

    pub fn size(&self) -> usize {
        self.rows.len()
    }

    pub fn cost(&self, task: usize, agent: usize) -> i32 {
        self.rows[task][agent]
    }

    fn row(&self, task: usize) -> Arc<[i32]> {
        Arc::clone(&self.rows[task])
    }

    fn deep_copy(&self) -> Self {
        CostMatrix {
            rows: self
                .rows
                .iter()
                .map(|row| row.iter().copied().collect())
                .collect(),
        }
    }
}

/// The linear assignment problem: every task is assigned a different agent, minimising the
/// total cost.
#[derive(Debug, Clone)]
pub struct Assignment {
    domains: IntDomains,
    /// `agents[task]` is the agent assigned to `task`.
    agents: Arc<[VariableId]>,
    /// `costs[task]` is the cost of the agent assigned to `task`.
    costs: Arc<[VariableId]>,
    matrix: Arc<CostMatrix>,
}

impl Assignment {
    /// The root space of the assignment problem over `matrix`.
    ///
    /// Branches on the agents only; the costs follow by propagation.
    pub fn space(matrix: CostMatrix, branching: &BranchingOptions) -> Space<Assignment> {
        let size = matrix.size();
        let mut domains = IntDomains::default();

        let agents = (0..size)
            .map(|_| domains.new_variable(0, size as i32 - 1))
            .collect::<Arc<[_]>>();
        let costs = (0..size)
            .map(|task| {
                let row = matrix.row(task);
                let lower_bound = row.iter().copied().min().unwrap_or(0);
                let upper_bound = row.iter().copied().max().unwrap_or(0);
                domains.new_variable(lower_bound, upper_bound)
            })
            .collect::<Arc<[_]>>();

        debug!("assignment problem with {size} tasks");

        let matrix = Arc::new(matrix);
        let mut space = Space::new(Assignment {
            domains,
            agents: Arc::clone(&agents),
            costs: Arc::clone(&costs),
            matrix: Arc::clone(&matrix),
        });

        let _ = space.post_propagator(AllDifferentPropagator::new(agents.to_vec()));
        for task in 0..size {
            let _ = space.post_propagator(ElementPropagator::new(
                agents[task],
                matrix.row(task),
                costs[task],
            ));
        }
        branching.post(&mut space, &agents);

        space
    }

    pub fn matrix(&self) -> &CostMatrix {
        &self.matrix
    }

    /// The agent of every task, once all are assigned.
    pub fn agents(&self) -> Option<Vec<usize>> {
        self.agents
            .iter()
            .map(|&agent| self.domains.value(agent).map(|agent| agent as usize))
            .collect()
    }

    /// The total cost, once every task is assigned.
    pub fn total_cost(&self) -> Option<i64> {
        self.costs
            .iter()
            .map(|&cost| self.domains.value(cost).map(i64::from))
            .sum()
    }
}

impl Model for Assignment {
    fn copy(&self, share: bool) -> Self {
        if share {
            return self.clone();
        }

        Assignment {
            domains: self.domains.clone(),
            agents: self.agents.iter().copied().collect(),
            costs: self.costs.iter().copied().collect(),
            matrix: Arc::new(self.matrix.deep_copy()),
        }
    }

    fn memory(&self) -> usize {
        std::mem::size_of::<Self>() + self.domains.memory()
    }
}

impl IntModel for Assignment {
    fn domains(&self) -> &IntDomains {
        &self.domains
    }

    fn domains_mut(&mut self) -> &mut IntDomains {
        &mut self.domains
    }
}

impl Constrain for Assignment {
    fn constrain(home: &mut Space<Self>, incumbent: &Self) {
        let best = incumbent
            .total_cost()
            .expect("an incumbent assigns every task");

        let terms = home
            .model()
            .costs
            .iter()
            .map(|&cost| (1, cost))
            .collect::<Vec<_>>();
        let _ = home.post_propagator(LinearLessOrEqualPropagator::new(terms, best - 1));
    }
}

impl Display for Assignment {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match (self.agents(), self.total_cost()) {
            (Some(agents), Some(cost)) => write!(f, "cost {cost}: {agents:?}"),
            _ => write!(f, "unassigned"),
        }
    }
}
