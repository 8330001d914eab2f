use std::fmt::Display;
use std::fmt::Formatter;
use std::sync::Arc;

use arbor_core::kernel::VariableId;
use arbor_core::Model;
use arbor_core::Space;

use crate::branching::BranchingOptions;
use crate::domains::IntDomains;
use crate::domains::IntModel;
use crate::propagators::AllDifferentPropagator;
use crate::propagators::NotEqualPropagator;

/// How the queens constraints are posted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "clap", derive(clap::ValueEnum))]
pub enum QueensPropagation {
    /// One [`NotEqualPropagator`] per pair of queens and direction.
    Binary,
    /// Three [`AllDifferentPropagator`]s: rows and both diagonals.
    #[default]
    AllDifferent,
}

/// The n-queens problem: `queens[i]` is the row of the queen in column `i`.
#[derive(Debug, Clone)]
pub struct Queens {
    domains: IntDomains,
    queens: Arc<[VariableId]>,
}

impl Queens {
    /// The root space of the `size`-queens problem.
    pub fn space(
        size: usize,
        propagation: QueensPropagation,
        branching: &BranchingOptions,
    ) -> Space<Queens> {
        let mut domains = IntDomains::default();
        let queens = (0..size)
            .map(|_| domains.new_variable(0, size as i32 - 1))
            .collect::<Arc<[_]>>();

        let mut space = Space::new(Queens {
            domains,
            queens: Arc::clone(&queens),
        });

        match propagation {
            QueensPropagation::Binary => {
                for i in 0..size {
                    for j in i + 1..size {
                        let distance = (j - i) as i32;
                        let _ = space.post_propagator(NotEqualPropagator::new(
                            queens[i], queens[j], 0,
                        ));
                        let _ = space.post_propagator(NotEqualPropagator::new(
                            queens[i], queens[j], distance,
                        ));
                        let _ = space.post_propagator(NotEqualPropagator::new(
                            queens[i], queens[j], -distance,
                        ));
                    }
                }
            }
            QueensPropagation::AllDifferent => {
                let up = (0..size as i32).collect::<Vec<_>>();
                let down = (0..size as i32).map(|i| -i).collect::<Vec<_>>();

                let _ = space.post_propagator(AllDifferentPropagator::new(queens.to_vec()));
                let _ = space.post_propagator(AllDifferentPropagator::with_offsets(
                    queens.to_vec(),
                    up,
                ));
                let _ = space.post_propagator(AllDifferentPropagator::with_offsets(
                    queens.to_vec(),
                    down,
                ));
            }
        }

        branching.post(&mut space, &queens);

        space
    }

    pub fn size(&self) -> usize {
        self.queens.len()
    }

    /// The row of every queen, once all are placed.
    pub fn placement(&self) -> Option<Vec<i32>> {
        self.queens
            .iter()
            .map(|&queen| self.domains.value(queen))
            .collect()
    }

    /// Whether no two queens of `placement` attack each other.
    pub fn is_valid_placement(placement: &[i32]) -> bool {
        placement.iter().enumerate().all(|(i, &a)| {
            placement[i + 1..].iter().enumerate().all(|(offset, &b)| {
                let distance = offset as i32 + 1;
                a != b && (a - b).abs() != distance
            })
        })
    }
}

impl Model for Queens {
    fn copy(&self, share: bool) -> Self {
        Queens {
            domains: self.domains.clone(),
            queens: if share {
                Arc::clone(&self.queens)
            } else {
                self.queens.iter().copied().collect()
            },
        }
    }

    fn memory(&self) -> usize {
        std::mem::size_of::<Self>() + self.domains.memory()
    }
}

impl IntModel for Queens {
    fn domains(&self) -> &IntDomains {
        &self.domains
    }

    fn domains_mut(&mut self) -> &mut IntDomains {
        &mut self.domains
    }
}

impl Display for Queens {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        for (column, &queen) in self.queens.iter().enumerate() {
            if column > 0 {
                write!(f, " ")?;
            }
            match self.domains.value(queen) {
                Some(row) => write!(f, "{row}")?,
                None => write!(f, "_")?,
            }
        }

        Ok(())
    }
}
