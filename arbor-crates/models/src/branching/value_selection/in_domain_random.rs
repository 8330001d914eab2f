use std::hash::Hash;
use std::hash::Hasher;

use arbor_core::kernel::VariableId;
use fnv::FnvHasher;
use rand::rngs::SmallRng;
use rand::Rng;
use rand::SeedableRng;

use super::ValueSelector;
use crate::domains::IntDomains;

/// A [`ValueSelector`] which selects a random value in the domain.
///
/// The generator is seeded from `seed` and the current domain, so the same domain always
/// yields the same value. This keeps descriptions reproducible under recomputation and across
/// workers.
#[derive(Debug, Clone, Copy)]
pub struct InDomainRandom {
    seed: u64,
}

impl InDomainRandom {
    pub fn new(seed: u64) -> Self {
        InDomainRandom { seed }
    }
}

impl ValueSelector for InDomainRandom {
    fn select_value(&self, domains: &IntDomains, variable: VariableId) -> i32 {
        let domain = &domains[variable];

        let mut hasher = FnvHasher::with_key(self.seed);
        variable.hash(&mut hasher);
        domain.lower_bound().hash(&mut hasher);
        domain.upper_bound().hash(&mut hasher);
        domain.size().hash(&mut hasher);

        let mut rng = SmallRng::seed_from_u64(hasher.finish());
        let index = rng.gen_range(0..domain.size());

        domain
            .values()
            .nth(index)
            .expect("the index is smaller than the domain size")
    }
}
