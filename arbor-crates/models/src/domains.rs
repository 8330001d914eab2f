use std::ops::Index;

use arbor_core::containers::KeyedVec;
use arbor_core::kernel::Inconsistency;
use arbor_core::kernel::VariableId;
use arbor_core::Model;
use fnv::FnvHashSet;

/// The result of a domain operation: whether the domain changed, or an [`Inconsistency`] if it
/// became empty.
pub type DomainResult = Result<bool, Inconsistency>;

/// A finite set of integers, represented by its bounds and the values removed in between.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IntDomain {
    lower_bound: i32,
    upper_bound: i32,
    /// Removed values strictly between the bounds.
    holes: FnvHashSet<i32>,
}

impl IntDomain {
    pub fn new(lower_bound: i32, upper_bound: i32) -> Self {
        assert!(
            lower_bound <= upper_bound,
            "the domain [{lower_bound}, {upper_bound}] is empty"
        );

        IntDomain {
            lower_bound,
            upper_bound,
            holes: FnvHashSet::default(),
        }
    }

    pub fn lower_bound(&self) -> i32 {
        self.lower_bound
    }

    pub fn upper_bound(&self) -> i32 {
        self.upper_bound
    }

    pub fn contains(&self, value: i32) -> bool {
        self.lower_bound <= value && value <= self.upper_bound && !self.holes.contains(&value)
    }

    pub fn is_fixed(&self) -> bool {
        self.lower_bound == self.upper_bound
    }

    /// The value of a fixed domain.
    pub fn value(&self) -> Option<i32> {
        self.is_fixed().then_some(self.lower_bound)
    }

    pub fn size(&self) -> usize {
        (self.upper_bound - self.lower_bound + 1) as usize - self.holes.len()
    }

    /// The values in the domain, in increasing order.
    pub fn values(&self) -> impl Iterator<Item = i32> + '_ {
        (self.lower_bound..=self.upper_bound).filter(|value| !self.holes.contains(value))
    }

    pub fn set_lower_bound(&mut self, bound: i32) -> DomainResult {
        if bound <= self.lower_bound {
            return Ok(false);
        }
        if bound > self.upper_bound {
            return Err(Inconsistency);
        }

        self.lower_bound = bound;
        while self.holes.remove(&self.lower_bound) {
            self.lower_bound += 1;
        }
        self.holes.retain(|&hole| hole > bound);

        Ok(true)
    }

    pub fn set_upper_bound(&mut self, bound: i32) -> DomainResult {
        if bound >= self.upper_bound {
            return Ok(false);
        }
        if bound < self.lower_bound {
            return Err(Inconsistency);
        }

        self.upper_bound = bound;
        while self.holes.remove(&self.upper_bound) {
            self.upper_bound -= 1;
        }
        self.holes.retain(|&hole| hole < bound);

        Ok(true)
    }

    pub fn remove(&mut self, value: i32) -> DomainResult {
        if !self.contains(value) {
            return Ok(false);
        }
        if self.is_fixed() {
            return Err(Inconsistency);
        }

        if value == self.lower_bound {
            let _ = self.set_lower_bound(value + 1)?;
        } else if value == self.upper_bound {
            let _ = self.set_upper_bound(value - 1)?;
        } else {
            let _ = self.holes.insert(value);
        }

        Ok(true)
    }

    pub fn assign(&mut self, value: i32) -> DomainResult {
        if !self.contains(value) {
            return Err(Inconsistency);
        }
        if self.is_fixed() {
            return Ok(false);
        }

        self.lower_bound = value;
        self.upper_bound = value;
        self.holes.clear();

        Ok(true)
    }

    fn memory(&self) -> usize {
        std::mem::size_of::<Self>() + self.holes.capacity() * std::mem::size_of::<i32>()
    }
}

/// The domains of the integer variables of a model.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IntDomains {
    domains: KeyedVec<VariableId, IntDomain>,
}

impl IntDomains {
    pub fn new_variable(&mut self, lower_bound: i32, upper_bound: i32) -> VariableId {
        self.domains.push(IntDomain::new(lower_bound, upper_bound))
    }

    pub fn num_variables(&self) -> usize {
        self.domains.len()
    }

    pub fn variables(&self) -> impl Iterator<Item = VariableId> {
        self.domains.keys()
    }

    pub fn lower_bound(&self, variable: VariableId) -> i32 {
        self[variable].lower_bound()
    }

    pub fn upper_bound(&self, variable: VariableId) -> i32 {
        self[variable].upper_bound()
    }

    pub fn is_fixed(&self, variable: VariableId) -> bool {
        self[variable].is_fixed()
    }

    pub fn value(&self, variable: VariableId) -> Option<i32> {
        self[variable].value()
    }

    pub fn set_lower_bound(&mut self, variable: VariableId, bound: i32) -> DomainResult {
        self.domains[variable].set_lower_bound(bound)
    }

    pub fn set_upper_bound(&mut self, variable: VariableId, bound: i32) -> DomainResult {
        self.domains[variable].set_upper_bound(bound)
    }

    pub fn remove(&mut self, variable: VariableId, value: i32) -> DomainResult {
        self.domains[variable].remove(value)
    }

    pub fn assign(&mut self, variable: VariableId, value: i32) -> DomainResult {
        self.domains[variable].assign(value)
    }

    /// An estimate of the memory held by the domains, in bytes.
    pub fn memory(&self) -> usize {
        self.domains.iter().map(IntDomain::memory).sum()
    }
}

impl Index<VariableId> for IntDomains {
    type Output = IntDomain;

    fn index(&self, variable: VariableId) -> &IntDomain {
        &self.domains[variable]
    }
}

/// A model whose variables are integer variables with finite domains.
///
/// The propagators and branchings of this crate work on any such model.
pub trait IntModel: Model {
    fn domains(&self) -> &IntDomains;

    fn domains_mut(&mut self) -> &mut IntDomains;
}
