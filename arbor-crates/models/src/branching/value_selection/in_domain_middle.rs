use arbor_core::kernel::VariableId;

use super::ValueSelector;
use crate::domains::IntDomains;

/// A [`ValueSelector`] which selects the value in the domain closest to the middle of the
/// bounds, preferring the smaller value on a tie.
#[derive(Debug, Clone, Copy, Default)]
pub struct InDomainMiddle;

impl ValueSelector for InDomainMiddle {
    fn select_value(&self, domains: &IntDomains, variable: VariableId) -> i32 {
        let domain = &domains[variable];
        let middle = (domain.lower_bound() as i64 + domain.upper_bound() as i64).div_euclid(2);

        domain
            .values()
            .min_by_key(|&value| (value as i64 - middle).abs())
            .expect("a domain is never empty")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn the_closest_value_to_the_middle_is_selected() {
        let mut domains = IntDomains::default();
        let x = domains.new_variable(0, 10);
        let _ = domains.remove(x, 5);
        let _ = domains.remove(x, 6);

        assert_eq!(InDomainMiddle.select_value(&domains, x), 4);
    }
}
