// Scoring and food sufficiency of yield vectors

use crate::types::{DistributionPreference, YieldVector};

/// Reduce a yield vector to the scalar the city is maximizing.
pub fn score(yields: &YieldVector, preference: DistributionPreference) -> i32 {
    match preference {
        DistributionPreference::Focused(resource) => yields.get(resource),
        DistributionPreference::Unfocused => yields.total(),
    }
}

/// Whether an assignment feeds the population this turn.
pub fn is_sufficient(yields: &YieldVector, food_demand: i32) -> bool {
    yields.food() >= food_demand
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ResourceType;

    fn sample() -> YieldVector {
        YieldVector::zero()
            .with(ResourceType::Food, 2)
            .with(ResourceType::Culture, 3)
            .with(ResourceType::Gold, 1)
    }

    #[test]
    fn focused_score_projects_one_resource() {
        let focus = DistributionPreference::Focused(ResourceType::Culture);
        assert_eq!(score(&sample(), focus), 3);

        let focus = DistributionPreference::Focused(ResourceType::Faith);
        assert_eq!(score(&sample(), focus), 0);
    }

    #[test]
    fn unfocused_score_is_total_yield() {
        assert_eq!(score(&sample(), DistributionPreference::Unfocused), 6);
    }

    #[test]
    fn sufficiency_boundary_is_inclusive() {
        assert!(is_sufficient(&sample(), 2));
        assert!(is_sufficient(&sample(), 0));
        assert!(!is_sufficient(&sample(), 3));
    }
}
