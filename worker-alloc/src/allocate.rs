// Worker distribution for a single city

use crate::error::{AllocationError, Result};
use crate::occupancy::apply_assignment;
use crate::oracle::{FoodDemand, YieldOracle};
use crate::search::{Assignment, Candidate, SearchParams, best_assignment};
use crate::types::{CityId, DistributionPreference, SlotId};
#[cfg(feature = "instrument")]
use crate::types::KeyToU64;
use crate::world::World;

/// Validate a worker count arriving from an untyped boundary.
pub fn worker_count(requested: i64) -> Result<u32> {
    u32::try_from(requested).map_err(|_| {
        AllocationError::invalid(format!("worker count must be non-negative, got {requested}"))
    })
}

/// Staff `min(worker_count, unlocked candidates)` of `candidates` for
/// `city`, then write the result onto the slots.
///
/// Locked candidates are ignored. Occupancy from earlier passes plays no
/// part in the choice; every unlocked candidate not chosen is vacated.
pub fn distribute_workers(
    world: &mut World,
    worker_count: u32,
    candidates: &[SlotId],
    city: CityId,
    preference: DistributionPreference,
    yields: &dyn YieldOracle,
    food: &dyn FoodDemand,
) -> Result<Assignment> {
    let unlocked = unlocked_candidates(world, candidates)?;
    let city_ref = world.city(city)?;
    let food_demand = food.food_demand(city_ref);

    let scored: Vec<Candidate> = unlocked
        .iter()
        .map(|&slot| Candidate::new(slot, yields.slot_yield(slot, city_ref)))
        .collect();

    let assignment = best_assignment(
        &scored,
        SearchParams {
            workers: worker_count as usize,
            preference,
            food_demand,
        },
    );

    #[cfg(feature = "instrument")]
    tracing::info!(
        target: "allocation",
        turn = world.turn,
        city_id = city.to_u64(),
        workers = worker_count,
        candidates = unlocked.len() as u64,
        occupied = assignment.len() as u64,
        score = assignment.score,
        food = assignment.yields.food(),
        food_demand = food_demand,
        total = assignment.yields.total(),
        sufficient = assignment.sufficient,
    );

    apply_assignment(world, &assignment, &unlocked);
    Ok(assignment)
}

/// Existing, unlocked, de-duplicated candidates in their given order
fn unlocked_candidates(world: &World, candidates: &[SlotId]) -> Result<Vec<SlotId>> {
    let mut unlocked = Vec::with_capacity(candidates.len());
    for &id in candidates {
        if world.slot(id)?.locked || unlocked.contains(&id) {
            continue;
        }
        unlocked.push(id);
    }
    Ok(unlocked)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::slots_available_to_city;
    use crate::oracle::{FoodDemandConfig, YieldTable};
    use crate::types::{ResourceType, YieldVector};

    fn production_city(values: &[i32]) -> (World, CityId, YieldTable) {
        let mut world = World::new();
        let city = world.found_city("Forge", values.len() as u32, (0, 0));
        let smithy = world.construct_building(city, "Smithy", values.len()).unwrap();
        let mut table = YieldTable::new();
        for (&slot, &amount) in world.building(smithy).unwrap().slots.iter().zip(values) {
            table.set(slot, YieldVector::zero().with(ResourceType::Production, amount));
        }
        (world, city, table)
    }

    #[test]
    fn negative_worker_count_is_rejected() {
        assert_eq!(worker_count(4).unwrap(), 4);
        assert!(matches!(
            worker_count(-1),
            Err(AllocationError::InvalidArgument { .. })
        ));
    }

    #[test]
    fn locked_candidates_are_skipped() {
        let (mut world, city, table) = production_city(&[5, 4, 3]);
        let slots = slots_available_to_city(&world, city).unwrap();
        world.set_slot_locked(slots[0], true).unwrap();

        let chosen = distribute_workers(
            &mut world,
            1,
            &slots,
            city,
            DistributionPreference::Unfocused,
            &table,
            &|_: &crate::world::City| 0,
        )
        .unwrap();

        assert_eq!(chosen.slots, vec![slots[1]]);
        assert!(!world.slots[slots[0]].occupied);
        assert!(world.slots[slots[1]].occupied);
    }

    #[test]
    fn unknown_candidate_is_invalid() {
        let (mut world, city, table) = production_city(&[1]);
        let slots = slots_available_to_city(&world, city).unwrap();
        world.slots.remove(slots[0]);

        let result = distribute_workers(
            &mut world,
            1,
            &slots,
            city,
            DistributionPreference::Unfocused,
            &table,
            &FoodDemandConfig::default(),
        );
        assert!(matches!(
            result,
            Err(AllocationError::InvalidArgument { .. })
        ));
    }

    #[test]
    fn duplicate_candidates_count_once() {
        let (mut world, city, table) = production_city(&[2, 1]);
        let slots = slots_available_to_city(&world, city).unwrap();
        let doubled = [slots[0], slots[0], slots[1]];

        let chosen = distribute_workers(
            &mut world,
            5,
            &doubled,
            city,
            DistributionPreference::Unfocused,
            &table,
            &FoodDemandConfig::default(),
        )
        .unwrap();
        assert_eq!(chosen.len(), 2);
    }
}
