//! Property tests for the allocator
//!
//! Random cities are generated from fixed seeds; every property must hold
//! for all of them.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use slotmap::SlotMap;

use worker_alloc::{
    Candidate, City, CityId, DistributionPreference, ResourceType, SearchParams, SlotId, World,
    YieldTable, YieldVector, best_assignment, brute_force_assignment, distribute_workers,
    is_sufficient, score, slots_available_to_city,
};

// === GENERATORS ===

fn random_yields(rng: &mut StdRng) -> YieldVector {
    let mut yields = YieldVector::zero();
    for resource in ResourceType::all() {
        if rng.random_bool(0.5) {
            yields = yields.with(resource, rng.random_range(-1..=4));
        }
    }
    yields
}

fn random_preference(rng: &mut StdRng) -> DistributionPreference {
    if rng.random_bool(0.25) {
        return DistributionPreference::Unfocused;
    }
    let resources: Vec<ResourceType> = ResourceType::all().collect();
    DistributionPreference::Focused(resources[rng.random_range(0..resources.len())])
}

fn random_candidates(rng: &mut StdRng, n: usize) -> Vec<Candidate> {
    let mut keys: SlotMap<SlotId, ()> = SlotMap::with_key();
    (0..n)
        .map(|_| Candidate::new(keys.insert(()), random_yields(rng)))
        .collect()
}

fn random_params(rng: &mut StdRng, n: usize) -> SearchParams {
    SearchParams {
        workers: rng.random_range(0..=n + 2),
        preference: random_preference(rng),
        food_demand: rng.random_range(-2..=12),
    }
}

/// (sufficient, score, total) of the best subset, by checking every bitmask
fn exhaustive_optimum(candidates: &[Candidate], params: SearchParams) -> (bool, i32, i32) {
    let n = candidates.len();
    let k = params.workers.min(n);
    (0u32..1 << n)
        .filter(|mask| mask.count_ones() as usize == k)
        .map(|mask| {
            let yields = (0..n)
                .filter(|i| mask & (1 << i) != 0)
                .fold(YieldVector::zero(), |acc, i| acc + candidates[i].yields);
            (
                is_sufficient(&yields, params.food_demand),
                score(&yields, params.preference),
                yields.total(),
            )
        })
        .max()
        .unwrap_or((true, 0, 0))
}

// === SEARCH PROPERTIES ===

#[test]
fn search_matches_enumeration() {
    let mut rng = StdRng::seed_from_u64(7);
    for _ in 0..400 {
        let n = rng.random_range(0..=9);
        let candidates = random_candidates(&mut rng, n);
        let params = random_params(&mut rng, n);

        let fast = best_assignment(&candidates, params);
        let reference = brute_force_assignment(&candidates, params);
        assert_eq!(fast, reference, "params={params:?} candidates={candidates:?}");
    }
}

#[test]
fn search_reaches_the_exhaustive_optimum() {
    let mut rng = StdRng::seed_from_u64(11);
    for _ in 0..300 {
        let n = rng.random_range(0..=10);
        let candidates = random_candidates(&mut rng, n);
        let params = random_params(&mut rng, n);

        let chosen = best_assignment(&candidates, params);
        assert_eq!(chosen.len(), params.workers.min(n));
        assert_eq!(
            (chosen.sufficient, chosen.score, chosen.yields.total()),
            exhaustive_optimum(&candidates, params),
            "params={params:?}"
        );
    }
}

#[test]
fn larger_pools_still_match_enumeration() {
    let mut rng = StdRng::seed_from_u64(23);
    for _ in 0..5 {
        let candidates = random_candidates(&mut rng, 18);
        let params = SearchParams {
            workers: 6,
            preference: random_preference(&mut rng),
            food_demand: rng.random_range(4..=14),
        };
        assert_eq!(
            best_assignment(&candidates, params),
            brute_force_assignment(&candidates, params)
        );
    }
}

#[test]
fn city_sized_pools_finish() {
    let mut rng = StdRng::seed_from_u64(31);
    let candidates = random_candidates(&mut rng, 24);
    let params = SearchParams {
        workers: 8,
        preference: DistributionPreference::Focused(ResourceType::Production),
        food_demand: 12,
    };
    let chosen = best_assignment(&candidates, params);
    assert_eq!(chosen.len(), 8);
    assert_eq!(
        (chosen.sufficient, chosen.score, chosen.yields.total()),
        exhaustive_optimum(&candidates, params)
    );

    let candidates = random_candidates(&mut rng, 40);
    let flat: Vec<Candidate> = candidates
        .iter()
        .map(|c| Candidate::new(c.slot, YieldVector::zero().with(ResourceType::Culture, 1)))
        .collect();
    let params = SearchParams {
        workers: 20,
        preference: DistributionPreference::Focused(ResourceType::Culture),
        food_demand: 1,
    };
    let chosen = best_assignment(&flat, params);
    assert_eq!(chosen.score, 20);
    assert!(!chosen.sufficient);
}

// === WORLD-LEVEL PROPERTIES ===

fn random_city(rng: &mut StdRng) -> (World, CityId, YieldTable) {
    let mut world = World::new();
    let population = rng.random_range(0..=12);
    let city = world.found_city("Randomburg", population, (0, 0));
    let mut table = YieldTable::new();

    for i in 0..rng.random_range(0..=6) {
        let cell = world.add_cell((i, 1));
        for _ in 0..rng.random_range(1..=2) {
            let slot = world.add_cell_slot(cell).unwrap();
            table.set(slot, random_yields(rng));
        }
        world.claim_cell(city, cell).unwrap();
    }
    let building = world
        .construct_building(city, "Guild", rng.random_range(0..=3))
        .unwrap();
    for &slot in &world.building(building).unwrap().slots {
        table.set(slot, random_yields(rng));
    }
    (world, city, table)
}

fn occupancy(world: &World) -> Vec<(SlotId, bool)> {
    world.slots.iter().map(|(id, s)| (id, s.occupied)).collect()
}

#[test]
fn occupied_count_is_min_of_workers_and_candidates() {
    let mut rng = StdRng::seed_from_u64(41);
    for _ in 0..100 {
        let (mut world, city, table) = random_city(&mut rng);
        let workers = rng.random_range(0..=15u32);
        let candidates = slots_available_to_city(&world, city).unwrap();
        let preference = random_preference(&mut rng);

        distribute_workers(
            &mut world,
            workers,
            &candidates,
            city,
            preference,
            &table,
            &|c: &City| c.population as i32,
        )
        .unwrap();

        let occupied = candidates
            .iter()
            .filter(|&&s| world.slots[s].occupied)
            .count();
        assert_eq!(occupied, (workers as usize).min(candidates.len()));
    }
}

#[test]
fn prior_occupancy_does_not_change_the_result() {
    let mut rng = StdRng::seed_from_u64(43);
    for _ in 0..100 {
        let (mut world, city, table) = random_city(&mut rng);
        let workers = rng.random_range(0..=8u32);
        let preference = random_preference(&mut rng);
        let candidates = slots_available_to_city(&world, city).unwrap();
        let food = |c: &City| c.population as i32;

        let mut perturbed = world.clone();
        for &slot in &candidates {
            perturbed.slots[slot].occupied = rng.random_bool(0.5);
        }

        let a = distribute_workers(&mut world, workers, &candidates, city, preference, &table, &food)
            .unwrap();
        let b = distribute_workers(
            &mut perturbed,
            workers,
            &candidates,
            city,
            preference,
            &table,
            &food,
        )
        .unwrap();
        assert_eq!(a, b);
        assert_eq!(occupancy(&world), occupancy(&perturbed));

        // Re-running on its own output changes nothing
        let before = occupancy(&world);
        distribute_workers(&mut world, workers, &candidates, city, preference, &table, &food)
            .unwrap();
        assert_eq!(occupancy(&world), before);
    }
}

#[test]
fn locked_slots_keep_their_state() {
    let mut rng = StdRng::seed_from_u64(47);
    for _ in 0..50 {
        let (mut world, city, table) = random_city(&mut rng);
        let all: Vec<SlotId> = world.slots.keys().collect();
        let mut pinned = Vec::new();
        for &slot in &all {
            if rng.random_bool(0.3) {
                let occupied = rng.random_bool(0.5);
                world.set_slot_occupied(slot, occupied).unwrap();
                world.set_slot_locked(slot, true).unwrap();
                pinned.push((slot, occupied));
            }
        }

        let candidates = slots_available_to_city(&world, city).unwrap();
        assert!(pinned.iter().all(|(s, _)| !candidates.contains(s)));

        distribute_workers(
            &mut world,
            rng.random_range(0..=10),
            &all,
            city,
            DistributionPreference::Unfocused,
            &table,
            &|_: &City| 0,
        )
        .unwrap();
        for (slot, occupied) in pinned {
            assert_eq!(world.slots[slot].occupied, occupied);
        }
    }
}
