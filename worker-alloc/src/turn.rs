// Turn resolution: one allocation pass over every city

use crate::allocate::distribute_workers;
use crate::catalog::slots_available_to_city;
use crate::error::{AllocationError, Result};
use crate::oracle::{FoodDemand, YieldOracle};
use crate::search::Assignment;
use crate::types::CityId;
#[cfg(feature = "instrument")]
use crate::types::KeyToU64;
use crate::unemployment::unemployed_people_in_city;
use crate::world::{City, World};

#[derive(Debug, Clone)]
pub struct CityTurnReport {
    pub city: CityId,
    pub workers: u32,
    pub assignment: Assignment,
    pub unemployed: u32,
}

#[derive(Debug, Clone)]
pub struct TurnReport {
    pub turn: u64,
    pub cities: Vec<CityTurnReport>,
}

impl TurnReport {
    pub fn city(&self, id: CityId) -> Option<&CityTurnReport> {
        self.cities.iter().find(|c| c.city == id)
    }

    /// Cities whose chosen assignment does not cover their food demand
    pub fn starving(&self) -> impl Iterator<Item = CityId> + '_ {
        self.cities
            .iter()
            .filter(|c| !c.assignment.sufficient)
            .map(|c| c.city)
    }
}

/// Residents working a locked slot
fn pinned_workers(world: &World, city: &City) -> u32 {
    world
        .city_slots(city)
        .into_iter()
        .filter(|&slot| world.slots.get(slot).is_some_and(|s| s.locked && s.occupied))
        .count() as u32
}

/// Residents free for reassignment: everyone except those already working
/// a locked slot.
pub fn available_workers(world: &World, city: &City) -> u32 {
    city.population.saturating_sub(pinned_workers(world, city))
}

/// A city with more locked workers than residents can never be staffed
/// legally. Checked for every city before any slot is touched, so a failed
/// pass leaves the world as it was.
fn check_pinned_workers(world: &World, city_ids: &[CityId]) -> Result<()> {
    for &id in city_ids {
        let city = world.city(id)?;
        let pinned = pinned_workers(world, city);
        if pinned > city.population {
            return Err(AllocationError::NegativeUnemployment {
                city: id,
                population: city.population,
                occupied: pinned,
            });
        }
    }
    Ok(())
}

/// Advance the world one turn, re-staffing each city from scratch toward its
/// stored focus and reporting who is left unemployed.
pub fn run_turn(
    world: &mut World,
    yields: &dyn YieldOracle,
    food: &dyn FoodDemand,
) -> Result<TurnReport> {
    let city_ids: Vec<CityId> = world.cities.keys().collect();
    check_pinned_workers(world, &city_ids)?;

    world.turn += 1;
    let mut cities = Vec::with_capacity(city_ids.len());

    for city in city_ids {
        let (workers, focus) = {
            let c = world.city(city)?;
            (available_workers(world, c), c.focus)
        };
        let candidates = slots_available_to_city(world, city)?;
        let assignment =
            distribute_workers(world, workers, &candidates, city, focus, yields, food)?;
        let unemployed = unemployed_people_in_city(world, city)?;

        #[cfg(feature = "instrument")]
        tracing::info!(
            target: "unemployment",
            turn = world.turn,
            city_id = city.to_u64(),
            population = world.cities[city].population,
            workers = workers,
            unemployed = unemployed,
        );

        cities.push(CityTurnReport {
            city,
            workers,
            assignment,
            unemployed,
        });
    }

    Ok(TurnReport {
        turn: world.turn,
        cities,
    })
}
