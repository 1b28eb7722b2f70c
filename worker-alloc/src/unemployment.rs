// Residents left without a slot after allocation

use crate::error::{AllocationError, Result};
use crate::types::CityId;
use crate::world::World;

/// Occupied slots across the city's unsuppressed territory and all of its
/// buildings, locked slots included.
pub fn occupied_slot_count(world: &World, city: CityId) -> Result<u32> {
    let city = world.city(city)?;
    let occupied = world
        .city_slots(city)
        .into_iter()
        .filter(|&slot| world.slots.get(slot).is_some_and(|s| s.occupied))
        .count();
    Ok(occupied as u32)
}

/// `population - occupied slots`. More occupied slots than residents means
/// something upstream over-assigned, and is reported rather than clamped.
pub fn unemployed_people_in_city(world: &World, city: CityId) -> Result<u32> {
    let occupied = occupied_slot_count(world, city)?;
    let population = world.city(city)?.population;
    population
        .checked_sub(occupied)
        .ok_or(AllocationError::NegativeUnemployment {
            city,
            population,
            occupied,
        })
}
