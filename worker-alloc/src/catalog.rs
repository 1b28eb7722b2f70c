// Candidate slots a city may staff this turn

use crate::error::Result;
use crate::types::{CityId, SlotId};
use crate::world::World;

/// Slots eligible for the next allocation pass, in possession order:
/// territory cells in claim order, then buildings in construction order.
///
/// Cells flagged `slot_suppressed` contribute nothing. Locked slots are
/// left out entirely; they keep whatever occupancy they already have.
pub fn slots_available_to_city(world: &World, city: CityId) -> Result<Vec<SlotId>> {
    let city = world.city(city)?;
    Ok(world
        .city_slots(city)
        .into_iter()
        .filter(|&slot| world.slots.get(slot).is_some_and(|s| !s.locked))
        .collect())
}
