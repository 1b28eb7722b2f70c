// Writing a chosen assignment back onto the world

use crate::search::Assignment;
use crate::types::SlotId;
use crate::world::World;

/// Occupy every slot of `assignment` and vacate every other unlocked
/// candidate. Previous occupancy is overwritten, never consulted; locked
/// slots are left as they are.
pub fn apply_assignment(world: &mut World, assignment: &Assignment, candidates: &[SlotId]) {
    for &id in candidates {
        let Some(slot) = world.slots.get_mut(id) else {
            continue;
        };
        if slot.locked {
            continue;
        }
        slot.occupied = assignment.contains(id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::YieldVector;

    #[test]
    fn overwrites_previous_occupancy() {
        let mut world = World::new();
        let city = world.found_city("A", 3, (0, 0));
        let shop = world.construct_building(city, "Workshop", 3).unwrap();
        let slots = world.building(shop).unwrap().slots.clone();
        world.set_slot_occupied(slots[0], true).unwrap();
        world.set_slot_occupied(slots[1], true).unwrap();

        let assignment = Assignment {
            slots: vec![slots[2]],
            yields: YieldVector::zero(),
            score: 0,
            sufficient: true,
        };
        apply_assignment(&mut world, &assignment, &slots);

        let occupied: Vec<bool> = slots.iter().map(|&s| world.slots[s].occupied).collect();
        assert_eq!(occupied, vec![false, false, true]);
    }

    #[test]
    fn leaves_locked_slots_alone() {
        let mut world = World::new();
        let city = world.found_city("A", 3, (0, 0));
        let shop = world.construct_building(city, "Workshop", 2).unwrap();
        let slots = world.building(shop).unwrap().slots.clone();
        world.set_slot_occupied(slots[0], true).unwrap();
        world.set_slot_locked(slots[0], true).unwrap();

        apply_assignment(&mut world, &Assignment::empty(0), &slots);
        assert!(world.slots[slots[0]].occupied);
        assert!(!world.slots[slots[1]].occupied);
    }
}
