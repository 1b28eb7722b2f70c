// Scenario snapshots: worlds described in JSON
//
// A scenario lists cities with their territory and buildings, and fixes the
// yield of every slot. Running a turn on a scenario writes the resulting
// occupancy back into it, so the JSON can be fed straight into the next turn.

use serde::{Deserialize, Serialize};
use tsify_next::Tsify;

use crate::allocate::{distribute_workers, worker_count};
use crate::catalog::slots_available_to_city;
use crate::error::{AllocationError, Result};
use crate::oracle::{FoodDemand, FoodDemandConfig, YieldTable};
use crate::search::Assignment;
use crate::turn::{TurnReport, run_turn};
use crate::unemployment::unemployed_people_in_city;
use crate::types::{DistributionPreference, SlotId, YieldVector};
use crate::world::World;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, Tsify)]
#[tsify(into_wasm_abi, from_wasm_abi)]
pub struct Scenario {
    #[serde(default)]
    pub turn: u64,
    #[serde(default)]
    pub food: FoodDemandConfig,
    pub cities: Vec<CitySpec>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Tsify)]
pub struct CitySpec {
    pub name: String,
    pub population: u32,
    #[serde(default)]
    pub focus: DistributionPreference,
    #[serde(default)]
    pub position: (i32, i32),
    #[serde(default)]
    pub cells: Vec<CellSpec>,
    #[serde(default)]
    pub buildings: Vec<BuildingSpec>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Tsify)]
pub struct CellSpec {
    #[serde(default)]
    pub position: (i32, i32),
    #[serde(default)]
    pub suppressed: bool,
    pub slots: Vec<SlotSpec>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Tsify)]
pub struct BuildingSpec {
    pub name: String,
    pub slots: Vec<SlotSpec>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, Tsify)]
pub struct SlotSpec {
    #[serde(default)]
    #[tsify(type = "Partial<Record<ResourceType, number>>")]
    pub yields: YieldVector,
    #[serde(default)]
    pub occupied: bool,
    #[serde(default)]
    pub locked: bool,
}

/// Per-city outcome of a pass, flattened for the front end
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Tsify)]
#[tsify(into_wasm_abi)]
pub struct CitySummary {
    pub name: String,
    pub workers: u32,
    pub occupied: u32,
    pub score: i32,
    pub food: i32,
    pub total: i32,
    pub sufficient: bool,
    pub unemployed: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Tsify)]
#[tsify(into_wasm_abi)]
pub struct TurnSummary {
    pub turn: u64,
    pub cities: Vec<CitySummary>,
}

impl CitySummary {
    fn new(name: &str, workers: u32, assignment: &Assignment, unemployed: u32) -> Self {
        Self {
            name: name.to_string(),
            workers,
            occupied: assignment.len() as u32,
            score: assignment.score,
            food: assignment.yields.food(),
            total: assignment.yields.total(),
            sufficient: assignment.sufficient,
            unemployed,
        }
    }
}

/// A scenario realized as a world, with each slot spec's world slot in
/// declaration order.
pub struct BuiltScenario {
    pub world: World,
    pub yields: YieldTable,
    pub food: FoodDemandConfig,
    slot_order: Vec<SlotId>,
}

impl Scenario {
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    fn slot_specs_mut(&mut self) -> impl Iterator<Item = &mut SlotSpec> {
        self.cities.iter_mut().flat_map(|city| {
            let cells = city.cells.iter_mut().flat_map(|c| c.slots.iter_mut());
            let buildings = city.buildings.iter_mut().flat_map(|b| b.slots.iter_mut());
            cells.chain(buildings)
        })
    }

    pub fn build(&self) -> Result<BuiltScenario> {
        let mut world = World::new();
        world.turn = self.turn;
        let mut yields = YieldTable::new();
        let mut slot_order = Vec::new();

        let mut add_slot = |world: &mut World, slot: SlotId, spec: &SlotSpec| -> Result<()> {
            yields.set(slot, spec.yields);
            slot_order.push(slot);
            world.set_slot_occupied(slot, spec.occupied)?;
            world.set_slot_locked(slot, spec.locked)
        };

        for city_spec in &self.cities {
            let city = world.found_city(&city_spec.name, city_spec.population, city_spec.position);
            world.set_focus(city, city_spec.focus)?;

            for cell_spec in &city_spec.cells {
                let cell = world.add_cell(cell_spec.position);
                world.set_slot_suppressed(cell, cell_spec.suppressed)?;
                world.claim_cell(city, cell)?;
                for slot_spec in &cell_spec.slots {
                    let slot = world.add_cell_slot(cell)?;
                    add_slot(&mut world, slot, slot_spec)?;
                }
            }

            for building_spec in &city_spec.buildings {
                let building =
                    world.construct_building(city, &building_spec.name, building_spec.slots.len())?;
                let slots = world.building(building)?.slots.clone();
                for (slot, slot_spec) in slots.into_iter().zip(&building_spec.slots) {
                    add_slot(&mut world, slot, slot_spec)?;
                }
            }
        }

        Ok(BuiltScenario {
            world,
            yields,
            food: self.food.clone(),
            slot_order,
        })
    }

    fn write_back(&mut self, built: &BuiltScenario) -> Result<()> {
        self.turn = built.world.turn;
        for (spec, slot) in self.slot_specs_mut().zip(&built.slot_order) {
            spec.occupied = built.world.slot(*slot)?.occupied;
        }
        Ok(())
    }

    /// Run one turn and write the new occupancy back into the slot specs.
    pub fn run_turn(&mut self) -> Result<TurnReport> {
        let mut built = self.build()?;
        let report = run_turn(&mut built.world, &built.yields, &built.food)?;
        self.write_back(&built)?;
        Ok(report)
    }

    /// `run_turn`, summarized per city in declaration order.
    pub fn run_turn_summary(&mut self) -> Result<TurnSummary> {
        let report = self.run_turn()?;
        let cities = self
            .cities
            .iter()
            .zip(&report.cities)
            .map(|(spec, r)| CitySummary::new(&spec.name, r.workers, &r.assignment, r.unemployed))
            .collect();
        Ok(TurnSummary {
            turn: report.turn,
            cities,
        })
    }

    /// Re-staff a single city with an explicit worker count and focus,
    /// leaving the turn counter alone. `workers` comes from an untyped
    /// caller and is validated here.
    pub fn distribute(
        &mut self,
        city_index: usize,
        workers: i64,
        focus: DistributionPreference,
    ) -> Result<CitySummary> {
        let workers = worker_count(workers)?;
        let name = self
            .cities
            .get(city_index)
            .map(|c| c.name.clone())
            .ok_or_else(|| AllocationError::invalid(format!("no city at index {city_index}")))?;

        let mut built = self.build()?;
        let city = built
            .world
            .cities
            .keys()
            .nth(city_index)
            .ok_or_else(|| AllocationError::invalid(format!("no city at index {city_index}")))?;
        let candidates = slots_available_to_city(&built.world, city)?;
        let assignment = distribute_workers(
            &mut built.world,
            workers,
            &candidates,
            city,
            focus,
            &built.yields,
            &built.food,
        )?;
        let unemployed = unemployed_people_in_city(&built.world, city)?;
        self.write_back(&built)?;

        Ok(CitySummary::new(&name, workers, &assignment, unemployed))
    }

    /// Food each city must produce this turn, in declaration order
    pub fn food_demands(&self) -> Result<Vec<i32>> {
        let built = self.build()?;
        Ok(built
            .world
            .cities
            .values()
            .map(|c| built.food.food_demand(c))
            .collect())
    }
}
