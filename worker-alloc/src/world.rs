// World state for city worker allocation

use serde::{Deserialize, Serialize};
use slotmap::SlotMap;

use crate::error::{AllocationError, Result};
use crate::types::{BuildingId, CellId, CityId, DistributionPreference, SlotId};

// ============================================================================
// Entities
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct City {
    pub id: CityId,
    pub name: String,
    pub population: u32,
    pub focus: DistributionPreference,
    pub center: CellId,
    pub cells: Vec<CellId>,         // Territory in claim order
    pub buildings: Vec<BuildingId>, // In construction order
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Cell {
    pub id: CellId,
    pub position: (i32, i32),
    pub owner: Option<CityId>,
    /// Cell slots are never offered to workers (e.g. the city center)
    pub slot_suppressed: bool,
    pub slots: Vec<SlotId>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Building {
    pub id: BuildingId,
    pub name: String,
    pub owner: CityId,
    pub slots: Vec<SlotId>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SlotSource {
    Cell(CellId),
    Building(BuildingId),
}

/// One worker's worth of capacity. `occupied` is the only field the
/// allocator writes; `locked` slots keep their occupancy across passes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Slot {
    pub id: SlotId,
    pub source: SlotSource,
    pub occupied: bool,
    pub locked: bool,
}

// ============================================================================
// World
// ============================================================================

/// Owns every city, cell, building and slot along with the possession
/// relationships between them.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct World {
    pub turn: u64,
    pub cities: SlotMap<CityId, City>,
    pub cells: SlotMap<CellId, Cell>,
    pub buildings: SlotMap<BuildingId, Building>,
    pub slots: SlotMap<SlotId, Slot>,
}

impl World {
    pub fn new() -> Self {
        Self::default()
    }

    // === City Management ===

    /// Found a city on a fresh center cell. The center is claimed by the
    /// city and suppressed, so its slots never reach the allocator.
    pub fn found_city(
        &mut self,
        name: impl Into<String>,
        population: u32,
        center_position: (i32, i32),
    ) -> CityId {
        let center = self.add_cell(center_position);
        let id = self.cities.insert_with_key(|id| City {
            id,
            name: name.into(),
            population,
            focus: DistributionPreference::default(),
            center,
            cells: vec![center],
            buildings: Vec::new(),
        });

        let cell = &mut self.cells[center];
        cell.owner = Some(id);
        cell.slot_suppressed = true;
        id
    }

    pub fn city(&self, id: CityId) -> Result<&City> {
        self.cities
            .get(id)
            .ok_or_else(|| AllocationError::invalid(format!("unknown city {id:?}")))
    }

    fn city_mut(&mut self, id: CityId) -> Result<&mut City> {
        self.cities
            .get_mut(id)
            .ok_or_else(|| AllocationError::invalid(format!("unknown city {id:?}")))
    }

    pub fn set_population(&mut self, city: CityId, population: u32) -> Result<()> {
        self.city_mut(city)?.population = population;
        Ok(())
    }

    pub fn set_focus(&mut self, city: CityId, focus: DistributionPreference) -> Result<()> {
        self.city_mut(city)?.focus = focus;
        Ok(())
    }

    // === Territory ===

    /// Add an unowned map cell with no slots
    pub fn add_cell(&mut self, position: (i32, i32)) -> CellId {
        self.cells.insert_with_key(|id| Cell {
            id,
            position,
            owner: None,
            slot_suppressed: false,
            slots: Vec::new(),
        })
    }

    pub fn cell(&self, id: CellId) -> Result<&Cell> {
        self.cells
            .get(id)
            .ok_or_else(|| AllocationError::invalid(format!("unknown cell {id:?}")))
    }

    fn cell_mut(&mut self, id: CellId) -> Result<&mut Cell> {
        self.cells
            .get_mut(id)
            .ok_or_else(|| AllocationError::invalid(format!("unknown cell {id:?}")))
    }

    pub fn add_cell_slot(&mut self, cell: CellId) -> Result<SlotId> {
        self.cell(cell)?;
        let slot = self.insert_slot(SlotSource::Cell(cell));
        self.cells[cell].slots.push(slot);
        Ok(slot)
    }

    pub fn set_slot_suppressed(&mut self, cell: CellId, suppressed: bool) -> Result<()> {
        self.cell_mut(cell)?.slot_suppressed = suppressed;
        Ok(())
    }

    /// Transfer a cell to `city`. Slots on the cell come along unoccupied;
    /// their workers stayed home in the previous owner.
    pub fn claim_cell(&mut self, city: CityId, cell: CellId) -> Result<()> {
        self.city(city)?;
        let previous = self.cell(cell)?.owner;
        if previous == Some(city) {
            return Ok(());
        }
        if previous.is_some() {
            self.release_cell(cell)?;
        }

        self.cells[cell].owner = Some(city);
        self.cities[city].cells.push(cell);
        Ok(())
    }

    pub fn release_cell(&mut self, cell: CellId) -> Result<()> {
        let Some(owner) = self.cell_mut(cell)?.owner.take() else {
            return Ok(());
        };
        if let Some(city) = self.cities.get_mut(owner) {
            city.cells.retain(|&c| c != cell);
        }
        for &slot in &self.cells[cell].slots {
            self.slots[slot].occupied = false;
        }
        Ok(())
    }

    // === Buildings ===

    pub fn construct_building(
        &mut self,
        city: CityId,
        name: impl Into<String>,
        slot_count: usize,
    ) -> Result<BuildingId> {
        self.city(city)?;
        let id = self.buildings.insert_with_key(|id| Building {
            id,
            name: name.into(),
            owner: city,
            slots: Vec::with_capacity(slot_count),
        });
        for _ in 0..slot_count {
            let slot = self.insert_slot(SlotSource::Building(id));
            self.buildings[id].slots.push(slot);
        }
        self.cities[city].buildings.push(id);
        Ok(id)
    }

    pub fn building(&self, id: BuildingId) -> Result<&Building> {
        self.buildings
            .get(id)
            .ok_or_else(|| AllocationError::invalid(format!("unknown building {id:?}")))
    }

    /// Remove a building together with its slots
    pub fn demolish_building(&mut self, id: BuildingId) -> Result<()> {
        let building = self
            .buildings
            .remove(id)
            .ok_or_else(|| AllocationError::invalid(format!("unknown building {id:?}")))?;
        if let Some(city) = self.cities.get_mut(building.owner) {
            city.buildings.retain(|&b| b != id);
        }
        for slot in building.slots {
            self.slots.remove(slot);
        }
        Ok(())
    }

    // === Slots ===

    fn insert_slot(&mut self, source: SlotSource) -> SlotId {
        self.slots.insert_with_key(|id| Slot {
            id,
            source,
            occupied: false,
            locked: false,
        })
    }

    pub fn slot(&self, id: SlotId) -> Result<&Slot> {
        self.slots
            .get(id)
            .ok_or_else(|| AllocationError::invalid(format!("unknown slot {id:?}")))
    }

    /// Pin a slot at its current occupancy, or release the pin
    pub fn set_slot_locked(&mut self, id: SlotId, locked: bool) -> Result<()> {
        self.slots
            .get_mut(id)
            .ok_or_else(|| AllocationError::invalid(format!("unknown slot {id:?}")))?
            .locked = locked;
        Ok(())
    }

    /// Occupy or vacate a slot by hand, outside any allocation pass
    pub fn set_slot_occupied(&mut self, id: SlotId, occupied: bool) -> Result<()> {
        self.slots
            .get_mut(id)
            .ok_or_else(|| AllocationError::invalid(format!("unknown slot {id:?}")))?
            .occupied = occupied;
        Ok(())
    }

    /// Every slot the city works through its territory and buildings,
    /// locked or not. Suppressed cells contribute nothing.
    pub(crate) fn city_slots(&self, city: &City) -> Vec<SlotId> {
        let territory = city
            .cells
            .iter()
            .filter_map(|&cell| self.cells.get(cell))
            .filter(|cell| !cell.slot_suppressed)
            .flat_map(|cell| cell.slots.iter().copied());
        let buildings = city
            .buildings
            .iter()
            .filter_map(|&b| self.buildings.get(b))
            .flat_map(|b| b.slots.iter().copied());
        territory.chain(buildings).collect()
    }
}
