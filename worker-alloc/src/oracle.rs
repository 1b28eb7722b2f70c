// Collaborators the allocator consults but does not own

use serde::{Deserialize, Serialize};
use slotmap::SecondaryMap;
use tsify_next::Tsify;

use crate::types::{SlotId, YieldVector};
use crate::world::City;

// === YIELDS ===

/// Per-turn yield of a slot when worked for `city`. Must stay constant for
/// the duration of one allocation pass.
pub trait YieldOracle {
    fn slot_yield(&self, slot: SlotId, city: &City) -> YieldVector;
}

impl<F> YieldOracle for F
where
    F: Fn(SlotId, &City) -> YieldVector,
{
    fn slot_yield(&self, slot: SlotId, city: &City) -> YieldVector {
        self(slot, city)
    }
}

/// Fixed yields per slot, independent of the working city.
/// Slots missing from the table yield nothing.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct YieldTable {
    yields: SecondaryMap<SlotId, YieldVector>,
}

impl YieldTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, slot: SlotId, yields: YieldVector) {
        self.yields.insert(slot, yields);
    }

    pub fn with(mut self, slot: SlotId, yields: YieldVector) -> Self {
        self.set(slot, yields);
        self
    }
}

impl YieldOracle for YieldTable {
    fn slot_yield(&self, slot: SlotId, _city: &City) -> YieldVector {
        self.yields.get(slot).copied().unwrap_or_default()
    }
}

// === FOOD DEMAND ===

/// Food the city's residents eat this turn
pub trait FoodDemand {
    fn food_demand(&self, city: &City) -> i32;
}

impl<F> FoodDemand for F
where
    F: Fn(&City) -> i32,
{
    fn food_demand(&self, city: &City) -> i32 {
        self(city)
    }
}

/// Flat per-resident consumption.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Tsify)]
#[serde(default)]
pub struct FoodDemandConfig {
    /// Food eaten by each resident per turn.
    pub food_per_resident: i32,
}

impl Default for FoodDemandConfig {
    fn default() -> Self {
        Self {
            food_per_resident: 2,
        }
    }
}

impl FoodDemandConfig {
    pub fn with_food_per_resident(mut self, food_per_resident: i32) -> Self {
        self.food_per_resident = food_per_resident;
        self
    }
}

impl FoodDemand for FoodDemandConfig {
    fn food_demand(&self, city: &City) -> i32 {
        i32::try_from(city.population)
            .unwrap_or(i32::MAX)
            .saturating_mul(self.food_per_resident)
    }
}
