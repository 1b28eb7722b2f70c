// ============================================================================
// WASM API - Allocator
// ============================================================================

use serde::Serialize;
use wasm_bindgen::prelude::*;

use crate::snapshot::{CitySummary, Scenario, TurnSummary};
use crate::types::DistributionPreference;

/// Holds a scenario between calls from the browser
#[wasm_bindgen]
pub struct Allocator {
    scenario: Scenario,
}

#[wasm_bindgen]
impl Allocator {
    #[wasm_bindgen(constructor)]
    pub fn new(scenario: Scenario) -> Self {
        // Better panic messages in browser console
        console_error_panic_hook::set_once();

        Self { scenario }
    }

    /// Load a scenario from its JSON text
    #[wasm_bindgen(js_name = fromJson)]
    pub fn from_json(json: &str) -> Result<Allocator, JsError> {
        Ok(Self::new(Scenario::from_json(json)?))
    }

    /// Re-staff every city and advance the turn counter
    #[wasm_bindgen(js_name = advanceTurn)]
    pub fn advance_turn(&mut self) -> Result<TurnSummary, JsError> {
        Ok(self.scenario.run_turn_summary()?)
    }

    /// Re-staff one city. `workers` arrives as a plain JS number and may be
    /// negative, in which case the call is rejected.
    #[wasm_bindgen(js_name = distributeWorkers)]
    pub fn distribute_workers(
        &mut self,
        city_index: usize,
        workers: i32,
        focus: DistributionPreference,
    ) -> Result<CitySummary, JsError> {
        Ok(self.scenario.distribute(city_index, workers.into(), focus)?)
    }

    #[wasm_bindgen(js_name = getTurn)]
    pub fn get_turn(&self) -> u64 {
        self.scenario.turn
    }

    /// Current scenario, occupancy included. Yield maps arrive as plain
    /// objects, matching the declared `Record` type.
    #[wasm_bindgen(js_name = getScenario)]
    pub fn get_scenario(&self) -> Result<JsValue, JsError> {
        let serializer = serde_wasm_bindgen::Serializer::json_compatible();
        Ok(self.scenario.serialize(&serializer)?)
    }

    #[wasm_bindgen(js_name = toJson)]
    pub fn to_json(&self) -> Result<String, JsError> {
        Ok(self.scenario.to_json()?)
    }
}
