// City worker allocation
//
// Module structure:
// - types        IDs, resources, yield vectors, distribution preference
// - world        Cities, cells, buildings, slots and who owns what
// - oracle       Yield and food demand collaborators
// - catalog      Candidate slots for a city
// - focus        Scoring and food sufficiency
// - search       Subset search (branch-and-bound + reference enumeration)
// - occupancy    Writing an assignment back onto slots
// - allocate     Single-city worker distribution
// - unemployment Residents without a slot
// - turn         All-city turn pass
// - snapshot     JSON scenarios
// - wasm         Browser facade

pub mod allocate;
pub mod catalog;
pub mod error;
pub mod focus;
pub mod occupancy;
pub mod oracle;
pub mod search;
pub mod snapshot;
pub mod turn;
pub mod types;
pub mod unemployment;
pub mod wasm;
pub mod world;

#[cfg(feature = "instrument")]
pub use instrument;

pub use allocate::{distribute_workers, worker_count};
pub use catalog::slots_available_to_city;
pub use error::{AllocationError, Result};
pub use focus::{is_sufficient, score};
pub use occupancy::apply_assignment;
pub use oracle::{FoodDemand, FoodDemandConfig, YieldOracle, YieldTable};
pub use search::{Assignment, Candidate, SearchParams, best_assignment, brute_force_assignment};
pub use snapshot::{CitySummary, Scenario, TurnSummary};
pub use turn::{CityTurnReport, TurnReport, run_turn};
pub use types::{
    BuildingId, CellId, CityId, DistributionPreference, KeyToU64, ResourceType, SlotId,
    YieldVector,
};
pub use unemployment::{occupied_slot_count, unemployed_people_in_city};
pub use wasm::Allocator;
pub use world::{Building, Cell, City, Slot, SlotSource, World};
