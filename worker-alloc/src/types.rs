use std::ops::{Add, AddAssign, Index};

use serde::{Deserialize, Serialize};
use slotmap::new_key_type;
use tsify_next::Tsify;

// ============================================================================
// IDs - Using slotmap for generational indices
// ============================================================================

new_key_type! {
    pub struct CityId;
    pub struct CellId;
    pub struct BuildingId;
    pub struct SlotId;
}

/// Trait for converting SlotMap keys to u64 for WASM boundary
pub trait KeyToU64 {
    fn to_u64(self) -> u64;
}

macro_rules! impl_key_to_u64 {
    ($($key:ty),*) => {
        $(
            impl KeyToU64 for $key {
                fn to_u64(self) -> u64 {
                    self.0.as_ffi()
                }
            }
        )*
    };
}

impl_key_to_u64!(CityId, CellId, BuildingId, SlotId);

// ============================================================================
// Resources - The dimensions of a yield vector
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Tsify)]
#[tsify(into_wasm_abi, from_wasm_abi)]
pub enum ResourceType {
    Food,
    Production,
    Gold,
    Culture,
    Science,
    Faith,
}

impl ResourceType {
    pub const COUNT: usize = 6;

    /// Returns an iterator over all resource types
    pub fn all() -> impl Iterator<Item = ResourceType> {
        [
            ResourceType::Food,
            ResourceType::Production,
            ResourceType::Gold,
            ResourceType::Culture,
            ResourceType::Science,
            ResourceType::Faith,
        ]
        .into_iter()
    }

    fn index(self) -> usize {
        self as usize
    }
}

// ============================================================================
// Yield Vector - Per-turn output of a slot or of a whole assignment
// ============================================================================

/// Whole-unit amounts per resource dimension. Dimensions never set read as
/// zero; amounts may be negative.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "YieldEntries", into = "YieldEntries")]
pub struct YieldVector {
    amounts: [i32; ResourceType::COUNT],
}

impl YieldVector {
    pub const fn zero() -> Self {
        Self {
            amounts: [0; ResourceType::COUNT],
        }
    }

    pub fn with(mut self, resource: ResourceType, amount: i32) -> Self {
        self.amounts[resource.index()] = amount;
        self
    }

    pub fn get(&self, resource: ResourceType) -> i32 {
        self.amounts[resource.index()]
    }

    pub fn food(&self) -> i32 {
        self.get(ResourceType::Food)
    }

    /// Sum across all resource dimensions
    pub fn total(&self) -> i32 {
        self.amounts.iter().sum()
    }

    pub fn iter(&self) -> impl Iterator<Item = (ResourceType, i32)> + '_ {
        ResourceType::all().map(|r| (r, self.get(r)))
    }
}

impl Index<ResourceType> for YieldVector {
    type Output = i32;

    fn index(&self, resource: ResourceType) -> &i32 {
        &self.amounts[resource.index()]
    }
}

impl Add for YieldVector {
    type Output = YieldVector;

    fn add(mut self, rhs: YieldVector) -> YieldVector {
        self += rhs;
        self
    }
}

impl AddAssign for YieldVector {
    fn add_assign(&mut self, rhs: YieldVector) {
        for (lhs, rhs) in self.amounts.iter_mut().zip(rhs.amounts) {
            *lhs += rhs;
        }
    }
}

impl FromIterator<(ResourceType, i32)> for YieldVector {
    fn from_iter<I: IntoIterator<Item = (ResourceType, i32)>>(iter: I) -> Self {
        let mut yields = YieldVector::zero();
        for (resource, amount) in iter {
            yields.amounts[resource.index()] += amount;
        }
        yields
    }
}

/// Serialized form: only non-zero dimensions, keyed by resource.
#[derive(Serialize, Deserialize)]
#[serde(transparent)]
struct YieldEntries(std::collections::BTreeMap<ResourceType, i32>);

impl From<YieldEntries> for YieldVector {
    fn from(entries: YieldEntries) -> Self {
        entries.0.into_iter().collect()
    }
}

impl From<YieldVector> for YieldEntries {
    fn from(yields: YieldVector) -> Self {
        YieldEntries(yields.iter().filter(|(_, amount)| *amount != 0).collect())
    }
}

// ============================================================================
// Distribution Preference - What the city wants its workers to maximize
// ============================================================================

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, Tsify)]
#[tsify(into_wasm_abi, from_wasm_abi)]
pub enum DistributionPreference {
    Focused(ResourceType),
    /// Maximize the sum of all yields
    #[default]
    Unfocused,
}
