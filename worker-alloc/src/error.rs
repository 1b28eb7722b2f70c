use crate::types::CityId;

/// Failures surfaced to the turn driver. Degenerate inputs (no candidates,
/// no workers, more workers than slots) are not errors.
#[derive(Debug, derive_more::Display, derive_more::Error, derive_more::From)]
pub enum AllocationError {
    #[display("invalid argument: {reason}")]
    #[from(ignore)]
    InvalidArgument { reason: String },
    #[display(
        "negative unemployment in city {city:?}: {occupied} occupied slots for {population} residents"
    )]
    #[from(ignore)]
    NegativeUnemployment {
        city: CityId,
        population: u32,
        occupied: u32,
    },
    #[display("malformed scenario: {_0}")]
    Snapshot(#[error(source)] serde_json::Error),
}

impl AllocationError {
    pub(crate) fn invalid(reason: impl Into<String>) -> Self {
        AllocationError::InvalidArgument {
            reason: reason.into(),
        }
    }
}

pub type Result<T, E = AllocationError> = std::result::Result<T, E>;
