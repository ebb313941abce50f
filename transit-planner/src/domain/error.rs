//! Domain error types.
//!
//! These errors represent validation failures and data inconsistencies
//! in the domain layer. They are distinct from API/IO errors.

use super::StopId;

/// Domain-level errors for validation and data consistency.
#[derive(Debug, Clone, thiserror::Error)]
pub enum DomainError {
    /// Itinerary has no segments
    #[error("itinerary must have at least one segment")]
    EmptyItinerary,

    /// Segment construction violated an invariant
    #[error("invalid segment: {0}")]
    InvalidSegment(&'static str),

    /// Consecutive segments don't share a stop
    #[error("segments ending at {0} and starting at {1} do not connect")]
    SegmentsNotConnected(StopId, StopId),
}
