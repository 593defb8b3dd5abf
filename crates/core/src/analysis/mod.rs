//! Game analysis: normalization, opening classification, aggregation

pub mod aggregate;
pub mod openings;
pub mod reconcile;
pub mod record;

pub use aggregate::{
    aggregate_openings, aggregate_time_controls, aggregate_user, OpeningAggregate,
    PerformanceStats, TimeControlAggregate, UserAggregate,
};
pub use openings::{classify_opening, UNKNOWN_OPENING};
pub use record::{normalize, GameOutcome, GameRecord, PlayerColor, FIRST_MOVE_PAIRS};
pub use reconcile::{reconcile_opening, reconcile_time_control, reconcile_user};
