//! Domain layer: queue, rate adaptation, statistics and errors.

pub mod errors;
pub mod governor;
pub mod queue;
pub mod stats;

pub use errors::ConsumerError;
pub use governor::{PollGovernor, TickDecision};
pub use queue::IntakeQueue;
pub use stats::{ConsumerStats, StatsSnapshot};
