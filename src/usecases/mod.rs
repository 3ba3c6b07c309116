//! Use Cases Layer - Application Business Logic
//!
//! Orchestrates domain logic with port interfaces.
//!
//! Use cases:
//! - `LiquidityProbeScheduler`: Sweeps, reconciliation and seeding
//! - `Pacing`: Jittered spacing between probe launches

pub mod pacing;
pub mod probe_scheduler;

pub use pacing::Pacing;
pub use probe_scheduler::{
  LiquidityProbeScheduler, Reconciliation, SchedulerSettings, SweepError, SweepReport,
};
