//! The analytic engines and their orchestration.
//!
//! Each engine is a single entry point taking an optional inline payload and
//! the dataset configuration, and returning its result or an `EngineError`
//! as a value. The orchestrator in [`analysis`] composes all four into one
//! report with per-section failure isolation.

pub mod analysis;
pub mod elasticity;
pub mod forecast;
pub mod roi;
pub mod simulate;

pub use analysis::run_analysis;
pub use elasticity::run_elasticity;
pub use forecast::run_forecast;
pub use roi::run_roi;
pub use simulate::run_simulation;
