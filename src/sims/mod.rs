//! Simulation drivers.

pub mod dropout_run;

pub use dropout_run::{
    run_simulation, run_simulation_parallel, DegradationMode, DiagnosticPoint, RunConfig,
    RunOutcome, RunStatistics,
};
