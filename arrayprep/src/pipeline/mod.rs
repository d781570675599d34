//! Step orchestration: the fixed step registry, the two configuration
//! surfaces, plan resolution and plan execution.

pub mod config;
pub mod executor;
pub mod planner;
pub mod registry;
mod run;


pub use run::{
    make_pipeline,
    process_batch,
    run_pipeline,
};
