//! Simulated processing pipeline: timed status progression and artifact
//! synthesis.

pub mod generator;
pub mod simulator;

pub use simulator::{PipelineSimulator, StageDelays};
