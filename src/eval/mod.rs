mod experiment;
mod harness;
mod size;

pub use experiment::{
    BasicProfile, Experiment, ExperimentFactory, FnExperimentFactory, LegacyConstraintFn,
    LegacyFitnessFn, Profile,
};
pub use harness::{Harness, Materialize};
pub use size::{SizeExperiment, SizeExperimentFactory};
