use std::path::PathBuf;
use std::sync::Arc;

use rayon::prelude::*;

use crate::error::{PipexploreError, Result};

use super::experiment::{Experiment, ExperimentFactory, Profile};

/// Turns a candidate pipeline into an on-disk wrapper compiler the
/// evaluation contract can invoke. Implemented by the LLVM toolchain in
/// production and by stubs in tests.
pub trait Materialize: Send + Sync {
    fn materialize(&self, pipeline: &str) -> Result<PathBuf>;
}

/// Per-individual evaluation harness.
///
/// Each evaluation materializes a wrapper compiler for the candidate,
/// compiles and runs the experiment against it, and yields the measured
/// profile. Signaled rejections (CannotCompile, Miscompilation) drop the
/// candidate without failing the batch; everything else propagates.
pub struct Harness {
    factory: Arc<dyn ExperimentFactory>,
    compilers: Arc<dyn Materialize>,
}

impl Harness {
    pub fn new(factory: Arc<dyn ExperimentFactory>, compilers: Arc<dyn Materialize>) -> Self {
        Self { factory, compilers }
    }

    /// Evaluate one candidate pipeline.
    ///
    /// `Ok(Some(profile))` on success, `Ok(None)` when the contract signaled
    /// a rejection, `Err` on any other failure.
    pub fn evaluate(&self, pipeline: &str) -> Result<Option<Arc<dyn Profile>>> {
        let compiler = self.compilers.materialize(pipeline)?;
        let mut experiment = self.factory.experiment(pipeline);

        let compiled = experiment.compile(&compiler);
        // The wrapper is single-use; remove it whether or not compile
        // succeeded, swallowing deletion failures.
        let _ = std::fs::remove_file(&compiler);

        match compiled {
            Ok(()) => {}
            Err(PipexploreError::CannotCompile(reason)) => {
                log::debug!("candidate dropped, cannot compile: {}", reason);
                return Ok(None);
            }
            Err(err) => return Err(err),
        }

        match experiment.run() {
            Ok(profile) => Ok(Some(profile)),
            Err(PipexploreError::Miscompilation(reason)) => {
                log::debug!("candidate dropped, miscompilation: {}", reason);
                Ok(None)
            }
            Err(err) => Err(err),
        }
    }

    /// Evaluate a batch of candidates, in parallel across the rayon worker
    /// pool when the factory declares its experiments independent, strictly
    /// sequentially otherwise. The result preserves input order; `None`
    /// marks a dropped candidate.
    pub fn evaluate_batch(&self, pipelines: &[String]) -> Result<Vec<Option<Arc<dyn Profile>>>> {
        if self.factory.independent() {
            pipelines
                .par_iter()
                .map(|pipeline| self.evaluate(pipeline))
                .collect()
        } else {
            pipelines
                .iter()
                .map(|pipeline| self.evaluate(pipeline))
                .collect()
        }
    }
}
