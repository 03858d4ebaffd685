use std::path::Path;
use std::sync::Arc;

use crate::error::Result;

/// Measured outcome of building and running one candidate pipeline.
/// Produced once per individual per generation and never mutated.
pub trait Profile: Send + Sync {
    /// Scalar score, higher is better. The scale is domain-defined.
    fn fitness(&self) -> f64;

    /// Admissibility of the candidate (e.g. semantic equivalence with the
    /// baseline, or output correctness).
    fn constraint(&self) -> bool;
}

/// A plain fitness/admissibility pair.
#[derive(Debug, Clone, Copy)]
pub struct BasicProfile {
    pub fitness: f64,
    pub admissible: bool,
}

impl Profile for BasicProfile {
    fn fitness(&self) -> f64 {
        self.fitness
    }

    fn constraint(&self) -> bool {
        self.admissible
    }
}

/// Single-use build-and-run capability for one candidate pipeline.
///
/// The harness calls `compile` at most once, then `run` at most once, and
/// never reuses an instance. Implementations signal a rejected candidate
/// with `PipexploreError::CannotCompile` (from `compile`) or
/// `PipexploreError::Miscompilation` (from `run`); any other error is
/// treated as fatal by the harness rather than as admissibility information.
pub trait Experiment: Send {
    /// Build the experiment's workload with the given wrapper compiler.
    fn compile(&mut self, compiler: &Path) -> Result<()>;

    /// Run the built workload and measure it.
    fn run(&mut self) -> Result<Arc<dyn Profile>>;
}

/// Constructs a fresh [`Experiment`] per evaluation.
///
/// Isolation between concurrent evaluations comes from construction, never
/// from copying a used instance: every candidate gets its own experiment.
pub trait ExperimentFactory: Send + Sync {
    /// A fresh experiment for one candidate. `pipeline` is the composed
    /// pipeline text; experiments that only consume the wrapper compiler may
    /// ignore it.
    fn experiment(&self, pipeline: &str) -> Box<dyn Experiment>;

    /// Whether independently constructed experiments may compile and run
    /// concurrently. When false, the harness evaluates strictly
    /// sequentially.
    fn independent(&self) -> bool {
        false
    }
}

pub type LegacyConstraintFn = dyn Fn(&str, &str, &str, &str, &str) -> bool + Send + Sync;
pub type LegacyFitnessFn = dyn Fn(&str, &str, &str, &str) -> f64 + Send + Sync;

/// Adapter for the legacy free-function evaluation contract:
/// `constraint(pipeline, raw_ir, opt_ir, input, output)` and
/// `fitness(pipeline, raw_ir, input, output)` over fixed artifacts, exposed
/// through the same [`ExperimentFactory`] interface as everything else.
pub struct FnExperimentFactory {
    raw_ir: String,
    opt_ir: String,
    input: String,
    output: String,
    constraint: Arc<LegacyConstraintFn>,
    fitness: Arc<LegacyFitnessFn>,
}

impl FnExperimentFactory {
    pub fn new(
        raw_ir: impl Into<String>,
        opt_ir: impl Into<String>,
        input: impl Into<String>,
        output: impl Into<String>,
        constraint: impl Fn(&str, &str, &str, &str, &str) -> bool + Send + Sync + 'static,
        fitness: impl Fn(&str, &str, &str, &str) -> f64 + Send + Sync + 'static,
    ) -> Self {
        Self {
            raw_ir: raw_ir.into(),
            opt_ir: opt_ir.into(),
            input: input.into(),
            output: output.into(),
            constraint: Arc::new(constraint),
            fitness: Arc::new(fitness),
        }
    }
}

impl ExperimentFactory for FnExperimentFactory {
    fn experiment(&self, pipeline: &str) -> Box<dyn Experiment> {
        Box::new(FnExperiment {
            pipeline: pipeline.to_string(),
            raw_ir: self.raw_ir.clone(),
            opt_ir: self.opt_ir.clone(),
            input: self.input.clone(),
            output: self.output.clone(),
            constraint: Arc::clone(&self.constraint),
            fitness: Arc::clone(&self.fitness),
        })
    }
}

struct FnExperiment {
    pipeline: String,
    raw_ir: String,
    opt_ir: String,
    input: String,
    output: String,
    constraint: Arc<LegacyConstraintFn>,
    fitness: Arc<LegacyFitnessFn>,
}

impl Experiment for FnExperiment {
    fn compile(&mut self, _compiler: &Path) -> Result<()> {
        // The free functions operate on the pipeline text directly.
        Ok(())
    }

    fn run(&mut self) -> Result<Arc<dyn Profile>> {
        let admissible = (self.constraint)(
            &self.pipeline,
            &self.raw_ir,
            &self.opt_ir,
            &self.input,
            &self.output,
        );
        let fitness = (self.fitness)(&self.pipeline, &self.raw_ir, &self.input, &self.output);
        Ok(Arc::new(BasicProfile { fitness, admissible }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fn_adapter_produces_profile() {
        let factory = FnExperimentFactory::new(
            "raw",
            "opt",
            "in",
            "out",
            |pipeline, raw, opt, input, output| {
                pipeline == "a,b" && raw == "raw" && opt == "opt" && input == "in" && output == "out"
            },
            |pipeline, _, _, _| pipeline.len() as f64,
        );

        let mut experiment = factory.experiment("a,b");
        experiment.compile(Path::new("/nonexistent")).unwrap();
        let profile = experiment.run().unwrap();
        assert!(profile.constraint());
        assert_eq!(profile.fitness(), 3.0);
    }
}
