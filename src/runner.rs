use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::config::SearchConfig;
use crate::error::Result;
use crate::eval::{ExperimentFactory, Harness, Materialize};
use crate::ga::Population;
use crate::llvm::Toolchain;

/// Drives a whole search: discovers the pass universe, runs the configured
/// number of generations, and writes the winning pipeline's wrapper compiler
/// to `output`. Falls back to the pre-search baseline winner when evolution
/// finds nothing better.
pub struct Runner {
    config: SearchConfig,
    toolchain: Arc<Toolchain>,
    factory: Arc<dyn ExperimentFactory>,
    output: PathBuf,
    stop: Arc<AtomicBool>,
}

impl Runner {
    pub fn new(
        config: SearchConfig,
        toolchain: Arc<Toolchain>,
        factory: Arc<dyn ExperimentFactory>,
        output: PathBuf,
    ) -> Self {
        Self {
            config,
            toolchain,
            factory,
            output,
            stop: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Cooperative stop signal, checked between generations. Setting it
    /// finishes the in-flight generation and then stops.
    pub fn stop_flag(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.stop)
    }

    /// Run the search and return the winning pipeline text.
    pub fn run(&self) -> Result<String> {
        let universe = Arc::new(self.toolchain.pass_universe(&self.config.opt_level)?);
        log::info!(
            "pass universe holds {} atomic passes at -{}",
            universe.len(),
            self.config.opt_level
        );

        let materializer: Arc<dyn Materialize> = Arc::clone(&self.toolchain) as Arc<dyn Materialize>;
        let harness = Harness::new(Arc::clone(&self.factory), materializer);
        let mut population = Population::new(
            self.config.population_size,
            universe,
            harness,
            self.config.seed,
        );

        population.initialize()?;
        let baseline = population.best()?.clone();
        let baseline_fitness = baseline.fitness().unwrap_or(f64::NEG_INFINITY);
        log::info!("baseline fitness {:.4}", baseline_fitness);

        for generation in 0..self.config.generations {
            if self.stop.load(Ordering::Relaxed) {
                log::info!("stop requested, ending after generation {}", generation);
                break;
            }
            population.evolve(self.config.mutation_rate)?;
            match population.best() {
                Ok(best) => log::info!(
                    "generation {}/{}: best fitness {:.4}, {} admissible",
                    generation + 1,
                    self.config.generations,
                    best.fitness().unwrap_or(f64::NEG_INFINITY),
                    population.admissible_count()
                ),
                Err(_) => log::warn!(
                    "generation {}/{}: no admissible individual",
                    generation + 1,
                    self.config.generations
                ),
            }
        }

        let winner = match population.best() {
            Ok(best) if best.fitness().unwrap_or(f64::NEG_INFINITY) > baseline_fitness => {
                log::info!(
                    "search beat the baseline: fitness {:.4} -> {:.4}",
                    baseline_fitness,
                    best.fitness().unwrap_or(f64::NEG_INFINITY)
                );
                best.to_string()
            }
            _ => {
                log::info!("no pipeline beat the baseline; keeping the initial winner");
                baseline.to_string()
            }
        };

        self.toolchain.write_wrapper_to(&winner, &self.output)?;
        log::info!("wrapper compiler written to {}", self.output.display());
        Ok(winner)
    }
}
