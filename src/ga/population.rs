use std::cmp::Ordering;
use std::sync::Arc;

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};

use crate::error::{PipexploreError, Result};
use crate::eval::Harness;

use super::individual::{Individual, MutationOp};

pub const DEFAULT_MUTATION_RATE: f64 = 0.2;

/// Share of the population retained as admissible elites each generation.
const ADMISSIBLE_ELITE_SHARE: f64 = 0.20;
/// Share retained as overall-fitness elites, constraint ignored.
const OVERALL_ELITE_SHARE: f64 = 0.05;
/// Total retention quota topped up with random survivors before breeding.
const RETENTION_SHARE: f64 = 0.25;

/// A fixed-capacity population of candidate pipelines, the generation
/// counter, and the evaluation harness that profiles each generation.
pub struct Population {
    individuals: Vec<Individual>,
    size: usize,
    generation: u64,
    universe: Arc<Vec<String>>,
    harness: Harness,
    rng: StdRng,
}

impl Population {
    pub fn new(
        size: usize,
        universe: Arc<Vec<String>>,
        harness: Harness,
        seed: Option<u64>,
    ) -> Self {
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self {
            individuals: Vec::new(),
            size,
            generation: 0,
            universe,
            harness,
            rng,
        }
    }

    /// Seed every slot with the entire pass universe, matching the baseline
    /// full pipeline, then evaluate all of them.
    pub fn initialize(&mut self) -> Result<()> {
        self.individuals = (0..self.size)
            .map(|_| Individual::new((*self.universe).clone()))
            .collect();
        self.profile_all()
    }

    /// Produce the next generation.
    ///
    /// Retention is tiered: the fittest admissible individuals
    /// (`ADMISSIBLE_ELITE_SHARE`), the fittest overall regardless of
    /// constraint (`OVERALL_ELITE_SHARE`, overlap with the first tier is
    /// permitted), then random survivors until `RETENTION_SHARE` is reached.
    /// The remainder is bred by two-point crossover of random parents, each
    /// child independently mutated with probability `mutation_rate`, and the
    /// whole new generation is evaluated.
    pub fn evolve(&mut self, mutation_rate: f64) -> Result<()> {
        let equ_size = quota(self.size, ADMISSIBLE_ELITE_SHARE);
        let eli_size = quota(self.size, OVERALL_ELITE_SHARE);
        let elite_size = quota(self.size, RETENTION_SHARE);

        let mut next: Vec<Individual> = Vec::with_capacity(self.size);

        let mut admissible: Vec<&Individual> =
            self.individuals.iter().filter(|ind| ind.admissible()).collect();
        sort_by_fitness_desc(&mut admissible);
        next.extend(admissible.iter().take(equ_size).map(|ind| (*ind).clone()));

        let mut overall: Vec<&Individual> = self.individuals.iter().collect();
        sort_by_fitness_desc(&mut overall);
        next.extend(overall.iter().take(eli_size).map(|ind| (*ind).clone()));

        while next.len() < elite_size {
            match self.individuals.choose(&mut self.rng) {
                Some(ind) => next.push(ind.clone()),
                None => break,
            }
        }

        while next.len() < self.size {
            let parent1 = match self.individuals.choose(&mut self.rng) {
                Some(ind) => ind,
                None => break,
            };
            let parent2 = match self.individuals.choose(&mut self.rng) {
                Some(ind) => ind,
                None => break,
            };
            let (mut child1, mut child2) = Individual::crossover(parent1, parent2, &mut self.rng);

            for child in [&mut child1, &mut child2] {
                if self.rng.gen::<f64>() < mutation_rate {
                    let op = MutationOp::choose(&mut self.rng);
                    child.mutate(op, &self.universe, &mut self.rng);
                }
            }

            next.push(child1);
            if next.len() < self.size {
                next.push(child2);
            }
        }

        if next.len() < self.size {
            log::warn!(
                "population exhausted: only {} of {} slots could be filled",
                next.len(),
                self.size
            );
        }

        self.individuals = next;
        self.generation += 1;
        self.profile_all()
    }

    /// Number of individuals whose profile satisfies the constraint.
    pub fn admissible_count(&self) -> usize {
        self.individuals.iter().filter(|ind| ind.admissible()).count()
    }

    /// The constraint-satisfying individual with the highest fitness. Fails
    /// explicitly when no individual is admissible. Ties resolve to the
    /// earliest population index.
    pub fn best(&self) -> Result<&Individual> {
        let mut admissible: Vec<&Individual> =
            self.individuals.iter().filter(|ind| ind.admissible()).collect();
        if admissible.is_empty() {
            return Err(PipexploreError::NoAdmissibleIndividual);
        }
        sort_by_fitness_desc(&mut admissible);
        Ok(admissible[0])
    }

    pub fn individuals(&self) -> &[Individual] {
        &self.individuals
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn size(&self) -> usize {
        self.size
    }

    /// Evaluate every individual through the harness, keeping only the ones
    /// whose evaluation produced a profile. Signaled rejections shrink the
    /// population until the next reproduction refills it.
    fn profile_all(&mut self) -> Result<()> {
        let pipelines: Vec<String> = self
            .individuals
            .iter()
            .map(|ind| ind.to_string())
            .collect();
        let profiles = self.harness.evaluate_batch(&pipelines)?;

        let total = self.individuals.len();
        let mut survivors = Vec::with_capacity(total);
        for (mut ind, profile) in self.individuals.drain(..).zip(profiles) {
            if let Some(profile) = profile {
                ind.profile = Some(profile);
                survivors.push(ind);
            }
        }
        if survivors.len() < total {
            log::debug!(
                "generation {}: {} of {} candidates survived evaluation",
                self.generation,
                survivors.len(),
                total
            );
        }
        self.individuals = survivors;
        Ok(())
    }
}

fn quota(size: usize, share: f64) -> usize {
    ((size as f64 * share).round() as usize).max(1)
}

/// Stable descending sort, so equal fitness preserves population order.
fn sort_by_fitness_desc(individuals: &mut [&Individual]) {
    individuals.sort_by(|a, b| {
        let fa = a.fitness().unwrap_or(f64::NEG_INFINITY);
        let fb = b.fitness().unwrap_or(f64::NEG_INFINITY);
        fb.partial_cmp(&fa).unwrap_or(Ordering::Equal)
    });
}
