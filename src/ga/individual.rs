use std::fmt;
use std::sync::Arc;

use rand::seq::SliceRandom;
use rand::Rng;

use crate::eval::Profile;
use crate::pipeline::compose;

/// One candidate: an ordered atomic pass sequence plus the profile measured
/// for it in the current generation (absent until evaluated).
#[derive(Clone)]
pub struct Individual {
    pub passes: Vec<String>,
    pub profile: Option<Arc<dyn Profile>>,
}

/// The six mutation kinds. Each is a silent no-op when its length
/// precondition is unmet.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MutationOp {
    Replace,
    Delete,
    Insert,
    Swap,
    Duplicate,
    Reverse,
}

impl MutationOp {
    pub const ALL: [MutationOp; 6] = [
        MutationOp::Replace,
        MutationOp::Delete,
        MutationOp::Insert,
        MutationOp::Swap,
        MutationOp::Duplicate,
        MutationOp::Reverse,
    ];

    pub fn choose<R: Rng>(rng: &mut R) -> MutationOp {
        Self::ALL[rng.gen_range(0..Self::ALL.len())]
    }
}

impl Individual {
    pub fn new(passes: Vec<String>) -> Self {
        Self { passes, profile: None }
    }

    pub fn len(&self) -> usize {
        self.passes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.passes.is_empty()
    }

    /// Fitness of the attached profile, if any.
    pub fn fitness(&self) -> Option<f64> {
        self.profile.as_ref().map(|profile| profile.fitness())
    }

    /// Whether the attached profile satisfies the constraint. Unevaluated
    /// individuals are never admissible.
    pub fn admissible(&self) -> bool {
        self.profile
            .as_ref()
            .map_or(false, |profile| profile.constraint())
    }

    pub fn mutate<R: Rng>(&mut self, op: MutationOp, universe: &[String], rng: &mut R) {
        match op {
            MutationOp::Replace => self.mutate_replace(universe, rng),
            MutationOp::Delete => self.mutate_delete(rng),
            MutationOp::Insert => self.mutate_insert(universe, rng),
            MutationOp::Swap => self.mutate_swap(rng),
            MutationOp::Duplicate => self.mutate_duplicate(rng),
            MutationOp::Reverse => self.mutate_reverse(rng),
        }
    }

    fn mutate_replace<R: Rng>(&mut self, universe: &[String], rng: &mut R) {
        if self.passes.is_empty() {
            return;
        }
        if let Some(atom) = universe.choose(rng) {
            let pos = rng.gen_range(0..self.passes.len());
            self.passes[pos] = atom.clone();
        }
    }

    fn mutate_delete<R: Rng>(&mut self, rng: &mut R) {
        if self.passes.len() >= 2 {
            let pos = rng.gen_range(0..self.passes.len());
            self.passes.remove(pos);
        }
    }

    fn mutate_insert<R: Rng>(&mut self, universe: &[String], rng: &mut R) {
        if let Some(atom) = universe.choose(rng) {
            let pos = rng.gen_range(0..=self.passes.len());
            self.passes.insert(pos, atom.clone());
        }
    }

    fn mutate_swap<R: Rng>(&mut self, rng: &mut R) {
        let len = self.passes.len();
        if len >= 2 {
            let first = rng.gen_range(0..len);
            let mut second = rng.gen_range(0..len - 1);
            if second >= first {
                second += 1;
            }
            self.passes.swap(first, second);
        }
    }

    fn mutate_duplicate<R: Rng>(&mut self, rng: &mut R) {
        let len = self.passes.len();
        if len >= 2 {
            let start = rng.gen_range(0..len);
            let end = rng.gen_range(start + 1..=len);
            let segment: Vec<String> = self.passes[start..end].to_vec();
            let at = rng.gen_range(0..=len);
            let tail = self.passes.split_off(at);
            self.passes.extend(segment);
            self.passes.extend(tail);
        }
    }

    fn mutate_reverse<R: Rng>(&mut self, rng: &mut R) {
        let len = self.passes.len();
        if len >= 2 {
            let start = rng.gen_range(0..=len - 2);
            let end = rng.gen_range(start + 1..=len);
            self.passes[start..end].reverse();
        }
    }

    /// Two-point crossover. Both parents are returned unchanged when either
    /// is shorter than two atoms; otherwise the children exchange the
    /// segment between two cut points chosen within the shorter parent, so
    /// the atom multiset over both children equals that over both parents.
    pub fn crossover<R: Rng>(
        parent1: &Individual,
        parent2: &Individual,
        rng: &mut R,
    ) -> (Individual, Individual) {
        if parent1.len() < 2 || parent2.len() < 2 {
            return (parent1.clone(), parent2.clone());
        }

        let limit = parent1.len().min(parent2.len());
        let cut1 = rng.gen_range(0..limit);
        let cut2 = rng.gen_range(cut1 + 1..=limit);

        let child1 = [
            &parent1.passes[..cut1],
            &parent2.passes[cut1..cut2],
            &parent1.passes[cut2..],
        ]
        .concat();
        let child2 = [
            &parent2.passes[..cut1],
            &parent1.passes[cut1..cut2],
            &parent2.passes[cut2..],
        ]
        .concat();

        (Individual::new(child1), Individual::new(child2))
    }
}

impl fmt::Display for Individual {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", compose(&self.passes))
    }
}

impl fmt::Debug for Individual {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Individual")
            .field("passes", &self.passes)
            .field("fitness", &self.fitness())
            .finish()
    }
}
