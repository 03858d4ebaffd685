mod individual;
mod population;

pub use individual::{Individual, MutationOp};
pub use population::{Population, DEFAULT_MUTATION_RATE};
