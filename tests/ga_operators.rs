use pipexplore::ga::{Individual, MutationOp};
use rand::rngs::StdRng;
use rand::SeedableRng;

fn universe() -> Vec<String> {
    ["sroa", "simplifycfg", "adce", "instcombine", "gvn"]
        .iter()
        .map(|s| s.to_string())
        .collect()
}

fn individual(atoms: &[&str]) -> Individual {
    Individual::new(atoms.iter().map(|s| s.to_string()).collect())
}

fn sorted(passes: &[String]) -> Vec<String> {
    let mut sorted = passes.to_vec();
    sorted.sort();
    sorted
}

#[test]
fn test_delete_and_swap_are_noops_below_two_atoms() {
    let universe = universe();
    for seed in 0..20 {
        let mut rng = StdRng::seed_from_u64(seed);
        let mut short = individual(&["sroa"]);
        short.mutate(MutationOp::Delete, &universe, &mut rng);
        assert_eq!(short.passes, vec!["sroa"]);
        short.mutate(MutationOp::Swap, &universe, &mut rng);
        assert_eq!(short.passes, vec!["sroa"]);
        short.mutate(MutationOp::Duplicate, &universe, &mut rng);
        assert_eq!(short.passes, vec!["sroa"]);
        short.mutate(MutationOp::Reverse, &universe, &mut rng);
        assert_eq!(short.passes, vec!["sroa"]);
    }
}

#[test]
fn test_replace_is_noop_on_empty() {
    let mut rng = StdRng::seed_from_u64(7);
    let mut empty = Individual::new(Vec::new());
    empty.mutate(MutationOp::Replace, &universe(), &mut rng);
    assert!(empty.is_empty());
}

#[test]
fn test_insert_works_on_empty() {
    let universe = universe();
    let mut rng = StdRng::seed_from_u64(7);
    let mut empty = Individual::new(Vec::new());
    empty.mutate(MutationOp::Insert, &universe, &mut rng);
    assert_eq!(empty.len(), 1);
    assert!(universe.contains(&empty.passes[0]));
}

#[test]
fn test_replace_keeps_length_and_draws_from_universe() {
    let universe = universe();
    for seed in 0..50 {
        let mut rng = StdRng::seed_from_u64(seed);
        let mut ind = individual(&["a", "b", "c", "d"]);
        ind.mutate(MutationOp::Replace, &universe, &mut rng);
        assert_eq!(ind.len(), 4);
        let replaced: Vec<&String> =
            ind.passes.iter().filter(|p| universe.contains(p)).collect();
        assert_eq!(replaced.len(), 1);
    }
}

#[test]
fn test_delete_removes_exactly_one() {
    for seed in 0..50 {
        let mut rng = StdRng::seed_from_u64(seed);
        let mut ind = individual(&["a", "b", "c"]);
        ind.mutate(MutationOp::Delete, &universe(), &mut rng);
        assert_eq!(ind.len(), 2);
    }
}

#[test]
fn test_swap_exchanges_two_distinct_positions() {
    for seed in 0..50 {
        let mut rng = StdRng::seed_from_u64(seed);
        let mut pair = individual(&["a", "b"]);
        pair.mutate(MutationOp::Swap, &universe(), &mut rng);
        // With only two positions the exchange is always observable.
        assert_eq!(pair.passes, vec!["b", "a"]);

        let mut longer = individual(&["a", "b", "c", "d", "e"]);
        let before = sorted(&longer.passes);
        longer.mutate(MutationOp::Swap, &universe(), &mut rng);
        assert_eq!(sorted(&longer.passes), before);
        assert_eq!(longer.len(), 5);
    }
}

#[test]
fn test_duplicate_grows_by_segment_length() {
    for seed in 0..50 {
        let mut rng = StdRng::seed_from_u64(seed);
        let mut ind = individual(&["a", "b", "c", "d"]);
        ind.mutate(MutationOp::Duplicate, &universe(), &mut rng);
        assert!(ind.len() > 4 && ind.len() <= 8);
        // Everything that was there is still there.
        for atom in ["a", "b", "c", "d"] {
            assert!(ind.passes.iter().any(|p| p == atom));
        }
    }
}

#[test]
fn test_reverse_preserves_multiset_and_length() {
    for seed in 0..50 {
        let mut rng = StdRng::seed_from_u64(seed);
        let mut ind = individual(&["a", "b", "c", "d", "e"]);
        let before = sorted(&ind.passes);
        ind.mutate(MutationOp::Reverse, &universe(), &mut rng);
        assert_eq!(ind.len(), 5);
        assert_eq!(sorted(&ind.passes), before);
    }
}

#[test]
fn test_crossover_returns_parents_unchanged_when_degenerate() {
    let mut rng = StdRng::seed_from_u64(1);
    let short = individual(&["a"]);
    let long = individual(&["b", "c", "d"]);

    let (child1, child2) = Individual::crossover(&short, &long, &mut rng);
    assert_eq!(child1.passes, short.passes);
    assert_eq!(child2.passes, long.passes);

    let empty = Individual::new(Vec::new());
    let (child1, child2) = Individual::crossover(&long, &empty, &mut rng);
    assert_eq!(child1.passes, long.passes);
    assert!(child2.is_empty());
}

#[test]
fn test_crossover_conserves_the_atom_multiset() {
    for seed in 0..100 {
        let mut rng = StdRng::seed_from_u64(seed);
        let parent1 = individual(&["a", "b", "c", "d", "e"]);
        let parent2 = individual(&["v", "w", "x"]);

        let (child1, child2) = Individual::crossover(&parent1, &parent2, &mut rng);

        // Children keep their parent's length: the exchanged segment lies
        // within the shorter parent.
        assert_eq!(child1.len(), parent1.len());
        assert_eq!(child2.len(), parent2.len());

        let mut children: Vec<String> = child1.passes.clone();
        children.extend(child2.passes.clone());
        let mut parents: Vec<String> = parent1.passes.clone();
        parents.extend(parent2.passes.clone());
        assert_eq!(sorted(&children), sorted(&parents));
    }
}
