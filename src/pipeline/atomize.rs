use super::tree::{PassNode, PipelineTree};

/// Final bitcode emission step of a default pipeline. Not a transformation,
/// so it is dropped from the atomized form when it appears last.
const EMISSION_PASS: &str = "BitcodeWriterPass";

/// The IR verifier performs no transformation and is dropped everywhere.
const VERIFIER_PASS: &str = "verify";

/// Flatten a pipeline tree into its canonical ordered list of atomic passes.
///
/// A leaf emits its own name. A `name(subtree)` manager emits `name(a)` for
/// every atom `a` of the flattened subtree, so a manager over k atomic
/// passes expands into k atoms, each invocable as a standalone single-pass
/// pipeline. The emission/verifier drops apply once, at the top level only.
pub fn atomize(tree: &PipelineTree) -> Vec<String> {
    let mut atoms = flatten(tree);
    if atoms.last().map(String::as_str) == Some(EMISSION_PASS) {
        atoms.pop();
    }
    atoms.retain(|atom| atom != VERIFIER_PASS);
    atoms
}

fn flatten(tree: &PipelineTree) -> Vec<String> {
    let mut atoms = Vec::new();
    for node in tree {
        match node {
            PassNode::Leaf(name) => atoms.push(name.clone()),
            PassNode::Manager(name, subtree) => {
                for atom in flatten(subtree) {
                    atoms.push(format!("{}({})", name, atom));
                }
            }
        }
    }
    atoms
}

/// Inverse of [`atomize`]: joining the atom list with commas yields valid
/// pipeline text, and atomize(parse(compose(atoms))) == atoms.
pub fn compose(atoms: &[String]) -> String {
    atoms.join(",")
}
