use crate::error::Result;

use super::atomize::{atomize, compose};
use super::tree::parse;

/// Applies a pass pipeline to a textual IR module and returns the resulting
/// module text. Implemented by the LLVM toolchain in production and by stubs
/// in tests.
pub trait ApplyPass {
    fn apply(&self, module: &str, passes: &str) -> Result<String>;
}

/// Greedily shrink `pipeline_text` against `module`, returning the reduced
/// pipeline text.
///
/// Single forward pass, no backtracking: each atom is applied in turn, and
/// atoms whose output is textually equivalent to their input (modulo path
/// metadata, see [`text_equivalent`]) are dropped from the result. A dropped
/// atom's output still becomes the new baseline, since later passes may
/// depend on changes the normalization hides. The result is order-preserving
/// and best-effort, not globally minimal.
pub fn minimize(applier: &dyn ApplyPass, module: &str, pipeline_text: &str) -> Result<String> {
    let atoms = atomize(&parse(pipeline_text)?);
    Ok(compose(&minimize_atoms(applier, module, &atoms)?))
}

/// Atom-list form of [`minimize`].
pub fn minimize_atoms(
    applier: &dyn ApplyPass,
    module: &str,
    atoms: &[String],
) -> Result<Vec<String>> {
    let mut current = module.to_string();
    let mut kept = Vec::new();
    let mut removed = 0usize;
    for atom in atoms {
        let next = applier.apply(&current, atom)?;
        if text_equivalent(&next, &current) {
            removed += 1;
        } else {
            kept.push(atom.clone());
        }
        current = next;
    }
    log::debug!("minimizer removed {} of {} atoms", removed, atoms.len());
    Ok(kept)
}

/// Whether two textual IR modules are equivalent modulo metadata that varies
/// with temp-file paths: module-identifier comments, source-filename
/// declarations and `!DIFile` records.
pub fn text_equivalent(a: &str, b: &str) -> bool {
    normalized_lines(a).eq(normalized_lines(b))
}

fn normalized_lines(module: &str) -> impl Iterator<Item = &str> {
    module.lines().filter(|line| {
        !(line.starts_with("; ModuleID = ")
            || line.starts_with("source_filename = ")
            || is_di_file_record(line))
    })
}

/// Matches `!<digits> = !DIFile(` lines.
fn is_di_file_record(line: &str) -> bool {
    let rest = match line.strip_prefix('!') {
        Some(rest) => rest,
        None => return false,
    };
    let digits = rest.len() - rest.trim_start_matches(|c: char| c.is_ascii_digit()).len();
    digits > 0 && rest[digits..].starts_with(" = !DIFile(")
}
