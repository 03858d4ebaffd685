use crate::error::{PipexploreError, Result};

/// One node of a parsed pipeline: either a leaf pass, or a pass manager
/// wrapping a sub-pipeline of its own.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PassNode {
    Leaf(String),
    Manager(String, PipelineTree),
}

/// An ordered sequence of pipeline nodes. Order is significant and is
/// preserved through parse, atomize and compose.
pub type PipelineTree = Vec<PassNode>;

/// Parse pipeline text into a tree.
///
/// The grammar is a comma-separated list of items at each nesting level,
/// where an item is either a bare pass name or `name(<nested list>)`.
/// Whitespace of any kind is insignificant and stripped up front. The empty
/// string parses to an empty tree. Nesting is handled with an explicit stack
/// of (partial list, pending manager name) frames, so depth is unbounded.
pub fn parse(text: &str) -> Result<PipelineTree> {
    let cleaned: String = text
        .chars()
        .filter(|c| !matches!(c, ' ' | '\n' | '\t' | '\r'))
        .collect();
    if cleaned.is_empty() {
        return Ok(Vec::new());
    }

    let mut stack: Vec<(PipelineTree, String)> = Vec::new();
    let mut current: PipelineTree = Vec::new();
    let mut name = String::new();

    for ch in cleaned.chars() {
        match ch {
            '(' => {
                stack.push((std::mem::take(&mut current), std::mem::take(&mut name)));
            }
            ')' => {
                // A trailing empty name before `)` is dropped, not emitted.
                if !name.is_empty() {
                    current.push(PassNode::Leaf(std::mem::take(&mut name)));
                }
                let (mut parent, manager) = stack.pop().ok_or_else(|| {
                    PipexploreError::Parse("unbalanced ')' in pipeline text".to_string())
                })?;
                parent.push(PassNode::Manager(manager, std::mem::take(&mut current)));
                current = parent;
            }
            ',' => {
                if !name.is_empty() {
                    current.push(PassNode::Leaf(std::mem::take(&mut name)));
                }
            }
            _ => name.push(ch),
        }
    }

    if !name.is_empty() {
        current.push(PassNode::Leaf(name));
    }
    if !stack.is_empty() {
        return Err(PipexploreError::Parse(
            "unbalanced '(' in pipeline text".to_string(),
        ));
    }
    Ok(current)
}
