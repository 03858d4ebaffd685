mod atomize;
mod minimize;
mod tree;

pub use atomize::{atomize, compose};
pub use minimize::{minimize, minimize_atoms, text_equivalent, ApplyPass};
pub use tree::{parse, PassNode, PipelineTree};
