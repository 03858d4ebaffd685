pub(crate) mod process;
mod toolchain;
mod wrapper;

pub use toolchain::{strip_text, Toolchain};

pub(crate) use wrapper::scratch_path;
