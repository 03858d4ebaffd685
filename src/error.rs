use thiserror::Error;

#[derive(Error, Debug)]
pub enum PipexploreError {
    #[error("Malformed pipeline text: {0}")]
    Parse(String),

    #[error("Candidate failed to compile: {0}")]
    CannotCompile(String),

    #[error("Candidate miscompiled or failed at runtime: {0}")]
    Miscompilation(String),

    #[error("No individual satisfies the constraint")]
    NoAdmissibleIndividual,

    #[error("External tool failure: {0}")]
    ToolFailure(String),

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, PipexploreError>;
