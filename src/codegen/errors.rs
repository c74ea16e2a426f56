use thiserror::Error;

/// Code generation error types
#[derive(Error, Debug)]
pub enum CodegenError {
    #[error("failed to write VM output: {0}")]
    Io(#[from] std::io::Error),
}
