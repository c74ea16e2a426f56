use thiserror::Error;
use crate::codegen::CodegenError;
use crate::lexer::Position;

/// Compilation error types
#[derive(Error, Debug)]
pub enum CompileError {
    #[error("Expected {0} but found '{1}' at {2}")]
    ExpectedToken(String, String, Position),

    #[error("Unexpected token '{0}' at {1}")]
    UnexpectedToken(String, Position),

    #[error("Unexpected end of input, expected {0}")]
    UnexpectedEof(String),

    #[error("Undefined variable '{0}' at {1}")]
    UndefinedVariable(String, Position),

    #[error("Operator '{0}' is not supported at {1}")]
    UnsupportedOperator(char, Position),

    #[error("Integer constant '{0}' out of range at {1}")]
    IntegerOutOfRange(String, Position),

    #[error("Character {0:?} in string constant out of range at {1}")]
    CharacterOutOfRange(char, Position),

    #[error(transparent)]
    Codegen(#[from] CodegenError),
}
