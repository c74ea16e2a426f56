pub mod errors;
pub mod instruction;
pub mod writer;

pub use errors::*;
pub use instruction::*;
pub use writer::*;
