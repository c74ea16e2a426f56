//! Jack to VM compiler
//!
//! A single-pass compiler for the Jack language: a scanner, a two-level
//! symbol table and a recursive-descent translator that writes stack VM
//! instructions while it parses.

pub mod lexer;
pub mod symbol;
pub mod codegen;
pub mod compiler;
pub mod driver;

pub use lexer::*;
pub use symbol::*;
pub use codegen::*;
pub use compiler::*;
