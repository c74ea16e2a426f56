use clap::ValueEnum;

/// Code shape for `let name[index] = value;`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum ArrayAssignment {
    /// Compile the index, then pop the value into the array variable itself.
    /// The index value stays on the stack.
    #[default]
    Legacy,
    /// Store through `pointer 1` / `that 0` at `base + index`.
    Indirect,
}

/// Code shape for string literals
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum StringConstruction {
    /// `String.appendChar` primed with the length, then one call per character
    #[default]
    AppendPriming,
    /// `String.new` with the length, then one `String.appendChar` per character
    Allocate,
}

/// Behaviour switches for the code generator.
///
/// `Default` reproduces the output of the reference toolchain; see
/// [`CompilerOptions::corrected`] for conventional runtime semantics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CompilerOptions {
    pub array_assignment: ArrayAssignment,
    /// Accept `term (op term)*` instead of a single trailing operator
    pub operator_chains: bool,
    pub string_construction: StringConstruction,
}

impl CompilerOptions {
    #[must_use]
    pub fn corrected() -> Self {
        Self {
            array_assignment: ArrayAssignment::Indirect,
            operator_chains: true,
            string_construction: StringConstruction::Allocate,
        }
    }
}
