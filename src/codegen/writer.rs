use crate::codegen::{Arithmetic, BinaryOp, CodegenError, Lowering, Segment};
use std::io::Write;

/// Writes VM commands, one per line, to an output sink.
///
/// The writer holds no state besides the sink; every method appends exactly
/// one line, except [`VmWriter::write_binary`] for runtime-lowered operators.
pub struct VmWriter<W: Write> {
    out: W,
}

impl<W: Write> VmWriter<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    pub fn write_push(&mut self, segment: Segment, index: usize) -> Result<(), CodegenError> {
        writeln!(self.out, "push {segment} {index}")?;
        Ok(())
    }

    pub fn write_pop(&mut self, segment: Segment, index: usize) -> Result<(), CodegenError> {
        writeln!(self.out, "pop {segment} {index}")?;
        Ok(())
    }

    pub fn write_arithmetic(&mut self, command: Arithmetic) -> Result<(), CodegenError> {
        writeln!(self.out, "{command}")?;
        Ok(())
    }

    pub fn write_binary(&mut self, op: BinaryOp) -> Result<(), CodegenError> {
        match op.lowering() {
            Lowering::Native(command) => self.write_arithmetic(command),
            Lowering::Runtime(routine) => self.write_call(routine, 2),
        }
    }

    pub fn write_label(&mut self, label: &str) -> Result<(), CodegenError> {
        writeln!(self.out, "label {label}")?;
        Ok(())
    }

    pub fn write_goto(&mut self, label: &str) -> Result<(), CodegenError> {
        writeln!(self.out, "goto {label}")?;
        Ok(())
    }

    pub fn write_if(&mut self, label: &str) -> Result<(), CodegenError> {
        writeln!(self.out, "if-goto {label}")?;
        Ok(())
    }

    pub fn write_call(&mut self, name: &str, n_args: usize) -> Result<(), CodegenError> {
        writeln!(self.out, "call {name} {n_args}")?;
        Ok(())
    }

    pub fn write_function(&mut self, name: &str, n_locals: usize) -> Result<(), CodegenError> {
        writeln!(self.out, "function {name} {n_locals}")?;
        Ok(())
    }

    pub fn write_return(&mut self) -> Result<(), CodegenError> {
        writeln!(self.out, "return")?;
        Ok(())
    }

    pub fn flush(&mut self) -> Result<(), CodegenError> {
        self.out.flush()?;
        Ok(())
    }

    /// Give back the sink
    pub fn into_inner(self) -> W {
        self.out
    }
}
