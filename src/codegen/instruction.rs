use crate::symbol::StorageClass;
use std::fmt;

/// VM memory segments addressable by `push`/`pop`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Segment {
    Constant,
    Argument,
    Local,
    Static,
    This,
    That,
    Pointer,
    Temp,
}

impl From<StorageClass> for Segment {
    fn from(storage_class: StorageClass) -> Self {
        match storage_class {
            StorageClass::Static => Segment::Static,
            StorageClass::Field => Segment::This,
            StorageClass::Argument => Segment::Argument,
            StorageClass::Local => Segment::Local,
        }
    }
}

impl fmt::Display for Segment {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let s = match self {
            Segment::Constant => "constant",
            Segment::Argument => "argument",
            Segment::Local => "local",
            Segment::Static => "static",
            Segment::This => "this",
            Segment::That => "that",
            Segment::Pointer => "pointer",
            Segment::Temp => "temp",
        };
        write!(f, "{}", s)
    }
}

/// Native arithmetic/logical VM commands
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Arithmetic {
    Add,
    Sub,
    Neg,
    Eq,
    Gt,
    Lt,
    And,
    Or,
    Not,
}

impl fmt::Display for Arithmetic {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let s = match self {
            Arithmetic::Add => "add",
            Arithmetic::Sub => "sub",
            Arithmetic::Neg => "neg",
            Arithmetic::Eq => "eq",
            Arithmetic::Gt => "gt",
            Arithmetic::Lt => "lt",
            Arithmetic::And => "and",
            Arithmetic::Or => "or",
            Arithmetic::Not => "not",
        };
        write!(f, "{}", s)
    }
}

/// Binary operators the emitter knows how to lower
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    And,
    Or,
    Less,
    Greater,
    Equal,
}

/// How a binary operator reaches the VM
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Lowering {
    Native(Arithmetic),
    /// Call to an OS routine taking both operands as arguments
    Runtime(&'static str),
}

impl BinaryOp {
    #[must_use]
    pub fn lowering(self) -> Lowering {
        match self {
            BinaryOp::Add => Lowering::Native(Arithmetic::Add),
            BinaryOp::Sub => Lowering::Native(Arithmetic::Sub),
            BinaryOp::And => Lowering::Native(Arithmetic::And),
            BinaryOp::Or => Lowering::Native(Arithmetic::Or),
            BinaryOp::Less => Lowering::Native(Arithmetic::Lt),
            BinaryOp::Greater => Lowering::Native(Arithmetic::Gt),
            BinaryOp::Equal => Lowering::Native(Arithmetic::Eq),
            BinaryOp::Mul => Lowering::Runtime("Math.multiply"),
        }
    }
}

/// Unary operators
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOp {
    Neg,
    Not,
}

impl From<UnaryOp> for Arithmetic {
    fn from(op: UnaryOp) -> Self {
        match op {
            UnaryOp::Neg => Arithmetic::Neg,
            UnaryOp::Not => Arithmetic::Not,
        }
    }
}
