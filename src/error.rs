//! Hinting error definitions.

use core::fmt;

use crate::code::Opcode;
use crate::program::Program;

/// Errors that may occur when interpreting TrueType bytecode.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum HintErrorKind {
    UnexpectedEndOfBytecode,
    UnhandledOpcode(Opcode),
    DefinitionInGlyphProgram,
    NestedDefinition,
    DefinitionTooLarge,
    TooManyDefinitions,
    InvalidDefinition(i32),
    ValueStackOverflow,
    ValueStackUnderflow,
    CallStackOverflow,
    CallStackUnderflow,
    InvalidStackValue(i32),
    InvalidPointIndex(usize),
    InvalidPointRange(usize, usize),
    InvalidContourIndex(usize),
    InvalidCvtIndex(usize),
    InvalidStorageIndex(usize),
    DivideByZero,
    InvalidZoneIndex(i32),
    NegativeLoopCounter,
    InvalidJump,
    ExceededExecutionBudget,
}

impl fmt::Display for HintErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnexpectedEndOfBytecode => write!(f, "unexpected end of bytecode"),
            Self::UnhandledOpcode(opcode) => write!(f, "unhandled opcode {opcode:?}"),
            Self::DefinitionInGlyphProgram => {
                write!(f, "FDEF or IDEF instruction present in glyph program")
            }
            Self::NestedDefinition => write!(
                f,
                "FDEF or IDEF instruction present in another FDEF or IDEF block"
            ),
            Self::DefinitionTooLarge => write!(f, "function or instruction definition body too large"),
            Self::TooManyDefinitions => write!(f, "no free function or instruction definition slot"),
            Self::InvalidDefinition(key) => {
                write!(f, "no active function or instruction definition for {key}")
            }
            Self::ValueStackOverflow => write!(f, "value stack overflow"),
            Self::ValueStackUnderflow => write!(f, "value stack underflow"),
            Self::CallStackOverflow => write!(f, "call stack overflow"),
            Self::CallStackUnderflow => write!(f, "call stack underflow"),
            Self::InvalidStackValue(value) => write!(
                f,
                "stack value {value} was invalid for the current operation"
            ),
            Self::InvalidPointIndex(index) => write!(f, "point index {index} was out of bounds"),
            Self::InvalidPointRange(start, end) => {
                write!(f, "point range {start}..{end} was out of bounds")
            }
            Self::InvalidContourIndex(index) => {
                write!(f, "contour index {index} was out of bounds")
            }
            Self::InvalidCvtIndex(index) => write!(f, "cvt index {index} was out of bounds"),
            Self::InvalidStorageIndex(index) => {
                write!(f, "storage area index {index} was out of bounds")
            }
            Self::DivideByZero => write!(f, "attempt to divide by 0"),
            Self::InvalidZoneIndex(index) => write!(
                f,
                "zone index {index} was invalid (only 0 or 1 are permitted)"
            ),
            Self::NegativeLoopCounter => {
                write!(f, "attempt to set the loop counter to a negative value")
            }
            Self::InvalidJump => write!(f, "the target of a jump instruction was invalid"),
            Self::ExceededExecutionBudget => {
                write!(f, "program exceeded its instruction or loop execution budget")
            }
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for HintErrorKind {}

/// A hinting error paired with the instruction offset that produced it.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct HintError {
    pub program: Program,
    pub glyph_id: Option<u16>,
    pub pc: usize,
    pub opcode: Option<Opcode>,
    pub kind: HintErrorKind,
}

impl fmt::Display for HintError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?} program at pc {}: {}", self.program, self.pc, self.kind)
    }
}

#[cfg(feature = "std")]
impl std::error::Error for HintError {}
