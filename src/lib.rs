//! A TrueType bytecode interpreter: the glyph-hinting virtual machine that
//! runs `fpgm`/`prep`/glyph programs against a graphics state, two point
//! zones, and a control-value/storage area.
//!
//! The core numeric and algorithmic layer (fixed-point math, rounding,
//! zones, the opcode decoder, the engine and its dispatch table) is
//! `no_std`-compatible; [`instance`], the persistent per-font-instance
//! driver that owns growable buffers, requires the `std` feature.

#![cfg_attr(not(feature = "std"), no_std)]

#[cfg(feature = "std")]
extern crate std;

mod call_stack;
mod code;
mod cow_slice;
mod cvt;
mod definition;
mod engine;
mod error;
mod fixed;
mod graphics;
#[cfg(feature = "std")]
mod instance;
mod math;
mod program;
mod round;
mod storage;
mod value_stack;
mod zone;

pub use call_stack::CallStack;
pub use code::{Decoder, InlineOperands, Instruction, Opcode};
pub use cow_slice::{CowSlice, CowSliceSizeMismatchError};
pub use cvt::Cvt;
pub use definition::{Definition, DefinitionMap};
pub use engine::{Engine, LoopBudget};
pub use error::{HintError, HintErrorKind};
pub use fixed::{F26Dot6, F2Dot14, Fixed, Point};
pub use graphics::{CoordAxis, GraphicsState, RetainedGraphicsState, ZoneSelector};
pub use program::{Program, ProgramState};
pub use round::{RoundMode, RoundState};
pub use storage::Storage;
pub use value_stack::ValueStack;
pub use zone::{PointFlags, Zone};

#[cfg(feature = "std")]
pub use instance::{GlyphInput, HintEngine, HintedGlyph, Limits};
