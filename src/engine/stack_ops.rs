//! Plain operand-stack manipulation opcodes that don't fit the generic
//! unary/binary helpers on `ValueStack`.

use super::Engine;
use crate::error::HintErrorKind;

pub fn op_cindex(engine: &mut Engine) -> Result<(), HintErrorKind> {
    let index = engine.stack.pop_usize()?;
    engine.stack.copy_index(index)
}

pub fn op_mindex(engine: &mut Engine) -> Result<(), HintErrorKind> {
    let index = engine.stack.pop_usize()?;
    engine.stack.move_index(index)
}

/// `SANGW`/`AA`: deprecated instructions retained purely so that fonts
/// written against older rasterizers still balance the stack.
pub fn op_pop_noop(engine: &mut Engine) -> Result<(), HintErrorKind> {
    engine.stack.pop().map(|_| ())
}
