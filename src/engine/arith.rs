//! Arithmetic and rounding opcodes operating purely on the value stack.

use super::Engine;
use crate::error::HintErrorKind;
use crate::math;
use crate::round::compensate;

pub fn op_div(engine: &mut Engine) -> Result<(), HintErrorKind> {
    let b = engine.stack.pop()?;
    let a = engine.stack.pop()?;
    if b == 0 {
        return Err(HintErrorKind::DivideByZero);
    }
    engine.stack.push(math::mul_div_no_round(a, 0x40, b))
}

pub fn op_mul(engine: &mut Engine) -> Result<(), HintErrorKind> {
    let b = engine.stack.pop()?;
    let a = engine.stack.pop()?;
    engine.stack.push(math::mul_div(a, b, 0x40))
}

pub fn op_odd(engine: &mut Engine) -> Result<(), HintErrorKind> {
    let v = engine.stack.pop_f26dot6()?;
    let rounded = engine.graphics.round_state.round(v);
    engine.stack.push(((rounded.to_bits() / 64) % 2 != 0) as i32)
}

pub fn op_even(engine: &mut Engine) -> Result<(), HintErrorKind> {
    let v = engine.stack.pop_f26dot6()?;
    let rounded = engine.graphics.round_state.round(v);
    engine.stack.push(((rounded.to_bits() / 64) % 2 == 0) as i32)
}

/// `ROUND[ab]`/`NROUND[ab]`: rounds (or, for `NROUND`, only compensates
/// without rounding) a 26.6 distance using the current round state. The two
/// low bits of the opcode select an engine/color-layer compensation table
/// this crate doesn't implement, so `compensate` is always the zero hook.
pub fn op_round(engine: &mut Engine, round: bool) -> Result<(), HintErrorKind> {
    let v = engine.stack.pop_f26dot6()?;
    let compensated = v + compensate(v);
    let result = if round { engine.graphics.round_state.round(compensated) } else { compensated };
    engine.stack.push(result.to_bits())
}
