//! `DELTAP{1,2,3}`/`DELTAC{1,2,3}`: ppem-conditional point and CVT nudges.

use super::Engine;
use crate::error::HintErrorKind;
use crate::fixed::F26Dot6;

/// Decodes one `(arg, target)` pair's ppem-offset and signed step, returning
/// `Some(delta)` if it applies at the engine's current ppem.
fn decode_delta(engine: &Engine, arg: i32, range_offset: i32) -> Option<F26Dot6> {
    let high_nibble = (arg >> 4) & 0xF;
    let low_nibble = arg & 0xF;
    let target_ppem = high_nibble + engine.graphics.delta_base + range_offset;
    if target_ppem != engine.graphics.ppem {
        return None;
    }
    let step = if low_nibble < 8 { low_nibble - 8 } else { low_nibble - 7 };
    let shift = 6 - engine.graphics.delta_shift;
    let magnitude = if shift >= 0 { step << shift } else { step >> -shift };
    Some(F26Dot6::from_bits(magnitude))
}

pub fn op_deltap(engine: &mut Engine, range_offset: i32) -> Result<(), HintErrorKind> {
    let count = engine.stack.pop_count_checked()?;
    for _ in 0..count {
        let point = engine.stack.pop_usize()?;
        let arg = engine.stack.pop()?;
        if let Some(delta) = decode_delta(engine, arg, range_offset) {
            if engine.graphics.backward_compat_blocks_edit() {
                continue;
            }
            let movement = engine.graphics.movement(delta);
            let zp0 = engine.graphics.zp0;
            engine.zone_mut(zp0).move_point(point, movement.x, movement.y)?;
            let mask = engine.graphics.touch_mask();
            engine.zone_mut(zp0).touch(point, mask)?;
        }
    }
    Ok(())
}

pub fn op_deltac(engine: &mut Engine, range_offset: i32) -> Result<(), HintErrorKind> {
    let count = engine.stack.pop_count_checked()?;
    for _ in 0..count {
        let index = engine.stack.pop_usize()?;
        let arg = engine.stack.pop()?;
        if let Some(delta) = decode_delta(engine, arg, range_offset) {
            let current = engine.cvt.get(index);
            let current = if engine.graphics.is_pedantic { current? } else { current.unwrap_or(F26Dot6::ZERO) };
            let result = engine.cvt.set(index, current + delta);
            if engine.graphics.is_pedantic {
                result?;
            }
        }
    }
    Ok(())
}
