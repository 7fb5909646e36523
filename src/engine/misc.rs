//! CVT/storage access, point-coordinate queries, distance, and the
//! environment-inspection opcodes (`MPPEM`, `MPS`, `GETINFO`, ...).

use super::Engine;
use crate::error::HintErrorKind;
use crate::fixed::F26Dot6;

pub fn op_wcvtp(engine: &mut Engine) -> Result<(), HintErrorKind> {
    let value = engine.stack.pop_f26dot6()?;
    let location = engine.stack.pop_usize()?;
    let result = engine.cvt.set(location, value);
    if engine.graphics.is_pedantic {
        result
    } else {
        Ok(())
    }
}

pub fn op_wcvtf(engine: &mut Engine) -> Result<(), HintErrorKind> {
    let value = engine.stack.pop()?;
    let location = engine.stack.pop_usize()?;
    let scaled = F26Dot6::from_bits(crate::math::mul(value, engine.graphics.scale));
    let result = engine.cvt.set(location, scaled);
    if engine.graphics.is_pedantic {
        result
    } else {
        Ok(())
    }
}

pub fn op_rcvt(engine: &mut Engine) -> Result<(), HintErrorKind> {
    let location = engine.stack.pop_usize()?;
    let value = engine.cvt.get(location);
    let value = if engine.graphics.is_pedantic { value? } else { value.unwrap_or(F26Dot6::ZERO) };
    engine.stack.push(value.to_bits())
}

pub fn op_ws(engine: &mut Engine) -> Result<(), HintErrorKind> {
    let value = engine.stack.pop()?;
    let location = engine.stack.pop_usize()?;
    let result = engine.storage.set(location, value);
    if engine.graphics.is_pedantic {
        result
    } else {
        Ok(())
    }
}

pub fn op_rs(engine: &mut Engine) -> Result<(), HintErrorKind> {
    let location = engine.stack.pop_usize()?;
    let value = engine.storage.get(location);
    let value = if engine.graphics.is_pedantic { value? } else { value.unwrap_or(0) };
    engine.stack.push(value)
}

/// `GC[cur]`/`GC[orig]`: pushes a point's projected coordinate.
pub fn op_gc(engine: &mut Engine, current: bool) -> Result<(), HintErrorKind> {
    let p = engine.stack.pop_usize()?;
    let zero = crate::fixed::Point::new(F26Dot6::ZERO, F26Dot6::ZERO);
    let value = if current {
        engine.graphics.project(engine.zp2().point(p)?, zero)
    } else {
        engine.graphics.dual_project(engine.zp2().original(p)?, zero)
    };
    engine.stack.push(value.to_bits())
}

/// `SCFS`: moves a point so its current projected coordinate equals the
/// popped value (used by composite glyphs to place phantom points).
pub fn op_scfs(engine: &mut Engine) -> Result<(), HintErrorKind> {
    let value = F26Dot6::from_bits(engine.stack.pop()?);
    let p = engine.stack.pop_usize()?;
    let zero = crate::fixed::Point::new(F26Dot6::ZERO, F26Dot6::ZERO);
    let current_projection = engine.graphics.project(engine.zp2().point(p)?, zero);
    let delta = engine.graphics.movement(value - current_projection);
    let zp2 = engine.graphics.zp2;
    engine.zone_mut(zp2).move_point(p, delta.x, delta.y)?;
    let mask = engine.graphics.touch_mask();
    engine.zone_mut(zp2).touch(p, mask)
}

/// `MD[grid]`/`MD[orig]`: pushes the distance between two popped points.
pub fn op_md(engine: &mut Engine, grid_fitted: bool) -> Result<(), HintErrorKind> {
    let p2 = engine.stack.pop_usize()?;
    let p1 = engine.stack.pop_usize()?;
    let value = if grid_fitted {
        engine.graphics.project(engine.zp0().point(p2)?, engine.zp1().point(p1)?)
    } else {
        engine.graphics.dual_project(engine.zp0().original(p2)?, engine.zp1().original(p1)?)
    };
    engine.stack.push(value.to_bits())
}

pub fn op_mppem(engine: &mut Engine) -> Result<(), HintErrorKind> {
    engine.stack.push(engine.graphics.ppem)
}

pub fn op_mps(engine: &mut Engine) -> Result<(), HintErrorKind> {
    engine.stack.push(engine.graphics.point_size)
}

/// Reports interpreter version 40 (see the crate's design notes for why
/// this departs from a newer FreeType lineage's literal value), plus the
/// subpixel-rendering flags gated by whether the host is rendering smooth
/// (anti-aliased / subpixel) output at all.
pub fn op_getinfo(engine: &mut Engine) -> Result<(), HintErrorKind> {
    let selector = engine.stack.pop()?;
    let mut result = 0i32;
    if selector & 0x1 != 0 {
        result |= 40;
    }
    if selector & 0x20 != 0 && engine.graphics.retained().is_smooth {
        result |= 1 << 9; // ClearType-class subpixel rendering
        result |= 1 << 12; // symmetric smoothing
    }
    if selector & 0x40 != 0 && engine.graphics.retained().is_smooth {
        result |= 1 << 10; // vertical LCD subpixel layout
    }
    engine.stack.push(result)
}

/// Variable-font axis inspection. This crate doesn't interpret `fvar`/`avar`
/// deltas, so it always reports zero variation axes.
pub fn op_getvariation(engine: &mut Engine) -> Result<(), HintErrorKind> {
    let _selector = engine.stack.pop()?;
    engine.stack.push(0)
}
