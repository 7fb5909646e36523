//! Graphics-state opcodes: vectors, reference points, zone pointers,
//! rounding mode, and the scalar cut-in/width/delta/scan knobs.

use super::Engine;
use crate::error::HintErrorKind;
use crate::fixed::Point;
use crate::graphics::ZoneSelector;
use crate::math::normalize14;
use crate::round::RoundMode;

const ONE14: i32 = 0x4000;

fn rotate_ccw(v: Point<i32>, perp: bool) -> Point<i32> {
    if perp {
        Point::new(-v.y, v.x)
    } else {
        v
    }
}

pub fn op_svtca(engine: &mut Engine, is_y: bool) -> Result<(), HintErrorKind> {
    let v = if is_y { Point::new(0, ONE14) } else { Point::new(ONE14, 0) };
    engine.graphics.proj_vector = v;
    engine.graphics.dual_proj_vector = v;
    engine.graphics.freedom_vector = v;
    engine.graphics.update_projection_state();
    Ok(())
}

pub fn op_spvtca(engine: &mut Engine, is_y: bool) -> Result<(), HintErrorKind> {
    let v = if is_y { Point::new(0, ONE14) } else { Point::new(ONE14, 0) };
    engine.graphics.proj_vector = v;
    engine.graphics.dual_proj_vector = v;
    engine.graphics.update_projection_state();
    Ok(())
}

pub fn op_sfvtca(engine: &mut Engine, is_y: bool) -> Result<(), HintErrorKind> {
    let v = if is_y { Point::new(0, ONE14) } else { Point::new(ONE14, 0) };
    engine.graphics.freedom_vector = v;
    engine.graphics.update_projection_state();
    Ok(())
}

fn line_vector(engine: &mut Engine, perp: bool) -> Result<(Point<i32>, Point<i32>), HintErrorKind> {
    let p2 = engine.stack.pop_usize()?;
    let p1 = engine.stack.pop_usize()?;
    let point1 = engine.zp1().point(p1)?;
    let point2 = engine.zp2().point(p2)?;
    let cur = normalize14((point2.x - point1.x).to_bits(), (point2.y - point1.y).to_bits());
    let orig1 = engine.zp1().original(p1)?;
    let orig2 = engine.zp2().original(p2)?;
    let dual = normalize14((orig2.x - orig1.x).to_bits(), (orig2.y - orig1.y).to_bits());
    Ok((rotate_ccw(cur, perp), rotate_ccw(dual, perp)))
}

pub fn op_spvtl(engine: &mut Engine, perp: bool) -> Result<(), HintErrorKind> {
    let (cur, dual) = line_vector(engine, perp)?;
    engine.graphics.proj_vector = cur;
    engine.graphics.dual_proj_vector = dual;
    engine.graphics.update_projection_state();
    Ok(())
}

pub fn op_sfvtl(engine: &mut Engine, perp: bool) -> Result<(), HintErrorKind> {
    let (cur, _dual) = line_vector(engine, perp)?;
    engine.graphics.freedom_vector = cur;
    engine.graphics.update_projection_state();
    Ok(())
}

pub fn op_sdpvtl(engine: &mut Engine, perp: bool) -> Result<(), HintErrorKind> {
    let (cur, dual) = line_vector(engine, perp)?;
    engine.graphics.proj_vector = cur;
    engine.graphics.dual_proj_vector = dual;
    engine.graphics.update_projection_state();
    Ok(())
}

pub fn op_spvfs(engine: &mut Engine) -> Result<(), HintErrorKind> {
    let y = engine.stack.pop()?;
    let x = engine.stack.pop()?;
    let v = normalize14(x, y);
    engine.graphics.proj_vector = v;
    engine.graphics.dual_proj_vector = v;
    engine.graphics.update_projection_state();
    Ok(())
}

pub fn op_sfvfs(engine: &mut Engine) -> Result<(), HintErrorKind> {
    let y = engine.stack.pop()?;
    let x = engine.stack.pop()?;
    engine.graphics.freedom_vector = normalize14(x, y);
    engine.graphics.update_projection_state();
    Ok(())
}

pub fn op_gpv(engine: &mut Engine) -> Result<(), HintErrorKind> {
    engine.stack.push(engine.graphics.proj_vector.x)?;
    engine.stack.push(engine.graphics.proj_vector.y)
}

pub fn op_gfv(engine: &mut Engine) -> Result<(), HintErrorKind> {
    engine.stack.push(engine.graphics.freedom_vector.x)?;
    engine.stack.push(engine.graphics.freedom_vector.y)
}

pub fn op_sfvtpv(engine: &mut Engine) -> Result<(), HintErrorKind> {
    engine.graphics.freedom_vector = engine.graphics.proj_vector;
    engine.graphics.update_projection_state();
    Ok(())
}

pub fn op_srp0(engine: &mut Engine) -> Result<(), HintErrorKind> {
    engine.graphics.rp0 = engine.stack.pop_usize()?;
    Ok(())
}

pub fn op_srp1(engine: &mut Engine) -> Result<(), HintErrorKind> {
    engine.graphics.rp1 = engine.stack.pop_usize()?;
    Ok(())
}

pub fn op_srp2(engine: &mut Engine) -> Result<(), HintErrorKind> {
    engine.graphics.rp2 = engine.stack.pop_usize()?;
    Ok(())
}

fn pop_zone(engine: &mut Engine) -> Result<ZoneSelector, HintErrorKind> {
    let value = engine.stack.pop()?;
    ZoneSelector::from_i32(value)
}

pub fn op_szp0(engine: &mut Engine) -> Result<(), HintErrorKind> {
    engine.graphics.zp0 = pop_zone(engine)?;
    Ok(())
}

pub fn op_szp1(engine: &mut Engine) -> Result<(), HintErrorKind> {
    engine.graphics.zp1 = pop_zone(engine)?;
    Ok(())
}

pub fn op_szp2(engine: &mut Engine) -> Result<(), HintErrorKind> {
    engine.graphics.zp2 = pop_zone(engine)?;
    Ok(())
}

pub fn op_szps(engine: &mut Engine) -> Result<(), HintErrorKind> {
    let zone = pop_zone(engine)?;
    engine.graphics.zp0 = zone;
    engine.graphics.zp1 = zone;
    engine.graphics.zp2 = zone;
    Ok(())
}

pub fn op_sloop(engine: &mut Engine) -> Result<(), HintErrorKind> {
    let value = engine.stack.pop()?;
    if value < 0 {
        return Err(HintErrorKind::NegativeLoopCounter);
    }
    engine.graphics.loop_counter = value;
    Ok(())
}

pub fn op_rtg(engine: &mut Engine) -> Result<(), HintErrorKind> {
    engine.graphics.round_state.mode = RoundMode::Grid;
    Ok(())
}

pub fn op_rthg(engine: &mut Engine) -> Result<(), HintErrorKind> {
    engine.graphics.round_state.mode = RoundMode::HalfGrid;
    Ok(())
}

pub fn op_rtdg(engine: &mut Engine) -> Result<(), HintErrorKind> {
    engine.graphics.round_state.mode = RoundMode::DoubleGrid;
    Ok(())
}

pub fn op_rdtg(engine: &mut Engine) -> Result<(), HintErrorKind> {
    engine.graphics.round_state.mode = RoundMode::DownToGrid;
    Ok(())
}

pub fn op_rutg(engine: &mut Engine) -> Result<(), HintErrorKind> {
    engine.graphics.round_state.mode = RoundMode::UpToGrid;
    Ok(())
}

pub fn op_roff(engine: &mut Engine) -> Result<(), HintErrorKind> {
    engine.graphics.round_state.mode = RoundMode::Off;
    Ok(())
}

pub fn op_sround(engine: &mut Engine, is_45: bool) -> Result<(), HintErrorKind> {
    let selector = engine.stack.pop()?;
    engine.graphics.round_state.set_super_round(selector, is_45);
    Ok(())
}

pub fn op_smd(engine: &mut Engine) -> Result<(), HintErrorKind> {
    engine.graphics.minimum_distance = engine.stack.pop_f26dot6()?;
    Ok(())
}

pub fn op_scvtci(engine: &mut Engine) -> Result<(), HintErrorKind> {
    engine.graphics.control_value_cut_in = engine.stack.pop_f26dot6()?;
    Ok(())
}

pub fn op_sswci(engine: &mut Engine) -> Result<(), HintErrorKind> {
    engine.graphics.single_width_cut_in = engine.stack.pop_f26dot6()?;
    Ok(())
}

pub fn op_ssw(engine: &mut Engine) -> Result<(), HintErrorKind> {
    engine.graphics.single_width_value = engine.stack.pop_f26dot6()?;
    Ok(())
}

pub fn op_flipon(engine: &mut Engine) -> Result<(), HintErrorKind> {
    engine.graphics.auto_flip = true;
    Ok(())
}

pub fn op_flipoff(engine: &mut Engine) -> Result<(), HintErrorKind> {
    engine.graphics.auto_flip = false;
    Ok(())
}

pub fn op_sdb(engine: &mut Engine) -> Result<(), HintErrorKind> {
    engine.graphics.delta_base = engine.stack.pop()?;
    Ok(())
}

pub fn op_sds(engine: &mut Engine) -> Result<(), HintErrorKind> {
    engine.graphics.delta_shift = engine.stack.pop()?;
    Ok(())
}

pub fn op_scanctrl(engine: &mut Engine) -> Result<(), HintErrorKind> {
    engine.graphics.scan_control = engine.stack.pop()?;
    Ok(())
}

pub fn op_scantype(engine: &mut Engine) -> Result<(), HintErrorKind> {
    engine.graphics.scan_type = engine.stack.pop()?;
    Ok(())
}

pub fn op_instctrl(engine: &mut Engine) -> Result<(), HintErrorKind> {
    let value = engine.stack.pop()?;
    let selector = engine.stack.pop()?;
    let bit = match selector {
        1 => 0x1,
        2 => 0x2,
        3 => 0x4,
        _ => return Ok(()),
    };
    let control = &mut engine.graphics.retained_mut().instruct_control;
    if value != 0 {
        *control |= bit;
    } else {
        *control &= !bit;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::definition::DefinitionMap;
    use crate::graphics::{GraphicsState, RetainedGraphicsState};
    use crate::program::{Program, ProgramState};
    use crate::value_stack::ValueStack;
    use crate::zone::{PointFlags, Zone};

    fn test_engine<'a>(
        values: &'a mut [i32],
        font: &'a [u8],
        funcs: &'a mut [crate::definition::Definition],
        instrs: &'a mut [crate::definition::Definition],
        twilight_org: &'a mut [Point<crate::fixed::F26Dot6>],
        twilight_cur: &'a mut [Point<crate::fixed::F26Dot6>],
        twilight_flags: &'a mut [PointFlags],
        glyph_org: &'a mut [Point<crate::fixed::F26Dot6>],
        glyph_unscaled: &'a [Point<i32>],
        glyph_cur: &'a mut [Point<crate::fixed::F26Dot6>],
        glyph_flags: &'a mut [PointFlags],
        glyph_contours: &'a [u16],
        cvt_data: &'a mut [i32],
        storage_data: &'a mut [i32],
    ) -> Engine<'a> {
        let twilight = Zone::new(twilight_org, &[], twilight_cur, twilight_flags, &[]);
        let glyph = Zone::new(glyph_org, glyph_unscaled, glyph_cur, glyph_flags, glyph_contours);
        let program = ProgramState::new(font, &[], &[], Program::Font);
        let stack = ValueStack::new(values, false);
        let cvt_scratch: &mut [i32] = cvt_data;
        let cvt = crate::cow_slice::CowSlice::new_mut(cvt_scratch).into();
        let storage = crate::cow_slice::CowSlice::new_mut(storage_data).into();
        Engine::new(
            GraphicsState::new(RetainedGraphicsState::default()),
            twilight,
            glyph,
            program,
            stack,
            cvt,
            storage,
            DefinitionMap::Mut(funcs),
            DefinitionMap::Mut(instrs),
            super::super::LoopBudget::new_for_font(0),
        )
    }

    #[test]
    fn svtca_sets_both_axes() {
        let mut values = [0i32; 8];
        let font = [];
        let mut funcs = [];
        let mut instrs = [];
        let mut t_org = [];
        let mut t_cur = [];
        let mut t_flags = [];
        let mut g_org = [Point::new(crate::fixed::F26Dot6::ZERO, crate::fixed::F26Dot6::ZERO); 1];
        let g_unscaled = [Point::new(0, 0)];
        let mut g_cur = g_org;
        let mut g_flags = [PointFlags::default(); 1];
        let g_contours = [0u16];
        let mut cvt = [];
        let mut storage = [];
        let mut engine = test_engine(
            &mut values, &font, &mut funcs, &mut instrs, &mut t_org, &mut t_cur, &mut t_flags, &mut g_org,
            &g_unscaled, &mut g_cur, &mut g_flags, &g_contours, &mut cvt, &mut storage,
        );
        op_svtca(&mut engine, true).unwrap();
        assert_eq!(engine.graphics.freedom_vector, Point::new(0, ONE14));
        assert_eq!(engine.graphics.proj_vector, Point::new(0, ONE14));
    }
}
