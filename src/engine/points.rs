//! Point-movement opcodes: the heart of the interpreter. Every operation
//! here follows a read-then-compute-then-single-mutable-call shape so an
//! instruction can read from one zone (typically `zp0`'s reference point)
//! while mutating another (`zp1`/`zp2`) without fighting the borrow
//! checker — `Zone` accessors return owned `Point` copies for exactly this
//! reason.

use super::Engine;
use crate::error::HintErrorKind;
use crate::fixed::{F26Dot6, Point};
use crate::round::RoundMode;
use crate::zone::PointFlags;

fn zero() -> Point<F26Dot6> {
    Point::new(F26Dot6::ZERO, F26Dot6::ZERO)
}

impl<'a> Engine<'a> {
    /// Moves a point by `delta`, masking it per the backward-compatibility
    /// rules (§4.5/§4.9): the X component never moves while
    /// `backward_compatibility` is set, and the Y component stops moving
    /// once IUP has run on both axes. `touch` controls whether the moved
    /// axes (after masking) get their touch flags set.
    pub(super) fn masked_move(
        &mut self,
        zone: crate::graphics::ZoneSelector,
        index: usize,
        delta: Point<F26Dot6>,
        touch: bool,
    ) -> Result<(), HintErrorKind> {
        let mask_x = self.graphics.backward_compatibility;
        let mask_y = self.graphics.backward_compat_blocks_edit();
        let moved = Point::new(if mask_x { F26Dot6::ZERO } else { delta.x }, if mask_y { F26Dot6::ZERO } else { delta.y });
        self.zone_mut(zone).move_point(index, moved.x, moved.y)?;
        if touch {
            let mut mask = self.graphics.touch_mask();
            if mask_x {
                mask &= !PointFlags::TOUCH_X;
            }
            if mask_y {
                mask &= !PointFlags::TOUCH_Y;
            }
            self.zone_mut(zone).touch(index, mask)?;
        }
        Ok(())
    }

    fn move_and_touch(
        &mut self,
        zone: crate::graphics::ZoneSelector,
        index: usize,
        delta: Point<F26Dot6>,
    ) -> Result<(), HintErrorKind> {
        self.masked_move(zone, index, delta, true)
    }
}

pub fn op_mdap(engine: &mut Engine, round: bool) -> Result<(), HintErrorKind> {
    let p = engine.stack.pop_usize()?;
    let zp0 = engine.graphics.zp0;
    let cur = engine.graphics.project(engine.zone(zp0).point(p)?, zero());
    let distance = if round {
        engine.graphics.round_state.round(cur) - cur
    } else {
        F26Dot6::ZERO
    };
    let movement = engine.graphics.movement(distance);
    engine.move_and_touch(zp0, p, movement)?;
    engine.graphics.rp0 = p;
    engine.graphics.rp1 = p;
    Ok(())
}

pub fn op_miap(engine: &mut Engine, round: bool) -> Result<(), HintErrorKind> {
    let cvt_index = engine.stack.pop_usize()?;
    let p = engine.stack.pop_usize()?;
    let cvt_value = engine.cvt.get(cvt_index);
    let cvt_value = if engine.graphics.is_pedantic { cvt_value? } else { cvt_value.unwrap_or(F26Dot6::ZERO) };

    let zp0 = engine.graphics.zp0;
    if matches!(zp0, crate::graphics::ZoneSelector::Twilight) {
        let fv = engine.graphics.freedom_vector;
        let dx = F26Dot6::from_bits(crate::math::mul14(cvt_value.to_bits(), fv.x));
        let dy = F26Dot6::from_bits(crate::math::mul14(cvt_value.to_bits(), fv.y));
        engine.zone_mut(zp0).set_original(p, Point::new(dx, dy))?;
        engine.zone_mut(zp0).set_point(p, Point::new(dx, dy))?;
    }

    let proj_cur = engine.graphics.project(engine.zone(zp0).point(p)?, zero());
    let mut target = cvt_value;
    if round {
        if (cvt_value - proj_cur).abs() > engine.graphics.control_value_cut_in {
            target = proj_cur;
        }
        target = engine.graphics.round_state.round(target);
    }
    let movement = engine.graphics.movement(target - proj_cur);
    engine.move_and_touch(zp0, p, movement)?;
    engine.graphics.rp0 = p;
    engine.graphics.rp1 = p;
    Ok(())
}

struct MdrpFlags {
    set_rp0: bool,
    min_distance: bool,
    round: bool,
    distance_type: u8,
}

fn decode_flags(bits: u8) -> MdrpFlags {
    MdrpFlags {
        set_rp0: bits & 0x10 != 0,
        min_distance: bits & 0x8 != 0,
        round: bits & 0x4 != 0,
        distance_type: bits & 0x3,
    }
}

fn apply_round_override(engine: &Engine, distance: F26Dot6, flags: &MdrpFlags) -> F26Dot6 {
    if !flags.round {
        return distance;
    }
    match flags.distance_type {
        1 => {
            let mut rs = engine.graphics.round_state;
            rs.mode = RoundMode::Grid;
            rs.round(distance)
        }
        2 => {
            let mut rs = engine.graphics.round_state;
            rs.mode = RoundMode::HalfGrid;
            rs.round(distance)
        }
        3 => {
            let mut rs = engine.graphics.round_state;
            rs.mode = RoundMode::DoubleGrid;
            rs.round(distance)
        }
        _ => engine.graphics.round_state.round(distance),
    }
}

fn apply_min_distance(distance: F26Dot6, min: F26Dot6, enforce: bool) -> F26Dot6 {
    if !enforce {
        return distance;
    }
    if distance >= F26Dot6::ZERO {
        if distance < min {
            min
        } else {
            distance
        }
    } else if distance > -min {
        -min
    } else {
        distance
    }
}

pub fn op_mdrp(engine: &mut Engine, flag_bits: u8) -> Result<(), HintErrorKind> {
    let flags = decode_flags(flag_bits);
    let p = engine.stack.pop_usize()?;
    let zp0 = engine.graphics.zp0;
    let zp1 = engine.graphics.zp1;
    let rp0 = engine.graphics.rp0;

    let org_dist = engine.graphics.dual_project(engine.zone(zp1).original(p)?, engine.zone(zp0).original(rp0)?);
    let mut distance = org_dist;
    if (distance - engine.graphics.single_width_value).abs() < engine.graphics.single_width_cut_in {
        distance = if distance >= F26Dot6::ZERO {
            engine.graphics.single_width_value
        } else {
            -engine.graphics.single_width_value
        };
    }
    distance = apply_round_override(engine, distance, &flags);
    distance = apply_min_distance(distance, engine.graphics.minimum_distance, flags.min_distance);

    let cur_diff = engine.graphics.project(engine.zone(zp1).point(p)?, engine.zone(zp0).point(rp0)?);
    let movement = engine.graphics.movement(distance - cur_diff);
    engine.move_and_touch(zp1, p, movement)?;

    engine.graphics.rp1 = rp0;
    engine.graphics.rp2 = p;
    if flags.set_rp0 {
        engine.graphics.rp0 = p;
    }
    Ok(())
}

pub fn op_mirp(engine: &mut Engine, flag_bits: u8) -> Result<(), HintErrorKind> {
    let flags = decode_flags(flag_bits);
    let cvt_index = engine.stack.pop()?;
    let p = engine.stack.pop_usize()?;
    let zp0 = engine.graphics.zp0;
    let zp1 = engine.graphics.zp1;
    let rp0 = engine.graphics.rp0;

    let mut cvt_value = if cvt_index == -1 {
        F26Dot6::ZERO
    } else {
        let v = engine.cvt.get(cvt_index as usize);
        if engine.graphics.is_pedantic { v? } else { v.unwrap_or(F26Dot6::ZERO) }
    };
    if (cvt_value - engine.graphics.single_width_value).abs() < engine.graphics.single_width_cut_in {
        cvt_value =
            if cvt_value >= F26Dot6::ZERO { engine.graphics.single_width_value } else { -engine.graphics.single_width_value };
    }

    if matches!(zp1, crate::graphics::ZoneSelector::Twilight) {
        let org_rp0 = engine.zone(zp0).original(rp0)?;
        let fv = engine.graphics.freedom_vector;
        let dx = F26Dot6::from_bits(crate::math::mul14(cvt_value.to_bits(), fv.x));
        let dy = F26Dot6::from_bits(crate::math::mul14(cvt_value.to_bits(), fv.y));
        let new_org = org_rp0 + Point::new(dx, dy);
        engine.zone_mut(zp1).set_original(p, new_org)?;
        engine.zone_mut(zp1).set_point(p, new_org)?;
    }

    let org_dist = engine.graphics.dual_project(engine.zone(zp1).original(p)?, engine.zone(zp0).original(rp0)?);
    if engine.graphics.auto_flip && (org_dist.to_bits() < 0) != (cvt_value.to_bits() < 0) {
        cvt_value = -cvt_value;
    }

    let mut distance = if flags.round {
        let mut cvt_value = cvt_value;
        if zp0 == zp1 && (cvt_value - org_dist).abs() > engine.graphics.control_value_cut_in {
            cvt_value = org_dist;
        }
        apply_round_override(engine, cvt_value, &flags)
    } else {
        cvt_value
    };
    distance = apply_min_distance(distance, engine.graphics.minimum_distance, flags.min_distance);

    let cur_diff = engine.graphics.project(engine.zone(zp1).point(p)?, engine.zone(zp0).point(rp0)?);
    let movement = engine.graphics.movement(distance - cur_diff);
    engine.move_and_touch(zp1, p, movement)?;

    engine.graphics.rp1 = rp0;
    engine.graphics.rp2 = p;
    if flags.set_rp0 {
        engine.graphics.rp0 = p;
    }
    Ok(())
}

pub fn op_msirp(engine: &mut Engine, set_rp0: bool) -> Result<(), HintErrorKind> {
    let distance = engine.stack.pop_f26dot6()?;
    let p = engine.stack.pop_usize()?;
    let zp0 = engine.graphics.zp0;
    let zp1 = engine.graphics.zp1;
    let rp0 = engine.graphics.rp0;

    if matches!(zp1, crate::graphics::ZoneSelector::Twilight) {
        let org_rp0 = engine.zone(zp0).original(rp0)?;
        engine.zone_mut(zp1).set_original(p, org_rp0)?;
        engine.zone_mut(zp1).set_point(p, org_rp0)?;
    }

    let cur_diff = engine.graphics.project(engine.zone(zp1).point(p)?, engine.zone(zp0).point(rp0)?);
    let movement = engine.graphics.movement(distance - cur_diff);
    engine.move_and_touch(zp1, p, movement)?;

    engine.graphics.rp1 = rp0;
    engine.graphics.rp2 = p;
    if set_rp0 {
        engine.graphics.rp0 = p;
    }
    Ok(())
}

fn reference_point(engine: &Engine, use_rp1: bool) -> (crate::graphics::ZoneSelector, usize) {
    if use_rp1 {
        (engine.graphics.zp0, engine.graphics.rp1)
    } else {
        (engine.graphics.zp1, engine.graphics.rp2)
    }
}

pub fn op_shp(engine: &mut Engine, use_rp1: bool) -> Result<(), HintErrorKind> {
    let (ref_zone, ref_point) = reference_point(engine, use_rp1);
    let shift = engine.graphics.project(engine.zone(ref_zone).point(ref_point)?, zero())
        - engine.graphics.project(engine.zone(ref_zone).original(ref_point)?, zero());
    let movement = engine.graphics.movement(shift);
    let count = engine.graphics.loop_counter.max(1) as usize;
    for _ in 0..count {
        let p = engine.stack.pop_usize()?;
        let zp2 = engine.graphics.zp2;
        engine.move_and_touch(zp2, p, movement)?;
    }
    engine.graphics.loop_counter = 1;
    Ok(())
}

pub fn op_shc(engine: &mut Engine, use_rp1: bool) -> Result<(), HintErrorKind> {
    let (ref_zone, ref_point) = reference_point(engine, use_rp1);
    let shift = engine.graphics.project(engine.zone(ref_zone).point(ref_point)?, zero())
        - engine.graphics.project(engine.zone(ref_zone).original(ref_point)?, zero());
    let movement = engine.graphics.movement(shift);
    let contour = engine.stack.pop_usize()?;
    let zp2 = engine.graphics.zp2;
    let (start, end) = engine.zone(zp2).contour_range(contour)?;
    for i in start..=end {
        if ref_zone as u8 == zp2 as u8 && i == ref_point {
            continue;
        }
        engine.move_and_touch(zp2, i, movement)?;
    }
    Ok(())
}

pub fn op_shz(engine: &mut Engine, use_rp1: bool) -> Result<(), HintErrorKind> {
    let (ref_zone, ref_point) = reference_point(engine, use_rp1);
    let shift = engine.graphics.project(engine.zone(ref_zone).point(ref_point)?, zero())
        - engine.graphics.project(engine.zone(ref_zone).original(ref_point)?, zero());
    let movement = engine.graphics.movement(shift);
    let zone = crate::graphics::ZoneSelector::from_i32(engine.stack.pop()?)?;
    let len = engine.zone(zone).len();
    for i in 0..len {
        engine.masked_move(zone, i, movement, false)?;
    }
    Ok(())
}

pub fn op_shpix(engine: &mut Engine) -> Result<(), HintErrorKind> {
    let distance = engine.stack.pop_f26dot6()?;
    let fv = engine.graphics.freedom_vector;
    let dx = F26Dot6::from_bits(crate::math::mul14(distance.to_bits(), fv.x));
    let dy = F26Dot6::from_bits(crate::math::mul14(distance.to_bits(), fv.y));
    let count = engine.graphics.loop_counter.max(1) as usize;
    for _ in 0..count {
        let p = engine.stack.pop_usize()?;
        if engine.graphics.backward_compat_blocks_edit() {
            continue;
        }
        let zp2 = engine.graphics.zp2;
        engine.move_and_touch(zp2, p, Point::new(dx, dy))?;
    }
    engine.graphics.loop_counter = 1;
    Ok(())
}

pub fn op_ip(engine: &mut Engine) -> Result<(), HintErrorKind> {
    let zp0 = engine.graphics.zp0;
    let zp1 = engine.graphics.zp1;
    let zp2 = engine.graphics.zp2;
    let rp1 = engine.graphics.rp1;
    let rp2 = engine.graphics.rp2;

    let org_range =
        engine.graphics.dual_project(engine.zone(zp1).original(rp2)?, engine.zone(zp0).original(rp1)?);
    let cur_range = engine.graphics.project(engine.zone(zp1).point(rp2)?, engine.zone(zp0).point(rp1)?);

    let count = engine.graphics.loop_counter.max(1) as usize;
    for _ in 0..count {
        let p = engine.stack.pop_usize()?;
        let org_dist =
            engine.graphics.dual_project(engine.zone(zp2).original(p)?, engine.zone(zp0).original(rp1)?);
        let new_dist = if org_range.to_bits() == 0 {
            org_dist
        } else {
            F26Dot6::from_bits(crate::math::mul_div(org_dist.to_bits(), cur_range.to_bits(), org_range.to_bits()))
        };
        let cur_dist = engine.graphics.project(engine.zone(zp2).point(p)?, engine.zone(zp0).point(rp1)?);
        let movement = engine.graphics.movement(new_dist - cur_dist);
        engine.move_and_touch(zp2, p, movement)?;
    }
    engine.graphics.loop_counter = 1;
    Ok(())
}

pub fn op_alignrp(engine: &mut Engine) -> Result<(), HintErrorKind> {
    let zp0 = engine.graphics.zp0;
    let zp1 = engine.graphics.zp1;
    let rp0 = engine.graphics.rp0;
    let count = engine.graphics.loop_counter.max(1) as usize;
    for _ in 0..count {
        let p = engine.stack.pop_usize()?;
        let diff = engine.graphics.project(engine.zone(zp1).point(p)?, engine.zone(zp0).point(rp0)?);
        let movement = engine.graphics.movement(-diff);
        engine.move_and_touch(zp1, p, movement)?;
    }
    engine.graphics.loop_counter = 1;
    Ok(())
}

pub fn op_alignpts(engine: &mut Engine) -> Result<(), HintErrorKind> {
    let p2 = engine.stack.pop_usize()?;
    let p1 = engine.stack.pop_usize()?;
    let zp0 = engine.graphics.zp0;
    let zp1 = engine.graphics.zp1;
    let diff = engine.graphics.project(engine.zone(zp0).point(p2)?, engine.zone(zp1).point(p1)?);
    let half = F26Dot6::from_bits(diff.to_bits() / 2);
    let m1 = engine.graphics.movement(half);
    let m2 = engine.graphics.movement(-half);
    engine.move_and_touch(zp1, p1, m1)?;
    engine.move_and_touch(zp0, p2, m2)?;
    Ok(())
}

pub fn op_isect(engine: &mut Engine) -> Result<(), HintErrorKind> {
    let p = engine.stack.pop_usize()?;
    let a0 = engine.stack.pop_usize()?;
    let a1 = engine.stack.pop_usize()?;
    let b0 = engine.stack.pop_usize()?;
    let b1 = engine.stack.pop_usize()?;
    let zp0 = engine.graphics.zp0;
    let zp1 = engine.graphics.zp1;
    let zp2 = engine.graphics.zp2;

    let pa0 = engine.zone(zp1).point(a0)?;
    let pa1 = engine.zone(zp1).point(a1)?;
    let pb0 = engine.zone(zp0).point(b0)?;
    let pb1 = engine.zone(zp0).point(b1)?;

    let dax = (pa1.x - pa0.x).to_bits();
    let day = (pa1.y - pa0.y).to_bits();
    let dbx = (pb1.x - pb0.x).to_bits();
    let dby = (pb1.y - pb0.y).to_bits();

    let discriminant = crate::math::mul_div(dax, dby, 0x40) - crate::math::mul_div(day, dbx, 0x40);
    let dot = crate::math::mul_div(dax, dbx, 0x40) + crate::math::mul_div(day, dby, 0x40);

    let result = if discriminant != 0 && discriminant.unsigned_abs() as i64 * 19 > (dot as i64).unsigned_abs() {
        let a_cross = crate::math::mul_div(pa0.x.to_bits(), pa1.y.to_bits(), 0x40)
            - crate::math::mul_div(pa0.y.to_bits(), pa1.x.to_bits(), 0x40);
        let b_cross = crate::math::mul_div(pb0.x.to_bits(), pb1.y.to_bits(), 0x40)
            - crate::math::mul_div(pb0.y.to_bits(), pb1.x.to_bits(), 0x40);
        let x = crate::math::mul_div(a_cross, dbx, discriminant) - crate::math::mul_div(b_cross, dax, discriminant);
        let y = crate::math::mul_div(a_cross, dby, discriminant) - crate::math::mul_div(b_cross, day, discriminant);
        Point::new(F26Dot6::from_bits(x), F26Dot6::from_bits(y))
    } else {
        let sum = pa0 + pa1 + pb0 + pb1;
        Point::new(F26Dot6::from_bits(sum.x.to_bits() / 4), F26Dot6::from_bits(sum.y.to_bits() / 4))
    };

    engine.zone_mut(zp2).set_point(p, result)?;
    engine.zone_mut(zp2).touch(p, PointFlags::TOUCH_BOTH)
}

pub fn op_utp(engine: &mut Engine) -> Result<(), HintErrorKind> {
    let p = engine.stack.pop_usize()?;
    let mask = engine.graphics.touch_mask();
    let zp0 = engine.graphics.zp0;
    engine.zone_mut(zp0).untouch(p, mask)
}

pub fn op_iup(engine: &mut Engine, axis_x: bool) -> Result<(), HintErrorKind> {
    let mask = if axis_x { PointFlags::TOUCH_X } else { PointFlags::TOUCH_Y };
    engine.zone_mut(crate::graphics::ZoneSelector::Glyph).iup(mask, axis_x);
    if axis_x {
        engine.graphics.iup_done_x = true;
    } else {
        engine.graphics.iup_done_y = true;
    }
    Ok(())
}

pub fn op_flippt(engine: &mut Engine) -> Result<(), HintErrorKind> {
    if engine.graphics.backward_compat_blocks_edit() {
        let count = engine.graphics.loop_counter.max(1);
        for _ in 0..count {
            engine.stack.pop()?;
        }
        engine.graphics.loop_counter = 1;
        return Ok(());
    }
    let count = engine.graphics.loop_counter.max(1) as usize;
    let zp0 = engine.graphics.zp0;
    for _ in 0..count {
        let p = engine.stack.pop_usize()?;
        engine.zone_mut(zp0).flip_on_curve(p)?;
    }
    engine.graphics.loop_counter = 1;
    Ok(())
}

pub fn op_fliprgon(engine: &mut Engine, on: bool) -> Result<(), HintErrorKind> {
    let high = engine.stack.pop_usize()?;
    let low = engine.stack.pop_usize()?;
    if engine.graphics.backward_compat_blocks_edit() {
        return Ok(());
    }
    let zp0 = engine.graphics.zp0;
    for p in low..=high {
        engine.zone_mut(zp0).set_on_curve(p, on)?;
    }
    Ok(())
}
