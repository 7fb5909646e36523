//! Point zones: the glyph outline (plus its four phantom points) and the
//! twilight zone of synthesized reference points.
//!
//! Grounded on the teacher's `hint/zone.rs`. Accessors return owned `Point`
//! values rather than references so an operation can read one zone (e.g.
//! `zp0`'s `rp0`) while holding a mutable borrow of another (`zp1`) without
//! fighting the borrow checker — every point-movement op in `engine/`
//! follows a read-then-compute-then-single-mutable-call shape because of
//! this.

use crate::error::HintErrorKind;
use crate::fixed::{F26Dot6, Point};
use crate::math;

/// Per-point flags: on-curve plus independent X/Y touch bits.
#[derive(Copy, Clone, PartialEq, Eq, Debug, Default)]
pub struct PointFlags(u8);

impl PointFlags {
    pub const ON_CURVE: u8 = 0x01;
    pub const TOUCH_X: u8 = 0x02;
    pub const TOUCH_Y: u8 = 0x04;
    pub const TOUCH_BOTH: u8 = Self::TOUCH_X | Self::TOUCH_Y;

    pub fn from_bits(bits: u8) -> Self {
        Self(bits)
    }

    pub fn to_bits(self) -> u8 {
        self.0
    }

    pub fn is_on_curve(self) -> bool {
        self.0 & Self::ON_CURVE != 0
    }

    pub fn set_on_curve(&mut self, on: bool) {
        if on {
            self.0 |= Self::ON_CURVE;
        } else {
            self.0 &= !Self::ON_CURVE;
        }
    }

    pub fn flip_on_curve(&mut self) {
        self.0 ^= Self::ON_CURVE;
    }

    pub fn is_touched(self, mask: u8) -> bool {
        self.0 & mask == mask
    }

    pub fn touch(&mut self, mask: u8) {
        self.0 |= mask;
    }

    pub fn untouch(&mut self, mask: u8) {
        self.0 &= !mask;
    }
}

/// A zone of points: either the glyph outline (plus phantom points) or the
/// twilight zone.
pub struct Zone<'a> {
    original: &'a mut [Point<F26Dot6>],
    unscaled: &'a [Point<i32>],
    current: &'a mut [Point<F26Dot6>],
    flags: &'a mut [PointFlags],
    contours: &'a [u16],
}

impl<'a> Zone<'a> {
    pub fn new(
        original: &'a mut [Point<F26Dot6>],
        unscaled: &'a [Point<i32>],
        current: &'a mut [Point<F26Dot6>],
        flags: &'a mut [PointFlags],
        contours: &'a [u16],
    ) -> Self {
        Self { original, unscaled, current, flags, contours }
    }

    pub fn len(&self) -> usize {
        self.current.len()
    }

    pub fn is_empty(&self) -> bool {
        self.current.len() == 0
    }

    pub fn contour_count(&self) -> usize {
        self.contours.len()
    }

    /// The point range `[start, end]` (inclusive) of contour `index`.
    pub fn contour_range(&self, index: usize) -> Result<(usize, usize), HintErrorKind> {
        let end = *self
            .contours
            .get(index)
            .ok_or(HintErrorKind::InvalidContourIndex(index))? as usize;
        let start = if index == 0 { 0 } else { self.contours[index - 1] as usize + 1 };
        Ok((start, end))
    }

    fn check(&self, index: usize) -> Result<(), HintErrorKind> {
        if index >= self.current.len() {
            Err(HintErrorKind::InvalidPointIndex(index))
        } else {
            Ok(())
        }
    }

    pub fn point(&self, index: usize) -> Result<Point<F26Dot6>, HintErrorKind> {
        self.check(index)?;
        Ok(self.current[index])
    }

    pub fn original(&self, index: usize) -> Result<Point<F26Dot6>, HintErrorKind> {
        self.check(index)?;
        Ok(self.original[index])
    }

    pub fn unscaled(&self, index: usize) -> Result<Point<i32>, HintErrorKind> {
        self.check(index)?;
        self.unscaled.get(index).copied().ok_or(HintErrorKind::InvalidPointIndex(index))
    }

    pub fn flags(&self, index: usize) -> Result<PointFlags, HintErrorKind> {
        self.check(index)?;
        Ok(self.flags[index])
    }

    pub fn set_point(&mut self, index: usize, value: Point<F26Dot6>) -> Result<(), HintErrorKind> {
        self.check(index)?;
        self.current[index] = value;
        Ok(())
    }

    pub fn set_original(&mut self, index: usize, value: Point<F26Dot6>) -> Result<(), HintErrorKind> {
        self.check(index)?;
        self.original[index] = value;
        Ok(())
    }

    pub fn touch(&mut self, index: usize, mask: u8) -> Result<(), HintErrorKind> {
        self.check(index)?;
        self.flags[index].touch(mask);
        Ok(())
    }

    pub fn untouch(&mut self, index: usize, mask: u8) -> Result<(), HintErrorKind> {
        self.check(index)?;
        self.flags[index].untouch(mask);
        Ok(())
    }

    pub fn is_touched(&self, index: usize, mask: u8) -> Result<bool, HintErrorKind> {
        self.check(index)?;
        Ok(self.flags[index].is_touched(mask))
    }

    pub fn set_on_curve(&mut self, index: usize, on: bool) -> Result<(), HintErrorKind> {
        self.check(index)?;
        self.flags[index].set_on_curve(on);
        Ok(())
    }

    pub fn flip_on_curve(&mut self, index: usize) -> Result<(), HintErrorKind> {
        self.check(index)?;
        self.flags[index].flip_on_curve();
        Ok(())
    }

    /// Moves point `index` by `(dx, dy)` in both its original and current
    /// coordinates, as required when synthesizing a twilight point's
    /// position (e.g. `MIAP`/`MIRP` operating on `zp0 == twilight`).
    pub fn move_original(&mut self, index: usize, dx: F26Dot6, dy: F26Dot6) -> Result<(), HintErrorKind> {
        self.check(index)?;
        let delta = Point::new(dx, dy);
        self.original[index] = self.original[index] + delta;
        self.current[index] = self.current[index] + delta;
        Ok(())
    }

    pub fn move_point(&mut self, index: usize, dx: F26Dot6, dy: F26Dot6) -> Result<(), HintErrorKind> {
        self.check(index)?;
        self.current[index] = self.current[index] + Point::new(dx, dy);
        Ok(())
    }

    /// Applies IUP along one axis to every contour in this zone.
    pub fn iup(&mut self, touch_mask: u8, axis_x: bool) {
        for contour in 0..self.contours.len() {
            let (start, end) = match self.contour_range(contour) {
                Ok(range) => range,
                Err(_) => continue,
            };
            self.iup_contour(start, end, touch_mask, axis_x);
        }
    }

    fn axis_org(&self, i: usize, axis_x: bool) -> i32 {
        if axis_x {
            self.unscaled[i].x
        } else {
            self.unscaled[i].y
        }
    }

    fn axis_scaled_org(&self, i: usize, axis_x: bool) -> F26Dot6 {
        if axis_x {
            self.original[i].x
        } else {
            self.original[i].y
        }
    }

    fn axis_cur(&self, i: usize, axis_x: bool) -> F26Dot6 {
        if axis_x {
            self.current[i].x
        } else {
            self.current[i].y
        }
    }

    fn set_axis_cur(&mut self, i: usize, axis_x: bool, value: F26Dot6) {
        if axis_x {
            self.current[i].x = value;
        } else {
            self.current[i].y = value;
        }
    }

    fn iup_contour(&mut self, start: usize, end: usize, touch_mask: u8, axis_x: bool) {
        let len = end - start + 1;
        let is_touched = |flags: &[PointFlags], i: usize| flags[start + i].is_touched(touch_mask);

        let first_touched = (0..len).find(|&i| is_touched(self.flags, i));
        let Some(first_touched) = first_touched else {
            return;
        };

        let touched: TouchedIndices = (0..len).filter(|&i| is_touched(self.flags, i)).collect();
        if touched.len() == 1 {
            let anchor = start + first_touched;
            let delta = self.axis_cur(anchor, axis_x) - self.axis_scaled_org(anchor, axis_x);
            for offset in 0..len {
                let i = start + offset;
                if i == anchor {
                    continue;
                }
                let v = self.axis_scaled_org(i, axis_x) + delta;
                self.set_axis_cur(i, axis_x, v);
            }
            return;
        }

        for pair in 0..touched.len() {
            let a_off = touched[pair];
            let b_off = touched[(pair + 1) % touched.len()];
            if a_off == b_off {
                continue;
            }
            let a = start + a_off;
            let b = start + b_off;
            let run_len = if b_off > a_off { b_off - a_off - 1 } else { (len - a_off - 1) + b_off };
            if run_len == 0 {
                continue;
            }
            for step in 1..=run_len {
                let q_off = (a_off + step) % len;
                let q = start + q_off;
                self.interpolate_one(a, b, q, axis_x);
            }
        }
    }

    fn interpolate_one(&mut self, a: usize, b: usize, q: usize, axis_x: bool) {
        let (lo, hi) = if self.axis_org(a, axis_x) <= self.axis_org(b, axis_x) { (a, b) } else { (b, a) };
        let orus_lo = self.axis_org(lo, axis_x);
        let orus_hi = self.axis_org(hi, axis_x);
        let org_lo = self.axis_scaled_org(lo, axis_x);
        let org_hi = self.axis_scaled_org(hi, axis_x);
        let cur_lo = self.axis_cur(lo, axis_x);
        let cur_hi = self.axis_cur(hi, axis_x);
        let orus_q = self.axis_org(q, axis_x);

        let new_value = if cur_lo == cur_hi || orus_lo == orus_hi {
            if orus_q < orus_lo {
                org_lo + (cur_lo - org_lo)
            } else if orus_q > orus_hi {
                org_hi + (cur_hi - org_hi)
            } else {
                cur_lo
            }
        } else if orus_q <= orus_lo {
            cur_lo + (self.axis_scaled_org(q, axis_x) - org_lo)
        } else if orus_q >= orus_hi {
            cur_hi + (self.axis_scaled_org(q, axis_x) - org_hi)
        } else {
            let num = orus_q - orus_lo;
            let den = orus_hi - orus_lo;
            let span = (cur_hi - cur_lo).to_bits();
            let scaled = math::mul_div(num, span, den);
            F26Dot6::from_bits(cur_lo.to_bits() + scaled)
        };
        self.set_axis_cur(q, axis_x, new_value);
    }
}

#[cfg(feature = "std")]
type TouchedIndices = std::vec::Vec<usize>;
#[cfg(not(feature = "std"))]
use heapless_touched::TouchedIndices;

#[cfg(not(feature = "std"))]
mod heapless_touched {
    // `no_std` builds still need a bounded scratch buffer for the indices
    // touched along one axis of one contour; a glyph contour practically
    // never exceeds a few hundred points.
    pub const MAX_CONTOUR_POINTS: usize = 4096;

    pub struct TouchedIndices {
        buf: [usize; MAX_CONTOUR_POINTS],
        len: usize,
    }

    impl TouchedIndices {
        pub fn len(&self) -> usize {
            self.len
        }
    }

    impl core::ops::Index<usize> for TouchedIndices {
        type Output = usize;
        fn index(&self, i: usize) -> &usize {
            &self.buf[i]
        }
    }

    impl FromIterator<usize> for TouchedIndices {
        fn from_iter<I: IntoIterator<Item = usize>>(iter: I) -> Self {
            let mut buf = [0usize; MAX_CONTOUR_POINTS];
            let mut len = 0;
            for (i, v) in iter.into_iter().enumerate() {
                if i >= MAX_CONTOUR_POINTS {
                    break;
                }
                buf[i] = v;
                len = i + 1;
            }
            Self { buf, len }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_zone<'a>(
        original: &'a mut [Point<F26Dot6>],
        unscaled: &'a [Point<i32>],
        current: &'a mut [Point<F26Dot6>],
        flags: &'a mut [PointFlags],
        contours: &'a [u16],
    ) -> Zone<'a> {
        Zone::new(original, unscaled, current, flags, contours)
    }

    #[test]
    fn single_anchor_shifts_whole_contour() {
        let mut original = [Point::new(F26Dot6::from_bits(0), F26Dot6::ZERO); 3];
        let unscaled = [Point::new(0, 0), Point::new(10, 0), Point::new(20, 0)];
        let mut current = original;
        current[0].x = F26Dot6::from_bits(64); // touched anchor moved by +1px
        let mut flags = [PointFlags::default(); 3];
        flags[0].touch(PointFlags::TOUCH_X);
        let contours = [2u16];
        let mut zone = make_zone(&mut original, &unscaled, &mut current, &mut flags, &contours);
        zone.iup(PointFlags::TOUCH_X, true);
        assert_eq!(zone.point(1).unwrap().x, F26Dot6::from_bits(64));
        assert_eq!(zone.point(2).unwrap().x, F26Dot6::from_bits(64));
    }

    #[test]
    fn two_anchors_interpolate_proportionally() {
        let mut original = [Point::new(F26Dot6::ZERO, F26Dot6::ZERO); 3];
        let unscaled = [Point::new(0, 0), Point::new(10, 0), Point::new(20, 0)];
        let mut current = original;
        current[0].x = F26Dot6::from_bits(0);
        current[2].x = F26Dot6::from_bits(128); // endpoint moved to 2px
        let mut flags = [PointFlags::default(); 3];
        flags[0].touch(PointFlags::TOUCH_X);
        flags[2].touch(PointFlags::TOUCH_X);
        let contours = [2u16];
        let mut zone = make_zone(&mut original, &unscaled, &mut current, &mut flags, &contours);
        zone.iup(PointFlags::TOUCH_X, true);
        // midpoint in font units -> halfway between 0 and 128
        assert_eq!(zone.point(1).unwrap().x, F26Dot6::from_bits(64));
    }
}
