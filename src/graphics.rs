//! The graphics state: projection/freedom vectors, reference points, zone
//! pointers, rounding state, and the handful of scalar knobs (cut-ins,
//! single-width, delta base/shift, scan flags) bytecode can dial.
//!
//! Grounded on the teacher's `hint/graphics_state.rs` and `projection.rs`.
//! Split into a `RetainedGraphicsState` (persists across glyphs within one
//! ppem/variation instance, snapshotted after `prep` runs) and the
//! full `GraphicsState` (rebuilt from the retained snapshot before every
//! glyph), matching the teacher's split between per-instance and per-call
//! state.

use crate::error::HintErrorKind;
use crate::fixed::{F26Dot6, Point};
use crate::math;
use crate::round::RoundState;

/// Which axis a vector happens to be aligned to, cached so dot-product-heavy
/// point movement can take the cheap path.
#[derive(Copy, Clone, PartialEq, Eq, Debug, Default)]
pub enum CoordAxis {
    #[default]
    Both,
    X,
    Y,
}

/// Which of the two zones (twilight or glyph) a zone pointer currently
/// selects.
#[derive(Copy, Clone, PartialEq, Eq, Debug, Default)]
pub enum ZoneSelector {
    Twilight,
    #[default]
    Glyph,
}

impl ZoneSelector {
    pub fn from_i32(value: i32) -> Result<Self, HintErrorKind> {
        match value {
            0 => Ok(Self::Twilight),
            1 => Ok(Self::Glyph),
            _ => Err(HintErrorKind::InvalidZoneIndex(value)),
        }
    }

    pub fn to_i32(self) -> i32 {
        match self {
            Self::Twilight => 0,
            Self::Glyph => 1,
        }
    }
}

/// State that survives across every glyph hinted at a given point size:
/// populated by running the font and control-value programs once, then
/// snapshotted as the baseline every glyph program starts from.
#[derive(Copy, Clone, Debug)]
pub struct RetainedGraphicsState {
    pub scale: i32,
    pub ppem: i32,
    pub point_size: i32,
    pub instruct_control: u8,
    pub is_smooth: bool,
    pub preserve_linear_metrics: bool,
}

impl Default for RetainedGraphicsState {
    fn default() -> Self {
        Self {
            scale: 0x1_0000,
            ppem: 0,
            point_size: 0,
            instruct_control: 0,
            is_smooth: true,
            preserve_linear_metrics: false,
        }
    }
}

/// Full per-execution graphics state. Dereferences to the retained state so
/// callers can read `scale`/`ppem`/etc. without reaching through a field.
pub struct GraphicsState {
    retained: RetainedGraphicsState,

    pub proj_vector: Point<i32>,
    pub freedom_vector: Point<i32>,
    pub dual_proj_vector: Point<i32>,
    pub proj_axis: CoordAxis,
    pub dual_proj_axis: CoordAxis,
    pub freedom_axis: CoordAxis,
    pub fdotp: i32,

    pub rp0: usize,
    pub rp1: usize,
    pub rp2: usize,
    pub zp0: ZoneSelector,
    pub zp1: ZoneSelector,
    pub zp2: ZoneSelector,

    pub round_state: RoundState,
    pub minimum_distance: F26Dot6,
    pub control_value_cut_in: F26Dot6,
    pub single_width_cut_in: F26Dot6,
    pub single_width_value: F26Dot6,
    pub delta_base: i32,
    pub delta_shift: i32,
    pub auto_flip: bool,
    pub scan_control: i32,
    pub scan_type: i32,
    pub loop_counter: i32,

    pub is_pedantic: bool,
    pub backward_compatibility: bool,
    pub iup_done_x: bool,
    pub iup_done_y: bool,
}

const ONE14: i32 = 0x4000;

impl GraphicsState {
    pub fn new(retained: RetainedGraphicsState) -> Self {
        let mut gs = Self {
            retained,
            proj_vector: Point::new(ONE14, 0),
            freedom_vector: Point::new(ONE14, 0),
            dual_proj_vector: Point::new(ONE14, 0),
            proj_axis: CoordAxis::X,
            dual_proj_axis: CoordAxis::X,
            freedom_axis: CoordAxis::X,
            fdotp: ONE14,
            rp0: 0,
            rp1: 0,
            rp2: 0,
            zp0: ZoneSelector::Glyph,
            zp1: ZoneSelector::Glyph,
            zp2: ZoneSelector::Glyph,
            round_state: RoundState::default(),
            minimum_distance: F26Dot6::from_bits(64),
            // 17/16px, the TrueType-spec default.
            control_value_cut_in: F26Dot6::from_bits(68),
            single_width_cut_in: F26Dot6::ZERO,
            single_width_value: F26Dot6::ZERO,
            delta_base: 9,
            delta_shift: 3,
            auto_flip: true,
            scan_control: 0,
            scan_type: 0,
            loop_counter: 1,
            is_pedantic: false,
            backward_compatibility: false,
            iup_done_x: false,
            iup_done_y: false,
        };
        gs
    }

    /// Whether backward-compatibility mode should suppress a post-IUP point
    /// edit (the `SHPIX`/`DELTAP*`/`FLIPPT` family): once IUP has smoothed
    /// both axes, letting those opcodes move a point again would undo it.
    pub fn backward_compat_blocks_edit(&self) -> bool {
        self.backward_compatibility && self.iup_done_x && self.iup_done_y
    }

    pub fn reset(&mut self) {
        let retained = self.retained;
        let is_pedantic = self.is_pedantic;
        *self = Self::new(retained);
        self.is_pedantic = is_pedantic;
    }

    pub fn retained(&self) -> &RetainedGraphicsState {
        &self.retained
    }

    pub fn retained_mut(&mut self) -> &mut RetainedGraphicsState {
        &mut self.retained
    }

    /// Recomputes `fdotp` and the axis caches after `proj_vector` or
    /// `freedom_vector` changes.
    pub fn update_projection_state(&mut self) {
        self.proj_axis = axis_of(self.proj_vector);
        self.dual_proj_axis = axis_of(self.dual_proj_vector);
        self.freedom_axis = axis_of(self.freedom_vector);

        let mut fdotp = if self.freedom_vector.x == ONE14 {
            self.proj_vector.x
        } else if self.freedom_vector.y == ONE14 {
            self.proj_vector.y
        } else {
            math::dot14(
                self.freedom_vector.x,
                self.freedom_vector.y,
                self.proj_vector.x,
                self.proj_vector.y,
            )
        };
        if fdotp.abs() < 0x400 {
            fdotp = ONE14;
        }
        self.fdotp = fdotp;
    }

    pub fn project(&self, v1: Point<F26Dot6>, v2: Point<F26Dot6>) -> F26Dot6 {
        match self.proj_axis {
            CoordAxis::X => v1.x - v2.x,
            CoordAxis::Y => v1.y - v2.y,
            CoordAxis::Both => {
                let dx = (v1.x - v2.x).to_bits();
                let dy = (v1.y - v2.y).to_bits();
                F26Dot6::from_bits(math::dot14(dx, dy, self.proj_vector.x, self.proj_vector.y))
            }
        }
    }

    pub fn dual_project(&self, v1: Point<F26Dot6>, v2: Point<F26Dot6>) -> F26Dot6 {
        match self.dual_proj_axis {
            CoordAxis::X => v1.x - v2.x,
            CoordAxis::Y => v1.y - v2.y,
            CoordAxis::Both => {
                let dx = (v1.x - v2.x).to_bits();
                let dy = (v1.y - v2.y).to_bits();
                F26Dot6::from_bits(math::dot14(dx, dy, self.dual_proj_vector.x, self.dual_proj_vector.y))
            }
        }
    }

    pub fn dual_project_unscaled(&self, v1: Point<i32>, v2: Point<i32>) -> i32 {
        match self.dual_proj_axis {
            CoordAxis::X => v1.x - v2.x,
            CoordAxis::Y => v1.y - v2.y,
            CoordAxis::Both => math::dot14(v1.x - v2.x, v1.y - v2.y, self.dual_proj_vector.x, self.dual_proj_vector.y),
        }
    }

    /// The universal point-movement primitive. Moving by `distance` along
    /// the freedom vector, scaled so that the projection of the move onto
    /// the projection vector equals `distance`.
    pub fn movement(&self, distance: F26Dot6) -> Point<F26Dot6> {
        let distance = distance.to_bits();
        if self.fdotp == 0 {
            return Point::new(F26Dot6::ZERO, F26Dot6::ZERO);
        }
        let dx = match self.freedom_axis {
            CoordAxis::Y => 0,
            _ => math::mul_div(distance, self.freedom_vector.x, self.fdotp),
        };
        let dy = match self.freedom_axis {
            CoordAxis::X => 0,
            _ => math::mul_div(distance, self.freedom_vector.y, self.fdotp),
        };
        Point::new(F26Dot6::from_bits(dx), F26Dot6::from_bits(dy))
    }

    pub fn touch_mask(&self) -> u8 {
        use crate::zone::PointFlags;
        let mut mask = 0;
        if self.freedom_vector.x != 0 {
            mask |= PointFlags::TOUCH_X;
        }
        if self.freedom_vector.y != 0 {
            mask |= PointFlags::TOUCH_Y;
        }
        mask
    }
}

impl core::ops::Deref for GraphicsState {
    type Target = RetainedGraphicsState;
    fn deref(&self) -> &RetainedGraphicsState {
        &self.retained
    }
}

impl core::ops::DerefMut for GraphicsState {
    fn deref_mut(&mut self) -> &mut RetainedGraphicsState {
        &mut self.retained
    }
}

fn axis_of(v: Point<i32>) -> CoordAxis {
    if v.x == ONE14 {
        CoordAxis::X
    } else if v.y == ONE14 {
        CoordAxis::Y
    } else {
        CoordAxis::Both
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_state_is_x_axis() {
        let mut gs = GraphicsState::new(RetainedGraphicsState::default());
        gs.update_projection_state();
        assert_eq!(gs.fdotp, ONE14);
        assert_eq!(gs.proj_axis, CoordAxis::X);
    }

    #[test]
    fn project_one_axis() {
        let gs = GraphicsState::new(RetainedGraphicsState::default());
        let a = Point::new(F26Dot6::from_bits(100), F26Dot6::from_bits(50));
        let b = Point::new(F26Dot6::from_bits(40), F26Dot6::from_bits(10));
        assert_eq!(gs.project(a, b), F26Dot6::from_bits(60));
    }

    #[test]
    fn project_both_axes_diagonal() {
        let mut gs = GraphicsState::new(RetainedGraphicsState::default());
        let v = crate::math::normalize14(1, 1);
        gs.proj_vector = v;
        gs.dual_proj_vector = v;
        gs.freedom_vector = v;
        gs.update_projection_state();
        let a = Point::new(F26Dot6::from_bits(100), F26Dot6::from_bits(100));
        let b = Point::new(F26Dot6::ZERO, F26Dot6::ZERO);
        let projected = gs.project(a, b).to_bits();
        assert!((projected - 141).abs() <= 1);
    }

    #[test]
    fn movement_along_x_axis() {
        let mut gs = GraphicsState::new(RetainedGraphicsState::default());
        gs.update_projection_state();
        let m = gs.movement(F26Dot6::from_bits(64));
        assert_eq!(m.x, F26Dot6::from_bits(64));
        assert_eq!(m.y, F26Dot6::ZERO);
    }
}
