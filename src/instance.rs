//! The persistent per-font-instance driver.
//!
//! Grounded on the teacher's `hint/instance.rs` (`HintInstance`): a
//! `HintEngine` owns the function/instruction definition tables and the
//! CVT/storage areas populated by running `fpgm`/`prep` once per point
//! size, plus the twilight zone's backing buffers. Every glyph hinted at
//! that size borrows this state read-only through a `CowSlice` and builds
//! its own short-lived `Engine` to run the glyph program. This crate does
//! not parse `glyf`/`loca`/`maxp` itself — the host decodes outlines and
//! fills in `Limits` from its own font-table reader.

use std::vec::Vec;

use crate::cow_slice::CowSlice;
use crate::cvt::Cvt;
use crate::definition::{Definition, DefinitionMap};
use crate::engine::{Engine, LoopBudget};
use crate::error::HintError;
use crate::fixed::{F26Dot6, Fixed, Point};
use crate::graphics::{GraphicsState, RetainedGraphicsState};
use crate::program::{Program, ProgramState};
use crate::storage::Storage;
use crate::value_stack::ValueStack;
use crate::zone::{PointFlags, Zone};

/// Capacities a host derives from a font's `maxp` table. The engine never
/// grows past these; exceeding one sets an error and aborts the program.
#[derive(Copy, Clone, Debug, Default)]
pub struct Limits {
    pub max_stack_elements: u16,
    pub max_storage: u16,
    pub max_function_defs: u16,
    pub max_instruction_defs: u16,
    pub max_twilight_points: u16,
}

/// One glyph's unscaled outline (including its trailing phantom points)
/// and program, handed to [`HintEngine::hint`].
pub struct GlyphInput<'a> {
    pub glyph_id: u16,
    pub bytecode: &'a [u8],
    pub unscaled: &'a [Point<i32>],
    pub contours: &'a [u16],
    pub is_composite: bool,
}

/// A hinted glyph's point positions, returned by [`HintEngine::hint`].
/// `phantom` is the last four entries of `scaled`, broken out since hosts
/// typically use them to derive advance width/lsb after hinting.
pub struct HintedGlyph {
    pub scaled: Vec<Point<F26Dot6>>,
    pub flags: Vec<PointFlags>,
    pub phantom: [Point<F26Dot6>; 4],
    pub backward_compatibility: bool,
}

/// Persistent state for one font at one point size: the function and
/// instruction tables, and the CVT/storage snapshot, produced by running
/// `fpgm` then `prep` once. Reused read-only (via `CowSlice`) for every
/// glyph hinted at this size.
#[derive(Default)]
pub struct HintEngine {
    functions: Vec<Definition>,
    instructions: Vec<Definition>,
    cvt: Vec<i32>,
    storage: Vec<i32>,
    graphics: RetainedGraphicsState,
    twilight_original_scaled: Vec<Point<F26Dot6>>,
    twilight_scaled: Vec<Point<F26Dot6>>,
    twilight_flags: Vec<PointFlags>,
    max_stack: usize,
}

impl HintEngine {
    /// Captures limits, resizes buffers and scales the CVT for a new ppem
    /// (or variation instance). Grounded on the teacher's `setup()`.
    fn setup(&mut self, limits: Limits, cvt_source: &[i16], scale: i32) {
        self.functions.clear();
        self.functions
            .resize(limits.max_function_defs as usize, Definition::default());
        self.instructions
            .resize(limits.max_instruction_defs as usize, Definition::default());

        // CVT values are stored in font units; convert to 26.6 then apply
        // the ppem scale through F16Dot16 multiplication, matching the
        // teacher's two-step (not one-shot `mulFix`) rescale.
        self.cvt.clear();
        self.cvt.extend(cvt_source.iter().map(|v| (*v as i32) * 64));
        let scale = Fixed::from_bits(scale >> 6);
        for value in &mut self.cvt {
            *value = (Fixed::from_bits(*value) * scale).to_bits();
        }

        self.storage.clear();
        self.storage.resize(limits.max_storage as usize, 0);

        let max_twilight_points = limits.max_twilight_points as usize;
        self.twilight_scaled.clear();
        self.twilight_scaled.resize(max_twilight_points, Default::default());
        self.twilight_original_scaled.clear();
        self.twilight_original_scaled.resize(max_twilight_points, Default::default());
        self.twilight_flags.clear();
        self.twilight_flags.resize(max_twilight_points, Default::default());

        self.max_stack = limits.max_stack_elements as usize;
        self.graphics = RetainedGraphicsState::default();
    }

    /// Runs `fpgm` then `prep` for a new ppem, snapshotting the resulting
    /// graphics state as the baseline every glyph at this size starts from.
    #[allow(clippy::too_many_arguments)]
    pub fn reconfigure(
        &mut self,
        limits: Limits,
        fpgm: &[u8],
        prep: &[u8],
        cvt_source: &[i16],
        scale: i32,
        ppem: i32,
        point_size: i32,
        is_smooth: bool,
        preserve_linear_metrics: bool,
    ) -> Result<(), HintError> {
        self.setup(limits, cvt_source, scale);
        self.graphics.scale = scale;
        self.graphics.ppem = ppem;
        self.graphics.point_size = point_size;
        self.graphics.is_smooth = is_smooth;
        self.graphics.preserve_linear_metrics = preserve_linear_metrics;

        let twilight_contours = [self.twilight_scaled.len() as u16];
        let twilight = Zone::new(
            &mut self.twilight_original_scaled,
            &[],
            &mut self.twilight_scaled,
            &mut self.twilight_flags,
            &twilight_contours,
        );
        let mut no_points: [Point<F26Dot6>; 0] = [];
        let mut no_points2: [Point<F26Dot6>; 0] = [];
        let mut no_flags: [PointFlags; 0] = [];
        let glyph = Zone::new(&mut no_points, &[], &mut no_points2, &mut no_flags, &[]);

        let mut stack_buf = alloc_stack(self.max_stack);
        let value_stack = ValueStack::new(&mut stack_buf, false);
        let graphics = GraphicsState::new(self.graphics);
        let cvt_len = self.cvt.len();

        let mut engine = Engine::new(
            graphics,
            twilight,
            glyph,
            ProgramState::new(fpgm, prep, &[], Program::Font),
            value_stack,
            Cvt::from(CowSlice::new_mut(&mut self.cvt)),
            Storage::from(CowSlice::new_mut(&mut self.storage)),
            DefinitionMap::Mut(&mut self.functions),
            DefinitionMap::Mut(&mut self.instructions),
            LoopBudget::new_for_font(cvt_len),
        );
        engine.run_program(Program::Font, None)?;
        engine.run_program(Program::ControlValue, None)?;
        self.graphics = *engine.graphics.retained();
        Ok(())
    }

    /// Whether the control-value program disabled hinting entirely
    /// (`instruct_control` bit 0).
    pub fn is_enabled(&self) -> bool {
        self.graphics.instruct_control & 0x1 == 0
    }

    /// Runs a glyph's bytecode starting from the snapshotted graphics
    /// state, returning its hinted point positions.
    pub fn hint(&self, fpgm: &[u8], prep: &[u8], glyph: GlyphInput<'_>, is_pedantic: bool) -> Result<HintedGlyph, HintError> {
        let point_count = glyph.unscaled.len();
        let scale = self.graphics.scale;
        let mut original_scaled: Vec<Point<F26Dot6>> = glyph
            .unscaled
            .iter()
            .map(|p| {
                Point::new(
                    F26Dot6::from_bits(crate::math::mul(p.x, scale)),
                    F26Dot6::from_bits(crate::math::mul(p.y, scale)),
                )
            })
            .collect();
        let mut scaled = original_scaled.clone();
        let mut flags = alloc_flags(point_count);

        let twilight_contours = [self.twilight_scaled.len() as u16];
        let mut twilight_original_scratch = self.twilight_original_scaled.clone();
        let mut twilight_scaled_scratch = self.twilight_scaled.clone();
        let mut twilight_flags_scratch = self.twilight_flags.clone();
        let twilight = Zone::new(
            &mut twilight_original_scratch,
            &[],
            &mut twilight_scaled_scratch,
            &mut twilight_flags_scratch,
            &twilight_contours,
        );
        let glyph_zone = Zone::new(&mut original_scaled, glyph.unscaled, &mut scaled, &mut flags, glyph.contours);

        let mut stack_buf = alloc_stack(self.max_stack);
        let value_stack = ValueStack::new(&mut stack_buf, is_pedantic);

        let mut cvt_scratch = vec![0i32; self.cvt.len()];
        let cvt = Cvt::from(CowSlice::new(&self.cvt, &mut cvt_scratch).unwrap());
        let mut storage_scratch = vec![0i32; self.storage.len()];
        let storage = Storage::from(CowSlice::new(&self.storage, &mut storage_scratch).unwrap());

        let mut graphics = GraphicsState::new(self.graphics);
        graphics.is_pedantic = is_pedantic;
        let cvt_len = self.cvt.len();

        let mut engine = Engine::new(
            graphics,
            twilight,
            glyph_zone,
            ProgramState::new(fpgm, prep, glyph.bytecode, Program::Glyph),
            value_stack,
            cvt,
            storage,
            DefinitionMap::Ref(&self.functions),
            DefinitionMap::Ref(&self.instructions),
            LoopBudget::new_for_glyph(point_count, cvt_len),
        );
        engine.run_program(Program::Glyph, Some(glyph.glyph_id))?;

        let backward_compatibility = engine.graphics.backward_compatibility;
        let phantom = if point_count >= 4 {
            [
                scaled[point_count - 4],
                scaled[point_count - 3],
                scaled[point_count - 2],
                scaled[point_count - 1],
            ]
        } else {
            [Point::new(F26Dot6::ZERO, F26Dot6::ZERO); 4]
        };

        Ok(HintedGlyph { scaled, flags, phantom, backward_compatibility })
    }
}

fn alloc_stack(len: usize) -> Vec<i32> {
    let mut v = Vec::with_capacity(len);
    v.resize(len, 0);
    v
}

fn alloc_flags(len: usize) -> Vec<PointFlags> {
    let mut v = Vec::with_capacity(len);
    v.resize(len, PointFlags::default());
    v
}

#[cfg(test)]
mod tests {
    use super::*;

    fn limits() -> Limits {
        Limits {
            max_stack_elements: 64,
            max_storage: 8,
            max_function_defs: 4,
            max_instruction_defs: 0,
            max_twilight_points: 4,
        }
    }

    #[test]
    fn reconfigure_runs_empty_programs() {
        let mut engine = HintEngine::default();
        engine
            .reconfigure(limits(), &[], &[], &[10, 20], 0x1_0000, 12, 12, true, false)
            .unwrap();
        assert!(engine.is_enabled());
    }

    #[test]
    fn hint_moves_a_point_with_mdap() {
        let mut engine = HintEngine::default();
        engine
            .reconfigure(limits(), &[], &[], &[], 0x1_0000, 12, 12, true, false)
            .unwrap();
        // SVTCA[x]; PUSHB[0] 0; MDAP[round]
        let bytecode = [0x00, 0xB0, 0x00, 0x2E];
        let unscaled = [Point::new(100, 0)];
        let contours = [0u16];
        let input = GlyphInput {
            glyph_id: 1,
            bytecode: &bytecode,
            unscaled: &unscaled,
            contours: &contours,
            is_composite: false,
        };
        let hinted = engine.hint(&[], &[], input, false).unwrap();
        assert!(hinted.flags[0].is_touched(PointFlags::TOUCH_X));
    }
}
