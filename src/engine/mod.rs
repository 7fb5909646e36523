//! The interpreter proper: owns the graphics state, both zones, the
//! operand/call stacks, the CVT and storage area, and the function/
//! instruction definition tables, and dispatches decoded instructions to
//! the `op_*` functions in the sibling modules.
//!
//! Grounded on the teacher's `hint/engine/mod.rs` (the `LoopBudget` and the
//! dispatch loop) plus `hint/engine/dispatch.rs`.

mod arith;
mod control_flow;
mod definition_ops;
mod delta;
mod graphics_ops;
mod misc;
mod points;
mod stack_ops;

use crate::code::Opcode;
use crate::cvt::Cvt;
use crate::definition::DefinitionMap;
use crate::error::{HintError, HintErrorKind};
use crate::graphics::{GraphicsState, ZoneSelector};
use crate::program::{Program, ProgramState};
use crate::storage::Storage;
use crate::value_stack::ValueStack;
use crate::zone::Zone;

const MAX_RUN_INSTRUCTIONS: usize = 1_000_000;

/// Tracks backward jumps and loop-call iterations against a budget derived
/// from the glyph's complexity, guarding against the pathological infinite
/// loops a hostile or buggy font program can otherwise construct. This is
/// independent of (and in addition to) `MAX_RUN_INSTRUCTIONS`.
#[derive(Copy, Clone, Debug)]
pub struct LoopBudget {
    pub backward_jumps: usize,
    pub loop_calls: usize,
    pub limit: usize,
}

impl LoopBudget {
    pub fn new_for_glyph(point_count: usize, cvt_len: usize) -> Self {
        Self {
            backward_jumps: 0,
            loop_calls: 0,
            limit: (point_count * 10).max(50) + (cvt_len / 10).max(50),
        }
    }

    pub fn new_for_font(cvt_len: usize) -> Self {
        Self { backward_jumps: 0, loop_calls: 0, limit: 300 + 22 * cvt_len }
    }

    pub fn reset(&mut self) {
        self.backward_jumps = 0;
        self.loop_calls = 0;
    }

    pub fn count_backward_jump(&mut self) -> Result<(), HintErrorKind> {
        self.backward_jumps += 1;
        if self.backward_jumps + self.loop_calls > self.limit {
            Err(HintErrorKind::ExceededExecutionBudget)
        } else {
            Ok(())
        }
    }

    pub fn count_loop_call(&mut self, iterations: usize) -> Result<(), HintErrorKind> {
        self.loop_calls += iterations;
        if self.backward_jumps + self.loop_calls > self.limit {
            Err(HintErrorKind::ExceededExecutionBudget)
        } else {
            Ok(())
        }
    }
}

pub struct Engine<'a> {
    pub graphics: GraphicsState,
    pub zones: [Zone<'a>; 2],
    pub program: ProgramState<'a>,
    pub stack: ValueStack<'a>,
    pub cvt: Cvt<'a>,
    pub storage: Storage<'a>,
    pub functions: DefinitionMap<'a>,
    pub instructions: DefinitionMap<'a>,
    pub loop_budget: LoopBudget,
    instruction_count: usize,
}

impl<'a> Engine<'a> {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        graphics: GraphicsState,
        twilight: Zone<'a>,
        glyph: Zone<'a>,
        program: ProgramState<'a>,
        stack: ValueStack<'a>,
        cvt: Cvt<'a>,
        storage: Storage<'a>,
        functions: DefinitionMap<'a>,
        instructions: DefinitionMap<'a>,
        loop_budget: LoopBudget,
    ) -> Self {
        Self {
            graphics,
            zones: [twilight, glyph],
            program,
            stack,
            cvt,
            storage,
            functions,
            instructions,
            loop_budget,
            instruction_count: 0,
        }
    }

    pub fn zone(&self, sel: ZoneSelector) -> &Zone<'a> {
        &self.zones[sel.to_i32() as usize]
    }

    pub fn zone_mut(&mut self, sel: ZoneSelector) -> &mut Zone<'a> {
        &mut self.zones[sel.to_i32() as usize]
    }

    pub fn zp0(&self) -> &Zone<'a> {
        self.zone(self.graphics.zp0)
    }

    pub fn zp1(&self) -> &Zone<'a> {
        self.zone(self.graphics.zp1)
    }

    pub fn zp2(&self) -> &Zone<'a> {
        self.zone(self.graphics.zp2)
    }

    /// Runs `program` from the start, resetting per-execution state first.
    pub fn run_program(&mut self, program: Program, glyph_id: Option<u16>) -> Result<(), HintError> {
        self.reset(program);
        self.run(glyph_id)
    }

    fn reset(&mut self, program: Program) {
        self.program.reset(program);
        self.graphics.reset();
        self.loop_budget.reset();
        self.instruction_count = 0;
        match program {
            Program::Font => {
                self.functions.reset();
                self.instructions.reset();
            }
            Program::ControlValue => {
                self.graphics.backward_compatibility = false;
            }
            Program::Glyph => {
                if self.graphics.retained().instruct_control & 0x2 != 0 {
                    // selector 2 (CVT-ignore) implies a fresh pass ignores
                    // prior glyph-program retained oddities; nothing extra
                    // to reset here beyond the generic `graphics.reset()`
                    // above, which already restores the default GS.
                }
                self.graphics.backward_compatibility = if self.graphics.retained().preserve_linear_metrics {
                    true
                } else if self.graphics.retained().is_smooth {
                    self.graphics.retained().instruct_control & 0x4 == 0
                } else {
                    false
                };
            }
        }
    }

    fn run(&mut self, glyph_id: Option<u16>) -> Result<(), HintError> {
        loop {
            let pc = self.program.decoder.pc;
            let ins = match self.decode() {
                Some(Ok(ins)) => ins,
                Some(Err(kind)) => return Err(self.error_at(pc, None, glyph_id, kind)),
                None => return Ok(()),
            };
            self.instruction_count += 1;
            if self.instruction_count > MAX_RUN_INSTRUCTIONS {
                return Err(self.error_at(pc, Some(ins.opcode), glyph_id, HintErrorKind::ExceededExecutionBudget));
            }
            if let Err(kind) = self.dispatch(ins) {
                return Err(self.error_at(pc, Some(ins.opcode), glyph_id, kind));
            }
        }
    }

    fn decode(&mut self) -> Option<Result<crate::code::Instruction<'a>, HintErrorKind>> {
        self.program.decoder.decode()
    }

    fn error_at(&self, pc: usize, opcode: Option<Opcode>, glyph_id: Option<u16>, kind: HintErrorKind) -> HintError {
        HintError { program: self.program.current, glyph_id, pc, opcode, kind }
    }

    fn dispatch(&mut self, ins: crate::code::Instruction<'a>) -> Result<(), HintErrorKind> {
        use Opcode as Op;
        let opcode = ins.opcode;

        if opcode.0 >= Op::MIRP00000.0 {
            return points::op_mirp(self, opcode.0 - Op::MIRP00000.0);
        }
        if opcode.0 >= Op::MDRP00000.0 {
            return points::op_mdrp(self, opcode.0 - Op::MDRP00000.0);
        }
        if opcode.0 >= Op::PUSHW000.0 && opcode.0 <= Op::PUSHW111.0 {
            return self.stack.push_inline_operands(&ins.inline_operands);
        }
        if opcode.0 >= Op::PUSHB000.0 && opcode.0 <= Op::PUSHB111.0 {
            return self.stack.push_inline_operands(&ins.inline_operands);
        }

        match opcode {
            Op::NPUSHB | Op::NPUSHW => self.stack.push_inline_operands(&ins.inline_operands),

            Op::SVTCA0 => graphics_ops::op_svtca(self, true),
            Op::SVTCA1 => graphics_ops::op_svtca(self, false),
            Op::SPVTCA0 => graphics_ops::op_spvtca(self, true),
            Op::SPVTCA1 => graphics_ops::op_spvtca(self, false),
            Op::SFVTCA0 => graphics_ops::op_sfvtca(self, true),
            Op::SFVTCA1 => graphics_ops::op_sfvtca(self, false),
            Op::SPVTL0 => graphics_ops::op_spvtl(self, false),
            Op::SPVTL1 => graphics_ops::op_spvtl(self, true),
            Op::SFVTL0 => graphics_ops::op_sfvtl(self, false),
            Op::SFVTL1 => graphics_ops::op_sfvtl(self, true),
            Op::SDPVTL0 => graphics_ops::op_sdpvtl(self, false),
            Op::SDPVTL1 => graphics_ops::op_sdpvtl(self, true),
            Op::SPVFS => graphics_ops::op_spvfs(self),
            Op::SFVFS => graphics_ops::op_sfvfs(self),
            Op::GPV => graphics_ops::op_gpv(self),
            Op::GFV => graphics_ops::op_gfv(self),
            Op::SFVTPV => graphics_ops::op_sfvtpv(self),
            Op::SRP0 => graphics_ops::op_srp0(self),
            Op::SRP1 => graphics_ops::op_srp1(self),
            Op::SRP2 => graphics_ops::op_srp2(self),
            Op::SZP0 => graphics_ops::op_szp0(self),
            Op::SZP1 => graphics_ops::op_szp1(self),
            Op::SZP2 => graphics_ops::op_szp2(self),
            Op::SZPS => graphics_ops::op_szps(self),
            Op::SLOOP => graphics_ops::op_sloop(self),
            Op::RTG => graphics_ops::op_rtg(self),
            Op::RTHG => graphics_ops::op_rthg(self),
            Op::RTDG => graphics_ops::op_rtdg(self),
            Op::RDTG => graphics_ops::op_rdtg(self),
            Op::RUTG => graphics_ops::op_rutg(self),
            Op::ROFF => graphics_ops::op_roff(self),
            Op::SROUND => graphics_ops::op_sround(self, false),
            Op::S45ROUND => graphics_ops::op_sround(self, true),
            Op::SMD => graphics_ops::op_smd(self),
            Op::SCVTCI => graphics_ops::op_scvtci(self),
            Op::SSWCI => graphics_ops::op_sswci(self),
            Op::SSW => graphics_ops::op_ssw(self),
            Op::FLIPON => graphics_ops::op_flipon(self),
            Op::FLIPOFF => graphics_ops::op_flipoff(self),
            Op::SDB => graphics_ops::op_sdb(self),
            Op::SDS => graphics_ops::op_sds(self),
            Op::SANGW | Op::AA => stack_ops::op_pop_noop(self),
            Op::SCANCTRL => graphics_ops::op_scanctrl(self),
            Op::SCANTYPE => graphics_ops::op_scantype(self),
            Op::INSTCTRL => graphics_ops::op_instctrl(self),

            Op::DUP => self.stack.dup(),
            Op::POP => self.stack.pop().map(|_| ()),
            Op::CLEAR => {
                self.stack.clear();
                Ok(())
            }
            Op::SWAP => self.stack.swap(),
            Op::DEPTH => self.stack.push(self.stack.len() as i32),
            Op::CINDEX => stack_ops::op_cindex(self),
            Op::MINDEX => stack_ops::op_mindex(self),
            Op::ROLL => self.stack.roll(),

            Op::LT => self.stack.apply_binary(|a, b| (a < b) as i32),
            Op::LTEQ => self.stack.apply_binary(|a, b| (a <= b) as i32),
            Op::GT => self.stack.apply_binary(|a, b| (a > b) as i32),
            Op::GTEQ => self.stack.apply_binary(|a, b| (a >= b) as i32),
            Op::EQ => self.stack.apply_binary(|a, b| (a == b) as i32),
            Op::NEQ => self.stack.apply_binary(|a, b| (a != b) as i32),
            Op::ODD => arith::op_odd(self),
            Op::EVEN => arith::op_even(self),
            Op::AND => self.stack.apply_binary(|a, b| ((a != 0) && (b != 0)) as i32),
            Op::OR => self.stack.apply_binary(|a, b| ((a != 0) || (b != 0)) as i32),
            Op::NOT => self.stack.apply_unary(|a| (a == 0) as i32),
            Op::ADD => self.stack.apply_binary(|a, b| a.wrapping_add(b)),
            Op::SUB => self.stack.apply_binary(|a, b| a.wrapping_sub(b)),
            Op::DIV => arith::op_div(self),
            Op::MUL => arith::op_mul(self),
            Op::ABS => self.stack.apply_unary(i32::wrapping_abs),
            Op::NEG => self.stack.apply_unary(i32::wrapping_neg),
            Op::FLOOR => self.stack.apply_unary(crate::math::floor),
            Op::CEILING => self.stack.apply_unary(crate::math::ceil),
            Op::MAX => self.stack.apply_binary(core::cmp::max),
            Op::MIN => self.stack.apply_binary(core::cmp::min),

            Op::ROUND00 | Op::ROUND01 | Op::ROUND10 | Op::ROUND11 => arith::op_round(self, true),
            Op::NROUND00 | Op::NROUND01 | Op::NROUND10 | Op::NROUND11 => arith::op_round(self, false),

            Op::IF => control_flow::op_if(self),
            Op::ELSE => control_flow::op_else(self),
            Op::EIF => Ok(()),
            Op::JMPR => control_flow::op_jmpr(self, ins.pc),
            Op::JROT => control_flow::op_jrot(self, ins.pc, true),
            Op::JROF => control_flow::op_jrot(self, ins.pc, false),

            Op::FDEF => definition_ops::op_fdef(self),
            Op::IDEF => definition_ops::op_idef(self),
            Op::ENDF => self.program.leave(),
            Op::CALL => definition_ops::op_call(self, 1),
            Op::LOOPCALL => definition_ops::op_loopcall(self),

            Op::WCVTP => misc::op_wcvtp(self),
            Op::WCVTF => misc::op_wcvtf(self),
            Op::RCVT => misc::op_rcvt(self),
            Op::WS => misc::op_ws(self),
            Op::RS => misc::op_rs(self),
            Op::GC0 => misc::op_gc(self, true),
            Op::GC1 => misc::op_gc(self, false),
            Op::SCFS => misc::op_scfs(self),
            Op::MD0 => misc::op_md(self, true),
            Op::MD1 => misc::op_md(self, false),
            Op::MPPEM => misc::op_mppem(self),
            Op::MPS => misc::op_mps(self),
            Op::DEBUG => self.stack.pop().map(|_| ()),
            Op::GETINFO => misc::op_getinfo(self),
            Op::GETVARIATION => misc::op_getvariation(self),
            Op::GETDATA => self.stack.push(17),

            Op::MDAP0 => points::op_mdap(self, false),
            Op::MDAP1 => points::op_mdap(self, true),
            Op::MIAP0 => points::op_miap(self, false),
            Op::MIAP1 => points::op_miap(self, true),
            Op::MSIRP0 => points::op_msirp(self, false),
            Op::MSIRP1 => points::op_msirp(self, true),
            Op::ALIGNRP => points::op_alignrp(self),
            Op::ALIGNPTS => points::op_alignpts(self),
            Op::ISECT => points::op_isect(self),
            Op::SHP0 => points::op_shp(self, false),
            Op::SHP1 => points::op_shp(self, true),
            Op::SHC0 => points::op_shc(self, false),
            Op::SHC1 => points::op_shc(self, true),
            Op::SHZ0 => points::op_shz(self, false),
            Op::SHZ1 => points::op_shz(self, true),
            Op::SHPIX => points::op_shpix(self),
            Op::IP => points::op_ip(self),
            Op::UTP => points::op_utp(self),
            Op::IUP0 => points::op_iup(self, false),
            Op::IUP1 => points::op_iup(self, true),
            Op::FLIPPT => points::op_flippt(self),
            Op::FLIPRGON => points::op_fliprgon(self, true),
            Op::FLIPRGOFF => points::op_fliprgon(self, false),

            Op::DELTAP1 => delta::op_deltap(self, 0),
            Op::DELTAP2 => delta::op_deltap(self, 16),
            Op::DELTAP3 => delta::op_deltap(self, 32),
            Op::DELTAC1 => delta::op_deltac(self, 0),
            Op::DELTAC2 => delta::op_deltac(self, 16),
            Op::DELTAC3 => delta::op_deltac(self, 32),

            _ => match self.instructions.get(opcode.0 as i32) {
                Ok(def) => {
                    let def = *def;
                    self.program.enter(&def, 1)
                }
                Err(_) => Err(HintErrorKind::UnhandledOpcode(opcode)),
            },
        }
    }
}
