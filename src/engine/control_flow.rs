//! `IF`/`ELSE`/`EIF` branching and the `JMPR`/`JROT`/`JROF` jumps.

use super::Engine;
use crate::code::Opcode;
use crate::error::HintErrorKind;

/// Scans forward from the current decoder position (already past `IF`),
/// honoring nested `IF`/`EIF` pairs, and reports whichever of `ELSE`/`EIF`
/// terminates the current branch. Decoding (not execution) still validates
/// every instruction's inline operands, so a malformed push inside a
/// skipped branch is still caught.
fn scan_to_else_or_eif(engine: &mut Engine) -> Result<Opcode, HintErrorKind> {
    let mut depth: u32 = 0;
    loop {
        match engine.program.decoder.decode() {
            Some(Ok(ins)) => match ins.opcode {
                Opcode::IF => depth += 1,
                Opcode::ELSE if depth == 0 => return Ok(Opcode::ELSE),
                Opcode::EIF => {
                    if depth == 0 {
                        return Ok(Opcode::EIF);
                    }
                    depth -= 1;
                }
                _ => {}
            },
            Some(Err(kind)) => return Err(kind),
            None => return Err(HintErrorKind::InvalidJump),
        }
    }
}

fn scan_to_eif(engine: &mut Engine) -> Result<(), HintErrorKind> {
    let mut depth: u32 = 0;
    loop {
        match engine.program.decoder.decode() {
            Some(Ok(ins)) => match ins.opcode {
                Opcode::IF => depth += 1,
                Opcode::EIF => {
                    if depth == 0 {
                        return Ok(());
                    }
                    depth -= 1;
                }
                _ => {}
            },
            Some(Err(kind)) => return Err(kind),
            None => return Err(HintErrorKind::InvalidJump),
        }
    }
}

pub fn op_if(engine: &mut Engine) -> Result<(), HintErrorKind> {
    let condition = engine.stack.pop()?;
    if condition != 0 {
        return Ok(());
    }
    match scan_to_else_or_eif(engine)? {
        Opcode::ELSE | Opcode::EIF => Ok(()),
        _ => unreachable!(),
    }
}

/// Reached when execution falls out the end of a taken `IF` branch; skips
/// over the (untaken) `ELSE` branch to the matching `EIF`.
pub fn op_else(engine: &mut Engine) -> Result<(), HintErrorKind> {
    scan_to_eif(engine)
}

fn jump(engine: &mut Engine, instruction_pc: usize, offset: i32) -> Result<(), HintErrorKind> {
    let target = instruction_pc as i64 + offset as i64;
    if target < 0 || target > engine.program.decoder.bytecode.len() as i64 {
        return Err(HintErrorKind::InvalidJump);
    }
    if target <= engine.program.decoder.pc as i64 {
        engine.loop_budget.count_backward_jump()?;
    }
    engine.program.decoder.pc = target as usize;
    Ok(())
}

pub fn op_jmpr(engine: &mut Engine, instruction_pc: usize) -> Result<(), HintErrorKind> {
    let offset = engine.stack.pop()?;
    jump(engine, instruction_pc, offset)
}

pub fn op_jrot(engine: &mut Engine, instruction_pc: usize, jump_if_true: bool) -> Result<(), HintErrorKind> {
    let offset = engine.stack.pop()?;
    let condition = engine.stack.pop()?;
    if (condition != 0) == jump_if_true {
        jump(engine, instruction_pc, offset)
    } else {
        Ok(())
    }
}
