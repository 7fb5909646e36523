//! `FDEF`/`IDEF` (recording function and instruction definitions) and
//! `CALL`/`LOOPCALL` (invoking them).

use super::Engine;
use crate::code::Opcode;
use crate::definition::Definition;
use crate::error::HintErrorKind;

const MAX_DEFINITION_LEN: usize = 0xFFFF;

/// Scans forward from the current decoder position (already past the
/// `FDEF`/`IDEF` opcode) for the matching `ENDF`, rejecting any nested
/// definition start. Returns the body's `[start, end)` byte range.
fn scan_body(engine: &mut Engine) -> Result<(u32, u32), HintErrorKind> {
    let start = engine.program.decoder.pc;
    loop {
        let ins_pc = engine.program.decoder.pc;
        match engine.program.decoder.decode() {
            Some(Ok(ins)) => match ins.opcode {
                Opcode::FDEF | Opcode::IDEF => return Err(HintErrorKind::NestedDefinition),
                Opcode::ENDF => return Ok((start as u32, ins_pc as u32)),
                _ => {}
            },
            Some(Err(kind)) => return Err(kind),
            None => return Err(HintErrorKind::InvalidJump),
        }
    }
}

pub fn op_fdef(engine: &mut Engine) -> Result<(), HintErrorKind> {
    let key = engine.stack.pop()?;
    let (start, end) = scan_body(engine)?;
    if engine.graphics.is_pedantic && (end - start) as usize > MAX_DEFINITION_LEN {
        return Err(HintErrorKind::DefinitionTooLarge);
    }
    let program = engine.program.current;
    let slot = engine.functions.allocate(key)?;
    *slot = Definition::new(program, key, start, end);
    Ok(())
}

pub fn op_idef(engine: &mut Engine) -> Result<(), HintErrorKind> {
    let key = engine.stack.pop()?;
    let (start, end) = scan_body(engine)?;
    if engine.graphics.is_pedantic && (end - start) as usize > MAX_DEFINITION_LEN {
        return Err(HintErrorKind::DefinitionTooLarge);
    }
    let program = engine.program.current;
    let slot = engine.instructions.allocate(key)?;
    *slot = Definition::new(program, key, start, end);
    Ok(())
}

pub fn op_call(engine: &mut Engine, count: u32) -> Result<(), HintErrorKind> {
    let key = engine.stack.pop()?;
    let def = *engine.functions.get(key)?;
    engine.program.enter(&def, count)
}

pub fn op_loopcall(engine: &mut Engine) -> Result<(), HintErrorKind> {
    let key = engine.stack.pop()?;
    let count = engine.stack.pop_count_checked()?;
    if count == 0 {
        return Ok(());
    }
    engine.loop_budget.count_loop_call(count)?;
    let def = *engine.functions.get(key)?;
    engine.program.enter(&def, count as u32)
}
