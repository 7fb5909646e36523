//! The three bytecode programs and the state needed to step through
//! whichever one is currently executing.
//!
//! Grounded on the teacher's `hint/program.rs`.

use crate::call_stack::{CallRecord, CallStack};
use crate::code::Decoder;
use crate::definition::Definition;
use crate::error::HintErrorKind;

/// Which of the three independent bytecode streams is active.
#[derive(Copy, Clone, PartialEq, Eq, Debug, Default)]
#[repr(u8)]
pub enum Program {
    #[default]
    Font = 0,
    ControlValue = 1,
    Glyph = 2,
}

impl Program {
    fn index(self) -> usize {
        self as u8 as usize
    }
}

/// Tracks which program is executing, the decoder's position within it, and
/// the call stack used to return from `CALL`/`LOOPCALL`/definition bodies.
pub struct ProgramState<'a> {
    bytecode: [&'a [u8]; 3],
    pub initial: Program,
    pub current: Program,
    pub decoder: Decoder<'a>,
    pub call_stack: CallStack,
}

impl<'a> ProgramState<'a> {
    pub fn new(font: &'a [u8], control_value: &'a [u8], glyph: &'a [u8], initial: Program) -> Self {
        let bytecode = [font, control_value, glyph];
        let decoder = Decoder::new(bytecode[initial.index()], 0);
        Self {
            bytecode,
            initial,
            current: initial,
            decoder,
            call_stack: CallStack::default(),
        }
    }

    pub fn reset(&mut self, program: Program) {
        self.initial = program;
        self.current = program;
        self.decoder = Decoder::new(self.bytecode[program.index()], 0);
        self.call_stack.clear();
    }

    /// Switches into a function or instruction definition's body, remembering
    /// where to resume once it (or its final loop iteration) returns.
    pub fn enter(&mut self, definition: &Definition, count: u32) -> Result<(), HintErrorKind> {
        if count == 0 {
            return Ok(());
        }
        self.call_stack.push(CallRecord {
            caller_program: self.current,
            return_pc: self.decoder.pc,
            current_count: count,
            definition_key: definition.key,
            definition_start: definition.start as usize,
            definition_end: definition.end as usize,
            definition_program: definition.program,
        })?;
        self.current = definition.program;
        self.decoder = Decoder::new(self.bytecode[self.current.index()], definition.start as usize);
        Ok(())
    }

    /// Called on `ENDF`: either loops back to the top of the definition body
    /// for another iteration, or restores the caller's position.
    pub fn leave(&mut self) -> Result<(), HintErrorKind> {
        let record = self.call_stack.pop()?;
        if record.current_count > 1 {
            self.decoder = Decoder::new(
                self.bytecode[record.definition_program.index()],
                record.definition_start,
            );
            self.call_stack.push(CallRecord {
                current_count: record.current_count - 1,
                ..record
            })?;
        } else {
            self.current = record.caller_program;
            self.decoder = Decoder::new(self.bytecode[self.current.index()], record.return_pc);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::definition::Definition;

    fn state<'a>(font: &'a [u8]) -> ProgramState<'a> {
        ProgramState::new(font, &[], &[], Program::Font)
    }

    #[test]
    fn accounting() {
        let font = [0xB0, 1, 2, 0x2D]; // PUSHB[0] 1 2; ENDF (body for the def below)
        let mut state = state(&font);
        state.decoder.pc = 10; // pretend we're mid-caller-program
        let def = Definition::new(Program::Font, 5, 0, 4);
        state.enter(&def, 1).unwrap();
        assert_eq!(state.decoder.pc, 0);
        state.leave().unwrap();
        assert_eq!(state.decoder.pc, 10);
        assert!(state.call_stack.is_empty());
    }

    #[test]
    fn loop_call() {
        let font = [0x2D]; // ENDF
        let mut state = state(&font);
        let def = Definition::new(Program::Font, 1, 0, 1);
        state.enter(&def, 3).unwrap();
        assert_eq!(state.decoder.pc, 0);
        state.leave().unwrap(); // 2 left
        assert_eq!(state.decoder.pc, 0);
        state.leave().unwrap(); // 1 left
        assert_eq!(state.decoder.pc, 0);
        state.leave().unwrap(); // done
        assert!(state.call_stack.is_empty());
    }
}
