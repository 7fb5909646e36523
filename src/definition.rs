//! Function and instruction definition tables (`FDEF`/`IDEF` targets).
//!
//! Grounded on the teacher's `hint/definition.rs`, which in turn notes its
//! layout follows FreeType's `TT_DefRecord` (`src/truetype/ttobjs.h`): a
//! definition is keyed by an arbitrary program-chosen integer (usually, but
//! not required to be, a small dense index) and allocation falls back to a
//! linear scan when the key isn't usable directly as an array index.

use crate::error::HintErrorKind;
use crate::program::Program;

#[derive(Copy, Clone, PartialEq, Eq, Debug, Default)]
pub struct Definition {
    pub start: u32,
    pub end: u32,
    pub key: i32,
    pub program: Program,
    pub is_active: bool,
}

impl Definition {
    pub fn new(program: Program, key: i32, start: u32, end: u32) -> Self {
        Self { start, end, key, program, is_active: true }
    }

    pub fn code_range(&self) -> core::ops::Range<usize> {
        self.start as usize..self.end as usize
    }
}

/// A borrowed or owned table of definitions. Glyph programs see a read-only
/// view (`FDEF`/`IDEF` are disallowed there); font and control-value
/// programs see a mutable one so they can populate it.
pub enum DefinitionMap<'a> {
    Ref(&'a [Definition]),
    Mut(&'a mut [Definition]),
}

impl<'a> DefinitionMap<'a> {
    fn slice(&self) -> &[Definition] {
        match self {
            Self::Ref(s) => s,
            Self::Mut(s) => s,
        }
    }

    /// Finds the active definition for `key`, preferring the key-as-index
    /// fast path and falling back to a linear scan for sparse keys.
    pub fn get(&self, key: i32) -> Result<&Definition, HintErrorKind> {
        let slice = self.slice();
        if key >= 0 {
            if let Some(def) = slice.get(key as usize) {
                if def.is_active && def.key == key {
                    return Ok(def);
                }
            }
        }
        slice
            .iter()
            .rev()
            .find(|d| d.is_active && d.key == key)
            .ok_or(HintErrorKind::InvalidDefinition(key))
    }

    /// Allocates a slot for `key`, reusing the key-as-index slot if free,
    /// otherwise the first free (or already-assigned-to-this-key) slot found
    /// scanning backward.
    pub fn allocate(&mut self, key: i32) -> Result<&mut Definition, HintErrorKind> {
        let slice = match self {
            Self::Ref(_) => return Err(HintErrorKind::DefinitionInGlyphProgram),
            Self::Mut(s) => &mut **s,
        };
        if key >= 0 && (key as usize) < slice.len() {
            return Ok(&mut slice[key as usize]);
        }
        let index = slice
            .iter()
            .enumerate()
            .rev()
            .find(|(_, d)| !d.is_active || d.key == key)
            .map(|(i, _)| i)
            .ok_or(HintErrorKind::TooManyDefinitions)?;
        Ok(&mut slice[index])
    }

    pub fn as_slice(&self) -> &[Definition] {
        self.slice()
    }

    pub fn reset(&mut self) {
        if let Self::Mut(slice) = self {
            for def in slice.iter_mut() {
                def.is_active = false;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn allocate_dense() {
        let mut storage = [Definition::default(); 8];
        let mut map = DefinitionMap::Mut(&mut storage);
        for key in 0..4 {
            let def = map.allocate(key).unwrap();
            *def = Definition::new(Program::Font, key, key as u32 * 10, key as u32 * 10 + 5);
        }
        for key in 0..4 {
            assert_eq!(map.get(key).unwrap().key, key);
        }
    }

    #[test]
    fn allocate_sparse() {
        let mut storage = [Definition::default(); 4];
        let mut map = DefinitionMap::Mut(&mut storage);
        let keys = [0_i32, 1, 2, 123456];
        for key in keys {
            let def = map.allocate(key).unwrap();
            *def = Definition::new(Program::Font, key, 0, 1);
        }
        for key in keys {
            assert_eq!(map.get(key).unwrap().key, key);
        }
    }

    #[test]
    fn too_many_and_invalid() {
        let mut storage = [Definition::default(); 2];
        let mut map = DefinitionMap::Mut(&mut storage);
        map.allocate(0).unwrap().program = Program::Font;
        map.allocate(1).unwrap().program = Program::Font;
        assert_eq!(map.allocate(2).unwrap_err(), HintErrorKind::TooManyDefinitions);
        assert_eq!(map.get(99).unwrap_err(), HintErrorKind::InvalidDefinition(99));
    }

    #[test]
    fn glyph_program_cannot_allocate() {
        let storage = [Definition::default(); 2];
        let mut map = DefinitionMap::Ref(&storage);
        assert_eq!(map.allocate(0).unwrap_err(), HintErrorKind::DefinitionInGlyphProgram);
    }
}
