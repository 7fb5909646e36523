//! The storage area: a scratch array of plain integers addressed by
//! `RS`/`WS`, used by hinting programs to stash state across invocations
//! (within the lifetime of the `CowSlice` they were given).
//!
//! Grounded on the teacher's `hint/storage.rs`.

use crate::cow_slice::CowSlice;
use crate::error::HintErrorKind;

pub struct Storage<'a>(CowSlice<'a>);

impl<'a> Storage<'a> {
    pub fn get(&self, index: usize) -> Result<i32, HintErrorKind> {
        self.0.get(index).ok_or(HintErrorKind::InvalidStorageIndex(index))
    }

    pub fn set(&mut self, index: usize, value: i32) -> Result<(), HintErrorKind> {
        self.0.set(index, value).ok_or(HintErrorKind::InvalidStorageIndex(index))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<'a> From<CowSlice<'a>> for Storage<'a> {
    fn from(cow: CowSlice<'a>) -> Self {
        Self(cow)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn write_read() {
        let data = [0_i32; 4];
        let mut scratch = [0_i32; 4];
        let mut storage: Storage = CowSlice::new(&data, &mut scratch).unwrap().into();
        storage.set(2, 42).unwrap();
        assert_eq!(storage.get(2).unwrap(), 42);
        assert_eq!(storage.get(0).unwrap(), 0);
    }

    #[test]
    fn out_of_bounds() {
        let data = [0_i32; 2];
        let mut scratch = [0_i32; 2];
        let mut storage: Storage = CowSlice::new(&data, &mut scratch).unwrap().into();
        assert_eq!(storage.get(9).unwrap_err(), HintErrorKind::InvalidStorageIndex(9));
        assert_eq!(storage.set(9, 1).unwrap_err(), HintErrorKind::InvalidStorageIndex(9));
    }
}
