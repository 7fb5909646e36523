//! Copy-on-write backing storage for the control value table and storage
//! area.
//!
//! Grounded on the teacher's `hint/cow_slice.rs`. A glyph program that
//! writes to the CVT or storage area must not leak that write into sibling
//! glyphs, but copying the whole table up front for every glyph (most of
//! which never write to it) would be wasteful. `CowSlice` instead holds a
//! shared read-only base plus a per-glyph mutable scratch buffer, only
//! copying the base into the scratch buffer the first time a write occurs.

use core::fmt;

#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub struct CowSliceSizeMismatchError(pub usize, pub usize);

impl fmt::Display for CowSliceSizeMismatchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "cow slice base length {} does not match mutable buffer length {}",
            self.0, self.1
        )
    }
}

#[cfg(feature = "std")]
impl std::error::Error for CowSliceSizeMismatchError {}

#[derive(Debug)]
pub struct CowSlice<'a> {
    data: &'a [i32],
    data_mut: &'a mut [i32],
    use_mut: bool,
}

impl<'a> CowSlice<'a> {
    /// Wraps a read-only base and a same-length mutable scratch buffer. The
    /// scratch buffer's contents are ignored until the first write.
    pub fn new(data: &'a [i32], data_mut: &'a mut [i32]) -> Result<Self, CowSliceSizeMismatchError> {
        if data.len() != data_mut.len() {
            return Err(CowSliceSizeMismatchError(data.len(), data_mut.len()));
        }
        Ok(Self { data, data_mut, use_mut: false })
    }

    /// Wraps an already-mutable buffer directly, skipping the copy-on-write
    /// indirection. Used for the font and control-value programs, which run
    /// against storage that's freshly allocated for this execution anyway.
    pub fn new_mut(data_mut: &'a mut [i32]) -> Self {
        Self { data: &[], data_mut, use_mut: true }
    }

    pub fn len(&self) -> usize {
        self.data_mut.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data_mut.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<i32> {
        if self.use_mut {
            self.data_mut.get(index).copied()
        } else {
            self.data.get(index).copied()
        }
    }

    pub fn set(&mut self, index: usize, value: i32) -> Option<()> {
        if index >= self.data_mut.len() {
            return None;
        }
        if !self.use_mut {
            self.data_mut.copy_from_slice(self.data);
            self.use_mut = true;
        }
        self.data_mut[index] = value;
        Some(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn size_mismatch_error() {
        let data = [1, 2, 3];
        let mut scratch = [0, 0];
        assert_eq!(
            CowSlice::new(&data, &mut scratch).unwrap_err(),
            CowSliceSizeMismatchError(3, 2)
        );
    }

    #[test]
    fn copy_on_write() {
        let data = [1, 2, 3];
        let mut scratch = [0, 0, 0];
        let mut cow = CowSlice::new(&data, &mut scratch).unwrap();
        assert_eq!(cow.get(1), Some(2));
        cow.set(1, 99).unwrap();
        assert_eq!(cow.get(1), Some(99));
        assert_eq!(cow.get(0), Some(1));
        drop(cow);
        assert_eq!(scratch, [1, 99, 3]);
        assert_eq!(data, [1, 2, 3]);
    }

    #[test]
    fn out_of_bounds() {
        let data = [1, 2];
        let mut scratch = [0, 0];
        let mut cow = CowSlice::new(&data, &mut scratch).unwrap();
        assert_eq!(cow.get(5), None);
        assert_eq!(cow.set(5, 1), None);
    }

    #[test]
    fn new_mut_skips_copy() {
        let mut scratch = [1, 2, 3];
        let mut cow = CowSlice::new_mut(&mut scratch);
        cow.set(0, 42).unwrap();
        assert_eq!(cow.get(0), Some(42));
    }
}
