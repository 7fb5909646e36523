//! The control value table: a font-supplied array of 26.6 device-space
//! reference distances that `prep`/glyph programs read via `RCVT` and may
//! overwrite via `WCVTP`/`WCVTF`.
//!
//! Grounded on the teacher's `hint/cvt.rs`, which wraps `CowSlice` so a
//! glyph's writes never escape into the next glyph's execution.

use crate::cow_slice::CowSlice;
use crate::error::HintErrorKind;
use crate::fixed::F26Dot6;

pub struct Cvt<'a>(CowSlice<'a>);

impl<'a> Cvt<'a> {
    pub fn get(&self, index: usize) -> Result<F26Dot6, HintErrorKind> {
        self.0
            .get(index)
            .map(F26Dot6::from_bits)
            .ok_or(HintErrorKind::InvalidCvtIndex(index))
    }

    pub fn set(&mut self, index: usize, value: F26Dot6) -> Result<(), HintErrorKind> {
        self.0
            .set(index, value.to_bits())
            .ok_or(HintErrorKind::InvalidCvtIndex(index))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<'a> From<CowSlice<'a>> for Cvt<'a> {
    fn from(cow: CowSlice<'a>) -> Self {
        Self(cow)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn write_read() {
        let data = [0_i32, 64, 128];
        let mut scratch = [0_i32; 3];
        let mut cvt: Cvt = CowSlice::new(&data, &mut scratch).unwrap().into();
        assert_eq!(cvt.get(1).unwrap(), F26Dot6::from_bits(64));
        cvt.set(1, F26Dot6::from_bits(256)).unwrap();
        assert_eq!(cvt.get(1).unwrap(), F26Dot6::from_bits(256));
        assert_eq!(cvt.get(0).unwrap(), F26Dot6::ZERO);
    }

    #[test]
    fn out_of_bounds() {
        let data = [0_i32];
        let mut scratch = [0_i32];
        let mut cvt: Cvt = CowSlice::new(&data, &mut scratch).unwrap().into();
        assert_eq!(cvt.get(5).unwrap_err(), HintErrorKind::InvalidCvtIndex(5));
        assert_eq!(cvt.set(5, F26Dot6::ZERO).unwrap_err(), HintErrorKind::InvalidCvtIndex(5));
    }
}
