//! Rounding engine: the eight rounding modes and the `SROUND`/`S45ROUND`
//! period/phase/threshold decoder.
//!
//! Grounded on the teacher's `hint/round.rs`.

use crate::fixed::F26Dot6;

#[derive(Copy, Clone, PartialEq, Eq, Debug, Default)]
pub enum RoundMode {
    #[default]
    Grid,
    HalfGrid,
    DoubleGrid,
    DownToGrid,
    UpToGrid,
    Off,
    Super,
    Super45,
}

#[derive(Copy, Clone, Debug)]
pub struct RoundState {
    pub mode: RoundMode,
    pub period: F26Dot6,
    pub phase: F26Dot6,
    pub threshold: F26Dot6,
}

impl Default for RoundState {
    fn default() -> Self {
        Self {
            mode: RoundMode::Grid,
            period: F26Dot6::from_bits(64),
            phase: F26Dot6::ZERO,
            threshold: F26Dot6::ZERO,
        }
    }
}

impl RoundState {
    /// Rounds `distance` (already compensated by the caller) according to
    /// the current mode.
    pub fn round(&self, distance: F26Dot6) -> F26Dot6 {
        let d = distance.to_bits();
        let result = match self.mode {
            RoundMode::Grid => round_to_grid(d),
            RoundMode::HalfGrid => round_to_half_grid(d),
            RoundMode::DoubleGrid => round_to_double_grid(d),
            RoundMode::DownToGrid => round_down_to_grid(d),
            RoundMode::UpToGrid => round_up_to_grid(d),
            RoundMode::Off => d,
            RoundMode::Super => {
                round_super(d, self.period.to_bits(), self.phase.to_bits(), self.threshold.to_bits())
            }
            RoundMode::Super45 => round_super45(
                d,
                self.period.to_bits(),
                self.phase.to_bits(),
                self.threshold.to_bits(),
            ),
        };
        F26Dot6::from_bits(result)
    }

    /// Decodes a `SROUND`/`S45ROUND` selector byte into period/phase/threshold
    /// and switches to the corresponding mode.
    pub fn set_super_round(&mut self, selector: i32, is_45: bool) {
        let (period, phase, threshold) = parse_super_round(selector as u8);
        self.period = F26Dot6::from_bits(period);
        self.phase = F26Dot6::from_bits(phase);
        self.threshold = F26Dot6::from_bits(threshold);
        self.mode = if is_45 { RoundMode::Super45 } else { RoundMode::Super };
    }
}

fn round_to_grid(d: i32) -> i32 {
    if d >= 0 {
        (d + 32) & !63
    } else {
        -((-d + 32) & !63)
    }
}

fn round_to_half_grid(d: i32) -> i32 {
    if d >= 0 {
        (d & !63) + 32
    } else {
        -(((-d) & !63) + 32)
    }
}

fn round_to_double_grid(d: i32) -> i32 {
    if d >= 0 {
        (d + 16) & !31
    } else {
        -((-d + 16) & !31)
    }
}

fn round_down_to_grid(d: i32) -> i32 {
    if d >= 0 {
        d & !63
    } else {
        -((-d) & !63)
    }
}

fn round_up_to_grid(d: i32) -> i32 {
    if d >= 0 {
        (d + 63) & !63
    } else {
        -((-d + 63) & !63)
    }
}

fn clamp_toward_zero(d: i32, result: i32) -> i32 {
    if d >= 0 && result < 0 {
        0
    } else if d < 0 && result > 0 {
        0
    } else {
        result
    }
}

fn round_super(d: i32, period: i32, phase: i32, threshold: i32) -> i32 {
    let period = period.max(1);
    let v = d + threshold - phase;
    let snapped = if v >= 0 {
        v & !(period - 1)
    } else {
        -((-v) & !(period - 1))
    };
    clamp_toward_zero(d, snapped + phase)
}

fn round_super45(d: i32, period: i32, phase: i32, threshold: i32) -> i32 {
    // Super45's effective grid is rotated 45 degrees, so its period isn't
    // necessarily a power of two; divide instead of masking.
    let period = (((period as i64) * 46) / 64).max(1) as i32;
    let v = d + threshold - phase;
    let snapped = if v >= 0 {
        (v / period) * period
    } else {
        -(((-v) / period) * period)
    };
    clamp_toward_zero(d, snapped + phase)
}

/// Decodes a `SROUND`/`S45ROUND` selector byte into `(period, phase,
/// threshold)`, all in 26.6 bits.
pub fn parse_super_round(selector: u8) -> (i32, i32, i32) {
    let period = match (selector >> 6) & 0x3 {
        0 => 32,
        1 => 64,
        2 => 128,
        _ => 64,
    };
    let phase = match (selector >> 4) & 0x3 {
        0 => 0,
        1 => period / 4,
        2 => period / 2,
        _ => (period * 3) / 4,
    };
    let threshold_bits = (selector & 0xF) as i32;
    let threshold = if threshold_bits == 0 {
        period - 1
    } else {
        (threshold_bits - 4) * period / 8
    };
    (period, phase, threshold)
}

/// Hook for engine-specific compensation (e.g. color-layer adjustments).
/// This crate does not perform any; always returns zero.
pub fn compensate(_distance: F26Dot6) -> F26Dot6 {
    F26Dot6::ZERO
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn to_grid() {
        assert_eq!(round_to_grid(10), 0);
        assert_eq!(round_to_grid(32), 64);
        assert_eq!(round_to_grid(-32), -64);
        assert_eq!(round_to_grid(96), 128);
    }

    #[test]
    fn half_grid() {
        assert_eq!(round_to_half_grid(0), 32);
        assert_eq!(round_to_half_grid(64), 96);
        assert_eq!(round_to_half_grid(-64), -96);
    }

    #[test]
    fn double_grid() {
        assert_eq!(round_to_double_grid(10), 0);
        assert_eq!(round_to_double_grid(16), 32);
    }

    #[test]
    fn down_and_up() {
        assert_eq!(round_down_to_grid(100), 64);
        assert_eq!(round_up_to_grid(65), 128);
        assert_eq!(round_up_to_grid(64), 64);
    }

    #[test]
    fn super_round_default_matches_to_grid() {
        let (period, phase, threshold) = parse_super_round(0b01_00_0000);
        assert_eq!(period, 64);
        assert_eq!(phase, 0);
        assert_eq!(threshold, 63);
        assert_eq!(round_super(100, period, phase, threshold), round_to_grid(100));
    }

    #[test]
    fn parse_super_round_table() {
        // period=32, phase=period/2=16, threshold bits=5 -> (5-4)*32/8=4
        let (period, phase, threshold) = parse_super_round(0b00_10_0101);
        assert_eq!((period, phase, threshold), (32, 16, 4));
    }
}
