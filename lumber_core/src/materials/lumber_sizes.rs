//! Standard Dimension Lumber Sizes
//!
//! Nominal designations for 2"-4" thick dimension lumber with their dressed
//! (actual) dimensions, and the cross-section they present to the adjustment
//! engine in each orientation.
//!
//! ## Nominal vs Actual Dimensions
//!
//! - 2x nominal = 1.5" actual
//! - 4x nominal = 3.5" actual
//! - 6x nominal = 5.5" actual
//! - 8x nominal = 7.25" actual
//! - etc.

use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::errors::LumberError;
use crate::units::{Inches, Meters};

/// Standard lumber size designation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum LumberSize {
    /// 2x4 (1.5" x 3.5")
    L2x4,
    /// 2x6 (1.5" x 5.5")
    L2x6,
    /// 2x8 (1.5" x 7.25")
    L2x8,
    /// 2x10 (1.5" x 9.25")
    #[default]
    L2x10,
    /// 2x12 (1.5" x 11.25")
    L2x12,
    /// 2x14 (1.5" x 13.25")
    L2x14,
    /// 3x4 (2.5" x 3.5")
    L3x4,
    /// 3x6 (2.5" x 5.5")
    L3x6,
    /// 3x8 (2.5" x 7.25")
    L3x8,
    /// 3x10 (2.5" x 9.25")
    L3x10,
    /// 3x12 (2.5" x 11.25")
    L3x12,
    /// 4x4 (3.5" x 3.5")
    L4x4,
    /// 4x6 (3.5" x 5.5")
    L4x6,
    /// 4x8 (3.5" x 7.25")
    L4x8,
    /// 4x10 (3.5" x 9.25")
    L4x10,
    /// 4x12 (3.5" x 11.25")
    L4x12,
}

/// How the member is loaded in bending
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum Orientation {
    /// Load on the narrow face (joist on edge)
    #[default]
    Edge,
    /// Load on the wide face (plank)
    Flat,
}

impl LumberSize {
    /// All standard sizes
    pub const ALL: [LumberSize; 16] = [
        LumberSize::L2x4,
        LumberSize::L2x6,
        LumberSize::L2x8,
        LumberSize::L2x10,
        LumberSize::L2x12,
        LumberSize::L2x14,
        LumberSize::L3x4,
        LumberSize::L3x6,
        LumberSize::L3x8,
        LumberSize::L3x10,
        LumberSize::L3x12,
        LumberSize::L4x4,
        LumberSize::L4x6,
        LumberSize::L4x8,
        LumberSize::L4x10,
        LumberSize::L4x12,
    ];

    /// Get the actual dimensions (thickness, width) in inches
    pub fn actual_dimensions(&self) -> (f64, f64) {
        let (t, w) = self.nominal_dimensions();
        (dressed_in(t), dressed_in(w))
    }

    /// Get the nominal dimensions (thickness, width) in inches
    pub fn nominal_dimensions(&self) -> (u8, u8) {
        match self {
            LumberSize::L2x4 => (2, 4),
            LumberSize::L2x6 => (2, 6),
            LumberSize::L2x8 => (2, 8),
            LumberSize::L2x10 => (2, 10),
            LumberSize::L2x12 => (2, 12),
            LumberSize::L2x14 => (2, 14),
            LumberSize::L3x4 => (3, 4),
            LumberSize::L3x6 => (3, 6),
            LumberSize::L3x8 => (3, 8),
            LumberSize::L3x10 => (3, 10),
            LumberSize::L3x12 => (3, 12),
            LumberSize::L4x4 => (4, 4),
            LumberSize::L4x6 => (4, 6),
            LumberSize::L4x8 => (4, 8),
            LumberSize::L4x10 => (4, 10),
            LumberSize::L4x12 => (4, 12),
        }
    }

    /// Get display name (e.g., "2x10")
    pub fn display_name(&self) -> String {
        let (t, w) = self.nominal_dimensions();
        format!("{}x{}", t, w)
    }

    /// Actual thickness in inches
    pub fn thickness_in(&self) -> f64 {
        self.actual_dimensions().0
    }

    /// Actual width in inches
    pub fn width_in(&self) -> f64 {
        self.actual_dimensions().1
    }

    /// Cross-section (b, h) in metres for the given orientation.
    ///
    /// `b` is the horizontal dimension, `h` the dimension in the load
    /// direction, so flat use gives b > h.
    pub fn section_m(&self, orientation: Orientation) -> (f64, f64) {
        let (t, w) = self.actual_dimensions();
        let (t, w) = (Meters::from(Inches(t)).0, Meters::from(Inches(w)).0);
        match orientation {
            Orientation::Edge => (t, w),
            Orientation::Flat => (w, t),
        }
    }
}

/// Dressed size of a nominal dimension (in)
fn dressed_in(nominal: u8) -> f64 {
    match nominal {
        n if n <= 6 => n as f64 - 0.5,
        n => n as f64 - 0.75,
    }
}

impl FromStr for LumberSize {
    type Err = LumberError;

    /// Parse "2x10", "2X10" or "2 x 10"
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.to_lowercase().replace(' ', "");
        Self::ALL
            .iter()
            .copied()
            .find(|size| size.display_name() == normalized)
            .ok_or_else(|| {
                LumberError::invalid_input(
                    "size",
                    s,
                    "Expected a dimension lumber size such as 2x10",
                )
            })
    }
}

impl std::fmt::Display for LumberSize {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lumber_size_dimensions() {
        let size = LumberSize::L2x10;
        assert_eq!(size.actual_dimensions(), (1.5, 9.25));
        assert_eq!(size.nominal_dimensions(), (2, 10));
        assert_eq!(size.display_name(), "2x10");
        assert_eq!(LumberSize::L4x6.actual_dimensions(), (3.5, 5.5));
        assert_eq!(LumberSize::L2x14.width_in(), 13.25);
        assert_eq!(LumberSize::L3x8.thickness_in(), 2.5);
    }

    #[test]
    fn test_section_orientation() {
        let (b, h) = LumberSize::L2x10.section_m(Orientation::Edge);
        assert!((b - 0.0381).abs() < 1e-12);
        assert!((h - 0.23495).abs() < 1e-12);

        let (b, h) = LumberSize::L2x10.section_m(Orientation::Flat);
        assert!(b > h);
    }

    #[test]
    fn test_parse() {
        assert_eq!("2x10".parse::<LumberSize>().unwrap(), LumberSize::L2x10);
        assert_eq!("4 X 4".parse::<LumberSize>().unwrap(), LumberSize::L4x4);
        assert!("6x6".parse::<LumberSize>().is_err());
    }

    #[test]
    fn test_serialization() {
        let size = LumberSize::L2x12;
        let json = serde_json::to_string(&size).unwrap();
        let parsed: LumberSize = serde_json::from_str(&json).unwrap();
        assert_eq!(size, parsed);
    }
}
