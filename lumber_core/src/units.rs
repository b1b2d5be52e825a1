//! # Unit Types
//!
//! Type-safe wrappers for the units the design value tables are published in,
//! plus the two conversion constants the adjustment engine relies on.
//!
//! ## Internal Units
//!
//! lumber_core works in SI internally:
//! - Length: metres (m)
//! - Stress: pascals (Pa)
//! - Density: kilograms per cubic metre (kg/m³)
//!
//! Size-factor tables (NDS Table 4A) are keyed by width in inches, and the
//! Spruce-Pine-Fir table is published in psi. Those are converted with
//! [`IN_TO_M`] and [`PSI_TO_PA`] and nothing else.
//!
//! ## Example
//!
//! ```rust
//! use lumber_core::units::{Inches, Meters, Psi, Pascals};
//!
//! let depth: Meters = Inches(9.25).into();
//! assert!((depth.0 - 0.23495).abs() < 1e-12);
//!
//! let fb: Pascals = Psi(875.0).into();
//! assert!((fb.0 - 6.033e6).abs() < 1e3);
//! ```

use serde::{Deserialize, Serialize};

/// Metres per inch
pub const IN_TO_M: f64 = 0.0254;

/// Pascals per psi
pub const PSI_TO_PA: f64 = 6894.757293168361;

// ============================================================================
// Length Units
// ============================================================================

/// Length in metres
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Meters(pub f64);

/// Length in inches
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Inches(pub f64);

impl From<Inches> for Meters {
    fn from(inches: Inches) -> Self {
        Meters(inches.0 * IN_TO_M)
    }
}

impl From<Meters> for Inches {
    fn from(m: Meters) -> Self {
        Inches(m.0 / IN_TO_M)
    }
}

// ============================================================================
// Stress Units
// ============================================================================

/// Stress in pascals
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Pascals(pub f64);

/// Stress in pounds per square inch (psi)
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Psi(pub f64);

impl From<Psi> for Pascals {
    fn from(psi: Psi) -> Self {
        Pascals(psi.0 * PSI_TO_PA)
    }
}

impl From<Pascals> for Psi {
    fn from(pa: Pascals) -> Self {
        Psi(pa.0 / PSI_TO_PA)
    }
}

/// Convert a psi value to pascals
pub fn psi(value: f64) -> f64 {
    Pascals::from(Psi(value)).0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_inches_to_meters() {
        let m: Meters = Inches(1.5).into();
        assert!((m.0 - 0.0381).abs() < 1e-12);

        let back: Inches = m.into();
        assert!((back.0 - 1.5).abs() < 1e-12);
    }

    #[test]
    fn test_psi_to_pascals() {
        let pa: Pascals = Psi(1000.0).into();
        assert!((pa.0 - 6_894_757.293).abs() < 1e-3);
        assert_eq!(psi(1.0), PSI_TO_PA);
    }

    #[test]
    fn test_pascals_to_psi() {
        let back: Psi = Pascals(PSI_TO_PA * 875.0).into();
        assert!((back.0 - 875.0).abs() < 1e-9);
    }

    #[test]
    fn test_serialization() {
        let p = Psi(12.5);
        let json = serde_json::to_string(&p).unwrap();
        assert_eq!(json, "12.5");

        let roundtrip: Psi = serde_json::from_str(&json).unwrap();
        assert_eq!(p, roundtrip);
    }
}
