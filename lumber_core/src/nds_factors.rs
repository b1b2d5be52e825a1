//! # NDS Adjustment Factors
//!
//! Adjustment factors for visually graded dimension lumber per NDS
//! Supplement Table 4A.
//!
//! ## Overview
//!
//! Reference design values are multiplied by the applicable factors to
//! obtain adjusted design values:
//!
//! ```text
//! Fb'     = Fb     × C_r × C_M × C_fu × C_F
//! Ft'     = Ft     × C_F
//! Fv'     = Fv     × C_M
//! Fc_perp'= Fc_perp× C_b × C_M
//! Fc'     = Fc     × C_M × C_F
//! E'      = E      × C_M
//! Emin'   = Emin   × C_M
//! ```
//!
//! ## Factor Summary
//!
//! | Factor | Description              | Typical Values    |
//! |--------|--------------------------|-------------------|
//! | C_M    | Wet service              | 0.67 - 1.0        |
//! | C_F    | Size                     | 0.9 - 1.5         |
//! | C_fu   | Flat use                 | 1.0 - 1.2         |
//! | C_r    | Repetitive member        | 1.0 or 1.15       |
//! | C_b    | Bearing area             | 1.0 - 1.75        |
//!
//! The size and flat-use factors are piecewise-linear in nominal width and
//! live in [`SizeFactorCurves`], built once per process.

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::curve::PiecewiseLinearCurve;
use crate::errors::{LumberError, LumberResult};
use crate::units::{psi, Inches, Meters};

// ============================================================================
// NDS Code Section References
// ============================================================================

/// NDS code section references for the adjustment factors.
pub mod nds_ref {
    /// Reference design values for dimension lumber
    pub const TABLE_4A: &str = "NDS Supplement Table 4A";
    /// Wet service factor C_M
    pub const C_M: &str = "NDS Table 4A Adj. Factors";
    /// Size factor C_F
    pub const C_F: &str = "NDS Table 4A Adj. Factors";
    /// Flat use factor C_fu
    pub const C_FU: &str = "NDS 4.3.7";
    /// Repetitive member factor C_r
    pub const C_R: &str = "NDS 4.3.9";
    /// Bearing area factor C_b
    pub const C_B: &str = "NDS 3.10.4";
}

// ============================================================================
// Wet Service
// ============================================================================

/// Wet bending limit (psi). C_M = 0.85 only when the tabulated Fb at the
/// member width exceeds this divided by 0.85; the size factor is not applied.
pub const WET_FB_LIMIT_PSI: f64 = 1150.0;

/// Wet compression limit (psi). C_M = 0.8 only when the tabulated Fc at the
/// member width exceeds this divided by 0.8; the size factor is not applied.
pub const WET_FC_LIMIT_PSI: f64 = 750.0;

/// Wet service condition for C_M factor
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum WetService {
    /// Dry conditions (MC ≤ 19%): C_M = 1.0
    #[default]
    Dry,

    /// Wet conditions (MC > 19%): C_M varies by property
    Wet,
}

impl WetService {
    /// Build from a wet-service flag
    pub fn from_flag(wet: bool) -> Self {
        if wet {
            WetService::Wet
        } else {
            WetService::Dry
        }
    }

    /// True for the wet condition
    pub fn is_wet(&self) -> bool {
        matches!(self, WetService::Wet)
    }

    /// C_M for bending given the tabulated Fb (Pa) at the member width.
    ///
    /// The 0.85 derating only applies when 0.85 × Fb would exceed 1150 psi.
    pub fn factor_fb(&self, fb_pa: f64) -> f64 {
        match self {
            WetService::Wet if fb_pa > psi(WET_FB_LIMIT_PSI) / 0.85 => 0.85,
            _ => 1.0,
        }
    }

    /// C_M for tension. Table 4A lists 1.0 for both conditions.
    pub fn factor_ft(&self) -> f64 {
        1.0
    }

    /// C_M for shear (Fv)
    pub fn factor_fv(&self) -> f64 {
        match self {
            WetService::Dry => 1.0,
            WetService::Wet => 0.97,
        }
    }

    /// C_M for compression perpendicular to grain (Fc_perp)
    pub fn factor_fc_perp(&self) -> f64 {
        match self {
            WetService::Dry => 1.0,
            WetService::Wet => 0.67,
        }
    }

    /// C_M for compression parallel to grain given the tabulated Fc (Pa).
    ///
    /// The 0.8 derating only applies when 0.8 × Fc would exceed 750 psi.
    pub fn factor_fc(&self, fc_pa: f64) -> f64 {
        match self {
            WetService::Wet if fc_pa > psi(WET_FC_LIMIT_PSI) / 0.8 => 0.8,
            _ => 1.0,
        }
    }

    /// C_M for modulus of elasticity (E, Emin)
    pub fn factor_e(&self) -> f64 {
        match self {
            WetService::Dry => 1.0,
            WetService::Wet => 0.9,
        }
    }

    /// Display name for UI
    pub fn display_name(&self) -> &'static str {
        match self {
            WetService::Dry => "Dry (MC ≤ 19%)",
            WetService::Wet => "Wet (MC > 19%)",
        }
    }
}

impl std::fmt::Display for WetService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

// ============================================================================
// Repetitive Member / Bearing Area
// ============================================================================

/// Member arrangement selecting C_r (NDS 4.3.9).
///
/// Joists, rafters and studs at 24 in or less on centre that share a
/// sheathing layer count as repetitive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum RepetitiveMember {
    /// C_r = 1.0
    #[default]
    Single,

    /// C_r = 1.15
    Repetitive,
}

impl RepetitiveMember {
    /// C_r
    pub fn factor(&self) -> f64 {
        match self {
            RepetitiveMember::Single => 1.0,
            RepetitiveMember::Repetitive => 1.15,
        }
    }
}

/// Bearing area factor C_b per NDS 3.10.4.
///
/// `C_b = (l_b + 0.375) / l_b` for bearings shorter than 6 in, measured
/// parallel to grain; 1.0 otherwise. The bearing must sit at least 3 in
/// from the member end, which is the caller's check.
pub fn bearing_area_factor(bearing_length_m: f64) -> LumberResult<f64> {
    if !bearing_length_m.is_finite() || bearing_length_m <= 0.0 {
        return Err(LumberError::invalid_input(
            "bearing_length_m",
            bearing_length_m.to_string(),
            "Bearing length must be positive",
        ));
    }
    let lb_in = Inches::from(Meters(bearing_length_m)).0;
    if lb_in < 6.0 {
        Ok((lb_in + 0.375) / lb_in)
    } else {
        Ok(1.0)
    }
}

// ============================================================================
// Size Factor Curves
// ============================================================================

/// Nominal width (in) at and above which stud grade is not published
pub const STUD_MAX_WIDTH_IN: f64 = 8.0;

/// Flat-use thickness boundary (in); thicker members use the second curve
pub const FLAT_USE_THICKNESS_SPLIT_IN: f64 = 3.0;

/// Bending size factor thickness boundary (in)
pub const FB_SIZE_THICKNESS_SPLIT_IN: f64 = 4.0;

const FLAT_USE_X: [f64; 9] = [1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 8.0, 10.0, 1000.0];
const FLAT_USE_THIN_Y: [f64; 9] = [1.0, 1.0, 1.0, 1.1, 1.1, 1.15, 1.15, 1.20, 1.2];
const FLAT_USE_THICK_Y: [f64; 9] = [1.0, 1.0, 1.0, 1.0, 1.05, 1.05, 1.05, 1.05, 1.1];

const SIZE_X: [f64; 11] = [1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 8.0, 10.0, 12.0, 14.0, 1000.0];
const FB_SIZE_THIN_Y: [f64; 11] = [1.5, 1.5, 1.5, 1.5, 1.4, 1.3, 1.2, 1.1, 1.0, 0.9, 0.9];
const FB_SIZE_THICK_Y: [f64; 11] = [1.5, 1.5, 1.5, 1.5, 1.4, 1.3, 1.3, 1.2, 1.1, 1.0, 1.0];
const FC_SIZE_Y: [f64; 11] = [1.15, 1.15, 1.15, 1.15, 1.1, 1.1, 1.05, 1.0, 1.0, 0.9, 0.9];

const STUD_X: [f64; 7] = [1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 8.0];
const STUD_FB_SIZE_Y: [f64; 7] = [1.1, 1.1, 1.1, 1.1, 1.0, 1.0, 1.0];
const STUD_FC_SIZE_Y: [f64; 7] = [1.05, 1.05, 1.05, 1.05, 1.0, 1.0, 1.0];

/// NDS Table 4A size and flat-use factor curves, keyed by width in inches.
///
/// Tension shares the bending curves: Table 4A lists identical Ft and Fb
/// size factors for 2"-4" thick members, including stud grade.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SizeFactorCurves {
    /// C_fu for thickness ≤ 3 in
    pub flat_use_thin: PiecewiseLinearCurve,
    /// C_fu for thickness > 3 in
    pub flat_use_thick: PiecewiseLinearCurve,
    /// C_F (Fb, Ft) for thickness ≤ 4 in
    pub fb_size_thin: PiecewiseLinearCurve,
    /// C_F (Fb) for thickness > 4 in
    pub fb_size_thick: PiecewiseLinearCurve,
    /// C_F (Fb, Ft) for stud grade, widths below 8 in
    pub stud_fb_size: PiecewiseLinearCurve,
    /// C_F (Fc)
    pub fc_size: PiecewiseLinearCurve,
    /// C_F (Fc) for stud grade, widths below 8 in
    pub stud_fc_size: PiecewiseLinearCurve,
}

impl SizeFactorCurves {
    /// Build and validate every curve
    pub fn build() -> LumberResult<Self> {
        let curve = |name: &str, xs: &[f64], ys: &[f64]| {
            PiecewiseLinearCurve::new(name, xs.to_vec(), ys.to_vec())
        };

        let curves = Self {
            flat_use_thin: curve("flat use factor (t <= 3 in)", &FLAT_USE_X, &FLAT_USE_THIN_Y)?,
            flat_use_thick: curve(
                "flat use factor (t > 3 in)",
                &FLAT_USE_X,
                &FLAT_USE_THICK_Y,
            )?,
            fb_size_thin: curve("Fb size factor (t <= 4 in)", &SIZE_X, &FB_SIZE_THIN_Y)?,
            fb_size_thick: curve("Fb size factor (t > 4 in)", &SIZE_X, &FB_SIZE_THICK_Y)?,
            stud_fb_size: curve("stud Fb size factor", &STUD_X, &STUD_FB_SIZE_Y)?,
            fc_size: curve("Fc size factor", &SIZE_X, &FC_SIZE_Y)?,
            stud_fc_size: curve("stud Fc size factor", &STUD_X, &STUD_FC_SIZE_Y)?,
        };
        debug!("built NDS Table 4A size factor curves");
        Ok(curves)
    }

    /// Flat-use curve for a member thickness in inches
    pub fn flat_use(&self, thickness_in: f64) -> &PiecewiseLinearCurve {
        if thickness_in > FLAT_USE_THICKNESS_SPLIT_IN {
            &self.flat_use_thick
        } else {
            &self.flat_use_thin
        }
    }

    /// Bending size curve (non-stud grades) for a member thickness in inches
    pub fn fb_size(&self, thickness_in: f64) -> &PiecewiseLinearCurve {
        if thickness_in > FB_SIZE_THICKNESS_SPLIT_IN {
            &self.fb_size_thick
        } else {
            &self.fb_size_thin
        }
    }

    /// Tension size curve (non-stud grades)
    pub fn ft_size(&self) -> &PiecewiseLinearCurve {
        &self.fb_size_thin
    }

    /// Tension size curve for stud grade
    pub fn stud_ft_size(&self) -> &PiecewiseLinearCurve {
        &self.stud_fb_size
    }
}

static SIZE_FACTOR_CURVES: Lazy<LumberResult<SizeFactorCurves>> =
    Lazy::new(SizeFactorCurves::build);

/// Process-wide size factor curves, built on first access
pub fn size_factor_curves() -> LumberResult<&'static SizeFactorCurves> {
    SIZE_FACTOR_CURVES.as_ref().map_err(Clone::clone)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::units::{IN_TO_M, PSI_TO_PA};

    #[test]
    fn test_wet_service_factors() {
        assert_eq!(WetService::Dry.factor_fv(), 1.0);
        assert_eq!(WetService::Wet.factor_fv(), 0.97);
        assert_eq!(WetService::Wet.factor_fc_perp(), 0.67);
        assert_eq!(WetService::Wet.factor_e(), 0.9);
        assert_eq!(WetService::Wet.factor_ft(), 1.0);
        assert!(WetService::from_flag(true).is_wet());
        assert!(!WetService::default().is_wet());
    }

    #[test]
    fn test_wet_fb_threshold() {
        let threshold = 1150.0 * PSI_TO_PA / 0.85;
        assert_eq!(WetService::Wet.factor_fb(threshold), 1.0);
        assert_eq!(WetService::Wet.factor_fb(threshold * 1.01), 0.85);
        assert_eq!(WetService::Dry.factor_fb(threshold * 2.0), 1.0);
    }

    #[test]
    fn test_wet_fc_threshold() {
        assert_eq!(WetService::Wet.factor_fc(650.0 * PSI_TO_PA), 1.0);
        assert_eq!(WetService::Wet.factor_fc(1150.0 * PSI_TO_PA), 0.8);
        assert_eq!(WetService::Dry.factor_fc(1150.0 * PSI_TO_PA), 1.0);
    }

    #[test]
    fn test_repetitive_member() {
        assert_eq!(RepetitiveMember::Single.factor(), 1.0);
        assert_eq!(RepetitiveMember::Repetitive.factor(), 1.15);
    }

    #[test]
    fn test_bearing_area_factor() {
        // 1.5" bearing: (1.5 + 0.375) / 1.5 = 1.25
        let cb = bearing_area_factor(1.5 * IN_TO_M).unwrap();
        assert!((cb - 1.25).abs() < 1e-9);
        assert_eq!(bearing_area_factor(6.5 * IN_TO_M).unwrap(), 1.0);
        assert!(bearing_area_factor(0.0).is_err());
    }

    #[test]
    fn test_size_factor_curves_build() {
        let curves = size_factor_curves().unwrap();
        assert_eq!(curves.fb_size_thin.evaluate(12.0).unwrap(), 1.0);
        assert_eq!(curves.fb_size_thick.evaluate(12.0).unwrap(), 1.1);
        assert_eq!(curves.fc_size.evaluate(8.0).unwrap(), 1.05);
        assert_eq!(curves.stud_fc_size.evaluate(3.5).unwrap(), 1.05);
        assert_eq!(curves.flat_use_thin.evaluate(10.0).unwrap(), 1.2);
        assert_eq!(curves.flat_use_thick.evaluate(10.0).unwrap(), 1.05);
    }

    #[test]
    fn test_tension_curves_match_bending() {
        let curves = size_factor_curves().unwrap();
        assert_eq!(curves.ft_size(), &curves.fb_size_thin);
        assert_eq!(curves.stud_ft_size(), &curves.stud_fb_size);
    }

    #[test]
    fn test_thickness_class_selection() {
        let curves = size_factor_curves().unwrap();
        assert_eq!(curves.flat_use(1.5), &curves.flat_use_thin);
        assert_eq!(curves.flat_use(3.5), &curves.flat_use_thick);
        assert_eq!(curves.fb_size(3.5), &curves.fb_size_thin);
        assert_eq!(curves.fb_size(4.5), &curves.fb_size_thick);
    }

    #[test]
    fn test_shared_curves_are_static() {
        let a = size_factor_curves().unwrap() as *const SizeFactorCurves;
        let b = size_factor_curves().unwrap() as *const SizeFactorCurves;
        assert_eq!(a, b);
    }
}
